//! In-memory relational fixture store and index-presence oracle.
//!
//! The store accepts schema-creation and row-insertion calls and hands rows
//! back verbatim. The cohort resolver never requires a live relational
//! engine; [`resolve_cohort_from_store`] is the deployment variant that
//! sources labels and states from a store instead of caller slices.

use std::collections::HashSet;
use std::sync::RwLock;

use chrono::{NaiveDate, NaiveDateTime};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::cohort::{CohortQuery, resolve_cohort};
use crate::constants::{columns, tables};
use crate::data::{AsOfDate, CohortEntry, LabelRecord, StateRecord};
use crate::dates::parse_iso_date;
use crate::errors::CohortError;
use crate::types::{ColumnName, TableName};

/// A single typed cell value.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Value {
    /// 64-bit integer.
    Int(i64),
    /// UTF-8 text.
    Text(String),
    /// Civil date.
    Date(NaiveDate),
    /// Civil datetime.
    Timestamp(NaiveDateTime),
    /// Boolean flag.
    Bool(bool),
    /// Absent value; satisfies any column type.
    Null,
}

impl Value {
    /// Integer payload, if this is an `Int`.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(value) => Some(*value),
            _ => None,
        }
    }

    /// Text payload, if this is a `Text`.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(value) => Some(value),
            _ => None,
        }
    }

    /// Date payload, if this is a `Date`.
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Value::Date(value) => Some(*value),
            _ => None,
        }
    }

    /// Boolean payload, if this is a `Bool`.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(value) => Some(*value),
            _ => None,
        }
    }

    fn fits(&self, column_type: ColumnType) -> bool {
        matches!(
            (self, column_type),
            (Value::Int(_), ColumnType::Int)
                | (Value::Text(_), ColumnType::Text)
                | (Value::Date(_), ColumnType::Date)
                | (Value::Timestamp(_), ColumnType::Timestamp)
                | (Value::Bool(_), ColumnType::Bool)
                | (Value::Null, _)
        )
    }

    fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Text(_) => "text",
            Value::Date(_) => "date",
            Value::Timestamp(_) => "timestamp",
            Value::Bool(_) => "bool",
            Value::Null => "null",
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<NaiveDate> for Value {
    fn from(value: NaiveDate) -> Self {
        Value::Date(value)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(value: NaiveDateTime) -> Self {
        Value::Timestamp(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

/// Declared type of a fixture column.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnType {
    /// 64-bit integer column.
    Int,
    /// UTF-8 text column.
    Text,
    /// Civil date column; accepts ISO text at insertion.
    Date,
    /// Civil datetime column.
    Timestamp,
    /// Boolean column.
    Bool,
}

impl ColumnType {
    fn name(self) -> &'static str {
        match self {
            ColumnType::Int => "int",
            ColumnType::Text => "text",
            ColumnType::Date => "date",
            ColumnType::Timestamp => "timestamp",
            ColumnType::Bool => "bool",
        }
    }
}

/// Schema for one fixture table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TableShape {
    /// Table name.
    pub name: TableName,
    /// Ordered column declarations.
    pub columns: Vec<(ColumnName, ColumnType)>,
    /// Columns forming a unique key enforced at insertion, when declared.
    pub unique_key: Option<Vec<ColumnName>>,
}

impl TableShape {
    /// Build a shape from a name and ordered column declarations.
    pub fn new(
        name: impl Into<TableName>,
        columns: Vec<(ColumnName, ColumnType)>,
    ) -> Self {
        Self {
            name: name.into(),
            columns,
            unique_key: None,
        }
    }

    /// Declare a unique key enforced at insertion.
    pub fn with_unique_key(mut self, key: Vec<ColumnName>) -> Self {
        self.unique_key = Some(key);
        self
    }

    /// Numbered feature table: entity_id, as_of_date, and two numeric
    /// feature columns (`f{2n+1}`, `f{2n+2}` for table number `n`).
    pub fn features(table_number: usize) -> Self {
        Self::new(
            format!("{}{}", tables::FEATURES_PREFIX, table_number),
            vec![
                (columns::ENTITY_ID.to_string(), ColumnType::Int),
                (columns::AS_OF_DATE.to_string(), ColumnType::Date),
                (
                    format!("{}{}", columns::FEATURE_PREFIX, table_number * 2 + 1),
                    ColumnType::Int,
                ),
                (
                    format!("{}{}", columns::FEATURE_PREFIX, table_number * 2 + 2),
                    ColumnType::Int,
                ),
            ],
        )
    }

    /// Label table shape.
    pub fn labels() -> Self {
        Self::new(
            tables::LABELS,
            vec![
                (columns::ENTITY_ID.to_string(), ColumnType::Int),
                (columns::AS_OF_DATE.to_string(), ColumnType::Date),
                (columns::LABEL_TIMESPAN.to_string(), ColumnType::Text),
                (columns::LABEL_NAME.to_string(), ColumnType::Text),
                (columns::LABEL_TYPE.to_string(), ColumnType::Text),
                (columns::LABEL.to_string(), ColumnType::Int),
            ],
        )
    }

    /// Sparse state table shape, unique per (entity_id, as_of_date).
    pub fn sparse_states() -> Self {
        Self::new(
            tables::SPARSE_STATES,
            vec![
                (columns::ENTITY_ID.to_string(), ColumnType::Int),
                (columns::AS_OF_DATE.to_string(), ColumnType::Date),
                (columns::STATE_ONE.to_string(), ColumnType::Bool),
                (columns::STATE_TWO.to_string(), ColumnType::Bool),
            ],
        )
        .with_unique_key(vec![
            columns::ENTITY_ID.to_string(),
            columns::AS_OF_DATE.to_string(),
        ])
    }

    /// Dense state table shape (one row per entity state interval).
    pub fn dense_states(name: impl Into<TableName>) -> Self {
        Self::new(
            name,
            vec![
                (columns::ENTITY_ID.to_string(), ColumnType::Int),
                (columns::STATE.to_string(), ColumnType::Text),
                (columns::START_TIME.to_string(), ColumnType::Timestamp),
                (columns::END_TIME.to_string(), ColumnType::Timestamp),
            ],
        )
    }

    /// Binary outcome event table shape.
    pub fn outcome_events(name: impl Into<TableName>) -> Self {
        Self::new(
            name,
            vec![
                (columns::ENTITY_ID.to_string(), ColumnType::Int),
                (columns::OUTCOME_DATE.to_string(), ColumnType::Date),
                (columns::OUTCOME.to_string(), ColumnType::Bool),
            ],
        )
    }

    fn column_index(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|(name, _)| name == column)
    }
}

/// Narrow relational-fixture interface.
///
/// Accepts schema creation and row insertion, reports index presence, and
/// hands rows back verbatim. Implementations use interior mutability so a
/// shared store can be provisioned and scanned through `&self`.
pub trait RelationalStore: Send + Sync {
    /// Create `shape` as an empty table. Fails if the table exists.
    fn create(&self, shape: TableShape) -> Result<(), CohortError>;
    /// Drop `table` if present; missing tables are ignored.
    fn drop_table(&self, table: &str);
    /// Append one row to `table`, validating arity, column types, and the
    /// declared unique key.
    fn insert(&self, table: &str, row: Vec<Value>) -> Result<(), CohortError>;
    /// All rows of `table` in insertion order.
    fn scan(&self, table: &str) -> Result<Vec<Vec<Value>>, CohortError>;
    /// Shape of `table`, as created.
    fn shape(&self, table: &str) -> Result<TableShape, CohortError>;
    /// Report whether an index covering `column` exists on `table`.
    /// No side effects.
    fn has_index(&self, table: &str, column: &str) -> bool;
    /// Record an index covering `column` on `table`.
    fn create_index(&self, table: &str, column: &str) -> Result<(), CohortError>;
}

#[derive(Clone, Debug)]
struct Table {
    shape: TableShape,
    rows: Vec<Vec<Value>>,
    unique_keys: HashSet<Vec<Value>>,
}

impl Table {
    fn new(shape: TableShape) -> Self {
        Self {
            shape,
            rows: Vec::new(),
            unique_keys: HashSet::new(),
        }
    }

    fn insert(&mut self, mut row: Vec<Value>) -> Result<(), CohortError> {
        if row.len() != self.shape.columns.len() {
            return Err(CohortError::Schema {
                relation: self.shape.name.clone(),
                column: String::new(),
                details: format!(
                    "row has {} values for {} declared columns",
                    row.len(),
                    self.shape.columns.len()
                ),
            });
        }
        for (value, (column, column_type)) in row.iter_mut().zip(&self.shape.columns) {
            // ISO text inserted into a date column is parsed the way a
            // relational engine casts the literal.
            if *column_type == ColumnType::Date
                && let Value::Text(text) = value
            {
                let parsed = parse_iso_date(text)?;
                *value = Value::Date(parsed);
            }
            if !value.fits(*column_type) {
                return Err(CohortError::Schema {
                    relation: self.shape.name.clone(),
                    column: column.clone(),
                    details: format!(
                        "expected {}, got {}",
                        column_type.name(),
                        value.type_name()
                    ),
                });
            }
        }
        if let Some(key_columns) = &self.shape.unique_key {
            let key = self.key_values(key_columns, &row)?;
            if !self.unique_keys.insert(key.clone()) {
                return Err(CohortError::DuplicateKey {
                    table: self.shape.name.clone(),
                    key: format!("{key:?}"),
                });
            }
        }
        self.rows.push(row);
        Ok(())
    }

    fn key_values(
        &self,
        key_columns: &[ColumnName],
        row: &[Value],
    ) -> Result<Vec<Value>, CohortError> {
        key_columns
            .iter()
            .map(|column| {
                self.shape
                    .column_index(column)
                    .map(|idx| row[idx].clone())
                    .ok_or_else(|| CohortError::Schema {
                        relation: self.shape.name.clone(),
                        column: column.clone(),
                        details: "unique-key column is not declared".to_string(),
                    })
            })
            .collect()
    }
}

/// In-memory [`RelationalStore`] for tests and small fixtures.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<IndexMap<TableName, Table>>,
    indexes: RwLock<HashSet<(TableName, ColumnName)>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned(what: &str) -> CohortError {
    CohortError::Store(format!("{what} lock poisoned"))
}

impl RelationalStore for MemoryStore {
    fn create(&self, shape: TableShape) -> Result<(), CohortError> {
        let mut tables = self.tables.write().map_err(|_| poisoned("tables"))?;
        if tables.contains_key(&shape.name) {
            return Err(CohortError::TableExists(shape.name));
        }
        tables.insert(shape.name.clone(), Table::new(shape));
        Ok(())
    }

    fn drop_table(&self, table: &str) {
        if let Ok(mut tables) = self.tables.write() {
            tables.shift_remove(table);
        }
        if let Ok(mut indexes) = self.indexes.write() {
            indexes.retain(|(name, _)| name != table);
        }
    }

    fn insert(&self, table: &str, row: Vec<Value>) -> Result<(), CohortError> {
        let mut tables = self.tables.write().map_err(|_| poisoned("tables"))?;
        let entry = tables
            .get_mut(table)
            .ok_or_else(|| CohortError::UnknownTable(table.to_string()))?;
        entry.insert(row)
    }

    fn scan(&self, table: &str) -> Result<Vec<Vec<Value>>, CohortError> {
        let tables = self.tables.read().map_err(|_| poisoned("tables"))?;
        tables
            .get(table)
            .map(|entry| entry.rows.clone())
            .ok_or_else(|| CohortError::UnknownTable(table.to_string()))
    }

    fn shape(&self, table: &str) -> Result<TableShape, CohortError> {
        let tables = self.tables.read().map_err(|_| poisoned("tables"))?;
        tables
            .get(table)
            .map(|entry| entry.shape.clone())
            .ok_or_else(|| CohortError::UnknownTable(table.to_string()))
    }

    fn has_index(&self, table: &str, column: &str) -> bool {
        self.indexes
            .read()
            .map(|indexes| indexes.contains(&(table.to_string(), column.to_string())))
            .unwrap_or(false)
    }

    fn create_index(&self, table: &str, column: &str) -> Result<(), CohortError> {
        let tables = self.tables.read().map_err(|_| poisoned("tables"))?;
        let entry = tables
            .get(table)
            .ok_or_else(|| CohortError::UnknownTable(table.to_string()))?;
        if entry.shape.column_index(column).is_none() {
            return Err(CohortError::Schema {
                relation: table.to_string(),
                column: column.to_string(),
                details: "cannot index an undeclared column".to_string(),
            });
        }
        drop(tables);
        self.indexes
            .write()
            .map_err(|_| poisoned("indexes"))?
            .insert((table.to_string(), column.to_string()));
        Ok(())
    }
}

fn required_column(
    shape: &TableShape,
    column: &str,
) -> Result<usize, CohortError> {
    shape.column_index(column).ok_or_else(|| CohortError::Schema {
        relation: shape.name.clone(),
        column: column.to_string(),
        details: "required column is missing".to_string(),
    })
}

fn mistyped(shape: &TableShape, column: &str, value: &Value) -> CohortError {
    CohortError::Schema {
        relation: shape.name.clone(),
        column: column.to_string(),
        details: format!("unexpected {} value", value.type_name()),
    }
}

/// Decode labels-shaped rows from `table` into typed records.
///
/// The as-of date is rendered back to its ISO string form, which is the
/// shape [`resolve_cohort`] expects label rows in.
pub fn label_rows(
    store: &dyn RelationalStore,
    table: &str,
) -> Result<Vec<LabelRecord>, CohortError> {
    let shape = store.shape(table)?;
    let entity_idx = required_column(&shape, columns::ENTITY_ID)?;
    let date_idx = required_column(&shape, columns::AS_OF_DATE)?;
    let timespan_idx = required_column(&shape, columns::LABEL_TIMESPAN)?;
    let name_idx = required_column(&shape, columns::LABEL_NAME)?;
    let type_idx = required_column(&shape, columns::LABEL_TYPE)?;
    let label_idx = required_column(&shape, columns::LABEL)?;

    let mut records = Vec::new();
    for row in store.scan(table)? {
        let as_of_date = match &row[date_idx] {
            Value::Date(date) => date.format(crate::constants::dates::ISO_DATE_FORMAT).to_string(),
            Value::Text(text) => text.clone(),
            other => return Err(mistyped(&shape, columns::AS_OF_DATE, other)),
        };
        records.push(LabelRecord {
            entity_id: row[entity_idx]
                .as_int()
                .ok_or_else(|| mistyped(&shape, columns::ENTITY_ID, &row[entity_idx]))?,
            as_of_date,
            label_timespan: row[timespan_idx]
                .as_text()
                .ok_or_else(|| mistyped(&shape, columns::LABEL_TIMESPAN, &row[timespan_idx]))?
                .to_string(),
            label_name: row[name_idx]
                .as_text()
                .ok_or_else(|| mistyped(&shape, columns::LABEL_NAME, &row[name_idx]))?
                .to_string(),
            label_type: row[type_idx]
                .as_text()
                .ok_or_else(|| mistyped(&shape, columns::LABEL_TYPE, &row[type_idx]))?
                .to_string(),
            label: row[label_idx]
                .as_int()
                .ok_or_else(|| mistyped(&shape, columns::LABEL, &row[label_idx]))?,
        });
    }
    Ok(records)
}

/// Decode state-shaped rows from `table` into typed records.
///
/// Every boolean column in the shape becomes a named flag, so tables with
/// more (or differently named) eligibility columns than the canonical pair
/// decode without special cases.
pub fn state_rows(
    store: &dyn RelationalStore,
    table: &str,
) -> Result<Vec<StateRecord>, CohortError> {
    let shape = store.shape(table)?;
    let entity_idx = required_column(&shape, columns::ENTITY_ID)?;
    let date_idx = required_column(&shape, columns::AS_OF_DATE)?;

    let mut records = Vec::new();
    for row in store.scan(table)? {
        let mut flags = IndexMap::new();
        for (idx, (column, column_type)) in shape.columns.iter().enumerate() {
            if *column_type != ColumnType::Bool {
                continue;
            }
            let value = row[idx]
                .as_bool()
                .ok_or_else(|| mistyped(&shape, column, &row[idx]))?;
            flags.insert(column.clone(), value);
        }
        records.push(StateRecord {
            entity_id: row[entity_idx]
                .as_int()
                .ok_or_else(|| mistyped(&shape, columns::ENTITY_ID, &row[entity_idx]))?,
            as_of_date: row[date_idx]
                .as_date()
                .ok_or_else(|| mistyped(&shape, columns::AS_OF_DATE, &row[date_idx]))?,
            flags,
        });
    }
    Ok(records)
}

/// Resolve a cohort directly from a relational store.
///
/// Deployment variant of [`resolve_cohort`]: label and state rows are
/// sourced by scanning `labels_table` and `states_table`, then the same
/// filter predicates are applied in memory.
pub fn resolve_cohort_from_store(
    store: &dyn RelationalStore,
    labels_table: &str,
    states_table: &str,
    as_of_dates: &[AsOfDate],
    query: &CohortQuery,
) -> Result<Vec<CohortEntry>, CohortError> {
    let labels = label_rows(store, labels_table)?;
    let states = state_rows(store, states_table)?;
    resolve_cohort(&labels, &states, as_of_dates, query)
}
