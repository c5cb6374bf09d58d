use chrono::{NaiveDate, NaiveDateTime};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::constants::columns::{STATE_ONE, STATE_TWO};

pub use crate::types::{EntityId, LabelKind, LabelName, StateName, Timespan};

/// One label observation for an entity at an as-of date.
///
/// The as-of date is carried as an ISO `YYYY-MM-DD` string: label rows
/// arrive from loaders that have not yet normalized dates, and parsing them
/// is part of the resolver contract. Multiple rows may share
/// (entity_id, as_of_date) when they differ in name, type, or timespan.
/// Immutable once created.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelRecord {
    /// Entity the label describes.
    pub entity_id: EntityId,
    /// Civil as-of date as an ISO `YYYY-MM-DD` string.
    pub as_of_date: String,
    /// Forward-looking measurement interval (e.g. `1 month`).
    pub label_timespan: Timespan,
    /// Label definition name (e.g. `booking`).
    pub label_name: LabelName,
    /// Label measurement kind (e.g. `binary`).
    pub label_type: LabelKind,
    /// Observed label value.
    pub label: i64,
}

impl LabelRecord {
    /// Build a label row from loosely-typed parts.
    pub fn new(
        entity_id: EntityId,
        as_of_date: impl Into<String>,
        label_timespan: impl Into<Timespan>,
        label_name: impl Into<LabelName>,
        label_type: impl Into<LabelKind>,
        label: i64,
    ) -> Self {
        Self {
            entity_id,
            as_of_date: as_of_date.into(),
            label_timespan: label_timespan.into(),
            label_name: label_name.into(),
            label_type: label_type.into(),
            label,
        }
    }
}

/// Eligibility flags for an entity at an as-of date.
///
/// At most one row should exist per (entity_id, as_of_date); the sparse
/// state fixture enforces this at insertion. Absence of a row means the
/// state is unknown, not false.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateRecord {
    /// Entity the state snapshot describes.
    pub entity_id: EntityId,
    /// Civil as-of date of the snapshot.
    pub as_of_date: NaiveDate,
    /// Named boolean eligibility columns, in declaration order.
    pub flags: IndexMap<StateName, bool>,
}

impl StateRecord {
    /// Build the canonical two-flag sparse state row.
    pub fn sparse(
        entity_id: EntityId,
        as_of_date: NaiveDate,
        state_one: bool,
        state_two: bool,
    ) -> Self {
        let mut flags = IndexMap::new();
        flags.insert(STATE_ONE.to_string(), state_one);
        flags.insert(STATE_TWO.to_string(), state_two);
        Self {
            entity_id,
            as_of_date,
            flags,
        }
    }

    /// Look up a named flag.
    pub fn flag(&self, name: &str) -> Option<bool> {
        self.flags.get(name).copied()
    }

    /// Key used to join states against label rows.
    pub fn key(&self) -> (EntityId, NaiveDate) {
        (self.entity_id, self.as_of_date)
    }
}

/// One (entity, as-of-date) pair eligible for model evaluation.
///
/// Derived output of cohort resolution, never persisted. The derived `Ord`
/// is the output ordering invariant: ascending by (entity_id, as_of_date).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CohortEntry {
    /// Entity admitted to the cohort.
    pub entity_id: EntityId,
    /// Evaluation date the entity is eligible at.
    pub as_of_date: NaiveDate,
}

/// A valid evaluation date supplied to the resolver.
///
/// Callers may hold bare dates or datetimes; only the date portion is
/// significant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AsOfDate {
    /// A bare civil date.
    Date(NaiveDate),
    /// A datetime whose time-of-day is dropped during normalization.
    DateTime(NaiveDateTime),
}

impl AsOfDate {
    /// The civil date portion, dropping any time-of-day.
    pub fn date(self) -> NaiveDate {
        match self {
            AsOfDate::Date(date) => date,
            AsOfDate::DateTime(stamp) => stamp.date(),
        }
    }
}

impl From<NaiveDate> for AsOfDate {
    fn from(date: NaiveDate) -> Self {
        AsOfDate::Date(date)
    }
}

impl From<NaiveDateTime> for AsOfDate {
    fn from(stamp: NaiveDateTime) -> Self {
        AsOfDate::DateTime(stamp)
    }
}
