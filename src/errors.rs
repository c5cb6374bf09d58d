use std::io;

use thiserror::Error;

use crate::types::{ColumnName, TableName};

/// Error type for resolution, fixture-store, and persistence failures.
#[derive(Debug, Error)]
pub enum CohortError {
    #[error("malformed as-of date '{value}': expected YYYY-MM-DD")]
    Format { value: String },
    #[error("relation '{relation}' column '{column}': {details}")]
    Schema {
        relation: TableName,
        column: ColumnName,
        details: String,
    },
    #[error("unknown table '{0}'")]
    UnknownTable(TableName),
    #[error("table '{0}' already exists")]
    TableExists(TableName),
    #[error("duplicate key ({key}) violates unique constraint on '{table}'")]
    DuplicateKey { table: TableName, key: String },
    #[error("fixture store failure: {0}")]
    Store(String),
    #[error("model registry failure: {0}")]
    Registry(String),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("serialization failure: {0}")]
    Json(#[from] serde_json::Error),
}
