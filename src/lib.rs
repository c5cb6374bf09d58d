#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

/// File persistence for evaluation matrices and metadata.
pub mod artifact;
/// Cohort resolution over label and state relations.
pub mod cohort;
/// Centralized constants for table shapes, columns, and formats.
pub mod constants;
/// Record types shared across resolution and fixtures.
pub mod data;
/// Civil-date parsing and normalization helpers.
pub mod dates;
/// Schema provisioning and synthetic data helpers.
pub mod fixtures;
/// Model artifact registration.
pub mod registry;
/// In-memory relational fixture store and index oracle.
pub mod store;
/// Shared type aliases.
pub mod types;

mod errors;
mod hash;

pub use artifact::{ArtifactStore, Matrix, Metadata};
pub use cohort::{CohortQuery, resolve_cohort};
pub use data::{AsOfDate, CohortEntry, LabelRecord, StateRecord};
pub use dates::{normalize_as_of_dates, parse_iso_date, parse_iso_dates};
pub use errors::CohortError;
pub use fixtures::{
    FixtureRng, MockTrainedModel, TestFixture, register_mock_model, synthetic_outcomes,
};
pub use registry::{FileModelRegistry, MemoryModelRegistry, ModelRegistry, ModelRow, content_hash};
pub use store::{
    ColumnType, MemoryStore, RelationalStore, TableShape, Value, label_rows,
    resolve_cohort_from_store, state_rows,
};
pub use types::{EntityId, ModelId};
