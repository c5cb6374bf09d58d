/// Constants used by date parsing and normalization.
pub mod dates {
    /// Strict civil-date format accepted for label as-of dates.
    pub const ISO_DATE_FORMAT: &str = "%Y-%m-%d";
}

/// Canonical column names shared by the fixture table shapes.
pub mod columns {
    /// Entity identifier column present on every shape.
    pub const ENTITY_ID: &str = "entity_id";
    /// Civil as-of date column on features, labels, and sparse states.
    pub const AS_OF_DATE: &str = "as_of_date";
    /// Label measurement interval column.
    pub const LABEL_TIMESPAN: &str = "label_timespan";
    /// Label definition name column.
    pub const LABEL_NAME: &str = "label_name";
    /// Label measurement kind column.
    pub const LABEL_TYPE: &str = "label_type";
    /// Observed label value column.
    pub const LABEL: &str = "label";
    /// First canonical sparse-state flag column.
    pub const STATE_ONE: &str = "state_one";
    /// Second canonical sparse-state flag column.
    pub const STATE_TWO: &str = "state_two";
    /// Dense-state name column.
    pub const STATE: &str = "state";
    /// Dense-state interval start column.
    pub const START_TIME: &str = "start_time";
    /// Dense-state interval end column.
    pub const END_TIME: &str = "end_time";
    /// Outcome event date column.
    pub const OUTCOME_DATE: &str = "outcome_date";
    /// Binary outcome column.
    pub const OUTCOME: &str = "outcome";
    /// Prefix for numbered feature columns (`f1`, `f2`, ...).
    pub const FEATURE_PREFIX: &str = "f";
}

/// Canonical fixture table names.
pub mod tables {
    /// Label table.
    pub const LABELS: &str = "labels";
    /// Sparse state table (one row per known entity/date pair).
    pub const SPARSE_STATES: &str = "sparse_states";
    /// Dense state table (one row per entity state interval).
    pub const DENSE_STATES: &str = "dense_states";
    /// Binary outcome event table.
    pub const EVENTS: &str = "events";
    /// Prefix for numbered feature tables (`features0`, `features1`, ...).
    pub const FEATURES_PREFIX: &str = "features";
}

/// Constants used by artifact and registry persistence.
pub mod artifacts {
    /// Suffix for persisted matrix files.
    pub const MATRIX_SUFFIX: &str = ".matrix.json";
    /// Suffix for persisted metadata files.
    pub const METADATA_SUFFIX: &str = ".meta.json";
    /// Filename of the registry row index.
    pub const REGISTRY_INDEX_FILENAME: &str = "registry.json";
    /// Subdirectory holding registered model artifacts.
    pub const MODEL_DIR: &str = "models";
    /// Suffix for persisted model artifact blobs.
    pub const MODEL_SUFFIX: &str = ".bin";
}
