//! Schema provisioning and synthetic data helpers for fixture stores.
//!
//! Everything here is deterministic under a fixed seed: synthetic values
//! come from an explicitly passed random source, never from global RNG
//! state.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::errors::CohortError;
use crate::registry::ModelRegistry;
use crate::store::{RelationalStore, TableShape, Value};
use crate::types::{EntityId, ModelId};

/// Narrow provisioning interface: create one table shape and load its rows.
///
/// Provisioning replaces any existing table of the same name, so fixtures
/// can be rebuilt between test cases without manual teardown.
pub trait TestFixture {
    /// Create `shape` and insert `rows`, replacing any existing table.
    fn provision(&self, shape: TableShape, rows: Vec<Vec<Value>>) -> Result<(), CohortError>;
}

impl<S: RelationalStore + ?Sized> TestFixture for S {
    fn provision(&self, shape: TableShape, rows: Vec<Vec<Value>>) -> Result<(), CohortError> {
        let table = shape.name.clone();
        self.drop_table(&table);
        self.create(shape)?;
        for row in rows {
            self.insert(&table, row)?;
        }
        Ok(())
    }
}

/// Create numbered feature tables (`features0`, `features1`, ...) and load
/// one row set into each.
pub fn provision_feature_tables<S: TestFixture + ?Sized>(
    fixture: &S,
    feature_tables: Vec<Vec<Vec<Value>>>,
) -> Result<(), CohortError> {
    for (table_number, rows) in feature_tables.into_iter().enumerate() {
        fixture.provision(TableShape::features(table_number), rows)?;
    }
    Ok(())
}

/// Create and load the label table.
pub fn provision_labels<S: TestFixture + ?Sized>(
    fixture: &S,
    rows: Vec<Vec<Value>>,
) -> Result<(), CohortError> {
    fixture.provision(TableShape::labels(), rows)
}

/// Create and load the sparse state table.
pub fn provision_sparse_states<S: TestFixture + ?Sized>(
    fixture: &S,
    rows: Vec<Vec<Value>>,
) -> Result<(), CohortError> {
    fixture.provision(TableShape::sparse_states(), rows)
}

/// Create and load a dense state table under `table_name`.
pub fn provision_dense_states<S: TestFixture + ?Sized>(
    fixture: &S,
    table_name: &str,
    rows: Vec<Vec<Value>>,
) -> Result<(), CohortError> {
    fixture.provision(TableShape::dense_states(table_name), rows)
}

/// Create and load a binary outcome event table under `table_name`.
pub fn provision_outcome_events<S: TestFixture + ?Sized>(
    fixture: &S,
    table_name: &str,
    rows: Vec<Vec<Value>>,
) -> Result<(), CohortError> {
    fixture.provision(TableShape::outcome_events(table_name), rows)
}

/// Row literal for the labels shape.
pub fn label_row(
    entity_id: EntityId,
    as_of_date: &str,
    label_timespan: &str,
    label_name: &str,
    label_type: &str,
    label: i64,
) -> Vec<Value> {
    vec![
        entity_id.into(),
        as_of_date.into(),
        label_timespan.into(),
        label_name.into(),
        label_type.into(),
        label.into(),
    ]
}

/// Row literal for the sparse state shape.
pub fn sparse_state_row(
    entity_id: EntityId,
    as_of_date: &str,
    state_one: bool,
    state_two: bool,
) -> Vec<Value> {
    vec![
        entity_id.into(),
        as_of_date.into(),
        state_one.into(),
        state_two.into(),
    ]
}

/// Small deterministic RNG for reproducible fixture data.
///
/// Splitmix-style, not cryptographic. Implements [`rand::RngCore`] so
/// fixture helpers accept it anywhere a random source is required.
#[derive(Clone, Debug)]
pub struct FixtureRng {
    state: u64,
}

impl FixtureRng {
    /// Create a generator seeded with `seed`.
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    fn next_u64_internal(&mut self) -> u64 {
        let mut z = self.state.wrapping_add(0x9E3779B97F4A7C15);
        self.state = z;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
        z ^ (z >> 31)
    }
}

impl rand::RngCore for FixtureRng {
    fn next_u32(&mut self) -> u32 {
        self.next_u64_internal() as u32
    }

    fn next_u64(&mut self) -> u64 {
        self.next_u64_internal()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        let mut offset = 0;
        while offset < dest.len() {
            let value = self.next_u64_internal();
            let bytes = value.to_le_bytes();
            let remaining = dest.len() - offset;
            let copy_len = remaining.min(bytes.len());
            dest[offset..offset + copy_len].copy_from_slice(&bytes[..copy_len]);
            offset += copy_len;
        }
    }
}

/// Generate `len` synthetic boolean outcomes from the supplied random
/// source.
pub fn synthetic_outcomes<R: Rng>(rng: &mut R, len: usize) -> Vec<bool> {
    (0..len).map(|_| rng.random_bool(0.5)).collect()
}

/// Trivial stand-in for a trained model artifact.
///
/// Scores come from an explicitly supplied random source, keeping fixture
/// output reproducible under a fixed seed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MockTrainedModel;

impl MockTrainedModel {
    /// Score `count` rows, one pseudo-random probability per row.
    pub fn predict_proba<R: Rng>(&self, rng: &mut R, count: usize) -> Vec<f64> {
        (0..count).map(|_| rng.random::<f64>()).collect()
    }
}

/// Serialize a mock trained model, register it under `model_hash`, and
/// return the issued id.
pub fn register_mock_model(
    registry: &dyn ModelRegistry,
    model_hash: &str,
) -> Result<ModelId, CohortError> {
    let artifact = serde_json::to_vec(&MockTrainedModel)?;
    registry.register(&artifact, model_hash)
}
