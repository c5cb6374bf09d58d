//! File persistence for evaluation matrices and their metadata.

use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::constants::artifacts::{MATRIX_SUFFIX, METADATA_SUFFIX};
use crate::errors::CohortError;
use crate::types::{ColumnName, EntityId};

/// Arbitrary metadata mapping persisted alongside a matrix.
pub type Metadata = IndexMap<String, serde_json::Value>;

/// Tabular feature matrix row-indexed by entity id.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Matrix {
    /// Row index: one entity id per row.
    pub index: Vec<EntityId>,
    /// Named columns, each as long as `index`.
    pub columns: IndexMap<ColumnName, Vec<f64>>,
}

impl Matrix {
    /// Build a matrix, validating that every column matches the index
    /// length.
    pub fn new(
        index: Vec<EntityId>,
        columns: IndexMap<ColumnName, Vec<f64>>,
    ) -> Result<Self, CohortError> {
        for (name, values) in &columns {
            if values.len() != index.len() {
                return Err(CohortError::Schema {
                    relation: "matrix".to_string(),
                    column: name.clone(),
                    details: format!(
                        "{} values for {} index rows",
                        values.len(),
                        index.len()
                    ),
                });
            }
        }
        Ok(Self { index, columns })
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Whether the matrix has no rows.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

/// Stores matrices and their metadata under a base directory.
///
/// Each artifact pair is persisted under a caller-chosen identifier; the
/// two files can be read back independently.
#[derive(Debug)]
pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    /// Open a store rooted at `dir`, creating the directory when missing.
    pub fn open<P: Into<PathBuf>>(dir: P) -> Result<Self, CohortError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// Base directory of this store.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Persist `matrix` and `metadata` under `id`, returning the matrix
    /// and metadata locations in that order.
    pub fn store(
        &self,
        id: &str,
        matrix: &Matrix,
        metadata: &Metadata,
    ) -> Result<(PathBuf, PathBuf), CohortError> {
        let matrix_path = self.matrix_path(id);
        let metadata_path = self.metadata_path(id);
        fs::write(&matrix_path, serde_json::to_vec_pretty(matrix)?)?;
        fs::write(&metadata_path, serde_json::to_vec_pretty(metadata)?)?;
        Ok((matrix_path, metadata_path))
    }

    /// Read back the matrix stored under `id`.
    pub fn load_matrix(&self, id: &str) -> Result<Matrix, CohortError> {
        let bytes = fs::read(self.matrix_path(id))?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Read back the metadata stored under `id`.
    pub fn load_metadata(&self, id: &str) -> Result<Metadata, CohortError> {
        let bytes = fs::read(self.metadata_path(id))?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Location of the matrix file for `id`.
    pub fn matrix_path(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{id}{MATRIX_SUFFIX}"))
    }

    /// Location of the metadata file for `id`.
    pub fn metadata_path(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{id}{METADATA_SUFFIX}"))
    }
}
