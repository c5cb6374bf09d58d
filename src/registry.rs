//! Model artifact registration and issued-id bookkeeping.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use serde::{Deserialize, Serialize};

use crate::constants::artifacts::{MODEL_DIR, MODEL_SUFFIX, REGISTRY_INDEX_FILENAME};
use crate::errors::CohortError;
use crate::hash::stable_hash_bytes;
use crate::types::ModelId;

/// One registry row recording a persisted model artifact.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelRow {
    /// Issued dense identifier.
    pub model_id: ModelId,
    /// Caller-supplied content hash of the artifact.
    pub model_hash: String,
}

/// Persists trained artifacts and records registry rows.
pub trait ModelRegistry: Send + Sync {
    /// Persist `artifact` under `model_hash` and return the issued id.
    ///
    /// Ids are dense and start at 1, in registration order.
    fn register(&self, artifact: &[u8], model_hash: &str) -> Result<ModelId, CohortError>;
    /// All rows recorded so far, in issue order.
    fn rows(&self) -> Result<Vec<ModelRow>, CohortError>;
}

/// Stable content hash for a model artifact, rendered as fixed-width hex.
pub fn content_hash(artifact: &[u8]) -> String {
    format!("{:016x}", stable_hash_bytes(artifact))
}

/// In-memory registry for unit tests.
#[derive(Debug, Default)]
pub struct MemoryModelRegistry {
    inner: RwLock<Vec<(ModelRow, Vec<u8>)>>,
}

impl MemoryModelRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Artifact bytes stored for `model_id`, if present.
    pub fn artifact(&self, model_id: ModelId) -> Option<Vec<u8>> {
        let guard = self.inner.read().ok()?;
        guard
            .iter()
            .find(|(row, _)| row.model_id == model_id)
            .map(|(_, artifact)| artifact.clone())
    }
}

impl ModelRegistry for MemoryModelRegistry {
    fn register(&self, artifact: &[u8], model_hash: &str) -> Result<ModelId, CohortError> {
        let mut guard = self
            .inner
            .write()
            .map_err(|_| CohortError::Registry("registry lock poisoned".to_string()))?;
        let model_id = guard.len() as ModelId + 1;
        guard.push((
            ModelRow {
                model_id,
                model_hash: model_hash.to_string(),
            },
            artifact.to_vec(),
        ));
        Ok(model_id)
    }

    fn rows(&self) -> Result<Vec<ModelRow>, CohortError> {
        let guard = self
            .inner
            .read()
            .map_err(|_| CohortError::Registry("registry lock poisoned".to_string()))?;
        Ok(guard.iter().map(|(row, _)| row.clone()).collect())
    }
}

/// File-backed registry: artifact blobs under a models directory, rows in
/// a JSON index file. Reopening a directory resumes id issuance from the
/// persisted rows.
#[derive(Debug)]
pub struct FileModelRegistry {
    dir: PathBuf,
    // Serializes read-modify-write cycles on the index file.
    write_lock: RwLock<()>,
}

impl FileModelRegistry {
    /// Open (or create) a registry rooted at `dir`.
    pub fn open<P: Into<PathBuf>>(dir: P) -> Result<Self, CohortError> {
        let dir = dir.into();
        fs::create_dir_all(dir.join(MODEL_DIR))?;
        Ok(Self {
            dir,
            write_lock: RwLock::new(()),
        })
    }

    /// Location of the artifact blob for `model_id`.
    pub fn artifact_path(&self, model_id: ModelId) -> PathBuf {
        self.dir
            .join(MODEL_DIR)
            .join(format!("{model_id}{MODEL_SUFFIX}"))
    }

    fn index_path(&self) -> PathBuf {
        self.dir.join(REGISTRY_INDEX_FILENAME)
    }

    fn read_rows(&self, index_path: &Path) -> Result<Vec<ModelRow>, CohortError> {
        if !index_path.exists() {
            return Ok(Vec::new());
        }
        let bytes = fs::read(index_path)?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

impl ModelRegistry for FileModelRegistry {
    fn register(&self, artifact: &[u8], model_hash: &str) -> Result<ModelId, CohortError> {
        let _guard = self
            .write_lock
            .write()
            .map_err(|_| CohortError::Registry("registry lock poisoned".to_string()))?;
        let index_path = self.index_path();
        let mut rows = self.read_rows(&index_path)?;
        let model_id = rows.len() as ModelId + 1;
        fs::write(self.artifact_path(model_id), artifact)?;
        rows.push(ModelRow {
            model_id,
            model_hash: model_hash.to_string(),
        });
        fs::write(&index_path, serde_json::to_vec_pretty(&rows)?)?;
        Ok(model_id)
    }

    fn rows(&self) -> Result<Vec<ModelRow>, CohortError> {
        let _guard = self
            .write_lock
            .read()
            .map_err(|_| CohortError::Registry("registry lock poisoned".to_string()))?;
        self.read_rows(&self.index_path())
    }
}
