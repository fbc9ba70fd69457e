//! File-backed storage for the tasknest durable record.
//!
//! One logical record, one JSON file. Writes land in a sibling temp file and
//! replace the target with a rename, so a failed write never truncates the
//! previous record. The store knows nothing about task semantics; it moves
//! [`PersistedState`] values in and out.

use std::fs;
use std::path::{Path, PathBuf};

use tasknest_core::PersistedState;
use tracing::{debug, info};

/// Error types for store operations.
pub mod error;

pub use error::StoreError;

/// Storage backed by a single JSON record file.
#[derive(Debug, Clone)]
pub struct FsStore {
    path: PathBuf,
}

impl FsStore {
    /// Create a store rooted at `path`. Parent directories are created on
    /// first write, not here.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the record file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the durable record. A missing file reads as no data.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn read_state(&self) -> Result<Option<PersistedState>, StoreError> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "No record file");
            return Ok(None);
        }
        let contents = fs::read_to_string(&self.path)?;
        let state = serde_json::from_str(&contents)
            .map_err(|err| StoreError::Parse(err.to_string()))?;
        debug!(path = %self.path.display(), "Loaded record");
        Ok(Some(state))
    }

    /// Write the durable record, replacing any previous one.
    ///
    /// # Errors
    /// Returns an error if serialization fails or the file cannot be
    /// written or renamed into place.
    pub fn write_state(&self, state: &PersistedState) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        let body = serde_json::to_string(state)
            .map_err(|err| StoreError::Serialize(err.to_string()))?;
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, body)?;
        fs::rename(&tmp, &self.path)?;
        info!(path = %self.path.display(), tasks = state.tasks.len(), "Saved record");
        Ok(())
    }
}
