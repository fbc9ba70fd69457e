//! Persistence seam between the service and a concrete store.

use tasknest_core::PersistedState;
use tasknest_store_fs::{FsStore, StoreError};

/// Durable single-record storage used by [`crate::TaskService`].
///
/// The engine serializes its full state to one record; implementations
/// decide where that record lives.
pub trait StateStore {
    /// Store-specific error type.
    type Error: Into<anyhow::Error>;

    /// Read the durable record, `None` when no data exists yet.
    ///
    /// # Errors
    /// Propagates store-specific read failures.
    fn read_state(&self) -> Result<Option<PersistedState>, Self::Error>;

    /// Replace the durable record.
    ///
    /// # Errors
    /// Propagates store-specific write failures.
    fn write_state(&self, state: &PersistedState) -> Result<(), Self::Error>;
}

impl StateStore for FsStore {
    type Error = StoreError;

    fn read_state(&self) -> Result<Option<PersistedState>, Self::Error> {
        Self::read_state(self)
    }

    fn write_state(&self, state: &PersistedState) -> Result<(), Self::Error> {
        Self::write_state(self, state)
    }
}
