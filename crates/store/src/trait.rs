//! Movement persistence boundary.

use std::sync::Arc;

use thiserror::Error;

use stockbook_movements::MovementRecord;

/// Store operation error. These are infrastructure failures, distinct from
/// ledger domain errors.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("persist failed: {0}")]
    Persist(String),

    #[error("load failed: {0}")]
    Load(String),

    #[error("corrupt record: {0}")]
    Corrupt(String),
}

/// Durable movement storage.
///
/// Implementations make no ordering promises of their own; the ledger
/// re-sorts on rehydration. The single contract is exact round-tripping:
/// `load_all` after `persist` reconstructs every record field-for-field.
pub trait MovementStore: Send + Sync {
    /// Load every persisted record (process startup / rehydration).
    fn load_all(&self) -> Result<Vec<MovementRecord>, StoreError>;

    /// Persist one record. Called once per successful append.
    fn persist(&self, record: &MovementRecord) -> Result<(), StoreError>;
}

impl<S> MovementStore for Arc<S>
where
    S: MovementStore + ?Sized,
{
    fn load_all(&self) -> Result<Vec<MovementRecord>, StoreError> {
        (**self).load_all()
    }

    fn persist(&self, record: &MovementRecord) -> Result<(), StoreError> {
        (**self).persist(record)
    }
}
