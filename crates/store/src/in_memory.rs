//! In-memory movement store.

use std::sync::RwLock;

use serde_json::Value as JsonValue;

use stockbook_movements::MovementRecord;

use super::r#trait::{MovementStore, StoreError};

/// In-memory store backed by serialized records.
///
/// Intended for tests/dev. Records are held as JSON values so the store
/// exercises the same serialization path a durable backend would, which is
/// what makes the round-trip tests meaningful.
#[derive(Debug, Default)]
pub struct InMemoryMovementStore {
    records: RwLock<Vec<JsonValue>>,
}

impl InMemoryMovementStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.read().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl MovementStore for InMemoryMovementStore {
    fn load_all(&self) -> Result<Vec<MovementRecord>, StoreError> {
        let records = self
            .records
            .read()
            .map_err(|_| StoreError::Load("store lock poisoned".to_string()))?;
        records
            .iter()
            .map(|value| {
                serde_json::from_value(value.clone())
                    .map_err(|e| StoreError::Corrupt(e.to_string()))
            })
            .collect()
    }

    fn persist(&self, record: &MovementRecord) -> Result<(), StoreError> {
        let value =
            serde_json::to_value(record).map_err(|e| StoreError::Persist(e.to_string()))?;
        let mut records = self
            .records
            .write()
            .map_err(|_| StoreError::Persist("store lock poisoned".to_string()))?;
        records.push(value);
        Ok(())
    }
}
