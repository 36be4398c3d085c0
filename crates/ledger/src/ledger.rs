//! Append-only, indexed store of movement records.

use std::collections::HashMap;
use std::sync::RwLock;

use stockbook_core::{LedgerError, LedgerResult, MovementId, StockKey};
use stockbook_movements::{MetadataPatch, MovementFilter, MovementRecord};

use crate::chain::{self, ChainBreak};

/// Read direction for history queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

#[derive(Debug, Default)]
struct LedgerInner {
    /// Primary index.
    by_id: HashMap<MovementId, MovementRecord>,
    /// Per-key ids, ordered by `created_at` (ties by insertion order).
    by_key: HashMap<StockKey, Vec<MovementId>>,
    /// Global ids in the same chronological order.
    order: Vec<MovementId>,
}

/// Append-only ledger of movement records.
///
/// Both indexes are updated under one write lock, so a reader can never
/// observe a record in one index and not the other. The ledger trusts its
/// caller on quantity semantics (that is the mutator's job) but rejects
/// duplicate ids.
///
/// All queries on an unknown key return empty/zero: absence is a valid
/// state, not a failure.
#[derive(Debug, Default)]
pub struct Ledger {
    inner: RwLock<LedgerInner>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record into both indexes.
    ///
    /// Records are kept in `created_at` order per key and globally; a
    /// record timestamped between existing ones (rehydration of imported
    /// history) is placed accordingly, ties keep insertion order.
    pub fn append(&self, record: MovementRecord) -> LedgerResult<MovementRecord> {
        let mut inner = self
            .inner
            .write()
            .map_err(|_| LedgerError::internal("ledger lock poisoned"))?;
        let LedgerInner {
            by_id,
            by_key,
            order,
        } = &mut *inner;

        let id = record.id();
        if by_id.contains_key(&id) {
            return Err(LedgerError::DuplicateId(id));
        }

        let created_at = record.created_at();
        let key_list = by_key.entry(record.key()).or_default();
        let key_pos = key_list.partition_point(|other| by_id[other].created_at() <= created_at);
        key_list.insert(key_pos, id);

        let global_pos = order.partition_point(|other| by_id[other].created_at() <= created_at);
        order.insert(global_pos, id);

        by_id.insert(id, record.clone());
        Ok(record)
    }

    /// Look up one record by id.
    pub fn get(&self, id: MovementId) -> Option<MovementRecord> {
        let inner = self.inner.read().ok()?;
        inner.by_id.get(&id).cloned()
    }

    /// Chronological history for one balance line.
    pub fn history(&self, key: &StockKey) -> Vec<MovementRecord> {
        self.history_ordered(key, SortOrder::Ascending)
    }

    /// History for one balance line in the requested direction.
    pub fn history_ordered(&self, key: &StockKey, order: SortOrder) -> Vec<MovementRecord> {
        let Ok(inner) = self.inner.read() else {
            return Vec::new();
        };
        let Some(ids) = inner.by_key.get(key) else {
            return Vec::new();
        };
        let mut records: Vec<MovementRecord> =
            ids.iter().map(|id| inner.by_id[id].clone()).collect();
        if order == SortOrder::Descending {
            records.reverse();
        }
        records
    }

    /// Current balance for one line: the `new_quantity` of its last record,
    /// or 0 when the key has never been seen.
    pub fn current_balance(&self, key: &StockKey) -> i64 {
        let Ok(inner) = self.inner.read() else {
            return 0;
        };
        inner
            .by_key
            .get(key)
            .and_then(|ids| ids.last())
            .map(|id| inner.by_id[id].new_quantity())
            .unwrap_or(0)
    }

    /// Administrative hard delete. Returns `false` for an unknown id.
    ///
    /// Removing a record that is not the most recent for its key leaves the
    /// chain lineage broken; [`Ledger::validate_chain`] surfaces that rather
    /// than renumbering anything.
    pub fn remove(&self, id: MovementId) -> bool {
        let Ok(mut inner) = self.inner.write() else {
            return false;
        };
        let Some(record) = inner.by_id.remove(&id) else {
            return false;
        };

        let key = record.key();
        if let Some(ids) = inner.by_key.get_mut(&key) {
            ids.retain(|other| *other != id);
            if ids.is_empty() {
                inner.by_key.remove(&key);
            }
        }
        inner.order.retain(|other| *other != id);

        tracing::warn!(%key, movement_id = %id, "movement removed by admin correction");
        true
    }

    /// Replace a record's metadata, leaving its quantities and position
    /// untouched. Stamps `updated_at = now`.
    pub fn edit_metadata(
        &self,
        id: MovementId,
        patch: MetadataPatch,
        now: chrono::DateTime<chrono::Utc>,
    ) -> LedgerResult<MovementRecord> {
        let mut inner = self
            .inner
            .write()
            .map_err(|_| LedgerError::internal("ledger lock poisoned"))?;
        let record = inner.by_id.get(&id).ok_or(LedgerError::NotFound(id))?;
        let edited = record.with_metadata(patch, now);
        inner.by_id.insert(id, edited.clone());
        Ok(edited)
    }

    /// All records matching the filter, in global chronological order.
    pub fn filter(&self, filter: &MovementFilter) -> Vec<MovementRecord> {
        let Ok(inner) = self.inner.read() else {
            return Vec::new();
        };
        inner
            .order
            .iter()
            .map(|id| &inner.by_id[id])
            .filter(|record| filter.matches(record))
            .cloned()
            .collect()
    }

    /// Every record, global chronological order.
    pub fn snapshot(&self) -> Vec<MovementRecord> {
        self.filter(&MovementFilter::any())
    }

    /// The most recent `limit` records across all keys, newest first.
    pub fn recent(&self, limit: usize) -> Vec<MovementRecord> {
        let Ok(inner) = self.inner.read() else {
            return Vec::new();
        };
        inner
            .order
            .iter()
            .rev()
            .take(limit)
            .map(|id| inner.by_id[id].clone())
            .collect()
    }

    /// Every balance line the ledger has seen.
    pub fn keys(&self) -> Vec<StockKey> {
        let Ok(inner) = self.inner.read() else {
            return Vec::new();
        };
        inner.by_key.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.inner.read().map(|inner| inner.by_id.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Walk one key's chain and report every lineage break.
    pub fn validate_chain(&self, key: &StockKey) -> Vec<ChainBreak> {
        chain::find_breaks(&self.history(key))
    }
}
