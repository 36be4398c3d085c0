//! Stock service: mutation operations, queries and analytics in one place.

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;

use stockbook_analytics::{
    HistoryPoint, MovementStats, RoundingPolicy, ValidationReport, history, last_movement, stats,
    validate, weighted_average_cost_rounded,
};
use stockbook_core::{LedgerError, MovementId, StockKey};
use stockbook_ledger::{ChainBreak, Ledger, MovementContext, SortOrder, StockMutator};
use stockbook_movements::{
    MetadataPatch, MovementFilter, MovementRecord, Reference,
};
use stockbook_store::{MovementStore, StoreError};

/// Service-level failure: either a ledger domain error or a persistence
/// failure.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Structured answer to an availability check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Availability {
    pub available: i64,
    pub requested: i64,
    pub sufficient: bool,
}

/// Caller-facing stock API.
///
/// Owns the ledger and its mutator; mutation results are written through to
/// the optional [`MovementStore`] once per successful append. The in-memory
/// ledger stays authoritative in-process: a persist failure is surfaced as
/// [`ServiceError::Store`] after the append took effect.
pub struct StockService {
    ledger: Arc<Ledger>,
    mutator: StockMutator,
    store: Option<Arc<dyn MovementStore>>,
    rounding: RoundingPolicy,
}

impl std::fmt::Debug for StockService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StockService")
            .field("ledger", &self.ledger)
            .field("mutator", &self.mutator)
            .field("store", &self.store.as_ref().map(|_| "dyn MovementStore"))
            .field("rounding", &self.rounding)
            .finish()
    }
}

impl StockService {
    /// Service over a fresh, empty ledger with no persistence.
    pub fn new() -> Self {
        let ledger = Arc::new(Ledger::new());
        Self {
            mutator: StockMutator::new(ledger.clone()),
            ledger,
            store: None,
            rounding: RoundingPolicy::default(),
        }
    }

    /// Attach a persistence collaborator. Subsequent mutations write
    /// through to it.
    pub fn with_store(mut self, store: Arc<dyn MovementStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Rounding policy applied to monetary aggregates (average cost).
    pub fn with_rounding(mut self, rounding: RoundingPolicy) -> Self {
        self.rounding = rounding;
        self
    }

    /// Rebuild a service from everything the store holds.
    ///
    /// Records are ordered by `created_at` before replay; a duplicate id in
    /// the stored set is surfaced, not skipped.
    pub fn rehydrate(store: Arc<dyn MovementStore>) -> Result<Self, ServiceError> {
        let mut records = store.load_all()?;
        records.sort_by_key(|r| r.created_at());

        let service = Self::new();
        for record in records {
            service.ledger.append(record)?;
        }
        tracing::info!(
            movements = service.ledger.len(),
            "ledger rehydrated from store"
        );
        Ok(service.with_store(store))
    }

    pub fn ledger(&self) -> &Arc<Ledger> {
        &self.ledger
    }

    /// Manual correction by a signed delta, with a mandatory reason.
    pub fn adjust_stock(
        &self,
        key: &StockKey,
        delta: i64,
        reason: impl Into<String>,
        context: MovementContext,
    ) -> Result<MovementRecord, ServiceError> {
        let record = self.mutator.adjust(key, delta, reason, context)?;
        self.persist(&record)?;
        Ok(record)
    }

    /// Stock in (inbound movement).
    pub fn add_stock(
        &self,
        key: &StockKey,
        quantity: i64,
        reference: Option<Reference>,
        cost_price: Option<i64>,
        context: MovementContext,
    ) -> Result<MovementRecord, ServiceError> {
        let record = self
            .mutator
            .receive(key, quantity, reference, cost_price, context)?;
        self.persist(&record)?;
        Ok(record)
    }

    /// Stock out (outbound movement).
    pub fn remove_stock(
        &self,
        key: &StockKey,
        quantity: i64,
        reference: Option<Reference>,
        context: MovementContext,
    ) -> Result<MovementRecord, ServiceError> {
        let record = self.mutator.issue(key, quantity, reference, context)?;
        self.persist(&record)?;
        Ok(record)
    }

    /// Metadata-only edit. Not written through: stores hold the append-only
    /// event set, and metadata edits never change quantities.
    pub fn edit_movement(
        &self,
        id: MovementId,
        patch: MetadataPatch,
    ) -> Result<MovementRecord, ServiceError> {
        Ok(self.mutator.edit_metadata(id, patch)?)
    }

    /// Metadata edit from an untyped JSON payload; quantity-affecting keys
    /// are rejected with `ImmutableField`.
    pub fn edit_movement_json(
        &self,
        id: MovementId,
        patch: &serde_json::Value,
    ) -> Result<MovementRecord, ServiceError> {
        Ok(self.mutator.edit_metadata_json(id, patch)?)
    }

    /// Can `requested` units be issued right now?
    pub fn check_availability(&self, key: &StockKey, requested: i64) -> Availability {
        let available = self.ledger.current_balance(key);
        Availability {
            available,
            requested,
            sufficient: requested >= 0 && available >= requested,
        }
    }

    /// Current balance; 0 for a never-seen key.
    pub fn current_stock(&self, key: &StockKey) -> i64 {
        self.ledger.current_balance(key)
    }

    /// Newest movements across all keys, newest first.
    pub fn recent_movements(&self, limit: usize) -> Vec<MovementRecord> {
        self.ledger.recent(limit)
    }

    /// Chronological history for one balance line.
    pub fn movement_history(&self, key: &StockKey, order: SortOrder) -> Vec<MovementRecord> {
        self.ledger.history_ordered(key, order)
    }

    pub fn movement(&self, id: MovementId) -> Option<MovementRecord> {
        self.ledger.get(id)
    }

    /// Statistics over the whole ledger or a filtered slice of it.
    pub fn stats(&self, filter: Option<&MovementFilter>) -> MovementStats {
        let records = match filter {
            Some(filter) => self.ledger.filter(filter),
            None => self.ledger.snapshot(),
        };
        stats(&records)
    }

    /// Balance timeline for one key, projected from ledger history.
    pub fn timeline(&self, key: &StockKey) -> Vec<HistoryPoint> {
        history(&self.ledger.history(key), key)
    }

    /// Weighted-average unit cost for one key, under the configured
    /// rounding policy. `None` when no costed inbound movements exist.
    pub fn average_cost(&self, key: &StockKey) -> Option<f64> {
        weighted_average_cost_rounded(&self.ledger.history(key), self.rounding)
    }

    /// Last movement for one key.
    pub fn last_movement(&self, key: &StockKey) -> Option<MovementRecord> {
        last_movement(&self.ledger.history(key), key)
    }

    /// Audit an imported batch before trusting it.
    pub fn audit(&self, records: &[MovementRecord]) -> ValidationReport {
        validate(records)
    }

    /// Administrative hard delete; see [`StockService::validate_chain`] for
    /// the resulting lineage diagnostics.
    pub fn remove_movement(&self, id: MovementId) -> bool {
        self.ledger.remove(id)
    }

    /// Lineage diagnostics for one key's chain.
    pub fn validate_chain(&self, key: &StockKey) -> Vec<ChainBreak> {
        self.ledger.validate_chain(key)
    }

    fn persist(&self, record: &MovementRecord) -> Result<(), ServiceError> {
        let Some(store) = &self.store else {
            return Ok(());
        };
        if let Err(err) = store.persist(record) {
            tracing::warn!(
                movement_id = %record.id(),
                error = %err,
                "movement appended but persist failed"
            );
            return Err(err.into());
        }
        Ok(())
    }
}

impl Default for StockService {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stockbook_core::ProductId;

    fn key(product: &str) -> StockKey {
        StockKey::product(ProductId::new(product).unwrap())
    }

    #[test]
    fn availability_reflects_balance_and_request() {
        let service = StockService::new();
        let key = key("P1");
        service
            .add_stock(&key, 5, None, None, MovementContext::default())
            .unwrap();

        assert_eq!(
            service.check_availability(&key, 5),
            Availability {
                available: 5,
                requested: 5,
                sufficient: true
            }
        );
        assert_eq!(
            service.check_availability(&key, 6),
            Availability {
                available: 5,
                requested: 6,
                sufficient: false
            }
        );
        assert!(!service.check_availability(&key, -1).sufficient);
    }

    #[test]
    fn stats_respect_the_filter_argument() {
        let service = StockService::new();
        let p1 = key("P1");
        let p2 = key("P2");
        service
            .add_stock(&p1, 5, None, None, MovementContext::default())
            .unwrap();
        service
            .add_stock(&p2, 9, None, None, MovementContext::default())
            .unwrap();

        assert_eq!(service.stats(None).total_movements, 2);
        let filter = MovementFilter::for_key(&p1);
        let filtered = service.stats(Some(&filter));
        assert_eq!(filtered.total_movements, 1);
        assert_eq!(filtered.total_inbound, 5);
    }

    #[test]
    fn timeline_matches_ledger_history_order() {
        let service = StockService::new();
        let key = key("P1");
        service
            .add_stock(&key, 10, None, None, MovementContext::default())
            .unwrap();
        service
            .remove_stock(&key, 4, None, MovementContext::default())
            .unwrap();

        let timeline = service.timeline(&key);
        let ledger_history = service.movement_history(&key, SortOrder::Ascending);
        assert_eq!(timeline.len(), ledger_history.len());
        for (point, record) in timeline.iter().zip(&ledger_history) {
            assert_eq!(point.movement.id(), record.id());
            assert_eq!(point.running_quantity, record.new_quantity());
        }
    }
}
