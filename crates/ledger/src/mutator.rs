//! The single choke point for creating movement records.
//!
//! Every mutation runs its read-balance → validate → append sequence under
//! a per-key critical section, so two concurrent mutations on the same key
//! can never both observe the same previous balance and both pass a
//! negative-balance check. Different keys never block each other.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::Utc;

use stockbook_core::{LedgerError, LedgerResult, LocationId, MovementId, StockKey};
use stockbook_movements::{
    Actor, MetadataPatch, MovementRecord, MovementType, NewMovement, Reference,
};

use crate::ledger::Ledger;

/// Optional context attached to a mutation (who, where, free-form notes).
#[derive(Debug, Clone, Default)]
pub struct MovementContext {
    pub actor: Option<Actor>,
    pub location_id: Option<LocationId>,
    pub notes: Option<String>,
}

/// Creates movement records against a shared [`Ledger`], enforcing
/// conservation and non-negativity.
#[derive(Debug)]
pub struct StockMutator {
    ledger: Arc<Ledger>,
    key_locks: Mutex<HashMap<StockKey, Arc<Mutex<()>>>>,
}

impl StockMutator {
    pub fn new(ledger: Arc<Ledger>) -> Self {
        Self {
            ledger,
            key_locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn ledger(&self) -> &Arc<Ledger> {
        &self.ledger
    }

    /// Manual stock correction by a signed delta. `reason` is mandatory:
    /// an adjustment with no linked business event must say why.
    pub fn adjust(
        &self,
        key: &StockKey,
        delta: i64,
        reason: impl Into<String>,
        context: MovementContext,
    ) -> LedgerResult<MovementRecord> {
        if delta == 0 {
            return Err(LedgerError::invalid_quantity(
                "adjustment delta cannot be zero",
            ));
        }
        self.mutate(
            key,
            MovementType::Adjustment,
            delta,
            None,
            Some(reason.into()),
            None,
            context,
        )
    }

    /// Stock in. `quantity` must be positive; a `cost_price` (minor units
    /// per unit) makes the movement participate in weighted-average cost.
    pub fn receive(
        &self,
        key: &StockKey,
        quantity: i64,
        reference: Option<Reference>,
        cost_price: Option<i64>,
        context: MovementContext,
    ) -> LedgerResult<MovementRecord> {
        if quantity <= 0 {
            return Err(LedgerError::invalid_quantity(format!(
                "receive quantity must be positive, got {quantity}"
            )));
        }
        self.mutate(
            key,
            MovementType::Inbound,
            quantity,
            reference,
            None,
            cost_price,
            context,
        )
    }

    /// Stock out. Fails with `InsufficientStock` when the balance cannot
    /// cover the request; issuing exactly the available balance succeeds
    /// and drives it to 0.
    pub fn issue(
        &self,
        key: &StockKey,
        quantity: i64,
        reference: Option<Reference>,
        context: MovementContext,
    ) -> LedgerResult<MovementRecord> {
        if quantity <= 0 {
            return Err(LedgerError::invalid_quantity(format!(
                "issue quantity must be positive, got {quantity}"
            )));
        }
        self.mutate(
            key,
            MovementType::Outbound,
            -quantity,
            reference,
            None,
            None,
            context,
        )
    }

    /// Metadata-only edit of an existing record. The patch cannot express
    /// quantity changes by shape; see [`StockMutator::edit_metadata_json`]
    /// for the untyped path.
    pub fn edit_metadata(
        &self,
        id: MovementId,
        patch: MetadataPatch,
    ) -> LedgerResult<MovementRecord> {
        self.ledger.edit_metadata(id, patch, Utc::now())
    }

    /// Metadata edit from an untyped JSON payload. Rejects any
    /// quantity-affecting key with `ImmutableField` before touching the
    /// ledger.
    pub fn edit_metadata_json(
        &self,
        id: MovementId,
        patch: &serde_json::Value,
    ) -> LedgerResult<MovementRecord> {
        let patch = MetadataPatch::from_json(patch)?;
        self.edit_metadata(id, patch)
    }

    #[allow(clippy::too_many_arguments)]
    fn mutate(
        &self,
        key: &StockKey,
        movement_type: MovementType,
        quantity: i64,
        reference: Option<Reference>,
        adjustment_reason: Option<String>,
        cost_price: Option<i64>,
        context: MovementContext,
    ) -> LedgerResult<MovementRecord> {
        let guard = self.key_guard(key)?;
        let _held = guard
            .lock()
            .map_err(|_| LedgerError::internal("stock key lock poisoned"))?;

        let previous = self.ledger.current_balance(key);
        if previous + quantity < 0 {
            tracing::warn!(
                %key,
                available = previous,
                requested = -quantity,
                "mutation rejected: insufficient stock"
            );
            return Err(LedgerError::insufficient_stock(previous, -quantity));
        }

        let record = MovementRecord::create(NewMovement {
            id: MovementId::new(),
            product_id: key.product_id.clone(),
            variant_id: key.variant_id.clone(),
            movement_type,
            quantity,
            previous_quantity: previous,
            reference,
            adjustment_reason,
            actor: context.actor,
            location_id: context.location_id,
            cost_price,
            notes: context.notes,
            created_at: Utc::now(),
        })?;

        let record = self.ledger.append(record)?;
        tracing::info!(
            %key,
            movement_type = %movement_type,
            quantity,
            balance = record.new_quantity(),
            "movement appended"
        );
        Ok(record)
    }

    fn key_guard(&self, key: &StockKey) -> LedgerResult<Arc<Mutex<()>>> {
        let mut locks = self
            .key_locks
            .lock()
            .map_err(|_| LedgerError::internal("key lock registry poisoned"))?;
        Ok(locks.entry(key.clone()).or_default().clone())
    }
}
