//! Ledger error taxonomy.
//!
//! Keep this focused on deterministic domain failures. `InsufficientStock`
//! and `InvalidQuantity` are expected, caller-recoverable conditions;
//! `DuplicateId` indicates a data-integrity problem for operators.

use thiserror::Error;

use crate::id::MovementId;

/// Result type used across the ledger layer.
pub type LedgerResult<T> = Result<T, LedgerError>;

/// Ledger-level error.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// A value failed validation (e.g. malformed or missing input).
    #[error("validation failed: {0}")]
    Validation(String),

    /// Zero or otherwise disallowed quantity passed to a mutation.
    #[error("invalid quantity: {0}")]
    InvalidQuantity(String),

    /// A mutation would drive a stock balance below zero. Never clamped.
    #[error("insufficient stock: requested {requested}, available {available}")]
    InsufficientStock { available: i64, requested: i64 },

    /// Attempt to change a quantity-affecting field through a metadata edit.
    #[error("immutable field: {0}")]
    ImmutableField(String),

    /// Append with a movement id already present in the ledger.
    #[error("duplicate movement id: {0}")]
    DuplicateId(MovementId),

    /// Lookup/update/remove by an unknown movement id.
    #[error("movement not found: {0}")]
    NotFound(MovementId),

    /// An identifier was invalid (e.g. parse failure, empty external id).
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// Internal ledger failure (e.g. poisoned lock). Operator-facing.
    #[error("ledger internal error: {0}")]
    Internal(String),
}

impl LedgerError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_quantity(msg: impl Into<String>) -> Self {
        Self::InvalidQuantity(msg.into())
    }

    pub fn insufficient_stock(available: i64, requested: i64) -> Self {
        Self::InsufficientStock {
            available,
            requested,
        }
    }

    pub fn immutable_field(field: impl Into<String>) -> Self {
        Self::ImmutableField(field.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}
