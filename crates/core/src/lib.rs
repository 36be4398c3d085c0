//! `stockbook-core` — ledger foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! strongly-typed identifiers, the stock key, and the ledger error taxonomy.

pub mod error;
pub mod id;
pub mod key;

pub use error::{LedgerError, LedgerResult};
pub use id::{LocationId, MovementId, ProductId, ReferenceId, UserId, VariantId};
pub use key::StockKey;
