//! `stockbook-ledger` — the append-only movement ledger and its single
//! mutation choke point.
//!
//! The [`Ledger`] holds immutable movement records behind two consistent
//! indexes; the [`StockMutator`] is the only component that creates new
//! records, enforcing non-negative balances atomically per stock key.

pub mod chain;
pub mod ledger;
pub mod mutator;

pub use chain::ChainBreak;
pub use ledger::{Ledger, SortOrder};
pub use mutator::{MovementContext, StockMutator};
