//! `stockbook-store` — the persistence collaborator boundary.
//!
//! The ledger never specifies a storage format; it requires only that
//! round-tripping through a store preserves every record field exactly.
//! This crate defines the trait and an in-memory implementation for
//! tests/dev.

pub mod in_memory;
pub mod r#trait;

pub use in_memory::InMemoryMovementStore;
pub use r#trait::{MovementStore, StoreError};
