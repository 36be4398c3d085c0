//! `stockbook-service` — the caller-facing stock API.
//!
//! Wires the ledger, mutator, analytics and the persistence boundary into
//! one service for UI/service layers to consume. No transport concerns.

pub mod service;

pub use service::{Availability, ServiceError, StockService};
