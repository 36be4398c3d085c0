//! `stockbook-analytics` — read-side aggregation over movement records.
//!
//! Every operation here is a total, referentially transparent function over
//! whatever record slice it is given (typically a ledger `filter` output).
//! Nothing mutates, nothing fails on well-formed input; malformed imported
//! records are caught by [`validate`], not by throwing during aggregation.

pub mod cost;
pub mod history;
pub mod stats;
pub mod validate;

pub use cost::{RoundingPolicy, weighted_average_cost, weighted_average_cost_rounded};
pub use history::{HistoryPoint, history, last_movement};
pub use stats::{DayCount, MovementStats, stats};
pub use validate::{InvalidRecord, ValidationReport, validate};
