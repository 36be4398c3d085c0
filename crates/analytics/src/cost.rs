//! Weighted-average cost basis.

use serde::{Deserialize, Serialize};

use stockbook_movements::MovementRecord;

/// Rounding applied to monetary aggregates.
///
/// The ratio itself is always computed exactly first; the policy is an
/// explicit configuration choice applied last, at whole-minor-unit
/// precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundingPolicy {
    /// Leave the exact ratio untouched.
    #[default]
    Unrounded,
    /// Round half away from zero to the nearest minor unit.
    HalfUp,
    /// Round up to the next minor unit.
    Ceil,
    /// Round down to the previous minor unit.
    Floor,
}

impl RoundingPolicy {
    pub fn apply(&self, value: f64) -> f64 {
        match self {
            RoundingPolicy::Unrounded => value,
            RoundingPolicy::HalfUp => value.round(),
            RoundingPolicy::Ceil => value.ceil(),
            RoundingPolicy::Floor => value.floor(),
        }
    }
}

/// Quantity-weighted mean unit cost across costed inbound movements:
/// `sum(quantity_i * cost_i) / sum(quantity_i)` over records with
/// `quantity > 0` and a cost price.
///
/// `None` when no such records exist — not zero, which would falsely claim
/// a known cost of 0.
pub fn weighted_average_cost(records: &[MovementRecord]) -> Option<f64> {
    let mut weighted_sum = 0i64;
    let mut quantity_sum = 0i64;

    for record in records {
        if record.quantity() <= 0 {
            continue;
        }
        let Some(cost) = record.cost_price() else {
            continue;
        };
        // Saturate like `total_value` does, so one extreme imported record
        // cannot panic an aggregate over otherwise sane history.
        weighted_sum = weighted_sum.saturating_add(record.quantity().saturating_mul(cost));
        quantity_sum += record.quantity();
    }

    (quantity_sum > 0).then(|| weighted_sum as f64 / quantity_sum as f64)
}

/// [`weighted_average_cost`] with an explicit rounding policy applied.
pub fn weighted_average_cost_rounded(
    records: &[MovementRecord],
    policy: RoundingPolicy,
) -> Option<f64> {
    weighted_average_cost(records).map(|cost| policy.apply(cost))
}
