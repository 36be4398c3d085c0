//! Aggregate statistics over a record set.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::Serialize;

use stockbook_movements::{MovementRecord, MovementType, ReferenceType};

/// Movement count for one UTC calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DayCount {
    pub date: NaiveDate,
    pub count: usize,
}

/// Aggregate view of a record set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MovementStats {
    pub total_movements: usize,
    /// Sum of absolute quantity over inbound (positive) records.
    pub total_inbound: i64,
    /// Sum of absolute quantity over outbound (negative) records.
    pub total_outbound: i64,
    /// Count of records with movement type `Adjustment`.
    pub total_adjustments: usize,
    /// Signed sum of all quantities.
    pub net_quantity_change: i64,
    /// Sum of `total_value` across the set.
    pub total_value_change: i64,
    pub by_movement_type: HashMap<MovementType, usize>,
    pub by_reference_type: HashMap<ReferenceType, usize>,
    /// `total_movements / distinct UTC days present`; 0 for an empty set.
    pub daily_average: f64,
    /// The UTC day with the most movements; ties go to the day first
    /// encountered in the input.
    pub busiest_day: Option<DayCount>,
}

/// Compute statistics over the given records.
pub fn stats(records: &[MovementRecord]) -> MovementStats {
    let mut total_inbound = 0i64;
    let mut total_outbound = 0i64;
    let mut total_adjustments = 0usize;
    let mut net_quantity_change = 0i64;
    let mut total_value_change = 0i64;
    let mut by_movement_type: HashMap<MovementType, usize> = HashMap::new();
    let mut by_reference_type: HashMap<ReferenceType, usize> = HashMap::new();

    let mut day_counts: HashMap<NaiveDate, usize> = HashMap::new();
    let mut day_order: Vec<NaiveDate> = Vec::new();

    for record in records {
        let quantity = record.quantity();
        if quantity > 0 {
            total_inbound += quantity;
        } else {
            total_outbound += quantity.abs();
        }
        if record.movement_type() == MovementType::Adjustment {
            total_adjustments += 1;
        }
        net_quantity_change += quantity;
        total_value_change += record.total_value();

        *by_movement_type.entry(record.movement_type()).or_default() += 1;
        if let Some(reference) = record.reference() {
            *by_reference_type.entry(reference.kind).or_default() += 1;
        }

        let day = record.created_at().date_naive();
        let count = day_counts.entry(day).or_insert(0);
        if *count == 0 {
            day_order.push(day);
        }
        *count += 1;
    }

    let daily_average = if day_order.is_empty() {
        0.0
    } else {
        records.len() as f64 / day_order.len() as f64
    };

    // Strict greater-than keeps the first-encountered day on ties.
    let busiest_day = day_order
        .iter()
        .fold(None::<DayCount>, |best, day| {
            let count = day_counts[day];
            match best {
                Some(best) if best.count >= count => Some(best),
                _ => Some(DayCount { date: *day, count }),
            }
        });

    MovementStats {
        total_movements: records.len(),
        total_inbound,
        total_outbound,
        total_adjustments,
        net_quantity_change,
        total_value_change,
        by_movement_type,
        by_reference_type,
        daily_average,
        busiest_day,
    }
}
