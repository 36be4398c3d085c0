//! Balance timeline projection for one stock key.

use chrono::{DateTime, Utc};
use serde::Serialize;

use stockbook_core::StockKey;
use stockbook_movements::MovementRecord;

/// One point on a key's balance timeline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryPoint {
    pub date: DateTime<Utc>,
    /// The balance after this movement. A projection of the record's
    /// `new_quantity`, not a recomputation.
    pub running_quantity: i64,
    pub movement: MovementRecord,
}

/// Project the timeline for `key` out of the given record set.
///
/// Filters to the exact balance line, sorts ascending by `created_at`
/// (stable, so ties keep their input order), and reports each record's own
/// `new_quantity` as the running balance at that point.
pub fn history(records: &[MovementRecord], key: &StockKey) -> Vec<HistoryPoint> {
    let mut line: Vec<&MovementRecord> = records.iter().filter(|r| r.key() == *key).collect();
    line.sort_by_key(|r| r.created_at());

    line.into_iter()
        .map(|record| HistoryPoint {
            date: record.created_at(),
            running_quantity: record.new_quantity(),
            movement: record.clone(),
        })
        .collect()
}

/// The chronologically last record for `key` **within the given set**.
///
/// If the caller passed a filtered subset this is the subset's last
/// movement, which is not necessarily the ledger's globally last record
/// for that key. Ties on `created_at` resolve to the later input position.
pub fn last_movement(records: &[MovementRecord], key: &StockKey) -> Option<MovementRecord> {
    records
        .iter()
        .filter(|r| r.key() == *key)
        .fold(None::<&MovementRecord>, |best, record| match best {
            Some(best) if best.created_at() > record.created_at() => Some(best),
            _ => Some(record),
        })
        .cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use stockbook_core::{MovementId, ProductId, VariantId};
    use stockbook_movements::{MovementType, NewMovement};

    fn key(product: &str) -> StockKey {
        StockKey::product(ProductId::new(product).unwrap())
    }

    fn record(
        product: &str,
        variant: Option<&str>,
        quantity: i64,
        previous: i64,
        created_at: DateTime<Utc>,
    ) -> MovementRecord {
        MovementRecord::create(NewMovement {
            id: MovementId::new(),
            product_id: ProductId::new(product).unwrap(),
            variant_id: variant.map(|v| VariantId::new(v).unwrap()),
            movement_type: if quantity > 0 {
                MovementType::Inbound
            } else {
                MovementType::Outbound
            },
            quantity,
            previous_quantity: previous,
            reference: None,
            adjustment_reason: None,
            actor: None,
            location_id: None,
            cost_price: None,
            notes: None,
            created_at,
        })
        .unwrap()
    }

    #[test]
    fn timeline_reports_new_quantity_in_order() {
        let t = Utc::now();
        // Deliberately shuffled input.
        let records = vec![
            record("P1", None, -4, 10, t + Duration::seconds(1)),
            record("P1", None, 10, 0, t),
            record("P2", None, 7, 0, t),
        ];

        let timeline = history(&records, &key("P1"));
        assert_eq!(timeline.len(), 2);
        assert_eq!(timeline[0].running_quantity, 10);
        assert_eq!(timeline[1].running_quantity, 6);
        assert!(timeline[0].date <= timeline[1].date);
    }

    #[test]
    fn variant_lines_are_excluded_from_the_bare_product_timeline() {
        let t = Utc::now();
        let records = vec![
            record("P1", None, 5, 0, t),
            record("P1", Some("V1"), 3, 0, t),
        ];
        let timeline = history(&records, &key("P1"));
        assert_eq!(timeline.len(), 1);
        assert_eq!(timeline[0].running_quantity, 5);
    }

    #[test]
    fn last_movement_is_subset_last_not_global_last() {
        let t = Utc::now();
        let early = record("P1", None, 10, 0, t);
        let late = record("P1", None, -4, 10, t + Duration::seconds(10));

        // Full set: the late record wins.
        let full = vec![early.clone(), late.clone()];
        assert_eq!(last_movement(&full, &key("P1")).unwrap().id(), late.id());

        // Filtered subset that excludes the late record: early wins.
        let subset = vec![early.clone()];
        assert_eq!(last_movement(&subset, &key("P1")).unwrap().id(), early.id());

        assert_eq!(last_movement(&full, &key("P9")), None);
    }
}
