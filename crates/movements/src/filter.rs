//! Field-level filter predicate over movement records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockbook_core::{LocationId, ProductId, ReferenceId, StockKey, UserId, VariantId};

use crate::movement::{MovementRecord, MovementType, ReferenceType};

/// Constraint on a record's variant line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariantFilter {
    /// Any line of the product, bare or variant.
    #[default]
    Any,
    /// Only the bare-product line.
    Bare,
    /// Only the named variant line.
    Exactly(VariantId),
}

impl VariantFilter {
    fn matches(&self, variant_id: Option<&VariantId>) -> bool {
        match self {
            VariantFilter::Any => true,
            VariantFilter::Bare => variant_id.is_none(),
            VariantFilter::Exactly(wanted) => variant_id == Some(wanted),
        }
    }
}

/// Conjunctive filter: a record matches when every set field matches.
///
/// An unset field places no constraint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovementFilter {
    pub product_id: Option<ProductId>,
    pub variant: VariantFilter,
    pub movement_type: Option<MovementType>,
    pub reference_type: Option<ReferenceType>,
    pub reference_id: Option<ReferenceId>,
    pub user_id: Option<UserId>,
    pub location_id: Option<LocationId>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub min_quantity: Option<i64>,
    pub max_quantity: Option<i64>,
}

impl MovementFilter {
    /// Filter matching everything.
    pub fn any() -> Self {
        Self::default()
    }

    /// Filter for one product across all of its variant lines.
    pub fn for_product(product_id: ProductId) -> Self {
        Self {
            product_id: Some(product_id),
            ..Self::default()
        }
    }

    /// Filter for one exact balance line, the same set of records the
    /// ledger's `history` returns for the key.
    pub fn for_key(key: &StockKey) -> Self {
        let variant = match &key.variant_id {
            Some(variant_id) => VariantFilter::Exactly(variant_id.clone()),
            None => VariantFilter::Bare,
        };
        Self {
            product_id: Some(key.product_id.clone()),
            variant,
            ..Self::default()
        }
    }

    pub fn with_movement_type(mut self, movement_type: MovementType) -> Self {
        self.movement_type = Some(movement_type);
        self
    }

    pub fn with_reference_type(mut self, reference_type: ReferenceType) -> Self {
        self.reference_type = Some(reference_type);
        self
    }

    pub fn between(mut self, from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        self.from = Some(from);
        self.to = Some(to);
        self
    }

    /// Inclusive bounds on the signed movement quantity.
    pub fn quantity_range(mut self, min: i64, max: i64) -> Self {
        self.min_quantity = Some(min);
        self.max_quantity = Some(max);
        self
    }

    pub fn matches(&self, record: &MovementRecord) -> bool {
        if let Some(product_id) = &self.product_id {
            if record.product_id() != product_id {
                return false;
            }
        }
        if !self.variant.matches(record.variant_id()) {
            return false;
        }
        if let Some(movement_type) = self.movement_type {
            if record.movement_type() != movement_type {
                return false;
            }
        }
        if let Some(reference_type) = self.reference_type {
            if record.reference().map(|r| r.kind) != Some(reference_type) {
                return false;
            }
        }
        if let Some(reference_id) = &self.reference_id {
            if record.reference().map(|r| &r.id) != Some(reference_id) {
                return false;
            }
        }
        if let Some(user_id) = self.user_id {
            if record.actor().map(|a| a.user_id) != Some(user_id) {
                return false;
            }
        }
        if let Some(location_id) = &self.location_id {
            if record.location_id() != Some(location_id) {
                return false;
            }
        }
        if let Some(from) = self.from {
            if record.created_at() < from {
                return false;
            }
        }
        if let Some(to) = self.to {
            if record.created_at() > to {
                return false;
            }
        }
        if let Some(min) = self.min_quantity {
            if record.quantity() < min {
                return false;
            }
        }
        if let Some(max) = self.max_quantity {
            if record.quantity() > max {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::movement::{MovementRecord, NewMovement, Reference};
    use stockbook_core::MovementId;

    fn record(product: &str, quantity: i64, movement_type: MovementType) -> MovementRecord {
        MovementRecord::create(NewMovement {
            id: MovementId::new(),
            product_id: ProductId::new(product).unwrap(),
            variant_id: None,
            movement_type,
            quantity,
            previous_quantity: 100,
            reference: Some(Reference {
                id: ReferenceId::new("ORD-1").unwrap(),
                kind: ReferenceType::Order,
            }),
            adjustment_reason: None,
            actor: None,
            location_id: None,
            cost_price: None,
            notes: None,
            created_at: Utc::now(),
        })
        .unwrap()
    }

    fn variant_record(product: &str, variant: &str) -> MovementRecord {
        MovementRecord::create(NewMovement {
            id: MovementId::new(),
            product_id: ProductId::new(product).unwrap(),
            variant_id: Some(VariantId::new(variant).unwrap()),
            movement_type: MovementType::Inbound,
            quantity: 5,
            previous_quantity: 0,
            reference: None,
            adjustment_reason: None,
            actor: None,
            location_id: None,
            cost_price: None,
            notes: None,
            created_at: Utc::now(),
        })
        .unwrap()
    }

    #[test]
    fn unset_fields_place_no_constraint() {
        let r = record("P1", -5, MovementType::Outbound);
        assert!(MovementFilter::any().matches(&r));
    }

    #[test]
    fn key_filter_separates_bare_and_variant_lines() {
        let bare = record("P1", 5, MovementType::Inbound);
        let variant = variant_record("P1", "V1");

        let bare_key = MovementFilter::for_key(&StockKey::product(
            ProductId::new("P1").unwrap(),
        ));
        assert!(bare_key.matches(&bare));
        assert!(!bare_key.matches(&variant));

        let variant_key = MovementFilter::for_key(&StockKey::variant(
            ProductId::new("P1").unwrap(),
            VariantId::new("V1").unwrap(),
        ));
        assert!(!variant_key.matches(&bare));
        assert!(variant_key.matches(&variant));

        // The product-wide filter still spans both lines.
        let product_wide = MovementFilter::for_product(ProductId::new("P1").unwrap());
        assert!(product_wide.matches(&bare));
        assert!(product_wide.matches(&variant));
    }

    #[test]
    fn product_and_type_filters_conjoin() {
        let r = record("P1", -5, MovementType::Outbound);
        let f = MovementFilter::for_product(ProductId::new("P1").unwrap())
            .with_movement_type(MovementType::Outbound);
        assert!(f.matches(&r));

        let f = MovementFilter::for_product(ProductId::new("P1").unwrap())
            .with_movement_type(MovementType::Inbound);
        assert!(!f.matches(&r));
    }

    #[test]
    fn quantity_range_is_inclusive_and_signed() {
        let r = record("P1", -5, MovementType::Outbound);
        assert!(MovementFilter::any().quantity_range(-5, 0).matches(&r));
        assert!(!MovementFilter::any().quantity_range(-4, 0).matches(&r));
    }

    #[test]
    fn reference_filters_match_linked_event() {
        let r = record("P1", 5, MovementType::Inbound);
        let f = MovementFilter {
            reference_id: Some(ReferenceId::new("ORD-1").unwrap()),
            reference_type: Some(ReferenceType::Order),
            ..MovementFilter::default()
        };
        assert!(f.matches(&r));

        let f = MovementFilter {
            reference_type: Some(ReferenceType::Return),
            ..MovementFilter::default()
        };
        assert!(!f.matches(&r));
    }
}
