//! The immutable movement record and its vocabulary types.

use chrono::{DateTime, Utc};
use core::str::FromStr;
use serde::{Deserialize, Serialize};

use stockbook_core::{
    LedgerError, LedgerResult, LocationId, MovementId, ProductId, ReferenceId, StockKey, UserId,
    VariantId,
};

/// Kind of stock movement. The sign of `quantity` encodes direction;
/// the kind records the business meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MovementType {
    Inbound,
    Outbound,
    Adjustment,
    Transfer,
    Reservation,
    Release,
    Count,
    Damaged,
    Expired,
}

impl MovementType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MovementType::Inbound => "inbound",
            MovementType::Outbound => "outbound",
            MovementType::Adjustment => "adjustment",
            MovementType::Transfer => "transfer",
            MovementType::Reservation => "reservation",
            MovementType::Release => "release",
            MovementType::Count => "count",
            MovementType::Damaged => "damaged",
            MovementType::Expired => "expired",
        }
    }
}

impl core::fmt::Display for MovementType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MovementType {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "inbound" => Ok(MovementType::Inbound),
            "outbound" => Ok(MovementType::Outbound),
            "adjustment" => Ok(MovementType::Adjustment),
            "transfer" => Ok(MovementType::Transfer),
            "reservation" => Ok(MovementType::Reservation),
            "release" => Ok(MovementType::Release),
            "count" => Ok(MovementType::Count),
            "damaged" => Ok(MovementType::Damaged),
            "expired" => Ok(MovementType::Expired),
            other => Err(LedgerError::validation(format!(
                "unknown movement type: {other}"
            ))),
        }
    }
}

/// Kind of business event a movement references.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceType {
    Order,
    Transfer,
    Adjustment,
    Count,
    PurchaseOrder,
    Return,
    Damage,
    Expiry,
}

impl ReferenceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReferenceType::Order => "order",
            ReferenceType::Transfer => "transfer",
            ReferenceType::Adjustment => "adjustment",
            ReferenceType::Count => "count",
            ReferenceType::PurchaseOrder => "purchase_order",
            ReferenceType::Return => "return",
            ReferenceType::Damage => "damage",
            ReferenceType::Expiry => "expiry",
        }
    }
}

impl core::fmt::Display for ReferenceType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReferenceType {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "order" => Ok(ReferenceType::Order),
            "transfer" => Ok(ReferenceType::Transfer),
            "adjustment" => Ok(ReferenceType::Adjustment),
            "count" => Ok(ReferenceType::Count),
            "purchase_order" => Ok(ReferenceType::PurchaseOrder),
            "return" => Ok(ReferenceType::Return),
            "damage" => Ok(ReferenceType::Damage),
            "expiry" => Ok(ReferenceType::Expiry),
            other => Err(LedgerError::validation(format!(
                "unknown reference type: {other}"
            ))),
        }
    }
}

/// Link to the business event that caused a movement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    pub id: ReferenceId,
    pub kind: ReferenceType,
}

/// Who performed the movement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub user_id: UserId,
    pub user_name: Option<String>,
}

/// Everything needed to create a movement record.
///
/// `new_quantity` and `total_value` are derived during creation, never
/// supplied by the caller.
#[derive(Debug, Clone)]
pub struct NewMovement {
    pub id: MovementId,
    pub product_id: ProductId,
    pub variant_id: Option<VariantId>,
    pub movement_type: MovementType,
    pub quantity: i64,
    pub previous_quantity: i64,
    pub reference: Option<Reference>,
    pub adjustment_reason: Option<String>,
    pub actor: Option<Actor>,
    pub location_id: Option<LocationId>,
    /// Unit cost in smallest currency unit (e.g. cents).
    pub cost_price: Option<i64>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// One immutable inventory event.
///
/// Quantity fields are private: once a record exists, nothing can change
/// `quantity`, `previous_quantity` or `new_quantity`. Metadata edits go
/// through [`MovementRecord::with_metadata`], which stamps `updated_at`
/// and cannot express quantity changes by shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovementRecord {
    id: MovementId,
    product_id: ProductId,
    variant_id: Option<VariantId>,
    movement_type: MovementType,
    /// Signed: positive increases stock, negative decreases it.
    quantity: i64,
    previous_quantity: i64,
    new_quantity: i64,
    reference: Option<Reference>,
    adjustment_reason: Option<String>,
    actor: Option<Actor>,
    location_id: Option<LocationId>,
    cost_price: Option<i64>,
    /// `|quantity| * cost_price` when a cost is present, else 0.
    total_value: i64,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
}

impl MovementRecord {
    /// Create a record, enforcing the record invariants:
    ///
    /// - `quantity != 0`
    /// - `previous_quantity >= 0` and the derived `new_quantity >= 0`
    /// - an adjustment without a reference must carry a reason
    ///
    /// A violating record is rejected here, never stored then flagged.
    pub fn create(new: NewMovement) -> LedgerResult<Self> {
        if new.quantity == 0 {
            return Err(LedgerError::invalid_quantity(
                "movement quantity cannot be zero",
            ));
        }
        if new.previous_quantity < 0 {
            return Err(LedgerError::invalid_quantity(format!(
                "previous quantity cannot be negative: {}",
                new.previous_quantity
            )));
        }
        let new_quantity = new.previous_quantity + new.quantity;
        if new_quantity < 0 {
            return Err(LedgerError::insufficient_stock(
                new.previous_quantity,
                -new.quantity,
            ));
        }
        if let Some(cost) = new.cost_price {
            if cost < 0 {
                return Err(LedgerError::validation(format!(
                    "cost price cannot be negative: {cost}"
                )));
            }
        }
        if new.movement_type == MovementType::Adjustment
            && new.reference.is_none()
            && new
                .adjustment_reason
                .as_deref()
                .is_none_or(|r| r.trim().is_empty())
        {
            return Err(LedgerError::validation(
                "adjustment without a reference requires a reason",
            ));
        }

        let total_value = new
            .cost_price
            .map(|cost| new.quantity.abs().saturating_mul(cost))
            .unwrap_or(0);

        Ok(Self {
            id: new.id,
            product_id: new.product_id,
            variant_id: new.variant_id,
            movement_type: new.movement_type,
            quantity: new.quantity,
            previous_quantity: new.previous_quantity,
            new_quantity,
            reference: new.reference,
            adjustment_reason: new.adjustment_reason,
            actor: new.actor,
            location_id: new.location_id,
            cost_price: new.cost_price,
            total_value,
            notes: new.notes,
            created_at: new.created_at,
            updated_at: None,
        })
    }

    pub fn id(&self) -> MovementId {
        self.id
    }

    pub fn product_id(&self) -> &ProductId {
        &self.product_id
    }

    pub fn variant_id(&self) -> Option<&VariantId> {
        self.variant_id.as_ref()
    }

    /// The balance line this record belongs to.
    pub fn key(&self) -> StockKey {
        StockKey::new(self.product_id.clone(), self.variant_id.clone())
    }

    pub fn movement_type(&self) -> MovementType {
        self.movement_type
    }

    pub fn quantity(&self) -> i64 {
        self.quantity
    }

    pub fn previous_quantity(&self) -> i64 {
        self.previous_quantity
    }

    pub fn new_quantity(&self) -> i64 {
        self.new_quantity
    }

    pub fn reference(&self) -> Option<&Reference> {
        self.reference.as_ref()
    }

    pub fn adjustment_reason(&self) -> Option<&str> {
        self.adjustment_reason.as_deref()
    }

    pub fn actor(&self) -> Option<&Actor> {
        self.actor.as_ref()
    }

    pub fn location_id(&self) -> Option<&LocationId> {
        self.location_id.as_ref()
    }

    pub fn cost_price(&self) -> Option<i64> {
        self.cost_price
    }

    pub fn total_value(&self) -> i64 {
        self.total_value
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }

    pub fn is_inbound(&self) -> bool {
        self.quantity > 0
    }

    pub fn is_outbound(&self) -> bool {
        self.quantity < 0
    }

    /// Apply a metadata-only patch, returning the edited record.
    ///
    /// Quantity fields are untouched by construction; `updated_at` is set to
    /// `now`. `created_at` never changes.
    pub fn with_metadata(&self, patch: MetadataPatch, now: DateTime<Utc>) -> Self {
        let mut edited = self.clone();
        if let Some(notes) = patch.notes {
            edited.notes = Some(notes);
        }
        if let Some(reason) = patch.adjustment_reason {
            edited.adjustment_reason = Some(reason);
        }
        if let Some(actor) = patch.actor {
            edited.actor = Some(actor);
        }
        if let Some(location_id) = patch.location_id {
            edited.location_id = Some(location_id);
        }
        edited.updated_at = Some(now);
        edited
    }

    /// Audit this record against the record invariants.
    ///
    /// Used for externally-imported batches, which bypass [`Self::create`]
    /// via deserialization. Returns every violation, not just the first.
    pub fn violations(&self) -> Vec<RecordViolation> {
        let mut found = Vec::new();
        if self.product_id.as_str().trim().is_empty() {
            found.push(RecordViolation::EmptyProductId);
        }
        if self.quantity == 0 {
            found.push(RecordViolation::ZeroQuantity);
        }
        if self.previous_quantity < 0 {
            found.push(RecordViolation::NegativePreviousQuantity);
        }
        if self.new_quantity < 0 {
            found.push(RecordViolation::NegativeNewQuantity);
        }
        if self.new_quantity != self.previous_quantity + self.quantity {
            found.push(RecordViolation::ConservationMismatch);
        }
        found
    }
}

/// A single named violation of the record invariants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[serde(rename_all = "snake_case")]
pub enum RecordViolation {
    #[error("product id is empty")]
    EmptyProductId,
    #[error("quantity is zero")]
    ZeroQuantity,
    #[error("previous quantity is negative")]
    NegativePreviousQuantity,
    #[error("new quantity is negative")]
    NegativeNewQuantity,
    #[error("new quantity does not equal previous quantity plus quantity")]
    ConservationMismatch,
}

/// Metadata-only edit. Cannot express quantity changes by shape.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataPatch {
    pub notes: Option<String>,
    pub adjustment_reason: Option<String>,
    pub actor: Option<Actor>,
    pub location_id: Option<LocationId>,
}

impl MetadataPatch {
    /// Build a patch from an untyped JSON object (API edit payloads).
    ///
    /// Any attempt to patch a quantity-affecting or identity field is
    /// rejected with `ImmutableField`; unknown fields are a validation error.
    pub fn from_json(value: &serde_json::Value) -> LedgerResult<Self> {
        const IMMUTABLE: &[&str] = &[
            "id",
            "productId",
            "variantId",
            "movementType",
            "quantity",
            "previousQuantity",
            "newQuantity",
            "referenceId",
            "referenceType",
            "costPrice",
            "totalValue",
            "createdAt",
            "updatedAt",
        ];

        let object = value
            .as_object()
            .ok_or_else(|| LedgerError::validation("metadata patch must be a JSON object"))?;

        for key in object.keys() {
            if IMMUTABLE.contains(&key.as_str()) {
                return Err(LedgerError::immutable_field(key.clone()));
            }
        }

        let mut patch = MetadataPatch::default();
        let mut user_id: Option<UserId> = None;
        let mut user_name: Option<String> = None;

        for (key, field) in object {
            match key.as_str() {
                "notes" => {
                    patch.notes = Some(expect_string(field, "notes")?);
                }
                "adjustmentReason" => {
                    patch.adjustment_reason = Some(expect_string(field, "adjustmentReason")?);
                }
                "locationId" => {
                    patch.location_id = Some(LocationId::new(expect_string(field, "locationId")?)?);
                }
                "userId" => {
                    let raw = expect_string(field, "userId")?;
                    user_id = Some(raw.parse()?);
                }
                "userName" => {
                    user_name = Some(expect_string(field, "userName")?);
                }
                other => {
                    return Err(LedgerError::validation(format!(
                        "unknown metadata field: {other}"
                    )));
                }
            }
        }

        match (user_id, user_name) {
            (Some(user_id), user_name) => patch.actor = Some(Actor { user_id, user_name }),
            (None, Some(_)) => {
                return Err(LedgerError::validation(
                    "userName requires a userId in the same patch",
                ));
            }
            (None, None) => {}
        }

        Ok(patch)
    }
}

fn expect_string(value: &serde_json::Value, field: &str) -> LedgerResult<String> {
    value
        .as_str()
        .map(str::to_owned)
        .ok_or_else(|| LedgerError::validation(format!("{field} must be a string")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn test_new(quantity: i64, previous: i64) -> NewMovement {
        NewMovement {
            id: MovementId::new(),
            product_id: ProductId::new("P1").unwrap(),
            variant_id: None,
            movement_type: if quantity >= 0 {
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
            created_at: Utc::now(),
        }
    }

    #[test]
    fn create_derives_new_quantity_and_total_value() {
        let mut new = test_new(10, 0);
        new.cost_price = Some(100);
        let record = MovementRecord::create(new).unwrap();
        assert_eq!(record.previous_quantity(), 0);
        assert_eq!(record.new_quantity(), 10);
        assert_eq!(record.total_value(), 1000);
        assert_eq!(record.updated_at(), None);
    }

    #[test]
    fn zero_quantity_is_rejected() {
        let err = MovementRecord::create(test_new(0, 5)).unwrap_err();
        assert!(matches!(err, LedgerError::InvalidQuantity(_)));
    }

    #[test]
    fn negative_result_is_insufficient_stock() {
        let err = MovementRecord::create(test_new(-10, 3)).unwrap_err();
        assert_eq!(
            err,
            LedgerError::InsufficientStock {
                available: 3,
                requested: 10
            }
        );
    }

    #[test]
    fn zero_cost_price_is_free_stock() {
        let mut new = test_new(5, 0);
        new.cost_price = Some(0);
        let record = MovementRecord::create(new).unwrap();
        assert_eq!(record.total_value(), 0);
    }

    #[test]
    fn adjustment_without_reference_requires_reason() {
        let mut new = test_new(3, 0);
        new.movement_type = MovementType::Adjustment;
        assert!(matches!(
            MovementRecord::create(new.clone()).unwrap_err(),
            LedgerError::Validation(_)
        ));

        new.adjustment_reason = Some("cycle count correction".to_string());
        assert!(MovementRecord::create(new).is_ok());
    }

    #[test]
    fn metadata_patch_sets_updated_at_and_keeps_quantities() {
        let record = MovementRecord::create(test_new(4, 1)).unwrap();
        let now = Utc::now();
        let edited = record.with_metadata(
            MetadataPatch {
                notes: Some("recount".to_string()),
                ..MetadataPatch::default()
            },
            now,
        );
        assert_eq!(edited.notes(), Some("recount"));
        assert_eq!(edited.updated_at(), Some(now));
        assert_eq!(edited.quantity(), record.quantity());
        assert_eq!(edited.previous_quantity(), record.previous_quantity());
        assert_eq!(edited.new_quantity(), record.new_quantity());
        assert_eq!(edited.created_at(), record.created_at());
    }

    #[test]
    fn json_patch_rejects_quantity_fields() {
        let patch = serde_json::json!({ "quantity": 99 });
        assert_eq!(
            MetadataPatch::from_json(&patch).unwrap_err(),
            LedgerError::ImmutableField("quantity".to_string())
        );

        let patch = serde_json::json!({ "newQuantity": 1, "notes": "x" });
        assert!(matches!(
            MetadataPatch::from_json(&patch).unwrap_err(),
            LedgerError::ImmutableField(_)
        ));
    }

    #[test]
    fn json_patch_accepts_metadata_fields() {
        let user_id = UserId::new();
        let patch = serde_json::json!({
            "notes": "shrinkage",
            "adjustmentReason": "damaged in transit",
            "userId": user_id.to_string(),
            "userName": "ops",
        });
        let patch = MetadataPatch::from_json(&patch).unwrap();
        assert_eq!(patch.notes.as_deref(), Some("shrinkage"));
        assert_eq!(patch.adjustment_reason.as_deref(), Some("damaged in transit"));
        let actor = patch.actor.unwrap();
        assert_eq!(actor.user_id, user_id);
        assert_eq!(actor.user_name.as_deref(), Some("ops"));
    }

    #[test]
    fn violations_catch_conservation_mismatch() {
        // Forged via serde, bypassing `create`.
        let json = serde_json::json!({
            "id": MovementId::new(),
            "product_id": "P1",
            "variant_id": null,
            "movement_type": "inbound",
            "quantity": 5,
            "previous_quantity": 0,
            "new_quantity": 7,
            "reference": null,
            "adjustment_reason": null,
            "actor": null,
            "location_id": null,
            "cost_price": null,
            "total_value": 0,
            "notes": null,
            "created_at": Utc::now(),
            "updated_at": null,
        });
        let record: MovementRecord = serde_json::from_value(json).unwrap();
        assert_eq!(
            record.violations(),
            vec![RecordViolation::ConservationMismatch]
        );
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: every record that passes creation satisfies
        /// conservation and non-negativity.
        #[test]
        fn created_records_conserve_quantity(
            quantity in -1_000i64..1_000,
            previous in 0i64..1_000,
        ) {
            match MovementRecord::create(test_new(quantity, previous)) {
                Ok(record) => {
                    prop_assert_eq!(
                        record.new_quantity(),
                        record.previous_quantity() + record.quantity()
                    );
                    prop_assert!(record.previous_quantity() >= 0);
                    prop_assert!(record.new_quantity() >= 0);
                    prop_assert!(record.violations().is_empty());
                }
                Err(err) => {
                    // Only the zero-quantity and negative-balance guards fire here.
                    prop_assert!(
                        quantity == 0 || previous + quantity < 0,
                        "unexpected rejection: {}", err
                    );
                }
            }
        }
    }
}
