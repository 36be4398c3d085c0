//! Decoding of untyped API payloads into validated movement records.
//!
//! Replaces "accept whatever shape arrives" ingestion: a payload either
//! decodes into a full `MovementRecord` honoring the record invariants, or
//! fails with an error naming the offending field. Never a partial record.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value as JsonValue;
use thiserror::Error;
use uuid::Uuid;

use stockbook_core::{LedgerError, LocationId, MovementId, ProductId, ReferenceId, VariantId};

use crate::movement::{Actor, MovementRecord, MovementType, NewMovement, Reference, ReferenceType};

/// Decoding failure, naming the field at fault.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("payload is not a movement object: {0}")]
    Payload(String),

    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("invalid field {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },

    /// The decoded values violate a record invariant.
    #[error("invalid movement: {0}")]
    Invalid(#[from] LedgerError),
}

/// Untyped movement payload as it arrives from an API or import file.
///
/// Everything is optional at this layer; [`decode`] decides what is
/// required and what may be defaulted.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawMovement {
    pub id: Option<Uuid>,
    pub product_id: Option<String>,
    pub variant_id: Option<String>,
    pub movement_type: Option<String>,
    pub quantity: Option<i64>,
    pub previous_quantity: Option<i64>,
    pub new_quantity: Option<i64>,
    pub reference_id: Option<String>,
    pub reference_type: Option<String>,
    pub adjustment_reason: Option<String>,
    pub user_id: Option<Uuid>,
    pub user_name: Option<String>,
    pub location_id: Option<String>,
    pub cost_price: Option<i64>,
    pub notes: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

/// Decode one untyped payload into a validated record.
///
/// Required: `productId`, `movementType`, `quantity`, `previousQuantity`.
/// Defaults: `id` (fresh UUIDv7) and `createdAt` (now) when absent, since
/// both may legitimately be server-generated. A supplied `newQuantity`
/// must agree with `previousQuantity + quantity`.
pub fn decode(value: JsonValue) -> Result<MovementRecord, DecodeError> {
    let raw: RawMovement =
        serde_json::from_value(value).map_err(|e| DecodeError::Payload(e.to_string()))?;
    decode_raw(raw)
}

/// Decode an ordered batch, stopping at the first bad payload.
///
/// The index of the failing payload is reported so operators can locate it
/// in the import file.
pub fn decode_batch(
    values: impl IntoIterator<Item = JsonValue>,
) -> Result<Vec<MovementRecord>, (usize, DecodeError)> {
    values
        .into_iter()
        .enumerate()
        .map(|(index, value)| decode(value).map_err(|e| (index, e)))
        .collect()
}

fn decode_raw(raw: RawMovement) -> Result<MovementRecord, DecodeError> {
    let product_id = raw
        .product_id
        .ok_or(DecodeError::MissingField("productId"))
        .and_then(|p| {
            ProductId::new(p).map_err(|e| DecodeError::InvalidField {
                field: "productId",
                reason: e.to_string(),
            })
        })?;

    let variant_id = raw
        .variant_id
        .map(|v| {
            VariantId::new(v).map_err(|e| DecodeError::InvalidField {
                field: "variantId",
                reason: e.to_string(),
            })
        })
        .transpose()?;

    let movement_type: MovementType = raw
        .movement_type
        .ok_or(DecodeError::MissingField("movementType"))?
        .parse()
        .map_err(|e: LedgerError| DecodeError::InvalidField {
            field: "movementType",
            reason: e.to_string(),
        })?;

    let quantity = raw.quantity.ok_or(DecodeError::MissingField("quantity"))?;
    let previous_quantity = raw
        .previous_quantity
        .ok_or(DecodeError::MissingField("previousQuantity"))?;

    if let Some(claimed) = raw.new_quantity {
        if claimed != previous_quantity + quantity {
            return Err(DecodeError::InvalidField {
                field: "newQuantity",
                reason: format!(
                    "claimed {claimed}, expected {} + {} = {}",
                    previous_quantity,
                    quantity,
                    previous_quantity + quantity
                ),
            });
        }
    }

    let reference = match (raw.reference_id, raw.reference_type) {
        (Some(id), Some(kind)) => {
            let id = ReferenceId::new(id).map_err(|e| DecodeError::InvalidField {
                field: "referenceId",
                reason: e.to_string(),
            })?;
            let kind: ReferenceType =
                kind.parse()
                    .map_err(|e: LedgerError| DecodeError::InvalidField {
                        field: "referenceType",
                        reason: e.to_string(),
                    })?;
            Some(Reference { id, kind })
        }
        (None, None) => None,
        (Some(_), None) => {
            return Err(DecodeError::MissingField("referenceType"));
        }
        (None, Some(_)) => {
            return Err(DecodeError::MissingField("referenceId"));
        }
    };

    let actor = raw.user_id.map(|user_id| Actor {
        user_id: user_id.into(),
        user_name: raw.user_name,
    });

    let location_id = raw
        .location_id
        .map(|l| {
            LocationId::new(l).map_err(|e| DecodeError::InvalidField {
                field: "locationId",
                reason: e.to_string(),
            })
        })
        .transpose()?;

    let record = MovementRecord::create(NewMovement {
        id: raw.id.map(MovementId::from_uuid).unwrap_or_default(),
        product_id,
        variant_id,
        movement_type,
        quantity,
        previous_quantity,
        reference,
        adjustment_reason: raw.adjustment_reason,
        actor,
        location_id,
        cost_price: raw.cost_price,
        notes: raw.notes,
        created_at: raw.created_at.unwrap_or_else(Utc::now),
    })?;

    Ok(record)
}
