//! Inventory movement model.
//!
//! This crate contains the immutable `MovementRecord` value and its
//! surrounding vocabulary (movement/reference kinds, actor, metadata patch,
//! filter predicate), plus the decoding layer that turns untyped API
//! payloads into validated records. Pure domain logic: no IO, no storage.

pub mod decode;
pub mod filter;
pub mod movement;

pub use decode::{DecodeError, RawMovement, decode, decode_batch};
pub use filter::{MovementFilter, VariantFilter};
pub use movement::{
    Actor, MetadataPatch, MovementRecord, MovementType, NewMovement, RecordViolation, Reference,
    ReferenceType,
};
