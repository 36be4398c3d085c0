//! Stock key: the unit of balance tracking.

use serde::{Deserialize, Serialize};

use crate::id::{ProductId, VariantId};

/// Identifies one independently-tracked stock balance.
///
/// A bare product and each of its variants maintain separate balances;
/// `variant_id = None` is the bare-product line.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StockKey {
    pub product_id: ProductId,
    pub variant_id: Option<VariantId>,
}

impl StockKey {
    pub fn new(product_id: ProductId, variant_id: Option<VariantId>) -> Self {
        Self {
            product_id,
            variant_id,
        }
    }

    /// Key for the bare-product balance line.
    pub fn product(product_id: ProductId) -> Self {
        Self::new(product_id, None)
    }

    /// Key for a specific variant's balance line.
    pub fn variant(product_id: ProductId, variant_id: VariantId) -> Self {
        Self::new(product_id, Some(variant_id))
    }
}

impl core::fmt::Display for StockKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match &self.variant_id {
            Some(v) => write!(f, "{}/{}", self.product_id, v),
            None => core::fmt::Display::fmt(&self.product_id, f),
        }
    }
}
