//! Cart line items.

use serde::{Deserialize, Serialize};

use luxe_core::ProductId;

/// A single cart entry.
///
/// The cart is an ordered sequence of lines and product IDs are not unique
/// within it: adding the same product twice yields two lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    /// Product this line refers to.
    pub product_id: ProductId,
    /// Requested quantity. Not validated by the store.
    pub quantity: u32,
}

impl CartLine {
    /// Create a new cart line.
    #[must_use]
    pub fn new(product_id: impl Into<ProductId>, quantity: u32) -> Self {
        Self {
            product_id: product_id.into(),
            quantity,
        }
    }
}
