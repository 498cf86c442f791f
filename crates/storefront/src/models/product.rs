//! Catalog products.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use luxe_core::{Price, ProductId};

/// A catalog product as seen by the client.
///
/// Products are sourced externally and never mutated by the store; a new
/// catalog replaces the old one in full.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: Price,
    /// Average review score, 0.0 to 5.0.
    #[serde(default)]
    pub rating: f32,
    #[serde(default)]
    pub tags: Vec<String>,
    pub category: String,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default = "default_in_stock")]
    pub in_stock: bool,
    /// When the product was added to the catalog; drives "newest" sorting.
    #[serde(default = "default_created_at")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub image: Option<String>,
}

const fn default_in_stock() -> bool {
    true
}

const fn default_created_at() -> DateTime<Utc> {
    DateTime::<Utc>::UNIX_EPOCH
}

impl Product {
    /// Whether the lowercased `needle` occurs in the name or any tag.
    ///
    /// `needle` must already be lowercase.
    #[must_use]
    pub fn matches_text(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle)
            || self
                .tags
                .iter()
                .any(|tag| tag.to_lowercase().contains(needle))
    }
}
