//! Store actions.

use serde::{Deserialize, Serialize};

use luxe_core::ProductId;

use crate::models::{CartLine, DailyReward, Product, User};

/// A tagged, immutable description of a state change.
///
/// Actions serialize as `{"type": "ADD_TO_CART", "payload": {...}}`. Any
/// unrecognized `type` decodes to [`Action::Unknown`], which the reducer
/// treats as a no-op.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    /// Replace the signed-in user (or record that there is none) and stop loading.
    SetSession(Option<User>),
    /// Forget the signed-in user. Cart and wishlist are kept.
    ClearSession,
    /// Append a line to the cart. Lines for the same product are not merged.
    AddToCart(CartLine),
    /// Drop every cart line for the product.
    RemoveFromCart(ProductId),
    /// Overwrite the quantity of every cart line for the product.
    #[serde(rename_all = "camelCase")]
    UpdateCartQuantity { product_id: ProductId, quantity: u32 },
    /// Add the product to the wishlist, or remove it if already present.
    ToggleWishlist(ProductId),
    /// Replace the cached product catalog.
    SetProducts(Vec<Product>),
    SetLoading(bool),
    ToggleCommandPalette,
    ToggleSearchModal,
    /// Adjust the signed-in user's loyalty points, saturating at zero. Ignored
    /// when signed out.
    AddLoyaltyPoints(i64),
    ShowDailyReward(DailyReward),
    HideDailyReward,
    /// Any action tag this client doesn't understand.
    #[serde(other)]
    Unknown,
}

impl Action {
    /// Tag used in logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::SetSession(_) => "set_session",
            Self::ClearSession => "clear_session",
            Self::AddToCart(_) => "add_to_cart",
            Self::RemoveFromCart(_) => "remove_from_cart",
            Self::UpdateCartQuantity { .. } => "update_cart_quantity",
            Self::ToggleWishlist(_) => "toggle_wishlist",
            Self::SetProducts(_) => "set_products",
            Self::SetLoading(_) => "set_loading",
            Self::ToggleCommandPalette => "toggle_command_palette",
            Self::ToggleSearchModal => "toggle_search_modal",
            Self::AddLoyaltyPoints(_) => "add_loyalty_points",
            Self::ShowDailyReward(_) => "show_daily_reward",
            Self::HideDailyReward => "hide_daily_reward",
            Self::Unknown => "unknown",
        }
    }
}
