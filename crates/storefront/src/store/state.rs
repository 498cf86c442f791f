//! Store state and the transition function.

use luxe_core::ProductId;

use super::Action;
use crate::models::{CartLine, DailyReward, Product, User};

/// Everything the client keeps in memory between screens.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreState {
    /// Signed-in user, if any.
    pub user: Option<User>,
    /// Cart lines in insertion order. May hold several lines per product.
    pub cart: Vec<CartLine>,
    /// Wishlisted products in insertion order, no duplicates.
    pub wishlist: Vec<ProductId>,
    /// Cached catalog.
    pub products: Vec<Product>,
    /// Bumped every time `products` is replaced. Search memoization keys on it.
    pub products_revision: u64,
    /// True until the first session lookup settles.
    pub is_loading: bool,
    pub is_command_palette_open: bool,
    pub is_search_modal_open: bool,
    /// Pending daily reward notification.
    pub daily_reward: Option<DailyReward>,
}

impl Default for StoreState {
    fn default() -> Self {
        Self {
            user: None,
            cart: Vec::new(),
            wishlist: Vec::new(),
            products: Vec::new(),
            products_revision: 0,
            is_loading: true,
            is_command_palette_open: false,
            is_search_modal_open: false,
            daily_reward: None,
        }
    }
}

impl StoreState {
    /// Total quantity across all cart lines.
    #[must_use]
    pub fn cart_item_count(&self) -> u64 {
        self.cart.iter().map(|line| u64::from(line.quantity)).sum()
    }

    #[must_use]
    pub fn is_wishlisted(&self, product_id: &ProductId) -> bool {
        self.wishlist.contains(product_id)
    }

    #[must_use]
    pub const fn is_signed_in(&self) -> bool {
        self.user.is_some()
    }
}

/// Apply one action to a state, producing the next state.
///
/// Total and side-effect free: every action yields a state, and unknown
/// actions yield the input unchanged.
#[must_use]
pub fn reduce(state: StoreState, action: Action) -> StoreState {
    match action {
        Action::SetSession(user) => StoreState {
            user,
            is_loading: false,
            ..state
        },
        Action::ClearSession => StoreState { user: None, ..state },
        Action::AddToCart(line) => {
            let mut cart = state.cart;
            cart.push(line);
            StoreState { cart, ..state }
        }
        Action::RemoveFromCart(product_id) => {
            let mut cart = state.cart;
            cart.retain(|line| line.product_id != product_id);
            StoreState { cart, ..state }
        }
        Action::UpdateCartQuantity {
            product_id,
            quantity,
        } => {
            let cart = state
                .cart
                .into_iter()
                .map(|line| {
                    if line.product_id == product_id {
                        CartLine { quantity, ..line }
                    } else {
                        line
                    }
                })
                .collect();
            StoreState { cart, ..state }
        }
        Action::ToggleWishlist(product_id) => {
            let mut wishlist = state.wishlist;
            if let Some(pos) = wishlist.iter().position(|id| *id == product_id) {
                wishlist.remove(pos);
            } else {
                wishlist.push(product_id);
            }
            StoreState { wishlist, ..state }
        }
        Action::SetProducts(products) => StoreState {
            products,
            products_revision: state.products_revision.wrapping_add(1),
            ..state
        },
        Action::SetLoading(is_loading) => StoreState { is_loading, ..state },
        Action::ToggleCommandPalette => StoreState {
            is_command_palette_open: !state.is_command_palette_open,
            ..state
        },
        Action::ToggleSearchModal => StoreState {
            is_search_modal_open: !state.is_search_modal_open,
            ..state
        },
        Action::AddLoyaltyPoints(delta) => {
            let user = state.user.map(|user| User {
                loyalty_points: user.loyalty_points.saturating_add_signed(delta),
                ..user
            });
            StoreState { user, ..state }
        }
        Action::ShowDailyReward(reward) => StoreState {
            daily_reward: Some(reward),
            ..state
        },
        Action::HideDailyReward => StoreState {
            daily_reward: None,
            ..state
        },
        Action::Unknown => state,
    }
}

/// Fold a sequence of actions over the initial state.
#[must_use]
pub fn replay(actions: impl IntoIterator<Item = Action>) -> StoreState {
    actions
        .into_iter()
        .fold(StoreState::default(), reduce)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use luxe_core::{MembershipTier, Price, UserId};

    fn user(points: u64) -> User {
        User {
            id: UserId::new(uuid::Uuid::new_v4()),
            name: "Test Shopper".to_string(),
            email: "shopper@test.dev".to_string(),
            avatar: None,
            membership_tier: MembershipTier::Gold,
            loyalty_points: points,
            wishlist: Vec::new(),
            addresses: Vec::new(),
        }
    }

    fn product(id: &str) -> Product {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "name": format!("Product {id}"),
            "price": {"amount": "10.00", "currency_code": "USD"},
            "category": "Apparel"
        }))
        .unwrap()
    }

    #[test]
    fn test_initial_state() {
        let state = StoreState::default();
        assert!(state.user.is_none());
        assert!(state.is_loading);
        assert!(!state.is_command_palette_open);
        assert!(!state.is_search_modal_open);
        assert!(state.daily_reward.is_none());
        assert_eq!(state.cart_item_count(), 0);
    }

    #[test]
    fn test_set_session_clears_loading() {
        let state = reduce(StoreState::default(), Action::SetSession(Some(user(0))));
        assert!(state.is_signed_in());
        assert!(!state.is_loading);

        let state = reduce(StoreState::default(), Action::SetSession(None));
        assert!(!state.is_signed_in());
        assert!(!state.is_loading);
    }

    #[test]
    fn test_clear_session_keeps_cart_and_wishlist() {
        let state = replay([
            Action::SetSession(Some(user(10))),
            Action::AddToCart(CartLine::new("p1", 1)),
            Action::ToggleWishlist(ProductId::new("p2")),
            Action::ClearSession,
        ]);
        assert!(state.user.is_none());
        assert_eq!(state.cart.len(), 1);
        assert!(state.is_wishlisted(&ProductId::new("p2")));
    }

    #[test]
    fn test_add_to_cart_does_not_merge_duplicates() {
        let state = replay([
            Action::AddToCart(CartLine::new("p1", 1)),
            Action::AddToCart(CartLine::new("p1", 2)),
        ]);
        assert_eq!(state.cart.len(), 2);
        assert_eq!(state.cart_item_count(), 3);
    }

    #[test]
    fn test_remove_from_cart_drops_every_matching_line() {
        let state = replay([
            Action::AddToCart(CartLine::new("p1", 1)),
            Action::AddToCart(CartLine::new("p2", 1)),
            Action::AddToCart(CartLine::new("p1", 5)),
            Action::RemoveFromCart(ProductId::new("p1")),
        ]);
        assert_eq!(state.cart, vec![CartLine::new("p2", 1)]);
    }

    #[test]
    fn test_update_quantity() {
        let state = replay([
            Action::AddToCart(CartLine::new("p1", 1)),
            Action::AddToCart(CartLine::new("p1", 2)),
            Action::UpdateCartQuantity {
                product_id: ProductId::new("p1"),
                quantity: 7,
            },
        ]);
        assert!(state.cart.iter().all(|line| line.quantity == 7));

        let before = replay([Action::AddToCart(CartLine::new("p1", 1))]);
        let after = reduce(
            before.clone(),
            Action::UpdateCartQuantity {
                product_id: ProductId::new("missing"),
                quantity: 3,
            },
        );
        assert_eq!(before, after);
    }

    #[test]
    fn test_toggle_wishlist_twice_restores() {
        let start = replay([Action::ToggleWishlist(ProductId::new("keep"))]);
        let once = reduce(start.clone(), Action::ToggleWishlist(ProductId::new("p9")));
        assert!(once.is_wishlisted(&ProductId::new("p9")));

        let twice = reduce(once, Action::ToggleWishlist(ProductId::new("p9")));
        assert_eq!(twice.wishlist, start.wishlist);
    }

    #[test]
    fn test_set_products_bumps_revision() {
        let state = reduce(
            StoreState::default(),
            Action::SetProducts(vec![product("a"), product("b")]),
        );
        assert_eq!(state.products.len(), 2);
        assert_eq!(state.products_revision, 1);

        let state = reduce(state, Action::SetProducts(vec![product("c")]));
        assert_eq!(state.products.len(), 1);
        assert_eq!(state.products_revision, 2);
    }

    #[test]
    fn test_toggles_are_independent() {
        let state = reduce(StoreState::default(), Action::ToggleCommandPalette);
        assert!(state.is_command_palette_open);
        assert!(!state.is_search_modal_open);

        let state = reduce(state, Action::ToggleSearchModal);
        let state = reduce(state, Action::ToggleCommandPalette);
        assert!(!state.is_command_palette_open);
        assert!(state.is_search_modal_open);
    }

    #[test]
    fn test_loyalty_points_with_session() {
        let state = replay([Action::SetSession(Some(user(100)))]);
        let state = reduce(state, Action::AddLoyaltyPoints(25));
        assert_eq!(state.user.as_ref().unwrap().loyalty_points, 125);

        let state = reduce(state, Action::AddLoyaltyPoints(-25));
        assert_eq!(state.user.as_ref().unwrap().loyalty_points, 100);
    }

    #[test]
    fn test_loyalty_points_without_session_is_noop() {
        let before = StoreState::default();
        let after = reduce(before.clone(), Action::AddLoyaltyPoints(50));
        assert_eq!(before, after);
    }

    #[test]
    fn test_loyalty_points_never_go_negative() {
        let state = replay([
            Action::SetSession(Some(user(10))),
            Action::AddLoyaltyPoints(-50),
        ]);
        assert_eq!(state.user.unwrap().loyalty_points, 0);
    }

    #[test]
    fn test_daily_reward_show_and_hide() {
        let reward = DailyReward {
            points: 50,
            streak: 3,
        };
        let state = reduce(StoreState::default(), Action::ShowDailyReward(reward));
        assert_eq!(state.daily_reward, Some(reward));

        let state = reduce(state, Action::HideDailyReward);
        assert!(state.daily_reward.is_none());
    }

    #[test]
    fn test_unknown_is_identity() {
        let before = replay([
            Action::SetSession(Some(user(1))),
            Action::AddToCart(CartLine::new("p1", 1)),
        ]);
        let after = reduce(before.clone(), Action::Unknown);
        assert_eq!(before, after);
    }

    #[test]
    fn test_replay_matches_stepwise_reduce() {
        let actions = vec![
            Action::SetProducts(vec![product("a")]),
            Action::SetSession(Some(user(5))),
            Action::AddToCart(CartLine::new("a", 2)),
            Action::AddLoyaltyPoints(10),
            Action::ToggleWishlist(ProductId::new("a")),
            Action::ToggleSearchModal,
            Action::Unknown,
            Action::ClearSession,
        ];

        let mut stepwise = StoreState::default();
        for action in actions.clone() {
            stepwise = reduce(stepwise, action);
        }
        assert_eq!(replay(actions), stepwise);
    }

    #[test]
    fn test_product_price_survives_reduce() {
        let state = reduce(
            StoreState::default(),
            Action::SetProducts(vec![product("a")]),
        );
        assert_eq!(state.products[0].price, Price::usd(10));
    }
}
