//! Client state store.
//!
//! A single [`Store`] holds session, cart, wishlist, catalog cache and UI
//! flags. State changes only through [`Store::dispatch`], which runs the pure
//! [`reduce`] function and publishes the result to subscribers.
//!
//! # Example
//!
//! ```rust,ignore
//! use luxe_storefront::store::{Action, Store};
//!
//! let store = Store::new();
//! let mut changes = store.subscribe();
//!
//! store.dispatch(Action::ToggleSearchModal);
//! changes.changed().await?;
//! assert!(changes.borrow().is_search_modal_open);
//! ```

mod action;
mod state;

pub use action::Action;
pub use state::{StoreState, reduce, replay};

use std::sync::Arc;

use tokio::sync::watch;
use tracing::debug;

/// Shared handle to the client state store.
///
/// Cloning is cheap; every clone dispatches into and reads from the same state.
#[derive(Clone)]
pub struct Store {
    inner: Arc<StoreInner>,
}

struct StoreInner {
    tx: watch::Sender<StoreState>,
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("subscribers", &self.inner.tx.receiver_count())
            .finish_non_exhaustive()
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl Store {
    /// Create a store holding the initial state.
    #[must_use]
    pub fn new() -> Self {
        Self::with_state(StoreState::default())
    }

    /// Create a store seeded with `state`.
    #[must_use]
    pub fn with_state(state: StoreState) -> Self {
        let (tx, _) = watch::channel(state);
        Self {
            inner: Arc::new(StoreInner { tx }),
        }
    }

    /// Apply an action and notify subscribers.
    ///
    /// Dispatches are serialized: each action sees the state left by the
    /// previous one.
    pub fn dispatch(&self, action: Action) {
        debug!(action = action.kind(), "Dispatching store action");
        self.inner.tx.send_modify(|state| {
            let prev = std::mem::take(state);
            *state = reduce(prev, action);
        });
    }

    /// Apply an action only if `condition` holds for the current state.
    ///
    /// The check and the transition happen under one write lock, so no other
    /// dispatch can slip in between. Subscribers are only notified when the
    /// action was applied. Returns whether it was.
    pub fn dispatch_if(
        &self,
        action: Action,
        condition: impl FnOnce(&StoreState) -> bool,
    ) -> bool {
        self.inner.tx.send_if_modified(|state| {
            if !condition(state) {
                debug!(action = action.kind(), "Skipping conditional store action");
                return false;
            }
            debug!(action = action.kind(), "Dispatching store action");
            let prev = std::mem::take(state);
            *state = reduce(prev, action);
            true
        })
    }

    /// Snapshot of the current state.
    #[must_use]
    pub fn state(&self) -> StoreState {
        self.inner.tx.borrow().clone()
    }

    /// Read a projection of the current state without cloning all of it.
    pub fn select<T>(&self, f: impl FnOnce(&StoreState) -> T) -> T {
        f(&self.inner.tx.borrow())
    }

    /// Receive a notification after every dispatch.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<StoreState> {
        self.inner.tx.subscribe()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::models::CartLine;
    use luxe_core::ProductId;

    #[test]
    fn test_dispatch_matches_replay() {
        let actions = vec![
            Action::AddToCart(CartLine::new("p1", 2)),
            Action::ToggleWishlist(ProductId::new("p1")),
            Action::SetLoading(false),
            Action::ToggleCommandPalette,
            Action::RemoveFromCart(ProductId::new("p1")),
        ];

        let store = Store::new();
        for action in actions.clone() {
            store.dispatch(action);
        }
        assert_eq!(store.state(), replay(actions));
    }

    #[test]
    fn test_clones_share_state() {
        let store = Store::new();
        let other = store.clone();
        other.dispatch(Action::ToggleSearchModal);
        assert!(store.select(|s| s.is_search_modal_open));
    }

    #[test]
    fn test_dispatch_if_checks_current_state() {
        let store = Store::new();
        let changes = store.subscribe();

        let applied = store.dispatch_if(Action::SetLoading(false), |s| !s.is_loading);
        assert!(!applied);
        assert!(store.select(|s| s.is_loading));
        assert!(!changes.has_changed().unwrap());

        let applied = store.dispatch_if(Action::SetLoading(false), |s| s.is_loading);
        assert!(applied);
        assert!(!store.select(|s| s.is_loading));
        assert!(changes.has_changed().unwrap());
    }

    #[tokio::test]
    async fn test_subscribers_see_dispatches() {
        let store = Store::new();
        let mut changes = store.subscribe();

        store.dispatch(Action::AddToCart(CartLine::new("p1", 3)));
        changes.changed().await.unwrap();
        assert_eq!(changes.borrow_and_update().cart_item_count(), 3);
    }
}
