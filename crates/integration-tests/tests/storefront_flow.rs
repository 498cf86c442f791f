//! End-to-end tests for the store, catalog search and recent searches.
//!
//! Run with: cargo test -p luxe-integration-tests --test storefront_flow

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use serde_json::json;

use luxe_core::ProductId;
use luxe_storefront::models::{CartLine, Product};
use luxe_storefront::routes::Route;
use luxe_storefront::search::suggest::suggest;
use luxe_storefront::search::{CatalogSearch, SearchRequest, SearchSort};
use luxe_storefront::services::{LocalStorage, RecentSearches};
use luxe_storefront::store::{Action, Store, replay};

fn catalog() -> Vec<Product> {
    serde_json::from_value(json!([
        {
            "id": "hoodie",
            "name": "AI Hoodie",
            "price": {"amount": "89.00", "currency_code": "USD"},
            "rating": 4.8,
            "tags": ["streetwear"],
            "category": "Apparel",
            "brand": "Luxe",
            "createdAt": "2026-03-01T00:00:00Z"
        },
        {
            "id": "jacket",
            "name": "Cyberpunk Jacket",
            "price": {"amount": "249.00", "currency_code": "USD"},
            "rating": 4.5,
            "tags": ["streetwear", "outerwear"],
            "category": "Apparel",
            "brand": "Neon",
            "inStock": false,
            "createdAt": "2026-05-01T00:00:00Z"
        },
        {
            "id": "watch",
            "name": "Minimalist Watch",
            "price": {"amount": "159.00", "currency_code": "USD"},
            "rating": 4.9,
            "category": "Accessories",
            "brand": "Luxe",
            "createdAt": "2026-01-15T00:00:00Z"
        }
    ]))
    .unwrap()
}

#[test]
fn test_replay_wire_actions() {
    let actions: Vec<Action> = serde_json::from_value(json!([
        {"type": "ADD_TO_CART", "payload": {"productId": "hoodie", "quantity": 1}},
        {"type": "ADD_TO_CART", "payload": {"productId": "watch", "quantity": 2}},
        {"type": "UPDATE_CART_QUANTITY", "payload": {"productId": "hoodie", "quantity": 3}},
        {"type": "TOGGLE_WISHLIST", "payload": "jacket"},
        {"type": "APPLY_COUPON", "payload": {"code": "SAVE10"}},
        {"type": "REMOVE_FROM_CART", "payload": "watch"},
        {"type": "TOGGLE_SEARCH_MODAL"},
        {"type": "SET_LOADING", "payload": false}
    ]))
    .unwrap();

    let state = replay(actions);

    assert_eq!(state.cart, vec![CartLine::new("hoodie", 3)]);
    assert_eq!(state.cart_item_count(), 3);
    assert!(state.is_wishlisted(&ProductId::new("jacket")));
    assert!(state.is_search_modal_open);
    assert!(!state.is_loading);
}

#[test]
fn test_search_follows_catalog_updates() {
    let store = Store::new();
    store.dispatch(Action::SetProducts(catalog()));
    let search = CatalogSearch::new(12);

    let mut request = SearchRequest::new("streetwear");
    request.sort = SearchSort::PriceHigh;
    let results = search.run_on_store(&store, &request);
    let names: Vec<_> = results.page.items.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["Cyberpunk Jacket", "AI Hoodie"]);

    request.filters.in_stock_only = true;
    let results = search.run_on_store(&store, &request);
    assert_eq!(results.page.total_items, 1);

    // A new catalog must not be served from the memo.
    let mut updated = catalog();
    updated.retain(|p| p.id.as_str() != "hoodie");
    store.dispatch(Action::SetProducts(updated));
    let results = search.run_on_store(&store, &request);
    assert_eq!(results.page.total_items, 0);
}

#[test]
fn test_newest_and_rating_sorts() {
    let store = Store::new();
    store.dispatch(Action::SetProducts(catalog()));
    let search = CatalogSearch::new(12);

    let mut request = SearchRequest::new("");
    request.sort = SearchSort::Newest;
    let ids: Vec<_> = search
        .run_on_store(&store, &request)
        .page
        .items
        .into_iter()
        .map(|p| p.id.into_inner())
        .collect();
    assert_eq!(ids, vec!["jacket", "hoodie", "watch"]);

    request.sort = SearchSort::Rating;
    let first = search.run_on_store(&store, &request).page.items[0].id.clone();
    assert_eq!(first, ProductId::new("watch"));
}

#[test]
fn test_suggestions_route_to_products_and_categories() {
    let suggestions = suggest(&catalog(), "acc");
    assert!(suggestions.products.is_empty());
    assert_eq!(
        suggestions.routes(),
        vec![Route::Shop {
            category: Some("Accessories".to_string())
        }]
    );
    assert_eq!(suggestions.routes()[0].path(), "/shop?category=Accessories");
}

#[tokio::test]
async fn test_recent_searches_persist_across_instances() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("storage.json");

    let recent = RecentSearches::new(LocalStorage::new(&path), 3);
    for query in ["hoodie", "watch", "jacket", "hoodie", "sneakers"] {
        recent.add(query).await.unwrap();
    }

    let reopened = RecentSearches::new(LocalStorage::new(&path), 3);
    assert_eq!(reopened.list().await, vec!["sneakers", "hoodie", "jacket"]);

    reopened.clear().await.unwrap();
    assert!(recent.list().await.is_empty());
}
