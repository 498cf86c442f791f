//! Luxe storefront client core.
//!
//! This crate holds everything the storefront UI needs that isn't rendering:
//!
//! - [`store`] - the single client state store and its pure transition function
//! - [`session`] - keeps the store's session in sync with the identity service
//! - [`identity`] - the identity service contract and an HTTP client for it
//! - [`services`] - sign-in/sign-up flows, local storage, recent searches
//! - [`search`] - client-side filter, sort, paginate and suggestions
//! - [`countdown`] - countdown values and a cancellable ticking timer
//! - [`routes`] - typed navigable routes

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod countdown;
pub mod error;
pub mod identity;
pub mod models;
pub mod routes;
pub mod search;
pub mod services;
pub mod session;
pub mod store;
