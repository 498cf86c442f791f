//! Domain models for the storefront client.
//!
//! These are the value objects held by the [`Store`](crate::store::Store);
//! all of them are immutable from the store's point of view and are replaced
//! wholesale by transitions.

pub mod cart;
pub mod product;
pub mod reward;
pub mod user;

pub use cart::CartLine;
pub use product::Product;
pub use reward::DailyReward;
pub use user::{Address, User};
