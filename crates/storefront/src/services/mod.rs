//! Business logic services for the storefront client.
//!
//! # Services
//!
//! - `auth` - Sign-in, sign-up and sign-out against the identity service
//! - `storage` - File-backed local key-value storage
//! - `recent_searches` - Most-recent-first search history kept in local storage

pub mod auth;
pub mod recent_searches;
pub mod storage;

pub use auth::{AuthError, AuthService, SignInOutcome, SignUpOutcome};
pub use recent_searches::RecentSearches;
pub use storage::{LocalStorage, StorageError};
