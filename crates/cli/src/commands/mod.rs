//! Subcommand implementations.

pub mod account;
pub mod countdown;
pub mod recent;
pub mod search;

use luxe_storefront::config::StorefrontConfig;
use luxe_storefront::services::{LocalStorage, RecentSearches};

/// Recent searches backed by the configured local storage file.
fn recent_searches(config: &StorefrontConfig) -> RecentSearches {
    RecentSearches::new(
        LocalStorage::new(&config.local_storage_path),
        config.recent_searches_limit,
    )
}
