//! Recent search history.

use tracing::info;

use luxe_storefront::config::StorefrontConfig;
use luxe_storefront::error::Result;

use super::recent_searches;

/// Print recent searches, most recent first.
#[allow(clippy::print_stdout)]
pub async fn list(config: &StorefrontConfig) {
    let items = recent_searches(config).list().await;
    if items.is_empty() {
        println!("No recent searches");
    }
    for (i, query) in items.iter().enumerate() {
        println!("{}. {query}", i + 1);
    }
}

/// Record a search.
///
/// # Errors
///
/// Returns an error if local storage cannot be written.
pub async fn add(config: &StorefrontConfig, query: &str) -> Result<()> {
    let items = recent_searches(config).add(query).await?;
    info!(count = items.len(), "Recorded recent search");
    Ok(())
}

/// Forget all recent searches.
///
/// # Errors
///
/// Returns an error if local storage cannot be written.
pub async fn clear(config: &StorefrontConfig) -> Result<()> {
    recent_searches(config).clear().await?;
    info!("Cleared recent searches");
    Ok(())
}
