//! Recent search history.

use tracing::warn;

use super::storage::{LocalStorage, StorageError};

/// Storage key holding the JSON array of recent queries.
pub const RECENT_SEARCHES_KEY: &str = "recentSearches";

/// Number of queries kept when no limit is configured.
pub const DEFAULT_LIMIT: usize = 5;

/// Most-recent-first list of past search queries.
#[derive(Debug, Clone)]
pub struct RecentSearches {
    storage: LocalStorage,
    limit: usize,
}

impl RecentSearches {
    #[must_use]
    pub const fn new(storage: LocalStorage, limit: usize) -> Self {
        Self { storage, limit }
    }

    /// Load the stored list. Missing or malformed entries read as empty.
    pub async fn list(&self) -> Vec<String> {
        let Some(raw) = self.storage.get(RECENT_SEARCHES_KEY).await else {
            return Vec::new();
        };

        match serde_json::from_str::<Vec<String>>(&raw) {
            Ok(mut items) => {
                items.truncate(self.limit);
                items
            }
            Err(e) => {
                warn!(error = %e, "Ignoring malformed recent searches");
                Vec::new()
            }
        }
    }

    /// Record a query and return the updated list.
    ///
    /// The query moves to the front; an earlier copy is dropped and the list
    /// is cut to the limit. Blank queries leave the list unchanged.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the list cannot be persisted.
    pub async fn add(&self, query: &str) -> Result<Vec<String>, StorageError> {
        let query = query.trim();
        let current = self.list().await;
        if query.is_empty() {
            return Ok(current);
        }

        let updated = push_recent(current, query, self.limit);
        self.storage
            .set(RECENT_SEARCHES_KEY, serde_json::to_string(&updated)?)
            .await?;
        Ok(updated)
    }

    /// Forget every stored query.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the storage file cannot be written.
    pub async fn clear(&self) -> Result<(), StorageError> {
        self.storage.remove(RECENT_SEARCHES_KEY).await
    }
}

fn push_recent(mut items: Vec<String>, query: &str, limit: usize) -> Vec<String> {
    items.retain(|item| item != query);
    items.insert(0, query.to_string());
    items.truncate(limit);
    items
}
