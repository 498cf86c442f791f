//! Memoized catalog search.

use std::sync::Arc;
use std::time::Duration;

use moka::sync::Cache;
use tracing::{debug, instrument};

use super::{Page, SearchFilters, SearchSort, filter_and_sort, normalize_query, paginate};
use crate::models::Product;
use crate::store::Store;

/// Distinct result sets kept in memory.
const CACHE_CAPACITY: u64 = 64;

/// Idle result sets are dropped after this long.
const CACHE_IDLE: Duration = Duration::from_secs(600);

/// One search as issued by the search page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchRequest {
    pub query: String,
    pub filters: SearchFilters,
    pub sort: SearchSort,
    /// 1-based.
    pub page: usize,
}

impl SearchRequest {
    /// First page of results for `query`, unfiltered, in catalog order.
    #[must_use]
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            page: 1,
            ..Self::default()
        }
    }
}

/// A page of search results.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResults {
    pub page: Page<Product>,
    pub sort: SearchSort,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct MemoKey {
    revision: u64,
    query: Option<String>,
    filters: SearchFilters,
    sort: SearchSort,
}

/// Runs searches over the store's catalog, reusing previous results while the
/// catalog, query, filters, and sort are unchanged.
///
/// Cloning is cheap; clones share the memo.
#[derive(Clone)]
pub struct CatalogSearch {
    memo: Cache<MemoKey, Arc<[Product]>>,
    page_size: usize,
}

impl std::fmt::Debug for CatalogSearch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogSearch")
            .field("page_size", &self.page_size)
            .field("memoized", &self.memo.entry_count())
            .finish()
    }
}

impl CatalogSearch {
    #[must_use]
    pub fn new(page_size: usize) -> Self {
        let memo = Cache::builder()
            .max_capacity(CACHE_CAPACITY)
            .time_to_idle(CACHE_IDLE)
            .build();

        Self {
            memo,
            page_size: page_size.max(1),
        }
    }

    #[must_use]
    pub const fn page_size(&self) -> usize {
        self.page_size
    }

    /// Search `products`, identified by `revision`.
    ///
    /// `revision` must change whenever `products` does; the memo trusts it.
    #[instrument(skip(self, products), fields(query = %request.query, sort = %request.sort, page = request.page))]
    pub fn run(&self, revision: u64, products: &[Product], request: &SearchRequest) -> SearchResults {
        let key = MemoKey {
            revision,
            query: normalize_query(&request.query),
            filters: request.filters.clone(),
            sort: request.sort,
        };

        let matched = self.memo.get_with(key, || {
            debug!(catalog_size = products.len(), "Recomputing search results");
            filter_and_sort(products, &request.query, &request.filters, request.sort).into()
        });

        SearchResults {
            page: paginate(&*matched, request.page, self.page_size),
            sort: request.sort,
        }
    }

    /// Search the catalog currently held by `store`.
    #[must_use]
    pub fn run_on_store(&self, store: &Store, request: &SearchRequest) -> SearchResults {
        store.select(|s| self.run(s.products_revision, &s.products, request))
    }

    /// Forget all memoized results.
    pub fn clear(&self) {
        self.memo.invalidate_all();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::search::tests::product;
    use crate::store::Action;

    fn catalog(n: usize) -> Vec<Product> {
        (0..n)
            .map(|i| product(&format!("p{i}"), &format!("Item {i}"), 10))
            .collect()
    }

    #[test]
    fn test_pages_over_memoized_results() {
        let search = CatalogSearch::new(12);
        let products = catalog(25);

        let mut request = SearchRequest::new("");
        let first = search.run(1, &products, &request);
        assert_eq!(first.page.items.len(), 12);
        assert_eq!(first.page.total_pages, 3);

        request.page = 3;
        let last = search.run(1, &products, &request);
        assert_eq!(last.page.items.len(), 1);
        assert_eq!(last.page.items[0].name, "Item 24");
    }

    #[test]
    fn test_memo_keyed_on_revision() {
        let search = CatalogSearch::new(12);
        let request = SearchRequest::new("item");

        let before = search.run(1, &catalog(3), &request);
        assert_eq!(before.page.total_items, 3);

        // Same revision: memo wins even though the slice differs.
        let stale = search.run(1, &catalog(5), &request);
        assert_eq!(stale.page.total_items, 3);

        let fresh = search.run(2, &catalog(5), &request);
        assert_eq!(fresh.page.total_items, 5);
    }

    #[test]
    fn test_query_normalization_shares_memo() {
        let search = CatalogSearch::new(12);
        let products = catalog(3);

        let a = search.run(1, &products, &SearchRequest::new("ITEM 1"));
        let b = search.run(1, &[], &SearchRequest::new("  item 1 "));
        assert_eq!(a.page, b.page);
    }

    #[test]
    fn test_run_on_store_tracks_set_products() {
        let store = Store::new();
        let search = CatalogSearch::new(12);
        let request = SearchRequest::new("");

        store.dispatch(Action::SetProducts(catalog(2)));
        assert_eq!(search.run_on_store(&store, &request).page.total_items, 2);

        store.dispatch(Action::SetProducts(catalog(4)));
        assert_eq!(search.run_on_store(&store, &request).page.total_items, 4);
    }
}
