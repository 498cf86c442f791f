//! Catalog search and suggestions.

use std::path::{Path, PathBuf};

use rust_decimal::Decimal;
use tracing::{info, warn};

use luxe_storefront::config::StorefrontConfig;
use luxe_storefront::error::{AppError, Result, add_breadcrumb};
use luxe_storefront::models::Product;
use luxe_storefront::search::suggest::{TRENDING_SEARCHES, suggest as suggest_for};
use luxe_storefront::search::{CatalogSearch, SearchFilters, SearchRequest, SearchSort};
use luxe_storefront::store::{Action, Store};

/// Options for one `search` invocation.
#[derive(Debug, Clone)]
pub struct SearchOptions {
    pub catalog: PathBuf,
    pub query: String,
    pub sort: String,
    pub category: Option<String>,
    pub brand: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub in_stock: bool,
    pub page: usize,
}

impl SearchOptions {
    fn request(&self) -> SearchRequest {
        SearchRequest {
            query: self.query.clone(),
            filters: SearchFilters {
                category: self.category.clone(),
                min_price: self.min_price,
                max_price: self.max_price,
                brand: self.brand.clone(),
                in_stock_only: self.in_stock,
            },
            sort: SearchSort::parse_lenient(&self.sort),
            page: self.page,
        }
    }
}

/// Read a catalog file holding a JSON array of products.
///
/// # Errors
///
/// Returns `AppError::BadRequest` if the file is missing or malformed.
pub async fn load_catalog(path: &Path) -> Result<Vec<Product>> {
    let raw = tokio::fs::read_to_string(path).await.map_err(|e| {
        AppError::BadRequest(format!("cannot read catalog {}: {e}", path.display()))
    })?;
    serde_json::from_str(&raw)
        .map_err(|e| AppError::BadRequest(format!("invalid catalog {}: {e}", path.display())))
}

/// Search a catalog file and print one page of results.
///
/// Non-blank queries are recorded in recent searches.
///
/// # Errors
///
/// Returns an error if the catalog cannot be loaded or the recent search
/// cannot be saved.
#[allow(clippy::print_stdout)]
pub async fn run(config: &StorefrontConfig, options: SearchOptions) -> Result<()> {
    let request = options.request();
    if request.sort.as_str() != options.sort {
        warn!(sort = %options.sort, "Unknown sort key, using featured");
    }

    let store = Store::new();
    store.dispatch(Action::SetProducts(load_catalog(&options.catalog).await?));

    let search = CatalogSearch::new(config.page_size);
    let results = search.run_on_store(&store, &request);
    add_breadcrumb("search", "Ran search", Some(&[("query", request.query.as_str())]));

    super::recent_searches(config).add(&request.query).await?;

    info!(
        total = results.page.total_items,
        page = results.page.page,
        pages = results.page.total_pages,
        "Search complete"
    );

    println!(
        "Showing {} of {} results (page {}/{}, sorted by {})",
        results.page.items.len(),
        results.page.total_items,
        results.page.page,
        results.page.total_pages.max(1),
        results.sort.label(),
    );
    for product in &results.page.items {
        let stock = if product.in_stock { "" } else { " (out of stock)" };
        println!(
            "  {:<32} {:>10}  {:.1}*  {}{stock}",
            product.name, product.price, product.rating, product.category
        );
    }
    Ok(())
}

/// Print search-modal suggestions for a partial query.
///
/// # Errors
///
/// Returns an error if the catalog cannot be loaded.
#[allow(clippy::print_stdout)]
pub async fn suggest(catalog: &Path, query: &str) -> Result<()> {
    if query.trim().is_empty() {
        println!("Trending searches:");
        for term in TRENDING_SEARCHES {
            println!("  {term}");
        }
        return Ok(());
    }

    let products = load_catalog(catalog).await?;
    let suggestions = suggest_for(&products, query);
    if suggestions.is_empty() {
        println!("No suggestions for \"{query}\"");
        return Ok(());
    }

    if !suggestions.products.is_empty() {
        println!("Products:");
        for product in &suggestions.products {
            println!("  {}  ->  /product/{}", product.name, product.id);
        }
    }
    if !suggestions.categories.is_empty() {
        println!("Categories:");
        for route in suggestions.routes().iter().skip(suggestions.products.len()) {
            println!("  {route}");
        }
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_load_catalog() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        std::fs::write(
            &path,
            r#"[{"id":"1","name":"Red Hoodie","price":{"amount":"50"},"category":"Apparel"}]"#,
        )
        .unwrap();

        let products = load_catalog(&path).await.unwrap();
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].name, "Red Hoodie");
        assert!(products[0].in_stock);
    }

    #[tokio::test]
    async fn test_load_catalog_errors_are_bad_requests() {
        let dir = tempfile::tempdir().unwrap();
        let missing = load_catalog(&dir.path().join("nope.json")).await;
        assert!(matches!(missing, Err(AppError::BadRequest(_))));

        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{").unwrap();
        assert!(matches!(
            load_catalog(&path).await,
            Err(AppError::BadRequest(msg)) if msg.contains("invalid catalog")
        ));
    }

    #[test]
    fn test_options_build_request() {
        let options = SearchOptions {
            catalog: PathBuf::from("c.json"),
            query: "cap".to_string(),
            sort: "bogus".to_string(),
            category: Some("Hats".to_string()),
            brand: None,
            min_price: Some(Decimal::from(5)),
            max_price: None,
            in_stock: true,
            page: 2,
        };
        let request = options.request();
        assert_eq!(request.sort, SearchSort::Featured);
        assert_eq!(request.filters.category.as_deref(), Some("Hats"));
        assert!(request.filters.in_stock_only);
        assert_eq!(request.page, 2);
    }
}
