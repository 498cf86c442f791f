//! Client-side catalog search.
//!
//! Search runs entirely over the in-memory catalog held by the store:
//!
//! 1. text match: case-insensitive substring on product name or any tag
//! 2. filters: category, price range, brand, stock
//! 3. sort: featured (catalog order), price, rating, newest
//! 4. pagination: fixed-size, 1-based pages
//!
//! Steps 1-3 are memoized by [`CatalogSearch`]; paging a memoized result is
//! cheap. Quick suggestions for the search modal live in [`suggest`].

mod catalog;
mod pagination;
pub mod suggest;

pub use catalog::{CatalogSearch, SearchRequest, SearchResults};
pub use pagination::{Page, paginate};

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;

use crate::models::Product;

/// Narrowing applied after the text match. `None` fields don't filter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct SearchFilters {
    /// Exact category name, case-insensitive.
    pub category: Option<String>,
    /// Inclusive lower price bound.
    pub min_price: Option<Decimal>,
    /// Inclusive upper price bound.
    pub max_price: Option<Decimal>,
    /// Exact brand name, case-insensitive.
    pub brand: Option<String>,
    /// Keep only products that are in stock.
    pub in_stock_only: bool,
}

impl SearchFilters {
    /// Whether `product` passes every filter.
    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        if let Some(category) = &self.category
            && !product.category.eq_ignore_ascii_case(category)
        {
            return false;
        }
        if self.min_price.is_some_and(|min| product.price.amount < min) {
            return false;
        }
        if self.max_price.is_some_and(|max| product.price.amount > max) {
            return false;
        }
        if let Some(brand) = &self.brand
            && !product
                .brand
                .as_deref()
                .is_some_and(|b| b.eq_ignore_ascii_case(brand))
        {
            return false;
        }
        !self.in_stock_only || product.in_stock
    }
}

/// Result ordering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SearchSort {
    /// Catalog order.
    #[default]
    Featured,
    /// Cheapest first.
    PriceLow,
    /// Most expensive first.
    PriceHigh,
    /// Best rated first.
    Rating,
    /// Most recently added first.
    Newest,
}

impl SearchSort {
    /// Every sort option, in menu order.
    pub const ALL: [Self; 5] = [
        Self::Featured,
        Self::PriceLow,
        Self::PriceHigh,
        Self::Newest,
        Self::Rating,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Featured => "featured",
            Self::PriceLow => "price-low",
            Self::PriceHigh => "price-high",
            Self::Rating => "rating",
            Self::Newest => "newest",
        }
    }

    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Featured => "Best Match",
            Self::PriceLow => "Price: Low to High",
            Self::PriceHigh => "Price: High to Low",
            Self::Rating => "Best Rating",
            Self::Newest => "Newest First",
        }
    }

    /// Parse a sort key. Unknown keys fall back to [`SearchSort::Featured`].
    #[must_use]
    pub fn parse_lenient(s: &str) -> Self {
        s.parse().unwrap_or_default()
    }

    /// Sort in place. Stable: equal keys keep catalog order.
    pub fn apply(self, products: &mut [Product]) {
        match self {
            Self::Featured => {}
            Self::PriceLow => products.sort_by(|a, b| a.price.amount.cmp(&b.price.amount)),
            Self::PriceHigh => products.sort_by(|a, b| b.price.amount.cmp(&a.price.amount)),
            Self::Rating => products.sort_by(|a, b| b.rating.total_cmp(&a.rating)),
            Self::Newest => products.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        }
    }
}

impl FromStr for SearchSort {
    type Err = UnknownSort;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|sort| sort.as_str() == s)
            .ok_or_else(|| UnknownSort(s.to_string()))
    }
}

impl fmt::Display for SearchSort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for an unrecognized sort key.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown sort key: {0}")]
pub struct UnknownSort(pub String);

/// Normalize a free-text query for matching. Blank queries match everything.
#[must_use]
pub fn normalize_query(query: &str) -> Option<String> {
    let trimmed = query.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_lowercase())
}

/// Run text match, filters, and sort over `products`.
#[must_use]
pub fn filter_and_sort(
    products: &[Product],
    query: &str,
    filters: &SearchFilters,
    sort: SearchSort,
) -> Vec<Product> {
    let needle = normalize_query(query);
    let mut matched: Vec<Product> = products
        .iter()
        .filter(|p| needle.as_deref().is_none_or(|n| p.matches_text(n)))
        .filter(|p| filters.matches(p))
        .cloned()
        .collect();
    sort.apply(&mut matched);
    matched
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use luxe_core::{Price, ProductId};

    pub(crate) fn product(id: &str, name: &str, dollars: i64) -> Product {
        Product {
            id: ProductId::new(id),
            name: name.to_string(),
            price: Price::usd(dollars),
            rating: 4.0,
            tags: Vec::new(),
            category: "Apparel".to_string(),
            brand: None,
            in_stock: true,
            image: None,
            created_at: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    fn hoodie_and_cap() -> Vec<Product> {
        vec![
            product("1", "Red Hoodie", 50),
            product("2", "Blue Cap", 20),
        ]
    }

    fn names(products: &[Product]) -> Vec<&str> {
        products.iter().map(|p| p.name.as_str()).collect()
    }

    #[test]
    fn test_text_query_matches_name() {
        let results = filter_and_sort(
            &hoodie_and_cap(),
            "hoodie",
            &SearchFilters::default(),
            SearchSort::Featured,
        );
        assert_eq!(names(&results), vec!["Red Hoodie"]);
    }

    #[test]
    fn test_text_query_matches_tags() {
        let mut products = hoodie_and_cap();
        products[1].tags = vec!["Streetwear".to_string()];
        let results = filter_and_sort(
            &products,
            "STREET",
            &SearchFilters::default(),
            SearchSort::Featured,
        );
        assert_eq!(names(&results), vec!["Blue Cap"]);
    }

    #[test]
    fn test_whitespace_query_matches_everything() {
        assert_eq!(normalize_query(" \t "), None);
        assert_eq!(normalize_query("  Red "), Some("red".to_string()));

        let results = filter_and_sort(
            &hoodie_and_cap(),
            "   ",
            &SearchFilters::default(),
            SearchSort::Featured,
        );
        assert_eq!(results.len(), 2);
    }

    #[test]
    fn test_sort_price_low() {
        let results = filter_and_sort(
            &hoodie_and_cap(),
            "",
            &SearchFilters::default(),
            SearchSort::PriceLow,
        );
        assert_eq!(names(&results), vec!["Blue Cap", "Red Hoodie"]);

        let results = filter_and_sort(
            &hoodie_and_cap(),
            "  ",
            &SearchFilters::default(),
            SearchSort::PriceHigh,
        );
        assert_eq!(names(&results), vec!["Red Hoodie", "Blue Cap"]);
    }

    #[test]
    fn test_sorts_are_stable() {
        let products = vec![
            product("a", "First", 10),
            product("b", "Second", 10),
            product("c", "Third", 5),
        ];
        let results = filter_and_sort(
            &products,
            "",
            &SearchFilters::default(),
            SearchSort::PriceLow,
        );
        assert_eq!(names(&results), vec!["Third", "First", "Second"]);
    }

    #[test]
    fn test_rating_and_newest() {
        let mut products = hoodie_and_cap();
        products[1].rating = 4.9;
        products[0].created_at = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();

        let by_rating = filter_and_sort(&products, "", &SearchFilters::default(), SearchSort::Rating);
        assert_eq!(names(&by_rating), vec!["Blue Cap", "Red Hoodie"]);

        let by_date = filter_and_sort(&products, "", &SearchFilters::default(), SearchSort::Newest);
        assert_eq!(names(&by_date), vec!["Red Hoodie", "Blue Cap"]);
    }

    #[test]
    fn test_filters() {
        let mut products = hoodie_and_cap();
        products[0].brand = Some("Luxe".to_string());
        products[1].category = "Accessories".to_string();
        products[1].in_stock = false;

        let category = SearchFilters {
            category: Some("accessories".to_string()),
            ..SearchFilters::default()
        };
        assert_eq!(
            names(&filter_and_sort(&products, "", &category, SearchSort::Featured)),
            vec!["Blue Cap"]
        );

        let price = SearchFilters {
            min_price: Some(Decimal::from(25)),
            max_price: Some(Decimal::from(50)),
            ..SearchFilters::default()
        };
        assert_eq!(
            names(&filter_and_sort(&products, "", &price, SearchSort::Featured)),
            vec!["Red Hoodie"]
        );

        let brand = SearchFilters {
            brand: Some("LUXE".to_string()),
            ..SearchFilters::default()
        };
        assert_eq!(
            names(&filter_and_sort(&products, "", &brand, SearchSort::Featured)),
            vec!["Red Hoodie"]
        );

        let stock = SearchFilters {
            in_stock_only: true,
            ..SearchFilters::default()
        };
        assert_eq!(
            names(&filter_and_sort(&products, "", &stock, SearchSort::Featured)),
            vec!["Red Hoodie"]
        );
    }

    #[test]
    fn test_sort_keys() {
        for sort in SearchSort::ALL {
            assert_eq!(sort.as_str().parse::<SearchSort>().unwrap(), sort);
        }
        assert_eq!(SearchSort::parse_lenient("best-match"), SearchSort::Featured);
        assert!("cheapest".parse::<SearchSort>().is_err());
        assert_eq!(SearchSort::PriceHigh.to_string(), "price-high");
    }
}
