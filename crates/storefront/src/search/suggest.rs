//! Quick suggestions for the search modal.

use crate::models::Product;
use crate::routes::Route;

use super::normalize_query;

/// Product matches shown per query.
pub const MAX_PRODUCT_SUGGESTIONS: usize = 4;

/// Category matches shown per query.
pub const MAX_CATEGORY_SUGGESTIONS: usize = 3;

/// Shown before the user types anything.
pub const TRENDING_SEARCHES: [&str; 4] = [
    "AI Hoodie",
    "Cyberpunk Jacket",
    "Minimalist Watch",
    "Summer Collection",
];

/// Suggestions for a partially typed query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Suggestions {
    pub products: Vec<Product>,
    pub categories: Vec<String>,
}

impl Suggestions {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty() && self.categories.is_empty()
    }

    /// Where selecting each suggestion navigates, products first.
    #[must_use]
    pub fn routes(&self) -> Vec<Route> {
        self.products
            .iter()
            .map(|p| Route::Product(p.id.clone()))
            .chain(self.categories.iter().map(|c| Route::Shop {
                category: Some(c.clone()),
            }))
            .collect()
    }
}

/// Match `query` against product names and catalog categories.
///
/// Unlike full search, product suggestions only look at names. Categories
/// are taken from the catalog in first-seen order. A blank query suggests
/// nothing.
#[must_use]
pub fn suggest(products: &[Product], query: &str) -> Suggestions {
    let Some(needle) = normalize_query(query) else {
        return Suggestions::default();
    };

    let matched_products = products
        .iter()
        .filter(|p| p.name.to_lowercase().contains(&needle))
        .take(MAX_PRODUCT_SUGGESTIONS)
        .cloned()
        .collect();

    let mut categories: Vec<String> = Vec::new();
    for product in products {
        if categories.len() == MAX_CATEGORY_SUGGESTIONS {
            break;
        }
        if product.category.to_lowercase().contains(&needle)
            && !categories.contains(&product.category)
        {
            categories.push(product.category.clone());
        }
    }

    Suggestions {
        products: matched_products,
        categories,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::tests::product;

    #[test]
    fn test_blank_query_suggests_nothing() {
        let products = vec![product("1", "Hoodie", 10)];
        assert!(suggest(&products, "   ").is_empty());
    }

    #[test]
    fn test_caps_products_and_categories() {
        let mut products: Vec<Product> = (0..6)
            .map(|i| product(&i.to_string(), &format!("Wear {i}"), 10))
            .collect();
        for (i, p) in products.iter_mut().enumerate() {
            p.category = format!("Wearables {}", i % 5);
        }

        let suggestions = suggest(&products, "wear");
        assert_eq!(suggestions.products.len(), MAX_PRODUCT_SUGGESTIONS);
        assert_eq!(
            suggestions.categories,
            vec!["Wearables 0", "Wearables 1", "Wearables 2"]
        );
    }

    #[test]
    fn test_routes() {
        let mut hoodie = product("h1", "AI Hoodie", 80);
        hoodie.category = "Hoodies".to_string();

        let suggestions = suggest(&[hoodie], "hood");
        assert_eq!(
            suggestions.routes(),
            vec![
                Route::Product(luxe_core::ProductId::new("h1")),
                Route::Shop {
                    category: Some("Hoodies".to_string())
                },
            ]
        );
    }
}
