//! Navigable client routes.
//!
//! # Route Structure
//!
//! ```text
//! /                       - Home page
//! /login                  - Sign-in form
//! /signup                 - Sign-up form
//! /search?q=<term>        - Search results
//! /shop?category=<name>   - Catalog, optionally narrowed to one category
//! /product/<id>           - Product detail
//! /dashboard              - Account dashboard (requires session)
//! ```
//!
//! Query values and the product id are percent-encoded when rendered and
//! decoded when parsed.

use std::fmt;

use luxe_core::ProductId;

/// A client-side destination.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Route {
    Home,
    Login,
    SignUp,
    Search { query: String },
    Shop { category: Option<String> },
    Product(ProductId),
    Dashboard,
}

impl Route {
    /// Render the route as a path with query string.
    #[must_use]
    pub fn path(&self) -> String {
        match self {
            Self::Home => "/".to_string(),
            Self::Login => "/login".to_string(),
            Self::SignUp => "/signup".to_string(),
            Self::Search { query } => format!("/search?q={}", urlencoding::encode(query)),
            Self::Shop { category: None } => "/shop".to_string(),
            Self::Shop {
                category: Some(category),
            } => format!("/shop?category={}", urlencoding::encode(category)),
            Self::Product(id) => format!("/product/{}", urlencoding::encode(id.as_str())),
            Self::Dashboard => "/dashboard".to_string(),
        }
    }

    /// Parse a path (with optional query string) into a route.
    ///
    /// Returns `None` for paths that don't name a known route.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let (path, query) = raw.split_once('?').unwrap_or((raw, ""));
        let path = match path.trim_end_matches('/') {
            "" => "/",
            trimmed => trimmed,
        };

        match path {
            "/" => Some(Self::Home),
            "/login" => Some(Self::Login),
            "/signup" => Some(Self::SignUp),
            "/dashboard" => Some(Self::Dashboard),
            "/search" => Some(Self::Search {
                query: query_param(query, "q").unwrap_or_default(),
            }),
            "/shop" => Some(Self::Shop {
                category: query_param(query, "category").filter(|c| !c.is_empty()),
            }),
            _ => {
                let id = path.strip_prefix("/product/")?;
                if id.is_empty() || id.contains('/') {
                    return None;
                }
                let id = urlencoding::decode(id).ok()?;
                Some(Self::Product(ProductId::new(id.into_owned())))
            }
        }
    }

    /// Whether the route is only reachable with a session.
    #[must_use]
    pub const fn requires_session(&self) -> bool {
        matches!(self, Self::Dashboard)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

fn query_param(query: &str, name: &str) -> Option<String> {
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
}
