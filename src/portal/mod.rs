//! Mod portal abstraction.
//!
//! The portal is the metadata source for packages and their releases.

mod factorio;

use anyhow::Result;
use async_trait::async_trait;

use crate::domain::model::Package;

pub use factorio::{DEFAULT_PORTAL_URL, FactorioPortal};

/// Search parameters for the portal's package listing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchQuery {
    /// Free-text query
    pub q: Option<String>,
    /// `top`, `alpha` or `updated`
    pub order: Option<String>,
    pub page_size: Option<u32>,
    pub page: Option<u32>,
}

impl SearchQuery {
    pub fn text(q: impl Into<String>) -> Self {
        Self {
            q: Some(q.into()),
            ..Default::default()
        }
    }

    /// Query parameters in a fixed order.
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(q) = &self.q {
            params.push(("q", q.clone()));
        }
        if let Some(order) = &self.order {
            params.push(("order", order.clone()));
        }
        if let Some(page_size) = self.page_size {
            params.push(("page_size", page_size.to_string()));
        }
        if let Some(page) = self.page {
            params.push(("page", page.to_string()));
        }
        params
    }
}

/// Metadata source for packages.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ModPortal: Send + Sync {
    /// Fetch a package with all of its releases, most recent first.
    ///
    /// Fails with `ModError::PackageNotFound` when the portal does not know `name`.
    async fn fetch_package(&self, name: &str) -> Result<Package>;

    /// Search the portal. Returned packages carry at most their latest release.
    async fn search_packages(&self, query: &SearchQuery) -> Result<Vec<Package>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_query_params() {
        let query = SearchQuery {
            q: Some("FARL".into()),
            order: Some("top".into()),
            page_size: Some(25),
            page: None,
        };

        assert_eq!(
            query.to_params(),
            vec![
                ("q", "FARL".to_string()),
                ("order", "top".to_string()),
                ("page_size", "25".to_string()),
            ]
        );
    }

    #[test]
    fn test_search_query_text() {
        let query = SearchQuery::text("bob");
        assert_eq!(query.q.as_deref(), Some("bob"));
        assert_eq!(query.to_params().len(), 1);
    }
}
