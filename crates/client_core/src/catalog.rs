//! Catalog loading and category filtering.

use std::path::PathBuf;

use reqwest::Client;
use shared::domain::{CatalogDocument, Product};
use tracing::{debug, info};
use url::Url;

use crate::error::{ClientError, ClientResult};

pub const DEFAULT_CATALOG_SOURCE: &str = "products.json";

/// Where the catalog document lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogSource {
    File(PathBuf),
    Remote(Url),
}

impl CatalogSource {
    /// `http://` and `https://` values are treated as URLs, anything else as a
    /// filesystem path.
    pub fn parse(raw: &str) -> ClientResult<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(Self::File(PathBuf::from(DEFAULT_CATALOG_SOURCE)));
        }

        let lower = raw.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            let url = Url::parse(raw).map_err(|err| {
                ClientError::Validation(format!("invalid catalog url '{raw}': {err}"))
            })?;
            return Ok(Self::Remote(url));
        }

        Ok(Self::File(PathBuf::from(raw)))
    }

    fn describe(&self) -> String {
        match self {
            Self::File(path) => path.display().to_string(),
            Self::Remote(url) => url.to_string(),
        }
    }
}

impl Default for CatalogSource {
    fn default() -> Self {
        Self::File(PathBuf::from(DEFAULT_CATALOG_SOURCE))
    }
}

pub struct CatalogLoader {
    http: Client,
    source: CatalogSource,
}

impl CatalogLoader {
    pub fn new(source: CatalogSource) -> Self {
        Self::with_client(Client::new(), source)
    }

    pub fn with_client(http: Client, source: CatalogSource) -> Self {
        Self { http, source }
    }

    pub fn source(&self) -> &CatalogSource {
        &self.source
    }

    /// Reads the whole catalog. Unreachable sources and malformed documents are
    /// returned as errors; nothing is cached.
    pub async fn load_catalog(&self) -> ClientResult<Vec<Product>> {
        let target = self.source.describe();
        let raw = match &self.source {
            CatalogSource::File(path) => tokio::fs::read_to_string(path)
                .await
                .map_err(|err| ClientError::fetch(&target, err))?,
            CatalogSource::Remote(url) => self
                .http
                .get(url.clone())
                .send()
                .await
                .and_then(|res| res.error_for_status())
                .map_err(|err| ClientError::fetch(&target, err))?
                .text()
                .await
                .map_err(|err| ClientError::fetch(&target, err))?,
        };

        let document: CatalogDocument =
            serde_json::from_str(&raw).map_err(|source| ClientError::Parse {
                what: "catalog document",
                source,
            })?;
        info!(source = %target, products = document.products.len(), "catalog loaded");
        Ok(document.products)
    }
}

/// Products whose category equals `category`, in catalog order.
pub fn filter_by_category(products: &[Product], category: &str) -> Vec<Product> {
    let filtered: Vec<Product> = products
        .iter()
        .filter(|product| product.category == category)
        .cloned()
        .collect();
    debug!(category, matched = filtered.len(), "filtered catalog");
    filtered
}

/// Distinct categories in first-seen order.
pub fn categories(products: &[Product]) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for product in products {
        if !seen.iter().any(|category| category == &product.category) {
            seen.push(product.category.clone());
        }
    }
    seen
}

#[cfg(test)]
#[path = "tests/catalog_tests.rs"]
mod tests;
