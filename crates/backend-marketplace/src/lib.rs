//! Catalog sources for studio listings.
//!
//! Provides the `CatalogSource` trait and its marketplace HTTP
//! implementation, plus the local fallback catalog, the workspace store and
//! the image palette analyzer. Sources hand back raw JSON records; turning
//! them into `StudioRecord`s is left to the feature extraction stage.

pub mod local;
pub mod palette;
pub mod workspace;

use std::future::Future;
use std::time::Duration;

use atelier_model::{FetchParams, RawRecord};
use atelier_query::{MarketplaceDialect, QueryDialect, QueryError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

pub use local::LocalCatalog;
pub use palette::{
    keywords_from_color, rgb_to_hsl, Hsl, ImageAnalysis, ImageAnalyzer, PaletteAnalyzer, Rgb,
};
pub use workspace::WorkspaceStore;

/// Errors from catalog and analysis collaborators.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Query execution failed: {0}")]
    QueryFailed(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Backend not available")]
    Unavailable,

    #[error("Invalid query: {0}")]
    Query(#[from] QueryError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image analysis failed: {0}")]
    Image(String),
}

/// Summary metadata returned with a page of records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogMeta {
    /// Total matching records known to the source
    pub total: usize,

    /// Set when the page came from a fallback catalog
    #[serde(default)]
    pub fallback: bool,
}

/// One response from a catalog source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogPage {
    pub items: Vec<RawRecord>,
    pub meta: CatalogMeta,
}

impl CatalogPage {
    pub fn new(items: Vec<RawRecord>) -> Self {
        let total = items.len();
        Self {
            items,
            meta: CatalogMeta {
                total,
                fallback: false,
            },
        }
    }
}

/// Trait for catalog sources (marketplace service, local fallback, fixtures).
///
/// Only category and search are sent to a source; every other filter runs
/// locally over the returned records.
pub trait CatalogSource {
    /// Fetch raw records matching the parameters.
    fn fetch(
        &self,
        params: &FetchParams,
    ) -> impl Future<Output = Result<CatalogPage, BackendError>> + Send;

    /// Check if the source is reachable.
    fn health_check(&self) -> impl Future<Output = Result<(), BackendError>> + Send;

    /// Get the source name for logging.
    fn name(&self) -> &'static str;
}

/// Marketplace service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketplaceConfig {
    /// Base URL of the marketplace API, without trailing slash
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for MarketplaceConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:4000/api".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Marketplace HTTP catalog.
pub struct MarketplaceBackend {
    config: MarketplaceConfig,
    client: reqwest::Client,
}

impl MarketplaceBackend {
    /// Create a new marketplace backend.
    pub fn new(config: MarketplaceConfig) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| BackendError::Connection(e.to_string()))?;

        Ok(Self { config, client })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    /// Build the query string pairs for the studios endpoint.
    fn build_query(&self, params: &FetchParams) -> Result<Vec<(&'static str, String)>, BackendError> {
        Ok(MarketplaceDialect.translate(params)?)
    }
}

/// Parse a `{items, meta}` studios response.
///
/// A missing `items` reads as an empty page and a missing `meta.total` falls
/// back to the number of items.
pub fn parse_response(response: Value) -> Result<CatalogPage, BackendError> {
    let body = response
        .as_object()
        .ok_or_else(|| BackendError::ParseError("Response is not an object".to_string()))?;

    let items = match body.get("items") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items.clone(),
        Some(_) => {
            return Err(BackendError::ParseError("items is not an array".to_string()));
        }
    };

    let meta = body.get("meta");
    let total = meta
        .and_then(|m| m.get("total"))
        .and_then(Value::as_u64)
        .map(|t| t as usize)
        .unwrap_or(items.len());
    let fallback = meta
        .and_then(|m| m.get("fallback"))
        .and_then(Value::as_bool)
        .unwrap_or(false);

    Ok(CatalogPage {
        items,
        meta: CatalogMeta { total, fallback },
    })
}

impl CatalogSource for MarketplaceBackend {
    async fn fetch(&self, params: &FetchParams) -> Result<CatalogPage, BackendError> {
        let query = self.build_query(params)?;
        let url = self.endpoint("marketplace/studios");

        tracing::debug!(url = %url, ?query, "Fetching marketplace studios");

        let response = self
            .client
            .get(&url)
            .query(&query)
            .send()
            .await
            .map_err(|e| BackendError::Connection(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::QueryFailed(format!("HTTP {}: {}", status, body)));
        }

        let json: Value = response
            .json()
            .await
            .map_err(|e| BackendError::ParseError(e.to_string()))?;

        let page = parse_response(json)?;
        tracing::debug!(items = page.items.len(), total = page.meta.total, "Marketplace page");
        Ok(page)
    }

    async fn health_check(&self) -> Result<(), BackendError> {
        let response = self
            .client
            .get(self.endpoint("health"))
            .send()
            .await
            .map_err(|e| BackendError::Connection(e.to_string()))?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(BackendError::Unavailable)
        }
    }

    fn name(&self) -> &'static str {
        "marketplace"
    }
}
