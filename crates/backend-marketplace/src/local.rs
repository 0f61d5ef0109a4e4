//! In-memory fallback catalog.

use std::path::Path;

use atelier_model::{FetchParams, RawRecord};
use serde_json::Value;

use crate::{parse_response, BackendError, CatalogMeta, CatalogPage, CatalogSource};

/// A fixed set of raw records filtered in process.
///
/// Used when the marketplace service is unreachable and for fixture runs of
/// the CLI. Category matches are case-insensitive substrings of any record
/// category; search matches title, summary or firm name.
#[derive(Debug, Clone, Default)]
pub struct LocalCatalog {
    items: Vec<RawRecord>,
}

impl LocalCatalog {
    pub fn new(items: Vec<RawRecord>) -> Self {
        Self { items }
    }

    /// Load a fixture file: either a JSON array of records or a `{items, meta}`
    /// response body.
    pub fn from_file(path: &Path) -> Result<Self, BackendError> {
        let text = std::fs::read_to_string(path)?;
        let json: Value =
            serde_json::from_str(&text).map_err(|e| BackendError::ParseError(e.to_string()))?;

        let items = match json {
            Value::Array(items) => items,
            other => parse_response(other)?.items,
        };
        tracing::debug!(path = %path.display(), items = items.len(), "Loaded local catalog");
        Ok(Self { items })
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Records admitted by the fetch parameters, in catalog order.
    pub fn filter(&self, params: &FetchParams) -> Vec<RawRecord> {
        let category = params.category.as_deref().map(str::to_lowercase);
        let search = params.search.as_deref().map(str::to_lowercase);

        self.items
            .iter()
            .filter(|item| {
                category
                    .as_deref()
                    .map_or(true, |category| category_matches(item, category))
            })
            .filter(|item| {
                search
                    .as_deref()
                    .map_or(true, |search| search_matches(item, search))
            })
            .cloned()
            .collect()
    }
}

fn text_at<'a>(item: &'a Value, path: &[&str]) -> Option<&'a str> {
    path.iter()
        .try_fold(item, |value, key| value.get(key))
        .and_then(Value::as_str)
}

fn category_matches(item: &Value, category: &str) -> bool {
    let categories = item.get("categories").and_then(Value::as_array);
    let listed = categories
        .into_iter()
        .flatten()
        .filter_map(Value::as_str)
        .chain(text_at(item, &["category"]));

    listed
        .map(str::to_lowercase)
        .any(|entry| entry.contains(category))
}

fn search_matches(item: &Value, search: &str) -> bool {
    let paths: [&[&str]; 3] = [&["title"], &["summary"], &["firm", "name"]];
    paths
        .into_iter()
        .filter_map(|path| text_at(item, path))
        .any(|text| text.to_lowercase().contains(search))
}

impl CatalogSource for LocalCatalog {
    async fn fetch(&self, params: &FetchParams) -> Result<CatalogPage, BackendError> {
        let items = self.filter(params);
        Ok(CatalogPage {
            meta: CatalogMeta {
                total: items.len(),
                fallback: true,
            },
            items,
        })
    }

    async fn health_check(&self) -> Result<(), BackendError> {
        Ok(())
    }

    fn name(&self) -> &'static str {
        "local"
    }
}
