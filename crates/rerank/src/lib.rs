//! Ranking and pagination for studio listings.
//!
//! Takes annotated listings and the current filter state and produces the
//! ordered result list the view renders, plus the visible page of it.

pub mod page;
pub mod sort;

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use atelier_model::ListingHit;
use atelier_query::{matches, matches_keywords, matches_query, FilterState, RangeFacet};
use serde::{Deserialize, Serialize};

pub use page::{Paginator, PAGE_SIZE};
pub use sort::{compare, sort, SortOrder};

/// Configuration for the ranking pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankConfig {
    /// Listings revealed per "load more"
    pub page_size: usize,
    /// Initial sort order
    pub order: SortOrder,
}

impl Default for RankConfig {
    fn default() -> Self {
        Self {
            page_size: PAGE_SIZE,
            order: SortOrder::Unsorted,
        }
    }
}

/// Filter and order listings.
///
/// Facet filtering runs first, then the free-text pass, the sort, and
/// finally the image-keyword pass.
pub fn rank(candidates: &[ListingHit], state: &FilterState, order: SortOrder) -> Vec<ListingHit> {
    let mut hits: Vec<ListingHit> = candidates
        .iter()
        .filter(|hit| matches(&hit.record, &hit.signals, state))
        .filter(|hit| matches_query(&hit.record, &state.query))
        .cloned()
        .collect();

    sort(&mut hits, order);

    hits.retain(|hit| matches_keywords(&hit.record, &state.keywords));
    hits
}

/// Identity of a result set: changes with the query, filters, sort or results.
pub fn result_fingerprint(state: &FilterState, order: SortOrder, results: &[ListingHit]) -> u64 {
    let mut hasher = DefaultHasher::new();
    state.category.hash(&mut hasher);
    state.query.trim().hash(&mut hasher);
    state.focus.hash(&mut hasher);
    for (facet, options) in &state.facets {
        facet.hash(&mut hasher);
        options.hash(&mut hasher);
    }
    for facet in RangeFacet::ALL {
        let selection = state.range(facet);
        selection.low.to_bits().hash(&mut hasher);
        selection.high.to_bits().hash(&mut hasher);
    }
    state.keywords.hash(&mut hasher);
    order.hash(&mut hasher);
    results.len().hash(&mut hasher);
    for hit in results {
        hit.record.id.hash(&mut hasher);
    }
    hasher.finish()
}

/// The visible part of a ranked result list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedPage {
    pub hits: Vec<ListingHit>,
    pub total: usize,
    pub has_more: bool,
}

impl RankedPage {
    pub fn from_results(results: &[ListingHit], paginator: &Paginator) -> Self {
        Self {
            hits: paginator.window(results).to_vec(),
            total: results.len(),
            has_more: paginator.has_more(results.len()),
        }
    }
}
