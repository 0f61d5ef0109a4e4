//! Filter state, range domains and record matching.
//!
//! Everything here is a pure function of its inputs:
//! - `facet`: the eleven multi-select facets and their vocabularies
//! - `domain`: numeric range facets and domain computation
//! - `state`: the immutable `FilterState` and its reducer
//! - `filter`: matching a record against a state
//! - `dialect`: translating state into catalog source parameters

use thiserror::Error;

pub mod dialect;
pub mod domain;
pub mod facet;
pub mod filter;
pub mod state;

pub use dialect::{fetch_params, MarketplaceDialect, QueryDialect};
pub use domain::{compute_domain, Domain, RangeDomains, RangeFacet, RangeSelection};
pub use facet::{typologies_for, Facet};
pub use filter::{matches, matches_keywords, matches_query};
pub use state::{FilterAction, FilterState, RangeSelections, ServiceFocus};

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("Unknown facet: {0}")]
    UnknownFacet(String),
    #[error("Unknown range facet: {0}")]
    UnknownRangeFacet(String),
    #[error("Unknown service focus: {0}")]
    UnknownFocus(String),
    #[error("Unknown sort order: {0}")]
    UnknownSort(String),
    #[error("Invalid range (expected low..high): {0}")]
    InvalidRange(String),
}
