//! Translation of filter state into catalog source parameters.

use atelier_model::FetchParams;

use crate::state::FilterState;
use crate::QueryError;

/// Parameters for the catalog source derived from the current state.
///
/// Only category and query go to the source; everything else is filtered
/// locally.
pub fn fetch_params(state: &FilterState) -> FetchParams {
    FetchParams::new(&state.category, &state.query)
}

/// Trait for translating fetch parameters to source-specific syntax.
pub trait QueryDialect {
    /// The output type (query pairs, a URL, ...)
    type Output;

    /// Translate `FetchParams` to this dialect
    fn translate(&self, params: &FetchParams) -> Result<Self::Output, QueryError>;
}

/// Query-string dialect of the marketplace studios endpoint.
///
/// Categories are passed through as given; the service matches them itself,
/// so a category outside the display list still reaches it.
#[derive(Debug, Default)]
pub struct MarketplaceDialect;

impl QueryDialect for MarketplaceDialect {
    type Output = Vec<(&'static str, String)>;

    fn translate(&self, params: &FetchParams) -> Result<Self::Output, QueryError> {
        let mut pairs = Vec::new();

        if let Some(category) = &params.category {
            pairs.push(("category", category.clone()));
        }

        if let Some(search) = &params.search {
            pairs.push(("search", search.clone()));
        }

        Ok(pairs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::FilterAction;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_state_sends_nothing() {
        let params = fetch_params(&FilterState::default());
        assert!(MarketplaceDialect.translate(&params).unwrap().is_empty());
    }

    #[test]
    fn test_category_and_search() {
        let state = FilterState::default()
            .apply(FilterAction::SelectCategory("Commercial".into()))
            .apply(FilterAction::SetQuery(" hotel ".into()));
        let pairs = MarketplaceDialect.translate(&fetch_params(&state)).unwrap();
        assert_eq!(
            pairs,
            vec![("category", "Commercial".to_string()), ("search", "hotel".to_string())]
        );
    }

    #[test]
    fn test_category_outside_display_list_passes_through() {
        let params = FetchParams::new("Lunar Habitat", "");
        assert_eq!(
            MarketplaceDialect.translate(&params).unwrap(),
            vec![("category", "Lunar Habitat".to_string())]
        );
    }
}
