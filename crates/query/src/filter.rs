//! Record matching against a `FilterState`.
//!
//! Option matching is a case-insensitive substring test against a haystack of
//! record text, so "Villa" matches "Luxury Villa Design". The flip side is that
//! "Office" also matches "Office Supplies Retailer"; that imprecision is kept
//! on purpose since exact matching would drop compound descriptions.

use atelier_features::{any_part_contains, lowercase_parts};
use atelier_model::{ServiceSignals, StudioRecord, CATEGORY_ALL};

use crate::domain::RangeFacet;
use crate::facet::Facet;
use crate::state::FilterState;

/// Text searched by facet options.
pub fn facet_haystack(record: &StudioRecord) -> Vec<String> {
    let singles = [
        Some(record.title.as_str()),
        record.summary.as_deref(),
        record.description.as_deref(),
        record.typology.as_deref(),
        record.program_type.as_deref(),
        record.firm.name.as_deref(),
    ];
    let lists = [
        &record.styles,
        &record.programs,
        &record.categories,
        &record.tags,
        &record.features,
        &record.keywords,
        &record.firm.styles,
        &record.firm.specialisations,
    ];
    lowercase_parts(
        singles
            .into_iter()
            .flatten()
            .chain(lists.into_iter().flatten().map(String::as_str)),
    )
}

/// Text searched by image-derived keywords.
pub fn keyword_haystack(record: &StudioRecord) -> Vec<String> {
    let singles = [
        Some(record.title.as_str()),
        record.summary.as_deref(),
        record.description.as_deref(),
        record.typology.as_deref(),
        record.program_type.as_deref(),
        record.firm.name.as_deref(),
    ];
    let lists = [
        &record.styles,
        &record.categories,
        &record.tags,
        &record.features,
        &record.firm.styles,
    ];
    lowercase_parts(
        singles
            .into_iter()
            .flatten()
            .chain(lists.into_iter().flatten().map(String::as_str)),
    )
}

/// Whether `record` passes category, focus, facet and range filters.
///
/// The free-text query and image keywords are separate passes; see
/// [`matches_query`] and [`matches_keywords`].
pub fn matches(record: &StudioRecord, signals: &ServiceSignals, state: &FilterState) -> bool {
    if state.category != CATEGORY_ALL && !record.categories.iter().any(|c| *c == state.category) {
        return false;
    }

    if !state.focus.admits(signals) {
        return false;
    }

    if !matches_facets(record, state) {
        return false;
    }

    RangeFacet::ALL
        .into_iter()
        .all(|facet| state.range(facet).admits(facet.value(record)))
}

/// Cross-facet AND, within-facet OR.
fn matches_facets(record: &StudioRecord, state: &FilterState) -> bool {
    let mut selected = Facet::ALL
        .into_iter()
        .filter_map(|facet| state.selected(facet))
        .peekable();
    if selected.peek().is_none() {
        return true;
    }

    let haystack = facet_haystack(record);
    selected.all(|options| options.iter().any(|option| any_part_contains(&haystack, option)))
}

/// Free-text pass over title, summary and firm name. A blank query passes.
pub fn matches_query(record: &StudioRecord, query: &str) -> bool {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }
    [
        Some(record.title.as_str()),
        record.summary.as_deref(),
        record.firm.name.as_deref(),
    ]
    .into_iter()
    .flatten()
    .any(|text| text.to_lowercase().contains(&needle))
}

/// Image keyword pass: any keyword in any haystack part. No keywords passes.
pub fn matches_keywords(record: &StudioRecord, keywords: &[String]) -> bool {
    if keywords.iter().all(|k| k.trim().is_empty()) {
        return true;
    }
    let haystack = keyword_haystack(record);
    keywords.iter().any(|keyword| any_part_contains(&haystack, keyword))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Domain, RangeDomains, RangeSelection};
    use crate::state::{FilterAction, ServiceFocus};
    use atelier_model::Capability;
    use pretty_assertions::assert_eq;

    fn no_signals() -> ServiceSignals {
        ServiceSignals::default()
    }

    fn select(state: &FilterState, facet: Facet, options: &[&str]) -> FilterState {
        state.apply(FilterAction::SelectOptions {
            facet,
            options: options.iter().map(|o| o.to_string()).collect(),
        })
    }

    #[test]
    fn test_typology_substring_match() {
        let villa = StudioRecord::new("1", "Luxury Villa Design");
        let tower = StudioRecord::new("2", "Corporate Tower");
        let state = select(&FilterState::default(), Facet::Typology, &["Villa"]);

        assert!(matches(&villa, &no_signals(), &state));
        assert!(!matches(&tower, &no_signals(), &state));
    }

    #[test]
    fn test_facets_and_across_or_within() {
        let mut record = StudioRecord::new("1", "Cliff House");
        record.styles = vec!["Brutalism".into()];
        record.tags = vec!["Coastal".into()];

        let style_only = select(&FilterState::default(), Facet::Style, &["Brutalism"]);
        assert!(matches(&record, &no_signals(), &style_only));

        let style_and_roof = select(&style_only, Facet::RoofType, &["Thatch"]);
        assert!(!matches(&record, &no_signals(), &style_and_roof));

        let roof_either = select(&style_and_roof, Facet::RoofType, &["Thatch", "Cliff"]);
        assert!(matches(&record, &no_signals(), &roof_either));
    }

    #[test]
    fn test_firm_specialisations_are_searched() {
        let mut record = StudioRecord::new("1", "Studio K");
        record.firm.specialisations = vec!["Rammed Earth".into()];
        let state = select(&FilterState::default(), Facet::MaterialUsed, &["rammed earth"]);
        assert!(matches(&record, &no_signals(), &state));
    }

    #[test]
    fn test_category_is_exact_and_case_sensitive() {
        let record = StudioRecord::new("1", "Loft").with_categories(vec!["Residential".into()]);
        let exact = FilterState::default().apply(FilterAction::SelectCategory("Residential".into()));
        let lower = FilterState::default().apply(FilterAction::SelectCategory("residential".into()));
        let partial = FilterState::default().apply(FilterAction::SelectCategory("Resident".into()));

        assert!(matches(&record, &no_signals(), &exact));
        assert!(!matches(&record, &no_signals(), &lower));
        assert!(!matches(&record, &no_signals(), &partial));
        assert!(matches(&record, &no_signals(), &FilterState::default()));
    }

    #[test]
    fn test_service_focus() {
        let record = StudioRecord::new("1", "Planner");
        let plans = ServiceSignals::from_fn(|c| c == Capability::PlanCatalogue);
        let state = FilterState::default().apply(FilterAction::SetFocus(ServiceFocus::Plans));
        assert!(matches(&record, &plans, &state));
        assert!(!matches(&record, &no_signals(), &state));
    }

    #[test]
    fn test_absent_values_pass_ranges() {
        let mut small = StudioRecord::new("small", "Small");
        small.area_sqft = Some(200.0);
        let mut large = StudioRecord::new("large", "Large");
        large.area_sqft = Some(800.0);
        let unknown = StudioRecord::new("unknown", "Unknown");
        let records = vec![small, unknown, large];

        let domains = RangeDomains::from_records(&records);
        assert_eq!(domains.area, Domain::new(200.0, 800.0));

        let state = FilterState::with_domains(domains).apply(FilterAction::SetRange {
            facet: RangeFacet::Area,
            selection: RangeSelection::new(300.0, 500.0),
        });
        let kept: Vec<_> = records
            .iter()
            .filter(|r| matches(r, &no_signals(), &state))
            .map(|r| r.id.as_str())
            .collect();
        assert_eq!(kept, vec!["unknown"]);
    }

    #[test]
    fn test_integer_ranges() {
        let mut record = StudioRecord::new("1", "Tower");
        record.floors = Some(30);
        let state = FilterState::default().apply(FilterAction::SetRange {
            facet: RangeFacet::Floors,
            selection: RangeSelection::new(0.0, 10.0),
        });
        assert!(!matches(&record, &no_signals(), &state));
    }

    #[test]
    fn test_matches_is_idempotent() {
        let record = StudioRecord::new("1", "Luxury Villa Design");
        let state = select(&FilterState::default(), Facet::Typology, &["Villa"]);
        let first = matches(&record, &no_signals(), &state);
        let second = matches(&record, &no_signals(), &state);
        assert_eq!(first, second);
    }

    #[test]
    fn test_query_pass() {
        let mut record = StudioRecord::new("1", "Harbour House");
        record.firm.name = Some("Atelier Nord".into());
        assert!(matches_query(&record, ""));
        assert!(matches_query(&record, "  harbour "));
        assert!(matches_query(&record, "NORD"));
        assert!(!matches_query(&record, "villa"));

        // the query pass does not look at descriptions
        record.description = Some("villa".into());
        assert!(!matches_query(&record, "villa"));
    }

    #[test]
    fn test_keyword_pass() {
        let loft = StudioRecord::new("1", "Minimalist Concrete Loft");
        let villa = StudioRecord::new("2", "Classic Villa");
        let keywords = vec!["minimalist".to_string(), "concrete".to_string()];

        assert!(matches_keywords(&loft, &keywords));
        assert!(!matches_keywords(&villa, &keywords));
        assert!(matches_keywords(&villa, &[]));
    }

    #[test]
    fn test_substring_false_positive_is_preserved() {
        let retailer = StudioRecord::new("1", "Office Supplies Retailer");
        let state = select(&FilterState::default(), Facet::Typology, &["Office"]);
        assert!(matches(&retailer, &no_signals(), &state));
    }
}
