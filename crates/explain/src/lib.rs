//! Explanation generation for studio listings.
//!
//! Converts service signals and filter state into human-readable text
//! suitable for listing cards, filter chips and the CLI report.

use std::collections::BTreeMap;

use atelier_features::{matched_keywords, SignalRules};
use atelier_model::{Capability, ListingHit, StudioRecord, CATEGORY_ALL};
use atelier_query::{Facet, FilterState, RangeFacet, ServiceFocus};
use serde::{Deserialize, Serialize};

/// Tags kept in a facet count list.
const TAG_FACET_LIMIT: usize = 15;

/// Whether a tile describes a service or a productized offering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TileKind {
    Service,
    Product,
}

/// A structured explanation for one capability of a listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Explanation {
    pub capability: Capability,

    /// Short summary (the tile label)
    pub summary: String,

    /// Tile description
    pub detail: String,

    pub kind: TileKind,

    /// Keywords that triggered the capability
    pub evidence: Vec<EvidenceItem>,
}

/// A piece of evidence supporting a capability.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvidenceItem {
    /// Type of evidence
    pub kind: String,

    /// The specific value or match
    pub value: String,

    /// Optional context
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

/// Tile description for a capability.
pub fn tile_description(capability: Capability) -> &'static str {
    match capability {
        Capability::Design => {
            "Creating plans and BIM-ready blueprints for residential, commercial, \
             institutional, and mixed-use programmes."
        }
        Capability::Interior => {
            "Space planning, furniture and FF&E schedules, finish palettes, and \
             experiential styling for hospitality and workplace briefs."
        }
        Capability::Urban => {
            "Transit-oriented masterplans, civic decks, sceneography, and \
             broadcast-grade environments across public infrastructure."
        }
        Capability::Sustainability => {
            "Passive design moves, energy modelling, low-carbon materials, and \
             regenerative water/landscape systems for resilient builds."
        }
        Capability::PlanCatalogue => {
            "Builder-ready catalogues with adaptable residential modules, allowing \
             teams to licence a plan set and move straight to permitting."
        }
        Capability::DesignBuild => {
            "Turnkey delivery where the studio designs, procures, and constructs \
             the asset, selling the completed project as a productized outcome."
        }
    }
}

/// Explanation for a capability, without record evidence.
pub fn explain_capability(capability: Capability) -> Explanation {
    Explanation {
        capability,
        summary: capability.label().to_string(),
        detail: tile_description(capability).to_string(),
        kind: if capability.is_service() {
            TileKind::Service
        } else {
            TileKind::Product
        },
        evidence: Vec::new(),
    }
}

/// Generate explanations for every capability a listing offers.
pub fn explain_signals(hit: &ListingHit, rules: &SignalRules) -> Vec<Explanation> {
    hit.signals
        .capabilities()
        .into_iter()
        .map(|capability| {
            let mut explanation = explain_capability(capability);
            explanation.evidence = evidence_for(&hit.record, rules, capability);
            explanation
        })
        .collect()
}

fn evidence_for(
    record: &StudioRecord,
    rules: &SignalRules,
    capability: Capability,
) -> Vec<EvidenceItem> {
    let mut evidence: Vec<EvidenceItem> = matched_keywords(record, rules, capability)
        .into_iter()
        .map(|keyword| EvidenceItem {
            kind: "keyword".to_string(),
            value: keyword,
            context: None,
        })
        .collect();

    if capability == Capability::PlanCatalogue {
        if let Some(catalog_type) = record.catalog_type.as_deref() {
            if catalog_type.trim().eq_ignore_ascii_case("plan") {
                evidence.push(EvidenceItem {
                    kind: "catalog_type".to_string(),
                    value: catalog_type.trim().to_string(),
                    context: Some("Listed in the plan catalogue".to_string()),
                });
            }
        }
    }
    evidence
}

/// One-line summary of what a listing offers.
pub fn summarize_listing(hit: &ListingHit) -> String {
    let firm = hit.record.display_firm();
    if hit.signals.badges.is_empty() {
        return format!("{}: no listed services.", firm);
    }
    format!("{}: {}", firm, hit.signals.badges.join(", "))
}

/// Number of active facet options plus one per narrowed range.
pub fn active_filter_count(state: &FilterState) -> usize {
    let options: usize = state.facets.values().map(|set| set.len()).sum();
    let ranges = RangeFacet::ALL
        .into_iter()
        .filter(|facet| state.range_is_narrowed(*facet))
        .count();
    options + ranges
}

/// Where a filter chip came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ChipKind {
    Category,
    Facet,
    Range,
    Focus,
    Query,
    Keyword,
}

/// A removable active-filter label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterChip {
    pub kind: ChipKind,
    /// Facet or group name
    pub field: String,
    pub label: String,
}

impl FilterChip {
    fn new(kind: ChipKind, field: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            kind,
            field: field.into(),
            label: label.into(),
        }
    }
}

/// Human-readable list of every active filter.
///
/// Order: category, facet options (facet order, then option order), ranges,
/// focus, query, keywords.
pub fn describe_filters(state: &FilterState) -> Vec<FilterChip> {
    let mut chips = Vec::new();

    if state.category != CATEGORY_ALL {
        chips.push(FilterChip::new(ChipKind::Category, "Category", state.category.clone()));
    }

    for facet in Facet::ALL {
        if let Some(options) = state.selected(facet) {
            for option in options {
                chips.push(FilterChip::new(ChipKind::Facet, facet.label(), option.clone()));
            }
        }
    }

    for facet in RangeFacet::ALL {
        if state.range_is_narrowed(facet) {
            let selection = state.range(facet);
            chips.push(FilterChip::new(
                ChipKind::Range,
                facet.label(),
                format!("{}: {} to {}", facet.label(), selection.low, selection.high),
            ));
        }
    }

    if state.focus != ServiceFocus::All {
        chips.push(FilterChip::new(ChipKind::Focus, "Offering", state.focus.label()));
    }

    let query = state.query.trim();
    if !query.is_empty() {
        chips.push(FilterChip::new(ChipKind::Query, "Search", format!("\"{}\"", query)));
    }

    for keyword in &state.keywords {
        chips.push(FilterChip::new(ChipKind::Keyword, "Image", keyword.clone()));
    }

    chips
}

/// A facet value and the number of records carrying it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetCount {
    pub name: String,
    pub count: usize,
}

/// Observed price bounds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceRange {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

/// Facet summary over a record list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FacetCounts {
    pub categories: Vec<FacetCount>,
    pub tags: Vec<FacetCount>,
    pub styles: Vec<FacetCount>,
    pub price_range: PriceRange,
}

/// Count categories, tags and styles, most frequent first.
pub fn facet_counts(records: &[StudioRecord]) -> FacetCounts {
    let mut tags = count_values(records, |r| &r.tags);
    tags.truncate(TAG_FACET_LIMIT);

    let prices = records.iter().filter_map(|r| r.price).filter(|p| p.is_finite());
    let price_range = prices.fold(PriceRange { min: None, max: None }, |acc, price| PriceRange {
        min: Some(acc.min.map_or(price, |m| m.min(price))),
        max: Some(acc.max.map_or(price, |m| m.max(price))),
    });

    FacetCounts {
        categories: count_values(records, |r| &r.categories),
        tags,
        styles: count_values(records, |r| &r.styles),
        price_range,
    }
}

fn count_values<F>(records: &[StudioRecord], values: F) -> Vec<FacetCount>
where
    F: Fn(&StudioRecord) -> &Vec<String>,
{
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for record in records {
        for value in values(record) {
            let value = value.trim();
            if !value.is_empty() {
                *counts.entry(value).or_default() += 1;
            }
        }
    }

    let mut out: Vec<FacetCount> = counts
        .into_iter()
        .map(|(name, count)| FacetCount {
            name: name.to_string(),
            count,
        })
        .collect();
    out.sort_by(|a, b| b.count.cmp(&a.count));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use atelier_features::annotate;
    use atelier_query::{FilterAction, RangeSelection};
    use pretty_assertions::assert_eq;

    fn hit(summary: &str) -> ListingHit {
        let mut record = StudioRecord::new("s-1", "Harbour Studio");
        record.summary = Some(summary.to_string());
        record.firm.name = Some("Harbour Works".to_string());
        annotate(vec![record], &SignalRules::default()).remove(0)
    }

    #[test]
    fn test_explain_signals_with_evidence() {
        let hit = hit("Interior finishes and a transit masterplan");
        let explanations = explain_signals(&hit, &SignalRules::default());

        assert_eq!(explanations.len(), 2);
        assert_eq!(explanations[0].summary, "Interior design");
        assert_eq!(explanations[0].kind, TileKind::Service);
        assert!(explanations[0].detail.starts_with("Space planning"));
        assert_eq!(explanations[0].evidence[0].value, "interior");

        assert_eq!(explanations[1].capability, Capability::Urban);
        let urban: Vec<&str> = explanations[1].evidence.iter().map(|e| e.value.as_str()).collect();
        assert_eq!(urban, vec!["masterplan", "transit"]);
    }

    #[test]
    fn test_product_tiles() {
        let explanation = explain_capability(Capability::DesignBuild);
        assert_eq!(explanation.kind, TileKind::Product);
        assert!(explanation.detail.contains("Turnkey delivery"));
        assert_eq!(explain_capability(Capability::PlanCatalogue).summary, "Pre-designed plans");
    }

    #[test]
    fn test_catalog_type_evidence() {
        let mut record = StudioRecord::new("p-1", "Courtyard House");
        record.catalog_type = Some("plan".to_string());
        let hit = annotate(vec![record], &SignalRules::default()).remove(0);
        let explanations = explain_signals(&hit, &SignalRules::default());
        assert_eq!(explanations.len(), 1);
        assert_eq!(explanations[0].evidence[0].kind, "catalog_type");
    }

    #[test]
    fn test_summarize_listing() {
        assert_eq!(
            summarize_listing(&hit("Net zero retrofits")),
            "Harbour Works: Sustainable & green solutions"
        );
        assert_eq!(summarize_listing(&hit("")), "Harbour Works: no listed services.");
    }

    #[test]
    fn test_active_filter_count() {
        let state = FilterState::default();
        assert_eq!(active_filter_count(&state), 0);

        let state = state
            .apply(FilterAction::ToggleOption {
                facet: Facet::Style,
                option: "Modern".into(),
            })
            .apply(FilterAction::ToggleOption {
                facet: Facet::Style,
                option: "Rustic".into(),
            })
            .apply(FilterAction::ToggleOption {
                facet: Facet::RoofType,
                option: "Flat".into(),
            })
            .apply(FilterAction::SetRange {
                facet: RangeFacet::Floors,
                selection: RangeSelection::new(1.0, 3.0),
            });
        assert_eq!(active_filter_count(&state), 4);

        let state = state.apply(FilterAction::SetQuery("villa".into()));
        assert_eq!(active_filter_count(&state), 4);
    }

    #[test]
    fn test_describe_filters() {
        let state = FilterState::default()
            .apply(FilterAction::SelectCategory("Residential".into()))
            .apply(FilterAction::ToggleOption {
                facet: Facet::Style,
                option: "Modern".into(),
            })
            .apply(FilterAction::SetRange {
                facet: RangeFacet::Price,
                selection: RangeSelection::new(100.0, 500.0),
            })
            .apply(FilterAction::SetFocus(ServiceFocus::Plans))
            .apply(FilterAction::SetQuery("  villa ".into()))
            .apply(FilterAction::SetKeywords(vec!["warm".into()]));

        let labels: Vec<(ChipKind, String)> = describe_filters(&state)
            .into_iter()
            .map(|chip| (chip.kind, chip.label))
            .collect();
        assert_eq!(
            labels,
            vec![
                (ChipKind::Category, "Residential".to_string()),
                (ChipKind::Facet, "Modern".to_string()),
                (ChipKind::Range, "Price: 100 to 500".to_string()),
                (ChipKind::Focus, "Pre-designed plans".to_string()),
                (ChipKind::Query, "\"villa\"".to_string()),
                (ChipKind::Keyword, "warm".to_string()),
            ]
        );
        assert!(describe_filters(&FilterState::default()).is_empty());
    }

    #[test]
    fn test_facet_counts() {
        let mut a = StudioRecord::new("a", "A")
            .with_price(Some(300.0))
            .with_categories(vec!["Residential".into(), "Commercial".into()]);
        a.styles = vec!["Modern".into()];
        a.tags = vec!["timber".into()];
        let mut b = StudioRecord::new("b", "B")
            .with_price(Some(120.0))
            .with_categories(vec!["Residential".into()]);
        b.styles = vec!["Modern".into(), " ".into()];
        let c = StudioRecord::new("c", "C");

        let counts = facet_counts(&[a, b, c]);
        assert_eq!(
            counts.categories,
            vec![
                FacetCount { name: "Residential".into(), count: 2 },
                FacetCount { name: "Commercial".into(), count: 1 },
            ]
        );
        assert_eq!(counts.styles, vec![FacetCount { name: "Modern".into(), count: 2 }]);
        assert_eq!(counts.tags.len(), 1);
        assert_eq!(counts.price_range, PriceRange { min: Some(120.0), max: Some(300.0) });

        let empty = facet_counts(&[]);
        assert_eq!(empty.price_range, PriceRange { min: None, max: None });
    }
}
