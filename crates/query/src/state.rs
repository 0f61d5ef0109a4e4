//! Filter state and its reducer.
//!
//! `FilterState` is an immutable value: every change goes through
//! [`FilterState::apply`], which returns the next state and keeps each range
//! selection ordered and inside its current domain.

use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;

use atelier_model::{Capability, ServiceSignals, CATEGORY_ALL};
use serde::{Deserialize, Serialize};

use crate::domain::{RangeDomains, RangeFacet, RangeSelection};
use crate::facet::Facet;
use crate::QueryError;

/// Which kind of offering the listing must provide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ServiceFocus {
    #[default]
    All,
    /// Design, interior or urban services
    Services,
    /// Pre-designed plan catalogues
    Plans,
    /// Design-build delivery
    DesignBuild,
}

impl ServiceFocus {
    pub fn label(&self) -> &'static str {
        match self {
            Self::All => "All offerings",
            Self::Services => "Services",
            Self::Plans => "Pre-designed plans",
            Self::DesignBuild => "Design-build",
        }
    }

    pub fn admits(&self, signals: &ServiceSignals) -> bool {
        match self {
            Self::All => true,
            Self::Services => {
                signals.has(Capability::Design)
                    || signals.has(Capability::Interior)
                    || signals.has(Capability::Urban)
            }
            Self::Plans => signals.has(Capability::PlanCatalogue),
            Self::DesignBuild => signals.has(Capability::DesignBuild),
        }
    }
}

impl FromStr for ServiceFocus {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .trim()
            .to_lowercase()
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .collect();
        match key.as_str() {
            "all" | "" => Ok(Self::All),
            "services" => Ok(Self::Services),
            "plans" => Ok(Self::Plans),
            "designbuild" => Ok(Self::DesignBuild),
            _ => Err(QueryError::UnknownFocus(s.to_string())),
        }
    }
}

/// Selections on the four range facets.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RangeSelections {
    pub price: RangeSelection,
    pub area: RangeSelection,
    pub floors: RangeSelection,
    pub programs: RangeSelection,
}

impl RangeSelections {
    /// Selections spanning each whole domain.
    pub fn full(domains: &RangeDomains) -> Self {
        Self {
            price: domains.price.full(),
            area: domains.area.full(),
            floors: domains.floors.full(),
            programs: domains.programs.full(),
        }
    }

    pub fn get(&self, facet: RangeFacet) -> RangeSelection {
        match facet {
            RangeFacet::Price => self.price,
            RangeFacet::Area => self.area,
            RangeFacet::Floors => self.floors,
            RangeFacet::Programs => self.programs,
        }
    }

    fn get_mut(&mut self, facet: RangeFacet) -> &mut RangeSelection {
        match facet {
            RangeFacet::Price => &mut self.price,
            RangeFacet::Area => &mut self.area,
            RangeFacet::Floors => &mut self.floors,
            RangeFacet::Programs => &mut self.programs,
        }
    }
}

/// Everything the user has chosen to narrow the listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterState {
    /// Top-level category, `"All"` for no restriction
    pub category: String,

    /// Selected options per facet; empty facets are not stored
    pub facets: BTreeMap<Facet, BTreeSet<String>>,

    pub focus: ServiceFocus,

    /// Domains the range selections are bounded by
    pub domains: RangeDomains,

    pub ranges: RangeSelections,

    /// Free-text query, matched after facet filtering
    pub query: String,

    /// Keywords from image analysis, matched last
    pub keywords: Vec<String>,
}

impl Default for FilterState {
    fn default() -> Self {
        let domains = RangeDomains::default();
        Self {
            category: CATEGORY_ALL.to_string(),
            facets: BTreeMap::new(),
            focus: ServiceFocus::All,
            ranges: RangeSelections::full(&domains),
            domains,
            query: String::new(),
            keywords: Vec::new(),
        }
    }
}

/// A single user-driven change to the filter state.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterAction {
    SelectCategory(String),
    /// Add the option if absent, remove it if present
    ToggleOption { facet: Facet, option: String },
    SelectOptions { facet: Facet, options: Vec<String> },
    ClearFacet(Facet),
    SetFocus(ServiceFocus),
    SetRange { facet: RangeFacet, selection: RangeSelection },
    ResetRange(RangeFacet),
    /// The record set changed; rebase selections on the new domains
    DomainsChanged(RangeDomains),
    SetQuery(String),
    SetKeywords(Vec<String>),
    ClearKeywords,
    /// Clear facets, ranges and focus; keeps category, query and keywords
    ClearFilters,
}

impl FilterState {
    /// Fresh state whose ranges span `domains`.
    pub fn with_domains(domains: RangeDomains) -> Self {
        Self {
            ranges: RangeSelections::full(&domains),
            domains,
            ..Self::default()
        }
    }

    /// Apply an action, returning the next state.
    pub fn apply(&self, action: FilterAction) -> FilterState {
        let mut next = self.clone();
        match action {
            FilterAction::SelectCategory(category) => {
                let category = category.trim();
                next.category = if category.is_empty() {
                    CATEGORY_ALL.to_string()
                } else {
                    category.to_string()
                };
            }
            FilterAction::ToggleOption { facet, option } => {
                let set = next.facets.entry(facet).or_default();
                if !set.remove(&option) {
                    set.insert(option);
                }
                next.prune_empty_facets();
            }
            FilterAction::SelectOptions { facet, options } => {
                next.facets.insert(
                    facet,
                    options
                        .into_iter()
                        .map(|o| o.trim().to_string())
                        .filter(|o| !o.is_empty())
                        .collect(),
                );
                next.prune_empty_facets();
            }
            FilterAction::ClearFacet(facet) => {
                next.facets.remove(&facet);
            }
            FilterAction::SetFocus(focus) => next.focus = focus,
            FilterAction::SetRange { facet, selection } => {
                let domain = next.domains.get(facet);
                let clamped = domain.clamp(selection);
                if clamped != selection {
                    tracing::debug!(
                        facet = %facet,
                        low = selection.low,
                        high = selection.high,
                        "Range selection clamped into domain"
                    );
                }
                *next.ranges.get_mut(facet) = clamped;
            }
            FilterAction::ResetRange(facet) => {
                *next.ranges.get_mut(facet) = next.domains.get(facet).full();
            }
            FilterAction::DomainsChanged(domains) => {
                for facet in RangeFacet::ALL {
                    let old_domain = self.domains.get(facet);
                    let new_domain = domains.get(facet);
                    let current = self.ranges.get(facet);
                    // an untouched slider follows its domain; a narrowed one is clamped
                    let rebased = if current == old_domain.full() {
                        new_domain.full()
                    } else {
                        new_domain.clamp(current)
                    };
                    *next.ranges.get_mut(facet) = rebased;
                }
                next.domains = domains;
            }
            FilterAction::SetQuery(query) => next.query = query,
            FilterAction::SetKeywords(keywords) => {
                next.keywords = keywords
                    .into_iter()
                    .map(|k| k.trim().to_string())
                    .filter(|k| !k.is_empty())
                    .collect();
            }
            FilterAction::ClearKeywords => next.keywords.clear(),
            FilterAction::ClearFilters => {
                next.facets.clear();
                next.focus = ServiceFocus::All;
                next.ranges = RangeSelections::full(&next.domains);
            }
        }
        next
    }

    /// Selected options for a facet, if any.
    pub fn selected(&self, facet: Facet) -> Option<&BTreeSet<String>> {
        self.facets.get(&facet).filter(|set| !set.is_empty())
    }

    pub fn range(&self, facet: RangeFacet) -> RangeSelection {
        self.ranges.get(facet)
    }

    /// Whether the range selection for `facet` narrows its domain.
    pub fn range_is_narrowed(&self, facet: RangeFacet) -> bool {
        self.ranges.get(facet) != self.domains.get(facet).full()
    }

    /// Every range selection is ordered and inside its domain.
    pub fn ranges_are_valid(&self) -> bool {
        RangeFacet::ALL.into_iter().all(|facet| {
            let selection = self.ranges.get(facet);
            let domain = self.domains.get(facet);
            selection.low <= selection.high
                && domain.contains(selection.low)
                && domain.contains(selection.high)
        })
    }

    fn prune_empty_facets(&mut self) {
        self.facets.retain(|_, set| !set.is_empty());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Domain;
    use pretty_assertions::assert_eq;

    fn domains(price: (f64, f64)) -> RangeDomains {
        RangeDomains {
            price: Domain::new(price.0, price.1),
            ..RangeDomains::default()
        }
    }

    #[test]
    fn test_default_state() {
        let state = FilterState::default();
        assert_eq!(state.category, "All");
        assert!(state.facets.is_empty());
        assert_eq!(state.focus, ServiceFocus::All);
        assert!(state.ranges_are_valid());
        assert!(!state.range_is_narrowed(RangeFacet::Price));
    }

    #[test]
    fn test_toggle_option_adds_and_removes() {
        let state = FilterState::default();
        let toggle = || FilterAction::ToggleOption {
            facet: Facet::Style,
            option: "Brutalism".into(),
        };

        let on = state.apply(toggle());
        assert!(on.selected(Facet::Style).unwrap().contains("Brutalism"));

        let off = on.apply(toggle());
        assert_eq!(off.selected(Facet::Style), None);
        assert!(off.facets.is_empty());
        // the original value is untouched
        assert!(state.facets.is_empty());
    }

    #[test]
    fn test_set_range_is_clamped() {
        let state = FilterState::with_domains(domains((100.0, 500.0)));
        let next = state.apply(FilterAction::SetRange {
            facet: RangeFacet::Price,
            selection: RangeSelection::new(600.0, 50.0),
        });
        assert_eq!(next.range(RangeFacet::Price), RangeSelection::new(100.0, 500.0));
        assert!(next.ranges_are_valid());
    }

    #[test]
    fn test_domain_change_rebases_selections() {
        let state = FilterState::with_domains(domains((0.0, 1000.0)));
        let narrowed = state.apply(FilterAction::SetRange {
            facet: RangeFacet::Price,
            selection: RangeSelection::new(200.0, 900.0),
        });

        let shrunk = narrowed.apply(FilterAction::DomainsChanged(domains((300.0, 600.0))));
        assert_eq!(shrunk.range(RangeFacet::Price), RangeSelection::new(300.0, 600.0));
        assert!(shrunk.ranges_are_valid());

        // an untouched slider follows the new domain instead of staying clamped
        let grown = state.apply(FilterAction::DomainsChanged(domains((0.0, 5000.0))));
        assert_eq!(grown.range(RangeFacet::Price), RangeSelection::new(0.0, 5000.0));
        assert!(!grown.range_is_narrowed(RangeFacet::Price));
    }

    #[test]
    fn test_clear_filters_keeps_query_and_category() {
        let state = FilterState::default()
            .apply(FilterAction::SelectCategory("Residential".into()))
            .apply(FilterAction::SetQuery("villa".into()))
            .apply(FilterAction::SetFocus(ServiceFocus::Plans))
            .apply(FilterAction::SelectOptions {
                facet: Facet::Terrain,
                options: vec!["Coastal".into(), " ".into()],
            })
            .apply(FilterAction::ClearFilters);

        assert_eq!(state.category, "Residential");
        assert_eq!(state.query, "villa");
        assert_eq!(state.focus, ServiceFocus::All);
        assert!(state.facets.is_empty());
    }

    #[test]
    fn test_keywords_are_trimmed_and_clearable() {
        let state = FilterState::default().apply(FilterAction::SetKeywords(vec![
            " minimal ".into(),
            "".into(),
        ]));
        assert_eq!(state.keywords, vec!["minimal".to_string()]);
        assert!(state.apply(FilterAction::ClearKeywords).keywords.is_empty());
    }

    #[test]
    fn test_blank_category_means_all() {
        let state = FilterState::default().apply(FilterAction::SelectCategory("  ".into()));
        assert_eq!(state.category, "All");
    }

    #[test]
    fn test_focus_parsing_and_admission() {
        assert_eq!("designBuild".parse::<ServiceFocus>().unwrap(), ServiceFocus::DesignBuild);
        assert_eq!("design-build".parse::<ServiceFocus>().unwrap(), ServiceFocus::DesignBuild);
        assert_eq!("Plans".parse::<ServiceFocus>().unwrap(), ServiceFocus::Plans);
        assert!(matches!("retail".parse::<ServiceFocus>(), Err(QueryError::UnknownFocus(_))));

        let urban_only = ServiceSignals::from_fn(|c| c == Capability::Urban);
        assert!(ServiceFocus::All.admits(&urban_only));
        assert!(ServiceFocus::Services.admits(&urban_only));
        assert!(!ServiceFocus::Plans.admits(&urban_only));
        assert!(!ServiceFocus::DesignBuild.admits(&urban_only));

        let sustainability_only = ServiceSignals::from_fn(|c| c == Capability::Sustainability);
        assert!(!ServiceFocus::Services.admits(&sustainability_only));
    }
}
