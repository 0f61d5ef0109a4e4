//! Service capability classification.
//!
//! A record's free text and structured tags are scanned against a rule table
//! mapping each [`Capability`] to a keyword list. The table is plain data so it
//! can be swapped from a TOML or JSON file without touching the matcher.

use std::collections::HashSet;
use std::path::Path;

use atelier_model::{Capability, ListingHit, ServiceSignals, StudioRecord};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors loading a rule table.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read rule file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML rule table: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid JSON rule table: {0}")]
    Json(#[from] serde_json::Error),
}

/// Keywords that mark a record as offering one capability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalRule {
    pub capability: Capability,
    pub keywords: Vec<String>,
}

/// Capability → keyword rule table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalRules {
    #[serde(default)]
    pub rules: Vec<SignalRule>,
}

fn rule(capability: Capability, keywords: &[&str]) -> SignalRule {
    SignalRule {
        capability,
        keywords: keywords.iter().map(|k| k.to_string()).collect(),
    }
}

impl Default for SignalRules {
    fn default() -> Self {
        Self {
            rules: vec![
                rule(
                    Capability::Design,
                    &["architectural", "architecture", "blueprint", "plan set", "concept design", "ifc", "bim"],
                ),
                rule(
                    Capability::Interior,
                    &["interior", "space planning", "ff&e", "finishes", "furniture"],
                ),
                rule(
                    Capability::Urban,
                    &["urban", "infrastructure", "masterplan", "transit", "civic", "sceneography", "broadcast"],
                ),
                rule(
                    Capability::Sustainability,
                    &["sustainable", "net zero", "passive", "low carbon", "green building", "energy model"],
                ),
                rule(
                    Capability::PlanCatalogue,
                    &["catalogue", "plan set", "pre-designed", "builder set", "kit of parts"],
                ),
                rule(
                    Capability::DesignBuild,
                    &["design-build", "turnkey", "build partner", "construction", "delivery"],
                ),
            ],
        }
    }
}

impl SignalRules {
    /// Parse a rule table from TOML (`[[rules]]` array of tables).
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Parse a rule table from JSON (`{"rules": [...]}`).
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Load a rule table, choosing the format by file extension (`.toml` or JSON).
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Self::from_toml_str(&text),
            _ => Self::from_json_str(&text),
        }
    }

    /// Keywords registered for `capability`, across every matching rule.
    pub fn keywords(&self, capability: Capability) -> impl Iterator<Item = &str> {
        self.rules
            .iter()
            .filter(move |r| r.capability == capability)
            .flat_map(|r| r.keywords.iter().map(String::as_str))
    }
}

/// Lowercase text blob searched for capability keywords.
fn service_haystack(record: &StudioRecord) -> String {
    let singles = [
        Some(record.title.as_str()),
        record.summary.as_deref(),
        record.description.as_deref(),
        record.program_type.as_deref(),
        record.offer_type.as_deref(),
        record.firm.bio.as_deref(),
    ];
    let lists = [
        &record.programs,
        &record.features,
        &record.tags,
        &record.services,
        &record.keywords,
        &record.categories,
        &record.firm.services,
    ];

    singles
        .into_iter()
        .flatten()
        .chain(lists.into_iter().flatten().map(String::as_str))
        .filter(|s| !s.trim().is_empty())
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Exact tokens from structured fields.
fn service_tokens(record: &StudioRecord) -> HashSet<String> {
    let singles = [
        record.program_type.as_deref(),
        record.offer_type.as_deref(),
        record.catalog_type.as_deref(),
    ];
    let lists = [&record.programs, &record.services, &record.tags, &record.features];

    singles
        .into_iter()
        .flatten()
        .chain(lists.into_iter().flatten().map(String::as_str))
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Infer service capabilities for a record.
pub fn classify(record: &StudioRecord, rules: &SignalRules) -> ServiceSignals {
    let haystack = service_haystack(record);
    let tokens = service_tokens(record);
    let sells_plans = record
        .catalog_type
        .as_deref()
        .is_some_and(|t| t.trim().eq_ignore_ascii_case("plan"));

    ServiceSignals::from_fn(|capability| {
        let keyword_hit = rules.keywords(capability).any(|keyword| {
            let needle = keyword.trim().to_lowercase();
            !needle.is_empty() && (haystack.contains(&needle) || tokens.contains(&needle))
        });
        keyword_hit || (capability == Capability::PlanCatalogue && sells_plans)
    })
}

/// Keywords of `capability` found in the record, in rule order.
pub fn matched_keywords(
    record: &StudioRecord,
    rules: &SignalRules,
    capability: Capability,
) -> Vec<String> {
    let haystack = service_haystack(record);
    let tokens = service_tokens(record);
    let mut matched: Vec<String> = Vec::new();
    for keyword in rules.keywords(capability) {
        let needle = keyword.trim().to_lowercase();
        if needle.is_empty() || matched.contains(&needle) {
            continue;
        }
        if haystack.contains(&needle) || tokens.contains(&needle) {
            matched.push(needle);
        }
    }
    matched
}

/// Pair every record with its signals.
pub fn annotate(records: Vec<StudioRecord>, rules: &SignalRules) -> Vec<ListingHit> {
    records
        .into_iter()
        .map(|record| {
            let signals = classify(&record, rules);
            ListingHit { record, signals }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    fn record_with_summary(summary: &str) -> StudioRecord {
        let mut record = StudioRecord::new("s-1", "Studio");
        record.summary = Some(summary.to_string());
        record
    }

    #[test]
    fn test_interior_and_design_from_text() {
        let record = record_with_summary("Architecture and interior space planning for hotels");
        let signals = classify(&record, &SignalRules::default());
        assert!(signals.design);
        assert!(signals.interior);
        assert!(!signals.urban);
        assert_eq!(
            signals.badges,
            vec!["Architectural design".to_string(), "Interior design".to_string()]
        );
    }

    #[test]
    fn test_tokens_and_catalog_type() {
        let mut record = StudioRecord::new("s-2", "Kit Homes");
        record.catalog_type = Some("Plan".to_string());
        record.tags = vec!["Turnkey".to_string()];
        let signals = classify(&record, &SignalRules::default());
        assert!(signals.plan_catalogue);
        assert!(signals.design_build);
        assert_eq!(
            signals.capabilities(),
            vec![Capability::PlanCatalogue, Capability::DesignBuild]
        );
    }

    #[test]
    fn test_firm_services_count() {
        let mut record = StudioRecord::new("s-3", "Quiet Office");
        record.firm.services = vec!["Net zero retrofit".to_string()];
        let signals = classify(&record, &SignalRules::default());
        assert!(signals.sustainability);
        assert_eq!(signals.badges, vec!["Sustainable & green solutions".to_string()]);
    }

    #[test]
    fn test_no_text_no_signals() {
        let signals = classify(&StudioRecord::new("s-4", ""), &SignalRules::default());
        assert_eq!(signals, ServiceSignals::default());
    }

    #[test]
    fn test_classify_is_deterministic() {
        let record = record_with_summary("Transit masterplan with passive cooling");
        let rules = SignalRules::default();
        assert_eq!(classify(&record, &rules), classify(&record, &rules));
    }

    #[test]
    fn test_rules_from_toml() {
        let rules = SignalRules::from_toml_str(
            r#"
            [[rules]]
            capability = "interior"
            keywords = ["Joinery"]

            [[rules]]
            capability = "designBuild"
            keywords = ["general contractor"]
            "#,
        )
        .unwrap();
        assert_eq!(rules.rules.len(), 2);

        let record = record_with_summary("Bespoke joinery by our general contractor team");
        let signals = classify(&record, &rules);
        assert!(signals.interior);
        assert!(signals.design_build);
        assert!(!signals.design);
    }

    #[test]
    fn test_rules_from_json_file() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r#"{{"rules": [{{"capability": "urban", "keywords": ["waterfront"]}}]}}"#
        )
        .unwrap();

        let rules = SignalRules::from_file(file.path()).unwrap();
        assert_eq!(rules.keywords(Capability::Urban).collect::<Vec<_>>(), vec!["waterfront"]);
    }

    #[test]
    fn test_invalid_rule_file() {
        assert!(matches!(
            SignalRules::from_toml_str("rules = 3"),
            Err(ConfigError::Toml(_))
        ));
        assert!(matches!(
            SignalRules::from_file(Path::new("/nonexistent/rules.toml")),
            Err(ConfigError::Io(_))
        ));
    }

    #[test]
    fn test_matched_keywords_lists_evidence() {
        let record = record_with_summary("Turnkey construction with a build partner");
        let matched = matched_keywords(&record, &SignalRules::default(), Capability::DesignBuild);
        assert_eq!(matched, vec!["turnkey", "build partner", "construction"]);
        assert!(matched_keywords(&record, &SignalRules::default(), Capability::Urban).is_empty());
    }

    #[test]
    fn test_annotate_keeps_order() {
        let hits = annotate(
            vec![StudioRecord::new("a", "A"), StudioRecord::new("b", "B")],
            &SignalRules::default(),
        );
        assert_eq!(hits.iter().map(|h| h.record.id.as_str()).collect::<Vec<_>>(), vec!["a", "b"]);
    }
}
