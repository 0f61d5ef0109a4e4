//! Core domain model for the Atelier studio catalog.
//!
//! This crate defines the fundamental types used throughout the system:
//! - `StudioRecord`: The normalized catalog entry produced from raw records
//! - `ListingStatus`: Published or Draft
//! - `Capability` / `ServiceSignals`: Service capabilities inferred from text
//! - `ListingHit`: A record paired with its signals, as ranked and displayed

use serde::{Deserialize, Serialize};

/// A raw, loosely-typed record as returned by a catalog source.
pub type RawRecord = serde_json::Value;

/// Sentinel category that disables category filtering.
pub const CATEGORY_ALL: &str = "All";

/// Top-level categories in display order.
pub const CATEGORY_DISPLAY_ORDER: [&str; 9] = [
    "All",
    "Residential",
    "Commercial",
    "Mixed-Use",
    "Institutional",
    "Industrial",
    "Agricultural",
    "Recreational",
    "Infrastructure",
];

/// Publication status of a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListingStatus {
    /// Visible in the marketplace
    Published,
    /// Work in progress, only visible to its author
    Draft,
}

impl Default for ListingStatus {
    fn default() -> Self {
        Self::Published
    }
}

impl From<&str> for ListingStatus {
    fn from(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "draft" => Self::Draft,
            _ => Self::Published,
        }
    }
}

/// Where a record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordSource {
    /// Remote marketplace catalog service
    Marketplace,
    /// The current user's own workspace entries
    Workspace,
    /// Bundled fallback catalog
    Local,
}

impl Default for RecordSource {
    fn default() -> Self {
        Self::Marketplace
    }
}

/// The firm or studio behind a listing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FirmDescriptor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,

    #[serde(default)]
    pub styles: Vec<String>,

    #[serde(default)]
    pub specialisations: Vec<String>,

    /// Service titles or descriptions offered by the firm
    #[serde(default)]
    pub services: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
}

/// A normalized studio listing.
///
/// This is the canonical representation consumed by filtering, ranking and
/// display. Every numeric field is either a finite number or `None`; absence
/// is never folded into zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudioRecord {
    /// Unique identifier within a result set
    pub id: String,

    #[serde(default)]
    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Top-level categories, in source order
    #[serde(default)]
    pub categories: Vec<String>,

    #[serde(default)]
    pub styles: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub typology: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub program_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offer_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog_type: Option<String>,

    #[serde(default)]
    pub programs: Vec<String>,

    #[serde(default)]
    pub services: Vec<String>,

    #[serde(default)]
    pub keywords: Vec<String>,

    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default)]
    pub features: Vec<String>,

    /// Price per unit (usually per sq ft)
    #[serde(default)]
    pub price: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_unit: Option<String>,

    #[serde(default = "default_currency")]
    pub currency: String,

    /// Built-up area in sq ft
    #[serde(default)]
    pub area_sqft: Option<f64>,

    #[serde(default)]
    pub plot_area_sqft: Option<f64>,

    #[serde(default)]
    pub floors: Option<u32>,

    #[serde(default)]
    pub program_count: Option<u32>,

    #[serde(default)]
    pub room_count: Option<u32>,

    /// Average rating in [0, 5]
    #[serde(default)]
    pub rating: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub climate: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terrain: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_category: Option<String>,

    #[serde(default)]
    pub firm: FirmDescriptor,

    #[serde(default)]
    pub status: ListingStatus,

    #[serde(default)]
    pub source: RecordSource,
}

fn default_currency() -> String {
    "USD".to_string()
}

impl StudioRecord {
    /// Create a minimal record for testing.
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            summary: None,
            description: None,
            categories: Vec::new(),
            styles: Vec::new(),
            typology: None,
            program_type: None,
            offer_type: None,
            catalog_type: None,
            programs: Vec::new(),
            services: Vec::new(),
            keywords: Vec::new(),
            tags: Vec::new(),
            features: Vec::new(),
            price: None,
            price_unit: None,
            currency: default_currency(),
            area_sqft: None,
            plot_area_sqft: None,
            floors: None,
            program_count: None,
            room_count: None,
            rating: None,
            climate: None,
            terrain: None,
            primary_category: None,
            firm: FirmDescriptor::default(),
            status: ListingStatus::Published,
            source: RecordSource::Marketplace,
        }
    }

    pub fn with_price(mut self, price: Option<f64>) -> Self {
        self.price = price;
        self
    }

    pub fn with_rating(mut self, rating: Option<f64>) -> Self {
        self.rating = rating;
        self
    }

    pub fn with_categories(mut self, categories: Vec<String>) -> Self {
        self.categories = categories;
        self
    }

    /// Firm name if known, otherwise the listing title.
    pub fn display_firm(&self) -> &str {
        self.firm.name.as_deref().unwrap_or(&self.title)
    }
}

/// A service capability a studio may offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Capability {
    /// Architectural design
    Design,
    /// Interior design
    Interior,
    /// Urban planning and infrastructure
    Urban,
    /// Sustainability consulting
    Sustainability,
    /// Sells pre-designed plan sets
    PlanCatalogue,
    /// Turnkey design-build delivery
    DesignBuild,
}

impl Capability {
    /// All capabilities in badge order.
    pub const ALL: [Capability; 6] = [
        Self::Design,
        Self::Interior,
        Self::Urban,
        Self::Sustainability,
        Self::PlanCatalogue,
        Self::DesignBuild,
    ];

    /// Get a human-readable label for this capability.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Design => "Architectural design",
            Self::Interior => "Interior design",
            Self::Urban => "Urban & infrastructure",
            Self::Sustainability => "Sustainable & green solutions",
            Self::PlanCatalogue => "Pre-designed plans",
            Self::DesignBuild => "Design-build projects",
        }
    }

    /// Stable identifier used in rule files.
    pub fn key(&self) -> &'static str {
        match self {
            Self::Design => "design",
            Self::Interior => "interior",
            Self::Urban => "urban",
            Self::Sustainability => "sustainability",
            Self::PlanCatalogue => "planCatalogue",
            Self::DesignBuild => "designBuild",
        }
    }

    /// Whether this capability is a professional service (as opposed to a product).
    pub fn is_service(&self) -> bool {
        matches!(self, Self::Design | Self::Interior | Self::Urban | Self::Sustainability)
    }
}

/// Capabilities inferred for one record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceSignals {
    pub design: bool,
    pub interior: bool,
    pub urban: bool,
    pub sustainability: bool,
    pub plan_catalogue: bool,
    pub design_build: bool,

    /// Labels of every present capability, in badge order
    #[serde(default)]
    pub badges: Vec<String>,
}

impl ServiceSignals {
    /// Build signals from a predicate over capabilities; badges follow `Capability::ALL`.
    pub fn from_fn(mut present: impl FnMut(Capability) -> bool) -> Self {
        let mut signals = Self::default();
        for capability in Capability::ALL {
            if present(capability) {
                signals.set(capability);
            }
        }
        signals
    }

    pub fn has(&self, capability: Capability) -> bool {
        match capability {
            Capability::Design => self.design,
            Capability::Interior => self.interior,
            Capability::Urban => self.urban,
            Capability::Sustainability => self.sustainability,
            Capability::PlanCatalogue => self.plan_catalogue,
            Capability::DesignBuild => self.design_build,
        }
    }

    /// Present capabilities in badge order.
    pub fn capabilities(&self) -> Vec<Capability> {
        Capability::ALL.into_iter().filter(|c| self.has(*c)).collect()
    }

    fn set(&mut self, capability: Capability) {
        let flag = match capability {
            Capability::Design => &mut self.design,
            Capability::Interior => &mut self.interior,
            Capability::Urban => &mut self.urban,
            Capability::Sustainability => &mut self.sustainability,
            Capability::PlanCatalogue => &mut self.plan_catalogue,
            Capability::DesignBuild => &mut self.design_build,
        };
        if !*flag {
            *flag = true;
            self.badges.push(capability.label().to_string());
        }
    }
}

/// Parameters sent to a catalog source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchParams {
    /// Top-level category; `None` means every category
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    /// Free-text search passed through to the source
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

impl FetchParams {
    /// Build params, dropping the `All` sentinel and blank search text.
    pub fn new(category: &str, search: &str) -> Self {
        let category = category.trim();
        let search = search.trim();
        Self {
            category: (!category.is_empty() && category != CATEGORY_ALL)
                .then(|| category.to_string()),
            search: (!search.is_empty()).then(|| search.to_string()),
        }
    }
}

/// A listing as it flows through filtering, ranking and display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingHit {
    /// The normalized record
    pub record: StudioRecord,

    /// Capabilities inferred from the record
    pub signals: ServiceSignals,
}

impl AsRef<StudioRecord> for StudioRecord {
    fn as_ref(&self) -> &StudioRecord {
        self
    }
}

impl AsRef<StudioRecord> for ListingHit {
    fn as_ref(&self) -> &StudioRecord {
        &self.record
    }
}
