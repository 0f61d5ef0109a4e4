//! Multi-select facets and their option vocabularies.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::QueryError;

/// An independently filterable attribute dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Facet {
    Typology,
    Style,
    ClimateAdaptability,
    Terrain,
    SoilType,
    MaterialUsed,
    InteriorLayout,
    RoofType,
    Exterior,
    AdditionalFeatures,
    Sustainability,
}

impl Facet {
    /// All facets in sidebar order.
    pub const ALL: [Facet; 11] = [
        Self::Typology,
        Self::Style,
        Self::ClimateAdaptability,
        Self::Terrain,
        Self::SoilType,
        Self::MaterialUsed,
        Self::InteriorLayout,
        Self::RoofType,
        Self::Exterior,
        Self::AdditionalFeatures,
        Self::Sustainability,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Typology => "Typology",
            Self::Style => "Style",
            Self::ClimateAdaptability => "Climate Adaptability",
            Self::Terrain => "Terrain",
            Self::SoilType => "Soil Type",
            Self::MaterialUsed => "Material Used",
            Self::InteriorLayout => "Interior Layout",
            Self::RoofType => "Roof Type",
            Self::Exterior => "Exterior",
            Self::AdditionalFeatures => "Additional Features",
            Self::Sustainability => "Sustainability",
        }
    }

    /// Option vocabulary offered for this facet.
    ///
    /// Typology options depend on the selected category; see [`typologies_for`].
    pub fn options(&self) -> &'static [&'static str] {
        match self {
            Self::Typology => &[],
            Self::Style => STYLE_OPTIONS,
            Self::ClimateAdaptability => CLIMATE_OPTIONS,
            Self::Terrain => TERRAIN_OPTIONS,
            Self::SoilType => SOIL_OPTIONS,
            Self::MaterialUsed => MATERIAL_OPTIONS,
            Self::InteriorLayout => INTERIOR_LAYOUT_OPTIONS,
            Self::RoofType => ROOF_OPTIONS,
            Self::Exterior => EXTERIOR_OPTIONS,
            Self::AdditionalFeatures => FEATURES_OPTIONS,
            Self::Sustainability => SUSTAINABILITY_OPTIONS,
        }
    }
}

impl fmt::Display for Facet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Facet {
    type Err = QueryError;

    /// Accepts the label in any case, with spaces, dashes or underscores.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_lowercase();
        Self::ALL
            .into_iter()
            .find(|facet| {
                facet
                    .label()
                    .chars()
                    .filter(|c| c.is_ascii_alphanumeric())
                    .collect::<String>()
                    .to_lowercase()
                    == key
            })
            .ok_or_else(|| QueryError::UnknownFacet(s.to_string()))
    }
}

/// Typology options for a top-level category; every typology for `All`.
pub fn typologies_for(category: &str) -> Vec<&'static str> {
    let mut options: Vec<&'static str> = TYPOLOGIES_BY_CATEGORY
        .iter()
        .filter(|(cat, _)| category == atelier_model::CATEGORY_ALL || *cat == category)
        .flat_map(|(_, list)| list.iter().copied())
        .collect();
    let mut seen = std::collections::HashSet::new();
    options.retain(|o| seen.insert(*o));
    options
}

pub const STYLE_OPTIONS: &[&str] = &[
    "Classical", "Gothic", "Renaissance", "Baroque", "Neoclassical", "Victorian", "Beaux-Arts",
    "Art Nouveau", "Art Deco", "Modernism", "Bauhaus", "International Style", "Mid-Century Modern",
    "Brutalism", "Postmodernism", "Deconstructivism", "Minimalism", "Neo-Futurism", "Bohemian",
    "Industrial", "Eco-architecture", "Japanese", "Parametric", "Scandinavian",
    "Fachwerk/ Half-Timbered", "Greek Revival", "Contemporary", "Chinese", "Romanesque",
    "Queenslander", "Federation",
];

pub const CLIMATE_OPTIONS: &[&str] = &[
    "Hot & Dry", "Hot & Humid", "Cold & Dry", "Cold", "Temperate", "Tropical", "Tundra",
    "Mediterranean", "Continental", "Composite", "Tropical Rainforest", "Tropical Monsoon",
    "Tropical Savanna", "Hot Desert", "Cold Desert", "Hot Semi-Arid", "Cold Semi-Arid", "Marine",
];

pub const TERRAIN_OPTIONS: &[&str] = &[
    "Flat", "Sloping", "Hilly", "Mountainous", "Coastal", "Waterfront", "Plateau", "Valley",
    "Riverfront", "Lakefront", "Swamp", "Floodplains", "Cliff",
];

pub const SOIL_OPTIONS: &[&str] = &[
    "Loose", "Soft", "Firm", "Stiff", "Dense", "Hard", "Sandy", "Rocky", "Clayey", "Sandy Clay",
    "Silty Clay", "Loamy", "Loamy Sand", "Black Soil", "Red Soil", "Alluvial Soil", "Yellow Soil",
    "Light Grey Soil",
];

pub const MATERIAL_OPTIONS: &[&str] = &[
    "Stone", "Brick", "Concrete", "Steel", "Glass", "Wood", "Bamboo", "Aluminum", "Copper", "Clay",
    "Plaster & Stucco", "Adobe", "Rammed Earth", "Fiber-reinforced",
    "CSEB (Compressed Stabilized Earth Blocks)", "PVC", "Translucent Concrete", "Hydroceramics",
];

pub const INTERIOR_LAYOUT_OPTIONS: &[&str] = &[
    "Open", "Closed", "Linear", "Centralized", "Radial", "Grid", "Cluster", "Split-Level", "Loft",
    "Courtyard", "Studio", "Staggered",
];

pub const ROOF_OPTIONS: &[&str] = &[
    "Flat", "Gable", "Hip", "Shed", "Mansard", "Gambrel", "Butterfly", "Dome", "Pyramid", "Green",
    "Sawtooth", "Thatch", "Barrel Vault", "Hip & Valley", "Truss Roof",
];

pub const EXTERIOR_OPTIONS: &[&str] = &[
    "Façade", "Cladding", "Siding", "Stucco", "Brickwork", "Stone Veneer", "Glass Curtain Wall",
    "Timber Exterior", "Metal Panels", "Green Walls", "Awnings", "Canopies",
];

pub const FEATURES_OPTIONS: &[&str] = &[
    "Balconies", "Verandas", "Terraces", "Patios", "Decks", "Courtyards", "Pergolas",
    "Bay Windows", "Skylights", "Chimneys", "Columns", "Spires", "Porches", "Driveways", "Fences",
    "Eaves", "Gates", "Water Features (Pond)", "Water Features (Fountain)", "Ramps", "Elevators",
    "Escalators",
];

pub const SUSTAINABILITY_OPTIONS: &[&str] = &[
    "Passive Solar Design", "Green Roofs", "Rainwater Harvesting", "Greywater Recycling",
    "Natural Ventilation", "Thermal Mass", "Daylighting", "Recycled Materials",
    "Modular Construction", "Smart Glass", "Solar Panels (Photovoltaics)",
    "Wind Energy Integration", "Geothermal Heating & Cooling", "Biomimicry Design",
    "BREEAM Standards", "Circular Economy Design", "Adaptive Reuse", "Green Cover Preservation",
    "Carbon-Neutral Construction", "Net-Zero Energy Design", "Low-Carbon Materials",
];

pub const TYPOLOGIES_BY_CATEGORY: &[(&str, &[&str])] = &[
    (
        "Residential",
        &[
            "Apartment", "Condominium", "Single-Family House", "Duplex", "Triplex", "Row House",
            "Bungalow", "Cottage", "Villa", "Mansion", "Studio Apartment", "Loft", "Penthouse",
            "Farmhouse", "Earth Shelter",
        ],
    ),
    (
        "Commercial",
        &[
            "Office Buildings", "Retail Stores", "Shopping Malls", "Restaurants", "Cafés", "Hotels",
            "Hostels", "Resorts", "Motels", "Theaters", "Convention Centers", "Exhibition Halls",
            "Clinics", "Banks", "Warehouses", "Showrooms", "Supermarkets", "Mixed-Use Buildings",
        ],
    ),
    (
        "Industrial",
        &[
            "Factories", "Manufacturing Plants", "Warehouses", "Distribution Centers",
            "Power Plants", "Refineries", "Steel Mills", "Chemical Plants",
            "Food Processing Plants", "Textile Mills", "Breweries", "Shipyards",
            "Mining Facilities", "Industrial Parks",
        ],
    ),
    (
        "Agricultural",
        &[
            "Barns", "Silos", "Greenhouses", "Farmhouses", "Storage Sheds", "Poultry Houses",
            "Cattle Sheds", "Piggeries", "Sheep Pens", "Stables", "Irrigation Structures",
            "Fencing", "Fish Farms", "Crop Processing Units", "Dairy Farms",
        ],
    ),
    (
        "Recreational",
        &[
            "Parks", "Playgrounds", "Stadiums", "Sports Complexes", "Gyms", "Swimming Pools",
            "Golf Courses", "Resorts", "Amusement Parks", "Zoos", "Aquariums", "Museums",
            "Art Galleries", "Theaters", "Cinemas", "Community Centers", "Clubs", "Spas",
            "Gaming Arcades",
        ],
    ),
    (
        "Institutional",
        &[
            "Schools", "Colleges", "Universities", "Libraries", "Research Institutes", "Museums",
            "Courthouses", "Police Stations", "Fire Stations", "Post Offices", "City Halls",
            "Government Offices", "Parliament", "Embassies", "Military Bases", "Cultural Centers",
            "Hospitals", "Community Centers",
        ],
    ),
    (
        "Mixed-Use",
        &[
            "Residential + Commercial", "Residential + Office", "Residential + Retail",
            "Office + Retail", "Hotel + Residential", "Hotel + Retail",
            "Transit-Oriented Developments", "Live-Work Units", "Mall + Office + Residential",
            "Smart Cities",
        ],
    ),
    (
        "Infrastructure",
        &[
            "Highways", "Airports", "Seaports", "Bus Terminals", "Metro", "Dams", "Canals",
            "Irrigation Systems", "Water Supply Systems", "Sewage Systems", "Power Plants",
            "Transmission Lines", "Telecommunication Towers", "Pipelines", "Parking Structures",
        ],
    ),
];
