//! Raw record normalization.
//!
//! Catalog sources disagree on where a value lives: a price may sit under
//! `priceSqft`, `pricing.basePrice` or a bare `cost`. Each logical field is
//! described by a [`FieldResolver`] listing its source paths in priority order;
//! the first path yielding a usable value wins. Nothing here fails: an
//! unusable field resolves to `None`.

use std::collections::HashSet;

use atelier_model::{
    FirmDescriptor, ListingStatus, RawRecord, RecordSource, StudioRecord,
};
use serde_json::Value;

use crate::{parse_leading_number, parse_permissive_number, slugify};

/// A JSON path, one key per nesting level.
pub type SourcePath = &'static [&'static str];

/// Ordered alternate source paths for one logical field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldResolver {
    /// Logical field name
    pub field: &'static str,
    /// Source paths, highest priority first
    pub paths: &'static [SourcePath],
}

pub const ID: FieldResolver = FieldResolver {
    field: "id",
    paths: &[&["_id"], &["id"], &["slug"]],
};

pub const PRICE: FieldResolver = FieldResolver {
    field: "price",
    paths: &[
        &["priceSqft"],
        &["pricing", "basePrice"],
        &["pricing", "total"],
        &["price"],
        &["cost"],
    ],
};

pub const PRICE_UNIT: FieldResolver = FieldResolver {
    field: "priceUnit",
    paths: &[&["priceUnit"], &["pricing", "unit"], &["unit"]],
};

pub const CURRENCY: FieldResolver = FieldResolver {
    field: "currency",
    paths: &[&["currency"], &["pricing", "currency"]],
};

pub const RATING: FieldResolver = FieldResolver {
    field: "rating",
    paths: &[
        &["rating"],
        &["score"],
        &["reviews", "avgRating"],
        &["reviews", "rating"],
        &["metrics", "rating"],
        &["stats", "rating"],
    ],
};

pub const AREA: FieldResolver = FieldResolver {
    field: "areaSqft",
    paths: &[
        &["areaSqft"],
        &["area", "sqft"],
        &["metrics", "areaSqft"],
        &["sizeSqft"],
        &["size"],
    ],
};

pub const PLOT_AREA: FieldResolver = FieldResolver {
    field: "plotAreaSqft",
    paths: &[
        &["plotAreaSqft"],
        &["metrics", "plotAreaSqft"],
        &["metrics", "plotArea"],
        &["plot", "areaSqft"],
        &["plot", "area"],
        &["site", "areaSqft"],
    ],
};

pub const FLOORS: FieldResolver = FieldResolver {
    field: "floors",
    paths: &[&["floors"], &["metadata", "floors"], &["stats", "floors"]],
};

pub const PROGRAM_COUNT: FieldResolver = FieldResolver {
    field: "programsCount",
    paths: &[&["programsCount"]],
};

pub const PROGRAM_LIST: FieldResolver = FieldResolver {
    field: "programs",
    paths: &[&["programs"], &["program"], &["metadata", "programs"]],
};

pub const ROOMS: FieldResolver = FieldResolver {
    field: "rooms",
    paths: &[&["rooms"], &["metadata", "rooms"]],
};

pub const CLIMATE: FieldResolver = FieldResolver {
    field: "climate",
    paths: &[&["climate"], &["metadata", "climate"], &["environment", "climate"]],
};

pub const TERRAIN: FieldResolver = FieldResolver {
    field: "terrain",
    paths: &[&["terrain"], &["site", "terrain"], &["metadata", "terrain"]],
};

pub const PRIMARY_CATEGORY: FieldResolver = FieldResolver {
    field: "primaryCategory",
    paths: &[&["primaryCategory"], &["category"]],
};

pub const FIRM_NAME: FieldResolver = FieldResolver {
    field: "firm.name",
    paths: &[&["firm", "name"], &["studioName"], &["creator", "name"]],
};

pub const FIRM_COUNTRY: FieldResolver = FieldResolver {
    field: "firm.country",
    paths: &[
        &["firm", "location", "country"],
        &["location", "country"],
        &["country"],
    ],
};

pub const FIRM_EMAIL: FieldResolver = FieldResolver {
    field: "firm.email",
    paths: &[
        &["firm", "contact", "email"],
        &["firm", "email"],
        &["contact", "email"],
        &["email"],
    ],
};

pub const FIRM_PHONE: FieldResolver = FieldResolver {
    field: "firm.phone",
    paths: &[
        &["firm", "contact", "phone"],
        &["firm", "phone"],
        &["contact", "phone"],
        &["phone"],
    ],
};

pub const FIRM_WEBSITE: FieldResolver = FieldResolver {
    field: "firm.website",
    paths: &[
        &["firm", "contact", "website"],
        &["firm", "website"],
        &["website"],
    ],
};

pub const FIRM_SPECIALISATIONS: FieldResolver = FieldResolver {
    field: "firm.specialisations",
    paths: &[&["firm", "specialisations"], &["firm", "specializations"]],
};

/// Every resolver, so callers and tests can enumerate accepted aliases.
pub const RESOLVERS: &[FieldResolver] = &[
    ID,
    PRICE,
    PRICE_UNIT,
    CURRENCY,
    RATING,
    AREA,
    PLOT_AREA,
    FLOORS,
    PROGRAM_COUNT,
    PROGRAM_LIST,
    ROOMS,
    CLIMATE,
    TERRAIN,
    PRIMARY_CATEGORY,
    FIRM_NAME,
    FIRM_COUNTRY,
    FIRM_EMAIL,
    FIRM_PHONE,
    FIRM_WEBSITE,
    FIRM_SPECIALISATIONS,
];

impl FieldResolver {
    /// Candidate values in priority order, skipping missing and `null` paths.
    pub fn candidates<'a>(&self, raw: &'a Value) -> impl Iterator<Item = &'a Value> + 'a {
        let paths = self.paths;
        paths
            .iter()
            .filter_map(move |path| lookup(raw, path))
            .filter(|v| !v.is_null())
    }

    /// First candidate that reads as a finite number; strings are parsed with `parse`.
    pub fn number_with(&self, raw: &Value, parse: fn(&str) -> Option<f64>) -> Option<f64> {
        self.candidates(raw).find_map(|v| match v {
            Value::Number(n) => n.as_f64().filter(|n| n.is_finite()),
            Value::String(s) => parse(s),
            _ => None,
        })
    }

    /// First candidate that reads as a finite number.
    pub fn number(&self, raw: &Value) -> Option<f64> {
        self.number_with(raw, parse_leading_number)
    }

    /// First candidate that reads as a non-negative whole count.
    pub fn count(&self, raw: &Value) -> Option<u32> {
        self.candidates(raw).find_map(as_count)
    }

    /// First non-empty text candidate. Numbers are rendered as text.
    pub fn text(&self, raw: &Value) -> Option<String> {
        self.candidates(raw).find_map(as_text)
    }

    /// First candidate that is a list, as its string items.
    pub fn list(&self, raw: &Value) -> Option<Vec<String>> {
        self.candidates(raw)
            .find(|v| v.is_array())
            .map(string_list)
    }
}

fn lookup<'a>(raw: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(raw, |node, key| node.get(key))
}

fn as_count(value: &Value) -> Option<u32> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => parse_leading_number(s)?,
        _ => return None,
    };
    if n.is_finite() && n >= 0.0 && n <= u32::MAX as f64 {
        Some(n.trunc() as u32)
    } else {
        None
    }
}

fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        // Mongo-style `{ "$oid": "..." }` identifiers
        Value::Object(map) => ["$oid", "_id", "id"]
            .iter()
            .find_map(|key| map.get(*key))
            .and_then(as_text),
        _ => None,
    }
}

/// Read a value as a list of strings. A bare string is a one-item list;
/// objects contribute their `title`, `name` or `description`.
fn string_list(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items.iter().filter_map(list_item).collect(),
        other => list_item(other).into_iter().collect(),
    }
}

fn list_item(value: &Value) -> Option<String> {
    match value {
        Value::Object(map) => ["title", "name", "description", "label"]
            .iter()
            .find_map(|key| map.get(*key))
            .and_then(as_text),
        other => as_text(other),
    }
}

fn text_at(raw: &Value, path: SourcePath) -> Option<String> {
    lookup(raw, path).and_then(as_text)
}

fn list_at(raw: &Value, path: SourcePath) -> Vec<String> {
    lookup(raw, path).map(string_list).unwrap_or_default()
}

/// Canonicalize a unit label: anything mentioning "sq" becomes `sq ft`.
pub fn normalize_unit(unit: &str) -> Option<String> {
    let trimmed = unit.trim();
    if trimmed.is_empty() {
        return None;
    }
    if trimmed.to_lowercase().contains("sq") {
        Some("sq ft".to_string())
    } else {
        Some(trimmed.to_string())
    }
}

fn resolve_program_count(raw: &Value) -> Option<u32> {
    PROGRAM_COUNT
        .candidates(raw)
        .find_map(|v| match v {
            Value::Number(_) => as_count(v),
            _ => None,
        })
        .or_else(|| {
            PROGRAM_LIST
                .candidates(raw)
                .find_map(|v| v.as_array())
                .map(|items| items.len() as u32)
        })
}

fn resolve_room_count(raw: &Value) -> Option<u32> {
    ROOMS.candidates(raw).find_map(|v| match v {
        Value::Array(items) => Some(items.len() as u32),
        Value::Number(_) => as_count(v),
        _ => None,
    })
}

fn resolve_rating(raw: &Value) -> Option<f64> {
    RATING.number(raw).map(|r| r.clamp(0.0, 5.0))
}

fn resolve_styles(raw: &Value) -> Vec<String> {
    let mut styles = Vec::new();
    styles.extend(text_at(raw, &["style"]));
    styles.extend(list_at(raw, &["styles"]));
    dedup_preserving_order(styles)
}

fn resolve_keywords(raw: &Value) -> Vec<String> {
    let mut keywords = list_at(raw, &["metadata", "keywords"]);
    keywords.extend(list_at(raw, &["keywords"]));
    dedup_preserving_order(keywords)
}

fn dedup_preserving_order(items: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.to_lowercase()))
        .collect()
}

fn resolve_firm(raw: &Value) -> FirmDescriptor {
    FirmDescriptor {
        name: FIRM_NAME.text(raw),
        country: FIRM_COUNTRY.text(raw),
        bio: text_at(raw, &["firm", "bio"]),
        styles: list_at(raw, &["firm", "styles"]),
        specialisations: FIRM_SPECIALISATIONS.list(raw).unwrap_or_default(),
        services: list_at(raw, &["firm", "services"]),
        email: FIRM_EMAIL.text(raw),
        phone: FIRM_PHONE.text(raw),
        website: FIRM_WEBSITE.text(raw),
    }
}

fn resolve_id(raw: &Value, title: &str) -> String {
    ID.text(raw).unwrap_or_else(|| slugify(title))
}

/// Normalize a raw marketplace record.
pub fn normalize(raw: &RawRecord) -> StudioRecord {
    normalize_from(raw, RecordSource::Marketplace)
}

/// Normalize a raw record coming from `source`.
pub fn normalize_from(raw: &RawRecord, source: RecordSource) -> StudioRecord {
    let title = text_at(raw, &["title"])
        .or_else(|| text_at(raw, &["name"]))
        .unwrap_or_default();
    let categories = list_at(raw, &["categories"]);
    let primary_category = PRIMARY_CATEGORY
        .text(raw)
        .or_else(|| categories.first().cloned());

    StudioRecord {
        id: resolve_id(raw, &title),
        summary: text_at(raw, &["summary"]),
        description: text_at(raw, &["description"]),
        styles: resolve_styles(raw),
        typology: text_at(raw, &["typology"]),
        program_type: text_at(raw, &["programType"]),
        offer_type: text_at(raw, &["offerType"]),
        catalog_type: text_at(raw, &["catalogType"]),
        programs: PROGRAM_LIST.list(raw).unwrap_or_default(),
        services: list_at(raw, &["services"]),
        keywords: resolve_keywords(raw),
        tags: list_at(raw, &["tags"]),
        features: list_at(raw, &["features"]),
        price: PRICE.number_with(raw, parse_permissive_number),
        price_unit: PRICE_UNIT.text(raw).and_then(|u| normalize_unit(&u)),
        currency: CURRENCY.text(raw).unwrap_or_else(|| "USD".to_string()),
        area_sqft: AREA.number(raw),
        plot_area_sqft: PLOT_AREA.number(raw),
        floors: FLOORS.count(raw),
        program_count: resolve_program_count(raw),
        room_count: resolve_room_count(raw),
        rating: resolve_rating(raw),
        climate: CLIMATE.text(raw),
        terrain: TERRAIN.text(raw),
        primary_category,
        firm: resolve_firm(raw),
        status: text_at(raw, &["status"])
            .map(|s| ListingStatus::from(s.as_str()))
            .unwrap_or_default(),
        source,
        categories,
        title,
    }
}

/// Normalize a batch from one source.
///
/// Records without any identifier get `record-<index>`; later duplicates of
/// an identifier are dropped so identifiers stay unique within the batch.
pub fn normalize_batch(raws: &[RawRecord], source: RecordSource) -> Vec<StudioRecord> {
    let mut seen = HashSet::new();
    raws.iter()
        .enumerate()
        .map(|(idx, raw)| {
            let mut record = normalize_from(raw, source);
            if record.id.is_empty() {
                record.id = format!("record-{}", idx);
            }
            record
        })
        .filter(|record| seen.insert(record.id.clone()))
        .collect()
}
