//! Listing sort orders.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use atelier_model::StudioRecord;
use atelier_query::QueryError;
use serde::{Deserialize, Serialize};

/// How the filtered listing is ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortOrder {
    /// Source order
    #[default]
    Unsorted,
    PriceAsc,
    PriceDesc,
    /// Rating high to low, ties by price low to high
    RatingDesc,
}

impl SortOrder {
    pub const ALL: [SortOrder; 4] = [
        Self::Unsorted,
        Self::PriceAsc,
        Self::PriceDesc,
        Self::RatingDesc,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Unsorted => "Featured",
            Self::PriceAsc => "Price - Low to High",
            Self::PriceDesc => "Price - High to Low",
            Self::RatingDesc => "Rating - High to Low",
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            Self::Unsorted => "",
            Self::PriceAsc => "price-asc",
            Self::PriceDesc => "price-desc",
            Self::RatingDesc => "rating-desc",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for SortOrder {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "none" | "featured" => Ok(Self::Unsorted),
            "price-asc" => Ok(Self::PriceAsc),
            "price-desc" => Ok(Self::PriceDesc),
            "rating-desc" => Ok(Self::RatingDesc),
            _ => Err(QueryError::UnknownSort(s.to_string())),
        }
    }
}

/// Compare optional keys with absent values last in either direction.
fn cmp_absent_last(a: Option<f64>, b: Option<f64>, ascending: bool) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(x), Some(y)) if ascending => x.total_cmp(&y),
        (Some(x), Some(y)) => y.total_cmp(&x),
    }
}

/// Ordering of two records under `order`.
pub fn compare(a: &StudioRecord, b: &StudioRecord, order: SortOrder) -> Ordering {
    match order {
        SortOrder::Unsorted => Ordering::Equal,
        SortOrder::PriceAsc => cmp_absent_last(a.price, b.price, true),
        SortOrder::PriceDesc => cmp_absent_last(a.price, b.price, false),
        SortOrder::RatingDesc => cmp_absent_last(a.rating, b.rating, false)
            .then_with(|| cmp_absent_last(a.price, b.price, true)),
    }
}

/// Stable in-place sort; equal keys keep their input order.
pub fn sort<T: AsRef<StudioRecord>>(items: &mut [T], order: SortOrder) {
    if order == SortOrder::Unsorted {
        return;
    }
    items.sort_by(|a, b| compare(a.as_ref(), b.as_ref(), order));
}
