//! Numeric range facets and their domains.

use std::fmt;
use std::str::FromStr;

use atelier_model::StudioRecord;
use serde::{Deserialize, Serialize};

use crate::QueryError;

/// A numeric facet filtered with a `[low, high]` range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RangeFacet {
    Price,
    Area,
    Floors,
    Programs,
}

impl RangeFacet {
    pub const ALL: [RangeFacet; 4] = [Self::Price, Self::Area, Self::Floors, Self::Programs];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Price => "Price",
            Self::Area => "Area (sq ft)",
            Self::Floors => "Floors",
            Self::Programs => "Programs",
        }
    }

    /// Upper bound used when no record carries a value.
    pub fn fallback_max(&self) -> f64 {
        match self {
            Self::Price | Self::Area => 100_000.0,
            Self::Floors | Self::Programs => 50.0,
        }
    }

    /// The record value this facet filters on.
    pub fn value(&self, record: &StudioRecord) -> Option<f64> {
        match self {
            Self::Price => record.price,
            Self::Area => record.area_sqft,
            Self::Floors => record.floors.map(f64::from),
            Self::Programs => record.program_count.map(f64::from),
        }
    }
}

impl fmt::Display for RangeFacet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for RangeFacet {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "price" => Ok(Self::Price),
            "area" | "sqft" => Ok(Self::Area),
            "floors" => Ok(Self::Floors),
            "programs" => Ok(Self::Programs),
            _ => Err(QueryError::UnknownRangeFacet(s.to_string())),
        }
    }
}

/// `[min, max]` bounds of a range facet over the loaded records.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Domain {
    pub min: f64,
    pub max: f64,
}

impl Domain {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        self.min <= value && value <= self.max
    }

    /// The selection covering the whole domain.
    pub fn full(&self) -> RangeSelection {
        RangeSelection {
            low: self.min,
            high: self.max,
        }
    }

    /// Clamp a selection into this domain, keeping `low ≤ high`.
    pub fn clamp(&self, selection: RangeSelection) -> RangeSelection {
        let a = clamp_value(selection.low, self.min, self.max);
        let b = clamp_value(selection.high, self.min, self.max);
        RangeSelection {
            low: a.min(b),
            high: a.max(b),
        }
    }
}

fn clamp_value(value: f64, min: f64, max: f64) -> f64 {
    let (min, max) = if min <= max { (min, max) } else { (max, min) };
    if value.is_nan() {
        min
    } else {
        value.max(min).min(max)
    }
}

/// A user's `[low, high]` selection on a range facet.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RangeSelection {
    pub low: f64,
    pub high: f64,
}

impl RangeSelection {
    pub fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    /// Absent values always pass; present ones must lie within `[low, high]`.
    pub fn admits(&self, value: Option<f64>) -> bool {
        match value {
            None => true,
            Some(v) => self.low <= v && v <= self.high,
        }
    }
}

impl FromStr for RangeSelection {
    type Err = QueryError;

    /// Parse `low..high`, `low-high` or `low,high`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || QueryError::InvalidRange(s.to_string());
        let (low, high) = s
            .split_once("..")
            .or_else(|| s.split_once(','))
            .or_else(|| s.split_once('-'))
            .ok_or_else(invalid)?;
        let low: f64 = low.trim().parse().map_err(|_| invalid())?;
        let high: f64 = high.trim().parse().map_err(|_| invalid())?;
        if !low.is_finite() || !high.is_finite() || low > high {
            return Err(invalid());
        }
        Ok(Self { low, high })
    }
}

/// Compute the domain of a numeric field over `records`.
///
/// Absent or non-finite values are ignored. With no values the domain is
/// `[0, fallback_max]`; when every value is equal it is `[0, value]`, with a
/// negative value collapsing to `[0, 0]`. The result always has `min ≤ max`.
pub fn compute_domain<T>(
    records: &[T],
    accessor: impl Fn(&T) -> Option<f64>,
    fallback_max: f64,
) -> Domain {
    let (min, max) = records
        .iter()
        .filter_map(&accessor)
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });

    if !min.is_finite() || !max.is_finite() {
        return Domain::new(0.0, fallback_max);
    }
    if min == max {
        return Domain::new(0.0, max.max(0.0));
    }
    let low = min.floor().max(0.0);
    Domain::new(low, max.ceil().max(low))
}

/// Domains of all four range facets.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RangeDomains {
    pub price: Domain,
    pub area: Domain,
    pub floors: Domain,
    pub programs: Domain,
}

impl Default for RangeDomains {
    /// Domains of an empty record set.
    fn default() -> Self {
        Self::from_records(&[])
    }
}

impl RangeDomains {
    pub fn from_records(records: &[StudioRecord]) -> Self {
        let domain = |facet: RangeFacet| {
            compute_domain(records, |r| facet.value(r), facet.fallback_max())
        };
        Self {
            price: domain(RangeFacet::Price),
            area: domain(RangeFacet::Area),
            floors: domain(RangeFacet::Floors),
            programs: domain(RangeFacet::Programs),
        }
    }

    pub fn get(&self, facet: RangeFacet) -> Domain {
        match facet {
            RangeFacet::Price => self.price,
            RangeFacet::Area => self.area,
            RangeFacet::Floors => self.floors,
            RangeFacet::Programs => self.programs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn areas(values: &[Option<f64>]) -> Vec<StudioRecord> {
        values
            .iter()
            .enumerate()
            .map(|(i, area)| {
                let mut record = StudioRecord::new(format!("r{}", i), "Record");
                record.area_sqft = *area;
                record
            })
            .collect()
    }

    #[test]
    fn test_domain_skips_absent_values() {
        let records = areas(&[Some(200.0), None, Some(800.0)]);
        let domain = compute_domain(&records, |r| r.area_sqft, 100_000.0);
        assert_eq!(domain, Domain::new(200.0, 800.0));
    }

    #[test]
    fn test_domain_fallback_and_degenerate() {
        let empty = areas(&[None, None]);
        assert_eq!(
            compute_domain(&empty, |r| r.area_sqft, 50.0),
            Domain::new(0.0, 50.0)
        );

        let single = areas(&[Some(350.0), Some(350.0)]);
        assert_eq!(
            compute_domain(&single, |r| r.area_sqft, 50.0),
            Domain::new(0.0, 350.0)
        );
    }

    #[test]
    fn test_domain_of_single_negative_value_stays_ordered() {
        let records = areas(&[Some(-5.0), Some(-5.0)]);
        let domain = compute_domain(&records, |r| r.area_sqft, 50.0);
        assert_eq!(domain, Domain::new(0.0, 0.0));
        assert!(domain.min <= domain.max);

        let all_negative = areas(&[Some(-9.5), Some(-2.0)]);
        assert_eq!(
            compute_domain(&all_negative, |r| r.area_sqft, 50.0),
            Domain::new(0.0, 0.0)
        );
    }

    #[test]
    fn test_clamp_tolerates_inverted_domain() {
        let inverted = Domain::new(0.0, -5.0);
        assert_eq!(
            inverted.clamp(RangeSelection::new(0.0, 10.0)),
            RangeSelection::new(0.0, 0.0)
        );
    }

    #[test]
    fn test_domain_rounds_outward_and_floors_at_zero() {
        let records = areas(&[Some(12.4), Some(99.2)]);
        assert_eq!(
            compute_domain(&records, |r| r.area_sqft, 1.0),
            Domain::new(12.0, 100.0)
        );

        let negative = areas(&[Some(-5.5), Some(3.0)]);
        assert_eq!(
            compute_domain(&negative, |r| r.area_sqft, 1.0),
            Domain::new(0.0, 3.0)
        );
    }

    #[test]
    fn test_range_domains_use_facet_fallbacks() {
        let domains = RangeDomains::default();
        assert_eq!(domains.price, Domain::new(0.0, 100_000.0));
        assert_eq!(domains.floors, Domain::new(0.0, 50.0));
        assert_eq!(domains.get(RangeFacet::Programs), Domain::new(0.0, 50.0));
    }

    #[test]
    fn test_clamp_orders_bounds() {
        let domain = Domain::new(100.0, 500.0);
        assert_eq!(domain.clamp(RangeSelection::new(50.0, 900.0)), RangeSelection::new(100.0, 500.0));
        assert_eq!(domain.clamp(RangeSelection::new(450.0, 300.0)), RangeSelection::new(300.0, 450.0));
        assert_eq!(domain.clamp(RangeSelection::new(f64::NAN, 200.0)), RangeSelection::new(100.0, 200.0));
    }

    #[test]
    fn test_selection_admits_absent_values() {
        let selection = RangeSelection::new(300.0, 500.0);
        assert!(selection.admits(None));
        assert!(selection.admits(Some(300.0)));
        assert!(!selection.admits(Some(200.0)));
        assert!(!selection.admits(Some(800.0)));
    }

    #[test]
    fn test_parse_selection() {
        assert_eq!("100..500".parse::<RangeSelection>().unwrap(), RangeSelection::new(100.0, 500.0));
        assert_eq!("1,3".parse::<RangeSelection>().unwrap(), RangeSelection::new(1.0, 3.0));
        assert_eq!("2-4".parse::<RangeSelection>().unwrap(), RangeSelection::new(2.0, 4.0));
        assert!(matches!("9..1".parse::<RangeSelection>(), Err(QueryError::InvalidRange(_))));
        assert!(matches!("abc".parse::<RangeSelection>(), Err(QueryError::InvalidRange(_))));
    }

    proptest! {
        #[test]
        fn proptest_domain_covers_every_sample(
            values in proptest::collection::vec(proptest::option::of(0.0f64..1_000_000.0), 1..40)
        ) {
            let records = areas(&values);
            let domain = compute_domain(&records, |r| r.area_sqft, 100_000.0);
            prop_assert!(domain.min <= domain.max);
            for v in values.iter().flatten() {
                prop_assert!(domain.contains(*v));
            }
        }
    }
}
