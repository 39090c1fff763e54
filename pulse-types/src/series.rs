//! Observation and series envelopes.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single `(date, value)` observation at day granularity.
///
/// `NaiveDate` orders chronologically and serializes as `YYYY-MM-DD`, so the
/// lexical and chronological orders of the wire form agree.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Observation date.
    pub date: NaiveDate,
    /// Observed value, already scaled to registry units.
    pub value: f64,
}

impl Point {
    /// Construct a point.
    #[must_use]
    pub const fn new(date: NaiveDate, value: f64) -> Self {
        Self { date, value }
    }
}

/// A resolved raw series as returned by the series resolver.
///
/// `items` is strictly ascending by date with at most one point per date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawSeries {
    /// Canonical (upper-cased) series id.
    pub series_id: String,
    /// Provider label (e.g. "FRED", "Treasury", "DERIVED").
    pub source: String,
    /// Ordered observations.
    pub items: Vec<Point>,
}

impl RawSeries {
    /// Construct a series envelope.
    pub fn new(series_id: impl Into<String>, source: impl Into<String>, items: Vec<Point>) -> Self {
        Self {
            series_id: series_id.into(),
            source: source.into(),
            items,
        }
    }
}
