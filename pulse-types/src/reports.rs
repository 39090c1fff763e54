//! Report envelopes produced by the `Pulse` service.

use std::path::PathBuf;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::PulseError;
use crate::registry::{Cadence, Directionality, SourceKind};
use crate::series::Point;

/// Live value series for one indicator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorResult {
    /// Indicator id.
    pub indicator_id: String,
    /// Display name.
    pub name: String,
    /// Grouping label.
    pub category: Option<String>,
    /// Scoring directionality.
    pub directionality: Directionality,
    /// Derived values, ascending by date.
    pub items: Vec<Point>,
}

/// Liquidity signal of one indicator in a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    /// Signal adds liquidity (`+1`).
    #[serde(rename = "+1")]
    Supportive,
    /// No signal (`0`).
    #[serde(rename = "0")]
    Neutral,
    /// Signal drains liquidity (`-1`).
    #[serde(rename = "-1")]
    Draining,
}

impl Status {
    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Supportive => "supportive",
            Self::Neutral => "neutral",
            Self::Draining => "draining",
        }
    }
}

/// Per-indicator row of a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotEntry {
    /// Indicator id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Grouping label.
    pub category: Option<String>,
    /// Most recent value.
    pub latest_value: f64,
    /// Date of the most recent value.
    pub obs_date: NaiveDate,
    /// Z-score of the latest value over the trailing window, rounded to 2 decimals.
    pub z20: Option<f64>,
    /// Signal derived from the z-score and directionality.
    pub status: Status,
    /// Indicator description.
    pub notes: Option<String>,
}

/// Aggregate regime classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RegimeLabel {
    /// Net supportive signals above 30% of scored indicators.
    Supportive,
    /// Neither side dominates.
    Neutral,
    /// Net draining signals above 30% of scored indicators.
    Restrictive,
}

/// Regime summary for a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Regime {
    /// Classification.
    pub label: RegimeLabel,
    /// Signed tilt, e.g. `+3`.
    pub tilt: String,
    /// Supportive count minus draining count.
    pub score: i64,
    /// Number of indicators that contributed a row.
    pub max_score: i64,
}

/// Cross-indicator snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotReport {
    /// Build time.
    pub as_of: DateTime<Utc>,
    /// Regime summary.
    pub regime: Regime,
    /// Rows sorted by absolute z-score, descending.
    pub indicators: Vec<SnapshotEntry>,
    /// Non-fatal failures, one per dependency that could not be resolved.
    pub warnings: Vec<PulseError>,
}

/// Catalog row for a fetchable series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesListing {
    /// Canonical series id.
    pub id: String,
    /// Display name (falls back to the id).
    pub name: String,
    /// Native cadence.
    pub cadence: Cadence,
    /// Display units (defaults to "USD").
    pub units: String,
    /// Upstream family.
    pub source: SourceKind,
    /// Longer description.
    pub description: Option<String>,
    /// Market impact notes.
    pub impact: Option<String>,
    /// How to read the series.
    pub interpretation: Option<String>,
}

/// Statistics of the volatile tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryStats {
    /// Entries currently held, expired or not.
    pub total_entries: usize,
    /// Entries still within TTL.
    pub valid_entries: usize,
    /// Configured TTL in seconds.
    pub ttl_seconds: u64,
    /// Bypass mode flag.
    pub disabled: bool,
}

/// Statistics of the durable tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DurableStats {
    /// Record files present.
    pub total_files: usize,
    /// Record files written within TTL.
    pub valid_files: usize,
    /// Sum of record sizes in bytes.
    pub total_size_bytes: u64,
    /// Configured TTL in seconds.
    pub ttl_seconds: u64,
    /// Directory holding the records.
    pub cache_dir: PathBuf,
    /// Bypass mode flag.
    pub disabled: bool,
    /// Reads that failed (I/O or corrupt record) since startup.
    pub read_failures: u64,
    /// Writes that failed since startup.
    pub write_failures: u64,
}

/// Combined cache statistics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStatsReport {
    /// Volatile tier.
    pub memory: MemoryStats,
    /// Durable tier.
    pub durable: DurableStats,
}

/// Outcome of clearing both tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheClearReport {
    /// Durable records deleted.
    pub durable_files_deleted: usize,
}
