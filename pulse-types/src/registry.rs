//! Read-only registry records describing which series and indicators exist.
//!
//! The registry is configuration owned by the caller: the engine never mutates
//! it, and reloading means constructing a fresh [`Registry`] and handing it over.

use core::fmt;
use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::PulseError;

/// Upstream family a raw series is fetched from, or `Derived` for series
/// computed from other series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SourceKind {
    /// Single-series time-series API (FRED observations).
    Fred,
    /// Fiscal ledger: operating cash balance (Treasury General Account).
    TreasuryTga,
    /// Fiscal ledger: public debt transactions, redemption lines.
    TreasuryRedemptions,
    /// Fiscal ledger: operating cash withdrawals, interest lines.
    TreasuryInterest,
    /// Fiscal ledger: auction schedules, offering amounts by issue date.
    TreasuryAuctions,
    /// Bulk CSV statistical index (OFR financial stress index).
    Ofr,
    /// Computed from other series; never persisted to the durable tier.
    Derived,
}

impl SourceKind {
    /// Registry spelling of the kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Fred => "FRED",
            Self::TreasuryTga => "TREASURY_TGA",
            Self::TreasuryRedemptions => "TREASURY_REDEMPTIONS",
            Self::TreasuryInterest => "TREASURY_INTEREST",
            Self::TreasuryAuctions => "TREASURY_AUCTIONS",
            Self::Ofr => "OFR",
            Self::Derived => "DERIVED",
        }
    }

    /// Provider label reported as `source` on resolved series.
    #[must_use]
    pub const fn provider_label(self) -> &'static str {
        match self {
            Self::Fred => "FRED",
            Self::TreasuryTga
            | Self::TreasuryRedemptions
            | Self::TreasuryInterest
            | Self::TreasuryAuctions => "Treasury",
            Self::Ofr => "OFR",
            Self::Derived => "DERIVED",
        }
    }

    /// True for kinds whose values are computed rather than fetched.
    #[must_use]
    pub const fn is_derived(self) -> bool {
        matches!(self, Self::Derived)
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Native reporting frequency of a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cadence {
    /// One observation per business day.
    #[default]
    Daily,
    /// One observation per week.
    Weekly,
    /// One observation per month.
    Monthly,
    /// One observation per quarter.
    Quarterly,
}

/// Aggregation applied by a derived series to its base series.
///
/// Unrecognized labels are preserved rather than rejected at load time so the
/// resolver can report them as a not-found condition for that one series.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Aggregation {
    /// Sum of daily values per ISO week, labeled with the week's Friday.
    WeeklySum,
    /// Percentage of bill offerings in total auction offerings per ISO week.
    WeeklyBillPct,
    /// Any label this engine does not implement.
    Unrecognized(String),
}

impl From<String> for Aggregation {
    fn from(s: String) -> Self {
        match s.as_str() {
            "weekly_sum" => Self::WeeklySum,
            "weekly_bill_pct" => Self::WeeklyBillPct,
            _ => Self::Unrecognized(s),
        }
    }
}

impl From<Aggregation> for String {
    fn from(a: Aggregation) -> Self {
        match a {
            Aggregation::WeeklySum => "weekly_sum".to_string(),
            Aggregation::WeeklyBillPct => "weekly_bill_pct".to_string(),
            Aggregation::Unrecognized(s) => s,
        }
    }
}

/// Whether rising values of an indicator add or drain liquidity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Directionality {
    /// Higher readings are supportive.
    #[default]
    HigherIsSupportive,
    /// Lower readings are supportive.
    LowerIsSupportive,
    /// Any other label; scored like `HigherIsSupportive`.
    Other(String),
}

impl Directionality {
    /// True when a rising reading counts against liquidity.
    #[must_use]
    pub const fn is_inverted(&self) -> bool {
        matches!(self, Self::LowerIsSupportive)
    }
}

impl From<String> for Directionality {
    fn from(s: String) -> Self {
        match s.as_str() {
            "higher_is_supportive" => Self::HigherIsSupportive,
            "lower_is_supportive" => Self::LowerIsSupportive,
            _ => Self::Other(s),
        }
    }
}

impl From<Directionality> for String {
    fn from(d: Directionality) -> Self {
        match d {
            Directionality::HigherIsSupportive => "higher_is_supportive".to_string(),
            Directionality::LowerIsSupportive => "lower_is_supportive".to_string(),
            Directionality::Other(s) => s,
        }
    }
}

const fn default_scale() -> f64 {
    1.0
}

/// Registry record for one series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesEntry {
    /// Upstream family, or `DERIVED`.
    pub source: SourceKind,
    /// Native reporting frequency.
    #[serde(default)]
    pub cadence: Cadence,
    /// Display units (e.g. "USD", "percent").
    #[serde(default)]
    pub units: Option<String>,
    /// Multiplier applied once at ingestion to convert upstream units.
    #[serde(default = "default_scale")]
    pub raw_scale: f64,
    /// Base series for derived kinds.
    #[serde(default)]
    pub base_series: Option<String>,
    /// Aggregation for derived kinds.
    #[serde(default)]
    pub aggregation: Option<Aggregation>,
    /// Short display name.
    #[serde(default)]
    pub notes: Option<String>,
    /// Longer description.
    #[serde(default)]
    pub description: Option<String>,
    /// Market impact notes.
    #[serde(default)]
    pub impact: Option<String>,
    /// How to read the series.
    #[serde(default)]
    pub interpretation: Option<String>,
}

impl SeriesEntry {
    /// Minimal entry for a fetched series with unit scale.
    #[must_use]
    pub const fn new(source: SourceKind, cadence: Cadence) -> Self {
        Self {
            source,
            cadence,
            units: None,
            raw_scale: 1.0,
            base_series: None,
            aggregation: None,
            notes: None,
            description: None,
            impact: None,
            interpretation: None,
        }
    }

    /// Minimal entry for a derived series.
    #[must_use]
    pub fn derived(base_series: impl Into<String>, aggregation: Aggregation) -> Self {
        Self {
            base_series: Some(base_series.into()),
            aggregation: Some(aggregation),
            ..Self::new(SourceKind::Derived, Cadence::Weekly)
        }
    }

    /// Builder-style override of `raw_scale`.
    #[must_use]
    pub const fn with_scale(mut self, raw_scale: f64) -> Self {
        self.raw_scale = raw_scale;
        self
    }
}

/// Registry record for one indicator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorEntry {
    /// Stable indicator id (e.g. `net_liq`).
    pub id: String,
    /// Display name.
    pub name: String,
    /// Grouping label.
    #[serde(default)]
    pub category: Option<String>,
    /// Directionality used for scoring.
    #[serde(default)]
    pub directionality: Directionality,
    /// Declared series dependencies, in order.
    #[serde(default)]
    pub series: Vec<String>,
    /// Cadence of the indicator output.
    #[serde(default)]
    pub cadence: Option<Cadence>,
    /// Display units.
    #[serde(default)]
    pub units: Option<String>,
    /// Scoring method label (e.g. "z").
    #[serde(default)]
    pub scoring: Option<String>,
    /// Z-score cutoff for scoring.
    #[serde(default)]
    pub z_cutoff: Option<f64>,
    /// Number of observations a signal must persist.
    #[serde(default)]
    pub persistence: Option<u32>,
    /// Longer description.
    #[serde(default)]
    pub description: Option<String>,
}

impl IndicatorEntry {
    /// Minimal entry with default directionality.
    pub fn new(id: impl Into<String>, name: impl Into<String>, series: &[&str]) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category: None,
            directionality: Directionality::default(),
            series: series.iter().map(|s| (*s).to_string()).collect(),
            cadence: None,
            units: None,
            scoring: None,
            z_cutoff: None,
            persistence: None,
            description: None,
        }
    }
}

/// In-memory registry of indicators and series.
///
/// Series ids are canonicalized to upper case on construction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Registry {
    /// Indicator definitions in declaration order.
    #[serde(default)]
    pub indicators: Vec<IndicatorEntry>,
    /// Series definitions keyed by canonical id.
    #[serde(default, rename = "series_registry")]
    pub series: BTreeMap<String, SeriesEntry>,
}

impl Registry {
    /// Build a registry from already-parsed records.
    #[must_use]
    pub fn new(
        indicators: Vec<IndicatorEntry>,
        series: impl IntoIterator<Item = (String, SeriesEntry)>,
    ) -> Self {
        Self {
            indicators,
            series: series
                .into_iter()
                .map(|(k, v)| (k.to_ascii_uppercase(), v))
                .collect(),
        }
    }

    /// Parse a registry JSON document.
    ///
    /// # Errors
    /// Returns `Config` if the document is malformed or declares nothing.
    pub fn from_json_str(s: &str) -> Result<Self, PulseError> {
        let parsed: Self = serde_json::from_str(s)
            .map_err(|e| PulseError::Config(format!("invalid registry document: {e}")))?;
        if parsed.indicators.is_empty() && parsed.series.is_empty() {
            return Err(PulseError::Config(
                "registry does not contain indicator or series entries".into(),
            ));
        }
        Ok(Self::new(parsed.indicators, parsed.series))
    }

    /// Read and parse a registry JSON file.
    ///
    /// # Errors
    /// Returns `Config` if the file cannot be read or parsed.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, PulseError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| PulseError::Config(format!("cannot read {}: {e}", path.display())))?;
        Self::from_json_str(&text)
    }

    /// Look up a series by id, case-insensitively.
    #[must_use]
    pub fn series(&self, series_id: &str) -> Option<&SeriesEntry> {
        self.series.get(&series_id.to_ascii_uppercase())
    }

    /// Look up an indicator by exact id.
    #[must_use]
    pub fn indicator(&self, indicator_id: &str) -> Option<&IndicatorEntry> {
        self.indicators.iter().find(|i| i.id == indicator_id)
    }
}
