use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::timeseries::util::cutoff_date;
use pulse_types::{Point, PulseError, SourceKind};

/// Parameters of one upstream fetch.
///
/// `today` is supplied by the caller so adapters never read the wall clock;
/// the cutoff is always derived from it.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchRequest {
    /// Canonical (upper-cased) series id.
    pub series_id: String,
    /// Upstream family selected from the registry.
    pub kind: SourceKind,
    /// Lookback window in days.
    pub days: u32,
    /// Reference date for the window.
    pub today: NaiveDate,
    /// Unit multiplier applied once to every ingested value.
    pub raw_scale: f64,
}

impl FetchRequest {
    /// Build a request with unit scale.
    pub fn new(series_id: impl Into<String>, kind: SourceKind, days: u32, today: NaiveDate) -> Self {
        Self {
            series_id: series_id.into(),
            kind,
            days,
            today,
            raw_scale: 1.0,
        }
    }

    /// Builder-style override of the ingestion scale.
    #[must_use]
    pub const fn with_scale(mut self, raw_scale: f64) -> Self {
        self.raw_scale = raw_scale;
        self
    }

    /// `today - days`.
    #[must_use]
    pub fn cutoff(&self) -> NaiveDate {
        cutoff_date(self.today, self.days)
    }
}

/// One normalized row of a Treasury auction schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuctionRow {
    /// Auction date.
    pub auction_date: Option<NaiveDate>,
    /// Issue (settlement) date.
    pub issue_date: Option<NaiveDate>,
    /// Security type as published (e.g. "Bill", "Note").
    pub security_type: String,
    /// Security term as published (e.g. "13-Week").
    pub security_term: String,
    /// Offering amount in USD.
    pub offering_amount: Option<f64>,
    /// Total accepted amount in USD.
    pub accepted_amount: Option<f64>,
    /// Bills, including cash management bills.
    pub is_bill: bool,
    /// Notes, bonds, TIPS and FRNs.
    pub is_coupon: bool,
}

impl AuctionRow {
    /// Offering amount, falling back to the accepted amount when the offering
    /// is absent or zero. Zero when neither is present.
    #[must_use]
    pub fn amount(&self) -> f64 {
        match self.offering_amount {
            Some(v) if v != 0.0 => v,
            _ => self.accepted_amount.unwrap_or(0.0),
        }
    }
}

/// Focused role trait for connectors that return a normalized date-value series.
#[async_trait]
pub trait SeriesProvider: Send + Sync {
    /// Fetch observations for `req.series_id`, ascending by date, with
    /// `req.raw_scale` already applied.
    ///
    /// The window is a hint: adapters may return history older than the cutoff.
    async fn observations(&self, req: &FetchRequest) -> Result<Vec<Point>, PulseError>;
}

/// Focused role trait for connectors that expose raw auction schedule rows.
#[async_trait]
pub trait AuctionProvider: Send + Sync {
    /// Fetch auction rows whose auction date is on or after `since`.
    async fn auctions(&self, since: NaiveDate) -> Result<Vec<AuctionRow>, PulseError>;
}

/// Upstream adapter interface.
///
/// A connector declares which source kinds it serves and advertises role
/// traits through the `as_*` accessors. Adapters know nothing about caching.
pub trait SourceConnector: Send + Sync {
    /// A stable identifier (e.g. "pulse-fred").
    fn name(&self) -> &'static str;

    /// Whether this connector serves series of the given kind.
    ///
    /// Default: serves nothing. Connectors must explicitly declare their kinds.
    fn serves(&self, kind: SourceKind) -> bool {
        let _ = kind;
        false
    }

    /// Advertise series capability by returning a usable trait object reference when supported.
    fn as_series_provider(&self) -> Option<&dyn SeriesProvider> {
        None
    }

    /// Advertise auction-row capability by returning a usable trait object reference when supported.
    fn as_auction_provider(&self) -> Option<&dyn AuctionProvider> {
        None
    }
}
