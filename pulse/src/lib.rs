//! Pulse resolves macro-financial time series through a two-tier cache and
//! derives liquidity indicators from them.
//!
//! Overview
//! - Series are declared in a [`Registry`] and fetched through registered
//!   [`SourceConnector`]s selected by the series' [`SourceKind`].
//! - Every resolution consults a volatile tier keyed by `(series_id, days)`,
//!   then a durable per-series record holding the full known history.
//! - Indicators combine resolved series through a fixed formula library
//!   (deltas, spreads, forward-filled combinations, weekly nets).
//!
//! Key behaviors and trade-offs
//! - Coverage: a fresh durable record whose earliest date is after the
//!   requested cutoff is treated as a miss and refetched. This costs an
//!   upstream call but never serves a truncated window.
//! - Merge on write: fetched history is unioned into the durable record by
//!   date, newest values winning, so a short fetch never erases older history.
//! - Derived series (weekly aggregations) are memoized in the volatile tier only.
//! - Partial failure: a dependency that fails to resolve contributes an empty
//!   series; the indicator is still computed from what is available.
//! - Snapshots fan out over every indicator concurrently; dependency failures
//!   become warnings on the report.
//! - An optional request deadline bounds each dependency resolution on its own.
//!
//! Examples
//! ```rust,ignore
//! use std::sync::Arc;
//! use pulse::{Pulse, Registry, FredConfig, FredConnector, FiscalConnector};
//!
//! let registry = Registry::from_path("registry.json")?;
//! let pulse = Pulse::builder()
//!     .with_connector(Arc::new(FredConnector::new(FredConfig::with_api_key("..."))?))
//!     .with_connector(Arc::new(FiscalConnector::new_default()?))
//!     .registry(registry)
//!     .build()?;
//!
//! let walcl = pulse.resolve_series("WALCL", 180).await?;
//! let net_liq = pulse.indicator_live("net_liq", 180).await?;
//! let snapshot = pulse.snapshot().await;
//! ```
#![warn(missing_docs)]

mod admin;
pub(crate) mod core;
mod derive;
mod indicators;
mod resolver;
mod util;

pub use core::{Pulse, PulseBuilder};
pub use derive::Formula;

pub use pulse_cache::{DurableCache, MemoryCache};
pub use pulse_core::{
    Aggregation, AuctionProvider, AuctionRow, CacheClearReport, CacheConfig, CacheStatsReport,
    Cadence, Directionality, DurableStats, FetchRequest, IndicatorEntry, IndicatorResult,
    MemoryStats, Point, PulseConfig, PulseError, RawSeries, Regime, RegimeLabel, Registry,
    SeriesEntry, SeriesListing, SeriesProvider, SnapshotEntry, SnapshotReport, SourceConnector,
    SourceKind, Status,
};
pub use pulse_sources::{
    FiscalConfig, FiscalConnector, FredConfig, FredConnector, OfrConfig, OfrConnector,
};
