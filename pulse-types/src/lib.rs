//! Pulse-specific data transfer objects, registry records and configuration primitives.
#![warn(missing_docs)]

mod config;
mod error;
mod registry;
mod reports;
mod series;

pub use config::{CacheConfig, PulseConfig};
pub use error::PulseError;
pub use registry::{
    Aggregation, Cadence, Directionality, IndicatorEntry, Registry, SeriesEntry, SourceKind,
};
pub use reports::{
    CacheClearReport, CacheStatsReport, DurableStats, IndicatorResult, MemoryStats, Regime,
    RegimeLabel, SeriesListing, SnapshotEntry, SnapshotReport, Status,
};
pub use series::{Point, RawSeries};
