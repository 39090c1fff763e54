//! pulse-core
//!
//! Core types, traits, and utilities shared across the pulse workspace.
//!
//! - `connector`: the `SourceConnector` trait and its role traits
//!   (`SeriesProvider`, `AuctionProvider`) implemented by upstream adapters.
//! - `timeseries`: date-keyed helpers used by the resolver and the formula
//!   library (merge, cutoff, calendar weeks, cadence alignment).
//!
//! Data types (`Point`, `RawSeries`), registry records and the error enum are
//! defined in `pulse-types` and re-exported here.
#![warn(missing_docs)]

/// Source connector traits and fetch request types.
pub mod connector;
/// Time-series utilities for merging, windowing, weekly bucketing and alignment.
pub mod timeseries;

pub use connector::{AuctionProvider, AuctionRow, FetchRequest, SeriesProvider, SourceConnector};
pub use pulse_types::*;
pub use timeseries::align::{delta, forward_fill_combine, intersect};
pub use timeseries::merge::merge_points;
pub use timeseries::util::{cutoff_date, filter_since, normalize, round_to};
pub use timeseries::weekly::{IsoWeek, aggregate_weekly, iso_week, sum_by_week, weekly_net};
