//! Time-series utilities shared by adapters, the resolver and the formula library.
//!
//! Modules include:
//! - `util`: cutoff computation, window filtering, normalization, rounding
//! - `merge`: date-keyed union used by the durable cache write path
//! - `weekly`: ISO calendar-week bucketing labeled by the week's Friday
//! - `align`: forward-fill and intersection across mismatched cadences
/// Cadence alignment helpers.
pub mod align;
/// Merge utilities for date-keyed series.
pub mod merge;
/// Cutoff and normalization helpers.
pub mod util;
/// Calendar-week aggregation.
pub mod weekly;
