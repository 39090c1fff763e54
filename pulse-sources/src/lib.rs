//! pulse-sources
//!
//! Upstream connectors implementing [`pulse_core::SourceConnector`]:
//!
//! - [`FredConnector`]: FRED `series/observations`, a single newest-first page
//!   reversed to ascending order with missing-value sentinels skipped.
//! - [`FiscalConnector`]: the Treasury FiscalData family (operating cash
//!   balance, public debt transactions, operating cash withdrawals, auction
//!   schedules), fetched page by page with tolerant row classification.
//! - [`OfrConnector`]: the OFR financial stress index bulk CSV.
//!
//! Connectors apply the registry `raw_scale` once at ingestion and never cache.
#![warn(missing_docs)]

mod fiscal;
mod fred;
mod http;
mod ofr;

pub use fiscal::{FiscalConfig, FiscalConnector};
pub use fred::{FredConfig, FredConnector};
pub use http::DEFAULT_TIMEOUT;
pub use ofr::{OfrConfig, OfrConnector};
