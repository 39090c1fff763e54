//! pulse-cache
//!
//! The two cache tiers consulted by the series resolver.
//!
//! - [`MemoryCache`] (L1): volatile, keyed by `(series_id, days)`, entries
//!   expire after the configured TTL and are evicted on the lookup that finds
//!   them stale.
//! - [`DurableCache`] (L2): one CSV record per series holding its full known
//!   history, replaced atomically on every write. Freshness is judged by the
//!   record's modification time.
//!
//! Both tiers share the bypass semantics of [`pulse_core::CacheConfig::disabled`]:
//! while disabled, lookups miss and writes are dropped, but nothing is cleared.
//! Neither tier surfaces its own failures to callers; a failed read is a miss
//! and a failed write is logged and counted.
#![warn(missing_docs)]

mod durable;
mod error;
mod memory;

pub use durable::DurableCache;
pub use error::CacheError;
pub use memory::{MemoryCache, MemoryKey};
