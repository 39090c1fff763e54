//! Configuration types shared by the cache tiers and the `Pulse` service.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Two-tier cache configuration.
///
/// The same TTL governs both tiers: L1 entries expire `ttl` after insertion and
/// an L2 record is considered fresh while its last write is younger than `ttl`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CacheConfig {
    /// Bypass mode: lookups always miss and writes are dropped. Existing entries are kept.
    pub disabled: bool,
    /// Time-to-live for both tiers.
    pub ttl: Duration,
    /// Root directory for durable records; series files live under `{dir}/series/`.
    pub dir: PathBuf,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            disabled: false,
            ttl: Duration::from_secs(3600),
            dir: PathBuf::from("./cache"),
        }
    }
}

/// Global configuration for the `Pulse` service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PulseConfig {
    /// Two-tier cache settings.
    pub cache: CacheConfig,
    /// Optional overall deadline for fan-out aggregations (indicator dependencies, snapshots).
    pub request_timeout: Option<Duration>,
    /// Lookback window used when building snapshots.
    pub snapshot_days: u32,
    /// Window length for the snapshot z-score.
    pub zscore_window: usize,
}

impl Default for PulseConfig {
    fn default() -> Self {
        Self {
            cache: CacheConfig::default(),
            request_timeout: None,
            snapshot_days: 60,
            zscore_window: 20,
        }
    }
}
