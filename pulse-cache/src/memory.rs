use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use pulse_core::{MemoryStats, RawSeries};
use tokio::sync::Mutex;

/// L1 key: canonical series id plus the lookback the result was filtered to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MemoryKey {
    series_id: String,
    days: u32,
}

impl MemoryKey {
    /// Build a key. The id is upper-cased so lookups are case-insensitive.
    pub fn new(series_id: &str, days: u32) -> Self {
        Self {
            series_id: series_id.to_ascii_uppercase(),
            days,
        }
    }
}

struct Entry {
    value: RawSeries,
    expires_at: Instant,
}

/// Volatile TTL tier.
pub struct MemoryCache {
    inner: Mutex<HashMap<MemoryKey, Entry>>,
    ttl: Duration,
    disabled: AtomicBool,
}

impl MemoryCache {
    /// Create an empty tier.
    #[must_use]
    pub fn new(ttl: Duration, disabled: bool) -> Self {
        Self {
            inner: Mutex::new(HashMap::new()),
            ttl,
            disabled: AtomicBool::new(disabled),
        }
    }

    /// Fetch a live entry. A stale entry is removed and reported as absent.
    pub async fn get(&self, key: &MemoryKey) -> Option<RawSeries> {
        if self.is_disabled() {
            return None;
        }
        let mut guard = self.inner.lock().await;
        if let Some(entry) = guard.get(key)
            && Instant::now() <= entry.expires_at
        {
            return Some(entry.value.clone());
        }
        guard.remove(key);
        None
    }

    /// Insert or replace an entry. No-op while disabled.
    pub async fn set(&self, key: MemoryKey, value: RawSeries) {
        if self.is_disabled() {
            return;
        }
        let expires_at = Instant::now() + self.ttl;
        self.inner.lock().await.insert(key, Entry { value, expires_at });
    }

    /// Drop every entry, ignoring the bypass flag.
    pub async fn clear(&self) {
        self.inner.lock().await.clear();
    }

    /// Toggle bypass mode. Existing entries are kept.
    pub fn set_disabled(&self, disabled: bool) {
        self.disabled.store(disabled, Ordering::Relaxed);
    }

    /// Whether bypass mode is active.
    pub fn is_disabled(&self) -> bool {
        self.disabled.load(Ordering::Relaxed)
    }

    /// Entry counts at this instant.
    pub async fn stats(&self) -> MemoryStats {
        let guard = self.inner.lock().await;
        let now = Instant::now();
        MemoryStats {
            total_entries: guard.len(),
            valid_entries: guard.values().filter(|e| now <= e.expires_at).count(),
            ttl_seconds: self.ttl.as_secs(),
            disabled: self.is_disabled(),
        }
    }
}
