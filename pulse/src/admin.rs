use pulse_core::{
    CacheClearReport, CacheStatsReport, IndicatorEntry, SeriesListing, SourceKind,
};

use crate::Pulse;

impl Pulse {
    /// Registered indicator definitions, in registry order.
    #[must_use]
    pub fn list_indicators(&self) -> Vec<IndicatorEntry> {
        self.registry().indicators.clone()
    }

    /// Fetchable (non-derived) series, sorted by source then id.
    #[must_use]
    pub fn list_series(&self) -> Vec<SeriesListing> {
        let registry = self.registry();
        let mut out: Vec<SeriesListing> = registry
            .series
            .iter()
            .filter(|(_, e)| e.source != SourceKind::Derived)
            .map(|(id, e)| SeriesListing {
                id: id.clone(),
                name: e.notes.clone().unwrap_or_else(|| id.clone()),
                cadence: e.cadence,
                units: e.units.clone().unwrap_or_else(|| "USD".to_string()),
                source: e.source,
                description: e.description.clone(),
                impact: e.impact.clone(),
                interpretation: e.interpretation.clone(),
            })
            .collect();
        out.sort_by(|a, b| (a.source, &a.id).cmp(&(b.source, &b.id)));
        out
    }

    /// Statistics for both cache tiers.
    pub async fn cache_stats(&self) -> CacheStatsReport {
        CacheStatsReport {
            memory: self.memory.stats().await,
            durable: self.durable.stats().await,
        }
    }

    /// Empty the volatile tier and delete every durable record.
    pub async fn cache_clear(&self) -> CacheClearReport {
        self.memory.clear().await;
        let durable_files_deleted = self.durable.clear(None).await;
        #[cfg(feature = "tracing")]
        tracing::info!(durable_files_deleted, "cache cleared");
        CacheClearReport {
            durable_files_deleted,
        }
    }

    /// Toggle bypass mode on both tiers. Existing entries are kept.
    pub fn set_cache_disabled(&self, disabled: bool) {
        self.memory.set_disabled(disabled);
        self.durable.set_disabled(disabled);
    }
}
