use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use chrono::NaiveDate;
use pulse_cache::{DurableCache, MemoryCache};
use pulse_core::{
    AuctionProvider, CacheConfig, PulseConfig, PulseError, Registry, SeriesProvider,
    SourceConnector, SourceKind,
};

/// Source of the reference date used to compute lookback cutoffs.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Clock {
    /// Current UTC date.
    System,
    /// A pinned date.
    Fixed(NaiveDate),
}

impl Clock {
    fn today(self) -> NaiveDate {
        match self {
            Self::System => chrono::Utc::now().date_naive(),
            Self::Fixed(d) => d,
        }
    }
}

/// Liquidity engine: resolves series through the cache tiers and derives indicators.
///
/// Construct once with [`Pulse::builder`] and share by reference (or `Arc`).
/// All methods take `&self`.
pub struct Pulse {
    pub(crate) connectors: Vec<Arc<dyn SourceConnector>>,
    pub(crate) registry: RwLock<Arc<Registry>>,
    pub(crate) memory: MemoryCache,
    pub(crate) durable: DurableCache,
    pub(crate) cfg: PulseConfig,
    clock: Clock,
}

/// Builder for constructing a [`Pulse`] with custom configuration.
pub struct PulseBuilder {
    connectors: Vec<Arc<dyn SourceConnector>>,
    registry: Registry,
    cfg: PulseConfig,
    clock: Clock,
}

impl Default for PulseBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PulseBuilder {
    /// Create a new builder with defaults.
    ///
    /// Behavior and trade-offs:
    /// - Starts with no connectors and an empty registry; register at least one
    ///   connector via [`PulseBuilder::with_connector`].
    /// - Cache defaults: enabled, one hour TTL for both tiers, durable records
    ///   under `./cache/series/`.
    /// - No request-level deadline; snapshots use a 60 day lookback.
    #[must_use]
    pub fn new() -> Self {
        Self {
            connectors: vec![],
            registry: Registry::default(),
            cfg: PulseConfig::default(),
            clock: Clock::System,
        }
    }

    /// Register a source connector.
    ///
    /// Behavior and trade-offs:
    /// - For each source kind the first registered connector that serves it is
    ///   used; later ones are never consulted for that kind.
    /// - Duplicates are not deduplicated.
    #[must_use]
    pub fn with_connector(mut self, c: Arc<dyn SourceConnector>) -> Self {
        self.connectors.push(c);
        self
    }

    /// Set the series and indicator registry.
    #[must_use]
    pub fn registry(mut self, registry: Registry) -> Self {
        self.registry = registry;
        self
    }

    /// Replace the whole configuration.
    #[must_use]
    pub fn config(mut self, cfg: PulseConfig) -> Self {
        self.cfg = cfg;
        self
    }

    /// Set the cache configuration.
    #[must_use]
    pub fn cache(mut self, cache: CacheConfig) -> Self {
        self.cfg.cache = cache;
        self
    }

    /// Set a request-level deadline for fan-out operations.
    ///
    /// Behavior and trade-offs:
    /// - Applies to the dependency fan-out of an indicator and to snapshot fan-out.
    /// - On expiry the whole fan-out fails with `RequestTimeout`; partial results
    ///   are not returned.
    #[must_use]
    pub const fn request_timeout(mut self, timeout: Duration) -> Self {
        self.cfg.request_timeout = Some(timeout);
        self
    }

    /// Pin the reference date used for lookback cutoffs instead of today's UTC date.
    #[must_use]
    pub const fn fixed_today(mut self, today: NaiveDate) -> Self {
        self.clock = Clock::Fixed(today);
        self
    }

    /// Build the [`Pulse`] instance.
    ///
    /// # Errors
    /// Returns `PulseError::Config` when no connector is registered.
    pub fn build(self) -> Result<Pulse, PulseError> {
        if self.connectors.is_empty() {
            return Err(PulseError::Config(
                "at least one source connector must be registered".into(),
            ));
        }
        let cache = &self.cfg.cache;
        let memory = MemoryCache::new(cache.ttl, cache.disabled);
        let durable = DurableCache::new(&cache.dir, cache.ttl, cache.disabled);
        Ok(Pulse {
            connectors: self.connectors,
            registry: RwLock::new(Arc::new(self.registry)),
            memory,
            durable,
            cfg: self.cfg,
            clock: self.clock,
        })
    }
}

impl Pulse {
    /// Start building a new `Pulse` instance.
    ///
    /// ```rust,ignore
    /// let pulse = pulse::Pulse::builder()
    ///     .with_connector(Arc::new(pulse::FiscalConnector::new_default()?))
    ///     .registry(pulse::Registry::from_path("registry.json")?)
    ///     .request_timeout(std::time::Duration::from_secs(30))
    ///     .build()?;
    /// ```
    #[must_use]
    pub fn builder() -> PulseBuilder {
        PulseBuilder::new()
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &PulseConfig {
        &self.cfg
    }

    /// Reference date for cutoffs.
    pub(crate) fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    /// Snapshot of the current registry. Cheap: clones an `Arc`.
    #[must_use]
    pub fn registry(&self) -> Arc<Registry> {
        let guard = self.registry.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    /// Atomically replace the registry.
    ///
    /// In-flight operations keep the registry they started with. Cached
    /// series are not invalidated.
    pub fn reload_registry(&self, registry: Registry) {
        let mut guard = self.registry.write().unwrap_or_else(PoisonError::into_inner);
        *guard = Arc::new(registry);
    }

    pub(crate) fn series_provider_for(
        &self,
        kind: SourceKind,
    ) -> Option<(&'static str, &dyn SeriesProvider)> {
        self.connectors
            .iter()
            .filter(|c| c.serves(kind))
            .find_map(|c| c.as_series_provider().map(|p| (c.name(), p)))
    }

    pub(crate) fn auction_provider(&self) -> Option<(&'static str, &dyn AuctionProvider)> {
        self.connectors
            .iter()
            .filter(|c| c.serves(SourceKind::TreasuryAuctions))
            .find_map(|c| c.as_auction_provider().map(|p| (c.name(), p)))
    }
}
