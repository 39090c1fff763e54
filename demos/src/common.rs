use std::sync::Arc;

use pulse::{
    CacheConfig, FiscalConnector, FredConfig, FredConnector, OfrConnector, Pulse, PulseError,
    Registry, SourceConnector,
};
use pulse_mock::FixtureConnector;

/// Registry shipped with the demos.
pub const REGISTRY_JSON: &str = include_str!("../registry.json");

/// True when demos should run offline against deterministic fixtures.
#[must_use]
pub fn use_fixtures() -> bool {
    std::env::var("PULSE_DEMOS_USE_FIXTURES").is_ok()
}

/// Return the connectors for demos.
///
/// With `PULSE_DEMOS_USE_FIXTURES` set, a single offline fixture connector is
/// used. Otherwise the live FRED, fiscal data and OFR adapters are registered;
/// FRED reads its key from `FRED_API_KEY`.
///
/// # Errors
/// Returns `PulseError::Config` when an HTTP client cannot be built.
pub fn connectors() -> Result<Vec<Arc<dyn SourceConnector>>, PulseError> {
    if use_fixtures() {
        println!("--- (Using fixture connector) ---");
        return Ok(vec![Arc::new(FixtureConnector::new())]);
    }
    let fred = FredConfig {
        api_key: std::env::var("FRED_API_KEY").ok(),
        ..FredConfig::default()
    };
    Ok(vec![
        Arc::new(FredConnector::new(fred)?),
        Arc::new(FiscalConnector::new_default()?),
        Arc::new(OfrConnector::new_default()?),
    ])
}

/// Build an engine over the demo registry.
///
/// Durable records go to `PULSE_CACHE_DIR` when set, else a directory under
/// the system temp dir.
///
/// # Errors
/// Propagates registry parsing and connector construction failures.
pub fn engine() -> Result<Pulse, PulseError> {
    let dir = std::env::var_os("PULSE_CACHE_DIR").map_or_else(
        || std::env::temp_dir().join("pulse-demos-cache"),
        std::path::PathBuf::from,
    );
    let mut builder = Pulse::builder()
        .registry(Registry::from_json_str(REGISTRY_JSON)?)
        .cache(CacheConfig {
            dir,
            ..CacheConfig::default()
        });
    for c in connectors()? {
        builder = builder.with_connector(c);
    }
    builder.build()
}
