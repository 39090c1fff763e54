use std::time::Duration;

use async_trait::async_trait;
use chrono::{Days, NaiveDate};
use pulse_core::{
    FetchRequest, Point, PulseError, SeriesProvider, SourceConnector, SourceKind, normalize,
};
use serde::Deserialize;

use crate::http::{DEFAULT_TIMEOUT, build_client, status_error, transport_error};

const SOURCE: &str = "FRED";
const DEFAULT_BASE_URL: &str = "https://api.stlouisfed.org/fred/series/observations";

/// Extra rows requested beyond the lookback so sparse series still fill the window.
const LIMIT_PADDING: u32 = 50;
/// Days requested before the cutoff so weekly and monthly series reach past it.
const HORIZON_SLACK_DAYS: u64 = 7;

/// Connection settings for [`FredConnector`].
#[derive(Debug, Clone)]
pub struct FredConfig {
    /// API key; fetching without one is a configuration error.
    pub api_key: Option<String>,
    /// Observations endpoint.
    pub base_url: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl Default for FredConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl FredConfig {
    /// Default endpoint with the given key.
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            ..Self::default()
        }
    }
}

/// FRED observations connector. Serves [`SourceKind::Fred`].
pub struct FredConnector {
    client: reqwest::Client,
    cfg: FredConfig,
}

#[derive(Deserialize)]
struct ObservationsPage {
    #[serde(default)]
    observations: Vec<Observation>,
}

#[derive(Deserialize)]
struct Observation {
    date: String,
    #[serde(default)]
    value: Option<String>,
}

impl FredConnector {
    /// Stable connector name.
    pub const NAME: &'static str = "pulse-fred";

    /// Build with an explicit configuration.
    ///
    /// # Errors
    /// Returns `PulseError::Config` if the HTTP client cannot be constructed.
    pub fn new(cfg: FredConfig) -> Result<Self, PulseError> {
        Ok(Self {
            client: build_client(SOURCE, cfg.timeout)?,
            cfg,
        })
    }

    fn start_date(req: &FetchRequest) -> NaiveDate {
        let cutoff = req.cutoff();
        cutoff
            .checked_sub_days(Days::new(HORIZON_SLACK_DAYS))
            .unwrap_or(cutoff)
    }
}

/// Turn a newest-first observation list into ascending scaled points.
///
/// Missing-value sentinels (`""`, `"."`) and unparseable rows are skipped.
fn parse_observations(observations: Vec<Observation>, scale: f64) -> Vec<Point> {
    let points = observations.into_iter().rev().filter_map(|obs| {
        let raw = obs.value?;
        let raw = raw.trim();
        if raw.is_empty() || raw == "." {
            return None;
        }
        let value: f64 = raw.parse().ok()?;
        let date = NaiveDate::parse_from_str(obs.date.trim(), "%Y-%m-%d").ok()?;
        Some(Point::new(date, value * scale))
    });
    normalize(points)
}

#[async_trait]
impl SeriesProvider for FredConnector {
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "pulse_sources::fred::observations", skip(self), fields(series_id = %req.series_id), err)
    )]
    async fn observations(&self, req: &FetchRequest) -> Result<Vec<Point>, PulseError> {
        let Some(api_key) = self.cfg.api_key.as_deref() else {
            return Err(PulseError::Config("FRED_API_KEY not configured".into()));
        };
        let limit = req.days.saturating_add(LIMIT_PADDING).to_string();
        let start = Self::start_date(req).format("%Y-%m-%d").to_string();
        let resp = self
            .client
            .get(&self.cfg.base_url)
            .query(&[
                ("series_id", req.series_id.as_str()),
                ("api_key", api_key),
                ("file_type", "json"),
                ("sort_order", "desc"),
                ("limit", limit.as_str()),
                ("observation_start", start.as_str()),
            ])
            .send()
            .await
            .map_err(|e| transport_error(SOURCE, &e))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(status_error(SOURCE, status));
        }
        let body = resp.bytes().await.map_err(|e| transport_error(SOURCE, &e))?;
        let page: ObservationsPage = serde_json::from_slice(&body)
            .map_err(|e| PulseError::Data(format!("FRED payload for {}: {e}", req.series_id)))?;
        Ok(parse_observations(page.observations, req.raw_scale))
    }
}

impl SourceConnector for FredConnector {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn serves(&self, kind: SourceKind) -> bool {
        kind == SourceKind::Fred
    }

    fn as_series_provider(&self) -> Option<&dyn SeriesProvider> {
        Some(self as &dyn SeriesProvider)
    }
}
