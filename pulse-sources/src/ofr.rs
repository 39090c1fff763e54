use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use pulse_core::{
    FetchRequest, Point, PulseError, SeriesProvider, SourceConnector, SourceKind, normalize,
};

use crate::http::{DEFAULT_TIMEOUT, build_client, status_error, transport_error};

const SOURCE: &str = "OFR";
const DEFAULT_URL: &str = "https://www.financialresearch.gov/financial-stress-index/data/fsi.csv";
const DEFAULT_VALUE_COLUMN: &str = "OFR FSI";
const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%m/%d/%Y"];

/// Connection settings for [`OfrConnector`].
#[derive(Debug, Clone)]
pub struct OfrConfig {
    /// Bulk CSV location.
    pub url: String,
    /// Header of the value column. When absent from the file the second column is used.
    pub value_column: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl Default for OfrConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            value_column: DEFAULT_VALUE_COLUMN.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// OFR financial stress index connector. Serves [`SourceKind::Ofr`].
pub struct OfrConnector {
    client: reqwest::Client,
    cfg: OfrConfig,
}

impl OfrConnector {
    /// Stable connector name.
    pub const NAME: &'static str = "pulse-ofr";

    /// Build with an explicit configuration.
    ///
    /// # Errors
    /// Returns `PulseError::Config` if the HTTP client cannot be constructed.
    pub fn new(cfg: OfrConfig) -> Result<Self, PulseError> {
        Ok(Self {
            client: build_client(SOURCE, cfg.timeout)?,
            cfg,
        })
    }

    /// Build against the public file.
    ///
    /// # Errors
    /// Returns `PulseError::Config` if the HTTP client cannot be constructed.
    pub fn new_default() -> Result<Self, PulseError> {
        Self::new(OfrConfig::default())
    }
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    DATE_FORMATS
        .iter()
        .find_map(|f| NaiveDate::parse_from_str(s, f).ok())
}

/// Parse the bulk file: first column is the date, the value column is located
/// by header (case-insensitive). Rows that fail to parse are skipped.
fn parse_csv(body: &str, value_column: &str, scale: f64) -> Result<Vec<Point>, PulseError> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(body.as_bytes());
    let headers = rdr
        .headers()
        .map_err(|e| PulseError::Data(format!("OFR csv header: {e}")))?
        .clone();
    if headers.len() < 2 {
        return Err(PulseError::Data("OFR csv has fewer than two columns".into()));
    }
    let idx = headers
        .iter()
        .position(|h| h.trim().eq_ignore_ascii_case(value_column))
        .unwrap_or(1);
    let points = rdr.records().filter_map(Result::ok).filter_map(|rec| {
        let date = parse_date(rec.get(0)?)?;
        let value: f64 = rec.get(idx)?.trim().parse().ok()?;
        Some(Point::new(date, value * scale))
    });
    Ok(normalize(points))
}

#[async_trait]
impl SeriesProvider for OfrConnector {
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "pulse_sources::ofr::observations", skip(self), fields(series_id = %req.series_id), err)
    )]
    async fn observations(&self, req: &FetchRequest) -> Result<Vec<Point>, PulseError> {
        let resp = self
            .client
            .get(&self.cfg.url)
            .send()
            .await
            .map_err(|e| transport_error(SOURCE, &e))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(status_error(SOURCE, status));
        }
        let body = resp.text().await.map_err(|e| transport_error(SOURCE, &e))?;
        parse_csv(&body, &self.cfg.value_column, req.raw_scale)
    }
}

impl SourceConnector for OfrConnector {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn serves(&self, kind: SourceKind) -> bool {
        kind == SourceKind::Ofr
    }

    fn as_series_provider(&self) -> Option<&dyn SeriesProvider> {
        Some(self as &dyn SeriesProvider)
    }
}
