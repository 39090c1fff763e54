use std::time::Duration;

use pulse_core::PulseError;

/// Per-request timeout applied by every connector unless configured otherwise.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

pub(crate) fn build_client(source: &str, timeout: Duration) -> Result<reqwest::Client, PulseError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| PulseError::Config(format!("{source} http client: {e}")))
}

pub(crate) fn transport_error(source: &str, e: &reqwest::Error) -> PulseError {
    if e.is_timeout() {
        return PulseError::upstream(source, "request timed out");
    }
    PulseError::upstream(source, e.to_string())
}

pub(crate) fn status_error(source: &str, status: reqwest::StatusCode) -> PulseError {
    PulseError::upstream_status(
        source,
        status.as_u16(),
        status.canonical_reason().unwrap_or("unexpected status"),
    )
}
