use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unified error type for the pulse workspace.
///
/// Separates configuration problems, unknown registry entities, upstream
/// transport failures and payload-level data issues so callers can map each
/// class to an appropriate boundary response.
#[derive(Debug, Error, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum PulseError {
    /// Required configuration is missing or invalid (e.g. an upstream API key).
    #[error("configuration error: {0}")]
    Config(String),

    /// The series id is not present in the series registry.
    #[error("unknown series: {series_id}")]
    UnknownSeries {
        /// Canonical (upper-cased) series id that was requested.
        series_id: String,
    },

    /// The indicator id is not present in the indicator registry.
    #[error("unknown indicator: {indicator_id}")]
    UnknownIndicator {
        /// Indicator id that was requested.
        indicator_id: String,
    },

    /// A derived series declares an aggregation the engine does not implement.
    #[error("unknown aggregation '{aggregation}' for series {series_id}")]
    UnknownAggregation {
        /// Derived series id.
        series_id: String,
        /// Aggregation label as written in the registry.
        aggregation: String,
    },

    /// An upstream provider failed at the transport or HTTP level.
    #[error("{source_name} failed{}: {msg}", .status.map(|s| format!(" (HTTP {s})")).unwrap_or_default())]
    Upstream {
        /// Provider label (e.g. "fred", "fiscaldata").
        source_name: String,
        /// HTTP status code when the failure carried one.
        status: Option<u16>,
        /// Human-readable error message.
        msg: String,
    },

    /// Issues with the returned payload as a whole (malformed JSON, missing columns).
    #[error("data issue: {0}")]
    Data(String),

    /// Invalid input argument.
    #[error("invalid argument: {0}")]
    InvalidArg(String),

    /// The overall request exceeded the configured deadline.
    #[error("request timed out: {operation}")]
    RequestTimeout {
        /// Operation label for which the request timed out.
        operation: String,
    },

    /// Unknown/opaque error.
    #[error("unknown error: {0}")]
    Other(String),
}

impl PulseError {
    /// Helper: build an `UnknownSeries` error.
    pub fn unknown_series(series_id: impl Into<String>) -> Self {
        Self::UnknownSeries {
            series_id: series_id.into(),
        }
    }

    /// Helper: build an `UnknownIndicator` error.
    pub fn unknown_indicator(indicator_id: impl Into<String>) -> Self {
        Self::UnknownIndicator {
            indicator_id: indicator_id.into(),
        }
    }

    /// Helper: build an `Upstream` error without an HTTP status.
    pub fn upstream(source_name: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Upstream {
            source_name: source_name.into(),
            status: None,
            msg: msg.into(),
        }
    }

    /// Helper: build an `Upstream` error carrying an HTTP status code.
    pub fn upstream_status(source_name: impl Into<String>, status: u16, msg: impl Into<String>) -> Self {
        Self::Upstream {
            source_name: source_name.into(),
            status: Some(status),
            msg: msg.into(),
        }
    }

    /// Helper: build a `RequestTimeout` error.
    #[must_use]
    pub fn request_timeout(operation: impl Into<String>) -> Self {
        Self::RequestTimeout {
            operation: operation.into(),
        }
    }

    /// Returns true for the caller-facing "not found" class: unknown series,
    /// unknown indicator or unknown aggregation.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::UnknownSeries { .. }
                | Self::UnknownIndicator { .. }
                | Self::UnknownAggregation { .. }
        )
    }

    /// HTTP status carried by an upstream failure, if any.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Upstream { status, .. } => *status,
            _ => None,
        }
    }
}
