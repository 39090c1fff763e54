use std::cmp::Ordering;
use std::collections::BTreeMap;

use chrono::Utc;
use futures::future::join_all;
use pulse_core::{
    IndicatorEntry, IndicatorResult, Point, PulseError, Regime, RegimeLabel, SnapshotEntry,
    SnapshotReport, Status, round_to,
};

use crate::Pulse;
use crate::derive::{Formula, dependencies};
use crate::util::with_request_deadline;

/// |z| above which an indicator carries a signal.
const SIGNAL_THRESHOLD: f64 = 1.0;
/// Share of scored indicators the net score must exceed to leave `Neutral`.
const REGIME_SHARE: f64 = 0.3;

impl Pulse {
    /// Compute an indicator over the trailing `days` window.
    ///
    /// Behavior and trade-offs:
    /// - Dependencies are resolved concurrently. A dependency that fails, or
    ///   that outlives the request deadline, contributes an empty series
    ///   instead of failing the indicator, so the result may be empty.
    /// - The deadline, when configured, bounds each dependency resolution on
    ///   its own; a stalled dependency never holds up its siblings' results.
    ///
    /// # Errors
    /// Returns `UnknownIndicator` when the id is not registered.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "pulse::indicators::indicator_live", skip(self))
    )]
    pub async fn indicator_live(
        &self,
        indicator_id: &str,
        days: u32,
    ) -> Result<IndicatorResult, PulseError> {
        let registry = self.registry();
        let indicator = registry
            .indicator(indicator_id)
            .ok_or_else(|| PulseError::unknown_indicator(indicator_id))?;
        let (result, _failures) = self.evaluate(indicator, days).await;
        Ok(result)
    }

    /// Build a cross-indicator snapshot over the configured lookback.
    ///
    /// Behavior and trade-offs:
    /// - Every registered indicator is computed concurrently.
    /// - Indicators with no values are left out.
    /// - Every dependency failure, deadline expiries included, is reported
    ///   under `warnings`; the affected indicator is computed from what remains.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "pulse::indicators::snapshot", skip(self))
    )]
    pub async fn snapshot(&self) -> SnapshotReport {
        let registry = self.registry();
        let days = self.cfg.snapshot_days;
        let tasks = registry
            .indicators
            .iter()
            .map(|ind| self.evaluate(ind, days));

        let mut indicators = Vec::new();
        let mut warnings = Vec::new();
        for (ind, (result, failures)) in registry.indicators.iter().zip(join_all(tasks).await) {
            warnings.extend(failures);
            if let Some(row) = snapshot_row(ind, &result.items, self.cfg.zscore_window) {
                indicators.push(row);
            }
        }

        indicators.sort_by(|a, b| {
            let za = a.z20.map_or(0.0, f64::abs);
            let zb = b.z20.map_or(0.0, f64::abs);
            zb.partial_cmp(&za).unwrap_or(Ordering::Equal)
        });
        let regime = classify(&indicators);

        SnapshotReport {
            as_of: Utc::now(),
            regime,
            indicators,
            warnings,
        }
    }

    // Resolve every dependency under its own deadline and apply the formula.
    // Failed dependencies become empty series and are returned alongside.
    async fn evaluate(
        &self,
        indicator: &IndicatorEntry,
        days: u32,
    ) -> (IndicatorResult, Vec<PulseError>) {
        let deps = dependencies(indicator);
        let tasks = deps.iter().map(|sid| {
            let operation = format!("resolve_series {sid}");
            async move {
                with_request_deadline(
                    self.cfg.request_timeout,
                    &operation,
                    self.resolve_series(sid, days),
                )
                .await
            }
        });

        let mut resolved = BTreeMap::new();
        let mut failures = Vec::new();
        for (sid, res) in deps.iter().zip(join_all(tasks).await) {
            let items = match res {
                Ok(series) => series.items,
                Err(e) => {
                    #[cfg(feature = "tracing")]
                    tracing::warn!(indicator_id = %indicator.id, series_id = %sid, error = %e, "dependency failed; using empty series");
                    failures.push(e);
                    Vec::new()
                }
            };
            resolved.insert(sid.clone(), items);
        }

        let items = Formula::for_indicator(&indicator.id).apply(&deps, &resolved);
        let result = IndicatorResult {
            indicator_id: indicator.id.clone(),
            name: indicator.name.clone(),
            category: indicator.category.clone(),
            directionality: indicator.directionality.clone(),
            items,
        };
        (result, failures)
    }
}

fn snapshot_row(ind: &IndicatorEntry, items: &[Point], window: usize) -> Option<SnapshotEntry> {
    let latest = items.last()?;
    let values: Vec<f64> = items.iter().map(|p| p.value).collect();
    let z20 = zscore(&values, window).map(|z| round_to(z, 2));
    Some(SnapshotEntry {
        id: ind.id.clone(),
        name: ind.name.clone(),
        category: ind.category.clone(),
        latest_value: latest.value,
        obs_date: latest.date,
        z20,
        status: status(z20, ind.directionality.is_inverted()),
        notes: ind.description.clone(),
    })
}

/// Z-score of the last value against the last `window` values, using the
/// sample standard deviation. `None` with fewer than `window` values (or a
/// window under 2); zero when the window is flat.
pub(crate) fn zscore(values: &[f64], window: usize) -> Option<f64> {
    if window < 2 || values.len() < window {
        return None;
    }
    let tail = &values[values.len() - window..];
    let n = tail.len() as f64;
    let mean = tail.iter().sum::<f64>() / n;
    let var = tail.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    let sd = var.sqrt();
    let last = *tail.last()?;
    if sd == 0.0 {
        return Some(0.0);
    }
    Some((last - mean) / sd)
}

pub(crate) fn status(z: Option<f64>, inverted: bool) -> Status {
    let Some(z) = z else {
        return Status::Neutral;
    };
    let z = if inverted { -z } else { z };
    if z > SIGNAL_THRESHOLD {
        Status::Supportive
    } else if z < -SIGNAL_THRESHOLD {
        Status::Draining
    } else {
        Status::Neutral
    }
}

pub(crate) fn classify(rows: &[SnapshotEntry]) -> Regime {
    let score: i64 = rows
        .iter()
        .map(|r| match r.status {
            Status::Supportive => 1,
            Status::Draining => -1,
            Status::Neutral => 0,
        })
        .sum();
    let max_score = i64::try_from(rows.len()).unwrap_or(i64::MAX);
    let bound = REGIME_SHARE * max_score as f64;
    let label = if score as f64 > bound {
        RegimeLabel::Supportive
    } else if (score as f64) < -bound {
        RegimeLabel::Restrictive
    } else {
        RegimeLabel::Neutral
    };
    Regime {
        label,
        tilt: format!("{score:+}"),
        score,
        max_score,
    }
}
