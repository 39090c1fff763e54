use std::collections::BTreeMap;

use chrono::NaiveDate;
use futures::future::BoxFuture;
use pulse_cache::MemoryKey;
use pulse_core::{
    Aggregation, FetchRequest, IsoWeek, Point, PulseError, RawSeries, SeriesEntry, aggregate_weekly,
    cutoff_date, filter_since, iso_week, normalize, round_to,
};

use crate::Pulse;

/// Auction rows are requested from this many days before the cutoff so that
/// issues settling inside the window are not missed.
const AUCTION_LEAD_DAYS: u64 = 30;

impl Pulse {
    /// Resolve a series over the trailing `days` window.
    ///
    /// Behavior:
    /// - Volatile tier first, keyed by `(series_id, days)`.
    /// - Then the durable record, served only when fresh and when its earliest
    ///   point reaches back to the cutoff; a shallow record is refetched.
    /// - Upstream fetches are merged into the durable record by date so older
    ///   history is never lost. Derived series skip the durable tier.
    ///
    /// The returned points are ascending, unique by date and no older than
    /// `today - days`.
    ///
    /// # Errors
    /// - `UnknownSeries` when the id is not registered.
    /// - `Config` when no connector serves the series' source kind, when an
    ///   adapter lacks configuration, or when a derived series has no base.
    /// - `UnknownAggregation` for derived series with an unsupported aggregation.
    /// - Upstream errors from adapters propagate unchanged.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "pulse::resolver::resolve_series", skip(self))
    )]
    pub async fn resolve_series(&self, series_id: &str, days: u32) -> Result<RawSeries, PulseError> {
        self.resolve_boxed(series_id.to_ascii_uppercase(), days).await
    }

    // Boxed so derived series can recurse into their base series.
    fn resolve_boxed(&self, sid: String, days: u32) -> BoxFuture<'_, Result<RawSeries, PulseError>> {
        Box::pin(async move {
            let registry = self.registry();
            let entry = registry
                .series(&sid)
                .cloned()
                .ok_or_else(|| PulseError::unknown_series(&sid))?;
            let cutoff = cutoff_date(self.today(), days);
            let key = MemoryKey::new(&sid, days);

            if let Some(hit) = self.memory.get(&key).await {
                #[cfg(feature = "tracing")]
                tracing::debug!(series_id = %sid, days, "memory hit");
                return Ok(hit);
            }

            let derived = entry.source.is_derived();
            let stored = if derived {
                None
            } else {
                self.durable.read(&sid).await
            };

            if let Some(stored) = &stored
                && self.durable.is_valid(&sid).await
            {
                if stored.first().is_some_and(|p| p.date <= cutoff) {
                    #[cfg(feature = "tracing")]
                    tracing::debug!(series_id = %sid, days, "durable hit");
                    let series =
                        RawSeries::new(&sid, entry.source.provider_label(), filter_since(stored, cutoff));
                    self.memory.set(key, series.clone()).await;
                    return Ok(series);
                }
                #[cfg(feature = "tracing")]
                tracing::debug!(
                    series_id = %sid,
                    earliest = ?stored.first().map(|p| p.date),
                    %cutoff,
                    "durable record does not cover window; refetching"
                );
            }

            let fetched = if derived {
                self.fetch_derived(&sid, &entry, days, cutoff).await?
            } else {
                self.fetch_upstream(&sid, &entry, days).await?
            };

            let series = RawSeries::new(
                &sid,
                entry.source.provider_label(),
                filter_since(&fetched, cutoff),
            );
            self.memory.set(key, series.clone()).await;

            // Re-read and merged under the series lock; the record read above
            // may be stale by now.
            if !derived {
                self.durable.merge_write(&sid, &fetched).await;
            }
            Ok(series)
        })
    }

    async fn fetch_upstream(
        &self,
        sid: &str,
        entry: &SeriesEntry,
        days: u32,
    ) -> Result<Vec<Point>, PulseError> {
        let Some((connector, provider)) = self.series_provider_for(entry.source) else {
            return Err(PulseError::Config(format!(
                "no connector registered for source {}",
                entry.source
            )));
        };
        #[cfg(feature = "tracing")]
        tracing::debug!(series_id = sid, connector, source = %entry.source, "upstream fetch");
        #[cfg(not(feature = "tracing"))]
        let _ = connector;
        let req = FetchRequest::new(sid, entry.source, days, self.today()).with_scale(entry.raw_scale);
        let points = provider.observations(&req).await?;
        Ok(normalize(points))
    }

    async fn fetch_derived(
        &self,
        sid: &str,
        entry: &SeriesEntry,
        days: u32,
        cutoff: NaiveDate,
    ) -> Result<Vec<Point>, PulseError> {
        let Some(base) = entry.base_series.as_deref() else {
            return Err(PulseError::Config(format!(
                "derived series {sid} missing base_series"
            )));
        };
        match &entry.aggregation {
            Some(Aggregation::WeeklySum) => {
                let base = self.resolve_boxed(base.to_ascii_uppercase(), days).await?;
                Ok(aggregate_weekly(&base.items))
            }
            Some(Aggregation::WeeklyBillPct) => self.weekly_bill_pct(cutoff).await,
            Some(Aggregation::Unrecognized(label)) => Err(PulseError::UnknownAggregation {
                series_id: sid.to_string(),
                aggregation: label.clone(),
            }),
            None => Err(PulseError::UnknownAggregation {
                series_id: sid.to_string(),
                aggregation: String::new(),
            }),
        }
    }

    /// Share of bill offerings in total offerings per ISO week of issue, in
    /// percent rounded to 2 decimals, dated on the week's Friday.
    async fn weekly_bill_pct(&self, cutoff: NaiveDate) -> Result<Vec<Point>, PulseError> {
        let Some((_, provider)) = self.auction_provider() else {
            return Err(PulseError::Config(
                "no connector registered for source TREASURY_AUCTIONS".into(),
            ));
        };
        let since = cutoff
            .checked_sub_days(chrono::Days::new(AUCTION_LEAD_DAYS))
            .unwrap_or(NaiveDate::MIN);
        let rows = provider.auctions(since).await?;

        let mut weeks: BTreeMap<IsoWeek, (f64, f64)> = BTreeMap::new();
        for row in &rows {
            let Some(issued) = row.issue_date else {
                continue;
            };
            let amount = row.amount();
            if amount <= 0.0 {
                continue;
            }
            let (bills, total) = weeks.entry(iso_week(issued)).or_insert((0.0, 0.0));
            *total += amount;
            if row.is_bill {
                *bills += amount;
            }
        }

        Ok(weeks
            .into_iter()
            .filter(|(_, (_, total))| *total > 0.0)
            .filter_map(|(week, (bills, total))| {
                week.friday()
                    .map(|date| Point::new(date, round_to(bills / total * 100.0, 2)))
            })
            .collect())
    }
}
