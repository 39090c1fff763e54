use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate, Weekday};
use pulse_types::Point;

/// ISO-8601 (year, week) pair. Orders chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IsoWeek {
    /// ISO week-numbering year (may differ from the calendar year near January 1).
    pub year: i32,
    /// ISO week number, 1..=53.
    pub week: u32,
}

impl IsoWeek {
    /// Friday of this ISO week, or `None` when it falls outside the supported date range.
    #[must_use]
    pub fn friday(self) -> Option<NaiveDate> {
        NaiveDate::from_isoywd_opt(self.year, self.week, Weekday::Fri)
    }
}

/// ISO week of a date.
#[must_use]
pub fn iso_week(date: NaiveDate) -> IsoWeek {
    let w = date.iso_week();
    IsoWeek {
        year: w.year(),
        week: w.week(),
    }
}

/// Sum values per ISO week.
#[must_use]
pub fn sum_by_week(points: &[Point]) -> BTreeMap<IsoWeek, f64> {
    let mut out: BTreeMap<IsoWeek, f64> = BTreeMap::new();
    for p in points {
        *out.entry(iso_week(p.date)).or_insert(0.0) += p.value;
    }
    out
}

/// Calendar-week aggregation: one point per ISO week present in the input,
/// valued at the week's sum and dated on the week's Friday.
///
/// Weeks without a representable Friday are dropped.
#[must_use]
pub fn aggregate_weekly(points: &[Point]) -> Vec<Point> {
    sum_by_week(points)
        .into_iter()
        .filter_map(|(w, value)| w.friday().map(|date| Point { date, value }))
        .collect()
}

/// Weekly net of independently aggregated terms: `base - Σ subtract`.
///
/// A term with no data in a given week contributes zero; a week is emitted
/// when at least one term has data in it.
#[must_use]
pub fn weekly_net(base: &[Point], subtract: &[&[Point]]) -> Vec<Point> {
    let mut net: BTreeMap<IsoWeek, f64> = sum_by_week(base);
    for term in subtract {
        for (w, v) in sum_by_week(term) {
            *net.entry(w).or_insert(0.0) -= v;
        }
    }
    net.into_iter()
        .filter_map(|(w, value)| w.friday().map(|date| Point { date, value }))
        .collect()
}
