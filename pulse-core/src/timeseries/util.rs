use std::collections::BTreeMap;

use chrono::{Days, NaiveDate};
use pulse_types::Point;

/// `today - days`, saturating at the earliest representable date.
#[must_use]
pub fn cutoff_date(today: NaiveDate, days: u32) -> NaiveDate {
    today
        .checked_sub_days(Days::new(u64::from(days)))
        .unwrap_or(NaiveDate::MIN)
}

/// Keep points dated on or after `cutoff`, preserving order.
#[must_use]
pub fn filter_since(points: &[Point], cutoff: NaiveDate) -> Vec<Point> {
    points.iter().filter(|p| p.date >= cutoff).copied().collect()
}

/// Sort ascending by date and collapse duplicate dates, the last occurrence winning.
#[must_use]
pub fn normalize<I>(points: I) -> Vec<Point>
where
    I: IntoIterator<Item = Point>,
{
    let map: BTreeMap<NaiveDate, f64> = points.into_iter().map(|p| (p.date, p.value)).collect();
    map.into_iter().map(|(date, value)| Point { date, value }).collect()
}

/// Round half away from zero to a fixed number of decimals.
#[must_use]
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
