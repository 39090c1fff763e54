use std::collections::BTreeMap;

use chrono::NaiveDate;
use pulse_types::Point;

/// Union two series keyed by date; `incoming` wins on collisions.
///
/// - Output is strictly ascending by date with one point per date.
/// - No date present in `existing` is ever dropped.
/// - Merging the same `incoming` twice yields the same result as once.
#[must_use]
pub fn merge_points(existing: &[Point], incoming: &[Point]) -> Vec<Point> {
    let mut map: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for p in existing.iter().chain(incoming) {
        map.insert(p.date, p.value);
    }
    map.into_iter().map(|(date, value)| Point { date, value }).collect()
}
