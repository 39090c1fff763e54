use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use pulse_types::Point;

/// Combine a lower-cadence stock series with one or more denser flow series.
///
/// The date axis is the union of all flow dates. On each axis date the stock
/// takes its last known value as of that date (the latest stock point dated on
/// or before it). A point is emitted only when the stock has a value by then
/// and every flow has an observation on that exact date.
///
/// `combine` receives the filled stock value and the flow values in the order
/// the flows were passed.
pub fn forward_fill_combine<F>(stock: &[Point], flows: &[&[Point]], combine: F) -> Vec<Point>
where
    F: Fn(f64, &[f64]) -> f64,
{
    let stock_map: BTreeMap<NaiveDate, f64> = stock.iter().map(|p| (p.date, p.value)).collect();
    let flow_maps: Vec<BTreeMap<NaiveDate, f64>> = flows
        .iter()
        .map(|f| f.iter().map(|p| (p.date, p.value)).collect())
        .collect();
    let axis: BTreeSet<NaiveDate> = flow_maps.iter().flat_map(|m| m.keys().copied()).collect();

    let mut out = Vec::with_capacity(axis.len());
    let mut values = Vec::with_capacity(flow_maps.len());
    for date in axis {
        let Some((_, &carried)) = stock_map.range(..=date).next_back() else {
            continue;
        };
        values.clear();
        for m in &flow_maps {
            match m.get(&date) {
                Some(v) => values.push(*v),
                None => break,
            }
        }
        if values.len() != flow_maps.len() {
            continue;
        }
        out.push(Point {
            date,
            value: combine(carried, &values),
        });
    }
    out
}

/// Pair up two series on the dates they share, ascending. No filling.
#[must_use]
pub fn intersect(a: &[Point], b: &[Point]) -> Vec<(NaiveDate, f64, f64)> {
    let right: BTreeMap<NaiveDate, f64> = b.iter().map(|p| (p.date, p.value)).collect();
    let left: BTreeMap<NaiveDate, f64> = a.iter().map(|p| (p.date, p.value)).collect();
    left.into_iter()
        .filter_map(|(date, l)| right.get(&date).map(|r| (date, l, *r)))
        .collect()
}

/// `value[i] - value[i - n]` for every `i >= n`, dated at `i`.
///
/// Returns an empty series when `n == 0` or the input has `n` points or fewer.
#[must_use]
pub fn delta(points: &[Point], n: usize) -> Vec<Point> {
    if n == 0 || points.len() <= n {
        return Vec::new();
    }
    points
        .windows(n + 1)
        .map(|w| Point {
            date: w[n].date,
            value: w[n].value - w[0].value,
        })
        .collect()
}
