use pulse::{Aggregation, AuctionRow, Point, PulseError, SeriesEntry};
use pulse_mock::MockBehavior;

use crate::helpers::{builder, d, daily, days_ago, engine, registry, today};

fn auction(issue: Option<(u32, u32)>, bill: bool, offering: Option<f64>, accepted: Option<f64>) -> AuctionRow {
    AuctionRow {
        auction_date: None,
        issue_date: issue.map(|(m, day)| d(2024, m, day)),
        security_type: if bill { "Bill" } else { "Note" }.into(),
        security_term: if bill { "4-Week" } else { "10-Year" }.into(),
        offering_amount: offering,
        accepted_amount: accepted,
        is_bill: bill,
        is_coupon: !bill,
    }
}

#[tokio::test]
async fn weekly_sum_labels_iso_weeks_by_friday() {
    let (pulse, ctl, dir) = engine("weekly-sum");
    ctl.set_series_behavior(
        "UST_REDEMPTIONS",
        MockBehavior::Return(daily(days_ago(40), today(), |_| 1.0)),
    )
    .await;

    let s = pulse.resolve_series("ust_redemptions_w", 28).await.unwrap();

    assert_eq!(s.source, "DERIVED");
    assert_eq!(
        s.items,
        vec![
            Point::new(d(2024, 2, 16), 3.0),
            Point::new(d(2024, 2, 23), 7.0),
            Point::new(d(2024, 3, 1), 7.0),
            Point::new(d(2024, 3, 8), 7.0),
            Point::new(d(2024, 3, 15), 5.0),
        ]
    );

    // Base persisted, aggregate kept in memory only.
    let series_dir = dir.join("series");
    assert!(series_dir.join("UST_REDEMPTIONS.csv").exists());
    assert!(!series_dir.join("UST_REDEMPTIONS_W.csv").exists());

    pulse.resolve_series("UST_REDEMPTIONS_W", 28).await.unwrap();
    assert_eq!(ctl.calls("UST_REDEMPTIONS").await, 1);
}

#[tokio::test]
async fn weekly_bill_pct_from_auction_offerings() {
    let (pulse, ctl, _) = engine("bill-pct");
    ctl.set_auction_behavior(MockBehavior::Return(vec![
        auction(Some((2, 20)), true, Some(10.0), None),
        auction(Some((2, 27)), true, Some(60.0), None),
        auction(Some((2, 27)), false, Some(40.0), None),
        auction(Some((3, 5)), true, None, Some(30.0)),
        auction(Some((3, 5)), false, Some(0.0), Some(0.0)),
        auction(Some((3, 6)), false, Some(90.0), Some(85.0)),
        auction(Some((3, 12)), false, Some(100.0), None),
        auction(None, true, Some(500.0), None),
    ]))
    .await;

    let s = pulse.resolve_series("UST_BILL_SHARE", 14).await.unwrap();

    assert_eq!(
        s.items,
        vec![
            Point::new(d(2024, 3, 1), 60.0),
            Point::new(d(2024, 3, 8), 25.0),
            Point::new(d(2024, 3, 15), 0.0),
        ]
    );
    // Rows are requested from 30 days before the cutoff.
    assert_eq!(ctl.auction_requests().await, vec![d(2024, 1, 31)]);
}

#[tokio::test]
async fn unsupported_aggregation_is_reported() {
    let mut reg = registry();
    reg.series.insert(
        "UST_X".into(),
        SeriesEntry::derived("UST_REDEMPTIONS", Aggregation::Unrecognized("weekly_avg".into())),
    );
    let (b, ctl, _) = builder("bad-agg");
    let pulse = b.registry(reg).build().unwrap();

    let err = pulse.resolve_series("UST_X", 30).await.unwrap_err();
    assert_eq!(
        err,
        PulseError::UnknownAggregation {
            series_id: "UST_X".into(),
            aggregation: "weekly_avg".into(),
        }
    );
    assert!(ctl.requests().await.is_empty());
}

#[tokio::test]
async fn derived_series_without_base_is_a_config_error() {
    let mut reg = registry();
    let mut orphan = SeriesEntry::derived("UST_REDEMPTIONS", Aggregation::WeeklySum);
    orphan.base_series = None;
    reg.series.insert("UST_ORPHAN".into(), orphan);
    let (b, _ctl, _) = builder("no-base");
    let pulse = b.registry(reg).build().unwrap();

    let err = pulse.resolve_series("UST_ORPHAN", 30).await.unwrap_err();
    assert!(matches!(err, PulseError::Config(ref m) if m.contains("missing base_series")));
}

#[tokio::test]
async fn derived_series_fails_when_base_fails() {
    let (pulse, ctl, _) = engine("base-fail");
    ctl.set_series_behavior(
        "UST_INTEREST",
        MockBehavior::Fail(PulseError::upstream("fiscaldata", "boom")),
    )
    .await;

    let err = pulse.resolve_series("UST_INTEREST_W", 30).await.unwrap_err();
    assert_eq!(err, PulseError::upstream("fiscaldata", "boom"));
}
