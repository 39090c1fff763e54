use std::time::Duration;

use pulse::{IndicatorEntry, Point, PulseError};
use pulse_mock::MockBehavior;

use crate::helpers::{builder, d, daily, days_ago, engine, registry, today};

#[tokio::test]
async fn net_liquidity_carries_weekly_balance_sheet_forward() {
    let (pulse, ctl, _) = engine("net-liq");
    ctl.set_series_behavior(
        "WALCL",
        MockBehavior::Return(vec![
            Point::new(d(2024, 2, 28), 100.0),
            Point::new(d(2024, 3, 6), 200.0),
            Point::new(d(2024, 3, 13), 300.0),
        ]),
    )
    .await;
    ctl.set_series_behavior(
        "TGA",
        MockBehavior::Return(daily(d(2024, 3, 1), today(), |_| 10.0)),
    )
    .await;
    let mut rrp = daily(d(2024, 3, 1), today(), |_| 5.0);
    rrp.retain(|p| p.date != d(2024, 3, 10));
    ctl.set_series_behavior("RRPONTSYD", MockBehavior::Return(rrp))
        .await;

    let res = pulse.indicator_live("net_liq", 30).await.unwrap();

    assert_eq!(res.indicator_id, "net_liq");
    assert_eq!(res.name, "Net liquidity");
    assert_eq!(res.items.len(), 14);
    assert!(res.items.iter().all(|p| p.date != d(2024, 3, 10)));
    let at = |day| res.items.iter().find(|p| p.date == d(2024, 3, day)).unwrap().value;
    assert_eq!(at(1), 85.0);
    assert_eq!(at(5), 85.0);
    assert_eq!(at(6), 185.0);
    assert_eq!(at(12), 185.0);
    assert_eq!(at(15), 285.0);
}

#[tokio::test]
async fn rrp_delta_is_five_observation_change() {
    let (pulse, ctl, _) = engine("rrp-delta");
    ctl.set_series_behavior(
        "RRPONTSYD",
        MockBehavior::Return(daily(days_ago(9), today(), |i| i as f64)),
    )
    .await;

    let res = pulse.indicator_live("rrp_delta", 30).await.unwrap();

    assert_eq!(res.items.len(), 5);
    assert_eq!(res.items[0].date, days_ago(4));
    assert!(res.items.iter().all(|p| p.value == 5.0));
}

#[tokio::test]
async fn failed_dependency_yields_empty_indicator() {
    let (pulse, ctl, _) = engine("partial");
    ctl.set_series_behavior(
        "SOFR",
        MockBehavior::Return(daily(days_ago(9), today(), |_| 5.31)),
    )
    .await;
    ctl.set_series_behavior(
        "IORB",
        MockBehavior::Fail(PulseError::upstream_status("fred", 500, "internal")),
    )
    .await;

    let res = pulse.indicator_live("sofr_iorb", 30).await.unwrap();
    assert!(res.items.is_empty());
    assert_eq!(ctl.calls("SOFR").await, 1);
    assert_eq!(ctl.calls("IORB").await, 1);
}

#[tokio::test]
async fn unregistered_dependency_is_treated_as_empty() {
    let mut reg = registry();
    reg.indicators
        .push(IndicatorEntry::new("custom", "Custom", &["NOT_THERE", "sofr"]));
    let (b, ctl, _) = builder("custom");
    let pulse = b.registry(reg).build().unwrap();
    let sofr = daily(days_ago(3), today(), |_| 5.3);
    ctl.set_series_behavior("SOFR", MockBehavior::Return(sofr.clone()))
        .await;

    let res = pulse.indicator_live("custom", 30).await.unwrap();
    assert_eq!(res.items, sofr);
}

#[tokio::test]
async fn net_settlement_resolves_override_series() {
    let (pulse, ctl, _) = engine("net-settle");
    ctl.set_series_behavior(
        "UST_AUCTION_ISSUES",
        MockBehavior::Return(vec![Point::new(d(2024, 3, 12), 100.0)]),
    )
    .await;
    ctl.set_series_behavior(
        "UST_REDEMPTIONS",
        MockBehavior::Return(vec![
            Point::new(d(2024, 3, 5), 20.0),
            Point::new(d(2024, 3, 14), 30.0),
        ]),
    )
    .await;
    ctl.set_series_behavior(
        "UST_INTEREST",
        MockBehavior::Return(vec![Point::new(d(2024, 3, 15), 5.0)]),
    )
    .await;

    let res = pulse.indicator_live("ust_net_w", 30).await.unwrap();

    assert_eq!(
        res.items,
        vec![
            Point::new(d(2024, 3, 8), -20.0),
            Point::new(d(2024, 3, 15), 65.0),
        ]
    );
    for sid in ["UST_AUCTION_ISSUES", "UST_REDEMPTIONS", "UST_INTEREST"] {
        assert_eq!(ctl.calls(sid).await, 1, "{sid}");
    }
}

#[tokio::test]
async fn passthrough_returns_derived_weekly_series() {
    let (pulse, ctl, _) = engine("passthrough");
    ctl.set_series_behavior(
        "UST_INTEREST",
        MockBehavior::Return(daily(d(2024, 3, 11), today(), |_| 2.0)),
    )
    .await;

    let res = pulse.indicator_live("ust_interest_w", 30).await.unwrap();
    assert_eq!(res.items, vec![Point::new(d(2024, 3, 15), 10.0)]);
}

#[tokio::test]
async fn unknown_indicator_is_an_error() {
    let (pulse, _ctl, _) = engine("unknown-ind");
    let err = pulse.indicator_live("nope", 30).await.unwrap_err();
    assert_eq!(err, PulseError::unknown_indicator("nope"));
}

#[tokio::test]
async fn stalled_dependency_becomes_empty_at_the_deadline() {
    let (b, ctl, _) = builder("deadline");
    let pulse = b
        .request_timeout(Duration::from_millis(50))
        .build()
        .unwrap();
    ctl.set_series_behavior("OFR_LIQ_IDX", MockBehavior::Hang)
        .await;

    let res = pulse.indicator_live("ofr_liq_idx", 30).await.unwrap();
    assert!(res.items.is_empty());
}

#[tokio::test]
async fn stalled_dependency_leaves_siblings_intact() {
    let mut reg = registry();
    reg.indicators
        .push(IndicatorEntry::new("custom", "Custom", &["OFR_LIQ_IDX", "SOFR"]));
    let (b, ctl, _) = builder("deadline-sibling");
    let pulse = b
        .registry(reg)
        .request_timeout(Duration::from_millis(50))
        .build()
        .unwrap();
    ctl.set_series_behavior("OFR_LIQ_IDX", MockBehavior::Hang)
        .await;
    let sofr = daily(days_ago(3), today(), |_| 5.3);
    ctl.set_series_behavior("SOFR", MockBehavior::Return(sofr.clone()))
        .await;

    let res = pulse.indicator_live("custom", 30).await.unwrap();
    assert_eq!(res.items, sofr);
    // The completed sibling was cached as usual.
    pulse.resolve_series("SOFR", 30).await.unwrap();
    assert_eq!(ctl.calls("SOFR").await, 1);
}
