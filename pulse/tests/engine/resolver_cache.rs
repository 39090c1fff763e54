use std::time::Duration;

use pulse::{CacheConfig, DurableCache, PulseError, SourceKind};
use pulse_mock::{DynamicMockConnector, MockBehavior};

use crate::helpers::{builder, builder_in, d, daily, days_ago, engine, registry, today};

#[tokio::test]
async fn memory_tier_serves_repeat_requests() {
    let (pulse, ctl, _) = engine("l1");
    ctl.set_series_behavior(
        "WALCL",
        MockBehavior::Return(daily(days_ago(40), today(), |i| i as f64)),
    )
    .await;

    let a = pulse.resolve_series("WALCL", 30).await.unwrap();
    let b = pulse.resolve_series("walcl", 30).await.unwrap();

    assert_eq!(a, b);
    assert_eq!(a.series_id, "WALCL");
    assert_eq!(a.source, "FRED");
    assert_eq!(ctl.calls("WALCL").await, 1);
}

#[tokio::test]
async fn results_start_at_the_cutoff() {
    let (pulse, ctl, _) = engine("cutoff");
    ctl.set_series_behavior(
        "RRPONTSYD",
        MockBehavior::Return(daily(days_ago(90), today(), |_| 1.0)),
    )
    .await;

    let s = pulse.resolve_series("RRPONTSYD", 30).await.unwrap();
    assert_eq!(s.items.first().map(|p| p.date), Some(days_ago(30)));
    assert_eq!(s.items.last().map(|p| p.date), Some(today()));
    assert_eq!(s.items.len(), 31);
    assert!(s.items.windows(2).all(|w| w[0].date < w[1].date));
}

#[tokio::test]
async fn durable_record_serves_narrower_window() {
    let (pulse, ctl, _) = engine("narrow");
    ctl.set_series_behavior(
        "SOFR",
        MockBehavior::Return(daily(days_ago(40), today(), |i| i as f64)),
    )
    .await;

    pulse.resolve_series("SOFR", 30).await.unwrap();
    let narrow = pulse.resolve_series("SOFR", 10).await.unwrap();

    assert_eq!(ctl.calls("SOFR").await, 1);
    assert_eq!(narrow.items.first().map(|p| p.date), Some(days_ago(10)));
    assert_eq!(narrow.items.len(), 11);
}

#[tokio::test]
async fn durable_record_survives_restart() {
    let (first, ctl, dir) = engine("restart");
    ctl.set_series_behavior(
        "IORB",
        MockBehavior::Return(daily(days_ago(40), today(), |_| 5.4)),
    )
    .await;
    let before = first.resolve_series("IORB", 30).await.unwrap();
    drop(first);

    // The second controller has nothing scripted: any upstream call would fail.
    let (b, ctl2, _) = builder_in(dir);
    let second = b.build().unwrap();
    let after = second.resolve_series("IORB", 30).await.unwrap();

    assert_eq!(before, after);
    assert_eq!(ctl2.calls("IORB").await, 0);
}

#[tokio::test]
async fn shallow_durable_record_is_refetched() {
    let (pulse, ctl, _) = engine("shallow");
    ctl.set_series_behavior(
        "DTB3",
        MockBehavior::Return(daily(days_ago(10), today(), |_| 5.2)),
    )
    .await;
    pulse.resolve_series("DTB3", 10).await.unwrap();

    ctl.set_series_behavior(
        "DTB3",
        MockBehavior::Return(daily(days_ago(70), today(), |_| 5.2)),
    )
    .await;
    let wide = pulse.resolve_series("DTB3", 60).await.unwrap();

    assert_eq!(ctl.calls("DTB3").await, 2);
    assert_eq!(wide.items.first().map(|p| p.date), Some(days_ago(60)));
}

#[tokio::test]
async fn short_refetch_never_truncates_durable_history() {
    let (pulse, ctl, dir) = engine("merge");
    ctl.set_series_behavior(
        "WRESBAL",
        MockBehavior::Return(daily(days_ago(40), today(), |_| 1.0)),
    )
    .await;
    pulse.resolve_series("WRESBAL", 30).await.unwrap();

    // A deeper request misses coverage; upstream now only returns the last 6 days.
    ctl.set_series_behavior(
        "WRESBAL",
        MockBehavior::Return(daily(days_ago(5), today(), |_| 1000.0)),
    )
    .await;
    let refetched = pulse.resolve_series("WRESBAL", 60).await.unwrap();
    assert_eq!(refetched.items.len(), 6);

    let record = DurableCache::new(&dir, Duration::from_secs(3600), false)
        .read("WRESBAL")
        .await
        .unwrap();
    assert_eq!(record.len(), 41);
    assert_eq!(record.first().map(|p| p.date), Some(days_ago(40)));
    assert!(record[..35].iter().all(|p| p.value == 1.0));
    assert!(record[35..].iter().all(|p| p.value == 1000.0));
}

#[tokio::test]
async fn overlapping_resolutions_keep_the_deeper_history() {
    let (pulse, ctl, dir) = engine("overlap");
    // Deep requests answer at once; the shallow one lands after the deep write.
    ctl.set_series_behavior(
        "SOFR",
        MockBehavior::Return(daily(days_ago(400), today(), |_| 5.3)),
    )
    .await;
    ctl.set_window_behavior(
        "SOFR",
        30,
        MockBehavior::Delay(
            Duration::from_millis(200),
            daily(days_ago(9), today(), |_| 5.4),
        ),
    )
    .await;

    let (shallow, deep) = tokio::join!(
        pulse.resolve_series("SOFR", 5),
        pulse.resolve_series("SOFR", 365)
    );
    assert_eq!(shallow.unwrap().items.len(), 6);
    assert_eq!(deep.unwrap().items.len(), 366);
    assert_eq!(ctl.calls("SOFR").await, 2);

    let record = DurableCache::new(&dir, Duration::from_secs(3600), false)
        .read("SOFR")
        .await
        .unwrap();
    assert_eq!(record.len(), 401);
    assert_eq!(record.first().map(|p| p.date), Some(days_ago(400)));
    assert!(record[391..].iter().all(|p| p.value == 5.4));
}

#[tokio::test]
async fn disabled_cache_always_calls_upstream() {
    let (b, ctl, dir) = builder("disabled");
    let pulse = b
        .cache(CacheConfig {
            disabled: true,
            ttl: Duration::from_secs(3600),
            dir,
        })
        .build()
        .unwrap();
    ctl.set_series_behavior(
        "WALCL",
        MockBehavior::Return(daily(days_ago(40), today(), |_| 1.0)),
    )
    .await;

    pulse.resolve_series("WALCL", 30).await.unwrap();
    pulse.resolve_series("WALCL", 30).await.unwrap();

    assert_eq!(ctl.calls("WALCL").await, 2);
    let stats = pulse.cache_stats().await;
    assert_eq!(stats.durable.total_files, 0);
    assert_eq!(stats.memory.total_entries, 0);
    assert!(stats.memory.disabled && stats.durable.disabled);
}

#[tokio::test]
async fn upstream_failure_propagates_and_writes_nothing() {
    let (pulse, ctl, dir) = engine("upstream-fail");
    let err = PulseError::upstream_status("fred", 503, "unavailable");
    ctl.set_series_behavior("WALCL", MockBehavior::Fail(err.clone()))
        .await;

    let got = pulse.resolve_series("WALCL", 30).await.unwrap_err();
    assert_eq!(got, err);
    assert!(!dir.join("series").join("WALCL.csv").exists());
    assert_eq!(pulse.cache_stats().await.memory.total_entries, 0);
}

#[tokio::test]
async fn unknown_series_is_reported_upper_cased() {
    let (pulse, ctl, _) = engine("unknown");
    let err = pulse.resolve_series("nope", 30).await.unwrap_err();
    assert_eq!(err, PulseError::unknown_series("NOPE"));
    assert!(err.is_not_found());
    assert!(ctl.requests().await.is_empty());
}

#[tokio::test]
async fn missing_connector_for_source_is_a_config_error() {
    let (fred_only, _ctl) = DynamicMockConnector::new_with_controller("fred", &[SourceKind::Fred]);
    let pulse = pulse::Pulse::builder()
        .with_connector(fred_only)
        .registry(registry())
        .fixed_today(today())
        .cache(CacheConfig {
            disabled: true,
            ..CacheConfig::default()
        })
        .build()
        .unwrap();

    let err = pulse.resolve_series("TGA", 30).await.unwrap_err();
    assert!(matches!(err, PulseError::Config(ref m) if m.contains("TREASURY_TGA")));
}

#[tokio::test]
async fn raw_scale_is_passed_to_the_adapter() {
    let mut reg = registry();
    if let Some(tga) = reg.series.get_mut("TGA") {
        tga.raw_scale = 1_000_000.0;
    }
    let (b, ctl, _) = builder("scale");
    let pulse = b.registry(reg).build().unwrap();
    ctl.set_series_behavior(
        "TGA",
        MockBehavior::Return(vec![pulse::Point::new(d(2024, 3, 14), 750.5)]),
    )
    .await;

    let s = pulse.resolve_series("TGA", 30).await.unwrap();
    assert_eq!(s.source, "Treasury");
    assert_eq!(s.items[0].value, 750_500_000.0);

    let reqs = ctl.requests().await;
    assert_eq!(reqs.len(), 1);
    assert_eq!(reqs[0].series_id, "TGA");
    assert_eq!(reqs[0].days, 30);
    assert_eq!(reqs[0].today, today());
    assert_eq!(reqs[0].raw_scale, 1_000_000.0);
}
