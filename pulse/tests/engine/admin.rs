use pulse::{Cadence, IndicatorEntry, PulseError, Registry, SeriesEntry, SourceKind};
use pulse_mock::MockBehavior;

use crate::helpers::{daily, days_ago, engine, today};

#[tokio::test]
async fn list_series_skips_derived_and_sorts_by_source_then_id() {
    let (pulse, _ctl, _) = engine("list-series");
    let listed = pulse.list_series();

    assert!(listed.iter().all(|s| s.source != SourceKind::Derived));
    assert!(listed.iter().all(|s| !s.id.ends_with("_W") && s.id != "UST_BILL_SHARE"));
    let keys: Vec<(SourceKind, &str)> = listed.iter().map(|s| (s.source, s.id.as_str())).collect();
    let mut sorted = keys.clone();
    sorted.sort_unstable();
    assert_eq!(keys, sorted);
    assert_eq!(keys.first(), Some(&(SourceKind::Fred, "DTB3")));

    let tga = listed.iter().find(|s| s.id == "TGA").unwrap();
    assert_eq!(tga.name, "Treasury General Account");
    assert_eq!(tga.units, "USD");
    assert_eq!(tga.impact.as_deref(), Some("Rising balance drains reserves"));
    assert_eq!(tga.interpretation.as_deref(), Some("Treasury cash at the Fed"));
    let walcl = listed.iter().find(|s| s.id == "WALCL").unwrap();
    assert_eq!(walcl.name, "WALCL");
    assert_eq!(walcl.cadence, Cadence::Weekly);
    assert_eq!(walcl.impact, None);
}

#[tokio::test]
async fn list_indicators_keeps_registry_order() {
    let (pulse, _ctl, _) = engine("list-ind");
    let ids: Vec<String> = pulse.list_indicators().into_iter().map(|i| i.id).collect();
    assert_eq!(ids.first().map(String::as_str), Some("net_liq"));
    assert_eq!(ids.len(), 11);
}

#[tokio::test]
async fn cache_stats_and_clear_cover_both_tiers() {
    let (pulse, ctl, _) = engine("stats");
    for id in ["SOFR", "IORB"] {
        ctl.set_series_behavior(id, MockBehavior::Return(daily(days_ago(20), today(), |_| 5.0)))
            .await;
        pulse.resolve_series(id, 10).await.unwrap();
    }

    let stats = pulse.cache_stats().await;
    assert_eq!(stats.memory.total_entries, 2);
    assert_eq!(stats.memory.valid_entries, 2);
    assert_eq!(stats.memory.ttl_seconds, 3600);
    assert_eq!(stats.durable.total_files, 2);
    assert_eq!(stats.durable.valid_files, 2);
    assert!(stats.durable.total_size_bytes > 0);
    assert_eq!(stats.durable.read_failures, 0);

    let cleared = pulse.cache_clear().await;
    assert_eq!(cleared.durable_files_deleted, 2);

    let stats = pulse.cache_stats().await;
    assert_eq!(stats.memory.total_entries, 0);
    assert_eq!(stats.durable.total_files, 0);

    pulse.resolve_series("SOFR", 10).await.unwrap();
    assert_eq!(ctl.calls("SOFR").await, 2);
}

#[tokio::test]
async fn bypass_mode_keeps_entries_for_later() {
    let (pulse, ctl, _) = engine("bypass");
    ctl.set_series_behavior("SOFR", MockBehavior::Return(daily(days_ago(20), today(), |_| 5.0)))
        .await;
    pulse.resolve_series("SOFR", 10).await.unwrap();

    pulse.set_cache_disabled(true);
    pulse.resolve_series("SOFR", 10).await.unwrap();
    assert_eq!(ctl.calls("SOFR").await, 2);

    pulse.set_cache_disabled(false);
    pulse.resolve_series("SOFR", 10).await.unwrap();
    assert_eq!(ctl.calls("SOFR").await, 2);
    assert_eq!(pulse.cache_stats().await.durable.total_files, 1);
}

#[tokio::test]
async fn reload_registry_swaps_definitions() {
    let (pulse, ctl, _) = engine("reload");
    ctl.set_series_behavior("WALCL", MockBehavior::Return(daily(days_ago(20), today(), |_| 1.0)))
        .await;
    ctl.set_series_behavior("NEWSERIES", MockBehavior::Return(daily(days_ago(20), today(), |_| 2.0)))
        .await;
    pulse.resolve_series("WALCL", 10).await.unwrap();

    pulse.reload_registry(Registry::new(
        vec![IndicatorEntry::new("fresh", "Fresh", &["NEWSERIES"])],
        [(
            "newseries".to_string(),
            SeriesEntry::new(SourceKind::Fred, Cadence::Daily),
        )],
    ));

    assert_eq!(pulse.registry().indicators.len(), 1);
    let err = pulse.indicator_live("net_liq", 10).await.unwrap_err();
    assert_eq!(err, PulseError::unknown_indicator("net_liq"));
    let fresh = pulse.indicator_live("fresh", 10).await.unwrap();
    assert_eq!(fresh.items.len(), 11);
    assert!(matches!(
        pulse.resolve_series("TGA", 10).await,
        Err(PulseError::UnknownSeries { .. })
    ));
}
