// Shared fixtures so tests can `use crate::helpers::*;`
#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use chrono::{Days, NaiveDate};
use pulse::{
    Aggregation, CacheConfig, Cadence, IndicatorEntry, Point, Pulse, PulseBuilder, Registry,
    SeriesEntry, SourceKind,
};
use pulse_mock::{DynamicMockConnector, DynamicMockController};

/// Reference date pinned on every engine built here (a Friday).
pub const TODAY: (i32, u32, u32) = (2024, 3, 15);

pub const FETCHED_KINDS: &[SourceKind] = &[
    SourceKind::Fred,
    SourceKind::TreasuryTga,
    SourceKind::TreasuryRedemptions,
    SourceKind::TreasuryInterest,
    SourceKind::TreasuryAuctions,
    SourceKind::Ofr,
];

pub fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

pub fn today() -> NaiveDate {
    d(TODAY.0, TODAY.1, TODAY.2)
}

/// `today - days`.
pub fn days_ago(days: u64) -> NaiveDate {
    today().checked_sub_days(Days::new(days)).unwrap()
}

/// One point per calendar day from `from` to `to` inclusive, valued by `f(i)`.
pub fn daily(from: NaiveDate, to: NaiveDate, f: impl Fn(usize) -> f64) -> Vec<Point> {
    from.iter_days()
        .take_while(|day| *day <= to)
        .enumerate()
        .map(|(i, day)| Point::new(day, f(i)))
        .collect()
}

/// Fresh, empty cache root unique to this test process and call.
pub fn scratch_dir(tag: &str) -> PathBuf {
    static COUNTER: AtomicUsize = AtomicUsize::new(0);
    let n = COUNTER.fetch_add(1, Ordering::Relaxed);
    let dir = std::env::temp_dir().join(format!("pulse-engine-{tag}-{}-{n}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    dir
}

fn fetched(source: SourceKind, cadence: Cadence) -> SeriesEntry {
    SeriesEntry::new(source, cadence)
}

/// Registry covering every built-in indicator formula.
pub fn registry() -> Registry {
    let mut tga = fetched(SourceKind::TreasuryTga, Cadence::Daily);
    tga.notes = Some("Treasury General Account".into());
    tga.impact = Some("Rising balance drains reserves".into());
    tga.interpretation = Some("Treasury cash at the Fed".into());
    let series = vec![
        ("WALCL", fetched(SourceKind::Fred, Cadence::Weekly)),
        ("RRPONTSYD", fetched(SourceKind::Fred, Cadence::Daily)),
        ("WRESBAL", fetched(SourceKind::Fred, Cadence::Weekly)),
        ("SOFR", fetched(SourceKind::Fred, Cadence::Daily)),
        ("IORB", fetched(SourceKind::Fred, Cadence::Daily)),
        ("DTB4WK", fetched(SourceKind::Fred, Cadence::Daily)),
        ("DTB3", fetched(SourceKind::Fred, Cadence::Daily)),
        ("TGA", tga),
        ("UST_REDEMPTIONS", fetched(SourceKind::TreasuryRedemptions, Cadence::Daily)),
        ("UST_INTEREST", fetched(SourceKind::TreasuryInterest, Cadence::Daily)),
        ("UST_AUCTION_ISSUES", fetched(SourceKind::TreasuryAuctions, Cadence::Daily)),
        ("OFR_LIQ_IDX", fetched(SourceKind::Ofr, Cadence::Daily)),
        (
            "UST_REDEMPTIONS_W",
            SeriesEntry::derived("UST_REDEMPTIONS", Aggregation::WeeklySum),
        ),
        (
            "UST_INTEREST_W",
            SeriesEntry::derived("UST_INTEREST", Aggregation::WeeklySum),
        ),
        (
            "UST_BILL_SHARE",
            SeriesEntry::derived("UST_AUCTION_ISSUES", Aggregation::WeeklyBillPct),
        ),
    ];
    let indicators = vec![
        IndicatorEntry::new("net_liq", "Net liquidity", &["WALCL", "TGA", "RRPONTSYD"]),
        IndicatorEntry::new("rrp_delta", "RRP 5d change", &["RRPONTSYD"]),
        IndicatorEntry::new("tga_delta", "TGA 5d change", &["TGA"]),
        IndicatorEntry::new("reserves_w", "Reserves weekly change", &["WRESBAL"]),
        IndicatorEntry::new("sofr_iorb", "SOFR - IORB", &["SOFR", "IORB"]),
        IndicatorEntry::new("bill_iorb", "Bill - IORB", &["DTB4WK", "IORB"]),
        IndicatorEntry::new("ofr_liq_idx", "OFR stress", &["OFR_LIQ_IDX"]),
        IndicatorEntry::new("ust_net_w", "Net settlement", &["UST_AUCTION_ISSUES"]),
        IndicatorEntry::new("bill_share_w", "Bill share", &["UST_AUCTION_ISSUES"]),
        IndicatorEntry::new("ust_redemptions_w", "Redemptions", &["UST_REDEMPTIONS"]),
        IndicatorEntry::new("ust_interest_w", "Interest", &["UST_INTEREST"]),
    ];
    Registry::new(
        indicators,
        series.into_iter().map(|(k, v)| (k.to_string(), v)),
    )
}

/// Builder wired to a scripted connector serving every fetched kind, with a
/// pinned date and a fresh cache directory.
pub fn builder(tag: &str) -> (PulseBuilder, DynamicMockController, PathBuf) {
    builder_in(scratch_dir(tag))
}

/// Like [`builder`] but over an existing cache root, e.g. to simulate a restart.
pub fn builder_in(dir: PathBuf) -> (PulseBuilder, DynamicMockController, PathBuf) {
    let (conn, ctl) = DynamicMockConnector::new_with_controller("mock", FETCHED_KINDS);
    let b = Pulse::builder()
        .with_connector(conn)
        .registry(registry())
        .fixed_today(today())
        .cache(CacheConfig {
            disabled: false,
            ttl: Duration::from_secs(3600),
            dir: dir.clone(),
        });
    (b, ctl, dir)
}

pub fn engine(tag: &str) -> (Pulse, DynamicMockController, PathBuf) {
    let (b, ctl, dir) = builder(tag);
    (b.build().unwrap(), ctl, dir)
}
