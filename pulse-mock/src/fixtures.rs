use async_trait::async_trait;
use chrono::{Datelike, Days, NaiveDate, Weekday};

use pulse_core::{
    AuctionProvider, AuctionRow, FetchRequest, Point, PulseError, SeriesProvider, SourceConnector,
    SourceKind,
};

/// Connector serving deterministic synthetic data for every upstream kind.
///
/// Values depend only on the series id and the date, so repeated fetches agree.
/// The series id `FAIL` always fails, which is handy for exercising partial
/// failure paths.
pub struct FixtureConnector;

impl Default for FixtureConnector {
    fn default() -> Self {
        Self::new()
    }
}

/// Extra history generated before the cutoff so coverage checks pass.
const LEAD_DAYS: u64 = 14;

impl FixtureConnector {
    /// Stable connector name.
    pub const NAME: &'static str = "pulse-fixtures";

    /// Create the connector.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn seed(series_id: &str) -> f64 {
        let sum: u32 = series_id.bytes().map(u32::from).sum();
        f64::from(sum % 97) + 1.0
    }

    fn business_days(from: NaiveDate, to: NaiveDate) -> impl Iterator<Item = NaiveDate> {
        from.iter_days()
            .take_while(move |d| *d <= to)
            .filter(|d| !matches!(d.weekday(), Weekday::Sat | Weekday::Sun))
    }

    fn value_at(series_id: &str, date: NaiveDate) -> f64 {
        let seed = Self::seed(series_id);
        let t = f64::from(date.num_days_from_ce() % 365);
        seed * 100.0 + seed * (t / 9.0).sin() + (t / 3.0).cos()
    }

    fn start(req: &FetchRequest) -> NaiveDate {
        let cutoff = req.cutoff();
        cutoff.checked_sub_days(Days::new(LEAD_DAYS)).unwrap_or(cutoff)
    }
}

#[async_trait]
impl SeriesProvider for FixtureConnector {
    async fn observations(&self, req: &FetchRequest) -> Result<Vec<Point>, PulseError> {
        if req.series_id == "FAIL" {
            return Err(PulseError::upstream(Self::NAME, "forced failure: observations"));
        }
        let weekly = matches!(req.kind, SourceKind::Fred) && req.series_id.starts_with("WALCL");
        let points = Self::business_days(Self::start(req), req.today)
            .filter(|d| !weekly || d.weekday() == Weekday::Wed)
            .map(|d| Point::new(d, Self::value_at(&req.series_id, d) * req.raw_scale))
            .collect();
        Ok(points)
    }
}

#[async_trait]
impl AuctionProvider for FixtureConnector {
    async fn auctions(&self, since: NaiveDate) -> Result<Vec<AuctionRow>, PulseError> {
        let today = chrono::Utc::now().date_naive();
        let rows = Self::business_days(since, today)
            .filter(|d| matches!(d.weekday(), Weekday::Mon | Weekday::Wed))
            .flat_map(|d| {
                let issue = d.checked_add_days(Days::new(2));
                let bill = AuctionRow {
                    auction_date: Some(d),
                    issue_date: issue,
                    security_type: "Bill".into(),
                    security_term: "13-Week".into(),
                    offering_amount: Some(70_000_000_000.0 + f64::from(d.day()) * 1e9),
                    accepted_amount: None,
                    is_bill: true,
                    is_coupon: false,
                };
                let note = AuctionRow {
                    auction_date: Some(d),
                    issue_date: issue,
                    security_type: "Note".into(),
                    security_term: "2-Year".into(),
                    offering_amount: Some(60_000_000_000.0),
                    accepted_amount: None,
                    is_bill: false,
                    is_coupon: true,
                };
                [bill, note]
            })
            .collect();
        Ok(rows)
    }
}

impl SourceConnector for FixtureConnector {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn serves(&self, kind: SourceKind) -> bool {
        !kind.is_derived()
    }

    fn as_series_provider(&self) -> Option<&dyn SeriesProvider> {
        Some(self as &dyn SeriesProvider)
    }

    fn as_auction_provider(&self) -> Option<&dyn AuctionProvider> {
        Some(self as &dyn AuctionProvider)
    }
}
