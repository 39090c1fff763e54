use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::Mutex;

use pulse_core::{
    AuctionProvider, AuctionRow, FetchRequest, Point, PulseError, SeriesProvider, SourceConnector,
    SourceKind,
};

/// Instruction for how a call should behave.
#[derive(Clone)]
pub enum MockBehavior<T> {
    /// Return the provided value immediately.
    Return(T),
    /// Return the provided value after a delay.
    Delay(Duration, T),
    /// Fail immediately with the provided error.
    Fail(PulseError),
    /// Hang indefinitely (simulate a stalled upstream).
    Hang,
}

#[derive(Default)]
struct InternalState {
    series_rules: HashMap<String, MockBehavior<Vec<Point>>>,
    // Overrides `series_rules` for requests with `days <= .0`.
    window_rules: HashMap<String, (u32, MockBehavior<Vec<Point>>)>,
    auction_rule: Option<MockBehavior<Vec<AuctionRow>>>,
    requests: Vec<FetchRequest>,
    auction_requests: Vec<NaiveDate>,
}

async fn play<T>(behavior: Option<MockBehavior<T>>, what: &str) -> Result<T, PulseError> {
    match behavior {
        Some(MockBehavior::Return(v)) => Ok(v),
        Some(MockBehavior::Delay(d, v)) => {
            tokio::time::sleep(d).await;
            Ok(v)
        }
        Some(MockBehavior::Fail(e)) => Err(e),
        Some(MockBehavior::Hang) => {
            std::future::pending::<()>().await;
            unreachable!()
        }
        None => Err(PulseError::upstream("mock", format!("no behavior scripted for {what}"))),
    }
}

/// Controller handle used by tests to drive the dynamic mock from the outside.
pub struct DynamicMockController {
    state: Arc<Mutex<InternalState>>,
}

impl DynamicMockController {
    /// Set the behavior for observation fetches of `series_id` (case-insensitive).
    pub async fn set_series_behavior(&self, series_id: &str, behavior: MockBehavior<Vec<Point>>) {
        let mut guard = self.state.lock().await;
        guard
            .series_rules
            .insert(series_id.to_ascii_uppercase(), behavior);
    }

    /// Set the behavior for fetches of `series_id` whose lookback is at most
    /// `max_days`. Wider requests fall back to [`Self::set_series_behavior`].
    pub async fn set_window_behavior(
        &self,
        series_id: &str,
        max_days: u32,
        behavior: MockBehavior<Vec<Point>>,
    ) {
        let mut guard = self.state.lock().await;
        guard
            .window_rules
            .insert(series_id.to_ascii_uppercase(), (max_days, behavior));
    }

    /// Set the behavior for auction row fetches.
    pub async fn set_auction_behavior(&self, behavior: MockBehavior<Vec<AuctionRow>>) {
        self.state.lock().await.auction_rule = Some(behavior);
    }

    /// Number of observation fetches issued for `series_id`.
    pub async fn calls(&self, series_id: &str) -> usize {
        let id = series_id.to_ascii_uppercase();
        let guard = self.state.lock().await;
        guard.requests.iter().filter(|r| r.series_id == id).count()
    }

    /// Copy of every observation request received, in arrival order.
    pub async fn requests(&self) -> Vec<FetchRequest> {
        self.state.lock().await.requests.clone()
    }

    /// `since` dates of every auction fetch received.
    pub async fn auction_requests(&self) -> Vec<NaiveDate> {
        self.state.lock().await.auction_requests.clone()
    }
}

/// A connector that defers all behavior to an external controller.
pub struct DynamicMockConnector {
    name: &'static str,
    kinds: Vec<SourceKind>,
    state: Arc<Mutex<InternalState>>,
}

impl DynamicMockConnector {
    /// Create a connector serving `kinds`, and its controller.
    #[must_use]
    pub fn new_with_controller(
        name: &'static str,
        kinds: &[SourceKind],
    ) -> (Arc<dyn SourceConnector>, DynamicMockController) {
        let state = Arc::new(Mutex::new(InternalState::default()));
        let controller = DynamicMockController {
            state: Arc::clone(&state),
        };
        let me = Arc::new(Self {
            name,
            kinds: kinds.to_vec(),
            state,
        });
        (me as Arc<dyn SourceConnector>, controller)
    }
}

impl SourceConnector for DynamicMockConnector {
    fn name(&self) -> &'static str {
        self.name
    }

    fn serves(&self, kind: SourceKind) -> bool {
        self.kinds.contains(&kind)
    }

    fn as_series_provider(&self) -> Option<&dyn SeriesProvider> {
        Some(self as &dyn SeriesProvider)
    }

    fn as_auction_provider(&self) -> Option<&dyn AuctionProvider> {
        Some(self as &dyn AuctionProvider)
    }
}

#[async_trait]
impl SeriesProvider for DynamicMockConnector {
    async fn observations(&self, req: &FetchRequest) -> Result<Vec<Point>, PulseError> {
        // Snapshot the behavior without holding the lock across await points
        let behavior = {
            let mut guard = self.state.lock().await;
            guard.requests.push(req.clone());
            match guard.window_rules.get(&req.series_id) {
                Some((max_days, b)) if req.days <= *max_days => Some(b.clone()),
                _ => guard.series_rules.get(&req.series_id).cloned(),
            }
        };
        let points = play(behavior, &req.series_id).await?;
        Ok(points
            .into_iter()
            .map(|p| Point::new(p.date, p.value * req.raw_scale))
            .collect())
    }
}

#[async_trait]
impl AuctionProvider for DynamicMockConnector {
    async fn auctions(&self, since: NaiveDate) -> Result<Vec<AuctionRow>, PulseError> {
        let behavior = {
            let mut guard = self.state.lock().await;
            guard.auction_requests.push(since);
            guard.auction_rule.clone()
        };
        play(behavior, "auctions").await
    }
}
