//! Portfolio tracker - owns the application state and applies fetch results

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

use crate::domain::history::HistoryBuffer;
use crate::domain::portfolio::{Asset, BaselinePrices, BaselineRecord, ValuationCalculator};
use crate::domain::price::{PriceFeed, PriceQuote, PriceSnapshot};
use crate::domain::tracking::TrackingWindow;
use crate::infrastructure::storage::BaselineStore;
use crate::shared::config::Config;
use crate::shared::errors::{AppError, FetchError};
use crate::shared::types::{
    BaselineMode, PortfolioSettings, TrackingSettings, FETCH_FAILED_MESSAGE,
};

use super::dashboard::DashboardView;
use std::collections::HashMap;

/// Fetch counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchStats {
    pub successful: u64,
    pub failed: u64,
}

/// Everything the dashboard is computed from
#[derive(Debug, Clone, PartialEq)]
pub struct TrackerState {
    pub snapshot: PriceSnapshot,
    pub baseline: BaselinePrices,
    pub baseline_captured: bool,
    pub session_start: DateTime<Utc>,
    pub history: HistoryBuffer,
    pub error: Option<String>,
    pub loading: bool,
    pub last_update: Option<DateTime<Utc>>,
    pub stats: FetchStats,
    closed: bool,
}

impl TrackerState {
    /// State with a baseline known up front
    pub fn with_baseline(baseline: BaselinePrices, session_start: DateTime<Utc>) -> Self {
        Self {
            snapshot: PriceSnapshot::default(),
            baseline,
            baseline_captured: true,
            session_start,
            history: HistoryBuffer::new(),
            error: None,
            loading: true,
            last_update: None,
            stats: FetchStats::default(),
            closed: false,
        }
    }

    /// State waiting for the first fetch to become the baseline
    pub fn awaiting_baseline(session_start: DateTime<Utc>) -> Self {
        Self {
            baseline_captured: false,
            ..Self::with_baseline(BaselinePrices::default(), session_start)
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn close(&mut self) {
        self.closed = true;
    }

    /// Replace the snapshot, append to history and capture the baseline if
    /// none exists yet. Returns the record to persist on capture.
    pub fn apply_success(
        &mut self,
        quotes: HashMap<String, PriceQuote>,
        fetched_at: DateTime<Utc>,
        assets: &[Asset],
    ) -> Result<Option<BaselineRecord>, AppError> {
        if self.closed {
            return Err(AppError::ShutDown);
        }

        self.snapshot = PriceSnapshot::new(quotes, fetched_at);
        self.history.record(fetched_at, assets, &self.snapshot);
        self.last_update = Some(fetched_at);
        self.loading = false;
        self.error = None;
        self.stats.successful += 1;

        if self.baseline_captured || self.snapshot.is_empty() {
            return Ok(None);
        }

        self.baseline = BaselinePrices::from_snapshot(&self.snapshot);
        self.baseline_captured = true;
        Ok(Some(BaselineRecord::new(self.session_start, self.baseline.clone())))
    }

    /// Flag the failure; prices, baseline and history stay as they were
    pub fn apply_failure(&mut self) -> Result<(), AppError> {
        if self.closed {
            return Err(AppError::ShutDown);
        }

        self.error = Some(FETCH_FAILED_MESSAGE.to_string());
        self.loading = false;
        self.stats.failed += 1;
        Ok(())
    }
}

/// Portfolio valuation engine: fetcher, calculator and history behind one
/// shared state. Cheap to clone; clones share the same state.
#[derive(Clone)]
pub struct PortfolioTracker {
    assets: Arc<Vec<Asset>>,
    price_feed: Arc<dyn PriceFeed>,
    baseline_store: Option<BaselineStore>,
    baseline_mode: BaselineMode,
    calculator: ValuationCalculator,
    tracking: TrackingSettings,
    state: Arc<RwLock<TrackerState>>,
}

impl PortfolioTracker {
    /// Tracker measured against a fixed baseline
    pub fn with_fixed_baseline(
        assets: Vec<Asset>,
        price_feed: Arc<dyn PriceFeed>,
        baseline: BaselinePrices,
        portfolio: PortfolioSettings,
        tracking: TrackingSettings,
    ) -> Self {
        let state = TrackerState::with_baseline(baseline, tracking.start);
        Self::from_parts(assets, price_feed, None, BaselineMode::Fixed, portfolio, tracking, state)
    }

    /// Tracker whose baseline is the first successful fetch. A record found
    /// in the store is reused along with its session start.
    pub fn with_first_fetch_baseline(
        assets: Vec<Asset>,
        price_feed: Arc<dyn PriceFeed>,
        baseline_store: Option<BaselineStore>,
        portfolio: PortfolioSettings,
        tracking: TrackingSettings,
        now: DateTime<Utc>,
    ) -> Self {
        let stored = baseline_store
            .as_ref()
            .and_then(|store| match store.load_or_ignore() {
                Ok(record) => record,
                Err(e) => {
                    warn!("⚠️ Could not read stored baseline: {}", e);
                    None
                }
            });

        let state = match stored {
            Some(record) => {
                info!(
                    "📂 Reusing baseline of session started {} ({} assets)",
                    record.session_start.to_rfc3339(),
                    record.prices.len()
                );
                TrackerState::with_baseline(record.prices, record.session_start)
            }
            None => {
                info!("🆕 No stored baseline, the first successful fetch will be used");
                TrackerState::awaiting_baseline(now)
            }
        };

        Self::from_parts(
            assets,
            price_feed,
            baseline_store,
            BaselineMode::FirstFetch,
            portfolio,
            tracking,
            state,
        )
    }

    pub fn from_config(
        config: &Config,
        price_feed: Arc<dyn PriceFeed>,
        baseline_store: Option<BaselineStore>,
    ) -> Self {
        match config.baseline.mode {
            BaselineMode::Fixed => Self::with_fixed_baseline(
                config.assets.clone(),
                price_feed,
                config.fixed_baseline(),
                config.portfolio_settings(),
                config.tracking_settings(),
            ),
            BaselineMode::FirstFetch => Self::with_first_fetch_baseline(
                config.assets.clone(),
                price_feed,
                baseline_store,
                config.portfolio_settings(),
                config.tracking_settings(),
                Utc::now(),
            ),
        }
    }

    fn from_parts(
        assets: Vec<Asset>,
        price_feed: Arc<dyn PriceFeed>,
        baseline_store: Option<BaselineStore>,
        baseline_mode: BaselineMode,
        portfolio: PortfolioSettings,
        tracking: TrackingSettings,
        state: TrackerState,
    ) -> Self {
        Self {
            assets: Arc::new(assets),
            price_feed,
            baseline_store,
            baseline_mode,
            calculator: ValuationCalculator::new(portfolio),
            tracking,
            state: Arc::new(RwLock::new(state)),
        }
    }

    pub fn assets(&self) -> &[Asset] {
        &self.assets
    }

    pub fn baseline_mode(&self) -> BaselineMode {
        self.baseline_mode
    }

    /// Fetch once and apply the outcome.
    ///
    /// Not serialized against other refreshes: whichever response completes
    /// last overwrites the snapshot.
    pub async fn refresh(&self) -> Result<(), AppError> {
        if self.is_closed().await {
            return Err(AppError::ShutDown);
        }

        debug!("Refreshing prices from {}", self.price_feed.source());
        let result = self.price_feed.fetch_quotes(&self.assets).await;
        let fetched_at = Utc::now();

        match result {
            Ok(quotes) => {
                let received = quotes.len();
                let captured = {
                    let mut state = self.state.write().await;
                    state.apply_success(quotes, fetched_at, &self.assets)?
                };
                info!("📈 Prices updated ({}/{} assets)", received, self.assets.len());

                if let Some(record) = captured {
                    self.persist_baseline(record).await;
                }
                Ok(())
            }
            Err(e) => {
                self.record_failure(&e).await?;
                Err(e.into())
            }
        }
    }

    async fn record_failure(&self, err: &FetchError) -> Result<(), AppError> {
        error!("❌ {}: {}", FETCH_FAILED_MESSAGE, err);
        self.state.write().await.apply_failure()
    }

    async fn persist_baseline(&self, record: BaselineRecord) {
        info!("📌 Baseline captured from first successful fetch");
        let Some(store) = self.baseline_store.clone() else {
            return;
        };
        // File stores do blocking I/O
        match tokio::task::spawn_blocking(move || store.save_if_absent(&record)).await {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => warn!("⚠️ Failed to persist baseline: {}", e),
            Err(e) => warn!("⚠️ Baseline persistence task failed: {}", e),
        }
    }

    /// Tracking window, anchored on the session start in first-fetch mode
    pub async fn tracking_window(&self) -> TrackingWindow {
        match self.baseline_mode {
            BaselineMode::Fixed => TrackingWindow::from_settings(&self.tracking),
            BaselineMode::FirstFetch => {
                let start = self.state.read().await.session_start;
                TrackingWindow::new(start, self.tracking.days)
            }
        }
    }

    /// Compute every figure the presentation layer consumes
    pub async fn view(&self, now: DateTime<Utc>) -> DashboardView {
        let window = self.tracking_window().await;
        let state = self.state.read().await;
        DashboardView::build(
            &state,
            &self.calculator,
            &self.assets,
            &window,
            self.tracking.countdown,
            self.baseline_mode,
            now,
        )
    }

    /// Copy of the current state
    pub async fn state(&self) -> TrackerState {
        self.state.read().await.clone()
    }

    pub async fn is_closed(&self) -> bool {
        self.state.read().await.is_closed()
    }

    /// Stop accepting updates; late completions are dropped
    pub async fn shutdown(&self) {
        self.state.write().await.close();
        info!("🛑 Tracker stopped");
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::domain::portfolio::default_assets;
    use crate::infrastructure::storage::{JsonFileStore, KeyValueStore, MemoryStore};
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use tokio::sync::oneshot;

    type FetchResult = Result<HashMap<String, PriceQuote>, FetchError>;

    pub(crate) fn quotes(prices: &[(&str, f64)]) -> HashMap<String, PriceQuote> {
        prices
            .iter()
            .map(|(id, p)| (id.to_string(), PriceQuote::new(*p, 1.0)))
            .collect()
    }

    /// Replays scripted results, then repeats the last one
    pub(crate) struct ScriptedFeed {
        results: Mutex<VecDeque<FetchResult>>,
        pub(crate) calls: AtomicUsize,
    }

    impl ScriptedFeed {
        pub(crate) fn new(results: Vec<FetchResult>) -> Self {
            Self {
                results: Mutex::new(results.into()),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl PriceFeed for ScriptedFeed {
        async fn fetch_quotes(&self, _assets: &[Asset]) -> FetchResult {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut results = self.results.lock().unwrap();
            if results.len() > 1 {
                results.pop_front().unwrap()
            } else {
                results.front().cloned().unwrap_or_else(|| Ok(HashMap::new()))
            }
        }

        fn source(&self) -> &str {
            "scripted"
        }
    }

    /// Each call waits until the test releases it
    struct GatedFeed {
        gates: Mutex<VecDeque<oneshot::Receiver<FetchResult>>>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl PriceFeed for GatedFeed {
        async fn fetch_quotes(&self, _assets: &[Asset]) -> FetchResult {
            let gate = self.gates.lock().unwrap().pop_front().unwrap();
            self.calls.fetch_add(1, Ordering::SeqCst);
            gate.await.unwrap_or_else(|_| Err(FetchError::Transport("gate dropped".to_string())))
        }

        fn source(&self) -> &str {
            "gated"
        }
    }

    fn fixed_tracker(feed: Arc<dyn PriceFeed>) -> PortfolioTracker {
        PortfolioTracker::with_fixed_baseline(
            default_assets(),
            feed,
            BaselinePrices::default_fixed(),
            PortfolioSettings::default(),
            TrackingSettings::default(),
        )
    }

    fn first_fetch_tracker(feed: Arc<dyn PriceFeed>, store: Option<BaselineStore>) -> PortfolioTracker {
        PortfolioTracker::with_first_fetch_baseline(
            default_assets(),
            feed,
            store,
            PortfolioSettings::default(),
            TrackingSettings::default(),
            Utc::now(),
        )
    }

    #[tokio::test]
    async fn test_successful_refresh_updates_state() {
        let feed = Arc::new(ScriptedFeed::new(vec![Ok(quotes(&[("arbitrum", 0.4226), ("optimism", 0.3111)]))]));
        let tracker = fixed_tracker(feed);

        assert!(tracker.state().await.loading);
        tracker.refresh().await.unwrap();

        let state = tracker.state().await;
        assert!(!state.loading);
        assert!(state.error.is_none());
        assert!(state.last_update.is_some());
        assert_eq!(state.snapshot.len(), 2);
        assert_eq!(state.history.len(), 1);
        assert_eq!(state.stats.successful, 1);

        let view = tracker.view(Utc::now()).await;
        let arb = view.coins.iter().find(|c| c.symbol == "ARB").unwrap();
        assert!((arb.coin_value - 200.0).abs() < 1e-6);
        assert!((view.portfolio_value - 300.0).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_failure_preserves_state() {
        let feed = Arc::new(ScriptedFeed::new(vec![
            Ok(quotes(&[("arbitrum", 0.3)])),
            Err(FetchError::Status(429)),
        ]));
        let tracker = fixed_tracker(feed);

        tracker.refresh().await.unwrap();
        let before = tracker.state().await;

        let err = tracker.refresh().await.unwrap_err();
        assert!(matches!(err, AppError::FetchError(_)));

        let after = tracker.state().await;
        assert_eq!(after.snapshot, before.snapshot);
        assert_eq!(after.baseline, before.baseline);
        assert_eq!(after.history, before.history);
        assert_eq!(after.last_update, before.last_update);
        assert_eq!(after.error.as_deref(), Some(FETCH_FAILED_MESSAGE));
        assert_eq!(after.stats.failed, 1);
    }

    #[tokio::test]
    async fn test_next_success_clears_error() {
        let feed = Arc::new(ScriptedFeed::new(vec![
            Err(FetchError::Transport("offline".to_string())),
            Ok(quotes(&[("celestia", 0.6)])),
        ]));
        let tracker = fixed_tracker(feed);

        assert!(tracker.refresh().await.is_err());
        let state = tracker.state().await;
        assert!(!state.loading);
        assert!(state.error.is_some());
        assert!(state.history.is_empty());

        tracker.refresh().await.unwrap();
        assert!(tracker.state().await.error.is_none());
    }

    #[tokio::test]
    async fn test_history_capped_after_many_fetches() {
        let feed = Arc::new(ScriptedFeed::new(vec![Ok(quotes(&[("arbitrum", 0.3)]))]));
        let tracker = fixed_tracker(feed.clone());

        for _ in 0..52 {
            tracker.refresh().await.unwrap();
        }
        assert_eq!(feed.calls.load(Ordering::SeqCst), 52);
        assert_eq!(tracker.state().await.history.len(), 51);
    }

    #[tokio::test]
    async fn test_first_fetch_baseline_captured_once() {
        let kv: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let store = BaselineStore::new(kv.clone());
        let feed = Arc::new(ScriptedFeed::new(vec![
            Ok(quotes(&[("arbitrum", 0.25), ("optimism", 0.30)])),
            Ok(quotes(&[("arbitrum", 0.50), ("optimism", 0.60)])),
        ]));
        let tracker = first_fetch_tracker(feed, Some(store.clone()));

        let state = tracker.state().await;
        assert!(!state.baseline_captured);
        assert!(state.baseline.is_empty());

        tracker.refresh().await.unwrap();
        let first = tracker.state().await.baseline;
        assert_eq!(first.price("arbitrum"), Some(0.25));

        tracker.refresh().await.unwrap();
        let state = tracker.state().await;
        assert_eq!(state.baseline, first);
        assert_eq!(state.snapshot.price("arbitrum"), Some(0.50));

        // Doubled prices read as +100% against the captured baseline
        let view = tracker.view(Utc::now()).await;
        let arb = view.coins.iter().find(|c| c.symbol == "ARB").unwrap();
        assert!((arb.performance_pct - 100.0).abs() < 1e-9);

        let persisted = store.load().unwrap().unwrap();
        assert_eq!(persisted.prices, first);
        assert_eq!(persisted.session_start, state.session_start);
    }

    #[tokio::test]
    async fn test_first_fetch_baseline_written_to_file_store() {
        let dir = std::env::temp_dir().join(format!("fivex-tracker-{}", uuid::Uuid::new_v4()));
        let store = BaselineStore::new(Arc::new(JsonFileStore::new(&dir)));
        let feed = Arc::new(ScriptedFeed::new(vec![Ok(quotes(&[("injective-protocol", 5.56)]))]));
        let tracker = first_fetch_tracker(feed, Some(store));

        tracker.refresh().await.unwrap();

        // A fresh store over the same directory sees the record
        let reopened = BaselineStore::new(Arc::new(JsonFileStore::new(&dir)));
        let record = reopened.load().unwrap().unwrap();
        assert_eq!(record.prices.price("injective-protocol"), Some(5.56));
        assert_eq!(record.session_start, tracker.state().await.session_start);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn test_stored_baseline_is_reused() {
        let kv: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let store = BaselineStore::new(kv);
        let session_start = DateTime::parse_from_rfc3339("2026-03-01T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let record = BaselineRecord::new(session_start, BaselinePrices::from_prices([("arbitrum", 0.1)]));
        store.save_if_absent(&record).unwrap();

        let feed = Arc::new(ScriptedFeed::new(vec![Ok(quotes(&[("arbitrum", 0.2)]))]));
        let tracker = first_fetch_tracker(feed, Some(store.clone()));

        let state = tracker.state().await;
        assert!(state.baseline_captured);
        assert_eq!(state.session_start, session_start);
        assert_eq!(tracker.tracking_window().await.start(), session_start);

        tracker.refresh().await.unwrap();
        assert_eq!(tracker.state().await.baseline.price("arbitrum"), Some(0.1));
        assert_eq!(store.load().unwrap().unwrap(), record);
    }

    #[tokio::test]
    async fn test_empty_first_fetch_does_not_capture() {
        let feed = Arc::new(ScriptedFeed::new(vec![
            Ok(HashMap::new()),
            Ok(quotes(&[("optimism", 0.31)])),
        ]));
        let tracker = first_fetch_tracker(feed, None);

        tracker.refresh().await.unwrap();
        assert!(!tracker.state().await.baseline_captured);

        tracker.refresh().await.unwrap();
        let state = tracker.state().await;
        assert!(state.baseline_captured);
        assert_eq!(state.baseline.price("optimism"), Some(0.31));
    }

    #[tokio::test]
    async fn test_late_response_overwrites_newer() {
        let (tx_a, rx_a) = oneshot::channel();
        let (tx_b, rx_b) = oneshot::channel();
        let feed = Arc::new(GatedFeed {
            gates: Mutex::new(VecDeque::from(vec![rx_a, rx_b])),
            calls: AtomicUsize::new(0),
        });
        let tracker = fixed_tracker(feed.clone());

        let slow = tokio::spawn({
            let tracker = tracker.clone();
            async move { tracker.refresh().await }
        });
        while feed.calls.load(Ordering::SeqCst) < 1 {
            tokio::task::yield_now().await;
        }
        let fast = tokio::spawn({
            let tracker = tracker.clone();
            async move { tracker.refresh().await }
        });
        while feed.calls.load(Ordering::SeqCst) < 2 {
            tokio::task::yield_now().await;
        }

        tx_b.send(Ok(quotes(&[("arbitrum", 0.9)]))).unwrap();
        fast.await.unwrap().unwrap();
        tx_a.send(Ok(quotes(&[("arbitrum", 0.1)]))).unwrap();
        slow.await.unwrap().unwrap();

        let state = tracker.state().await;
        assert_eq!(state.snapshot.price("arbitrum"), Some(0.1));
        assert_eq!(state.history.len(), 2);
        assert_eq!(state.history.last().unwrap().price("ARB"), Some(0.1));
    }

    #[tokio::test]
    async fn test_no_mutation_after_shutdown() {
        let (tx, rx) = oneshot::channel();
        let feed = Arc::new(GatedFeed {
            gates: Mutex::new(VecDeque::from(vec![rx])),
            calls: AtomicUsize::new(0),
        });
        let tracker = fixed_tracker(feed.clone());

        let pending = tokio::spawn({
            let tracker = tracker.clone();
            async move { tracker.refresh().await }
        });
        while feed.calls.load(Ordering::SeqCst) < 1 {
            tokio::task::yield_now().await;
        }

        tracker.shutdown().await;
        let before = tracker.state().await;

        tx.send(Ok(quotes(&[("arbitrum", 0.5)]))).unwrap();
        let result = pending.await.unwrap();
        assert!(matches!(result, Err(AppError::ShutDown)));
        assert_eq!(tracker.state().await, before);

        assert!(matches!(tracker.refresh().await, Err(AppError::ShutDown)));
    }
}
