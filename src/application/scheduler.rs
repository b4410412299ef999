//! Refresh scheduler - drives the fetch cycle and the countdown clock

use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinSet;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use super::dashboard::{DashboardSink, RenderReason};
use super::tracker::PortfolioTracker;
use crate::shared::errors::AppError;

/// Periodic fetch + render loop
pub struct RefreshScheduler {
    tracker: PortfolioTracker,
    sink: Arc<dyn DashboardSink>,
    fetch_interval: Duration,
    tick_interval: Duration,
}

impl RefreshScheduler {
    pub fn new(
        tracker: PortfolioTracker,
        sink: Arc<dyn DashboardSink>,
        fetch_interval: Duration,
        tick_interval: Duration,
    ) -> Self {
        Self {
            tracker,
            sink,
            fetch_interval,
            tick_interval,
        }
    }

    /// Fetch immediately, then every `fetch_interval`, until `shutdown`
    /// flips to true or its sender is dropped.
    ///
    /// Fetches run as independent tasks and may overlap.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) -> Result<(), AppError> {
        info!(
            "🚀 Tracking {} assets, fetching every {}s",
            self.tracker.assets().len(),
            self.fetch_interval.as_secs()
        );

        let mut fetch_timer = interval(self.fetch_interval);
        fetch_timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut clock_timer = interval(self.tick_interval);
        clock_timer.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let mut in_flight: JoinSet<()> = JoinSet::new();

        loop {
            tokio::select! {
                _ = fetch_timer.tick() => {
                    let tracker = self.tracker.clone();
                    let sink = Arc::clone(&self.sink);
                    in_flight.spawn(async move {
                        refresh_and_render(&tracker, sink.as_ref()).await;
                    });
                }
                _ = clock_timer.tick() => {
                    let view = self.tracker.view(Utc::now()).await;
                    if !view.loading {
                        self.sink.render(&view, RenderReason::Tick).await;
                    }
                }
                Some(joined) = in_flight.join_next(), if !in_flight.is_empty() => {
                    if let Err(e) = joined {
                        error!("❌ Refresh task failed: {}", e);
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        info!("🛑 Stopping scheduler ({} fetches in flight)", in_flight.len());
        self.tracker.shutdown().await;
        in_flight.abort_all();
        while in_flight.join_next().await.is_some() {}

        Ok(())
    }

    /// Single fetch and render, for one-shot runs
    pub async fn run_once(&self) -> Result<(), AppError> {
        let result = self.tracker.refresh().await;
        let view = self.tracker.view(Utc::now()).await;
        self.sink.render(&view, RenderReason::Refresh).await;
        result
    }
}

async fn refresh_and_render(tracker: &PortfolioTracker, sink: &dyn DashboardSink) {
    match tracker.refresh().await {
        Err(AppError::ShutDown) => {
            debug!("Dropping refresh completed after shutdown");
            return;
        }
        Err(e) => warn!("⚠️ Refresh failed, keeping last known prices: {}", e),
        Ok(()) => {}
    }

    if tracker.is_closed().await {
        return;
    }
    let view = tracker.view(Utc::now()).await;
    sink.render(&view, RenderReason::Refresh).await;
}
