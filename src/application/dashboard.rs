//! Dashboard view consumed by the presentation layer, and its sinks

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use super::tracker::TrackerState;
use crate::domain::history::HistoryEntry;
use crate::domain::portfolio::{Asset, CoinValuation, ValuationCalculator};
use crate::domain::tracking::{Countdown, TrackingWindow};
use crate::shared::types::{BaselineMode, CountdownMode};
use crate::shared::utils::{direction_arrow, format_price, format_usd};

/// Everything a front-end needs to draw the dashboard
#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub generated_at: DateTime<Utc>,
    pub loading: bool,
    pub error: Option<String>,
    pub last_update: Option<DateTime<Utc>>,

    pub initial_investment: f64,
    pub portfolio_value: f64,
    pub portfolio_performance_pct: f64,
    pub target_value: f64,
    pub target_multiplier: f64,
    pub percent_to_target: f64,

    pub baseline_mode: BaselineMode,
    pub tracking_start: DateTime<Utc>,
    pub tracking_days: i64,
    pub countdown: Countdown,

    pub coins: Vec<CoinValuation>,
    pub chart_ready: bool,
    pub history: Vec<HistoryEntry>,
}

impl DashboardView {
    pub fn build(
        state: &TrackerState,
        calculator: &ValuationCalculator,
        assets: &[Asset],
        window: &TrackingWindow,
        countdown: CountdownMode,
        baseline_mode: BaselineMode,
        now: DateTime<Utc>,
    ) -> Self {
        let valuation = calculator.evaluate(assets, &state.snapshot, &state.baseline);
        let settings = calculator.settings();

        Self {
            generated_at: now,
            loading: state.loading,
            error: state.error.clone(),
            last_update: state.last_update,
            initial_investment: settings.initial_investment,
            portfolio_value: valuation.portfolio_value,
            portfolio_performance_pct: valuation.portfolio_performance_pct,
            target_value: valuation.target_value,
            target_multiplier: settings.target_multiplier,
            percent_to_target: valuation.percent_to_target,
            baseline_mode,
            tracking_start: window.start(),
            tracking_days: window.days(),
            countdown: window.countdown(countdown, now),
            coins: valuation.coins,
            chart_ready: state.history.is_chartable(),
            history: state.history.to_vec(),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// "12d 4h 5m" or "42 days left"
    pub fn countdown_label(&self) -> String {
        match self.countdown {
            Countdown::Clock(r) => format!("{}d {}h {}m {}s", r.days, r.hours, r.minutes, r.seconds),
            Countdown::Days { remaining, .. } => format!("{} days left", remaining),
        }
    }
}

/// Why a view is being rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderReason {
    /// A fetch completed, successfully or not
    Refresh,
    /// Clock tick, only the countdown moved
    Tick,
}

/// Presentation layer
#[async_trait]
pub trait DashboardSink: Send + Sync {
    async fn render(&self, view: &DashboardView, reason: RenderReason);
}

/// Logs the dashboard through tracing
pub struct ConsolePresenter;

impl ConsolePresenter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ConsolePresenter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DashboardSink for ConsolePresenter {
    async fn render(&self, view: &DashboardView, reason: RenderReason) {
        if reason == RenderReason::Tick {
            debug!("⏳ {} of {} days", view.countdown_label(), view.tracking_days);
            return;
        }

        if view.loading {
            info!("⚡ LOADING PORTFOLIO DATA");
            return;
        }

        info!("{}", "=".repeat(80));
        info!("5X OR BUST - HIGH-RISK CRYPTO PORTFOLIO TRACKER");
        info!("{}", "=".repeat(80));

        if let Some(error) = &view.error {
            warn!("⚠️ {} - showing last known prices", error);
        }

        info!(
            "PORTFOLIO VALUE: {} {} {:.2}%",
            format_usd(view.portfolio_value),
            direction_arrow(view.portfolio_performance_pct),
            view.portfolio_performance_pct.abs()
        );
        info!(
            "TARGET ({}X): {} - {:.1}% THERE",
            view.target_multiplier,
            format_usd(view.target_value),
            view.percent_to_target
        );
        info!("TIME REMAINING: {} (of {} days)", view.countdown_label(), view.tracking_days);
        info!("{}", "-".repeat(80));

        for coin in &view.coins {
            let price = coin
                .current_price
                .map(format_price)
                .unwrap_or_else(|| "n/a".to_string());
            info!(
                "{:<7} {:<10} {:>12}  24h {} {:>6.2}%  value {:>10}  perf {:+.2}%",
                coin.symbol,
                coin.name,
                price,
                direction_arrow(coin.change_24h),
                coin.change_24h.abs(),
                format_usd(coin.coin_value),
                coin.performance_pct
            );
        }

        if view.chart_ready {
            info!("{}", "-".repeat(80));
            info!("LIVE PRICE CHART: {} points", view.history.len());
        }

        if let Some(last_update) = view.last_update {
            info!("Last update: {}", last_update.format("%Y-%m-%d %H:%M:%S UTC"));
        }
        info!("{}", "=".repeat(80));
    }
}

/// Prints each refreshed view as pretty JSON on stdout
pub struct JsonPresenter;

#[async_trait]
impl DashboardSink for JsonPresenter {
    async fn render(&self, view: &DashboardView, reason: RenderReason) {
        if reason == RenderReason::Tick {
            return;
        }
        match view.to_json() {
            Ok(json) => println!("{}", json),
            Err(e) => warn!("⚠️ Failed to serialize dashboard: {}", e),
        }
    }
}
