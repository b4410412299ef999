//! Common types used across the application

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Amount nominally invested per asset at baseline
pub const DEFAULT_ALLOCATION: f64 = 100.0;
/// Total amount invested across the portfolio
pub const DEFAULT_INITIAL_INVESTMENT: f64 = 500.0;
pub const DEFAULT_TARGET_MULTIPLIER: f64 = 5.0;
pub const DEFAULT_TRACKING_DAYS: i64 = 180;
/// December 11, 2025 11:37 PM Eastern Time
pub const DEFAULT_TRACKING_START: &str = "2025-12-11T23:37:00-05:00";

pub const DEFAULT_FETCH_INTERVAL_SECS: u64 = 60;
pub const DEFAULT_TICK_INTERVAL_SECS: u64 = 1;

/// 50 retained entries plus the newly appended one
pub const HISTORY_CAPACITY: usize = 51;

/// Key of the persisted first-fetch baseline record
pub const BASELINE_RECORD_KEY: &str = "portfolio-baseline";

pub const FETCH_FAILED_MESSAGE: &str = "Failed to fetch prices";

/// Where baseline prices come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BaselineMode {
    /// Constant map fixed at build/config time
    #[default]
    Fixed,
    /// First successful fetch of the session, persisted locally
    FirstFetch,
}

/// How the tracking window countdown is computed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CountdownMode {
    /// End timestamp minus now, split into d/h/m/s, floored at zero
    #[default]
    Clock,
    /// Whole days only, may go negative after the window lapses
    Days,
}

/// Portfolio constants consumed by the valuation calculator
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSettings {
    pub allocation: f64,
    pub initial_investment: f64,
    pub target_multiplier: f64,
}

impl PortfolioSettings {
    pub fn target_value(&self) -> f64 {
        self.initial_investment * self.target_multiplier
    }
}

impl Default for PortfolioSettings {
    fn default() -> Self {
        Self {
            allocation: DEFAULT_ALLOCATION,
            initial_investment: DEFAULT_INITIAL_INVESTMENT,
            target_multiplier: DEFAULT_TARGET_MULTIPLIER,
        }
    }
}

/// Tracking window settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackingSettings {
    pub start: DateTime<Utc>,
    pub days: i64,
    pub countdown: CountdownMode,
}

impl Default for TrackingSettings {
    fn default() -> Self {
        Self {
            start: default_tracking_start(),
            days: DEFAULT_TRACKING_DAYS,
            countdown: CountdownMode::default(),
        }
    }
}

pub fn default_tracking_start() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(DEFAULT_TRACKING_START)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_default()
}
