//! Configuration file schema and loader

use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::{fs, time::Duration};

use crate::domain::portfolio::{default_assets, Asset, BaselinePrices};
use crate::domain::tracking::TrackingWindow;
use crate::infrastructure::price_api::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS};
use crate::shared::errors::ConfigError;
use crate::shared::types::{
    default_tracking_start, BaselineMode, CountdownMode, PortfolioSettings, TrackingSettings,
    DEFAULT_ALLOCATION, DEFAULT_FETCH_INTERVAL_SECS, DEFAULT_INITIAL_INVESTMENT,
    DEFAULT_TARGET_MULTIPLIER, DEFAULT_TICK_INTERVAL_SECS, DEFAULT_TRACKING_DAYS,
};

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiCfg {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for ApiCfg {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PortfolioCfg {
    pub initial_investment: f64,
    pub allocation: f64,
    pub target_multiplier: f64,
}

impl Default for PortfolioCfg {
    fn default() -> Self {
        Self {
            initial_investment: DEFAULT_INITIAL_INVESTMENT,
            allocation: DEFAULT_ALLOCATION,
            target_multiplier: DEFAULT_TARGET_MULTIPLIER,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TrackingCfg {
    pub start: DateTime<Utc>,
    pub days: i64,
    pub countdown: CountdownMode,
}

impl Default for TrackingCfg {
    fn default() -> Self {
        Self {
            start: default_tracking_start(),
            days: DEFAULT_TRACKING_DAYS,
            countdown: CountdownMode::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScheduleCfg {
    pub fetch_interval_secs: u64,
    pub tick_interval_secs: u64,
}

impl Default for ScheduleCfg {
    fn default() -> Self {
        Self {
            fetch_interval_secs: DEFAULT_FETCH_INTERVAL_SECS,
            tick_interval_secs: DEFAULT_TICK_INTERVAL_SECS,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BaselineCfg {
    pub mode: BaselineMode,
    pub store_dir: PathBuf,
    /// Only used in `fixed` mode; empty means the built-in prices
    pub prices: HashMap<String, f64>,
}

impl Default for BaselineCfg {
    fn default() -> Self {
        Self {
            mode: BaselineMode::default(),
            store_dir: PathBuf::from(".fivex"),
            prices: HashMap::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiCfg,
    pub portfolio: PortfolioCfg,
    pub tracking: TrackingCfg,
    pub schedule: ScheduleCfg,
    pub baseline: BaselineCfg,
    pub assets: Vec<Asset>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiCfg::default(),
            portfolio: PortfolioCfg::default(),
            tracking: TrackingCfg::default(),
            schedule: ScheduleCfg::default(),
            baseline: BaselineCfg::default(),
            assets: default_assets(),
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let s = fs::read_to_string(path.as_ref())?;
        Self::from_toml(&s)
    }

    pub fn from_toml(s: &str) -> Result<Self, ConfigError> {
        let cfg: Self = toml::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.assets.is_empty() {
            return Err(ConfigError::Invalid("at least one asset is required".to_string()));
        }

        let mut ids = HashSet::new();
        let mut symbols = HashSet::new();
        for asset in &self.assets {
            if asset.id.trim().is_empty() {
                return Err(ConfigError::Invalid("asset id must not be empty".to_string()));
            }
            if !ids.insert(asset.id.as_str()) {
                return Err(ConfigError::Invalid(format!("duplicate asset id: {}", asset.id)));
            }
            // History entries are keyed by symbol
            if !symbols.insert(asset.symbol.as_str()) {
                return Err(ConfigError::Invalid(format!("duplicate asset symbol: {}", asset.symbol)));
            }
        }

        let positive = [
            ("portfolio.initial_investment", self.portfolio.initial_investment),
            ("portfolio.allocation", self.portfolio.allocation),
            ("portfolio.target_multiplier", self.portfolio.target_multiplier),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::Invalid(format!("{} must be positive, got {}", name, value)));
            }
        }

        if self.schedule.fetch_interval_secs == 0 || self.schedule.tick_interval_secs == 0 {
            return Err(ConfigError::Invalid("schedule intervals must be at least 1s".to_string()));
        }
        if self.tracking.days <= 0 {
            return Err(ConfigError::Invalid("tracking.days must be positive".to_string()));
        }
        if TrackingWindow::new(self.tracking.start, self.tracking.days)
            .checked_end()
            .is_none()
        {
            return Err(ConfigError::Invalid(format!(
                "tracking window of {} days from {} ends out of range",
                self.tracking.days, self.tracking.start
            )));
        }
        if self.api.timeout_secs == 0 {
            return Err(ConfigError::Invalid("api.timeout_secs must be at least 1s".to_string()));
        }

        Ok(())
    }

    pub fn portfolio_settings(&self) -> PortfolioSettings {
        PortfolioSettings {
            allocation: self.portfolio.allocation,
            initial_investment: self.portfolio.initial_investment,
            target_multiplier: self.portfolio.target_multiplier,
        }
    }

    pub fn tracking_settings(&self) -> TrackingSettings {
        TrackingSettings {
            start: self.tracking.start,
            days: self.tracking.days,
            countdown: self.tracking.countdown,
        }
    }

    /// Baseline used in `fixed` mode
    pub fn fixed_baseline(&self) -> BaselinePrices {
        if self.baseline.prices.is_empty() {
            BaselinePrices::default_fixed()
        } else {
            BaselinePrices::from_prices(self.baseline.prices.clone())
        }
    }

    pub fn fetch_interval(&self) -> Duration {
        Duration::from_secs(self.schedule.fetch_interval_secs)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs(self.schedule.tick_interval_secs)
    }

    pub fn api_timeout(&self) -> Duration {
        Duration::from_secs(self.api.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_uses_defaults() {
        let cfg = Config::from_toml("").unwrap();
        assert_eq!(cfg.assets.len(), 5);
        assert_eq!(cfg.baseline.mode, BaselineMode::Fixed);
        assert_eq!(cfg.tracking.countdown, CountdownMode::Clock);
        assert_eq!(cfg.fetch_interval(), Duration::from_secs(60));
        assert_eq!(cfg.tick_interval(), Duration::from_secs(1));
        assert_eq!(cfg.portfolio_settings(), PortfolioSettings::default());
        assert_eq!(cfg.fixed_baseline(), BaselinePrices::default_fixed());
    }

    #[test]
    fn test_partial_sections() {
        let raw = r##"
            [schedule]
            fetch_interval_secs = 30

            [baseline]
            mode = "first_fetch"
            store_dir = "/tmp/fivex"

            [tracking]
            start = "2026-01-01T00:00:00Z"
            countdown = "days"

            [[assets]]
            id = "bitcoin"
            symbol = "BTC"
            name = "Bitcoin"
            color = "#F7931A"
        "##;
        let cfg = Config::from_toml(raw).unwrap();

        assert_eq!(cfg.schedule.fetch_interval_secs, 30);
        assert_eq!(cfg.schedule.tick_interval_secs, 1);
        assert_eq!(cfg.baseline.mode, BaselineMode::FirstFetch);
        assert_eq!(cfg.baseline.store_dir, PathBuf::from("/tmp/fivex"));
        assert_eq!(cfg.tracking.days, 180);
        assert_eq!(cfg.tracking.countdown, CountdownMode::Days);
        assert_eq!(cfg.assets.len(), 1);
        assert_eq!(cfg.assets[0].symbol, "BTC");
    }

    #[test]
    fn test_fixed_baseline_override() {
        let raw = r#"
            [baseline.prices]
            arbitrum = 0.5
        "#;
        let cfg = Config::from_toml(raw).unwrap();
        let baseline = cfg.fixed_baseline();
        assert_eq!(baseline.len(), 1);
        assert_eq!(baseline.price("arbitrum"), Some(0.5));
    }

    #[test]
    fn test_validation_failures() {
        let dup = r##"
            [[assets]]
            id = "arbitrum"
            symbol = "ARB"
            name = "Arbitrum"
            color = "#28A0F0"

            [[assets]]
            id = "arbitrum"
            symbol = "ARB2"
            name = "Arbitrum"
            color = "#28A0F0"
        "##;
        assert!(matches!(Config::from_toml(dup), Err(ConfigError::Invalid(_))));

        let zero_interval = "[schedule]\nfetch_interval_secs = 0";
        assert!(matches!(Config::from_toml(zero_interval), Err(ConfigError::Invalid(_))));

        let bad_investment = "[portfolio]\ninitial_investment = 0.0";
        assert!(matches!(Config::from_toml(bad_investment), Err(ConfigError::Invalid(_))));

        let bad_days = "[tracking]\ndays = 0";
        assert!(matches!(Config::from_toml(bad_days), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_duplicate_symbols_rejected() {
        let dup = r##"
            [[assets]]
            id = "render-token"
            symbol = "RENDER"
            name = "Render"
            color = "#E84855"

            [[assets]]
            id = "render"
            symbol = "RENDER"
            name = "Render (new)"
            color = "#E84855"
        "##;
        let err = Config::from_toml(dup).unwrap_err();
        assert!(err.to_string().contains("duplicate asset symbol"));
    }

    #[test]
    fn test_window_end_out_of_range_rejected() {
        let huge_days = "[tracking]\ndays = 100000000";
        assert!(matches!(Config::from_toml(huge_days), Err(ConfigError::Invalid(_))));

        let mut late_start = Config::default();
        late_start.tracking.start = DateTime::<Utc>::MAX_UTC - chrono::Duration::days(30);
        assert!(matches!(late_start.validate(), Err(ConfigError::Invalid(_))));

        assert!(Config::from_toml("[tracking]\ndays = 365000").is_ok());
    }

    #[test]
    fn test_parse_error() {
        assert!(matches!(Config::from_toml("[schedule"), Err(ConfigError::Parse(_))));
    }
}
