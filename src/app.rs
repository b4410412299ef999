// src/app.rs
use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{info, warn};

use fivex_tracker::application::{ConsolePresenter, DashboardSink, JsonPresenter};
use fivex_tracker::infrastructure::storage::{BaselineStore, JsonFileStore};
use fivex_tracker::shared::types::{BaselineMode, CountdownMode};
use fivex_tracker::{CoingeckoClient, Config, PortfolioTracker, RefreshScheduler};

#[derive(Debug, Clone)]
pub struct AppCfg {
    pub config: Config,
    pub json_output: bool,
    pub once: bool,
}

/// Command line values that take priority over the config file
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub fetch_interval_secs: Option<u64>,
    pub baseline_mode: Option<BaselineMode>,
    pub countdown: Option<CountdownMode>,
    pub store_dir: Option<PathBuf>,
    pub api_url: Option<String>,
}

impl AppCfg {
    pub fn from_config(mut config: Config, overrides: Overrides, json_output: bool, once: bool) -> Result<Self> {
        if let Some(secs) = overrides.fetch_interval_secs {
            config.schedule.fetch_interval_secs = secs;
        }
        if let Some(mode) = overrides.baseline_mode {
            config.baseline.mode = mode;
        }
        if let Some(countdown) = overrides.countdown {
            config.tracking.countdown = countdown;
        }
        if let Some(dir) = overrides.store_dir {
            config.baseline.store_dir = dir;
        }
        if let Some(url) = overrides.api_url {
            config.api.base_url = url;
        }

        config.validate().context("invalid configuration")?;

        Ok(Self {
            config,
            json_output,
            once,
        })
    }
}

pub async fn run(app_cfg: AppCfg) -> Result<()> {
    let config = &app_cfg.config;
    info!("Starting 5X portfolio tracker");
    info!(
        "Baseline: {:?}, countdown: {:?}, assets: {}",
        config.baseline.mode,
        config.tracking.countdown,
        config
            .assets
            .iter()
            .map(|a| a.symbol.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );

    let price_feed = Arc::new(
        CoingeckoClient::new(&config.api.base_url, config.api_timeout())
            .context("failed to build price API client")?,
    );

    let baseline_store = match config.baseline.mode {
        BaselineMode::FirstFetch => {
            info!("Baseline store: {}", config.baseline.store_dir.display());
            Some(BaselineStore::new(Arc::new(JsonFileStore::new(&config.baseline.store_dir))))
        }
        BaselineMode::Fixed => None,
    };

    let tracker = PortfolioTracker::from_config(config, price_feed, baseline_store);

    let sink: Arc<dyn DashboardSink> = if app_cfg.json_output {
        Arc::new(JsonPresenter)
    } else {
        Arc::new(ConsolePresenter::new())
    };

    let scheduler = RefreshScheduler::new(tracker, sink, config.fetch_interval(), config.tick_interval());

    if app_cfg.once {
        return scheduler.run_once().await.context("price fetch failed");
    }

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Ctrl-C received, shutting down"),
            Err(e) => warn!("⚠️ Failed to listen for Ctrl-C: {}", e),
        }
        let _ = shutdown_tx.send(true);
    });

    scheduler.run(shutdown_rx).await?;
    Ok(())
}
