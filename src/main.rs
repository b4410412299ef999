mod app;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use fivex_tracker::shared::types::{BaselineMode, CountdownMode};
use fivex_tracker::Config;

#[derive(Copy, Clone, Debug, ValueEnum)]
enum BaselineArg {
    /// Hardcoded baseline prices
    Fixed,
    /// First successful fetch, persisted locally
    FirstFetch,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum CountdownArg {
    /// Days/hours/minutes/seconds until the window ends
    Clock,
    /// Whole days remaining, may go negative
    Days,
}

#[derive(Parser, Debug)]
#[command(version, about = "5X or Bust - live crypto portfolio tracker")]
struct Args {
    /// Path to config file (optional)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seconds between price fetches
    #[arg(long)]
    fetch_interval_secs: Option<u64>,

    /// Where baseline prices come from
    #[arg(long, value_enum)]
    baseline: Option<BaselineArg>,

    /// Countdown flavour
    #[arg(long, value_enum)]
    countdown: Option<CountdownArg>,

    /// Directory of the local baseline store
    #[arg(long)]
    store_dir: Option<PathBuf>,

    /// Price API base URL
    #[arg(long)]
    api_url: Option<String>,

    /// Print the dashboard as JSON instead of log lines
    #[arg(long)]
    json: bool,

    /// Fetch once, render and exit
    #[arg(long)]
    once: bool,

    /// Log filter, RUST_LOG takes precedence
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    // Priority: CLI args > Config file > Defaults
    let config = match &args.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };

    let overrides = app::Overrides {
        fetch_interval_secs: args.fetch_interval_secs,
        baseline_mode: args.baseline.map(|b| match b {
            BaselineArg::Fixed => BaselineMode::Fixed,
            BaselineArg::FirstFetch => BaselineMode::FirstFetch,
        }),
        countdown: args.countdown.map(|c| match c {
            CountdownArg::Clock => CountdownMode::Clock,
            CountdownArg::Days => CountdownMode::Days,
        }),
        store_dir: args.store_dir,
        api_url: args.api_url,
    };

    let app_cfg = app::AppCfg::from_config(config, overrides, args.json, args.once)?;
    app::run(app_cfg).await
}
