//! 5X or Bust - live crypto portfolio tracker
//! Built with Domain-Driven Design principles

pub mod domain;
pub mod infrastructure;
pub mod application;
pub mod shared;

// Re-export main types for convenience
pub use application::{PortfolioTracker, RefreshScheduler};
pub use domain::history::HistoryBuffer;
pub use domain::portfolio::ValuationCalculator;
pub use domain::price::PriceFeed;
pub use infrastructure::price_api::CoingeckoClient;
pub use shared::config::Config;
