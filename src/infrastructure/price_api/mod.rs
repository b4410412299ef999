//! External price API clients

mod coingecko_client;

pub use coingecko_client::{CoingeckoClient, DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS};
