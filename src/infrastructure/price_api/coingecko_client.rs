//! CoinGecko `/simple/price` client

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::domain::portfolio::{joined_ids, Asset};
use crate::domain::price::{PriceFeed, PriceQuote};
use crate::shared::errors::FetchError;

pub const DEFAULT_BASE_URL: &str = "https://api.coingecko.com/api/v3";
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// One entry of the response, e.g. `{"usd": 0.21, "usd_24h_change": -1.3}`
#[derive(Debug, Deserialize)]
struct SimplePriceEntry {
    usd: Option<f64>,
    usd_24h_change: Option<f64>,
}

/// CoinGecko API client
pub struct CoingeckoClient {
    http_client: Client,
    base_url: String,
}

impl CoingeckoClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, FetchError> {
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn endpoint(&self) -> String {
        format!("{}/simple/price", self.base_url)
    }

    /// Turn a raw response body into quotes for the requested assets.
    ///
    /// Ids absent from the body, or present without a USD price, are left out.
    pub fn parse_simple_price(body: &[u8], assets: &[Asset]) -> Result<HashMap<String, PriceQuote>, FetchError> {
        let mut parsed: HashMap<String, SimplePriceEntry> = serde_json::from_slice(body)?;

        let mut quotes = HashMap::with_capacity(assets.len());
        for asset in assets {
            match parsed.remove(&asset.id) {
                Some(SimplePriceEntry { usd: Some(price), usd_24h_change }) => {
                    quotes.insert(asset.id.clone(), PriceQuote::new(price, usd_24h_change.unwrap_or(0.0)));
                }
                Some(_) => debug!("No USD price for {} this cycle", asset.id),
                None => debug!("{} missing from price response", asset.id),
            }
        }

        Ok(quotes)
    }
}

impl Default for CoingeckoClient {
    fn default() -> Self {
        Self {
            http_client: Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

#[async_trait]
impl PriceFeed for CoingeckoClient {
    async fn fetch_quotes(&self, assets: &[Asset]) -> Result<HashMap<String, PriceQuote>, FetchError> {
        let ids = joined_ids(assets);
        let url = self.endpoint();

        debug!("🔍 Fetching prices from {} for {}", url, ids);

        let response = self
            .http_client
            .get(&url)
            .header("accept", "application/json")
            .query(&[
                ("ids", ids.as_str()),
                ("vs_currencies", "usd"),
                ("include_24hr_change", "true"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            warn!("⚠️ CoinGecko returned status: {}", response.status());
            return Err(FetchError::Status(response.status().as_u16()));
        }

        let body = response.bytes().await?;
        let quotes = Self::parse_simple_price(&body, assets)?;

        info!("✅ Received {}/{} quotes from CoinGecko", quotes.len(), assets.len());
        Ok(quotes)
    }

    fn source(&self) -> &str {
        "coingecko"
    }
}
