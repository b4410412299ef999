//! Price domain - spot quotes and fetched snapshots

mod price_feed;

pub use price_feed::PriceFeed;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Spot price in USD with its 24h change percentage
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceQuote {
    pub price: f64,
    pub change_24h: f64,
}

impl PriceQuote {
    pub fn new(price: f64, change_24h: f64) -> Self {
        Self { price, change_24h }
    }
}

/// Quotes of one successful fetch, keyed by asset id.
///
/// Replaced wholesale on every successful fetch. Assets the API did not
/// return are simply absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceSnapshot {
    pub quotes: HashMap<String, PriceQuote>,
    pub fetched_at: Option<DateTime<Utc>>,
}

impl PriceSnapshot {
    pub fn new(quotes: HashMap<String, PriceQuote>, fetched_at: DateTime<Utc>) -> Self {
        Self {
            quotes,
            fetched_at: Some(fetched_at),
        }
    }

    pub fn quote(&self, asset_id: &str) -> Option<&PriceQuote> {
        self.quotes.get(asset_id)
    }

    pub fn price(&self, asset_id: &str) -> Option<f64> {
        self.quotes.get(asset_id).map(|q| q.price)
    }

    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.quotes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_lookup() {
        let mut quotes = HashMap::new();
        quotes.insert("arbitrum".to_string(), PriceQuote::new(0.25, 3.5));
        let snapshot = PriceSnapshot::new(quotes, Utc::now());

        assert_eq!(snapshot.price("arbitrum"), Some(0.25));
        assert_eq!(snapshot.quote("arbitrum").map(|q| q.change_24h), Some(3.5));
        assert!(snapshot.price("optimism").is_none());
        assert_eq!(snapshot.len(), 1);
    }

    #[test]
    fn test_default_snapshot_is_empty() {
        let snapshot = PriceSnapshot::default();
        assert!(snapshot.is_empty());
        assert!(snapshot.fetched_at.is_none());
    }
}
