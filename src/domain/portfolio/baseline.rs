//! Baseline prices performance is measured against

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::domain::price::PriceSnapshot;
use crate::shared::utils::is_usable_price;

/// Reference price of one asset. `change_24h` is recorded at capture and
/// never used afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BaselinePrice {
    pub price: f64,
    #[serde(default)]
    pub change_24h: f64,
}

impl BaselinePrice {
    pub fn new(price: f64) -> Self {
        Self {
            price,
            change_24h: 0.0,
        }
    }
}

/// Baseline price per asset id
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BaselinePrices(HashMap<String, BaselinePrice>);

impl BaselinePrices {
    pub fn new(prices: HashMap<String, BaselinePrice>) -> Self {
        Self(prices)
    }

    /// Build from plain `id -> price` pairs
    pub fn from_prices<I, K>(prices: I) -> Self
    where
        I: IntoIterator<Item = (K, f64)>,
        K: Into<String>,
    {
        Self(
            prices
                .into_iter()
                .map(|(id, price)| (id.into(), BaselinePrice::new(price)))
                .collect(),
        )
    }

    /// Capture every quote of a snapshot as the baseline
    pub fn from_snapshot(snapshot: &PriceSnapshot) -> Self {
        Self(
            snapshot
                .quotes
                .iter()
                .map(|(id, quote)| {
                    (
                        id.clone(),
                        BaselinePrice {
                            price: quote.price,
                            change_24h: quote.change_24h,
                        },
                    )
                })
                .collect(),
        )
    }

    /// Prices observed on December 11, 2025 11:37 PM ET
    pub fn default_fixed() -> Self {
        Self::from_prices([
            ("arbitrum", 0.2113),
            ("optimism", 0.3111),
            ("celestia", 0.5897),
            ("injective-protocol", 5.56),
            ("render-token", 1.61),
        ])
    }

    /// Baseline price usable as a divisor, if any
    pub fn price(&self, asset_id: &str) -> Option<f64> {
        self.0
            .get(asset_id)
            .map(|b| b.price)
            .filter(|p| is_usable_price(*p))
    }

    pub fn get(&self, asset_id: &str) -> Option<&BaselinePrice> {
        self.0.get(asset_id)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

/// Persisted first-fetch baseline of a tracking session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaselineRecord {
    pub session_start: DateTime<Utc>,
    pub prices: BaselinePrices,
}

impl BaselineRecord {
    pub fn new(session_start: DateTime<Utc>, prices: BaselinePrices) -> Self {
        Self {
            session_start,
            prices,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}
