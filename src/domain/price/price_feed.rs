//! Price feed interface

use async_trait::async_trait;
use std::collections::HashMap;

use super::PriceQuote;
use crate::domain::portfolio::Asset;
use crate::shared::errors::FetchError;

/// Source of spot quotes for the tracked assets
#[async_trait]
pub trait PriceFeed: Send + Sync {
    /// Fetch USD price and 24h change for all assets in a single request.
    ///
    /// Assets missing from the upstream response are omitted from the map.
    async fn fetch_quotes(&self, assets: &[Asset]) -> Result<HashMap<String, PriceQuote>, FetchError>;

    /// Human readable source name for logs
    fn source(&self) -> &str;
}
