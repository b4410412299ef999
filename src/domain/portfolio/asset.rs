//! Tracked assets

use serde::{Deserialize, Serialize};

/// A tracked token. `id` is the key understood by the price API.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Asset {
    pub id: String,
    pub symbol: String,
    pub name: String,
    pub color: String,
}

impl Asset {
    pub fn new(id: &str, symbol: &str, name: &str, color: &str) -> Self {
        Self {
            id: id.to_string(),
            symbol: symbol.to_string(),
            name: name.to_string(),
            color: color.to_string(),
        }
    }
}

/// The five tokens of the 5X portfolio
pub fn default_assets() -> Vec<Asset> {
    vec![
        Asset::new("arbitrum", "ARB", "Arbitrum", "#28A0F0"),
        Asset::new("optimism", "OP", "Optimism", "#FF0420"),
        Asset::new("celestia", "TIA", "Celestia", "#7B61FF"),
        Asset::new("injective-protocol", "INJ", "Injective", "#00F2FE"),
        Asset::new("render-token", "RENDER", "Render", "#E84855"),
    ]
}

/// Comma-joined ids, in asset order, as the price API expects them
pub fn joined_ids(assets: &[Asset]) -> String {
    assets
        .iter()
        .map(|a| a.id.as_str())
        .collect::<Vec<_>>()
        .join(",")
}
