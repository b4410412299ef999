//! Portfolio domain - assets, baseline and valuation

mod asset;
mod baseline;
pub mod valuation;

pub use asset::{default_assets, joined_ids, Asset};
pub use baseline::{BaselinePrice, BaselinePrices, BaselineRecord};
pub use valuation::{CoinValuation, Valuation, ValuationCalculator};
