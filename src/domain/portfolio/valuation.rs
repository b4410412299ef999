//! Portfolio valuation against the baseline

use serde::Serialize;

use super::{Asset, BaselinePrices};
use crate::domain::price::PriceSnapshot;
use crate::shared::types::PortfolioSettings;
use crate::shared::utils::calculate_percentage_change;

/// Derived figures for a single asset
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoinValuation {
    pub id: String,
    pub symbol: String,
    pub name: String,
    pub color: String,
    pub current_price: Option<f64>,
    pub change_24h: f64,
    pub coin_value: f64,
    pub performance_pct: f64,
}

/// Aggregate portfolio figures
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Valuation {
    pub portfolio_value: f64,
    pub portfolio_performance_pct: f64,
    pub target_value: f64,
    pub percent_to_target: f64,
    pub coins: Vec<CoinValuation>,
}

/// Pure calculator over (snapshot, baseline).
///
/// Holdings are recomputed on every call from allocation / baseline price.
#[derive(Debug, Clone, Copy)]
pub struct ValuationCalculator {
    settings: PortfolioSettings,
}

impl ValuationCalculator {
    pub fn new(settings: PortfolioSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &PortfolioSettings {
        &self.settings
    }

    /// Implicit quantity held, `None` without a usable baseline
    pub fn holdings(&self, asset_id: &str, baseline: &BaselinePrices) -> Option<f64> {
        baseline
            .price(asset_id)
            .map(|base| self.settings.allocation / base)
    }

    pub fn coin_value(&self, asset_id: &str, snapshot: &PriceSnapshot, baseline: &BaselinePrices) -> f64 {
        match (snapshot.price(asset_id), self.holdings(asset_id, baseline)) {
            (Some(current), Some(holdings)) => current * holdings,
            _ => 0.0,
        }
    }

    pub fn coin_performance_pct(
        &self,
        asset_id: &str,
        snapshot: &PriceSnapshot,
        baseline: &BaselinePrices,
    ) -> f64 {
        match (snapshot.price(asset_id), baseline.price(asset_id)) {
            (Some(current), Some(base)) => calculate_percentage_change(base, current),
            _ => 0.0,
        }
    }

    pub fn portfolio_value(&self, assets: &[Asset], snapshot: &PriceSnapshot, baseline: &BaselinePrices) -> f64 {
        assets
            .iter()
            .map(|asset| self.coin_value(&asset.id, snapshot, baseline))
            .sum()
    }

    pub fn portfolio_performance_pct(&self, portfolio_value: f64) -> f64 {
        (portfolio_value - self.settings.initial_investment) / self.settings.initial_investment * 100.0
    }

    pub fn target_value(&self) -> f64 {
        self.settings.target_value()
    }

    pub fn percent_to_target(&self, portfolio_value: f64) -> f64 {
        portfolio_value / self.target_value() * 100.0
    }

    /// Evaluate every figure the dashboard shows
    pub fn evaluate(&self, assets: &[Asset], snapshot: &PriceSnapshot, baseline: &BaselinePrices) -> Valuation {
        let coins: Vec<CoinValuation> = assets
            .iter()
            .map(|asset| {
                let quote = snapshot.quote(&asset.id);
                CoinValuation {
                    id: asset.id.clone(),
                    symbol: asset.symbol.clone(),
                    name: asset.name.clone(),
                    color: asset.color.clone(),
                    current_price: quote.map(|q| q.price),
                    change_24h: quote.map(|q| q.change_24h).unwrap_or(0.0),
                    coin_value: self.coin_value(&asset.id, snapshot, baseline),
                    performance_pct: self.coin_performance_pct(&asset.id, snapshot, baseline),
                }
            })
            .collect();

        let portfolio_value: f64 = coins.iter().map(|c| c.coin_value).sum();

        Valuation {
            portfolio_value,
            portfolio_performance_pct: self.portfolio_performance_pct(portfolio_value),
            target_value: self.target_value(),
            percent_to_target: self.percent_to_target(portfolio_value),
            coins,
        }
    }
}

impl Default for ValuationCalculator {
    fn default() -> Self {
        Self::new(PortfolioSettings::default())
    }
}
