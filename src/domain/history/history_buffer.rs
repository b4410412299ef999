//! Bounded FIFO of per-fetch price points

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};

use crate::domain::portfolio::Asset;
use crate::domain::price::PriceSnapshot;
use crate::shared::types::HISTORY_CAPACITY;

/// One chart point: fetch time plus the price of every asset present in
/// that fetch, keyed by symbol. Serialized flat, e.g.
/// `{"timestamp": 1765500000000, "ARB": 0.21, "OP": 0.31}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub prices: BTreeMap<String, f64>,
}

impl HistoryEntry {
    pub fn from_snapshot(timestamp: DateTime<Utc>, assets: &[Asset], snapshot: &PriceSnapshot) -> Self {
        let prices = assets
            .iter()
            .filter_map(|asset| snapshot.price(&asset.id).map(|p| (asset.symbol.clone(), p)))
            .collect();
        Self { timestamp, prices }
    }

    pub fn price(&self, symbol: &str) -> Option<f64> {
        self.prices.get(symbol).copied()
    }
}

/// Append-only series capped at `capacity`, oldest evicted first
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryBuffer {
    entries: VecDeque<HistoryEntry>,
    capacity: usize,
}

impl HistoryBuffer {
    pub fn new() -> Self {
        Self::with_capacity(HISTORY_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    pub fn push(&mut self, entry: HistoryEntry) {
        self.entries.push_back(entry);
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
    }

    /// Record the prices of a successful fetch
    pub fn record(&mut self, timestamp: DateTime<Utc>, assets: &[Asset], snapshot: &PriceSnapshot) {
        self.push(HistoryEntry::from_snapshot(timestamp, assets, snapshot));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// A line needs at least two points
    pub fn is_chartable(&self) -> bool {
        self.entries.len() > 1
    }

    pub fn iter(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    pub fn first(&self) -> Option<&HistoryEntry> {
        self.entries.front()
    }

    pub fn last(&self) -> Option<&HistoryEntry> {
        self.entries.back()
    }

    pub fn to_vec(&self) -> Vec<HistoryEntry> {
        self.entries.iter().cloned().collect()
    }
}

impl Default for HistoryBuffer {
    fn default() -> Self {
        Self::new()
    }
}
