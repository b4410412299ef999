//! Persistence of the first-fetch baseline

use std::sync::Arc;
use tracing::{info, warn};

use super::KeyValueStore;
use crate::domain::portfolio::BaselineRecord;
use crate::shared::errors::StoreError;
use crate::shared::types::BASELINE_RECORD_KEY;

/// Reads and writes the baseline record under a fixed key
#[derive(Clone)]
pub struct BaselineStore {
    store: Arc<dyn KeyValueStore>,
    key: String,
}

impl BaselineStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self::with_key(store, BASELINE_RECORD_KEY)
    }

    pub fn with_key(store: Arc<dyn KeyValueStore>, key: &str) -> Self {
        Self {
            store,
            key: key.to_string(),
        }
    }

    /// Load the stored record. An undecodable record is reported as
    /// `InvalidRecord` so the caller can decide to ignore it.
    pub fn load(&self) -> Result<Option<BaselineRecord>, StoreError> {
        let Some(raw) = self.store.get(&self.key)? else {
            return Ok(None);
        };

        BaselineRecord::from_json(&raw)
            .map(Some)
            .map_err(|e| StoreError::InvalidRecord {
                key: self.key.clone(),
                reason: e.to_string(),
            })
    }

    /// Load, treating a corrupt record as absent
    pub fn load_or_ignore(&self) -> Result<Option<BaselineRecord>, StoreError> {
        match self.load() {
            Err(StoreError::InvalidRecord { key, reason }) => {
                warn!("⚠️ Ignoring unreadable baseline record '{}': {}", key, reason);
                Ok(None)
            }
            other => other,
        }
    }

    /// Write the record unless a valid one already exists.
    /// Returns whether a write happened.
    pub fn save_if_absent(&self, record: &BaselineRecord) -> Result<bool, StoreError> {
        if self.load_or_ignore()?.is_some() {
            return Ok(false);
        }

        let json = record.to_json().map_err(|e| StoreError::InvalidRecord {
            key: self.key.clone(),
            reason: e.to_string(),
        })?;
        self.store.put(&self.key, &json)?;

        info!(
            "💾 Baseline captured for {} assets (session start {})",
            record.prices.len(),
            record.session_start.to_rfc3339()
        );
        Ok(true)
    }
}
