//! Per-event feature extraction backed by per-sender running statistics.

mod pipeline;

pub use pipeline::{Featureizer, SenderStatistics};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

pub const HOUR_OF_DAY: &str = "hour_of_day";
pub const SENDER_AMOUNT_ZSCORE: &str = "sender_amount_zscore";

/// Named numeric features for one event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureVector {
    values: BTreeMap<String, f64>,
}

impl FeatureVector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: f64) {
        self.values.insert(name.into(), value);
    }

    pub fn with(mut self, name: impl Into<String>, value: f64) -> Self {
        self.insert(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn hour_of_day(&self) -> Option<f64> {
        self.get(HOUR_OF_DAY)
    }

    pub fn sender_amount_zscore(&self) -> Option<f64> {
        self.get(SENDER_AMOUNT_ZSCORE)
    }
}

/// Event fields passed through untouched alongside the features.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TxMetadata {
    pub tx_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub sender_id: String,
    pub receiver_id: String,
    pub amount: f64,
    pub injected: bool,
}
