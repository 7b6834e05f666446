//! Feature extraction: event → sender statistics → feature vector + metadata.

use super::{FeatureVector, TxMetadata, HOUR_OF_DAY, SENDER_AMOUNT_ZSCORE};
use crate::simulator::TransactionEvent;
use crate::stats::RunningStats;
use chrono::Timelike;
use std::collections::HashMap;

/// Running amount statistics for one sender.
pub type SenderStatistics = RunningStats;

// Degenerate-variance floor, relative to the sender's mean amount.
const RELATIVE_STD_FLOOR: f64 = 1e-3;
const ABSOLUTE_STD_FLOOR: f64 = 1e-9;

/// Keeps one `SenderStatistics` per sender seen so far; nothing else.
#[derive(Debug, Clone, Default)]
pub struct Featureizer {
    senders: HashMap<String, SenderStatistics>,
}

impl Featureizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Score `event.amount` against the sender's statistics as they stood
    /// before this event, then fold the amount in.
    pub fn transform(&mut self, event: &TransactionEvent) -> (FeatureVector, TxMetadata) {
        let stats = self.senders.entry(event.sender_id.clone()).or_default();
        let zscore = amount_zscore(stats, event.amount);
        stats.update(event.amount);

        let features = FeatureVector::new()
            .with(HOUR_OF_DAY, f64::from(event.timestamp.hour()))
            .with(SENDER_AMOUNT_ZSCORE, zscore);

        let meta = TxMetadata {
            tx_id: event.tx_id,
            timestamp: event.timestamp,
            sender_id: event.sender_id.clone(),
            receiver_id: event.receiver_id.clone(),
            amount: event.amount,
            injected: event.injected,
        };
        (features, meta)
    }

    pub fn sender_stats(&self, sender_id: &str) -> Option<&SenderStatistics> {
        self.senders.get(sender_id)
    }

    pub fn sender_count(&self) -> usize {
        self.senders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.senders.is_empty()
    }
}

/// Cold start (fewer than two prior amounts) is exactly 0.0.
fn amount_zscore(stats: &SenderStatistics, amount: f64) -> f64 {
    if stats.count() < 2 {
        return 0.0;
    }
    let floor = (RELATIVE_STD_FLOOR * stats.mean().abs()).max(ABSOLUTE_STD_FLOOR);
    (amount - stats.mean()) / stats.std_dev().max(floor)
}
