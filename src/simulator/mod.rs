//! Synthetic transaction source used to drive the pipeline without a live feed.

mod generator;

pub use generator::{SimulatorStats, TxSimulator, BURST_MULTIPLIER};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One bank transfer. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionEvent {
    pub tx_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub sender_id: String,
    pub receiver_id: String,
    pub amount: f64,
    /// Amount came from the anomalous distribution. Evaluation label only.
    #[serde(default)]
    pub injected: bool,
}

impl TransactionEvent {
    /// Build an event directly, e.g. to replay a recorded feed.
    pub fn new(
        tx_id: Uuid,
        timestamp: DateTime<Utc>,
        sender_id: impl Into<String>,
        receiver_id: impl Into<String>,
        amount: f64,
    ) -> Self {
        Self {
            tx_id,
            timestamp,
            sender_id: sender_id.into(),
            receiver_id: receiver_id.into(),
            amount,
            injected: false,
        }
    }
}

pub(crate) fn sender_id(index: usize) -> String {
    format!("S{:04}", index)
}

pub(crate) fn receiver_id(index: usize) -> String {
    format!("R{:04}", index)
}
