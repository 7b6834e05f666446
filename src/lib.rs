//! TransGuard core — streaming anomaly scoring for bank transactions.
//!
//! Modular structure:
//! - [`random`] — Seeded, reproducible random draws
//! - [`simulator`] — Synthetic transaction generator
//! - [`features`] — Per-sender running statistics and feature vectors
//! - [`model`] — Incremental isolation-style anomaly model
//! - [`pipeline`] — Owned simulator + featurizer + model
//! - [`storage`] — Time-windowed store of scored records
//! - [`risk`] — Alert and status thresholds
//! - [`logging`] — Structured logging

pub mod clock;
pub mod config;
pub mod error;
pub mod features;
pub mod logging;
pub mod model;
pub mod pipeline;
pub mod random;
pub mod risk;
pub mod simulator;
pub mod stats;
pub mod storage;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::AppConfig;
pub use error::{ConfigError, DataContractError};
pub use features::{FeatureVector, Featureizer, SenderStatistics, TxMetadata};
pub use logging::StructuredLogger;
pub use model::OnlineAnomalyModel;
pub use pipeline::{Pipeline, ScoredRecord};
pub use random::RandomStream;
pub use risk::{RiskEngine, RiskLevel};
pub use simulator::{TransactionEvent, TxSimulator};
pub use storage::{ScoredWindow, WindowSummary};
