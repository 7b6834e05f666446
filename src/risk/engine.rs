//! Applies configured thresholds to anomaly scores: per-record alerts and a
//! risk level for a window's mean score.

use crate::config::RiskConfig;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn from_score(score: f64, config: &RiskConfig) -> Self {
        if score >= config.high_threshold {
            RiskLevel::High
        } else if score >= config.medium_threshold {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }

    /// Dashboard wording for a window status.
    pub fn label(self) -> &'static str {
        match self {
            RiskLevel::Low => "normal",
            RiskLevel::Medium => "elevated",
            RiskLevel::High => "high risk",
        }
    }
}

pub struct RiskEngine {
    config: RiskConfig,
}

impl RiskEngine {
    pub fn new(config: RiskConfig) -> Self {
        Self { config }
    }

    pub fn is_alert(&self, score: f64) -> bool {
        score >= self.config.alert_threshold
    }

    pub fn level(&self, score: f64) -> RiskLevel {
        RiskLevel::from_score(score, &self.config)
    }

    pub fn config(&self) -> &RiskConfig {
        &self.config
    }
}
