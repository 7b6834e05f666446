//! Time-windowed buffer of scored records with retention by age.

use crate::pipeline::ScoredRecord;
use crate::risk::{RiskEngine, RiskLevel};
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::collections::VecDeque;

const HISTOGRAM_BUCKETS: usize = 10;

/// Aggregate view of the records currently in the window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WindowSummary {
    pub total: usize,
    pub alerts: usize,
    /// Mean score rounded to three decimals; 0.0 when empty
    pub mean_score: f64,
    pub status: RiskLevel,
    /// Counts per score bucket [0.0, 0.1), ..., [0.9, 1.0]
    pub score_distribution: [u64; HISTOGRAM_BUCKETS],
}

/// Records in arrival order. Only this type evicts, and only by age.
#[derive(Debug, Clone)]
pub struct ScoredWindow {
    window: Duration,
    records: VecDeque<ScoredRecord>,
}

impl ScoredWindow {
    pub fn new(window_seconds: u64) -> Self {
        // chrono caps durations at i64::MAX milliseconds
        let secs = window_seconds.min(i64::MAX as u64 / 1000) as i64;
        Self {
            window: Duration::seconds(secs),
            records: VecDeque::new(),
        }
    }

    /// Append `records`, then drop everything older than `now - window`.
    /// Returns the number of records evicted.
    pub fn append(&mut self, records: Vec<ScoredRecord>, now: DateTime<Utc>) -> usize {
        self.records.extend(records);
        match now.checked_sub_signed(self.window) {
            Some(horizon) => self.prune_before(horizon),
            None => 0,
        }
    }

    /// Retention: delete records with a timestamp before `horizon`.
    pub fn prune_before(&mut self, horizon: DateTime<Utc>) -> usize {
        let before = self.records.len();
        self.records.retain(|r| r.meta.timestamp >= horizon);
        before - self.records.len()
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> impl Iterator<Item = &ScoredRecord> {
        self.records.iter()
    }

    /// Records at or above `threshold`, highest score first.
    pub fn alerts(&self, threshold: f64) -> Vec<&ScoredRecord> {
        let mut out: Vec<&ScoredRecord> = self
            .records
            .iter()
            .filter(|r| r.score >= threshold)
            .collect();
        out.sort_by(|a, b| b.score.total_cmp(&a.score));
        out
    }

    pub fn summary(&self, risk: &RiskEngine) -> WindowSummary {
        let total = self.records.len();
        let alerts = self.records.iter().filter(|r| risk.is_alert(r.score)).count();
        let mean_score = if total == 0 {
            0.0
        } else {
            let mean = self.records.iter().map(|r| r.score).sum::<f64>() / total as f64;
            (mean * 1000.0).round() / 1000.0
        };

        let mut score_distribution = [0u64; HISTOGRAM_BUCKETS];
        for r in &self.records {
            let bucket = ((r.score * HISTOGRAM_BUCKETS as f64) as usize).min(HISTOGRAM_BUCKETS - 1);
            score_distribution[bucket] += 1;
        }

        WindowSummary {
            total,
            alerts,
            mean_score,
            status: risk.level(mean_score),
            score_distribution,
        }
    }
}
