//! Seeded transaction generator with volume bursts and amount anomalies.

use super::{receiver_id, sender_id, TransactionEvent};
use crate::clock::{Clock, SystemClock};
use crate::config::SimulatorConfig;
use crate::error::ConfigResult;
use crate::random::RandomStream;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

/// A burst scales the requested count by this factor.
pub const BURST_MULTIPLIER: usize = 4;

// log-space parameters of the two amount distributions
const BASELINE_LOG_MEAN: f64 = 4.0;
const BASELINE_LOG_STD: f64 = 0.5;
const ANOMALY_LOG_MEAN: f64 = 6.0;
const ANOMALY_LOG_STD: f64 = 1.2;

const MIN_AMOUNT: f64 = 0.01;

/// Counters since construction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SimulatorStats {
    pub batches: u64,
    pub bursts: u64,
    pub events: u64,
    pub injected: u64,
}

pub struct TxSimulator {
    config: SimulatorConfig,
    rng: RandomStream,
    clock: Box<dyn Clock>,
    last_ts: Option<DateTime<Utc>>,
    stats: SimulatorStats,
}

impl TxSimulator {
    /// Validate `config` and stamp events with wall-clock time.
    pub fn new(config: SimulatorConfig) -> ConfigResult<Self> {
        Self::with_clock(config, SystemClock)
    }

    pub fn with_clock(config: SimulatorConfig, clock: impl Clock + 'static) -> ConfigResult<Self> {
        config.validate()?;
        Ok(Self {
            rng: RandomStream::new(config.seed),
            config,
            clock: Box::new(clock),
            last_ts: None,
            stats: SimulatorStats::default(),
        })
    }

    pub fn config(&self) -> &SimulatorConfig {
        &self.config
    }

    pub fn stats(&self) -> SimulatorStats {
        self.stats
    }

    /// One nominal batch of `tx_per_second` events (bursts still apply).
    pub fn generate_step(&mut self) -> Vec<TransactionEvent> {
        self.generate_batch(self.config.tx_per_second)
    }

    /// Generate `n` events, or `n * BURST_MULTIPLIER` when this call bursts.
    /// `n == 0` is legal and yields an empty batch.
    pub fn generate_batch(&mut self, n: usize) -> Vec<TransactionEvent> {
        let burst = self.rng.bernoulli(self.config.burst_prob);
        let count = if burst { n * BURST_MULTIPLIER } else { n };

        let mut out = Vec::with_capacity(count);
        for _ in 0..count {
            out.push(self.next_event());
        }

        self.stats.batches += 1;
        self.stats.events += count as u64;
        if burst {
            self.stats.bursts += 1;
        }
        debug!(requested = n, generated = count, burst, "generated batch");
        out
    }

    fn next_event(&mut self) -> TransactionEvent {
        let sender = self.rng.uniform_int(0..self.config.num_senders);
        let receiver = self.rng.uniform_int(0..self.config.num_receivers);
        let injected = self.rng.bernoulli(self.config.anomaly_prob);
        let raw = if injected {
            self.rng.log_normal(ANOMALY_LOG_MEAN, ANOMALY_LOG_STD)
        } else {
            self.rng.log_normal(BASELINE_LOG_MEAN, BASELINE_LOG_STD)
        };
        let amount = ((raw * 100.0).round() / 100.0).max(MIN_AMOUNT);
        let tx_id = self.rng.uuid();

        // never step backwards, even if the wall clock does
        let mut timestamp = self.clock.now();
        if let Some(last) = self.last_ts {
            if timestamp < last {
                timestamp = last;
            }
        }
        self.last_ts = Some(timestamp);

        if injected {
            self.stats.injected += 1;
        }

        TransactionEvent {
            tx_id,
            timestamp,
            sender_id: sender_id(sender),
            receiver_id: receiver_id(receiver),
            amount,
            injected,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use chrono::{Duration, TimeZone};

    fn config() -> SimulatorConfig {
        SimulatorConfig {
            seed: 42,
            tx_per_second: 10,
            num_senders: 3,
            num_receivers: 4,
            burst_prob: 0.0,
            anomaly_prob: 0.1,
        }
    }

    #[test]
    fn rejects_invalid_config() {
        let mut c = config();
        c.anomaly_prob = -0.1;
        assert!(TxSimulator::new(c).is_err());
        let mut c = config();
        c.tx_per_second = 0;
        assert!(TxSimulator::new(c).is_err());
    }

    #[test]
    fn ids_come_from_pools() {
        let mut sim = TxSimulator::new(config()).unwrap();
        for e in sim.generate_batch(500) {
            assert!(["S0000", "S0001", "S0002"].contains(&e.sender_id.as_str()));
            assert!(e.receiver_id.starts_with('R'));
            assert!(e.receiver_id.as_str() < "R0004");
        }
    }

    #[test]
    fn burst_always_scales() {
        let mut c = config();
        c.burst_prob = 1.0;
        let mut sim = TxSimulator::new(c).unwrap();
        assert_eq!(sim.generate_batch(5).len(), 5 * BURST_MULTIPLIER);
        assert_eq!(sim.generate_batch(0).len(), 0);
        assert_eq!(sim.stats().bursts, 2);
    }

    #[test]
    fn step_uses_tx_per_second() {
        let mut sim = TxSimulator::new(config()).unwrap();
        assert_eq!(sim.generate_step().len(), 10);
        assert_eq!(sim.stats().batches, 1);
        assert_eq!(sim.stats().events, 10);
    }

    #[test]
    fn manual_clock_timestamps() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 23, 59, 59).unwrap();
        let clock = ManualClock::new(start, Duration::milliseconds(100));
        let mut sim = TxSimulator::with_clock(config(), clock).unwrap();
        let batch = sim.generate_batch(3);
        assert_eq!(batch[0].timestamp, start);
        assert_eq!(batch[2].timestamp, start + Duration::milliseconds(200));
    }
}
