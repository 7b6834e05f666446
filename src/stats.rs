//! Shared streaming statistics and scaling helpers.

use serde::{Deserialize, Serialize};

/// Running mean and variance over a stream using Welford's one-pass update.
///
/// `sum_of_squared_deviations / count` is the biased (population) variance
/// at every count; the raw observations are never retained.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    sum_of_squared_deviations: f64,
}

impl RunningStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }

    pub fn sum_of_squared_deviations(&self) -> f64 {
        self.sum_of_squared_deviations
    }

    /// Fold one observation in.
    pub fn update(&mut self, x: f64) {
        self.count += 1;
        let delta = x - self.mean;
        self.mean += delta / self.count as f64;
        let delta2 = x - self.mean;
        self.sum_of_squared_deviations += delta * delta2;
        // rounding can leave a tiny negative residue when all values are equal
        if self.sum_of_squared_deviations < 0.0 {
            self.sum_of_squared_deviations = 0.0;
        }
    }

    /// Population variance; 0.0 before any observation.
    pub fn variance(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum_of_squared_deviations / self.count as f64
        }
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }
}

/// Map `value` from `[min, max]` into `[0, 1]`, clamping outside values.
/// NaN lands on the midpoint so downstream comparisons stay defined.
pub fn scale_unit(value: f64, min: f64, max: f64) -> f64 {
    if value.is_nan() {
        return 0.5;
    }
    ((value - min) / (max - min)).clamp(0.0, 1.0)
}
