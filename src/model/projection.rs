//! Random-projection envelope: a unit direction over the scaled features and
//! a running mean/variance of points projected onto it.

use crate::random::RandomStream;
use crate::stats::RunningStats;

const MIN_STD: f64 = 1e-6;

#[derive(Debug, Clone)]
pub struct ProjectionEnvelope {
    direction: Vec<f64>,
    stats: RunningStats,
}

impl ProjectionEnvelope {
    pub fn new(dims: usize, rng: &mut RandomStream) -> Self {
        let dims = dims.max(1);
        let mut direction: Vec<f64> = (0..dims).map(|_| rng.normal(0.0, 1.0)).collect();
        let norm = direction.iter().map(|w| w * w).sum::<f64>().sqrt();
        if norm > 0.0 {
            direction.iter_mut().for_each(|w| *w /= norm);
        } else {
            direction[0] = 1.0;
        }
        Self {
            direction,
            stats: RunningStats::new(),
        }
    }

    fn project(&self, point: &[f64]) -> f64 {
        self.direction
            .iter()
            .zip(point)
            .map(|(w, x)| w * x)
            .sum()
    }

    /// `1 - exp(-d^2 / 2)` for a projected distance of `d` standard
    /// deviations. 0.0 until two points have been seen.
    pub fn score(&self, point: &[f64]) -> f64 {
        if self.stats.count() < 2 {
            return 0.0;
        }
        let d = (self.project(point) - self.stats.mean()) / self.stats.std_dev().max(MIN_STD);
        (1.0 - (-0.5 * d * d).exp()).clamp(0.0, 1.0)
    }

    pub fn learn(&mut self, point: &[f64]) {
        let p = self.project(point);
        self.stats.update(p);
    }
}
