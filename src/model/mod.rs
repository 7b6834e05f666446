//! Incremental isolation-style anomaly scoring.
//!
//! The model is an ensemble of small partition structures, each exposing
//! `ingest_and_score`. A feature vector is scaled into the unit cube using
//! the configured limits, every estimator scores it against what it has seen
//! so far and then absorbs it, and the estimates are averaged. Per-call cost
//! and memory depend only on the ensemble shape, never on stream length.

mod half_space;
mod projection;

pub use half_space::HalfSpaceTree;
pub use projection::ProjectionEnvelope;

use crate::config::{ModelConfig, ScoringStrategy};
use crate::error::{ConfigResult, ContractResult, DataContractError};
use crate::features::FeatureVector;
use crate::random::{RandomStream, MODEL_STREAM};
use crate::stats::{scale_unit, RunningStats};
use tracing::info;

/// One member of the ensemble.
#[derive(Debug, Clone)]
pub enum Estimator {
    HalfSpace(HalfSpaceTree),
    Projection(ProjectionEnvelope),
}

impl Estimator {
    pub fn score(&self, point: &[f64]) -> f64 {
        match self {
            Estimator::HalfSpace(t) => t.score(point),
            Estimator::Projection(p) => p.score(point),
        }
    }

    pub fn learn(&mut self, point: &[f64]) {
        match self {
            Estimator::HalfSpace(t) => t.learn(point),
            Estimator::Projection(p) => p.learn(point),
        }
    }

    /// Score against the current state, then absorb the point.
    pub fn ingest_and_score(&mut self, point: &[f64]) -> f64 {
        let s = self.score(point);
        self.learn(point);
        s
    }
}

#[derive(Debug, Clone)]
pub struct OnlineAnomalyModel {
    config: ModelConfig,
    estimators: Vec<Estimator>,
    // running mean of every scaled input, one entry per configured feature
    centroid: Vec<RunningStats>,
    observed: u64,
}

impl OnlineAnomalyModel {
    /// Build the ensemble; tree shapes and projection directions are drawn
    /// from the model sub-stream of `seed`.
    pub fn new(config: ModelConfig, seed: u64) -> ConfigResult<Self> {
        config.validate()?;
        let mut rng = RandomStream::substream(seed, MODEL_STREAM);
        let dims = config.features.len();
        let estimators = (0..config.n_estimators)
            .map(|_| match config.strategy {
                ScoringStrategy::HalfSpace => Estimator::HalfSpace(HalfSpaceTree::new(
                    dims,
                    config.height,
                    config.window_size,
                    config.size_limit,
                    &mut rng,
                )),
                ScoringStrategy::Projection => {
                    Estimator::Projection(ProjectionEnvelope::new(dims, &mut rng))
                }
            })
            .collect();
        info!(
            strategy = ?config.strategy,
            n_estimators = config.n_estimators,
            features = dims,
            "anomaly model initialized"
        );
        Ok(Self {
            config,
            estimators,
            centroid: vec![RunningStats::new(); dims],
            observed: 0,
        })
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    /// Feature vectors absorbed so far.
    pub fn observed(&self) -> u64 {
        self.observed
    }

    pub fn estimators(&self) -> &[Estimator] {
        &self.estimators
    }

    /// The model's current notion of a typical input: the running mean of
    /// everything absorbed, mapped back to feature units. Feature minimums
    /// before the first observation.
    pub fn typical(&self) -> FeatureVector {
        self.config
            .features
            .iter()
            .zip(&self.centroid)
            .fold(FeatureVector::new(), |fv, (limit, stats)| {
                fv.with(
                    limit.name.as_str(),
                    limit.min + stats.mean() * (limit.max - limit.min),
                )
            })
    }

    /// Score in [0, 1] and absorb the vector into the ensemble.
    pub fn score(&mut self, features: &FeatureVector) -> ContractResult<f64> {
        let point = self.point(features)?;
        let total: f64 = self
            .estimators
            .iter_mut()
            .map(|e| e.ingest_and_score(&point))
            .sum();
        self.absorb(&point);
        Ok(self.normalize(total))
    }

    /// Score in [0, 1] without changing any state.
    pub fn evaluate(&self, features: &FeatureVector) -> ContractResult<f64> {
        let point = self.point(features)?;
        let total: f64 = self.estimators.iter().map(|e| e.score(&point)).sum();
        Ok(self.normalize(total))
    }

    /// Absorb the vector without scoring it.
    pub fn learn(&mut self, features: &FeatureVector) -> ContractResult<()> {
        let point = self.point(features)?;
        self.estimators.iter_mut().for_each(|e| e.learn(&point));
        self.absorb(&point);
        Ok(())
    }

    fn absorb(&mut self, point: &[f64]) {
        for (stats, &x) in self.centroid.iter_mut().zip(point) {
            stats.update(x);
        }
        self.observed += 1;
    }

    fn normalize(&self, total: f64) -> f64 {
        let s = total / self.estimators.len() as f64;
        if s.is_nan() {
            0.0
        } else {
            s.clamp(0.0, 1.0)
        }
    }

    fn point(&self, features: &FeatureVector) -> ContractResult<Vec<f64>> {
        self.config
            .features
            .iter()
            .map(|limit| {
                features
                    .get(&limit.name)
                    .map(|v| scale_unit(v, limit.min, limit.max))
                    .ok_or_else(|| DataContractError::MissingFeature(limit.name.clone()))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::{HOUR_OF_DAY, SENDER_AMOUNT_ZSCORE};

    fn fv(hour: f64, z: f64) -> FeatureVector {
        FeatureVector::new()
            .with(HOUR_OF_DAY, hour)
            .with(SENDER_AMOUNT_ZSCORE, z)
    }

    #[test]
    fn missing_feature_is_contract_error() {
        let mut model = OnlineAnomalyModel::new(ModelConfig::default(), 42).unwrap();
        let partial = FeatureVector::new().with(HOUR_OF_DAY, 3.0);
        assert_eq!(
            model.score(&partial),
            Err(DataContractError::MissingFeature(SENDER_AMOUNT_ZSCORE.into()))
        );
        assert_eq!(model.observed(), 0);
    }

    #[test]
    fn cold_start_is_zero() {
        let mut model = OnlineAnomalyModel::new(ModelConfig::default(), 42).unwrap();
        assert_eq!(model.score(&fv(3.0, 0.0)).unwrap(), 0.0);
        assert_eq!(model.score(&fv(20.0, 5.0)).unwrap(), 0.0);

        let config = ModelConfig {
            strategy: ScoringStrategy::HalfSpace,
            ..ModelConfig::default()
        };
        let window = config.window_size;
        let mut model = OnlineAnomalyModel::new(config, 42).unwrap();
        for i in 0..window {
            assert_eq!(model.score(&fv((i % 24) as f64, 0.0)).unwrap(), 0.0);
        }
    }

    #[test]
    fn typical_tracks_running_mean() {
        let mut model = OnlineAnomalyModel::new(ModelConfig::default(), 42).unwrap();
        assert_eq!(model.typical().hour_of_day(), Some(0.0));
        for (hour, z) in [(10.0, -1.0), (14.0, 1.0), (12.0, 3.0)] {
            model.learn(&fv(hour, z)).unwrap();
        }
        let typical = model.typical();
        assert!((typical.hour_of_day().unwrap() - 12.0).abs() < 1e-9);
        assert!((typical.sender_amount_zscore().unwrap() - 1.0).abs() < 1e-9);
        assert_eq!(model.observed(), 3);
    }

    #[test]
    fn default_score_rises_away_from_typical() {
        let mut model = OnlineAnomalyModel::new(ModelConfig::default(), 42).unwrap();
        let mut rng = RandomStream::new(7);
        for _ in 0..1000 {
            model.score(&fv(12.0, rng.normal(0.0, 1.0))).unwrap();
        }
        let typical = model.typical();
        let hour = typical.hour_of_day().unwrap();
        let z = typical.sender_amount_zscore().unwrap();
        for sign in [1.0, -1.0] {
            let mut previous = model.evaluate(&typical).unwrap();
            for step in 1..=60 {
                let s = model.evaluate(&fv(hour, z + sign * 0.1 * step as f64)).unwrap();
                assert!(s + 1e-12 >= previous, "z step {step} ({sign}): {previous} -> {s}");
                previous = s;
            }
        }
    }

    #[test]
    fn evaluate_does_not_mutate() {
        let mut model = OnlineAnomalyModel::new(ModelConfig::default(), 42).unwrap();
        for _ in 0..300 {
            model.score(&fv(12.0, 0.1)).unwrap();
        }
        let a = model.evaluate(&fv(3.0, 4.0)).unwrap();
        let b = model.evaluate(&fv(3.0, 4.0)).unwrap();
        assert_eq!(a.to_bits(), b.to_bits());
        assert_eq!(model.observed(), 300);
    }

    #[test]
    fn ensemble_size_is_fixed() {
        let mut model = OnlineAnomalyModel::new(ModelConfig::default(), 1).unwrap();
        for i in 0..1000 {
            model.score(&fv((i % 24) as f64, (i % 7) as f64 - 3.0)).unwrap();
        }
        assert_eq!(model.estimators().len(), 25);
    }

    #[test]
    fn invalid_config_rejected() {
        let config = ModelConfig {
            n_estimators: 0,
            ..ModelConfig::default()
        };
        assert!(OnlineAnomalyModel::new(config, 1).is_err());
    }
}
