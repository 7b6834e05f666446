//! One explicitly owned pipeline: simulator → featurizer → model.

use crate::clock::{Clock, SystemClock};
use crate::config::AppConfig;
use crate::error::{ConfigResult, ContractResult};
use crate::features::{FeatureVector, Featureizer, TxMetadata};
use crate::model::OnlineAnomalyModel;
use crate::simulator::{TransactionEvent, TxSimulator};
use serde::Serialize;
use tracing::{debug, info};

/// Event fields, features and score for one transaction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredRecord {
    #[serde(flatten)]
    pub meta: TxMetadata,
    #[serde(flatten)]
    pub features: FeatureVector,
    pub score: f64,
}

impl ScoredRecord {
    pub fn hour_of_day(&self) -> Option<f64> {
        self.features.hour_of_day()
    }

    pub fn sender_amount_zscore(&self) -> Option<f64> {
        self.features.sender_amount_zscore()
    }
}

type ClockFactory = Box<dyn Fn() -> Box<dyn Clock> + Send>;

pub struct Pipeline {
    config: AppConfig,
    clock_factory: ClockFactory,
    simulator: TxSimulator,
    featurizer: Featureizer,
    model: OnlineAnomalyModel,
}

impl Pipeline {
    pub fn new(config: AppConfig) -> ConfigResult<Self> {
        Self::with_clock(config, SystemClock)
    }

    /// `clock` is cloned fresh on every reset, so a manual clock restarts
    /// from its original instant.
    pub fn with_clock<C>(config: AppConfig, clock: C) -> ConfigResult<Self>
    where
        C: Clock + Clone + 'static,
    {
        config.validate()?;
        let clock_factory: ClockFactory = Box::new(move || Box::new(clock.clone()) as Box<dyn Clock>);
        let (simulator, featurizer, model) = build(&config, &clock_factory)?;
        Ok(Self {
            config,
            clock_factory,
            simulator,
            featurizer,
            model,
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn simulator(&self) -> &TxSimulator {
        &self.simulator
    }

    pub fn featurizer(&self) -> &Featureizer {
        &self.featurizer
    }

    pub fn model(&self) -> &OnlineAnomalyModel {
        &self.model
    }

    /// Generate one nominal batch and score it.
    pub fn step(&mut self) -> ContractResult<Vec<ScoredRecord>> {
        let batch = self.simulator.generate_step();
        self.score_batch(&batch)
    }

    /// Transform and score `events` in order. An empty slice gives an empty
    /// result.
    pub fn score_batch(&mut self, events: &[TransactionEvent]) -> ContractResult<Vec<ScoredRecord>> {
        let mut out = Vec::with_capacity(events.len());
        for event in events {
            out.push(self.score_event(event)?);
        }
        debug!(count = out.len(), "scored batch");
        Ok(out)
    }

    pub fn score_event(&mut self, event: &TransactionEvent) -> ContractResult<ScoredRecord> {
        let (features, meta) = self.featurizer.transform(event);
        let score = self.model.score(&features)?;
        Ok(ScoredRecord {
            meta,
            features,
            score,
        })
    }

    /// Rebuild every component from the stored configuration; the next steps
    /// replay the run from its start.
    pub fn reset(&mut self) -> ConfigResult<()> {
        let (simulator, featurizer, model) = build(&self.config, &self.clock_factory)?;
        self.simulator = simulator;
        self.featurizer = featurizer;
        self.model = model;
        info!(seed = self.config.simulator.seed, "pipeline reset");
        Ok(())
    }
}

fn build(
    config: &AppConfig,
    clock_factory: &ClockFactory,
) -> ConfigResult<(TxSimulator, Featureizer, OnlineAnomalyModel)> {
    let simulator = TxSimulator::with_clock(config.simulator.clone(), clock_factory())?;
    let featurizer = Featureizer::new();
    let model = OnlineAnomalyModel::new(config.model.clone(), config.simulator.seed)?;
    Ok((simulator, featurizer, model))
}
