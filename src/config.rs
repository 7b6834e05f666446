//! Pipeline configuration. The six simulator keys sit at the top level of the
//! JSON document; every other section is optional and falls back to defaults.

use crate::error::{check_positive, check_probability, ConfigError, ConfigResult};
use crate::features::{HOUR_OF_DAY, SENDER_AMOUNT_ZSCORE};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Generator parameters (seed, volume, pools, burst and anomaly rates)
    #[serde(flatten)]
    pub simulator: SimulatorConfig,
    /// Online anomaly model shape
    #[serde(default)]
    pub model: ModelConfig,
    /// Scored window kept by the driver
    #[serde(default)]
    pub window: WindowConfig,
    /// Alert and status thresholds
    #[serde(default)]
    pub risk: RiskConfig,
    /// Logging
    #[serde(default)]
    pub log: LogConfig,
    /// Reference driver loop
    #[serde(default)]
    pub driver: DriverConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulatorConfig {
    pub seed: u64,
    /// Nominal events per generation call
    pub tx_per_second: usize,
    pub num_senders: usize,
    pub num_receivers: usize,
    /// Probability that a call produces a burst instead of the nominal count
    pub burst_prob: f64,
    /// Probability that an event amount comes from the anomalous distribution
    pub anomaly_prob: f64,
}

/// Which partition structure the model ensemble is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringStrategy {
    /// Streaming half-space trees. Axis-aligned mass steps mean the score is
    /// only roughly monotone in distance from the bulk.
    HalfSpace,
    /// Random projections with running mean/variance envelopes; monotone
    /// along any ray leaving the centroid
    #[default]
    Projection,
}

/// Range used to scale one input feature into [0, 1].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureLimit {
    pub name: String,
    pub min: f64,
    pub max: f64,
}

impl FeatureLimit {
    pub fn new(name: impl Into<String>, min: f64, max: f64) -> Self {
        Self {
            name: name.into(),
            min,
            max,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub strategy: ScoringStrategy,
    /// Ensemble size
    pub n_estimators: usize,
    /// Tree height (half-space strategy)
    pub height: usize,
    /// Points per mass window (half-space strategy)
    pub window_size: usize,
    /// Fraction of `window_size` below which a tree walk stops early
    pub size_limit: f64,
    /// Features the model reads, in order, with their scaling limits
    pub features: Vec<FeatureLimit>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// How much scored history the driver keeps
    pub window_seconds: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskConfig {
    /// Scores at or above this raise an alert
    pub alert_threshold: f64,
    /// Mean score at or above this is medium risk
    pub medium_threshold: f64,
    /// Mean score at or above this is high risk
    pub high_threshold: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
    pub json: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    /// Seconds between steps
    pub interval_secs: u64,
    /// Stop after this many steps; 0 runs until interrupted
    pub max_steps: u64,
    /// Write every scored record to stdout as a JSON line
    pub emit_records: bool,
}

/// Where a loaded configuration came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSource {
    File,
    /// The file was absent
    Defaults,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            simulator: SimulatorConfig::default(),
            model: ModelConfig::default(),
            window: WindowConfig::default(),
            risk: RiskConfig::default(),
            log: LogConfig::default(),
            driver: DriverConfig::default(),
        }
    }
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            tx_per_second: 10,
            num_senders: 50,
            num_receivers: 50,
            burst_prob: 0.05,
            anomaly_prob: 0.02,
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            strategy: ScoringStrategy::Projection,
            n_estimators: 25,
            height: 8,
            window_size: 128,
            size_limit: 0.1,
            features: vec![
                FeatureLimit::new(HOUR_OF_DAY, 0.0, 24.0),
                FeatureLimit::new(SENDER_AMOUNT_ZSCORE, -6.0, 6.0),
            ],
        }
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self { window_seconds: 60 }
    }
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            alert_threshold: 0.75,
            medium_threshold: 0.3,
            high_threshold: 0.7,
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: true,
        }
    }
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            interval_secs: 1,
            max_steps: 0,
            emit_records: false,
        }
    }
}

impl SimulatorConfig {
    pub fn validate(&self) -> ConfigResult<()> {
        check_positive("tx_per_second", self.tx_per_second)?;
        check_positive("num_senders", self.num_senders)?;
        check_positive("num_receivers", self.num_receivers)?;
        check_probability("burst_prob", self.burst_prob)?;
        check_probability("anomaly_prob", self.anomaly_prob)?;
        Ok(())
    }
}

impl ModelConfig {
    pub fn validate(&self) -> ConfigResult<()> {
        check_positive("model.n_estimators", self.n_estimators)?;
        check_positive("model.height", self.height)?;
        check_positive("model.window_size", self.window_size)?;
        check_probability("model.size_limit", self.size_limit)?;
        if self.window_size > u32::MAX as usize {
            return Err(ConfigError::InvalidParameter {
                name: "model.window_size",
                reason: format!("{} exceeds {}", self.window_size, u32::MAX),
            });
        }
        // 2^(height + 1) nodes per tree must stay addressable
        if self.height > 20 {
            return Err(ConfigError::InvalidParameter {
                name: "model.height",
                reason: format!("{} exceeds the maximum of 20", self.height),
            });
        }
        if self.features.is_empty() {
            return Err(ConfigError::InvalidParameter {
                name: "model.features",
                reason: "at least one feature is required".to_string(),
            });
        }
        for f in &self.features {
            if !(f.min.is_finite() && f.max.is_finite() && f.min < f.max) {
                return Err(ConfigError::InvalidParameter {
                    name: "model.features",
                    reason: format!("limits for `{}` must be finite with min < max", f.name),
                });
            }
        }
        Ok(())
    }
}

impl WindowConfig {
    pub fn validate(&self) -> ConfigResult<()> {
        if self.window_seconds == 0 {
            return Err(ConfigError::NotPositive {
                name: "window.window_seconds",
            });
        }
        Ok(())
    }
}

impl RiskConfig {
    pub fn validate(&self) -> ConfigResult<()> {
        check_probability("risk.alert_threshold", self.alert_threshold)?;
        check_probability("risk.medium_threshold", self.medium_threshold)?;
        check_probability("risk.high_threshold", self.high_threshold)?;
        if self.medium_threshold > self.high_threshold {
            return Err(ConfigError::InvalidParameter {
                name: "risk.medium_threshold",
                reason: "must not exceed risk.high_threshold".to_string(),
            });
        }
        Ok(())
    }
}

impl DriverConfig {
    pub fn validate(&self) -> ConfigResult<()> {
        // an unbounded loop needs a pause between steps
        if self.interval_secs == 0 && self.max_steps == 0 {
            return Err(ConfigError::InvalidParameter {
                name: "driver.interval_secs",
                reason: "must be greater than zero when driver.max_steps is 0".to_string(),
            });
        }
        Ok(())
    }
}

impl AppConfig {
    /// Load from a JSON file. A missing file yields the defaults; a file that
    /// exists but cannot be read, parsed or validated is an error.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        Self::load_with_source(path).map(|(config, _)| config)
    }

    /// Like [`AppConfig::load`], also reporting whether the file was used so
    /// the caller can log the fallback once logging is up.
    pub fn load_with_source(path: &Path) -> ConfigResult<(Self, ConfigSource)> {
        if !path.exists() {
            return Ok((Self::default(), ConfigSource::Defaults));
        }
        let data = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_json(&data).map_err(|e| match e {
            ConfigError::Parse { source, .. } => ConfigError::Parse {
                path: path.display().to_string(),
                source,
            },
            other => other,
        })?;
        Ok((config, ConfigSource::File))
    }

    /// Parse and validate a JSON document.
    pub fn from_json(data: &str) -> ConfigResult<Self> {
        let config: AppConfig = serde_json::from_str(data).map_err(|source| ConfigError::Parse {
            path: "<inline>".to_string(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        self.simulator.validate()?;
        self.model.validate()?;
        self.window.validate()?;
        self.risk.validate()?;
        self.driver.validate()?;
        Ok(())
    }
}
