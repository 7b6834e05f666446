//! Error taxonomy. Both kinds are raised once at the boundary and propagate;
//! nothing in the core retries.

use thiserror::Error;

/// Invalid construction parameters or an unreadable configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} must be a probability in [0, 1], got {value}")]
    ProbabilityOutOfRange { name: &'static str, value: f64 },

    #[error("{name} must be greater than zero")]
    NotPositive { name: &'static str },

    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// A feature vector handed to the model does not carry a field the model
/// was configured to read. This is a caller defect.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DataContractError {
    #[error("feature vector is missing required feature `{0}`")]
    MissingFeature(String),
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

pub type ContractResult<T> = std::result::Result<T, DataContractError>;

/// Helper for the repeated `[0, 1]` probability check.
pub(crate) fn check_probability(name: &'static str, value: f64) -> ConfigResult<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::ProbabilityOutOfRange { name, value })
    }
}

pub(crate) fn check_positive(name: &'static str, value: usize) -> ConfigResult<()> {
    if value > 0 {
        Ok(())
    } else {
        Err(ConfigError::NotPositive { name })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probability_bounds() {
        assert!(check_probability("burst_prob", 0.0).is_ok());
        assert!(check_probability("burst_prob", 1.0).is_ok());
        assert!(check_probability("burst_prob", -0.01).is_err());
        assert!(check_probability("burst_prob", 1.01).is_err());
        assert!(check_probability("burst_prob", f64::NAN).is_err());
    }

    #[test]
    fn test_display() {
        let e = ConfigError::ProbabilityOutOfRange {
            name: "anomaly_prob",
            value: 1.5,
        };
        assert_eq!(
            e.to_string(),
            "anomaly_prob must be a probability in [0, 1], got 1.5"
        );
        assert_eq!(
            ConfigError::NotPositive { name: "num_senders" }.to_string(),
            "num_senders must be greater than zero"
        );
        assert_eq!(
            DataContractError::MissingFeature("hour_of_day".into()).to_string(),
            "feature vector is missing required feature `hour_of_day`"
        );
    }

    #[test]
    fn test_errors_are_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ConfigError>();
        assert_send_sync::<DataContractError>();
    }
}
