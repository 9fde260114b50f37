use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, SannError};
use crate::function::UniformDistribution;
use crate::learning::{
    BatchReduction, ErrorDecreases, ErrorMetric, MaximumEpoch, MaximumError, StopConditions,
};
use crate::network::{Network, NetworkBuilder};

#[cfg(feature = "cli")]
use clap::Args;

/// Training hyperparameters and stop criteria
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(Args))]
pub struct TrainingConfig {
    #[serde(default = "default_learning_rate")]
    #[cfg_attr(feature = "cli", arg(long, default_value_t = default_learning_rate()))]
    pub learning_rate: f64,

    /// Accumulate weight changes over the epoch instead of per pattern
    #[serde(default)]
    #[cfg_attr(feature = "cli", arg(long))]
    pub batch_mode: bool,

    #[serde(default)]
    #[cfg_attr(feature = "cli", arg(long, value_enum, default_value_t = BatchReduction::Average))]
    pub batch_reduction: BatchReduction,

    #[serde(default)]
    #[cfg_attr(feature = "cli", arg(long, value_enum, default_value_t = ErrorMetric::MeanSquared))]
    pub error_metric: ErrorMetric,

    #[serde(default = "default_max_epochs")]
    #[cfg_attr(feature = "cli", arg(long, default_value_t = default_max_epochs()))]
    pub max_epochs: usize,

    /// Stop once the network error is at or below this value
    #[serde(default)]
    #[cfg_attr(feature = "cli", arg(long))]
    pub max_error: Option<f64>,

    /// Stop once the error changes by less than this between epochs
    #[serde(default)]
    #[cfg_attr(feature = "cli", arg(long))]
    pub min_error_change: Option<f64>,

    #[serde(default = "default_init_min")]
    #[cfg_attr(feature = "cli", arg(long, default_value_t = default_init_min(), allow_hyphen_values = true))]
    pub init_min: f64,

    #[serde(default = "default_init_max")]
    #[cfg_attr(feature = "cli", arg(long, default_value_t = default_init_max()))]
    pub init_max: f64,

    /// Seed for weight initialization; entropy when absent
    #[serde(default)]
    #[cfg_attr(feature = "cli", arg(long))]
    pub seed: Option<u64>,
}

fn default_learning_rate() -> f64 {
    0.1
}
fn default_max_epochs() -> usize {
    1000
}
fn default_init_min() -> f64 {
    -0.5
}
fn default_init_max() -> f64 {
    0.5
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            learning_rate: default_learning_rate(),
            batch_mode: false,
            batch_reduction: BatchReduction::default(),
            error_metric: ErrorMetric::default(),
            max_epochs: default_max_epochs(),
            max_error: None,
            min_error_change: None,
            init_min: default_init_min(),
            init_max: default_init_max(),
            seed: None,
        }
    }
}

impl TrainingConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(SannError::InvalidLearningRate(self.learning_rate));
        }
        if !(self.init_min.is_finite() && self.init_max.is_finite() && self.init_min < self.init_max) {
            return Err(SannError::Config(format!(
                "weight range [{}, {}) is empty",
                self.init_min, self.init_max
            )));
        }
        Ok(())
    }

    /// Stop conditions in precedence order: error target, error plateau, epoch cap
    pub fn stop_conditions(&self) -> StopConditions {
        let mut stop = StopConditions::new();
        if let Some(threshold) = self.max_error {
            stop.push(MaximumError::new(threshold));
        }
        if let Some(min_change) = self.min_error_change {
            stop.push(ErrorDecreases::new(min_change));
        }
        stop.push(MaximumEpoch::new(self.max_epochs));
        stop
    }

    pub fn weight_initializer(&self) -> UniformDistribution {
        match self.seed {
            Some(seed) => UniformDistribution::with_seed(self.init_min, self.init_max, seed),
            None => UniformDistribution::new(self.init_min, self.init_max),
        }
    }
}

/// Top-level configuration: what to build and how to train it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SannConfig {
    pub network: NetworkBuilder,
    #[serde(default)]
    pub training: TrainingConfig,
}

impl SannConfig {
    pub fn new(network: NetworkBuilder) -> Self {
        Self {
            network,
            training: TrainingConfig::default(),
        }
    }

    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Self = toml::from_str(s)?;
        config.training.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path.as_ref())?;
        let config = Self::from_toml_str(&contents)?;
        debug!(path = %path.as_ref().display(), "Configuration loaded");
        Ok(config)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path.as_ref(), self.to_toml_string()?)?;
        debug!(path = %path.as_ref().display(), "Configuration saved");
        Ok(())
    }

    /// Build the configured network with freshly initialized weights
    pub fn build_network(&self) -> Result<Network> {
        self.training.validate()?;
        let mut network = self.network.build()?;
        network.initialize_weights(&mut self.training.weight_initializer());
        Ok(network)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::function::ActivationFunction;
    use crate::learning::StopCondition;

    #[test]
    fn test_minimal_toml_uses_defaults() {
        let config = SannConfig::from_toml_str(
            r#"
            [network]
            inputs = 2
            hiddens = [3]
            outputs = 1
            "#,
        )
        .unwrap();
        assert_eq!(config.training, TrainingConfig::default());
        assert_eq!(config.network.activation, None);
        assert!(config.build_network().is_err());
    }

    #[test]
    fn test_full_toml() {
        let config = SannConfig::from_toml_str(
            r#"
            [network]
            architecture = "perceptron"
            inputs = 2
            outputs = 1
            bias = true

            [network.activation]
            type = "hard_limit"

            [training]
            learning_rate = 0.25
            batch_mode = true
            batch_reduction = "sum"
            error_metric = "sum_squared"
            max_epochs = 50
            max_error = 0.0
            seed = 7
            "#,
        )
        .unwrap();
        assert_eq!(config.network.activation, Some(ActivationFunction::HardLimit));
        assert_eq!(config.training.batch_reduction, BatchReduction::Sum);
        assert_eq!(config.training.error_metric, ErrorMetric::SumSquared);

        let stop = config.training.stop_conditions();
        assert_eq!(stop.len(), 2);
        let net = config.build_network().unwrap();
        assert_eq!(net.synapses_num(), 3);
        assert!(net.weights().iter().all(|w| (-0.5..0.5).contains(w)));
    }

    #[test]
    fn test_invalid_learning_rate_rejected() {
        let result = SannConfig::from_toml_str(
            r#"
            [network]
            inputs = 1
            outputs = 1
            [training]
            learning_rate = -1.0
            "#,
        );
        assert!(matches!(result, Err(SannError::InvalidLearningRate(_))));
    }

    #[test]
    fn test_stop_conditions_always_bounded() {
        let training = TrainingConfig {
            min_error_change: Some(1e-4),
            ..TrainingConfig::default()
        };
        let stop = training.stop_conditions();
        assert_eq!(stop.len(), 2);
        assert!(!stop.is_empty());
        let capped = crate::learning::LearningState {
            current_epoch: 1000,
            total_network_error: 1.0,
            previous_epoch_error: 2.0,
            learning_rate: 0.1,
            batch_mode: false,
        };
        assert!(stop.is_reached(&capped));
    }

    #[test]
    fn test_seeded_initializer_is_reproducible() {
        let config = SannConfig {
            training: TrainingConfig {
                seed: Some(42),
                ..TrainingConfig::default()
            },
            ..SannConfig::new(
                NetworkBuilder::mlp(2, &[2], 1).with_activation(ActivationFunction::sigmoid()),
            )
        };
        let a = config.build_network().unwrap();
        let b = config.build_network().unwrap();
        assert_eq!(a.weights(), b.weights());
    }
}
