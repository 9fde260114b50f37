//! Error-correction learning.
//!
//! [`ErrorCorrectionLearning`] drives epochs over a [`TrainingSet`]: forward
//! pass, output error (`target - actual`), backward weight update, squared
//! error accumulation, then stop-condition evaluation at each epoch boundary.
//! How the error reaches the weights is delegated to an [`ErrorPropagation`]
//! strategy:
//! * [`Lms`] (delta rule): output neurons only, no derivative needed.
//! * [`GeneralizedDelta`] (backpropagation): output and hidden
//!   error-tracking neurons, derivative-weighted.
pub mod backpropagation;
pub mod delta_rule;
pub mod event;
pub mod stop;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::data::TrainingSet;
use crate::error::{Result, SannError};
use crate::network::{Network, NeuronId};

#[cfg(feature = "cli")]
use clap::ValueEnum;

pub use backpropagation::GeneralizedDelta;
pub use delta_rule::Lms;
pub use event::{LearningEvent, LearningEventKind, LearningObserver};
pub use stop::{ErrorDecreases, MaximumEpoch, MaximumError, StopCondition, StopConditions};

/// Delta rule (LMS) learner
pub type DeltaRule = ErrorCorrectionLearning<Lms>;
/// Backpropagation learner
pub type Backpropagation = ErrorCorrectionLearning<GeneralizedDelta>;

/// How the per-pattern squared errors of one epoch become the total network error
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "cli", derive(ValueEnum))]
pub enum ErrorMetric {
    /// `Σ e² / (patterns * outputs)`
    #[default]
    MeanSquared,
    /// `Σ e²`
    SumSquared,
}

impl ErrorMetric {
    pub fn aggregate(self, squared_sum: f64, patterns: usize, outputs: usize) -> f64 {
        match self {
            ErrorMetric::MeanSquared => squared_sum / (patterns * outputs).max(1) as f64,
            ErrorMetric::SumSquared => squared_sum,
        }
    }
}

/// How batch mode folds the accumulated per-synapse deltas at epoch end
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "cli", derive(ValueEnum))]
pub enum BatchReduction {
    /// Divide by the number of patterns presented
    #[default]
    Average,
    Sum,
}

/// Observable learning state, read by stop conditions and observers
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LearningState {
    /// Completed epochs in the current run
    pub current_epoch: usize,
    /// Error of the last completed epoch
    pub total_network_error: f64,
    /// Error of the epoch before that
    pub previous_epoch_error: f64,
    pub learning_rate: f64,
    pub batch_mode: bool,
}

impl LearningState {
    fn new(learning_rate: f64, batch_mode: bool) -> Self {
        Self {
            current_epoch: 0,
            total_network_error: 0.0,
            previous_epoch_error: 0.0,
            learning_rate,
            batch_mode,
        }
    }

    fn restart(&mut self) {
        self.current_epoch = 0;
        self.total_network_error = 0.0;
        self.previous_epoch_error = 0.0;
    }
}

/// Result of a completed training run
#[derive(Debug, Clone, PartialEq)]
pub struct LearningOutcome {
    pub epochs: usize,
    pub total_network_error: f64,
    pub previous_epoch_error: f64,
    /// Index of the stop condition that ended training
    pub stopped_by: usize,
}

/// Applies `Δw = learning_rate * δ * presynaptic_output` to a neuron's input
/// synapses, either immediately (online) or into a per-synapse accumulator
/// flushed at epoch end (batch).
#[derive(Debug, Clone)]
pub struct WeightUpdater {
    learning_rate: f64,
    batch_mode: bool,
    pending: Vec<f64>,
}

impl WeightUpdater {
    fn new(learning_rate: f64, batch_mode: bool) -> Self {
        Self {
            learning_rate,
            batch_mode,
            pending: Vec::new(),
        }
    }

    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    pub fn update_neuron_weights(&mut self, network: &mut Network, neuron: NeuronId, delta: f64) {
        let inputs = network.neurons()[neuron.index()].input_synapses().to_vec();
        for synapse_id in inputs {
            let presynaptic = network.synapses()[synapse_id.index()].presynaptic();
            let x = network.neurons()[presynaptic.index()].output();
            let dw = self.learning_rate * delta * x;
            if self.batch_mode {
                self.pending[synapse_id.index()] += dw;
            } else {
                network.adjust_weight(synapse_id, dw);
            }
        }
    }

    fn begin_epoch(&mut self, synapses: usize) {
        if self.batch_mode {
            self.pending.clear();
            self.pending.resize(synapses, 0.0);
        }
    }

    fn apply_pending(&mut self, network: &mut Network, patterns: usize, reduction: BatchReduction) {
        if !self.batch_mode || patterns == 0 {
            return;
        }
        let scale = match reduction {
            BatchReduction::Average => 1.0 / patterns as f64,
            BatchReduction::Sum => 1.0,
        };
        for (i, &dw) in self.pending.iter().enumerate() {
            network.adjust_weight(crate::network::SynapseId(i), dw * scale);
        }
    }
}

/// Strategy turning one pattern's output error into weight updates
pub trait ErrorPropagation {
    /// Checked once before any epoch runs
    fn validate(&self, network: &Network) -> Result<()>;

    /// Called after the forward pass of each pattern
    fn propagate(&self, network: &mut Network, output_error: &[f64], updater: &mut WeightUpdater);
}

/// Epoch driver shared by the delta rule and backpropagation.
///
/// Owns its network for the duration of training; [`into_network`](Self::into_network)
/// hands the trained graph back.
#[derive(Debug, Clone)]
pub struct ErrorCorrectionLearning<R> {
    network: Network,
    rule: R,
    state: LearningState,
    updater: WeightUpdater,
    batch_reduction: BatchReduction,
    error_metric: ErrorMetric,
}

impl<R: ErrorPropagation + Default> ErrorCorrectionLearning<R> {
    pub fn new(network: Network, learning_rate: f64, batch_mode: bool) -> Result<Self> {
        Self::with_rule(network, R::default(), learning_rate, batch_mode)
    }
}

impl<R: ErrorPropagation> ErrorCorrectionLearning<R> {
    pub fn with_rule(
        network: Network,
        rule: R,
        learning_rate: f64,
        batch_mode: bool,
    ) -> Result<Self> {
        if !(learning_rate.is_finite() && learning_rate > 0.0) {
            return Err(SannError::InvalidLearningRate(learning_rate));
        }
        Ok(Self {
            network,
            rule,
            state: LearningState::new(learning_rate, batch_mode),
            updater: WeightUpdater::new(learning_rate, batch_mode),
            batch_reduction: BatchReduction::default(),
            error_metric: ErrorMetric::default(),
        })
    }

    pub fn with_batch_reduction(mut self, reduction: BatchReduction) -> Self {
        self.batch_reduction = reduction;
        self
    }

    pub fn with_error_metric(mut self, metric: ErrorMetric) -> Self {
        self.error_metric = metric;
        self
    }

    pub fn state(&self) -> &LearningState {
        &self.state
    }

    pub fn current_epoch(&self) -> usize {
        self.state.current_epoch
    }

    pub fn total_network_error(&self) -> f64 {
        self.state.total_network_error
    }

    pub fn previous_epoch_error(&self) -> f64 {
        self.state.previous_epoch_error
    }

    pub fn learning_rate(&self) -> f64 {
        self.state.learning_rate
    }

    pub fn network(&self) -> &Network {
        &self.network
    }

    pub fn network_mut(&mut self) -> &mut Network {
        &mut self.network
    }

    pub fn into_network(self) -> Network {
        self.network
    }

    /// Train until one of `stop` is reached
    pub fn learn(
        &mut self,
        set: &dyn TrainingSet,
        stop: &StopConditions,
    ) -> Result<LearningOutcome> {
        self.learn_with_observer(set, stop, &mut ())
    }

    /// Train until one of `stop` is reached, notifying `observer` before the
    /// first epoch and after the last one.
    pub fn learn_with_observer(
        &mut self,
        set: &dyn TrainingSet,
        stop: &StopConditions,
        observer: &mut dyn LearningObserver,
    ) -> Result<LearningOutcome> {
        if stop.is_empty() {
            return Err(SannError::MissingStopCondition);
        }
        self.validate(set)?;
        self.state.restart();

        info!(
            patterns = set.len(),
            learning_rate = self.state.learning_rate,
            batch_mode = self.state.batch_mode,
            synapses = self.network.synapses_num(),
            "Learning started"
        );
        observer.on_event(&LearningEvent::new(
            LearningEventKind::InitLearning,
            &self.state,
            &self.network,
        ));

        let stopped_by = loop {
            let error = self.epoch(set)?;
            if !error.is_finite() {
                warn!(epoch = self.state.current_epoch, "Network error is no longer finite");
            }
            debug!(epoch = self.state.current_epoch, error, "Epoch completed");
            if let Some(index) = stop.first_reached(&self.state) {
                break index;
            }
        };

        observer.on_event(&LearningEvent::new(
            LearningEventKind::CompleteLearning,
            &self.state,
            &self.network,
        ));
        info!(
            epochs = self.state.current_epoch,
            error = self.state.total_network_error,
            stopped_by = ?stop.get(stopped_by),
            "Learning completed"
        );

        Ok(LearningOutcome {
            epochs: self.state.current_epoch,
            total_network_error: self.state.total_network_error,
            previous_epoch_error: self.state.previous_epoch_error,
            stopped_by,
        })
    }

    /// Run a single validated epoch outside of [`learn`](Self::learn).
    /// Returns the epoch's total network error.
    pub fn run_epoch(&mut self, set: &dyn TrainingSet) -> Result<f64> {
        self.validate(set)?;
        self.epoch(set)
    }

    fn validate(&self, set: &dyn TrainingSet) -> Result<()> {
        if set.is_empty() {
            return Err(SannError::EmptyTrainingSet);
        }
        if self.network.input_size() == 0 || self.network.output_size() == 0 {
            return Err(SannError::InvalidTopology(
                "network has no bound input or output neurons".into(),
            ));
        }
        if set.input_size() != self.network.input_size() {
            return Err(SannError::DimensionMismatch {
                expected: self.network.input_size(),
                actual: set.input_size(),
            });
        }
        if set.output_size() != self.network.output_size() {
            return Err(SannError::DimensionMismatch {
                expected: self.network.output_size(),
                actual: set.output_size(),
            });
        }
        // Widths are checked before any weight moves; sets built outside
        // `SupervisedSet::add_pattern` are not trusted.
        for pattern in set.patterns() {
            if pattern.input.len() != set.input_size() {
                return Err(SannError::DimensionMismatch {
                    expected: set.input_size(),
                    actual: pattern.input.len(),
                });
            }
            if pattern.target.len() != set.output_size() {
                return Err(SannError::DimensionMismatch {
                    expected: set.output_size(),
                    actual: pattern.target.len(),
                });
            }
        }
        self.rule.validate(&self.network)
    }

    fn epoch(&mut self, set: &dyn TrainingSet) -> Result<f64> {
        let outputs = self.network.output_size();
        let mut squared_sum = 0.0;
        let mut patterns = 0;

        self.updater.begin_epoch(self.network.synapses_num());
        for pattern in set.patterns() {
            if pattern.target.len() != outputs {
                return Err(SannError::DimensionMismatch {
                    expected: outputs,
                    actual: pattern.target.len(),
                });
            }
            let actual = self.network.activate(&pattern.input)?;
            let output_error: Vec<f64> = pattern
                .target
                .iter()
                .zip(&actual)
                .map(|(target, y)| target - y)
                .collect();
            squared_sum += output_error.iter().map(|e| e * e).sum::<f64>();
            self.rule
                .propagate(&mut self.network, &output_error, &mut self.updater);
            patterns += 1;
        }
        self.updater
            .apply_pending(&mut self.network, patterns, self.batch_reduction);

        self.state.previous_epoch_error = self.state.total_network_error;
        self.state.total_network_error = self.error_metric.aggregate(squared_sum, patterns, outputs);
        self.state.current_epoch += 1;
        Ok(self.state.total_network_error)
    }
}
