//! Feedforward neural networks as explicit neuron/synapse graphs.
//!
//! Networks are layered arenas of neurons connected by weighted synapses
//! ([`network`]), built by hand or through [`NetworkBuilder`]. Forward
//! activation walks the layers in order; supervised training runs the delta
//! rule or backpropagation ([`learning`]) over a [`TrainingSet`] until a stop
//! condition is reached.
//!
//! ```no_run
//! use sann_core::{
//!     ActivationFunction, Backpropagation, MaximumEpoch, MaximumError, NetworkBuilder,
//!     StopConditions, SupervisedSet, UniformDistribution,
//! };
//!
//! # fn main() -> sann_core::Result<()> {
//! let mut net = NetworkBuilder::mlp(2, &[3], 1)
//!     .with_bias(true)
//!     .with_activation(ActivationFunction::sigmoid())
//!     .build()?;
//! net.initialize_weights(&mut UniformDistribution::with_seed(-0.5, 0.5, 1));
//!
//! let mut xor = SupervisedSet::new(2, 1);
//! xor.add(&[0.0, 0.0], &[0.0])?;
//! xor.add(&[0.0, 1.0], &[1.0])?;
//! xor.add(&[1.0, 0.0], &[1.0])?;
//! xor.add(&[1.0, 1.0], &[0.0])?;
//!
//! let stop = StopConditions::new()
//!     .with(MaximumError::new(0.01))
//!     .with(MaximumEpoch::new(10_000));
//! let mut rule = Backpropagation::new(net, 0.7, false)?;
//! rule.learn(&xor, &stop)?;
//! let trained = rule.into_network();
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod data;
pub mod error;
pub mod function;
pub mod learning;
pub mod network;

pub use config::{SannConfig, TrainingConfig};
pub use data::{SupervisedPattern, SupervisedSet, TrainingSet};
pub use error::{Result, SannError};
pub use function::{
    ActivationFunction, ConstantWeight, InputFunction, UniformDistribution, WeightInitializer,
};
pub use learning::{
    Backpropagation, BatchReduction, DeltaRule, ErrorCorrectionLearning, ErrorDecreases,
    ErrorMetric, LearningEvent, LearningEventKind, LearningObserver, LearningOutcome,
    LearningState, MaximumEpoch, MaximumError, StopCondition, StopConditions,
};
pub use network::{Network, NetworkBuilder, NeuronId, NeuronKind, SynapseId};
