use thiserror::Error;

use crate::network::{NeuronId, SynapseId};

/// Errors raised while building, activating, training or persisting a network.
///
/// Every variant is a fail-fast validation: the operation that returns it has
/// not mutated the graph or the learning state.
#[derive(Debug, Error)]
pub enum SannError {
    #[error("invalid topology: {0}")]
    InvalidTopology(String),

    #[error("dimension mismatch: expected {expected} values, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("learning rate must be a positive finite number, got {0}")]
    InvalidLearningRate(f64),

    #[error("training set contains no patterns")]
    EmptyTrainingSet,

    #[error("at least one stop condition is required to bound training")]
    MissingStopCondition,

    #[error("neuron {0} uses an activation function without a derivative")]
    UndefinedDerivative(NeuronId),

    #[error("output neuron {0} does not track error")]
    ErrorTrackingRequired(NeuronId),

    #[error("unknown neuron {0}")]
    UnknownNeuron(NeuronId),

    #[error("unknown synapse {0}")]
    UnknownSynapse(SynapseId),

    #[error("layer index {index} out of range ({len} layers)")]
    UnknownLayer { index: usize, len: usize },

    #[error("neuron {0} cannot receive input synapses")]
    InvalidEndpoint(NeuronId),

    #[error("expected {expected} weights, got {actual}")]
    WeightCountMismatch { expected: usize, actual: usize },

    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Toml(#[from] toml::de::Error),

    #[error(transparent)]
    TomlSerialize(#[from] toml::ser::Error),
}

pub type Result<T> = std::result::Result<T, SannError>;
