use core::fmt;

use serde::{Deserialize, Serialize};

use super::neuron::NeuronId;

/// Stable handle into the network's synapse arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SynapseId(pub usize);

impl SynapseId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for SynapseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s{}", self.0)
    }
}

/// Directed weighted edge between two neurons.
///
/// The record is owned by the network; the presynaptic neuron lists it as an
/// output and the postsynaptic neuron lists it as an input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Synapse {
    presynaptic: NeuronId,
    postsynaptic: NeuronId,
    pub weight: f64,
}

impl Synapse {
    pub(crate) fn new(presynaptic: NeuronId, postsynaptic: NeuronId, weight: f64) -> Self {
        Self {
            presynaptic,
            postsynaptic,
            weight,
        }
    }

    pub fn presynaptic(&self) -> NeuronId {
        self.presynaptic
    }

    pub fn postsynaptic(&self) -> NeuronId {
        self.postsynaptic
    }
}

impl fmt::Display for Synapse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} -> {} (w={:.4})",
            self.presynaptic, self.postsynaptic, self.weight
        )
    }
}
