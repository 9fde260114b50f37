use serde::{Deserialize, Serialize};

use super::neuron::NeuronId;

/// Ordered group of neurons.
///
/// Position matters: bias neurons sit at index 0 and input/output vectors
/// bind to neurons in layer order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Layer {
    neurons: Vec<NeuronId>,
}

impl Layer {
    pub fn neurons(&self) -> &[NeuronId] {
        &self.neurons
    }

    pub fn neuron_at(&self, index: usize) -> Option<NeuronId> {
        self.neurons.get(index).copied()
    }

    pub fn neurons_num(&self) -> usize {
        self.neurons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.neurons.is_empty()
    }

    pub fn contains(&self, id: NeuronId) -> bool {
        self.neurons.contains(&id)
    }

    pub(crate) fn push(&mut self, id: NeuronId) {
        self.neurons.push(id);
    }

    /// Insert at `position`, clamped to the end of the layer
    pub(crate) fn insert(&mut self, position: usize, id: NeuronId) {
        let position = position.min(self.neurons.len());
        self.neurons.insert(position, id);
    }
}
