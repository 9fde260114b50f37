//! Network graph: an arena of neurons and an arena of synapses addressed by
//! stable handles, grouped into ordered layers.
//!
//! Synapses reference neurons by [`NeuronId`]; neurons list their incident
//! synapses by [`SynapseId`] in both directions, so forward activation and
//! backward error propagation are both O(edges) without shared ownership.
pub mod layer;
pub mod neuron;
pub mod synapse;
pub mod topology;

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, SannError};
use crate::function::WeightInitializer;

pub use layer::Layer;
pub use neuron::{Neuron, NeuronId, NeuronKind, NeuronState, Processing};
pub use synapse::{Synapse, SynapseId};
pub use topology::{full_connect, Architecture, NetworkBuilder};

/// Ordered layers over a neuron/synapse arena.
///
/// Layer 0 is the input layer and the last layer is the output layer. The
/// input and output neuron sequences are cached by [`bind_boundaries`](Self::bind_boundaries)
/// so vectors bind positionally without walking the layers.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Network {
    layers: Vec<Layer>,
    neurons: Vec<Neuron>,
    synapses: Vec<Synapse>,
    input_neurons: Vec<NeuronId>,
    output_neurons: Vec<NeuronId>,
}

impl Network {
    pub fn new() -> Self {
        Self::default()
    }

    // ------------------------------------------------------------------
    // Layers and neurons
    // ------------------------------------------------------------------

    /// Append an empty layer and return its index. The new layer becomes the
    /// output layer, so the boundaries are re-bound.
    pub fn add_layer(&mut self) -> usize {
        self.layers.push(Layer::default());
        self.bind_boundaries();
        self.layers.len() - 1
    }

    pub fn layer_at(&self, index: usize) -> Option<&Layer> {
        self.layers.get(index)
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn layers_num(&self) -> usize {
        self.layers.len()
    }

    /// Create a neuron at the end of `layer`
    pub fn add_neuron(&mut self, layer: usize, kind: NeuronKind) -> Result<NeuronId> {
        let position = self.layer_checked(layer)?.neurons_num();
        self.insert_neuron(layer, position, kind)
    }

    /// Create a neuron at `position` inside `layer` (clamped to the layer end).
    /// Input and output boundaries follow the new membership.
    pub fn insert_neuron(
        &mut self,
        layer: usize,
        position: usize,
        kind: NeuronKind,
    ) -> Result<NeuronId> {
        self.layer_checked(layer)?;
        let id = NeuronId(self.neurons.len());
        self.neurons.push(Neuron::new(id, layer, kind));
        self.layers[layer].insert(position, id);
        if layer == 0 || layer + 1 == self.layers.len() {
            self.bind_boundaries();
        }
        Ok(id)
    }

    pub fn neuron(&self, id: NeuronId) -> Option<&Neuron> {
        self.neurons.get(id.0)
    }

    pub fn neurons(&self) -> &[Neuron] {
        &self.neurons
    }

    pub fn neurons_num(&self) -> usize {
        self.neurons.len()
    }

    fn layer_checked(&self, index: usize) -> Result<&Layer> {
        self.layers.get(index).ok_or(SannError::UnknownLayer {
            index,
            len: self.layers.len(),
        })
    }

    fn neuron_checked(&self, id: NeuronId) -> Result<&Neuron> {
        self.neurons.get(id.0).ok_or(SannError::UnknownNeuron(id))
    }

    pub(crate) fn neuron_mut(&mut self, id: NeuronId) -> &mut Neuron {
        &mut self.neurons[id.0]
    }

    // ------------------------------------------------------------------
    // Synapses
    // ------------------------------------------------------------------

    /// Connect `presynaptic -> postsynaptic`.
    ///
    /// Returns `Ok(None)` without touching the graph when the pair is already
    /// connected. Fails when either neuron is unknown or the postsynaptic
    /// neuron cannot receive inputs (input and bias neurons).
    pub fn connect(
        &mut self,
        presynaptic: NeuronId,
        postsynaptic: NeuronId,
        weight: f64,
    ) -> Result<Option<SynapseId>> {
        self.neuron_checked(presynaptic)?;
        if !self.neuron_checked(postsynaptic)?.accepts_input() {
            return Err(SannError::InvalidEndpoint(postsynaptic));
        }
        if self.has_connection(presynaptic, postsynaptic) {
            return Ok(None);
        }

        let id = SynapseId(self.synapses.len());
        self.synapses.push(Synapse::new(presynaptic, postsynaptic, weight));
        self.neurons[postsynaptic.0].push_input(id);
        self.neurons[presynaptic.0].push_output(id);
        Ok(Some(id))
    }

    pub fn has_connection(&self, presynaptic: NeuronId, postsynaptic: NeuronId) -> bool {
        self.synapse_from(presynaptic, postsynaptic).is_some()
    }

    /// Synapse arriving at `postsynaptic` from `presynaptic`, if any
    pub fn synapse_from(&self, presynaptic: NeuronId, postsynaptic: NeuronId) -> Option<SynapseId> {
        self.neurons
            .get(postsynaptic.0)?
            .input_synapses()
            .iter()
            .copied()
            .find(|s| self.synapses[s.0].presynaptic() == presynaptic)
    }

    pub fn synapse(&self, id: SynapseId) -> Option<&Synapse> {
        self.synapses.get(id.0)
    }

    pub fn synapses(&self) -> &[Synapse] {
        &self.synapses
    }

    pub fn synapses_num(&self) -> usize {
        self.synapses.len()
    }

    pub fn set_weight(&mut self, id: SynapseId, weight: f64) -> Result<()> {
        let synapse = self
            .synapses
            .get_mut(id.0)
            .ok_or(SannError::UnknownSynapse(id))?;
        synapse.weight = weight;
        Ok(())
    }

    /// Remove the synapse `presynaptic -> postsynaptic`. Returns `false` when
    /// the pair is not connected.
    ///
    /// The synapse arena is compacted: handles above the removed one shift
    /// down by one and [`weights`](Self::weights) keeps creation order of the
    /// surviving synapses. Previously obtained [`SynapseId`]s are stale.
    pub fn disconnect(&mut self, presynaptic: NeuronId, postsynaptic: NeuronId) -> bool {
        match self.synapse_from(presynaptic, postsynaptic) {
            Some(id) => {
                self.remove_synapse(id);
                true
            }
            None => false,
        }
    }

    /// Remove every synapse arriving at `neuron`; returns how many were removed
    pub fn disconnect_inputs(&mut self, neuron: NeuronId) -> Result<usize> {
        self.neuron_checked(neuron)?;
        let mut removed = 0;
        while let Some(&id) = self.neurons[neuron.0].input_synapses().last() {
            self.remove_synapse(id);
            removed += 1;
        }
        Ok(removed)
    }

    /// Remove every synapse arriving at or leaving `neuron`
    pub fn disconnect_all(&mut self, neuron: NeuronId) -> Result<usize> {
        let mut removed = self.disconnect_inputs(neuron)?;
        while let Some(&id) = self.neurons[neuron.0].output_synapses().last() {
            self.remove_synapse(id);
            removed += 1;
        }
        Ok(removed)
    }

    fn remove_synapse(&mut self, id: SynapseId) {
        self.synapses.remove(id.0);
        for neuron in &mut self.neurons {
            neuron.forget_synapse(id);
        }
    }

    pub(crate) fn adjust_weight(&mut self, id: SynapseId, delta: f64) {
        self.synapses[id.0].weight += delta;
    }

    /// Draw one weight per synapse, in creation order
    pub fn initialize_weights(&mut self, initializer: &mut dyn WeightInitializer) {
        for synapse in &mut self.synapses {
            synapse.weight = initializer.raffle_weight();
        }
    }

    /// Flattened weight vector in synapse creation order
    pub fn weights(&self) -> Vec<f64> {
        self.synapses.iter().map(|s| s.weight).collect()
    }

    pub fn set_weights(&mut self, weights: &[f64]) -> Result<()> {
        if weights.len() != self.synapses.len() {
            return Err(SannError::WeightCountMismatch {
                expected: self.synapses.len(),
                actual: weights.len(),
            });
        }
        for (synapse, &w) in self.synapses.iter_mut().zip(weights) {
            synapse.weight = w;
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Boundaries and activation
    // ------------------------------------------------------------------

    /// Cache the input neurons (input-kind neurons of layer 0) and the output
    /// neurons (processing neurons of the last layer), in layer order.
    ///
    /// Layer and neuron insertion already keep the cache current; this only
    /// needs calling on graphs assembled some other way.
    pub fn bind_boundaries(&mut self) {
        self.input_neurons = self
            .layers
            .first()
            .map(|l| self.neurons_where(l, Neuron::is_input))
            .unwrap_or_default();
        self.output_neurons = self
            .layers
            .last()
            .map(|l| self.neurons_where(l, Neuron::accepts_input))
            .unwrap_or_default();
    }

    fn neurons_where(&self, layer: &Layer, keep: fn(&Neuron) -> bool) -> Vec<NeuronId> {
        layer
            .neurons()
            .iter()
            .copied()
            .filter(|id| keep(&self.neurons[id.0]))
            .collect()
    }

    pub fn input_neurons(&self) -> &[NeuronId] {
        &self.input_neurons
    }

    pub fn output_neurons(&self) -> &[NeuronId] {
        &self.output_neurons
    }

    pub fn input_size(&self) -> usize {
        self.input_neurons.len()
    }

    pub fn output_size(&self) -> usize {
        self.output_neurons.len()
    }

    /// Bind `inputs` positionally onto the input neurons
    pub fn set_input(&mut self, inputs: &[f64]) -> Result<()> {
        if inputs.len() != self.input_neurons.len() {
            return Err(SannError::DimensionMismatch {
                expected: self.input_neurons.len(),
                actual: inputs.len(),
            });
        }
        for (i, &value) in inputs.iter().enumerate() {
            let id = self.input_neurons[i];
            self.neurons[id.0].set_output(value);
        }
        Ok(())
    }

    /// Forward pass: bind `inputs`, then recompute every processing neuron
    /// layer by layer. Returns the output neuron values in declared order.
    pub fn activate(&mut self, inputs: &[f64]) -> Result<Vec<f64>> {
        self.set_input(inputs)?;
        for layer in 0..self.layers.len() {
            for position in 0..self.layers[layer].neurons_num() {
                let id = self.layers[layer].neurons()[position];
                self.activate_neuron(id);
            }
        }
        Ok(self.outputs())
    }

    fn activate_neuron(&mut self, id: NeuronId) {
        let neuron = &self.neurons[id.0];
        let Some(processing) = neuron.processing().copied() else {
            return;
        };
        let field = processing
            .input_function
            .aggregate(neuron.input_synapses().iter().map(|s| {
                let synapse = &self.synapses[s.0];
                (synapse.weight, self.neurons[synapse.presynaptic().0].output())
            }));
        let output = processing.activation_function.output(field);
        self.neurons[id.0].set_activation(field, output);
    }

    /// Output neuron values from the last forward pass
    pub fn outputs(&self) -> Vec<f64> {
        self.output_neurons
            .iter()
            .map(|id| self.neurons[id.0].output())
            .collect()
    }

    /// Clear all transient neuron state
    pub fn reset(&mut self) {
        for neuron in &mut self.neurons {
            neuron.reset();
        }
    }

    // ------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Restore a graph serialized with [`to_json`](Self::to_json).
    /// Transient state starts cleared.
    pub fn from_json(json: &str) -> Result<Self> {
        let network: Network = serde_json::from_str(json)?;
        network.check_integrity()?;
        Ok(network)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        fs::write(path, self.to_json()?)?;
        debug!(
            path = %path.display(),
            neurons = self.neurons.len(),
            synapses = self.synapses.len(),
            "Network saved"
        );
        Ok(())
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let network = Self::from_json(&fs::read_to_string(path)?)?;
        debug!(
            path = %path.display(),
            neurons = network.neurons.len(),
            synapses = network.synapses.len(),
            "Network loaded"
        );
        Ok(network)
    }

    /// Every handle in a deserialized graph must point inside its arena
    fn check_integrity(&self) -> Result<()> {
        let neuron_ok = |id: &NeuronId| id.0 < self.neurons.len();
        let synapse_ok = |id: &SynapseId| id.0 < self.synapses.len();

        for (i, neuron) in self.neurons.iter().enumerate() {
            if neuron.id().0 != i || neuron.layer() >= self.layers.len() {
                return Err(SannError::InvalidTopology(format!(
                    "neuron record {} is inconsistent",
                    i
                )));
            }
            if !neuron.input_synapses().iter().all(synapse_ok)
                || !neuron.output_synapses().iter().all(synapse_ok)
            {
                return Err(SannError::InvalidTopology(format!(
                    "neuron {} references an unknown synapse",
                    neuron.id()
                )));
            }
        }
        for synapse in &self.synapses {
            if !neuron_ok(&synapse.presynaptic()) || !neuron_ok(&synapse.postsynaptic()) {
                return Err(SannError::InvalidTopology(format!(
                    "synapse {} references an unknown neuron",
                    synapse
                )));
            }
        }
        let layered = self.layers.iter().flat_map(|l| l.neurons()).all(neuron_ok);
        if !layered
            || !self.input_neurons.iter().all(neuron_ok)
            || !self.output_neurons.iter().all(neuron_ok)
        {
            return Err(SannError::InvalidTopology(
                "layer or boundary references an unknown neuron".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::function::ActivationFunction;

    /// 2 inputs + bias -> 1 linear output
    fn tiny() -> (Network, [NeuronId; 4]) {
        let mut net = Network::new();
        let l0 = net.add_layer();
        let l1 = net.add_layer();
        let a = net.add_neuron(l0, NeuronKind::Input).unwrap();
        let b = net.add_neuron(l0, NeuronKind::Input).unwrap();
        let bias = net.insert_neuron(l0, 0, NeuronKind::Bias).unwrap();
        let out = net
            .add_neuron(l1, NeuronKind::processor(ActivationFunction::Linear))
            .unwrap();
        net.bind_boundaries();
        (net, [bias, a, b, out])
    }

    #[test]
    fn test_bias_inserted_at_front() {
        let (net, [bias, a, b, _]) = tiny();
        assert_eq!(net.layer_at(0).unwrap().neurons(), &[bias, a, b]);
        assert_eq!(net.input_neurons(), &[a, b]);
        assert_eq!(net.input_size(), 2);
        assert_eq!(net.output_size(), 1);
    }

    #[test]
    fn test_connect_rejects_duplicates() {
        let (mut net, [_, a, _, out]) = tiny();
        assert!(net.connect(a, out, 0.5).unwrap().is_some());
        assert!(net.connect(a, out, 0.9).unwrap().is_none());
        assert_eq!(net.synapses_num(), 1);
        assert_eq!(net.synapse(SynapseId(0)).unwrap().weight, 0.5);
        assert_eq!(net.neuron(out).unwrap().inputs_num(), 1);
        assert_eq!(net.neuron(a).unwrap().outputs_num(), 1);
    }

    #[test]
    fn test_connect_rejects_non_processing_target() {
        let (mut net, [bias, a, _, _]) = tiny();
        assert!(matches!(
            net.connect(a, bias, 1.0),
            Err(SannError::InvalidEndpoint(id)) if id == bias
        ));
        assert!(matches!(
            net.connect(a, NeuronId(99), 1.0),
            Err(SannError::UnknownNeuron(_))
        ));
        assert_eq!(net.synapses_num(), 0);
    }

    #[test]
    fn test_activate_weighted_sum() {
        let (mut net, [bias, a, b, out]) = tiny();
        net.connect(bias, out, 0.5).unwrap();
        net.connect(a, out, 2.0).unwrap();
        net.connect(b, out, -1.0).unwrap();

        let y = net.activate(&[3.0, 4.0]).unwrap();
        assert_eq!(y, vec![0.5 + 6.0 - 4.0]);
        assert_eq!(net.neuron(out).unwrap().induced_local_field(), 2.5);
    }

    #[test]
    fn test_activate_dimension_mismatch() {
        let (mut net, _) = tiny();
        assert!(matches!(
            net.activate(&[1.0]),
            Err(SannError::DimensionMismatch {
                expected: 2,
                actual: 1
            })
        ));
    }

    /// Every synapse is listed exactly once at each endpoint
    fn assert_incidence_consistent(net: &Network) {
        for (i, synapse) in net.synapses().iter().enumerate() {
            let id = SynapseId(i);
            let pre = net.neuron(synapse.presynaptic()).unwrap();
            let post = net.neuron(synapse.postsynaptic()).unwrap();
            assert_eq!(pre.output_synapses().iter().filter(|&&s| s == id).count(), 1);
            assert_eq!(post.input_synapses().iter().filter(|&&s| s == id).count(), 1);
        }
        let listed: usize = net.neurons().iter().map(|n| n.inputs_num()).sum();
        assert_eq!(listed, net.synapses_num());
    }

    #[test]
    fn test_disconnect_compacts_and_activation_ignores_removed() {
        let (mut net, [bias, a, b, out]) = tiny();
        net.connect(bias, out, 0.5).unwrap();
        net.connect(a, out, 2.0).unwrap();
        net.connect(b, out, -1.0).unwrap();

        assert!(net.disconnect(a, out));
        assert!(!net.disconnect(a, out));
        assert!(!net.has_connection(a, out));
        assert_eq!(net.weights(), vec![0.5, -1.0]);
        assert_eq!(net.synapse_from(b, out), Some(SynapseId(1)));
        assert_incidence_consistent(&net);

        assert_eq!(net.activate(&[3.0, 4.0]).unwrap(), vec![0.5 - 4.0]);

        // The pair can be connected again and lands at the end of the arena
        assert_eq!(net.connect(a, out, 1.0).unwrap(), Some(SynapseId(2)));
        assert_eq!(net.activate(&[3.0, 4.0]).unwrap(), vec![0.5 + 3.0 - 4.0]);
    }

    #[test]
    fn test_disconnect_all_and_inputs() {
        let mut net = Network::new();
        let l0 = net.add_layer();
        let l1 = net.add_layer();
        let l2 = net.add_layer();
        let x = net.add_neuron(l0, NeuronKind::Input).unwrap();
        let h = net
            .add_neuron(l1, NeuronKind::processor(ActivationFunction::Linear))
            .unwrap();
        let y = net
            .add_neuron(l2, NeuronKind::processor(ActivationFunction::Linear))
            .unwrap();
        net.connect(x, h, 1.0).unwrap();
        net.connect(h, y, 2.0).unwrap();
        net.connect(x, y, 3.0).unwrap();

        assert_eq!(net.disconnect_inputs(y).unwrap(), 2);
        assert_eq!(net.weights(), vec![1.0]);
        assert_incidence_consistent(&net);

        net.connect(h, y, 4.0).unwrap();
        assert_eq!(net.disconnect_all(h).unwrap(), 2);
        assert_eq!(net.synapses_num(), 0);
        assert!(net.neurons().iter().all(|n| n.inputs_num() == 0 && n.outputs_num() == 0));
        assert_eq!(net.activate(&[5.0]).unwrap(), vec![0.0]);

        assert!(matches!(
            net.disconnect_all(NeuronId(9)),
            Err(SannError::UnknownNeuron(_))
        ));
    }

    #[test]
    fn test_boundaries_follow_construction() {
        let mut net = Network::new();
        let l0 = net.add_layer();
        let x = net.add_neuron(l0, NeuronKind::Input).unwrap();
        let l1 = net.add_layer();
        let y = net
            .add_neuron(l1, NeuronKind::processor(ActivationFunction::Linear))
            .unwrap();
        assert_eq!(net.input_neurons(), &[x]);
        assert_eq!(net.output_neurons(), &[y]);

        let x2 = net.add_neuron(l0, NeuronKind::Input).unwrap();
        let l2 = net.add_layer();
        assert!(net.output_neurons().is_empty());
        let z = net
            .add_neuron(l2, NeuronKind::processor(ActivationFunction::Linear))
            .unwrap();
        assert_eq!(net.input_neurons(), &[x, x2]);
        assert_eq!(net.output_neurons(), &[z]);

        net.connect(x, y, 1.0).unwrap();
        net.connect(x2, y, 1.0).unwrap();
        net.connect(y, z, 2.0).unwrap();
        assert_eq!(net.activate(&[1.0, 2.0]).unwrap(), vec![6.0]);
    }

    #[test]
    fn test_set_weights_length_checked() {
        let (mut net, [_, a, b, out]) = tiny();
        net.connect(a, out, 0.0).unwrap();
        net.connect(b, out, 0.0).unwrap();
        assert!(net.set_weights(&[1.0]).is_err());
        net.set_weights(&[1.0, 2.0]).unwrap();
        assert_eq!(net.weights(), vec![1.0, 2.0]);
    }

    #[test]
    fn test_unknown_layer() {
        let mut net = Network::new();
        assert!(matches!(
            net.add_neuron(3, NeuronKind::Input),
            Err(SannError::UnknownLayer { index: 3, len: 0 })
        ));
    }

    #[test]
    fn test_reset_clears_state() {
        let (mut net, [_, a, _, out]) = tiny();
        net.connect(a, out, 1.0).unwrap();
        net.activate(&[5.0, 0.0]).unwrap();
        net.reset();
        assert_eq!(net.outputs(), vec![0.0]);
    }

    #[test]
    fn test_corrupt_json_rejected() {
        let (mut net, [_, a, _, out]) = tiny();
        net.connect(a, out, 1.0).unwrap();
        let json = net.to_json().unwrap().replace("\"postsynaptic\": 3", "\"postsynaptic\": 42");
        assert!(matches!(
            Network::from_json(&json),
            Err(SannError::InvalidTopology(_))
        ));
    }
}
