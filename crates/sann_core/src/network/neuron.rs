use core::fmt;

use serde::{Deserialize, Serialize};

use super::synapse::SynapseId;
use crate::function::{ActivationFunction, InputFunction};

/// Stable handle into the network's neuron arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NeuronId(pub usize);

impl NeuronId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NeuronId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

/// Functions a processing neuron applies to its input synapses
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Processing {
    pub input_function: InputFunction,
    pub activation_function: ActivationFunction,
}

impl Processing {
    pub fn new(activation_function: ActivationFunction) -> Self {
        Self {
            input_function: InputFunction::WeightedSum,
            activation_function,
        }
    }
}

/// Role of a neuron in the graph.
///
/// Capabilities are queried through [`Neuron`] helpers (`accepts_input`,
/// `processing`, `tracks_error`) rather than by matching on the kind.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NeuronKind {
    /// Output injected from outside; never has input synapses
    Input,
    /// Constant output of 1; only output synapses
    Bias,
    /// `output = activation(aggregate(inputs))`
    Processor(Processing),
    /// Processor that also carries a per-pattern error signal for backpropagation
    ErrorProcessor(Processing),
}

impl NeuronKind {
    pub fn processor(activation_function: ActivationFunction) -> Self {
        Self::Processor(Processing::new(activation_function))
    }

    pub fn error_processor(activation_function: ActivationFunction) -> Self {
        Self::ErrorProcessor(Processing::new(activation_function))
    }
}

/// Transient activation state, recomputed every forward pass and never persisted
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NeuronState {
    pub induced_local_field: f64,
    pub output: f64,
    pub error: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Neuron {
    id: NeuronId,
    layer: usize,
    kind: NeuronKind,
    input_synapses: Vec<SynapseId>,
    output_synapses: Vec<SynapseId>,
    #[serde(skip)]
    state: NeuronState,
}

impl Neuron {
    pub(crate) fn new(id: NeuronId, layer: usize, kind: NeuronKind) -> Self {
        Self {
            id,
            layer,
            kind,
            input_synapses: Vec::new(),
            output_synapses: Vec::new(),
            state: NeuronState::default(),
        }
    }

    pub fn id(&self) -> NeuronId {
        self.id
    }

    /// Index of the single layer this neuron belongs to
    pub fn layer(&self) -> usize {
        self.layer
    }

    pub fn kind(&self) -> &NeuronKind {
        &self.kind
    }

    pub fn is_input(&self) -> bool {
        matches!(self.kind, NeuronKind::Input)
    }

    pub fn is_bias(&self) -> bool {
        matches!(self.kind, NeuronKind::Bias)
    }

    /// Only processing neurons can be the postsynaptic end of a synapse
    pub fn accepts_input(&self) -> bool {
        self.processing().is_some()
    }

    pub fn tracks_error(&self) -> bool {
        matches!(self.kind, NeuronKind::ErrorProcessor(_))
    }

    pub fn processing(&self) -> Option<&Processing> {
        match &self.kind {
            NeuronKind::Processor(p) | NeuronKind::ErrorProcessor(p) => Some(p),
            NeuronKind::Input | NeuronKind::Bias => None,
        }
    }

    pub fn activation_function(&self) -> Option<&ActivationFunction> {
        self.processing().map(|p| &p.activation_function)
    }

    pub fn output(&self) -> f64 {
        match self.kind {
            NeuronKind::Bias => 1.0,
            _ => self.state.output,
        }
    }

    pub fn induced_local_field(&self) -> f64 {
        self.state.induced_local_field
    }

    /// Error signal (δ) from the most recent backward pass
    pub fn error(&self) -> f64 {
        self.state.error
    }

    pub fn state(&self) -> &NeuronState {
        &self.state
    }

    pub fn input_synapses(&self) -> &[SynapseId] {
        &self.input_synapses
    }

    pub fn output_synapses(&self) -> &[SynapseId] {
        &self.output_synapses
    }

    pub fn inputs_num(&self) -> usize {
        self.input_synapses.len()
    }

    pub fn outputs_num(&self) -> usize {
        self.output_synapses.len()
    }

    /// Derivative of the activation function at the current induced field.
    /// `None` for neurons without processing or with a non-differentiable function.
    pub fn derivative_at_field(&self) -> Option<f64> {
        self.activation_function()?
            .derivative(self.state.induced_local_field)
    }

    pub(crate) fn set_output(&mut self, output: f64) {
        self.state.output = output;
    }

    pub(crate) fn set_activation(&mut self, induced_local_field: f64, output: f64) {
        self.state.induced_local_field = induced_local_field;
        self.state.output = output;
    }

    pub(crate) fn set_error(&mut self, error: f64) {
        self.state.error = error;
    }

    pub(crate) fn reset(&mut self) {
        self.state = NeuronState::default();
    }

    pub(crate) fn push_input(&mut self, synapse: SynapseId) {
        self.input_synapses.push(synapse);
    }

    pub(crate) fn push_output(&mut self, synapse: SynapseId) {
        self.output_synapses.push(synapse);
    }

    /// Drop `removed` from both incident lists and shift the handles above it
    /// down by one, following the arena compaction.
    pub(crate) fn forget_synapse(&mut self, removed: SynapseId) {
        for list in [&mut self.input_synapses, &mut self.output_synapses] {
            list.retain(|&s| s != removed);
            for s in list.iter_mut() {
                if s.0 > removed.0 {
                    s.0 -= 1;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bias_output_is_constant() {
        let mut bias = Neuron::new(NeuronId(0), 0, NeuronKind::Bias);
        assert_eq!(bias.output(), 1.0);
        bias.reset();
        assert_eq!(bias.output(), 1.0);
        assert!(!bias.accepts_input());
    }

    #[test]
    fn test_capabilities_follow_kind() {
        let input = Neuron::new(NeuronId(0), 0, NeuronKind::Input);
        let plain = Neuron::new(NeuronId(1), 1, NeuronKind::processor(ActivationFunction::Linear));
        let tracked = Neuron::new(
            NeuronId(2),
            1,
            NeuronKind::error_processor(ActivationFunction::sigmoid()),
        );

        assert!(input.is_input() && !input.accepts_input());
        assert!(plain.accepts_input() && !plain.tracks_error());
        assert!(tracked.accepts_input() && tracked.tracks_error());
        assert_eq!(input.derivative_at_field(), None);
    }

    #[test]
    fn test_derivative_uses_induced_field() {
        let mut n = Neuron::new(
            NeuronId(0),
            1,
            NeuronKind::error_processor(ActivationFunction::sigmoid()),
        );
        // Stale output must not leak into the derivative
        n.set_activation(0.0, 0.9);
        assert!((n.derivative_at_field().unwrap() - 0.25).abs() < 1e-12);
    }
}
