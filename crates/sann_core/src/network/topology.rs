//! Topology construction: full layer-to-layer connection and the layered
//! network shapes (multilayer perceptron, single-layer perceptron).

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{Network, NeuronKind};
use crate::error::{Result, SannError};
use crate::function::ActivationFunction;

#[cfg(feature = "cli")]
use clap::ValueEnum;

/// Connect every neuron of layer `from` to every neuron of layer `to` that
/// accepts inputs. Bias neurons of `from` are skipped unless `include_bias`.
///
/// New synapses start at weight 0; use [`Network::initialize_weights`] to
/// draw real weights. Pairs that are already connected are left untouched.
/// Returns the number of synapses created.
pub fn full_connect(
    network: &mut Network,
    from: usize,
    to: usize,
    include_bias: bool,
) -> Result<usize> {
    let presynaptic: Vec<_> = network
        .layer_checked(from)?
        .neurons()
        .iter()
        .copied()
        .filter(|id| include_bias || !network.neurons[id.0].is_bias())
        .collect();
    let postsynaptic: Vec<_> = network
        .layer_checked(to)?
        .neurons()
        .iter()
        .copied()
        .filter(|id| network.neurons[id.0].accepts_input())
        .collect();

    let mut created = 0;
    for &pre in &presynaptic {
        for &post in &postsynaptic {
            if network.connect(pre, post, 0.0)?.is_some() {
                created += 1;
            }
        }
    }
    Ok(created)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "cli", derive(ValueEnum))]
pub enum Architecture {
    /// Input layer, one or more hidden layers, output layer; every processing
    /// neuron tracks error so backpropagation can train it
    #[default]
    MultiLayerPerceptron,
    /// Input layer straight into plain processor outputs (delta rule)
    Perceptron,
}

/// Validated description of a layered feedforward network.
///
/// Nothing is allocated until [`build`](Self::build) succeeds, so an invalid
/// description never leaves a partially built graph behind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkBuilder {
    #[serde(default)]
    pub architecture: Architecture,
    pub inputs: usize,
    #[serde(default)]
    pub hiddens: Vec<usize>,
    pub outputs: usize,
    /// Inject a bias neuron at position 0 of every layer except the last
    #[serde(default)]
    pub bias: bool,
    #[serde(default)]
    pub activation: Option<ActivationFunction>,
    /// Also fully connect the input layer to the output layer
    #[serde(default)]
    pub connect_inputs_to_outputs: bool,
}

impl NetworkBuilder {
    pub fn mlp(inputs: usize, hiddens: &[usize], outputs: usize) -> Self {
        Self {
            architecture: Architecture::MultiLayerPerceptron,
            inputs,
            hiddens: hiddens.to_vec(),
            outputs,
            bias: false,
            activation: None,
            connect_inputs_to_outputs: false,
        }
    }

    pub fn perceptron(inputs: usize, outputs: usize) -> Self {
        Self {
            architecture: Architecture::Perceptron,
            hiddens: Vec::new(),
            ..Self::mlp(inputs, &[], outputs)
        }
    }

    pub fn with_bias(mut self, bias: bool) -> Self {
        self.bias = bias;
        self
    }

    pub fn with_activation(mut self, activation: ActivationFunction) -> Self {
        self.activation = Some(activation);
        self
    }

    pub fn with_skip_connections(mut self, enabled: bool) -> Self {
        self.connect_inputs_to_outputs = enabled;
        self
    }

    pub fn validate(&self) -> Result<ActivationFunction> {
        if self.inputs < 1 {
            return Err(SannError::InvalidTopology(
                "inputs must be greater than 0".into(),
            ));
        }
        if self.outputs < 1 {
            return Err(SannError::InvalidTopology(
                "outputs must be greater than 0".into(),
            ));
        }
        let activation = self.activation.ok_or_else(|| {
            SannError::InvalidTopology("an activation function is required".into())
        })?;
        match self.architecture {
            Architecture::MultiLayerPerceptron => {
                if self.hiddens.is_empty() {
                    return Err(SannError::InvalidTopology(
                        "a multilayer perceptron needs at least one hidden layer".into(),
                    ));
                }
                if let Some(i) = self.hiddens.iter().position(|&n| n < 1) {
                    return Err(SannError::InvalidTopology(format!(
                        "hidden layer {} must have at least one neuron",
                        i
                    )));
                }
            }
            Architecture::Perceptron => {
                if !self.hiddens.is_empty() {
                    return Err(SannError::InvalidTopology(
                        "a perceptron has no hidden layers".into(),
                    ));
                }
            }
        }
        Ok(activation)
    }

    pub fn build(&self) -> Result<Network> {
        let activation = self.validate()?;
        let (hidden_kind, output_kind) = match self.architecture {
            Architecture::MultiLayerPerceptron => (
                NeuronKind::error_processor(activation),
                NeuronKind::error_processor(activation),
            ),
            Architecture::Perceptron => (
                NeuronKind::error_processor(activation),
                NeuronKind::processor(activation),
            ),
        };

        let mut network = Network::new();
        let input_layer = network.add_layer();
        for _ in 0..self.inputs {
            network.add_neuron(input_layer, NeuronKind::Input)?;
        }
        for &size in &self.hiddens {
            let layer = network.add_layer();
            for _ in 0..size {
                network.add_neuron(layer, hidden_kind)?;
            }
        }
        let output_layer = network.add_layer();
        for _ in 0..self.outputs {
            network.add_neuron(output_layer, output_kind)?;
        }

        if self.bias {
            for layer in 0..output_layer {
                network.insert_neuron(layer, 0, NeuronKind::Bias)?;
            }
        }
        for layer in 0..output_layer {
            full_connect(&mut network, layer, layer + 1, true)?;
        }
        // The output layer already receives bias from the layer below it
        if self.connect_inputs_to_outputs && output_layer > 1 {
            full_connect(&mut network, input_layer, output_layer, false)?;
        }
        network.bind_boundaries();

        debug!(
            architecture = ?self.architecture,
            layers = network.layers_num(),
            neurons = network.neurons_num(),
            synapses = network.synapses_num(),
            "Network built"
        );
        Ok(network)
    }
}
