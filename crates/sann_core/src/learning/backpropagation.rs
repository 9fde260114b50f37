//! Generalized delta rule for layered networks.
//!
//! Output neuron `j`: `δ_j = e_j * f'(v_j)`.
//! Hidden neuron `j`: `δ_j = f'(v_j) * Σ_k w_jk * δ_k` over every outgoing
//! synapse, with layers visited from the last hidden layer down to layer 1.
//! Only error-tracking neurons receive a δ and a weight update.

use super::{ErrorPropagation, WeightUpdater};
use crate::error::{Result, SannError};
use crate::network::{Network, NeuronId};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GeneralizedDelta;

impl GeneralizedDelta {
    fn hidden_delta(network: &Network, id: NeuronId) -> f64 {
        let neuron = &network.neurons()[id.index()];
        let downstream: f64 = neuron
            .output_synapses()
            .iter()
            .map(|s| {
                let synapse = &network.synapses()[s.index()];
                synapse.weight * network.neurons()[synapse.postsynaptic().index()].error()
            })
            .sum();
        neuron.derivative_at_field().unwrap_or(0.0) * downstream
    }
}

impl ErrorPropagation for GeneralizedDelta {
    fn validate(&self, network: &Network) -> Result<()> {
        for &id in network.output_neurons() {
            if !network.neurons()[id.index()].tracks_error() {
                return Err(SannError::ErrorTrackingRequired(id));
            }
        }
        if let Some(neuron) = network.neurons().iter().find(|n| {
            n.tracks_error() && !n.activation_function().is_some_and(|f| f.has_derivative())
        }) {
            return Err(SannError::UndefinedDerivative(neuron.id()));
        }
        Ok(())
    }

    fn propagate(&self, network: &mut Network, output_error: &[f64], updater: &mut WeightUpdater) {
        let outputs = network.output_neurons().to_vec();
        for (id, &error) in outputs.into_iter().zip(output_error) {
            if !network.neurons()[id.index()].tracks_error() {
                continue;
            }
            // Nothing to propagate, and nothing stale left for the hidden layers
            if error == 0.0 {
                network.neuron_mut(id).set_error(0.0);
                continue;
            }
            let derivative = network.neurons()[id.index()]
                .derivative_at_field()
                .unwrap_or(0.0);
            let delta = error * derivative;
            network.neuron_mut(id).set_error(delta);
            updater.update_neuron_weights(network, id, delta);
        }

        // In online mode the output weights above are already updated; hidden
        // deltas are computed against the new values.
        let last_hidden = network.layers_num().saturating_sub(2);
        for layer in (1..=last_hidden).rev() {
            let ids = network.layers()[layer].neurons().to_vec();
            for id in ids {
                if !network.neurons()[id.index()].tracks_error() {
                    continue;
                }
                let delta = Self::hidden_delta(network, id);
                network.neuron_mut(id).set_error(delta);
                updater.update_neuron_weights(network, id, delta);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::SupervisedSet;
    use crate::function::{ActivationFunction, ConstantWeight};
    use crate::learning::Backpropagation;
    use crate::network::NetworkBuilder;

    #[test]
    fn test_requires_error_tracking_outputs() {
        let net = NetworkBuilder::perceptron(2, 1)
            .with_activation(ActivationFunction::sigmoid())
            .build()
            .unwrap();
        let out = net.output_neurons()[0];
        let mut set = SupervisedSet::new(2, 1);
        set.add(&[0.0, 1.0], &[1.0]).unwrap();

        let mut rule = Backpropagation::new(net, 0.1, false).unwrap();
        assert!(matches!(
            rule.run_epoch(&set),
            Err(SannError::ErrorTrackingRequired(id)) if id == out
        ));
        assert_eq!(rule.current_epoch(), 0);
    }

    #[test]
    fn test_requires_differentiable_activation() {
        let net = NetworkBuilder::mlp(2, &[2], 1)
            .with_activation(ActivationFunction::HardLimit)
            .build()
            .unwrap();
        let mut set = SupervisedSet::new(2, 1);
        set.add(&[0.0, 1.0], &[1.0]).unwrap();

        let mut rule = Backpropagation::new(net, 0.1, false).unwrap();
        assert!(matches!(
            rule.run_epoch(&set),
            Err(SannError::UndefinedDerivative(_))
        ));
    }

    #[test]
    fn test_zero_output_error_skips_update() {
        let mut net = NetworkBuilder::mlp(1, &[1], 1)
            .with_activation(ActivationFunction::Linear)
            .build()
            .unwrap();
        net.initialize_weights(&mut ConstantWeight(1.0));
        let mut set = SupervisedSet::new(1, 1);
        // Linear 1-1-1 with unit weights reproduces its input
        set.add(&[0.5], &[0.5]).unwrap();

        let mut rule = Backpropagation::new(net, 0.5, false).unwrap();
        assert_eq!(rule.run_epoch(&set).unwrap(), 0.0);
        assert_eq!(rule.network().weights(), vec![1.0, 1.0]);
        assert!(rule.network().neurons().iter().all(|n| n.error() == 0.0));
    }

    #[test]
    fn test_linear_chain_deltas() {
        // x -> h -> y, all linear, w1 = 0.5, w2 = 2.0
        let mut net = NetworkBuilder::mlp(1, &[1], 1)
            .with_activation(ActivationFunction::Linear)
            .build()
            .unwrap();
        net.set_weights(&[0.5, 2.0]).unwrap();
        let mut set = SupervisedSet::new(1, 1);
        set.add(&[1.0], &[2.0]).unwrap();

        let mut rule = Backpropagation::new(net, 0.1, true).unwrap();
        rule.run_epoch(&set).unwrap();

        // y = 1.0, e = 1.0, δ_out = 1.0, δ_h = 2.0 * 1.0
        // Δw2 = 0.1 * 1.0 * h(0.5) = 0.05, Δw1 = 0.1 * 2.0 * x(1.0) = 0.2
        let weights = rule.network().weights();
        assert!((weights[0] - 0.7).abs() < 1e-12);
        assert!((weights[1] - 2.05).abs() < 1e-12);
    }
}
