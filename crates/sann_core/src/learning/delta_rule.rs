use super::{ErrorPropagation, WeightUpdater};
use crate::error::Result;
use crate::network::Network;

/// Least-mean-squares update for single-layer networks.
///
/// Each output neuron's error signal is its raw output error `e_i`; no
/// activation derivative is involved, so non-differentiable activations such
/// as the hard limiter are fine here.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Lms;

impl ErrorPropagation for Lms {
    fn validate(&self, _network: &Network) -> Result<()> {
        Ok(())
    }

    fn propagate(&self, network: &mut Network, output_error: &[f64], updater: &mut WeightUpdater) {
        let outputs = network.output_neurons().to_vec();
        for (id, &error) in outputs.into_iter().zip(output_error) {
            network.neuron_mut(id).set_error(error);
            updater.update_neuron_weights(network, id, error);
        }
    }
}
