use serde::{Deserialize, Serialize};

/// Reduction over a neuron's incoming `(weight, presynaptic output)` pairs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputFunction {
    /// `Σ weight_i * presynaptic_output_i`
    #[default]
    WeightedSum,
}

impl InputFunction {
    pub fn aggregate<I>(&self, inputs: I) -> f64
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        match self {
            Self::WeightedSum => inputs.into_iter().map(|(w, x)| w * x).sum(),
        }
    }
}
