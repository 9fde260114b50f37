use serde::{Deserialize, Serialize};

/// Scalar transfer function applied to a neuron's induced local field.
///
/// Functions are stateless values: the last computed output lives in the
/// neuron's transient state, so one function can be shared by any number of
/// neurons. Two derivative paths exist:
/// * [`derivative`](Self::derivative) recomputes the output at `x` and never
///   depends on call order.
/// * [`derivative_from_output`](Self::derivative_from_output) reuses an output
///   the caller already holds.
///
/// Both return `None` for functions without a derivative (hard limit).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActivationFunction {
    /// Identity: `y = x`
    Linear,
    /// Logistic: `y = 1 / (1 + e^(-slope * x))`
    Sigmoid { slope: f64 },
    /// Hyperbolic tangent: `y = tanh(slope * x)`
    Tanh { slope: f64 },
    /// Step: `y = 1` when `x >= 0`, `0` otherwise. Not differentiable.
    HardLimit,
}

impl Default for ActivationFunction {
    fn default() -> Self {
        Self::sigmoid()
    }
}

impl ActivationFunction {
    /// Logistic function with unit slope
    pub fn sigmoid() -> Self {
        Self::Sigmoid { slope: 1.0 }
    }

    /// Hyperbolic tangent with unit slope
    pub fn tanh() -> Self {
        Self::Tanh { slope: 1.0 }
    }

    pub fn output(&self, x: f64) -> f64 {
        match *self {
            Self::Linear => x,
            Self::Sigmoid { slope } => 1.0 / (1.0 + (-slope * x).exp()),
            Self::Tanh { slope } => (slope * x).tanh(),
            Self::HardLimit => {
                if x >= 0.0 {
                    1.0
                } else {
                    0.0
                }
            }
        }
    }

    /// Derivative at an arbitrary input, computed from scratch.
    pub fn derivative(&self, x: f64) -> Option<f64> {
        match *self {
            Self::Linear => Some(1.0),
            Self::HardLimit => None,
            _ => self.derivative_from_output(self.output(x)),
        }
    }

    /// Derivative expressed in terms of an already computed output `y`.
    pub fn derivative_from_output(&self, y: f64) -> Option<f64> {
        match *self {
            Self::Linear => Some(1.0),
            Self::Sigmoid { slope } => Some(slope * y * (1.0 - y)),
            Self::Tanh { slope } => Some(slope * (1.0 - y * y)),
            Self::HardLimit => None,
        }
    }

    pub fn has_derivative(&self) -> bool {
        !matches!(self, Self::HardLimit)
    }
}
