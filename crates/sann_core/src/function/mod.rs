//! Scalar functions consumed by neurons: activation (transfer) functions,
//! input aggregation, and weight initialization strategies.
pub mod activation;
pub mod input;
pub mod weight_init;

pub use activation::ActivationFunction;
pub use input::InputFunction;
pub use weight_init::{ConstantWeight, UniformDistribution, WeightInitializer};
