use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Strategy producing initial synapse weights.
///
/// Called once per synapse by [`Network::initialize_weights`](crate::Network::initialize_weights),
/// in synapse creation order.
pub trait WeightInitializer {
    fn raffle_weight(&mut self) -> f64;
}

/// Uniform weights in `[minimum, maximum)`.
///
/// Reproducible only when built with [`with_seed`](Self::with_seed).
#[derive(Debug, Clone)]
pub struct UniformDistribution {
    minimum: f64,
    maximum: f64,
    rng: ChaCha8Rng,
}

impl UniformDistribution {
    /// Entropy-seeded generator
    pub fn new(minimum: f64, maximum: f64) -> Self {
        Self {
            minimum,
            maximum,
            rng: ChaCha8Rng::from_entropy(),
        }
    }

    pub fn with_seed(minimum: f64, maximum: f64, seed: u64) -> Self {
        Self {
            minimum,
            maximum,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub fn minimum(&self) -> f64 {
        self.minimum
    }

    pub fn maximum(&self) -> f64 {
        self.maximum
    }
}

impl WeightInitializer for UniformDistribution {
    fn raffle_weight(&mut self) -> f64 {
        self.minimum + self.rng.gen::<f64>() * (self.maximum - self.minimum)
    }
}

/// Every synapse gets the same weight. Mostly useful for reproducible tests.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstantWeight(pub f64);

impl WeightInitializer for ConstantWeight {
    fn raffle_weight(&mut self) -> f64 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_stays_in_range() {
        let mut init = UniformDistribution::with_seed(-0.5, 0.25, 7);
        for _ in 0..1000 {
            let w = init.raffle_weight();
            assert!((-0.5..0.25).contains(&w), "weight {} out of range", w);
        }
    }

    #[test]
    fn test_seeded_uniform_is_reproducible() {
        let mut a = UniformDistribution::with_seed(-1.0, 1.0, 42);
        let mut b = UniformDistribution::with_seed(-1.0, 1.0, 42);
        let xs: Vec<f64> = (0..16).map(|_| a.raffle_weight()).collect();
        let ys: Vec<f64> = (0..16).map(|_| b.raffle_weight()).collect();
        assert_eq!(xs, ys);
    }

    #[test]
    fn test_degenerate_range_returns_minimum() {
        let mut init = UniformDistribution::with_seed(0.3, 0.3, 1);
        assert_eq!(init.raffle_weight(), 0.3);
    }

    #[test]
    fn test_constant_weight() {
        let mut init = ConstantWeight(0.125);
        assert_eq!(init.raffle_weight(), 0.125);
        assert_eq!(init.raffle_weight(), 0.125);
    }
}
