//! Stop conditions, evaluated after every epoch against the learning state.

use core::fmt;

use super::LearningState;

pub trait StopCondition: fmt::Debug {
    fn is_reached(&self, state: &LearningState) -> bool;
}

/// Stops once `limit` epochs have completed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaximumEpoch {
    pub limit: usize,
}

impl MaximumEpoch {
    pub fn new(limit: usize) -> Self {
        Self { limit }
    }
}

impl StopCondition for MaximumEpoch {
    fn is_reached(&self, state: &LearningState) -> bool {
        state.current_epoch >= self.limit
    }
}

/// Stops once the total network error falls to `threshold` or below
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaximumError {
    pub threshold: f64,
}

impl MaximumError {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }
}

impl StopCondition for MaximumError {
    fn is_reached(&self, state: &LearningState) -> bool {
        state.total_network_error <= self.threshold
    }
}

/// Stops once the epoch-to-epoch error change is smaller than `min_change`,
/// in either direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ErrorDecreases {
    pub min_change: f64,
}

impl ErrorDecreases {
    pub const DEFAULT_MIN_CHANGE: f64 = 1e-5;

    pub fn new(min_change: f64) -> Self {
        Self { min_change }
    }
}

impl Default for ErrorDecreases {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MIN_CHANGE)
    }
}

impl StopCondition for ErrorDecreases {
    fn is_reached(&self, state: &LearningState) -> bool {
        (state.total_network_error - state.previous_epoch_error).abs() < self.min_change
    }
}

/// Ordered list of stop conditions; training stops when any one is reached
#[derive(Debug, Default)]
pub struct StopConditions {
    conditions: Vec<Box<dyn StopCondition>>,
}

impl StopConditions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with<C: StopCondition + 'static>(mut self, condition: C) -> Self {
        self.push(condition);
        self
    }

    pub fn push<C: StopCondition + 'static>(&mut self, condition: C) {
        self.conditions.push(Box::new(condition));
    }

    pub fn get(&self, index: usize) -> Option<&dyn StopCondition> {
        self.conditions.get(index).map(|c| c.as_ref())
    }

    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Index of the first reached condition, in insertion order
    pub fn first_reached(&self, state: &LearningState) -> Option<usize> {
        self.conditions.iter().position(|c| c.is_reached(state))
    }
}

impl StopCondition for StopConditions {
    fn is_reached(&self, state: &LearningState) -> bool {
        self.first_reached(state).is_some()
    }
}
