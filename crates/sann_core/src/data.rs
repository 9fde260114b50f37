//! Supervised training data: (input vector, target vector) pairs.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SannError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupervisedPattern {
    pub input: Vec<f64>,
    pub target: Vec<f64>,
}

impl SupervisedPattern {
    pub fn new(input: Vec<f64>, target: Vec<f64>) -> Self {
        Self { input, target }
    }
}

/// Finite, restartable sequence of supervised patterns.
///
/// Every call to [`patterns`](Self::patterns) starts a fresh pass in the
/// set's defined order. `input_size`/`output_size` let a learning rule check
/// the set against its network before training.
pub trait TrainingSet {
    fn input_size(&self) -> usize;
    fn output_size(&self) -> usize;
    fn len(&self) -> usize;
    fn patterns(&self) -> Box<dyn Iterator<Item = &SupervisedPattern> + '_>;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// In-memory training set with fixed dimensions.
///
/// Deserialization goes through [`add_pattern`](Self::add_pattern), so a
/// loaded set upholds the same widths as one built in code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SupervisedSetRecord")]
pub struct SupervisedSet {
    input_size: usize,
    output_size: usize,
    patterns: Vec<SupervisedPattern>,
}

#[derive(Deserialize)]
struct SupervisedSetRecord {
    input_size: usize,
    output_size: usize,
    #[serde(default)]
    patterns: Vec<SupervisedPattern>,
}

impl TryFrom<SupervisedSetRecord> for SupervisedSet {
    type Error = SannError;

    fn try_from(record: SupervisedSetRecord) -> Result<Self> {
        let mut set = SupervisedSet::new(record.input_size, record.output_size);
        for pattern in record.patterns {
            set.add_pattern(pattern)?;
        }
        Ok(set)
    }
}

impl SupervisedSet {
    pub fn new(input_size: usize, output_size: usize) -> Self {
        Self {
            input_size,
            output_size,
            patterns: Vec::new(),
        }
    }

    /// Append a pattern; rejects vectors that do not match the set's dimensions
    pub fn add_pattern(&mut self, pattern: SupervisedPattern) -> Result<()> {
        if pattern.input.len() != self.input_size {
            return Err(SannError::DimensionMismatch {
                expected: self.input_size,
                actual: pattern.input.len(),
            });
        }
        if pattern.target.len() != self.output_size {
            return Err(SannError::DimensionMismatch {
                expected: self.output_size,
                actual: pattern.target.len(),
            });
        }
        self.patterns.push(pattern);
        Ok(())
    }

    pub fn add(&mut self, input: &[f64], target: &[f64]) -> Result<()> {
        self.add_pattern(SupervisedPattern::new(input.to_vec(), target.to_vec()))
    }

    pub fn pattern_at(&self, index: usize) -> Option<&SupervisedPattern> {
        self.patterns.get(index)
    }
}

impl TrainingSet for SupervisedSet {
    fn input_size(&self) -> usize {
        self.input_size
    }

    fn output_size(&self) -> usize {
        self.output_size
    }

    fn len(&self) -> usize {
        self.patterns.len()
    }

    fn patterns(&self) -> Box<dyn Iterator<Item = &SupervisedPattern> + '_> {
        Box::new(self.patterns.iter())
    }
}
