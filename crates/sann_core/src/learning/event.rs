use core::fmt;

use super::LearningState;
use crate::network::Network;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LearningEventKind {
    /// Emitted once, after validation and before the first epoch
    InitLearning,
    /// Emitted once, after the epoch that satisfied a stop condition
    CompleteLearning,
}

impl LearningEventKind {
    pub fn as_str(self) -> &'static str {
        match self {
            LearningEventKind::InitLearning => "initLearning",
            LearningEventKind::CompleteLearning => "completeLearning",
        }
    }
}

impl fmt::Display for LearningEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle notification carrying read-only views of the learning state and
/// of the network being trained
#[derive(Debug, Clone, Copy)]
pub struct LearningEvent<'a> {
    pub kind: LearningEventKind,
    pub state: &'a LearningState,
    pub network: &'a Network,
}

impl<'a> LearningEvent<'a> {
    pub fn new(kind: LearningEventKind, state: &'a LearningState, network: &'a Network) -> Self {
        Self {
            kind,
            state,
            network,
        }
    }
}

/// Receives learning lifecycle events. Implemented for closures and for `()`
/// (ignore everything).
pub trait LearningObserver {
    fn on_event(&mut self, event: &LearningEvent<'_>);
}

impl LearningObserver for () {
    fn on_event(&mut self, _event: &LearningEvent<'_>) {}
}

impl<F> LearningObserver for F
where
    F: FnMut(&LearningEvent<'_>),
{
    fn on_event(&mut self, event: &LearningEvent<'_>) {
        self(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closure_observer_sees_state() {
        let state = LearningState {
            current_epoch: 7,
            total_network_error: 0.5,
            previous_epoch_error: 0.6,
            learning_rate: 0.1,
            batch_mode: false,
        };
        let network = Network::new();
        let mut seen = Vec::new();
        {
            let mut observer = |e: &LearningEvent<'_>| {
                seen.push((e.kind, e.state.current_epoch, e.network.synapses_num()))
            };
            observer.on_event(&LearningEvent::new(
                LearningEventKind::CompleteLearning,
                &state,
                &network,
            ));
        }
        assert_eq!(seen, vec![(LearningEventKind::CompleteLearning, 7, 0)]);
        assert_eq!(LearningEventKind::InitLearning.to_string(), "initLearning");
    }
}
