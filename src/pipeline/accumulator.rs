//! Append-only result sequence with synchronous observers.

use crate::types::{PredictionOutcome, RunFailure, StreamPhase};

/// Receives stream progress as it happens.
///
/// Callbacks run synchronously on the orchestrator's task, in registration
/// order, before the next record is submitted. They must not block for long.
pub trait OutcomeObserver: Send {
    /// A run over `source` has started; previous results were discarded.
    fn on_run_started(&mut self, _source: &str) {}

    /// `outcome` was appended for the record at 1-based `position`.
    fn on_outcome(&mut self, position: usize, outcome: &PredictionOutcome);

    /// The run reached a terminal phase.
    fn on_run_finished(&mut self, _phase: StreamPhase, _failure: Option<&RunFailure>) {}
}

/// Ordered, append-only outcomes of the current run.
#[derive(Default)]
pub struct ResultAccumulator {
    outcomes: Vec<PredictionOutcome>,
    observers: Vec<Box<dyn OutcomeObserver>>,
}

impl ResultAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an observer; it is notified after every existing observer.
    pub fn subscribe(&mut self, observer: Box<dyn OutcomeObserver>) {
        self.observers.push(observer);
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    /// Append an outcome and notify every observer.
    pub fn append(&mut self, outcome: PredictionOutcome) {
        self.outcomes.push(outcome);
        let position = self.outcomes.len();
        let appended = &self.outcomes[position - 1];
        for observer in &mut self.observers {
            observer.on_outcome(position, appended);
        }
    }

    pub fn outcomes(&self) -> &[PredictionOutcome] {
        &self.outcomes
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Drop all outcomes and announce a new run. Observers stay registered.
    pub(crate) fn reset(&mut self, source: &str) {
        self.outcomes.clear();
        for observer in &mut self.observers {
            observer.on_run_started(source);
        }
    }

    pub(crate) fn finish(&mut self, phase: StreamPhase, failure: Option<&RunFailure>) {
        for observer in &mut self.observers {
            observer.on_run_finished(phase, failure);
        }
    }
}

impl std::fmt::Debug for ResultAccumulator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResultAccumulator")
            .field("outcomes", &self.outcomes)
            .field("observers", &self.observers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Appends `(name, position)` to a shared log on every outcome.
    struct Tagged {
        name: &'static str,
        log: Arc<Mutex<Vec<(&'static str, usize)>>>,
    }

    impl OutcomeObserver for Tagged {
        fn on_outcome(&mut self, position: usize, _outcome: &PredictionOutcome) {
            self.log.lock().unwrap().push((self.name, position));
        }
    }

    fn outcome(probability: f64) -> PredictionOutcome {
        PredictionOutcome {
            label: "No failure predicted".to_string(),
            predicted: false,
            probability,
        }
    }

    #[test]
    fn notifies_observers_in_registration_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut acc = ResultAccumulator::new();
        acc.subscribe(Box::new(Tagged { name: "first", log: log.clone() }));
        acc.subscribe(Box::new(Tagged { name: "second", log: log.clone() }));

        acc.append(outcome(0.1));
        acc.append(outcome(0.2));

        assert_eq!(
            *log.lock().unwrap(),
            vec![("first", 1), ("second", 1), ("first", 2), ("second", 2)]
        );
        assert_eq!(acc.len(), 2);
        assert_eq!(acc.outcomes()[1].probability, 0.2);
    }

    #[test]
    fn reset_clears_outcomes_but_keeps_observers() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut acc = ResultAccumulator::new();
        acc.subscribe(Box::new(Tagged { name: "ui", log: log.clone() }));
        acc.append(outcome(0.5));

        acc.reset("next.csv");
        assert!(acc.is_empty());
        assert_eq!(acc.observer_count(), 1);

        acc.append(outcome(0.7));
        assert_eq!(log.lock().unwrap().last(), Some(&("ui", 1)));
    }
}
