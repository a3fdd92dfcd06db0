//! Stream run state
//!
//! [`StreamState`] is owned by exactly one caller and lent to the
//! orchestrator for the duration of a run. Nothing else writes to it.

use serde::Serialize;

use super::accumulator::{OutcomeObserver, ResultAccumulator};
use crate::types::{PredictionOutcome, RunFailure, StreamPhase};

/// State of the current (or most recent) stream run.
#[derive(Debug, Default)]
pub struct StreamState {
    results: ResultAccumulator,
    phase: StreamPhase,
    /// Name of the source being streamed (reference only)
    current_source: Option<String>,
    submitted: usize,
    skipped_rows: usize,
    failure: Option<RunFailure>,
}

impl StreamState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an observer on the result sequence. Survives across runs.
    pub fn subscribe(&mut self, observer: Box<dyn OutcomeObserver>) {
        self.results.subscribe(observer);
    }

    pub fn phase(&self) -> StreamPhase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.phase == StreamPhase::Running
    }

    pub fn results(&self) -> &[PredictionOutcome] {
        self.results.outcomes()
    }

    pub fn current_source(&self) -> Option<&str> {
        self.current_source.as_deref()
    }

    /// Records handed to the submission client so far.
    pub fn submitted(&self) -> usize {
        self.submitted
    }

    pub fn skipped_rows(&self) -> usize {
        self.skipped_rows
    }

    pub fn failure(&self) -> Option<&RunFailure> {
        self.failure.as_ref()
    }

    /// Serializable copy for display.
    pub fn snapshot(&self) -> StreamSnapshot {
        StreamSnapshot {
            phase: self.phase,
            source: self.current_source.clone(),
            submitted: self.submitted,
            skipped_rows: self.skipped_rows,
            results: self.results.outcomes().to_vec(),
            failure: self.failure.clone(),
        }
    }

    // ------------------------------------------------------------------------
    // Transitions (orchestrator only)
    // ------------------------------------------------------------------------

    pub(crate) fn begin(&mut self, source: &str) {
        self.phase = StreamPhase::Running;
        self.current_source = Some(source.to_string());
        self.submitted = 0;
        self.skipped_rows = 0;
        self.failure = None;
        self.results.reset(source);
    }

    pub(crate) fn record_submission(&mut self) {
        self.submitted += 1;
    }

    pub(crate) fn push_outcome(&mut self, outcome: PredictionOutcome) {
        if self.is_running() {
            self.results.append(outcome);
        }
    }

    pub(crate) fn finish(
        &mut self,
        phase: StreamPhase,
        skipped_rows: usize,
        failure: Option<RunFailure>,
    ) {
        debug_assert!(phase.is_terminal());
        self.phase = phase;
        self.skipped_rows = skipped_rows;
        self.failure = failure;
        self.results.finish(phase, self.failure.as_ref());
    }
}

/// Point-in-time view of a [`StreamState`].
#[derive(Debug, Clone, Default, Serialize)]
pub struct StreamSnapshot {
    pub phase: StreamPhase,
    pub source: Option<String>,
    /// Records handed to the service, the failing one included
    pub submitted: usize,
    pub skipped_rows: usize,
    pub results: Vec<PredictionOutcome>,
    pub failure: Option<RunFailure>,
}
