//! Stream orchestrator: parse, submit, accumulate, pace.
//!
//! One run walks the records of one source text strictly in order. Each record
//! is submitted and its outcome appended (notifying observers) before the
//! pacing delay and the next record. The first submission failure ends the run;
//! outcomes gathered until then stay in the [`StreamState`].

use std::time::Instant;

use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::pacing::PacingController;
use super::state::StreamState;
use crate::acquisition::parse_records;
use crate::client::{PredictionService, RemoteError, SubmissionClient};
use crate::config::defaults::PROGRESS_LOG_INTERVAL;
use crate::types::{RunFailure, StreamPhase};

/// Stream run errors
#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    #[error("A stream run is already in progress")]
    AlreadyRunning,
    #[error(transparent)]
    Remote(#[from] RemoteError),
}

/// Summary of a run that was not cut short by a failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub source: String,
    /// Completed or Cancelled
    pub phase: StreamPhase,
    pub submitted: usize,
    pub skipped_rows: usize,
    pub elapsed_ms: u64,
}

/// Drives stream runs against one prediction service.
pub struct StreamOrchestrator<S> {
    client: SubmissionClient<S>,
    pacer: PacingController,
}

impl<S: PredictionService> StreamOrchestrator<S> {
    pub fn new(client: SubmissionClient<S>, pacer: PacingController) -> Self {
        Self { client, pacer }
    }

    pub fn client(&self) -> &SubmissionClient<S> {
        &self.client
    }

    pub fn pacer(&self) -> &PacingController {
        &self.pacer
    }

    /// Stream every record of `text` to the service.
    ///
    /// `state` is reset at the start and receives each outcome as it arrives.
    /// `cancel` is checked before each submission and during the pacing delay
    /// that precedes it; an in-flight request is never interrupted. No delay
    /// follows the last record, so a run that submitted everything completes.
    pub async fn run(
        &self,
        state: &mut StreamState,
        source: &str,
        text: &str,
        cancel: &CancellationToken,
    ) -> Result<RunSummary, StreamError> {
        if state.is_running() {
            warn!(source, "Rejecting stream run: another run is in progress");
            return Err(StreamError::AlreadyRunning);
        }

        let started = Instant::now();
        state.begin(source);
        info!(
            source,
            service = self.client.service().service_name(),
            pacing_ms = u64::try_from(self.pacer.delay().as_millis()).unwrap_or(u64::MAX),
            "📊 Streaming records..."
        );

        let mut records = parse_records(text);
        let mut position = 0usize;
        // One record of lookahead: pacing and cancellation only apply while
        // another record is waiting.
        let mut next = records.next().map(|r| (records.line(), r));

        let phase = loop {
            if cancel.is_cancelled() {
                break StreamPhase::Cancelled;
            }
            let Some((line, record)) = next.take() else {
                break StreamPhase::Completed;
            };
            position += 1;
            state.record_submission();

            match self.client.submit(&record, position).await {
                Ok(outcome) => state.push_outcome(outcome),
                Err(err) => {
                    warn!(source, position, line, error = %err.source, "Stream run failed");
                    let failure = RunFailure {
                        position: err.position,
                        line,
                        message: err.to_string(),
                    };
                    state.finish(StreamPhase::Failed, records.skipped(), Some(failure));
                    return Err(StreamError::Remote(err));
                }
            }

            if position % PROGRESS_LOG_INTERVAL == 0 {
                info!("📈 Progress: {} records | Skipped rows: {}", position, records.skipped());
            } else {
                debug!(position, "Record streamed");
            }

            next = records.next().map(|r| (records.line(), r));
            if next.is_none() {
                break StreamPhase::Completed;
            }

            tokio::select! {
                _ = cancel.cancelled() => break StreamPhase::Cancelled,
                _ = self.pacer.wait() => {}
            }
        };

        state.finish(phase, records.skipped(), None);

        let summary = RunSummary {
            source: source.to_string(),
            phase,
            submitted: state.submitted(),
            skipped_rows: records.skipped(),
            elapsed_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
        };
        info!(
            "Stream {} ({} records, {} skipped rows, {} ms)",
            summary.phase, summary.submitted, summary.skipped_rows, summary.elapsed_ms
        );
        Ok(summary)
    }
}
