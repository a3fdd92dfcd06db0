//! Live stream events for dashboard clients
//!
//! [`DashboardObserver`] sits on the stream's result accumulator. Every
//! callback updates the shared [`StreamSnapshot`] and broadcasts a
//! [`StreamEvent`], which `GET /api/stream/events` forwards as Server-Sent
//! Events.

use std::convert::Infallible;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::{self, Stream, StreamExt};
use serde::Serialize;
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;
use tracing::{debug, warn};

use super::DashboardState;
use crate::config::defaults::SSE_KEEP_ALIVE_SECS;
use crate::pipeline::{OutcomeObserver, StreamSnapshot};
use crate::types::{PredictionOutcome, RunFailure, StreamPhase};

/// Progress of the current run, as pushed to dashboard clients.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum StreamEvent {
    Started {
        source: String,
    },
    Outcome {
        position: usize,
        outcome: PredictionOutcome,
    },
    Finished {
        phase: StreamPhase,
        failure: Option<RunFailure>,
    },
}

impl StreamEvent {
    /// SSE `event:` field
    pub fn name(&self) -> &'static str {
        match self {
            StreamEvent::Started { .. } => "started",
            StreamEvent::Outcome { .. } => "outcome",
            StreamEvent::Finished { .. } => "finished",
        }
    }
}

/// Shared, lock-protected view of the latest run.
pub type SharedSnapshot = Arc<RwLock<StreamSnapshot>>;

/// Read the snapshot, tolerating a poisoned lock.
pub fn read_snapshot(snapshot: &SharedSnapshot) -> StreamSnapshot {
    snapshot
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
}

/// Accumulator observer that feeds the dashboard.
pub struct DashboardObserver {
    snapshot: SharedSnapshot,
    events: broadcast::Sender<StreamEvent>,
}

impl DashboardObserver {
    pub fn new(snapshot: SharedSnapshot, events: broadcast::Sender<StreamEvent>) -> Self {
        Self { snapshot, events }
    }

    fn update(&self, f: impl FnOnce(&mut StreamSnapshot)) {
        let mut snap = self.snapshot.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut snap);
    }

    fn publish(&self, event: StreamEvent) {
        // No subscribers is fine: nobody is watching.
        let _ = self.events.send(event);
    }
}

impl OutcomeObserver for DashboardObserver {
    fn on_run_started(&mut self, source: &str) {
        self.update(|snap| {
            *snap = StreamSnapshot {
                phase: StreamPhase::Running,
                source: Some(source.to_string()),
                ..StreamSnapshot::default()
            };
        });
        self.publish(StreamEvent::Started {
            source: source.to_string(),
        });
    }

    fn on_outcome(&mut self, position: usize, outcome: &PredictionOutcome) {
        self.update(|snap| {
            snap.results.push(outcome.clone());
            snap.submitted = position;
        });
        self.publish(StreamEvent::Outcome {
            position,
            outcome: outcome.clone(),
        });
    }

    fn on_run_finished(&mut self, phase: StreamPhase, failure: Option<&RunFailure>) {
        self.update(|snap| {
            snap.phase = phase;
            if let Some(f) = failure {
                // The failing record was sent too.
                snap.submitted = f.position;
            }
            snap.failure = failure.cloned();
        });
        self.publish(StreamEvent::Finished {
            phase,
            failure: failure.cloned(),
        });
    }
}

/// GET /api/stream/events - SSE event stream
///
/// Sends the current snapshot first, then every stream event as it happens.
pub async fn event_stream(
    State(state): State<DashboardState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    debug!("New SSE client connected");

    let rx = state.events.subscribe();
    let initial = read_snapshot(&state.snapshot);

    let first = stream::once(async move {
        let event = Event::default()
            .event("snapshot")
            .json_data(&initial)
            .unwrap_or_else(|_| Event::default().event("snapshot"));
        Ok(event)
    });

    let live = BroadcastStream::new(rx).filter_map(|result| async move {
        match result {
            Ok(event) => match Event::default().event(event.name()).json_data(&event) {
                Ok(sse) => Some(Ok(sse)),
                Err(e) => {
                    warn!("Failed to serialize stream event: {}", e);
                    None
                }
            },
            Err(e) => {
                // Lagged receiver: the client missed events
                warn!("SSE stream error: {:?}", e);
                None
            }
        }
    });

    Sse::new(first.chain(live)).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(SSE_KEEP_ALIVE_SECS))
            .text("keep-alive"),
    )
}
