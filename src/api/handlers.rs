//! Dashboard API handlers: health, single prediction, stream control

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError};

use axum::extract::{Query, State};
use axum::response::Response;
use axum::Json;
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::envelope::{ApiErrorResponse, ApiResponse};
use super::events::{read_snapshot, DashboardObserver, SharedSnapshot, StreamEvent};
use crate::client::PredictionService;
use crate::pipeline::{StreamOrchestrator, StreamState};
use crate::types::{PredictionForm, SinglePrediction, StreamPhase};

/// Prediction service behind the dashboard.
pub type DynService = Box<dyn PredictionService>;

/// Default source name when an upload does not name itself.
const UNNAMED_SOURCE: &str = "upload.csv";

// ============================================================================
// State
// ============================================================================

/// Shared state for all dashboard handlers.
///
/// The stream session lives behind an async mutex: a running stream holds it
/// for the whole run, so a second start finds it locked and is refused.
/// Handlers read progress from the snapshot the observer maintains.
///
/// `active` is raised as soon as a start is accepted, before the run task
/// has reported anything, and lowered when that task is done.
#[derive(Clone)]
pub struct DashboardState {
    pub orchestrator: Arc<StreamOrchestrator<DynService>>,
    pub session: Arc<Mutex<StreamState>>,
    pub active: Arc<AtomicBool>,
    pub snapshot: SharedSnapshot,
    pub events: broadcast::Sender<StreamEvent>,
    pub cancel: Arc<std::sync::Mutex<CancellationToken>>,
    pub asset_url: String,
}

impl DashboardState {
    pub fn new(
        orchestrator: StreamOrchestrator<DynService>,
        event_buffer: usize,
        asset_url: String,
    ) -> Self {
        let (events, _) = broadcast::channel(event_buffer.max(1));
        let snapshot = SharedSnapshot::default();

        let mut session = StreamState::new();
        session.subscribe(Box::new(DashboardObserver::new(
            snapshot.clone(),
            events.clone(),
        )));

        Self {
            orchestrator: Arc::new(orchestrator),
            session: Arc::new(Mutex::new(session)),
            active: Arc::new(AtomicBool::new(false)),
            snapshot,
            events,
            cancel: Arc::new(std::sync::Mutex::new(CancellationToken::new())),
            asset_url,
        }
    }

    fn replace_cancel_token(&self) -> CancellationToken {
        let token = CancellationToken::new();
        *self.cancel.lock().unwrap_or_else(PoisonError::into_inner) = token.clone();
        token
    }
}

// ============================================================================
// Health / Info
// ============================================================================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub stream_phase: StreamPhase,
}

/// GET /health - Dashboard liveness
pub async fn get_health(State(state): State<DashboardState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        stream_phase: read_snapshot(&state.snapshot).phase,
    })
}

#[derive(Debug, Serialize)]
pub struct InfoResponse {
    pub service: String,
    pub pacing_ms: u64,
    /// Feature importance chart, for display only
    pub feature_importance_url: String,
}

/// GET /api/info - Service address, pacing and chart location
pub async fn get_info(State(state): State<DashboardState>) -> Response {
    let pacing_ms =
        u64::try_from(state.orchestrator.pacer().delay().as_millis()).unwrap_or(u64::MAX);
    ApiResponse::ok(InfoResponse {
        service: state
            .orchestrator
            .client()
            .service()
            .service_name()
            .to_string(),
        pacing_ms,
        feature_importance_url: state.asset_url.clone(),
    })
}

// ============================================================================
// Single Prediction
// ============================================================================

/// POST /api/predict - Predict one record from form values
///
/// Always answers 200; failures come back as `{"status": "error", ...}`.
pub async fn post_predict(
    State(state): State<DashboardState>,
    Json(form): Json<PredictionForm>,
) -> Json<SinglePrediction> {
    let record = match form.into_record() {
        Ok(record) => record,
        Err(message) => return Json(SinglePrediction::error(message)),
    };
    Json(state.orchestrator.client().submit_single(&record).await)
}

// ============================================================================
// Stream Control
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct StreamParams {
    /// Display name of the uploaded file
    pub source: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct StreamStarted {
    pub source: String,
}

/// POST /api/stream?source=<name> - Start streaming the CSV in the body
pub async fn post_stream(
    State(state): State<DashboardState>,
    Query(params): Query<StreamParams>,
    body: String,
) -> Response {
    if body.trim().is_empty() {
        return ApiErrorResponse::bad_request("Request body must contain the CSV file contents");
    }

    let Ok(mut session) = state.session.clone().try_lock_owned() else {
        return ApiErrorResponse::conflict("A stream run is already in progress");
    };

    let source = params
        .source
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| UNNAMED_SOURCE.to_string());
    let token = state.replace_cancel_token();
    state.active.store(true, Ordering::SeqCst);
    let active = state.active.clone();
    let orchestrator = state.orchestrator.clone();
    let snapshot = state.snapshot.clone();
    let run_source = source.clone();

    tokio::spawn(async move {
        match orchestrator
            .run(&mut session, &run_source, &body, &token)
            .await
        {
            Ok(summary) => info!(
                source = %summary.source,
                records = summary.submitted,
                "Dashboard stream {}", summary.phase
            ),
            Err(e) => warn!(source = %run_source, "Streaming failed: {}", e),
        }
        // Final state includes the skipped-row count the observer never sees.
        *snapshot.write().unwrap_or_else(PoisonError::into_inner) = session.snapshot();
        // Lowered while the session is still held, so a new start cannot race it.
        active.store(false, Ordering::SeqCst);
        drop(session);
    });

    ApiResponse::accepted(StreamStarted { source })
}

/// GET /api/stream - Current stream snapshot
pub async fn get_stream(State(state): State<DashboardState>) -> Response {
    ApiResponse::ok(read_snapshot(&state.snapshot))
}

#[derive(Debug, Serialize)]
pub struct CancelResponse {
    pub cancelled: bool,
}

/// POST /api/stream/cancel - Stop the running stream before its next record
///
/// Also stops a run that was accepted but has not sent anything yet.
pub async fn post_cancel(State(state): State<DashboardState>) -> Response {
    let running = state.active.load(Ordering::SeqCst);
    if running {
        state
            .cancel
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .cancel();
        info!("Stream cancellation requested");
    }
    ApiResponse::ok(CancelResponse { cancelled: running })
}
