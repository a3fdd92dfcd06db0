//! API route definitions
//!
//! - /api/info - Service address, pacing, chart URL
//! - /api/predict - Single-record prediction
//! - /api/stream - Start a stream (POST) or read its snapshot (GET)
//! - /api/stream/cancel - Stop the running stream
//! - /api/stream/events - Live stream events (SSE)

use axum::{
    routing::{get, post},
    Router,
};

use super::events;
use super::handlers::{self, DashboardState};

/// Create all API routes for the dashboard
pub fn api_routes(state: DashboardState) -> Router {
    Router::new()
        .route("/info", get(handlers::get_info))
        .route("/predict", post(handlers::post_predict))
        .route("/stream", get(handlers::get_stream).post(handlers::post_stream))
        .route("/stream/cancel", post(handlers::post_cancel))
        .route("/stream/events", get(events::event_stream))
        .with_state(state)
}

/// Health endpoint at root level
pub fn health_routes(state: DashboardState) -> Router {
    Router::new()
        .route("/health", get(handlers::get_health))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::scripted::ScriptedService;
    use crate::client::SubmissionClient;
    use crate::pipeline::{PacingController, StreamOrchestrator, StreamSnapshot};
    use crate::types::StreamPhase;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use std::time::Duration;
    use tower::ServiceExt;

    const TWO_ROWS: &str =
        "header\nM14860,M,298.1,308.6,1551,42.8,0\nL47182,L,298.2,308.7,1408,46.3,3\n";

    fn create_test_state(service: ScriptedService, pacing_ms: u64) -> DashboardState {
        let orchestrator = StreamOrchestrator::new(
            SubmissionClient::new(Box::new(service) as handlers::DynService),
            PacingController::from_millis(pacing_ms),
        );
        DashboardState::new(orchestrator, 16, "http://svc/static/chart.png".to_string())
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn post(uri: &str, content_type: &str, body: impl Into<Body>) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, content_type)
            .body(body.into())
            .unwrap()
    }

    async fn wait_until(state: &DashboardState, what: &str, done: impl Fn(&StreamSnapshot) -> bool) {
        for _ in 0..200 {
            if done(&super::events::read_snapshot(&state.snapshot)) {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("stream never reached: {what}");
    }

    async fn wait_for_phase(state: &DashboardState, phase: StreamPhase) {
        wait_until(state, &phase.to_string(), |snap| snap.phase == phase).await;
    }

    #[tokio::test]
    async fn test_health_route() {
        let app = health_routes(create_test_state(ScriptedService::default(), 0));

        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["stream_phase"], "idle");
    }

    #[tokio::test]
    async fn test_info_route() {
        let app = api_routes(create_test_state(ScriptedService::default(), 1000));

        let response = app
            .oneshot(Request::builder().uri("/info").body(Body::empty()).unwrap())
            .await
            .unwrap();

        let json = body_json(response).await;
        assert_eq!(json["data"]["pacing_ms"], 1000);
        assert_eq!(json["data"]["service"], "scripted");
        assert_eq!(
            json["data"]["feature_importance_url"],
            "http://svc/static/chart.png"
        );
    }

    #[tokio::test]
    async fn test_predict_route_success() {
        let app = api_routes(create_test_state(ScriptedService::default(), 0));
        let form = serde_json::json!({
            "product_id": "L47230", "type": "L",
            "air_temperature": 300.0, "process_temperature": 310.0,
            "rotational_speed": 1500.0, "torque": 62.0, "tool_wear": 150.0
        });

        let response = app
            .oneshot(post("/predict", "application/json", form.to_string()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["status"], "ok");
        assert_eq!(json["outcome"]["predicted"], true);
    }

    #[tokio::test]
    async fn test_predict_route_failure_is_displayable() {
        let app = api_routes(create_test_state(ScriptedService::failing_on(1), 0));
        let form = serde_json::json!({
            "product_id": "L47230", "type": "L",
            "air_temperature": 300.0, "process_temperature": 310.0,
            "rotational_speed": 1500.0, "torque": 40.0, "tool_wear": 150.0
        });

        let response = app
            .oneshot(post("/predict", "application/json", form.to_string()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["status"], "error");
    }

    #[tokio::test]
    async fn test_predict_route_rejects_blank_product_id() {
        let service = ScriptedService::default();
        let app = api_routes(create_test_state(service.clone(), 0));
        let form = serde_json::json!({
            "product_id": "", "type": "L",
            "air_temperature": 300.0, "process_temperature": 310.0,
            "rotational_speed": 1500.0, "torque": 40.0, "tool_wear": 150.0
        });

        let response = app
            .oneshot(post("/predict", "application/json", form.to_string()))
            .await
            .unwrap();

        let json = body_json(response).await;
        assert_eq!(json["message"], "Please enter Product ID");
        assert!(service.calls().is_empty());
    }

    #[tokio::test]
    async fn test_stream_runs_to_completion() {
        let service = ScriptedService::default();
        let state = create_test_state(service.clone(), 0);
        let app = api_routes(state.clone());

        let response = app
            .clone()
            .oneshot(post("/stream?source=two.csv", "text/csv", TWO_ROWS))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::ACCEPTED);

        wait_for_phase(&state, StreamPhase::Completed).await;

        let response = app
            .oneshot(Request::builder().uri("/stream").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let json = body_json(response).await;
        assert_eq!(json["data"]["source"], "two.csv");
        assert_eq!(json["data"]["results"].as_array().unwrap().len(), 2);
        assert_eq!(service.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_second_stream_is_rejected_while_running() {
        let state = create_test_state(ScriptedService::default(), 5_000);
        let app = api_routes(state.clone());

        let first = app
            .clone()
            .oneshot(post("/stream", "text/csv", TWO_ROWS))
            .await
            .unwrap();
        assert_eq!(first.status(), StatusCode::ACCEPTED);

        let second = app
            .clone()
            .oneshot(post("/stream", "text/csv", TWO_ROWS))
            .await
            .unwrap();
        assert_eq!(second.status(), StatusCode::CONFLICT);

        wait_until(&state, "first outcome", |snap| snap.results.len() == 1).await;
        let cancel = app
            .oneshot(post("/stream/cancel", "application/json", Body::empty()))
            .await
            .unwrap();
        assert_eq!(body_json(cancel).await["data"]["cancelled"], true);

        wait_for_phase(&state, StreamPhase::Cancelled).await;
        assert_eq!(super::events::read_snapshot(&state.snapshot).results.len(), 1);
    }

    #[tokio::test]
    async fn test_cancel_right_after_start_stops_the_run() {
        let service = ScriptedService::default();
        let state = create_test_state(service.clone(), 5_000);
        let app = api_routes(state.clone());
        let four_rows = format!("{TWO_ROWS}A1,L,298,308,1500,40,1\nA2,M,298,308,1500,40,1\n");

        let start = app
            .clone()
            .oneshot(post("/stream", "text/csv", four_rows))
            .await
            .unwrap();
        assert_eq!(start.status(), StatusCode::ACCEPTED);

        let cancel = app
            .oneshot(post("/stream/cancel", "application/json", Body::empty()))
            .await
            .unwrap();
        assert_eq!(body_json(cancel).await["data"]["cancelled"], true);

        wait_for_phase(&state, StreamPhase::Cancelled).await;
        assert!(service.calls().len() <= 1);
        assert!(super::events::read_snapshot(&state.snapshot).results.len() <= 1);
    }

    #[tokio::test]
    async fn test_cancel_when_idle_reports_nothing_cancelled() {
        let app = api_routes(create_test_state(ScriptedService::default(), 0));

        let cancel = app
            .oneshot(post("/stream/cancel", "application/json", Body::empty()))
            .await
            .unwrap();

        assert_eq!(body_json(cancel).await["data"]["cancelled"], false);
    }

    #[tokio::test]
    async fn test_stream_failure_keeps_partial_results() {
        let state = create_test_state(ScriptedService::failing_on(2), 0);
        let app = api_routes(state.clone());

        app.oneshot(post("/stream", "text/csv", TWO_ROWS))
            .await
            .unwrap();
        wait_for_phase(&state, StreamPhase::Failed).await;

        let snap = super::events::read_snapshot(&state.snapshot);
        assert_eq!(snap.results.len(), 1);
        assert_eq!(snap.submitted, 2);
        assert_eq!(snap.failure.map(|f| f.position), Some(2));
    }

    #[tokio::test]
    async fn test_empty_upload_is_bad_request() {
        let app = api_routes(create_test_state(ScriptedService::default(), 0));

        let response = app
            .oneshot(post("/stream", "text/csv", "  \n"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
