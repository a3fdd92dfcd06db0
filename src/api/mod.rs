//! REST API module using Axum
//!
//! Local dashboard surface over the stream client: start and cancel stream
//! runs, read their progress, follow them live over SSE, and run single-record
//! predictions.

pub mod envelope;
pub mod events;
pub mod handlers;
mod routes;

pub use events::StreamEvent;
pub use handlers::{DashboardState, DynService};

use anyhow::Context;
use axum::http::{header, Method};
use axum::Router;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Build a CORS layer that is restrictive by default (same-origin only).
///
/// Set `FAILSTREAM_CORS_ORIGINS` to a comma-separated list of allowed origins
/// for a browser dashboard served elsewhere (e.g. `http://localhost:5173`).
fn build_cors_layer() -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    match std::env::var("FAILSTREAM_CORS_ORIGINS") {
        Ok(origins) => {
            let allowed: Vec<_> = origins
                .split(',')
                .filter_map(|o| o.trim().parse().ok())
                .collect();
            info!(origins = %origins, "CORS: allowing configured origins");
            base.allow_origin(allowed)
        }
        Err(_) => base,
    }
}

/// Create the complete application router.
pub fn create_app(state: DashboardState) -> Router {
    Router::new()
        .nest("/api", routes::api_routes(state.clone()))
        .merge(routes::health_routes(state))
        .layer(TraceLayer::new_for_http())
        .layer(build_cors_layer())
}

/// Serve the dashboard on `addr` until `shutdown` is cancelled.
pub async fn serve(
    addr: &str,
    state: DashboardState,
    shutdown: CancellationToken,
) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!("✓ HTTP server listening on {}", addr);
    info!("🎯 Dashboard API available at: http://{}/api", addr);

    axum::serve(listener, create_app(state))
        .with_graceful_shutdown(async move {
            shutdown.cancelled().await;
            info!("[HttpServer] Received shutdown signal");
        })
        .await
        .context("HTTP server error")?;

    info!("[HttpServer] Graceful shutdown complete");
    Ok(())
}
