//! Form-based web UI for the Itinera travel planner.
//!
//! # Endpoints
//!
//! - `GET /` - Preferences form
//! - `POST /plan` - Start a planning job from the form, redirect to its page
//! - `GET /jobs/{id}` - Stage progress, then the itinerary or the error
//! - `POST /api/v1/itinerary` - Run the planner and return the itinerary as JSON
//! - `POST /api/v1/jobs` - JSON variant of `/plan`; answers 202 with a status URL
//! - `GET /api/v1/jobs/{id}` - Job status as JSON
//! - `GET /plans/{file}` - Download a saved itinerary document
//! - `GET /health` - Health check
//!
//! Each submission builds its own planner, so API keys entered in the form
//! apply to that request only.

pub mod form;
pub mod jobs;
pub mod pages;
pub mod routes;
pub mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Router,
    http::HeaderValue,
    routing::{get, post},
};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

pub use form::PlanRequest;
pub use jobs::{JobObserver, JobRegistry};
pub use state::{AppState, ConfiguredPlanners, PlannerFactory};

fn cors_layer(origins: Option<Vec<String>>) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    match origins {
        Some(origins) => {
            let parsed: Vec<HeaderValue> = origins
                .iter()
                .filter_map(|origin| match HeaderValue::from_str(origin) {
                    Ok(value) => Some(value),
                    Err(_) => {
                        warn!(origin = %origin, "Ignoring invalid CORS origin");
                        None
                    }
                })
                .collect();
            layer.allow_origin(AllowOrigin::list(parsed))
        }
        None => layer.allow_origin(Any),
    }
}

/// Create the router with all routes configured.
///
/// `cors_origins` restricts cross-origin access; `None` allows any origin.
pub fn create_router(state: Arc<AppState>, cors_origins: Option<Vec<String>>) -> Router {
    Router::new()
        .route("/", get(routes::index))
        .route("/plan", post(routes::submit_plan))
        .route("/jobs/{id}", get(routes::job_page))
        .route("/api/v1/itinerary", post(routes::api_itinerary))
        .route("/api/v1/jobs", post(routes::api_start_job))
        .route("/api/v1/jobs/{id}", get(routes::api_job_status))
        .route("/plans/{file}", get(routes::download_plan))
        .route("/health", get(routes::health))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(cors_origins))
        .with_state(state)
}

/// Start the web server on the given address.
pub async fn serve(
    state: Arc<AppState>,
    addr: SocketAddr,
    cors_origins: Option<Vec<String>>,
) -> anyhow::Result<()> {
    let router = create_router(state, cors_origins);

    info!(%addr, "Starting Itinera web server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
