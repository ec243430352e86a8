use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::error::RosterError;
use crate::service::ScheduleService;

pub const SCHEDULE_TABLE_PATH: &str = "/api/schedule-table/";
pub const HEALTH_PATH: &str = "/health";

#[derive(Clone)]
pub struct ApiState {
    pub service: Arc<ScheduleService>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub detail: String,
    pub code: String,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
}

/// Map a failure to the JSON error body and status returned to clients.
pub fn error_response(err: &RosterError) -> (StatusCode, Json<ErrorResponse>) {
    let (error, detail, code) = match err {
        RosterError::Load(e) => (
            "Failed to load data from JSON files",
            e.to_string(),
            "DATA_LOAD_ERROR",
        ),
        RosterError::DataIntegrity(e) => (
            "Failed to process schedule data",
            e.to_string(),
            "PROCESSING_ERROR",
        ),
        RosterError::Internal(_) => (
            "Internal server error",
            "An unexpected error occurred".to_string(),
            "INTERNAL_ERROR",
        ),
    };

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: error.to_string(),
            detail,
            code: code.to_string(),
        }),
    )
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([Method::GET])
        .allow_headers(Any);

    if allowed_origins.is_empty() {
        return base.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(origin = %origin, error = %e, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    base.allow_origin(AllowOrigin::list(origins))
}

/// Routes for the schedule API.
pub fn router(state: ApiState, allowed_origins: &[String]) -> Router {
    Router::new()
        .route(SCHEDULE_TABLE_PATH, get(schedule_table_handler))
        .route(HEALTH_PATH, get(health_handler))
        .layer(cors_layer(allowed_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve the API on `addr` until `shutdown` is cancelled.
pub async fn run_api(
    addr: SocketAddr,
    app: Router,
    shutdown: CancellationToken,
) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(addr = %addr, "Starting schedule API server");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await?;

    tracing::info!("Schedule API server stopped");
    Ok(())
}

async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse { status: "ok" })
}

async fn schedule_table_handler(State(state): State<ApiState>) -> Response {
    tracing::info!("Processing schedule table request");

    match state.service.schedule_table().await {
        Ok(table) => {
            let view = table.to_view();
            tracing::info!(rows = view.rows.len(), "Returned schedule data");
            (StatusCode::OK, Json(view)).into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "Schedule table request failed");
            error_response(&e).into_response()
        }
    }
}
