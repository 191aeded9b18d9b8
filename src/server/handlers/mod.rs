//! HTTP API handlers organized by resource.

pub mod images;
pub mod layout;

// Re-export all handlers for use in routing
pub(crate) use images::{
    bulk_update_positions, delete_image, get_image, list_images, toggle_like, trending_images,
    update_image, upload_image,
};
pub(crate) use layout::layout_images;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use chrono::Utc;
use tracing::warn;

use super::AppState;
use super::types::HealthResponse;

/// GET /api/health - Liveness probe including a database ping.
pub(crate) async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    match state.store.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "ok",
                timestamp: Utc::now(),
                database: "connected",
            }),
        ),
        Err(e) => {
            warn!(error = ?e, "Health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse {
                    status: "error",
                    timestamp: Utc::now(),
                    database: "disconnected",
                }),
            )
        },
    }
}
