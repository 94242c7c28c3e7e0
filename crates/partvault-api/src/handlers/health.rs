//! Health check endpoint.

use crate::error::HttpAppError;
use crate::state::AppState;
use axum::{extract::State, Json};
use partvault_core::AppError;
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Liveness/readiness probe: verifies the database answers.
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses((status = 200, description = "Service healthy", body = HealthResponse))
)]
pub async fn health(
    State(state): State<Arc<AppState>>,
) -> Result<Json<HealthResponse>, HttpAppError> {
    sqlx::query("SELECT 1")
        .execute(&state.pool)
        .await
        .map_err(AppError::from)?;

    Ok(Json(HealthResponse { status: "ok" }))
}
