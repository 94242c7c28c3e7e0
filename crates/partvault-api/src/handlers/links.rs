//! Link/unlink endpoints.
//!
//! Attach or detach an existing stored file on a component field. These are
//! reference-only operations; bytes never move. Unlinking here is idempotent
//! by design, unlike the DELETE route which 404s on a missing reference.

use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
};
use partvault_core::models::FileCategory;
use partvault_core::AppError;
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LinkRequest {
    #[validate(length(min = 1))]
    pub file_name: String,
}

/// Link an existing stored file to a component's field for this category.
#[utoipa::path(
    post,
    path = "/api/v0/components/{id}/files/{category}/link",
    tag = "links",
    params(
        ("id" = String, Path, description = "Component identifier"),
        ("category" = FileCategory, Path, description = "File category")
    ),
    request_body = LinkRequest,
    responses(
        (status = 204, description = "Reference created"),
        (status = 404, description = "No such stored file", body = ErrorResponse),
        (status = 409, description = "Cardinality violation or duplicate reference", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, request), fields(operation = "link_file", category = %category))]
pub async fn link_file(
    State(state): State<Arc<AppState>>,
    Path((component_id, category)): Path<(String, FileCategory)>,
    ValidatedJson(request): ValidatedJson<LinkRequest>,
) -> Result<StatusCode, HttpAppError> {
    request
        .validate()
        .map_err(|e| AppError::InvalidInput(e.to_string()))?;

    state
        .links
        .link(&component_id, category.field(), &request.file_name)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Unlink a file from a component's field. The file stays in the asset
/// store; unlinking an already-unlinked file is a no-op.
#[utoipa::path(
    post,
    path = "/api/v0/components/{id}/files/{category}/unlink",
    tag = "links",
    params(
        ("id" = String, Path, description = "Component identifier"),
        ("category" = FileCategory, Path, description = "File category")
    ),
    request_body = LinkRequest,
    responses(
        (status = 204, description = "Reference removed (or was already absent)")
    )
)]
#[tracing::instrument(skip(state, request), fields(operation = "unlink_file", category = %category))]
pub async fn unlink_file(
    State(state): State<Arc<AppState>>,
    Path((component_id, category)): Path<(String, FileCategory)>,
    ValidatedJson(request): ValidatedJson<LinkRequest>,
) -> Result<StatusCode, HttpAppError> {
    request
        .validate()
        .map_err(|e| AppError::InvalidInput(e.to_string()))?;

    state
        .links
        .unlink(&component_id, category.field(), &request.file_name)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
