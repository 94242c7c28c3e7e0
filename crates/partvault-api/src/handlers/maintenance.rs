//! Store-wide maintenance operations: orphan/dangling scans, mass (logical)
//! rename, physical rename, and physical delete.

use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    Json,
};
use partvault_core::models::FileCategory;
use partvault_core::AppError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Serialize, ToSchema)]
pub struct OrphansResponse {
    pub orphans: Vec<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DanglingResponse {
    pub dangling: Vec<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UpdatedComponentsResponse {
    pub updated_components: u64,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct MassRenameRequest {
    #[validate(length(min = 1))]
    pub old_file_name: String,
    #[validate(length(min = 1))]
    pub new_file_name: String,
    /// `null` means every component currently referencing the file.
    pub component_ids: Option<Vec<String>>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct PhysicalRenameRequest {
    #[validate(length(min = 1))]
    pub old_file_name: String,
    #[validate(length(min = 1))]
    pub new_file_name: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct PhysicalDeleteRequest {
    #[validate(length(min = 1))]
    pub file_name: String,
}

/// List stored files of a category that no component references.
#[utoipa::path(
    get,
    path = "/api/v0/files/{category}/orphans",
    tag = "maintenance",
    params(("category" = FileCategory, Path, description = "File category")),
    responses(
        (status = 200, description = "Orphaned filenames", body = OrphansResponse)
    )
)]
#[tracing::instrument(skip(state), fields(operation = "get_orphan_files", category = %category))]
pub async fn get_orphan_files(
    State(state): State<Arc<AppState>>,
    Path(category): Path<FileCategory>,
) -> Result<Json<OrphansResponse>, HttpAppError> {
    let orphans = state.orphans.list_orphans(category).await?;
    Ok(Json(OrphansResponse { orphans }))
}

/// Health check: references whose backing file is missing from the store.
#[utoipa::path(
    get,
    path = "/api/v0/files/{category}/dangling",
    tag = "maintenance",
    params(("category" = FileCategory, Path, description = "File category")),
    responses(
        (status = 200, description = "Dangling reference filenames", body = DanglingResponse)
    )
)]
#[tracing::instrument(skip(state), fields(operation = "get_dangling_references", category = %category))]
pub async fn get_dangling_references(
    State(state): State<Arc<AppState>>,
    Path(category): Path<FileCategory>,
) -> Result<Json<DanglingResponse>, HttpAppError> {
    let dangling = state.orphans.list_dangling(category).await?;
    Ok(Json(DanglingResponse { dangling }))
}

/// Mass (database-only) rename: rewrite the reference filename for the given
/// components without moving bytes. `component_ids: null` targets every
/// component currently referencing the file.
#[utoipa::path(
    post,
    path = "/api/v0/files/{category}/mass-rename",
    tag = "maintenance",
    params(("category" = FileCategory, Path, description = "File category")),
    request_body = MassRenameRequest,
    responses(
        (status = 200, description = "References rewritten"),
        (status = 404, description = "Nothing references the old name and no such file is stored", body = ErrorResponse),
        (status = 400, description = "Invalid input", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, request), fields(operation = "mass_rename_file", category = %category))]
pub async fn mass_rename_file(
    State(state): State<Arc<AppState>>,
    Path(category): Path<FileCategory>,
    ValidatedJson(request): ValidatedJson<MassRenameRequest>,
) -> Result<Json<serde_json::Value>, HttpAppError> {
    request
        .validate()
        .map_err(|e| AppError::InvalidInput(e.to_string()))?;

    state
        .coordinator
        .rename_logical(
            category,
            &request.old_file_name,
            &request.new_file_name,
            request.component_ids,
        )
        .await?;

    Ok(Json(serde_json::json!({})))
}

/// Physically rename a stored file and cascade the new name to every
/// component referencing it.
#[utoipa::path(
    post,
    path = "/api/v0/files/{category}/rename",
    tag = "maintenance",
    params(("category" = FileCategory, Path, description = "File category")),
    request_body = PhysicalRenameRequest,
    responses(
        (status = 200, description = "File renamed everywhere", body = UpdatedComponentsResponse),
        (status = 404, description = "No such file", body = ErrorResponse),
        (status = 409, description = "Target name already taken", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, request), fields(operation = "rename_physical_file", category = %category))]
pub async fn rename_physical_file(
    State(state): State<Arc<AppState>>,
    Path(category): Path<FileCategory>,
    ValidatedJson(request): ValidatedJson<PhysicalRenameRequest>,
) -> Result<Json<UpdatedComponentsResponse>, HttpAppError> {
    request
        .validate()
        .map_err(|e| AppError::InvalidInput(e.to_string()))?;

    let updated_components = state
        .coordinator
        .rename_physical(category, &request.old_file_name, &request.new_file_name)
        .await?;

    Ok(Json(UpdatedComponentsResponse { updated_components }))
}

/// Delete a stored file and every reference to it.
#[utoipa::path(
    post,
    path = "/api/v0/files/{category}/delete",
    tag = "maintenance",
    params(("category" = FileCategory, Path, description = "File category")),
    request_body = PhysicalDeleteRequest,
    responses(
        (status = 200, description = "File and references removed", body = UpdatedComponentsResponse),
        (status = 404, description = "No such file", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, request), fields(operation = "delete_physical_file", category = %category))]
pub async fn delete_physical_file(
    State(state): State<Arc<AppState>>,
    Path(category): Path<FileCategory>,
    ValidatedJson(request): ValidatedJson<PhysicalDeleteRequest>,
) -> Result<Json<UpdatedComponentsResponse>, HttpAppError> {
    request
        .validate()
        .map_err(|e| AppError::InvalidInput(e.to_string()))?;

    let updated_components = state
        .coordinator
        .delete(category, &request.file_name)
        .await?;

    Ok(Json(UpdatedComponentsResponse { updated_components }))
}
