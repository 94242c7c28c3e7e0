//! Per-component file operations: listing, unlinking, display-name rename,
//! download, and full export.

use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use partvault_core::models::{ComponentFiles, FileCategory, FileInfo};
use partvault_core::AppError;
use partvault_services::export_component_archive;
use partvault_storage::{object_key, AssetStore};
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Serialize, ToSchema)]
pub struct ComponentFilesResponse {
    /// Mapping from component field to its ordered file list.
    #[schema(value_type = Object)]
    pub files: ComponentFiles,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RenameComponentFileRequest {
    #[validate(length(min = 1))]
    pub old_file_name: String,
    #[validate(length(min = 1))]
    pub new_file_name: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RenamedFileResponse {
    pub new_file_name: String,
}

/// List every file linked to a component, grouped by field.
#[utoipa::path(
    get,
    path = "/api/v0/components/{id}/files",
    tag = "component-files",
    params(("id" = String, Path, description = "Component identifier")),
    responses(
        (status = 200, description = "Component files by field", body = ComponentFilesResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(operation = "list_component_files"))]
pub async fn list_component_files(
    State(state): State<Arc<AppState>>,
    Path(component_id): Path<String>,
) -> Result<Json<ComponentFilesResponse>, HttpAppError> {
    let rows = state.refs.list_component_files(&component_id).await?;

    let mut files = ComponentFiles::new();
    for row in rows {
        let path = object_key(row.category, &row.file_name).unwrap_or_default();
        files.entry(row.field).or_default().push(FileInfo {
            name: row.file_name,
            size: row.file_size,
            path,
        });
    }

    Ok(Json(ComponentFilesResponse { files }))
}

/// Unlink a file from a component. The stored file itself is kept; use the
/// physical delete endpoint to remove bytes.
#[utoipa::path(
    delete,
    path = "/api/v0/components/{id}/files/{category}/{file_name}",
    tag = "component-files",
    params(
        ("id" = String, Path, description = "Component identifier"),
        ("category" = FileCategory, Path, description = "File category"),
        ("file_name" = String, Path, description = "Linked filename")
    ),
    responses(
        (status = 204, description = "Reference removed; file stays stored"),
        (status = 404, description = "Component does not link this file", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(operation = "delete_component_file", category = %category))]
pub async fn delete_component_file(
    State(state): State<Arc<AppState>>,
    Path((component_id, category, file_name)): Path<(String, FileCategory, String)>,
) -> Result<StatusCode, HttpAppError> {
    let field = category.field();

    if !state
        .links
        .has_reference(&component_id, field, &file_name)
        .await?
    {
        return Err(AppError::NotFound(format!(
            "Component {} does not link {}/{}",
            component_id, category, file_name
        ))
        .into());
    }

    state.links.unlink(&component_id, field, &file_name).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Rename the file as displayed for this one component. This is a reference
/// rewrite only: other components and the stored bytes are untouched.
#[utoipa::path(
    put,
    path = "/api/v0/components/{id}/files/{category}",
    tag = "component-files",
    params(
        ("id" = String, Path, description = "Component identifier"),
        ("category" = FileCategory, Path, description = "File category")
    ),
    request_body = RenameComponentFileRequest,
    responses(
        (status = 200, description = "Reference renamed", body = RenamedFileResponse),
        (status = 404, description = "Component does not link the old filename", body = ErrorResponse),
        (status = 400, description = "Invalid input", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, request), fields(operation = "rename_component_file", category = %category))]
pub async fn rename_component_file(
    State(state): State<Arc<AppState>>,
    Path((component_id, category)): Path<(String, FileCategory)>,
    ValidatedJson(request): ValidatedJson<RenameComponentFileRequest>,
) -> Result<Json<RenamedFileResponse>, HttpAppError> {
    request
        .validate()
        .map_err(|e| AppError::InvalidInput(e.to_string()))?;

    let field = category.field();
    if !state
        .links
        .has_reference(&component_id, field, &request.old_file_name)
        .await?
    {
        return Err(AppError::NotFound(format!(
            "Component {} does not link {}/{}",
            component_id, category, request.old_file_name
        ))
        .into());
    }

    state
        .coordinator
        .rename_logical(
            category,
            &request.old_file_name,
            &request.new_file_name,
            Some(vec![component_id]),
        )
        .await?;

    Ok(Json(RenamedFileResponse {
        new_file_name: request.new_file_name,
    }))
}

fn attachment_headers(file_name: &str) -> [(header::HeaderName, String); 2] {
    let encoded = utf8_percent_encode(file_name, NON_ALPHANUMERIC);
    [
        (
            header::CONTENT_TYPE,
            "application/octet-stream".to_string(),
        ),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename*=UTF-8''{}", encoded),
        ),
    ]
}

/// Download one of a component's files.
#[utoipa::path(
    get,
    path = "/api/v0/components/{id}/files/{category}/{file_name}",
    tag = "component-files",
    params(
        ("id" = String, Path, description = "Component identifier"),
        ("category" = FileCategory, Path, description = "File category"),
        ("file_name" = String, Path, description = "Linked filename")
    ),
    responses(
        (status = 200, description = "File bytes", body = Vec<u8>, content_type = "application/octet-stream"),
        (status = 404, description = "Component does not link this file, or bytes are missing", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(operation = "download_file", category = %category))]
pub async fn download_file(
    State(state): State<Arc<AppState>>,
    Path((component_id, category, file_name)): Path<(String, FileCategory, String)>,
) -> Result<Response, HttpAppError> {
    if !state
        .links
        .has_reference(&component_id, category.field(), &file_name)
        .await?
    {
        return Err(AppError::NotFound(format!(
            "Component {} does not link {}/{}",
            component_id, category, file_name
        ))
        .into());
    }

    let data = state.store.get(category, &file_name).await?;

    Ok((attachment_headers(&file_name), data).into_response())
}

/// Export every file referenced by a component as one ZIP download.
#[utoipa::path(
    get,
    path = "/api/v0/components/{id}/files/export",
    tag = "component-files",
    params(("id" = String, Path, description = "Component identifier")),
    responses(
        (status = 200, description = "ZIP archive of all referenced files", body = Vec<u8>, content_type = "application/zip"),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(operation = "export_all_files"))]
pub async fn export_all_files(
    State(state): State<Arc<AppState>>,
    Path(component_id): Path<String>,
) -> Result<Response, HttpAppError> {
    let data = export_component_archive(&state.store, &state.refs, &component_id).await?;

    let archive_name = format!("{}-files.zip", component_id);
    let encoded = utf8_percent_encode(&archive_name, NON_ALPHANUMERIC);
    let headers = [
        (header::CONTENT_TYPE, "application/zip".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename*=UTF-8''{}", encoded),
        ),
    ];

    Ok((headers, data).into_response())
}
