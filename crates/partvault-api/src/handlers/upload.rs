//! Multi-file upload handler.

use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use axum::{
    extract::{Multipart, Path, State},
    Json,
};
use partvault_core::models::UploadReport;
use partvault_core::AppError;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Upload files for a component.
///
/// Regular CAD files are stored and linked to the component's matching
/// field; ZIP containers fan out through the archive expander. Per-file
/// problems (unsupported type, name conflict, full single-valued field) are
/// reported in the result list and never fail the batch.
#[utoipa::path(
    post,
    path = "/api/v0/components/{id}/files",
    tag = "component-files",
    params(("id" = String, Path, description = "Component identifier")),
    responses(
        (status = 200, description = "Per-file upload results", body = UploadReport),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, multipart), fields(operation = "upload_files"))]
pub async fn upload_files(
    State(state): State<Arc<AppState>>,
    Path(component_id): Path<String>,
    mut multipart: Multipart,
) -> Result<Json<UploadReport>, HttpAppError> {
    let mut uploads = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidInput(format!("Malformed multipart body: {}", e)))?
    {
        let Some(file_name) = field.file_name().map(ToString::to_string) else {
            continue;
        };
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::InvalidInput(format!("Failed to read upload: {}", e)))?;
        uploads.push((file_name, data.to_vec()));
    }

    if uploads.is_empty() {
        return Err(AppError::InvalidInput("No files in upload".to_string()).into());
    }

    let report = state
        .uploads
        .upload_files(&component_id, uploads, &CancellationToken::new())
        .await?;

    Ok(Json(report))
}
