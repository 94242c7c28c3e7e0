//! Store-wide file queries: per-category listings, search, reverse lookup,
//! and the picker listing.

use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    Json,
};
use partvault_core::models::{AvailableFile, CadFile, FileCategory, FileInfo};
use partvault_storage::object_key;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct FilesResponse {
    pub files: Vec<FileInfo>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SearchResponse {
    pub results: Vec<CadFile>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ComponentsResponse {
    pub components: Vec<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AvailableFilesResponse {
    pub files: Vec<AvailableFile>,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: String,
}

#[derive(Debug, Deserialize)]
pub struct AvailableQuery {
    pub category: Option<FileCategory>,
    pub q: Option<String>,
}

/// List all stored files of one category.
#[utoipa::path(
    get,
    path = "/api/v0/files/{category}",
    tag = "files",
    params(("category" = FileCategory, Path, description = "File category")),
    responses(
        (status = 200, description = "Stored files in the category", body = FilesResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(operation = "get_files_by_type", category = %category))]
pub async fn get_files_by_type(
    State(state): State<Arc<AppState>>,
    Path(category): Path<FileCategory>,
) -> Result<Json<FilesResponse>, HttpAppError> {
    let files = state
        .files
        .list(category)
        .await?
        .into_iter()
        .map(|file| {
            let path = object_key(file.category, &file.file_name).unwrap_or_default();
            FileInfo {
                name: file.file_name,
                size: file.file_size,
                path,
            }
        })
        .collect();

    Ok(Json(FilesResponse { files }))
}

/// Search stored files by filename substring, across all categories.
#[utoipa::path(
    get,
    path = "/api/v0/files/search",
    tag = "files",
    params(("q" = String, Query, description = "Filename substring")),
    responses(
        (status = 200, description = "Matching files", body = SearchResponse)
    )
)]
#[tracing::instrument(skip(state), fields(operation = "search_files"))]
pub async fn search_files(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<SearchResponse>, HttpAppError> {
    let results = state.files.search(&query.q).await?;
    Ok(Json(SearchResponse { results }))
}

/// Reverse lookup: which components reference a stored file. This is the
/// blast-radius preview shown before renames and deletes.
#[utoipa::path(
    get,
    path = "/api/v0/files/{category}/{file_name}/components",
    tag = "files",
    params(
        ("category" = FileCategory, Path, description = "File category"),
        ("file_name" = String, Path, description = "Stored filename")
    ),
    responses(
        (status = 200, description = "Referencing component identifiers", body = ComponentsResponse)
    )
)]
#[tracing::instrument(skip(state), fields(operation = "get_components_by_file", category = %category))]
pub async fn get_components_by_file(
    State(state): State<Arc<AppState>>,
    Path((category, file_name)): Path<(FileCategory, String)>,
) -> Result<Json<ComponentsResponse>, HttpAppError> {
    let components = state
        .refs
        .find_components_referencing(category, &file_name)
        .await?;
    Ok(Json(ComponentsResponse { components }))
}

/// Picker listing: stored files with reference counts, optionally filtered
/// by category and filename substring.
#[utoipa::path(
    get,
    path = "/api/v0/files/available",
    tag = "files",
    params(
        ("category" = Option<FileCategory>, Query, description = "Restrict to one category"),
        ("q" = Option<String>, Query, description = "Filename substring")
    ),
    responses(
        (status = 200, description = "Available files with usage counts", body = AvailableFilesResponse)
    )
)]
#[tracing::instrument(skip(state), fields(operation = "get_available_files"))]
pub async fn get_available_files(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AvailableQuery>,
) -> Result<Json<AvailableFilesResponse>, HttpAppError> {
    let files = state
        .files
        .list_available(query.category, query.q.as_deref())
        .await?;
    Ok(Json(AvailableFilesResponse { files }))
}
