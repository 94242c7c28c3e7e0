//! Naming policy suggestions.
//!
//! Surfaces the pure naming helpers to the operator. Suggestions are
//! advisory: applying one goes through the normal rename endpoints.

use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    Json,
};
use partvault_core::models::FileCategory;
use partvault_core::naming::{apply_mpn_policy, apply_package_policy};
use partvault_core::AppError;
use partvault_storage::AssetStore;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(Debug, Deserialize)]
pub struct SuggestNameQuery {
    pub mpn: Option<String>,
    pub package: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SuggestedNameResponse {
    pub file_name: String,
    /// True when the file already follows the policy; applying the
    /// suggestion would be a no-op.
    pub unchanged: bool,
}

/// Suggest a policy-conforming filename from a manufacturer part number or
/// package size. Exactly one of `mpn` / `package` must be given.
#[utoipa::path(
    get,
    path = "/api/v0/files/{category}/{file_name}/suggest-name",
    tag = "files",
    params(
        ("category" = FileCategory, Path, description = "File category"),
        ("file_name" = String, Path, description = "Current filename"),
        ("mpn" = Option<String>, Query, description = "Manufacturer part number"),
        ("package" = Option<String>, Query, description = "Package / footprint size")
    ),
    responses(
        (status = 200, description = "Suggested filename", body = SuggestedNameResponse),
        (status = 400, description = "Invalid input", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(operation = "suggest_name", category = %category))]
pub async fn suggest_name(
    State(state): State<Arc<AppState>>,
    Path((category, file_name)): Path<(FileCategory, String)>,
    Query(query): Query<SuggestNameQuery>,
) -> Result<Json<SuggestedNameResponse>, HttpAppError> {
    // The file does not have to be referenced yet, but it must exist.
    if state.files.get(category, &file_name).await?.is_none()
        && !state.store.exists(category, &file_name).await?
    {
        return Err(AppError::NotFound(format!("{}/{}", category, file_name)).into());
    }

    let suggested = match (&query.mpn, &query.package) {
        (Some(mpn), None) => apply_mpn_policy(&file_name, mpn),
        (None, Some(package)) => apply_package_policy(&file_name, package),
        _ => {
            return Err(AppError::InvalidInput(
                "Provide exactly one of 'mpn' or 'package'".to_string(),
            )
            .into());
        }
    };

    let unchanged = suggested == file_name;

    Ok(Json(SuggestedNameResponse {
        file_name: suggested,
        unchanged,
    }))
}
