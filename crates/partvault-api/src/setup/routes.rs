//! Route configuration and setup

use crate::api_doc::ApiDoc;
use crate::constants::API_PREFIX;
use crate::handlers;
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    routing::{delete, get, post, put},
    Json, Router,
};
use partvault_core::Config;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

/// Setup all application routes
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Router<()> {
    let cors = setup_cors(config);

    api_routes(state)
        .route("/api/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
        .layer(cors)
        .layer(DefaultBodyLimit::max(config.max_upload_size_bytes))
        .layer(TraceLayer::new_for_http())
}

fn setup_cors(config: &Config) -> CorsLayer {
    if config.cors_origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<HeaderValue> = config
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
            .allow_headers(Any)
    }
}

fn api_routes(state: Arc<AppState>) -> Router<()> {
    Router::new()
        .route("/health", get(handlers::health::health))
        // Per-component file operations
        .route(
            &format!("{}/components/{{id}}/files", API_PREFIX),
            post(handlers::upload::upload_files),
        )
        .route(
            &format!("{}/components/{{id}}/files", API_PREFIX),
            get(handlers::component_files::list_component_files),
        )
        .route(
            &format!("{}/components/{{id}}/files/export", API_PREFIX),
            get(handlers::component_files::export_all_files),
        )
        .route(
            &format!("{}/components/{{id}}/files/{{category}}", API_PREFIX),
            put(handlers::component_files::rename_component_file),
        )
        .route(
            &format!(
                "{}/components/{{id}}/files/{{category}}/{{file_name}}",
                API_PREFIX
            ),
            get(handlers::component_files::download_file),
        )
        .route(
            &format!(
                "{}/components/{{id}}/files/{{category}}/{{file_name}}",
                API_PREFIX
            ),
            delete(handlers::component_files::delete_component_file),
        )
        .route(
            &format!("{}/components/{{id}}/files/{{category}}/link", API_PREFIX),
            post(handlers::links::link_file),
        )
        .route(
            &format!("{}/components/{{id}}/files/{{category}}/unlink", API_PREFIX),
            post(handlers::links::unlink_file),
        )
        // Store-wide file queries
        .route(
            &format!("{}/files/available", API_PREFIX),
            get(handlers::files::get_available_files),
        )
        .route(
            &format!("{}/files/search", API_PREFIX),
            get(handlers::files::search_files),
        )
        .route(
            &format!("{}/files/{{category}}", API_PREFIX),
            get(handlers::files::get_files_by_type),
        )
        .route(
            &format!("{}/files/{{category}}/{{file_name}}/components", API_PREFIX),
            get(handlers::files::get_components_by_file),
        )
        .route(
            &format!(
                "{}/files/{{category}}/{{file_name}}/suggest-name",
                API_PREFIX
            ),
            get(handlers::naming::suggest_name),
        )
        // Maintenance: scans and store-wide renames/deletes
        .route(
            &format!("{}/files/{{category}}/orphans", API_PREFIX),
            get(handlers::maintenance::get_orphan_files),
        )
        .route(
            &format!("{}/files/{{category}}/dangling", API_PREFIX),
            get(handlers::maintenance::get_dangling_references),
        )
        .route(
            &format!("{}/files/{{category}}/mass-rename", API_PREFIX),
            post(handlers::maintenance::mass_rename_file),
        )
        .route(
            &format!("{}/files/{{category}}/rename", API_PREFIX),
            post(handlers::maintenance::rename_physical_file),
        )
        .route(
            &format!("{}/files/{{category}}/delete", API_PREFIX),
            post(handlers::maintenance::delete_physical_file),
        )
        .with_state(state)
}
