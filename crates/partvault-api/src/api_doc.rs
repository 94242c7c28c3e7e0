//! OpenAPI document definition.

use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "partvault",
        description = "CAD asset consistency layer: stores binary design files, links them to components, and keeps files and references consistent across uploads, renames, deletions, and orphan scans."
    ),
    paths(
        crate::handlers::health::health,
        crate::handlers::upload::upload_files,
        crate::handlers::component_files::list_component_files,
        crate::handlers::component_files::delete_component_file,
        crate::handlers::component_files::rename_component_file,
        crate::handlers::component_files::download_file,
        crate::handlers::component_files::export_all_files,
        crate::handlers::links::link_file,
        crate::handlers::links::unlink_file,
        crate::handlers::files::get_files_by_type,
        crate::handlers::files::search_files,
        crate::handlers::files::get_components_by_file,
        crate::handlers::files::get_available_files,
        crate::handlers::naming::suggest_name,
        crate::handlers::maintenance::get_orphan_files,
        crate::handlers::maintenance::get_dangling_references,
        crate::handlers::maintenance::mass_rename_file,
        crate::handlers::maintenance::rename_physical_file,
        crate::handlers::maintenance::delete_physical_file,
    ),
    tags(
        (name = "health", description = "Service health"),
        (name = "component-files", description = "Per-component file operations"),
        (name = "links", description = "Attach/detach stored files"),
        (name = "files", description = "Store-wide file queries"),
        (name = "maintenance", description = "Consistency scans and store-wide renames/deletes")
    )
)]
pub struct ApiDoc;
