//! Component file export.
//!
//! Bundles every file a component references, across all categories, into
//! one ZIP for download. Read-only: no store or index mutation.

use anyhow::Context;
use partvault_core::AppError;
use partvault_db::ReferenceRepository;
use partvault_storage::AssetStore;
use std::io::Write;
use std::sync::Arc;

/// Create a ZIP archive of all files referenced by a component. Entries are
/// namespaced by category directory so identical names in different
/// categories cannot collide. References whose backing file is missing are
/// skipped with a warning rather than failing the export.
pub async fn export_component_archive(
    store: &Arc<dyn AssetStore>,
    refs: &ReferenceRepository,
    component_id: &str,
) -> Result<Vec<u8>, AppError> {
    use zip::write::{FileOptions, ZipWriter};
    use zip::CompressionMethod;

    let references = refs.list_references(component_id).await?;

    let mut buffer = Vec::new();
    {
        let mut writer = ZipWriter::new(std::io::Cursor::new(&mut buffer));
        let options = FileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .unix_permissions(0o644);

        for reference in references {
            let data = match store.get(reference.category, &reference.file_name).await {
                Ok(data) => data,
                Err(e) => {
                    tracing::warn!(
                        component_id,
                        category = %reference.category,
                        file_name = %reference.file_name,
                        error = %e,
                        "Skipping reference with missing backing file during export"
                    );
                    continue;
                }
            };

            let entry_name = format!(
                "{}/{}",
                reference.category.dir_name(),
                reference.file_name
            );
            writer
                .start_file(&entry_name, options)
                .with_context(|| format!("Failed to add file to ZIP: {}", entry_name))?;
            writer
                .write_all(&data)
                .with_context(|| format!("Failed to write file data to ZIP: {}", entry_name))?;
        }

        writer
            .finish()
            .context("Failed to finalize ZIP archive")?;
    }

    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::setup;
    use partvault_core::models::{ComponentField, FileCategory};
    use std::io::Read;

    #[tokio::test]
    async fn bundles_all_referenced_files_across_categories() {
        let env = setup().await;

        env.store
            .put(
                FileCategory::Footprint,
                "F.kicad_mod",
                b"(footprint)".to_vec(),
                false,
            )
            .await
            .unwrap();
        env.store
            .put(FileCategory::Model, "body.step", b"solid".to_vec(), false)
            .await
            .unwrap();
        env.refs
            .add_reference("CMP-1", ComponentField::PcbFootprint, "F.kicad_mod")
            .await
            .unwrap();
        env.refs
            .add_reference("CMP-1", ComponentField::StepModel, "body.step")
            .await
            .unwrap();
        // A dangling reference must not break the export.
        env.refs
            .add_reference("CMP-1", ComponentField::Pspice, "ghost.cir")
            .await
            .unwrap();

        let bytes = export_component_archive(&env.store, &env.refs, "CMP-1")
            .await
            .unwrap();

        let mut archive = zip::ZipArchive::new(std::io::Cursor::new(bytes)).unwrap();
        let mut names: Vec<String> = (0..archive.len())
            .map(|i| archive.by_index(i).unwrap().name().to_string())
            .collect();
        names.sort();
        assert_eq!(names, vec!["footprints/F.kicad_mod", "models/body.step"]);

        let mut content = String::new();
        archive
            .by_name("models/body.step")
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();
        assert_eq!(content, "solid");
    }

    #[tokio::test]
    async fn component_without_files_exports_empty_archive() {
        let env = setup().await;

        let bytes = export_component_archive(&env.store, &env.refs, "CMP-EMPTY")
            .await
            .unwrap();
        let archive = zip::ZipArchive::new(std::io::Cursor::new(bytes)).unwrap();
        assert_eq!(archive.len(), 0);
    }
}
