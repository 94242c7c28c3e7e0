//! Link/unlink management.
//!
//! The per-component-field API the UI uses to attach or detach an existing
//! stored file, independent of renaming. Cardinality and duplicate rules
//! surface as validation errors, not system failures. Unlinking never
//! deletes bytes: the file stays in the asset store.

use partvault_core::models::ComponentField;
use partvault_core::AppError;
use partvault_db::{FileRepository, ReferenceRepository};
use partvault_storage::AssetStore;
use std::sync::Arc;

#[derive(Clone)]
pub struct LinkManager {
    store: Arc<dyn AssetStore>,
    files: FileRepository,
    refs: ReferenceRepository,
}

impl LinkManager {
    pub fn new(
        store: Arc<dyn AssetStore>,
        files: FileRepository,
        refs: ReferenceRepository,
    ) -> Self {
        Self { store, files, refs }
    }

    /// Attach an existing stored file to a component field.
    ///
    /// Fails with `NotFound` when no such file is known in the field's
    /// category, and propagates `CardinalityViolation` /
    /// `DuplicateReference` from the reference index.
    #[tracing::instrument(skip(self), fields(operation = "link", field = %field))]
    pub async fn link(
        &self,
        component_id: &str,
        field: ComponentField,
        file_name: &str,
    ) -> Result<(), AppError> {
        let category = field.category();

        let known = self.files.get(category, file_name).await?.is_some()
            || self.store.exists(category, file_name).await?;
        if !known {
            return Err(AppError::NotFound(format!("{}/{}", category, file_name)));
        }

        self.refs.add_reference(component_id, field, file_name).await
    }

    /// Detach a file from a component field. Idempotent; the file stays in
    /// the asset store. Returns whether a reference was actually removed.
    #[tracing::instrument(skip(self), fields(operation = "unlink", field = %field))]
    pub async fn unlink(
        &self,
        component_id: &str,
        field: ComponentField,
        file_name: &str,
    ) -> Result<bool, AppError> {
        self.refs
            .remove_reference(component_id, field, file_name)
            .await
    }

    /// Whether the exact association exists (used by handlers that must 404
    /// on a missing reference before unlinking).
    pub async fn has_reference(
        &self,
        component_id: &str,
        field: ComponentField,
        file_name: &str,
    ) -> Result<bool, AppError> {
        self.refs
            .has_reference(component_id, field, file_name)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::setup;
    use partvault_core::models::FileCategory;

    async fn manager() -> (LinkManager, crate::test_support::TestEnv) {
        let env = setup().await;
        let manager = LinkManager::new(env.store.clone(), env.files.clone(), env.refs.clone());
        (manager, env)
    }

    #[tokio::test]
    async fn link_requires_a_stored_file() {
        let (manager, env) = manager().await;

        let err = manager
            .link("CMP-1", ComponentField::PcbFootprint, "missing.kicad_mod")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        env.store
            .put(FileCategory::Footprint, "real.kicad_mod", b"f".to_vec(), false)
            .await
            .unwrap();
        manager
            .link("CMP-1", ComponentField::PcbFootprint, "real.kicad_mod")
            .await
            .unwrap();
        assert!(manager
            .has_reference("CMP-1", ComponentField::PcbFootprint, "real.kicad_mod")
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn link_surfaces_cardinality_violation() {
        let (manager, env) = manager().await;

        for name in ["one.lib", "two.lib"] {
            env.store
                .put(FileCategory::Symbol, name, b"s".to_vec(), false)
                .await
                .unwrap();
        }

        manager
            .link("CMP-1", ComponentField::Schematic, "one.lib")
            .await
            .unwrap();
        let err = manager
            .link("CMP-1", ComponentField::Schematic, "two.lib")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::CardinalityViolation { .. }));
    }

    #[tokio::test]
    async fn unlink_is_idempotent_and_keeps_bytes() {
        let (manager, env) = manager().await;

        env.store
            .put(FileCategory::Pad, "PAD1.pad", b"p".to_vec(), false)
            .await
            .unwrap();
        manager
            .link("CMP-1", ComponentField::PadFile, "PAD1.pad")
            .await
            .unwrap();

        assert!(manager
            .unlink("CMP-1", ComponentField::PadFile, "PAD1.pad")
            .await
            .unwrap());
        // Second unlink is a no-op, not an error.
        assert!(!manager
            .unlink("CMP-1", ComponentField::PadFile, "PAD1.pad")
            .await
            .unwrap());
        // The file stays in the asset store.
        assert!(env.store.exists(FileCategory::Pad, "PAD1.pad").await.unwrap());
    }
}
