//! Orphan and dangling-reference detection.
//!
//! Read-only consistency scans. Orphans are stored files nobody references;
//! dangling references name files the store no longer holds (a corruption
//! signal). Neither scan takes per-key locks, so results race benignly with
//! in-flight renames.

use partvault_core::models::FileCategory;
use partvault_core::AppError;
use partvault_db::ReferenceRepository;
use partvault_storage::AssetStore;
use std::collections::HashSet;
use std::sync::Arc;

#[derive(Clone)]
pub struct OrphanDetector {
    store: Arc<dyn AssetStore>,
    refs: ReferenceRepository,
}

impl OrphanDetector {
    pub fn new(store: Arc<dyn AssetStore>, refs: ReferenceRepository) -> Self {
        Self { store, refs }
    }

    /// Files present in the store with zero references. Set difference over
    /// one listing and one query.
    #[tracing::instrument(skip(self), fields(operation = "list_orphans", category = %category))]
    pub async fn list_orphans(&self, category: FileCategory) -> Result<Vec<String>, AppError> {
        let stored = self.store.list(category).await?;
        let referenced: HashSet<String> =
            self.refs.referenced_names(category).await?.into_iter().collect();

        let mut orphans: Vec<String> = stored
            .into_iter()
            .filter(|name| !referenced.contains(name))
            .collect();
        orphans.sort();

        Ok(orphans)
    }

    /// References whose backing file is missing from the store.
    #[tracing::instrument(skip(self), fields(operation = "list_dangling", category = %category))]
    pub async fn list_dangling(&self, category: FileCategory) -> Result<Vec<String>, AppError> {
        let stored: HashSet<String> = self.store.list(category).await?.into_iter().collect();
        let referenced = self.refs.referenced_names(category).await?;

        let mut dangling: Vec<String> = referenced
            .into_iter()
            .filter(|name| !stored.contains(name))
            .collect();
        dangling.sort();

        Ok(dangling)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::setup;
    use partvault_core::models::ComponentField;

    #[tokio::test]
    async fn referenced_files_are_never_orphans() {
        let env = setup().await;
        let detector = OrphanDetector::new(env.store.clone(), env.refs.clone());

        env.store
            .put(FileCategory::Footprint, "used.kicad_mod", b"u".to_vec(), false)
            .await
            .unwrap();
        env.store
            .put(FileCategory::Footprint, "unused.kicad_mod", b"x".to_vec(), false)
            .await
            .unwrap();
        env.refs
            .add_reference("CMP-1", ComponentField::PcbFootprint, "used.kicad_mod")
            .await
            .unwrap();

        let orphans = detector.list_orphans(FileCategory::Footprint).await.unwrap();
        assert_eq!(orphans, vec!["unused.kicad_mod"]);
    }

    #[tokio::test]
    async fn dangling_references_are_reported() {
        let env = setup().await;
        let detector = OrphanDetector::new(env.store.clone(), env.refs.clone());

        env.refs
            .add_reference("CMP-1", ComponentField::PadFile, "ghost.pad")
            .await
            .unwrap();
        env.store
            .put(FileCategory::Pad, "real.pad", b"r".to_vec(), false)
            .await
            .unwrap();
        env.refs
            .add_reference("CMP-1", ComponentField::PadFile, "real.pad")
            .await
            .unwrap();

        let dangling = detector.list_dangling(FileCategory::Pad).await.unwrap();
        assert_eq!(dangling, vec!["ghost.pad"]);
        assert!(detector
            .list_dangling(FileCategory::Footprint)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn empty_category_has_no_orphans() {
        let env = setup().await;
        let detector = OrphanDetector::new(env.store.clone(), env.refs.clone());

        assert!(detector
            .list_orphans(FileCategory::Archive)
            .await
            .unwrap()
            .is_empty());
    }
}
