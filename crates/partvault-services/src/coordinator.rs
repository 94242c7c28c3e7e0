//! Rename/delete coordination.
//!
//! Multi-step operations that touch both the asset store and the reference
//! index run through this coordinator so their ordering is explicit:
//! resolve the blast radius, validate, mutate store before index (physical
//! rename), report. Operations on the same `(category, filename)` key are
//! serialized through a per-key lock; different keys proceed in parallel.

use partvault_core::models::FileCategory;
use partvault_core::AppError;
use partvault_db::{FileRepository, ReferenceRepository};
use partvault_storage::AssetStore;
use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex};
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Per-(category, filename) lock registry.
#[derive(Default)]
struct KeyLocks {
    inner: StdMutex<HashMap<(FileCategory, String), Arc<Mutex<()>>>>,
}

impl KeyLocks {
    fn handle(&self, category: FileCategory, file_name: &str) -> Arc<Mutex<()>> {
        let mut map = self.inner.lock().expect("key lock registry poisoned");
        map.entry((category, file_name.to_string()))
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    async fn acquire(&self, category: FileCategory, file_name: &str) -> OwnedMutexGuard<()> {
        self.handle(category, file_name).lock_owned().await
    }

    /// Lock two keys in a stable order so concurrent renames cannot
    /// deadlock on each other.
    async fn acquire_pair(
        &self,
        category: FileCategory,
        first: &str,
        second: &str,
    ) -> (OwnedMutexGuard<()>, OwnedMutexGuard<()>) {
        if first <= second {
            let a = self.acquire(category, first).await;
            let b = self.acquire(category, second).await;
            (a, b)
        } else {
            let b = self.acquire(category, second).await;
            let a = self.acquire(category, first).await;
            (a, b)
        }
    }
}

/// Coordinates renames and deletes across the asset store and the
/// reference index.
#[derive(Clone)]
pub struct FileCoordinator {
    store: Arc<dyn AssetStore>,
    files: FileRepository,
    refs: ReferenceRepository,
    locks: Arc<KeyLocks>,
}

impl FileCoordinator {
    pub fn new(
        store: Arc<dyn AssetStore>,
        files: FileRepository,
        refs: ReferenceRepository,
    ) -> Self {
        Self {
            store,
            files,
            refs,
            locks: Arc::new(KeyLocks::default()),
        }
    }

    /// Physically rename a stored file and cascade the new name to every
    /// component referencing it. Returns the number of components updated.
    ///
    /// The store is mutated first: its rename is a single atomic filesystem
    /// operation, so a failure there aborts before any index write. If a
    /// previous attempt crashed between the store rename and the index
    /// rewrite, retrying the same operation detects the half-applied state
    /// (old name gone, new name present, references still on the old name)
    /// and completes the index rewrite without touching the store again.
    #[tracing::instrument(skip(self), fields(operation = "rename_physical", category = %category))]
    pub async fn rename_physical(
        &self,
        category: FileCategory,
        old_file_name: &str,
        new_file_name: &str,
    ) -> Result<u64, AppError> {
        if old_file_name == new_file_name {
            return Err(AppError::InvalidInput(
                "Old and new filenames are identical".to_string(),
            ));
        }

        let _guards = self
            .locks
            .acquire_pair(category, old_file_name, new_file_name)
            .await;

        let affected = self
            .refs
            .find_components_referencing(category, old_file_name)
            .await?;
        let old_exists = self.store.exists(category, old_file_name).await?;
        let new_exists = self.store.exists(category, new_file_name).await?;

        if old_exists {
            if new_exists {
                return Err(AppError::NameConflict {
                    category,
                    file_name: new_file_name.to_string(),
                });
            }
            self.store
                .rename(category, old_file_name, new_file_name)
                .await?;
        } else if new_exists && !affected.is_empty() {
            tracing::warn!(
                category = %category,
                old_file_name,
                new_file_name,
                "Store already renamed; completing interrupted index rewrite"
            );
        } else {
            return Err(AppError::NotFound(format!(
                "{}/{}",
                category, old_file_name
            )));
        }

        let updated = self
            .refs
            .rewrite_cascade(category, old_file_name, new_file_name)
            .await?;

        tracing::info!(
            category = %category,
            old_file_name,
            new_file_name,
            updated_components = updated,
            "Physical rename complete"
        );

        Ok(updated)
    }

    /// Rewrite the reference filename for a chosen subset of components
    /// without touching the stored bytes. `components = None` means every
    /// component currently referencing the file.
    ///
    /// This intentionally lets the display name diverge from the name on
    /// disk; it is the operator's escape hatch for correcting historical
    /// data entry. The registry row keeps mirroring the bytes and is left
    /// alone.
    #[tracing::instrument(skip(self, components), fields(operation = "rename_logical", category = %category))]
    pub async fn rename_logical(
        &self,
        category: FileCategory,
        old_file_name: &str,
        new_file_name: &str,
        components: Option<Vec<String>>,
    ) -> Result<u64, AppError> {
        if old_file_name == new_file_name {
            return Err(AppError::InvalidInput(
                "Old and new filenames are identical".to_string(),
            ));
        }
        // The store never sees this name, so its shape is checked here.
        partvault_storage::keys::validate_file_name(new_file_name)?;

        let _guard = self.locks.acquire(category, old_file_name).await;

        let affected = self
            .refs
            .find_components_referencing(category, old_file_name)
            .await?;

        if affected.is_empty() && !self.store.exists(category, old_file_name).await? {
            return Err(AppError::NotFound(format!(
                "{}/{}",
                category, old_file_name
            )));
        }

        // Restricting to components that do not reference the file is a
        // no-op for them, not an error.
        let targets = components.map(|ids| {
            ids.into_iter()
                .filter(|id| affected.contains(id))
                .collect::<Vec<_>>()
        });

        let updated = self
            .refs
            .rewrite_refs(category, old_file_name, new_file_name, targets.as_deref())
            .await?;

        tracing::info!(
            category = %category,
            old_file_name,
            new_file_name,
            updated_components = updated,
            "Logical rename complete"
        );

        Ok(updated)
    }

    /// Delete a stored file: remove every component reference, drop the
    /// registry row, then delete the bytes. Components referencing the file
    /// are expected, not a conflict. Returns the number of components that
    /// lost a reference.
    #[tracing::instrument(skip(self), fields(operation = "delete", category = %category))]
    pub async fn delete(
        &self,
        category: FileCategory,
        file_name: &str,
    ) -> Result<u64, AppError> {
        let _guard = self.locks.acquire(category, file_name).await;

        let affected = self
            .refs
            .find_components_referencing(category, file_name)
            .await?;
        let exists = self.store.exists(category, file_name).await?;
        let registered = self.files.get(category, file_name).await?.is_some();

        if !exists && !registered && affected.is_empty() {
            return Err(AppError::NotFound(format!("{}/{}", category, file_name)));
        }

        self.refs.remove_all_for_file(category, file_name).await?;
        self.files.delete(category, file_name).await?;
        self.store.delete(category, file_name).await?;

        tracing::info!(
            category = %category,
            file_name,
            updated_components = affected.len(),
            "Delete complete"
        );

        Ok(affected.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::setup;
    use partvault_core::models::ComponentField;

    async fn coordinator() -> (FileCoordinator, crate::test_support::TestEnv) {
        let env = setup().await;
        let coordinator =
            FileCoordinator::new(env.store.clone(), env.files.clone(), env.refs.clone());
        (coordinator, env)
    }

    #[tokio::test]
    async fn physical_rename_cascades_to_all_components() {
        let (coordinator, env) = coordinator().await;

        env.store
            .put(
                FileCategory::Footprint,
                "FOOT123.kicad_mod",
                b"(footprint)".to_vec(),
                false,
            )
            .await
            .unwrap();
        env.files
            .upsert(&crate::file_record(
                FileCategory::Footprint,
                "FOOT123.kicad_mod",
                b"(footprint)",
            ))
            .await
            .unwrap();
        for component in ["CMP-A", "CMP-B"] {
            env.refs
                .add_reference(component, ComponentField::PcbFootprint, "FOOT123.kicad_mod")
                .await
                .unwrap();
        }

        let before = env
            .refs
            .find_components_referencing(FileCategory::Footprint, "FOOT123.kicad_mod")
            .await
            .unwrap();

        let updated = coordinator
            .rename_physical(
                FileCategory::Footprint,
                "FOOT123.kicad_mod",
                "FOOT123-R1.kicad_mod",
            )
            .await
            .unwrap();
        assert_eq!(updated, 2);

        // Every reference moved to the new name; none remain on the old.
        let after = env
            .refs
            .find_components_referencing(FileCategory::Footprint, "FOOT123-R1.kicad_mod")
            .await
            .unwrap();
        assert_eq!(after, before);
        assert!(env
            .refs
            .find_components_referencing(FileCategory::Footprint, "FOOT123.kicad_mod")
            .await
            .unwrap()
            .is_empty());

        // Bytes moved too, and the registry followed.
        assert!(!env
            .store
            .exists(FileCategory::Footprint, "FOOT123.kicad_mod")
            .await
            .unwrap());
        assert!(env
            .store
            .exists(FileCategory::Footprint, "FOOT123-R1.kicad_mod")
            .await
            .unwrap());
        assert!(env
            .files
            .get(FileCategory::Footprint, "FOOT123-R1.kicad_mod")
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn physical_rename_validates_before_mutating() {
        let (coordinator, env) = coordinator().await;

        env.store
            .put(FileCategory::Pad, "PAD1.pad", b"1".to_vec(), false)
            .await
            .unwrap();
        env.store
            .put(FileCategory::Pad, "PAD2.pad", b"2".to_vec(), false)
            .await
            .unwrap();

        let err = coordinator
            .rename_physical(FileCategory::Pad, "PAD1.pad", "PAD2.pad")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NameConflict { .. }));
        // Nothing changed.
        assert_eq!(
            env.store.get(FileCategory::Pad, "PAD1.pad").await.unwrap(),
            b"1"
        );

        let err = coordinator
            .rename_physical(FileCategory::Pad, "missing.pad", "other.pad")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn physical_rename_resumes_interrupted_index_rewrite() {
        let (coordinator, env) = coordinator().await;

        // Simulate a crash after the store rename but before the index
        // rewrite: bytes already under the new name, references on the old.
        env.store
            .put(FileCategory::Symbol, "new.lib", b"lib".to_vec(), false)
            .await
            .unwrap();
        env.refs
            .add_reference("CMP-A", ComponentField::Schematic, "old.lib")
            .await
            .unwrap();

        let updated = coordinator
            .rename_physical(FileCategory::Symbol, "old.lib", "new.lib")
            .await
            .unwrap();
        assert_eq!(updated, 1);

        let refs = env.refs.list_references("CMP-A").await.unwrap();
        assert_eq!(refs[0].file_name, "new.lib");
    }

    #[tokio::test]
    async fn logical_rename_leaves_other_components_and_bytes_alone() {
        let (coordinator, env) = coordinator().await;

        env.store
            .put(FileCategory::Pad, "PAD1.pad", b"pad".to_vec(), false)
            .await
            .unwrap();
        for component in ["CMP-A", "CMP-B"] {
            env.refs
                .add_reference(component, ComponentField::PadFile, "PAD1.pad")
                .await
                .unwrap();
        }

        let updated = coordinator
            .rename_logical(
                FileCategory::Pad,
                "PAD1.pad",
                "PAD2.pad",
                Some(vec!["CMP-A".to_string()]),
            )
            .await
            .unwrap();
        assert_eq!(updated, 1);

        // A now names a file that does not physically exist under that
        // name; that divergence is the point of the logical mode.
        let a_refs = env.refs.list_references("CMP-A").await.unwrap();
        assert_eq!(a_refs[0].file_name, "PAD2.pad");
        let b_refs = env.refs.list_references("CMP-B").await.unwrap();
        assert_eq!(b_refs[0].file_name, "PAD1.pad");
        assert!(env.store.exists(FileCategory::Pad, "PAD1.pad").await.unwrap());
        assert!(!env.store.exists(FileCategory::Pad, "PAD2.pad").await.unwrap());
    }

    #[tokio::test]
    async fn logical_rename_with_no_subset_updates_all_referencing() {
        let (coordinator, env) = coordinator().await;

        env.store
            .put(FileCategory::Pad, "PAD1.pad", b"pad".to_vec(), false)
            .await
            .unwrap();
        for component in ["CMP-A", "CMP-B", "CMP-C"] {
            env.refs
                .add_reference(component, ComponentField::PadFile, "PAD1.pad")
                .await
                .unwrap();
        }

        let updated = coordinator
            .rename_logical(FileCategory::Pad, "PAD1.pad", "PAD2.pad", None)
            .await
            .unwrap();
        assert_eq!(updated, 3);
        assert!(env.store.exists(FileCategory::Pad, "PAD1.pad").await.unwrap());
    }

    #[tokio::test]
    async fn logical_rename_ignores_non_referencing_components() {
        let (coordinator, env) = coordinator().await;

        env.refs
            .add_reference("CMP-A", ComponentField::PadFile, "PAD1.pad")
            .await
            .unwrap();

        let updated = coordinator
            .rename_logical(
                FileCategory::Pad,
                "PAD1.pad",
                "PAD2.pad",
                Some(vec!["CMP-A".to_string(), "CMP-UNRELATED".to_string()]),
            )
            .await
            .unwrap();
        assert_eq!(updated, 1);
    }

    #[tokio::test]
    async fn delete_removes_bytes_registry_and_references() {
        let (coordinator, env) = coordinator().await;

        env.store
            .put(FileCategory::Model, "body.step", b"solid".to_vec(), false)
            .await
            .unwrap();
        env.files
            .upsert(&crate::file_record(
                FileCategory::Model,
                "body.step",
                b"solid",
            ))
            .await
            .unwrap();
        env.refs
            .add_reference("CMP-A", ComponentField::StepModel, "body.step")
            .await
            .unwrap();
        env.refs
            .add_reference("CMP-B", ComponentField::StepModel, "body.step")
            .await
            .unwrap();

        let updated = coordinator
            .delete(FileCategory::Model, "body.step")
            .await
            .unwrap();
        assert_eq!(updated, 2);

        assert!(matches!(
            env.store.get(FileCategory::Model, "body.step").await,
            Err(partvault_storage::StorageError::NotFound(_))
        ));
        assert!(env
            .files
            .get(FileCategory::Model, "body.step")
            .await
            .unwrap()
            .is_none());
        assert!(env.refs.list_references("CMP-A").await.unwrap().is_empty());
        assert!(env.refs.list_references("CMP-B").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_of_absent_file_is_not_found() {
        let (coordinator, _env) = coordinator().await;

        let err = coordinator
            .delete(FileCategory::Model, "ghost.step")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn delete_with_references_but_no_bytes_still_cleans_up() {
        let (coordinator, env) = coordinator().await;

        env.refs
            .add_reference("CMP-A", ComponentField::PadFile, "PAD1.pad")
            .await
            .unwrap();

        let updated = coordinator.delete(FileCategory::Pad, "PAD1.pad").await.unwrap();
        assert_eq!(updated, 1);
        assert!(env.refs.list_references("CMP-A").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn concurrent_renames_of_same_file_serialize() {
        let (coordinator, env) = coordinator().await;

        env.store
            .put(FileCategory::Pad, "PAD1.pad", b"pad".to_vec(), false)
            .await
            .unwrap();
        env.refs
            .add_reference("CMP-A", ComponentField::PadFile, "PAD1.pad")
            .await
            .unwrap();

        let c1 = coordinator.clone();
        let c2 = coordinator.clone();
        let first = tokio::spawn(async move {
            c1.rename_physical(FileCategory::Pad, "PAD1.pad", "PAD2.pad").await
        });
        let second = tokio::spawn(async move {
            c2.rename_physical(FileCategory::Pad, "PAD1.pad", "PAD3.pad").await
        });

        let results = [first.await.unwrap(), second.await.unwrap()];
        let successes = results.iter().filter(|r| r.is_ok()).count();
        // Exactly one rename wins; the loser sees NotFound for the old name.
        assert_eq!(successes, 1);
        let refs = env.refs.list_references("CMP-A").await.unwrap();
        assert_eq!(refs.len(), 1);
        let final_name = &refs[0].file_name;
        assert!(final_name == "PAD2.pad" || final_name == "PAD3.pad");
        assert!(env
            .store
            .exists(FileCategory::Pad, final_name)
            .await
            .unwrap());
    }
}
