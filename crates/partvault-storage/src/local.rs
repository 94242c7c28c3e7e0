use crate::keys::object_key;
use crate::traits::{AssetStore, StorageError, StorageResult, StoredObject};
use async_trait::async_trait;
use partvault_core::models::FileCategory;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Local filesystem asset store
#[derive(Clone)]
pub struct LocalAssetStore {
    base_path: PathBuf,
}

impl LocalAssetStore {
    /// Create a new LocalAssetStore instance
    ///
    /// # Arguments
    /// * `base_path` - Root directory for file storage (e.g., "/var/lib/partvault/cad")
    pub async fn new(base_path: impl Into<PathBuf>) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalAssetStore { base_path })
    }

    fn path_for(&self, category: FileCategory, file_name: &str) -> StorageResult<PathBuf> {
        let key = object_key(category, file_name)?;
        Ok(self.base_path.join(key))
    }

    /// Ensure parent directory exists
    async fn ensure_parent_dir(&self, path: &Path) -> StorageResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }

    async fn write_file(
        path: &Path,
        data: &[u8],
        overwrite: bool,
        category: FileCategory,
        file_name: &str,
    ) -> StorageResult<()> {
        let mut open_options = fs::OpenOptions::new();
        open_options.write(true);
        if overwrite {
            open_options.create(true).truncate(true);
        } else {
            // create_new makes the conflict check atomic with the create.
            open_options.create_new(true);
        }

        let mut file = match open_options.open(path).await {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                return Err(StorageError::NameConflict {
                    category,
                    file_name: file_name.to_string(),
                });
            }
            Err(e) => {
                return Err(StorageError::WriteFailed(format!(
                    "Failed to create file {}: {}",
                    path.display(),
                    e
                )));
            }
        };

        file.write_all(data).await.map_err(|e| {
            StorageError::WriteFailed(format!("Failed to write file {}: {}", path.display(), e))
        })?;

        file.sync_all().await.map_err(|e| {
            StorageError::WriteFailed(format!("Failed to sync file {}: {}", path.display(), e))
        })?;

        Ok(())
    }
}

#[async_trait]
impl AssetStore for LocalAssetStore {
    async fn put(
        &self,
        category: FileCategory,
        file_name: &str,
        data: Vec<u8>,
        overwrite: bool,
    ) -> StorageResult<StoredObject> {
        let key = object_key(category, file_name)?;
        let path = self.base_path.join(&key);
        let size = data.len() as u64;

        self.ensure_parent_dir(&path).await?;

        let start = std::time::Instant::now();

        Self::write_file(&path, &data, overwrite, category, file_name).await?;

        tracing::info!(
            key = %key,
            size_bytes = size,
            overwrite,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Asset store put successful"
        );

        Ok(StoredObject { key, size })
    }

    async fn get(&self, category: FileCategory, file_name: &str) -> StorageResult<Vec<u8>> {
        let path = self.path_for(category, file_name)?;

        if !fs::try_exists(&path).await.unwrap_or(false) {
            return Err(StorageError::NotFound(format!(
                "{}/{}",
                category, file_name
            )));
        }

        let data = fs::read(&path).await.map_err(|e| {
            StorageError::ReadFailed(format!("Failed to read file {}: {}", path.display(), e))
        })?;

        Ok(data)
    }

    async fn rename(
        &self,
        category: FileCategory,
        old_file_name: &str,
        new_file_name: &str,
    ) -> StorageResult<StoredObject> {
        let old_path = self.path_for(category, old_file_name)?;
        let new_key = object_key(category, new_file_name)?;
        let new_path = self.base_path.join(&new_key);

        if !fs::try_exists(&old_path).await.unwrap_or(false) {
            return Err(StorageError::NotFound(format!(
                "{}/{}",
                category, old_file_name
            )));
        }
        if fs::try_exists(&new_path).await.unwrap_or(false) {
            return Err(StorageError::NameConflict {
                category,
                file_name: new_file_name.to_string(),
            });
        }

        fs::rename(&old_path, &new_path).await.map_err(|e| {
            StorageError::WriteFailed(format!(
                "Failed to rename {} to {}: {}",
                old_path.display(),
                new_path.display(),
                e
            ))
        })?;

        let size = fs::metadata(&new_path).await.map(|m| m.len()).unwrap_or(0);

        tracing::info!(
            category = %category,
            old_file_name = %old_file_name,
            new_file_name = %new_file_name,
            "Asset store rename successful"
        );

        Ok(StoredObject { key: new_key, size })
    }

    async fn delete(&self, category: FileCategory, file_name: &str) -> StorageResult<()> {
        let path = self.path_for(category, file_name)?;

        if !fs::try_exists(&path).await.unwrap_or(false) {
            return Ok(());
        }

        fs::remove_file(&path).await.map_err(|e| {
            StorageError::DeleteFailed(format!("Failed to delete file {}: {}", path.display(), e))
        })?;

        tracing::info!(
            category = %category,
            file_name = %file_name,
            "Asset store delete successful"
        );

        Ok(())
    }

    async fn exists(&self, category: FileCategory, file_name: &str) -> StorageResult<bool> {
        let path = self.path_for(category, file_name)?;
        Ok(fs::try_exists(&path).await.unwrap_or(false))
    }

    async fn size(&self, category: FileCategory, file_name: &str) -> StorageResult<u64> {
        let path = self.path_for(category, file_name)?;
        let meta = fs::metadata(&path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StorageError::NotFound(format!("{}/{}", category, file_name))
            } else {
                StorageError::ReadFailed(e.to_string())
            }
        })?;
        Ok(meta.len())
    }

    async fn list(&self, category: FileCategory) -> StorageResult<Vec<String>> {
        let dir = self.base_path.join(crate::keys::category_prefix(category));

        if !fs::try_exists(&dir).await.unwrap_or(false) {
            return Ok(Vec::new());
        }

        let mut entries = fs::read_dir(&dir).await.map_err(|e| {
            StorageError::ReadFailed(format!("Failed to list {}: {}", dir.display(), e))
        })?;

        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(|e| {
            StorageError::ReadFailed(format!("Failed to list {}: {}", dir.display(), e))
        })? {
            let file_type = entry.file_type().await?;
            if file_type.is_file() {
                if let Ok(name) = entry.file_name().into_string() {
                    names.push(name);
                }
            }
        }

        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_put_get_roundtrip() {
        let dir = tempdir().unwrap();
        let store = LocalAssetStore::new(dir.path()).await.unwrap();

        let data = b"(footprint FOOT123)".to_vec();
        let stored = store
            .put(FileCategory::Footprint, "FOOT123.kicad_mod", data.clone(), false)
            .await
            .unwrap();

        assert_eq!(stored.key, "cad/footprints/FOOT123.kicad_mod");
        assert_eq!(stored.size, data.len() as u64);

        let read_back = store
            .get(FileCategory::Footprint, "FOOT123.kicad_mod")
            .await
            .unwrap();
        assert_eq!(read_back, data);
    }

    #[tokio::test]
    async fn test_put_conflict_without_overwrite() {
        let dir = tempdir().unwrap();
        let store = LocalAssetStore::new(dir.path()).await.unwrap();

        store
            .put(FileCategory::Pad, "PAD1.pad", b"one".to_vec(), false)
            .await
            .unwrap();

        let result = store
            .put(FileCategory::Pad, "PAD1.pad", b"two".to_vec(), false)
            .await;
        assert!(matches!(result, Err(StorageError::NameConflict { .. })));

        // Overwrite replaces the bytes in place.
        store
            .put(FileCategory::Pad, "PAD1.pad", b"two".to_vec(), true)
            .await
            .unwrap();
        let data = store.get(FileCategory::Pad, "PAD1.pad").await.unwrap();
        assert_eq!(data, b"two");
    }

    #[tokio::test]
    async fn test_rename_moves_bytes() {
        let dir = tempdir().unwrap();
        let store = LocalAssetStore::new(dir.path()).await.unwrap();

        store
            .put(FileCategory::Footprint, "OLD.kicad_mod", b"x".to_vec(), false)
            .await
            .unwrap();

        let stored = store
            .rename(FileCategory::Footprint, "OLD.kicad_mod", "NEW.kicad_mod")
            .await
            .unwrap();
        assert_eq!(stored.key, "cad/footprints/NEW.kicad_mod");

        assert!(!store
            .exists(FileCategory::Footprint, "OLD.kicad_mod")
            .await
            .unwrap());
        assert_eq!(
            store
                .get(FileCategory::Footprint, "NEW.kicad_mod")
                .await
                .unwrap(),
            b"x"
        );
    }

    #[tokio::test]
    async fn test_rename_errors() {
        let dir = tempdir().unwrap();
        let store = LocalAssetStore::new(dir.path()).await.unwrap();

        let result = store
            .rename(FileCategory::Symbol, "missing.lib", "other.lib")
            .await;
        assert!(matches!(result, Err(StorageError::NotFound(_))));

        store
            .put(FileCategory::Symbol, "a.lib", b"a".to_vec(), false)
            .await
            .unwrap();
        store
            .put(FileCategory::Symbol, "b.lib", b"b".to_vec(), false)
            .await
            .unwrap();

        let result = store.rename(FileCategory::Symbol, "a.lib", "b.lib").await;
        assert!(matches!(result, Err(StorageError::NameConflict { .. })));
        // Nothing moved on failure.
        assert_eq!(store.get(FileCategory::Symbol, "a.lib").await.unwrap(), b"a");
        assert_eq!(store.get(FileCategory::Symbol, "b.lib").await.unwrap(), b"b");
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let dir = tempdir().unwrap();
        let store = LocalAssetStore::new(dir.path()).await.unwrap();

        store
            .put(FileCategory::Model, "body.step", b"solid".to_vec(), false)
            .await
            .unwrap();

        store.delete(FileCategory::Model, "body.step").await.unwrap();
        assert!(!store.exists(FileCategory::Model, "body.step").await.unwrap());

        // Second delete of the same file is not an error.
        store.delete(FileCategory::Model, "body.step").await.unwrap();
    }

    #[tokio::test]
    async fn test_list_per_category() {
        let dir = tempdir().unwrap();
        let store = LocalAssetStore::new(dir.path()).await.unwrap();

        assert!(store.list(FileCategory::Pspice).await.unwrap().is_empty());

        store
            .put(FileCategory::Pspice, "opamp.cir", b"*".to_vec(), false)
            .await
            .unwrap();
        store
            .put(FileCategory::Pspice, "diode.sub", b"*".to_vec(), false)
            .await
            .unwrap();
        store
            .put(FileCategory::Pad, "PAD1.pad", b"*".to_vec(), false)
            .await
            .unwrap();

        let mut names = store.list(FileCategory::Pspice).await.unwrap();
        names.sort();
        assert_eq!(names, vec!["diode.sub", "opamp.cir"]);
    }

    #[tokio::test]
    async fn test_path_traversal_rejected() {
        let dir = tempdir().unwrap();
        let store = LocalAssetStore::new(dir.path()).await.unwrap();

        let result = store.get(FileCategory::Pad, "../../etc/passwd").await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));

        let result = store
            .put(FileCategory::Pad, "a/b.pad", b"x".to_vec(), false)
            .await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));
    }
}
