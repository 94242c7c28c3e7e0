//! Asset store abstraction trait
//!
//! This module defines the `AssetStore` trait that storage backends must
//! implement, and the storage error taxonomy.

use async_trait::async_trait;
use partvault_core::models::FileCategory;
use partvault_core::AppError;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Name conflict: '{file_name}' already exists in category {category}")]
    NameConflict {
        category: FileCategory,
        file_name: String,
    },

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Write failed: {0}")]
    WriteFailed(String),

    #[error("Read failed: {0}")]
    ReadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Unify storage failures into the application error taxonomy so services
/// can use `?` across store and database calls.
impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(key) => AppError::NotFound(key),
            StorageError::NameConflict {
                category,
                file_name,
            } => AppError::NameConflict {
                category,
                file_name,
            },
            StorageError::InvalidKey(msg) => AppError::InvalidInput(msg),
            StorageError::IoError(e) => AppError::Internal(format!("IO error: {}", e)),
            other => AppError::Internal(other.to_string()),
        }
    }
}

/// Descriptor returned by mutating store operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    /// Backend key, e.g. `cad/footprints/FOOT123.kicad_mod`
    pub key: String,
    /// Size in bytes of the stored object
    pub size: u64,
}

/// Asset store abstraction
///
/// The store holds one flat namespace of filenames per category. It knows
/// nothing about components or references; consistency between bytes and the
/// reference index is the coordinator's job.
#[async_trait]
pub trait AssetStore: Send + Sync {
    /// Store a file. Fails with `NameConflict` when the name is taken and
    /// `overwrite` is false; with `overwrite` the existing bytes are
    /// replaced in place.
    async fn put(
        &self,
        category: FileCategory,
        file_name: &str,
        data: Vec<u8>,
        overwrite: bool,
    ) -> StorageResult<StoredObject>;

    /// Read a file's bytes. Fails with `NotFound` when absent.
    async fn get(&self, category: FileCategory, file_name: &str) -> StorageResult<Vec<u8>>;

    /// Move a file to a new name within its category as a single atomic
    /// filesystem operation. Fails with `NotFound` when the source is absent
    /// and `NameConflict` when the target name is taken.
    async fn rename(
        &self,
        category: FileCategory,
        old_file_name: &str,
        new_file_name: &str,
    ) -> StorageResult<StoredObject>;

    /// Delete a file. Idempotent: deleting an absent file is Ok.
    async fn delete(&self, category: FileCategory, file_name: &str) -> StorageResult<()>;

    /// Check if a file exists.
    async fn exists(&self, category: FileCategory, file_name: &str) -> StorageResult<bool>;

    /// Size in bytes of a stored file. Fails with `NotFound` when absent.
    async fn size(&self, category: FileCategory, file_name: &str) -> StorageResult<u64>;

    /// List filenames in a category. Order is unspecified.
    async fn list(&self, category: FileCategory) -> StorageResult<Vec<String>>;
}
