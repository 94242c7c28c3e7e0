//! Partvault Storage Library
//!
//! Asset store abstraction and the local filesystem backend. The asset store
//! is the single owner of CAD file bytes; everything else references files by
//! `(category, filename)` identity.
//!
//! # Key format
//!
//! Objects live under `cad/{category_dir}/{file_name}`. Filenames must be
//! bare names: no path separators, no `..`, no leading dot-slash games. Key
//! derivation is centralized in the `keys` module so every backend stays
//! consistent.

pub mod keys;
pub mod local;
pub mod traits;

// Re-export commonly used types
pub use keys::object_key;
pub use local::LocalAssetStore;
pub use traits::{AssetStore, StorageError, StorageResult, StoredObject};
