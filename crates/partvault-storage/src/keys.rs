//! Storage key derivation and filename validation.

use crate::traits::{StorageError, StorageResult};
use partvault_core::models::FileCategory;

/// Root prefix for all CAD assets.
const KEY_PREFIX: &str = "cad";

/// Validate a bare filename: it must not be empty and must not carry any
/// path components that could escape the category directory.
pub fn validate_file_name(file_name: &str) -> StorageResult<()> {
    if file_name.is_empty() {
        return Err(StorageError::InvalidKey("Filename is empty".to_string()));
    }
    if file_name.contains('/') || file_name.contains('\\') {
        return Err(StorageError::InvalidKey(format!(
            "Filename contains path separators: {}",
            file_name
        )));
    }
    if file_name == "." || file_name == ".." || file_name.contains("..") {
        return Err(StorageError::InvalidKey(format!(
            "Filename contains traversal sequence: {}",
            file_name
        )));
    }
    if file_name.chars().any(|c| c.is_control()) {
        return Err(StorageError::InvalidKey(
            "Filename contains control characters".to_string(),
        ));
    }
    Ok(())
}

/// Derive the backend key for a file: `cad/{category_dir}/{file_name}`.
pub fn object_key(category: FileCategory, file_name: &str) -> StorageResult<String> {
    validate_file_name(file_name)?;
    Ok(format!("{}/{}", category_prefix(category), file_name))
}

/// Key prefix shared by all files of a category: `cad/{category_dir}`.
pub fn category_prefix(category: FileCategory) -> String {
    format!("{}/{}", KEY_PREFIX, category.dir_name())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derives_category_scoped_keys() {
        assert_eq!(
            object_key(FileCategory::Footprint, "FOOT123.kicad_mod").unwrap(),
            "cad/footprints/FOOT123.kicad_mod"
        );
        assert_eq!(
            object_key(FileCategory::Archive, "lib.zip").unwrap(),
            "cad/archives/lib.zip"
        );
    }

    #[test]
    fn rejects_traversal_and_separators() {
        assert!(object_key(FileCategory::Pad, "../etc/passwd").is_err());
        assert!(object_key(FileCategory::Pad, "a/b.pad").is_err());
        assert!(object_key(FileCategory::Pad, "a\\b.pad").is_err());
        assert!(object_key(FileCategory::Pad, "..").is_err());
        assert!(object_key(FileCategory::Pad, "").is_err());
    }
}
