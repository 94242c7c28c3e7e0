//! Partvault Services Layer
//!
//! This crate is the **business service layer**: it hosts the operations
//! that must keep the asset store and the reference index consistent
//! (coordinated rename/delete, archive expansion, upload orchestration,
//! link/unlink, orphan detection, export bundling). Keep coordination logic
//! here; keep thin HTTP handling in partvault-api.

pub mod coordinator;
pub mod expander;
pub mod export;
pub mod links;
pub mod orphans;
pub mod upload;

pub use coordinator::FileCoordinator;
pub use expander::ArchiveExpander;
pub use export::export_component_archive;
pub use links::LinkManager;
pub use orphans::OrphanDetector;
pub use upload::UploadService;

use partvault_core::models::{CadFile, FileCategory};
use sha2::{Digest, Sha256};

/// Build a registry record for freshly stored bytes.
pub(crate) fn file_record(category: FileCategory, file_name: &str, data: &[u8]) -> CadFile {
    let hash = hex::encode(Sha256::digest(data));
    CadFile::new(category, file_name, data.len() as i64, Some(hash))
}
