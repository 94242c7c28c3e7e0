//! Archive expansion.
//!
//! An uploaded ZIP fans out into individually tracked files: each member is
//! classified by extension, stored under its category, and linked to the
//! uploading component. Member failures are accumulated in the report and
//! never abort the batch.

use partvault_core::constants::category_for_file;
use partvault_core::models::{ExtractionReport, MemberFailure};
use partvault_core::AppError;
use partvault_db::{FileRepository, ReferenceRepository};
use partvault_storage::{AssetStore, StorageError};
use std::io::{Cursor, Read};
use std::path::Path;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Sanitize an archive member or upload name to its base name (strips
/// directory components like `../`). Returns None for names with no usable
/// base.
pub(crate) fn sanitize_member_name(member_name: &str) -> Option<String> {
    Path::new(member_name)
        .file_name()
        .and_then(|n| n.to_str())
        .filter(|s| !s.is_empty() && *s != "." && *s != "..")
        .map(|s| s.to_string())
}

enum PutOutcome {
    Stored,
    KeptExisting,
}

/// Expands uploaded ZIP archives into the asset store and reference index.
#[derive(Clone)]
pub struct ArchiveExpander {
    store: Arc<dyn AssetStore>,
    files: FileRepository,
    refs: ReferenceRepository,
}

impl ArchiveExpander {
    pub fn new(
        store: Arc<dyn AssetStore>,
        files: FileRepository,
        refs: ReferenceRepository,
    ) -> Self {
        Self { store, files, refs }
    }

    /// Expand one uploaded archive for a component. Returns a per-member
    /// report; only a container that cannot be opened at all is an error.
    ///
    /// Cancellation is honored between members; the partial report is
    /// returned with `cancelled` set.
    #[tracing::instrument(skip(self, data, cancel), fields(operation = "expand_archive"))]
    pub async fn expand(
        &self,
        component_id: &str,
        data: &[u8],
        cancel: &CancellationToken,
    ) -> Result<ExtractionReport, AppError> {
        let mut archive = zip::ZipArchive::new(Cursor::new(data))
            .map_err(|e| AppError::InvalidInput(format!("Not a valid zip archive: {}", e)))?;

        let mut report = ExtractionReport::default();

        for index in 0..archive.len() {
            if cancel.is_cancelled() {
                report.cancelled = true;
                break;
            }

            // Read the member synchronously; the entry borrow must end
            // before any await below.
            let (raw_name, member_data) = {
                let mut entry = match archive.by_index(index) {
                    Ok(entry) => entry,
                    Err(e) => {
                        report.errors.push(MemberFailure {
                            name: format!("member #{}", index),
                            reason: format!("Unreadable archive member: {}", e),
                        });
                        continue;
                    }
                };
                if entry.is_dir() {
                    continue;
                }
                let raw_name = entry.name().to_string();
                let mut member_data = Vec::with_capacity(entry.size() as usize);
                if let Err(e) = entry.read_to_end(&mut member_data) {
                    report.errors.push(MemberFailure {
                        name: raw_name,
                        reason: format!("Failed to read member: {}", e),
                    });
                    continue;
                }
                (raw_name, member_data)
            };

            let Some(file_name) = sanitize_member_name(&raw_name) else {
                report.skipped.push(raw_name);
                continue;
            };

            let Some(category) = category_for_file(&file_name) else {
                report.skipped.push(file_name);
                continue;
            };

            let record = crate::file_record(category, &file_name, &member_data);
            let outcome = match self.store.put(category, &file_name, member_data, false).await {
                Ok(_) => {
                    self.files.upsert(&record).await?;
                    PutOutcome::Stored
                }
                Err(StorageError::NameConflict { .. }) => {
                    // Keep the existing file; the member still links below so
                    // the component ends up referencing the shared copy.
                    PutOutcome::KeptExisting
                }
                Err(e) => {
                    report.errors.push(MemberFailure {
                        name: file_name,
                        reason: format!("Storage failure: {}", e),
                    });
                    continue;
                }
            };

            match self
                .refs
                .add_reference(component_id, category.field(), &file_name)
                .await
            {
                Ok(()) | Err(AppError::DuplicateReference { .. }) => match outcome {
                    PutOutcome::Stored => report.extracted.push(file_name),
                    PutOutcome::KeptExisting => report.conflicts.push(file_name),
                },
                Err(AppError::CardinalityViolation { field, .. }) => {
                    report.errors.push(MemberFailure {
                        name: file_name,
                        reason: format!("Field {} already holds a file", field),
                    });
                }
                Err(e) => return Err(e),
            }
        }

        tracing::info!(
            component_id,
            extracted = report.extracted.len(),
            skipped = report.skipped.len(),
            conflicts = report.conflicts.len(),
            errors = report.errors.len(),
            cancelled = report.cancelled,
            "Archive expansion finished"
        );

        Ok(report)
    }
}
