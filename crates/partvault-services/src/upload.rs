//! Upload orchestration.
//!
//! Routes each uploaded file by extension: archives fan out through the
//! expander, regular CAD files are stored and linked directly. Per-file
//! failures land in the report; the batch itself only fails on
//! infrastructure errors.

use partvault_core::constants::category_for_file;
use partvault_core::models::{
    ExtractionReport, FileCategory, UploadFileResult, UploadKind, UploadReport,
};
use partvault_core::AppError;
use partvault_db::{FileRepository, ReferenceRepository};
use partvault_storage::{AssetStore, StorageError};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::expander::ArchiveExpander;

#[derive(Clone)]
pub struct UploadService {
    store: Arc<dyn AssetStore>,
    files: FileRepository,
    refs: ReferenceRepository,
    expander: ArchiveExpander,
}

impl UploadService {
    pub fn new(
        store: Arc<dyn AssetStore>,
        files: FileRepository,
        refs: ReferenceRepository,
    ) -> Self {
        let expander = ArchiveExpander::new(store.clone(), files.clone(), refs.clone());
        Self {
            store,
            files,
            refs,
            expander,
        }
    }

    /// Store a batch of uploaded files for a component. Cancellation stops
    /// the batch between files; the partial report covers what was done.
    #[tracing::instrument(skip(self, uploads, cancel), fields(operation = "upload_files", file_count = uploads.len()))]
    pub async fn upload_files(
        &self,
        component_id: &str,
        uploads: Vec<(String, Vec<u8>)>,
        cancel: &CancellationToken,
    ) -> Result<UploadReport, AppError> {
        let mut results = Vec::with_capacity(uploads.len());

        for (raw_name, data) in uploads {
            if cancel.is_cancelled() {
                break;
            }

            // Browsers and tools sometimes send path-qualified names; only
            // the base name is stored.
            let Some(file_name) = crate::expander::sanitize_member_name(&raw_name) else {
                results.push(UploadFileResult::failed(
                    raw_name.as_str(),
                    UploadKind::Regular,
                    "Invalid filename",
                ));
                continue;
            };

            let result = match category_for_file(&file_name) {
                Some(FileCategory::Archive) => {
                    self.upload_archive(component_id, &file_name, data, cancel)
                        .await?
                }
                Some(category) => {
                    self.upload_regular(component_id, category, &file_name, data)
                        .await?
                }
                None => UploadFileResult::failed(
                    file_name.as_str(),
                    UploadKind::Regular,
                    "Unsupported file type",
                ),
            };
            results.push(result);
        }

        Ok(UploadReport { results })
    }

    async fn upload_regular(
        &self,
        component_id: &str,
        category: FileCategory,
        file_name: &str,
        data: Vec<u8>,
    ) -> Result<UploadFileResult, AppError> {
        let record = crate::file_record(category, file_name, &data);

        match self.store.put(category, file_name, data, false).await {
            Ok(_) => {}
            Err(StorageError::NameConflict { .. }) => {
                return Ok(UploadFileResult::failed(
                    file_name,
                    UploadKind::Regular,
                    format!(
                        "A file named '{}' already exists in category {}; link it instead",
                        file_name, category
                    ),
                ));
            }
            Err(StorageError::InvalidKey(msg)) => {
                return Ok(UploadFileResult::failed(file_name, UploadKind::Regular, msg));
            }
            Err(e) => return Err(e.into()),
        }

        self.files.upsert(&record).await?;

        match self
            .refs
            .add_reference(component_id, category.field(), file_name)
            .await
        {
            Ok(()) => Ok(UploadFileResult::regular(file_name)),
            // The bytes stay stored either way; only the link failed.
            Err(
                e @ (AppError::CardinalityViolation { .. } | AppError::DuplicateReference { .. }),
            ) => Ok(UploadFileResult::failed(
                file_name,
                UploadKind::Regular,
                e.to_string(),
            )),
            Err(e) => Err(e),
        }
    }

    async fn upload_archive(
        &self,
        component_id: &str,
        file_name: &str,
        data: Vec<u8>,
        cancel: &CancellationToken,
    ) -> Result<UploadFileResult, AppError> {
        let report = match self.expander.expand(component_id, &data, cancel).await {
            Ok(report) => report,
            Err(AppError::InvalidInput(reason)) => {
                return Ok(UploadFileResult::failed(
                    file_name,
                    UploadKind::Archive,
                    reason,
                ));
            }
            Err(e) => return Err(e),
        };

        // An archive that yields nothing usable is kept as-is so the upload
        // is not silently lost.
        if report.yielded_nothing() && !report.cancelled {
            return self
                .store_archive_as_is(component_id, file_name, data, report)
                .await;
        }

        Ok(UploadFileResult::archive(file_name, report))
    }

    async fn store_archive_as_is(
        &self,
        component_id: &str,
        file_name: &str,
        data: Vec<u8>,
        report: ExtractionReport,
    ) -> Result<UploadFileResult, AppError> {
        let record = crate::file_record(FileCategory::Archive, file_name, &data);

        match self
            .store
            .put(FileCategory::Archive, file_name, data, false)
            .await
        {
            Ok(_) => {
                self.files.upsert(&record).await?;
            }
            Err(StorageError::NameConflict { .. }) => {
                // Keep the existing archive and just link it below.
            }
            Err(e) => return Err(e.into()),
        }

        match self
            .refs
            .add_reference(component_id, FileCategory::Archive.field(), file_name)
            .await
        {
            Ok(()) | Err(AppError::DuplicateReference { .. }) => {}
            Err(e @ AppError::CardinalityViolation { .. }) => {
                return Ok(UploadFileResult::failed(
                    file_name,
                    UploadKind::Archive,
                    e.to_string(),
                ));
            }
            Err(e) => return Err(e),
        }

        Ok(UploadFileResult::archive(file_name, report))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::setup;
    use partvault_core::models::ComponentField;
    use std::io::{Cursor, Write};
    use zip::write::FileOptions;

    fn build_zip(members: &[(&str, &[u8])]) -> Vec<u8> {
        let mut buffer = Vec::new();
        {
            let mut writer = zip::ZipWriter::new(Cursor::new(&mut buffer));
            for (name, data) in members {
                writer.start_file(*name, FileOptions::default()).unwrap();
                writer.write_all(data).unwrap();
            }
            writer.finish().unwrap();
        }
        buffer
    }

    async fn service() -> (UploadService, crate::test_support::TestEnv) {
        let env = setup().await;
        let service =
            UploadService::new(env.store.clone(), env.files.clone(), env.refs.clone());
        (service, env)
    }

    #[tokio::test]
    async fn regular_file_is_stored_registered_and_linked() {
        let (service, env) = service().await;

        let report = service
            .upload_files(
                "CMP-1",
                vec![("FOOT123.kicad_mod".to_string(), b"(footprint)".to_vec())],
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        assert_eq!(report.results.len(), 1);
        let result = &report.results[0];
        assert_eq!(result.kind, UploadKind::Regular);
        assert!(result.error.is_none());

        assert!(env
            .store
            .exists(FileCategory::Footprint, "FOOT123.kicad_mod")
            .await
            .unwrap());
        let stored = env
            .files
            .get(FileCategory::Footprint, "FOOT123.kicad_mod")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.file_size, b"(footprint)".len() as i64);
        assert!(stored.content_hash.is_some());
        assert!(env
            .refs
            .has_reference("CMP-1", ComponentField::PcbFootprint, "FOOT123.kicad_mod")
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn unsupported_extension_is_reported_not_fatal() {
        let (service, _env) = service().await;

        let report = service
            .upload_files(
                "CMP-1",
                vec![
                    ("notes.docx".to_string(), b"text".to_vec()),
                    ("PAD1.pad".to_string(), b"pad".to_vec()),
                ],
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        assert_eq!(report.results.len(), 2);
        assert!(report.results[0].error.as_deref().unwrap().contains("Unsupported"));
        assert!(report.results[1].error.is_none());
    }

    #[tokio::test]
    async fn archive_upload_reports_extraction() {
        let (service, env) = service().await;

        let data = build_zip(&[("F.kicad_mod", b"(fp)"), ("readme.xyz", b"hi")]);
        let report = service
            .upload_files(
                "CMP-1",
                vec![("bundle.zip".to_string(), data)],
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        let result = &report.results[0];
        assert_eq!(result.kind, UploadKind::Archive);
        assert_eq!(result.files_extracted, Some(1));
        let extraction = result.report.as_ref().unwrap();
        assert_eq!(extraction.extracted, vec!["F.kicad_mod"]);
        assert_eq!(extraction.skipped, vec!["readme.xyz"]);

        // The container itself was not stored: it fanned out.
        assert!(!env
            .store
            .exists(FileCategory::Archive, "bundle.zip")
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn useless_archive_is_stored_as_is_and_linked() {
        let (service, env) = service().await;

        let data = build_zip(&[("readme.txt", b"nothing cad here")]);
        let report = service
            .upload_files(
                "CMP-1",
                vec![("misc.zip".to_string(), data)],
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        let result = &report.results[0];
        assert_eq!(result.kind, UploadKind::Archive);
        assert_eq!(result.files_extracted, Some(0));

        assert!(env
            .store
            .exists(FileCategory::Archive, "misc.zip")
            .await
            .unwrap());
        assert!(env
            .refs
            .has_reference("CMP-1", ComponentField::LibraryArchive, "misc.zip")
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn single_valued_field_conflict_is_per_file() {
        let (service, env) = service().await;

        env.refs
            .add_reference("CMP-1", ComponentField::StepModel, "existing.step")
            .await
            .unwrap();

        let report = service
            .upload_files(
                "CMP-1",
                vec![("second.step".to_string(), b"solid".to_vec())],
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        let result = &report.results[0];
        assert!(result.error.as_deref().unwrap().contains("step_model"));
        // The bytes were stored even though linking failed.
        assert!(env
            .store
            .exists(FileCategory::Model, "second.step")
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn cancelled_batch_returns_partial_report() {
        let (service, _env) = service().await;

        let cancel = CancellationToken::new();
        cancel.cancel();

        let report = service
            .upload_files(
                "CMP-1",
                vec![("PAD1.pad".to_string(), b"p".to_vec())],
                &cancel,
            )
            .await
            .unwrap();
        assert!(report.results.is_empty());
    }
}
