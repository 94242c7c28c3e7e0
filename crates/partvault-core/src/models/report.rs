use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A single archive member that could not be extracted or linked.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MemberFailure {
    pub name: String,
    pub reason: String,
}

/// Outcome of expanding one uploaded archive. Every member visited lands in
/// exactly one of the four buckets; `cancelled` marks a partial report.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct ExtractionReport {
    pub extracted: Vec<String>,
    pub skipped: Vec<String>,
    pub conflicts: Vec<String>,
    pub errors: Vec<MemberFailure>,
    #[serde(default)]
    pub cancelled: bool,
}

impl ExtractionReport {
    /// Total number of members accounted for across all buckets.
    pub fn members_accounted(&self) -> usize {
        self.extracted.len() + self.skipped.len() + self.conflicts.len() + self.errors.len()
    }

    /// True when extraction produced nothing usable. Conflicting members
    /// count as usable: the archive did carry recognized CAD content.
    pub fn yielded_nothing(&self) -> bool {
        self.extracted.is_empty() && self.conflicts.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum UploadKind {
    Regular,
    Archive,
}

/// Per-file entry in an upload response.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UploadFileResult {
    pub file_name: String,
    pub kind: UploadKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub files_extracted: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<ExtractionReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl UploadFileResult {
    pub fn regular(file_name: impl Into<String>) -> Self {
        UploadFileResult {
            file_name: file_name.into(),
            kind: UploadKind::Regular,
            files_extracted: None,
            report: None,
            error: None,
        }
    }

    pub fn archive(file_name: impl Into<String>, report: ExtractionReport) -> Self {
        UploadFileResult {
            file_name: file_name.into(),
            kind: UploadKind::Archive,
            files_extracted: Some(report.extracted.len()),
            report: Some(report),
            error: None,
        }
    }

    pub fn failed(file_name: impl Into<String>, kind: UploadKind, reason: impl Into<String>) -> Self {
        UploadFileResult {
            file_name: file_name.into(),
            kind,
            files_extracted: None,
            report: None,
            error: Some(reason.into()),
        }
    }
}

/// Response body for a multi-file upload.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UploadReport {
    pub results: Vec<UploadFileResult>,
}
