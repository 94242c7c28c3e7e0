use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[cfg(feature = "sqlx")]
use sqlx::FromRow;

use super::category::FileCategory;

/// Registry record for a stored CAD file. The bytes themselves live in the
/// asset store; this row mirrors size and hash for pickers and reports.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(FromRow))]
pub struct CadFile {
    pub id: Uuid,
    pub category: FileCategory,
    pub file_name: String,
    pub file_size: i64,
    pub content_hash: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CadFile {
    pub fn new(
        category: FileCategory,
        file_name: impl Into<String>,
        file_size: i64,
        content_hash: Option<String>,
    ) -> Self {
        let now = Utc::now();
        CadFile {
            id: Uuid::new_v4(),
            category,
            file_name: file_name.into(),
            file_size,
            content_hash,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Per-file entry in component file listings.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FileInfo {
    pub name: String,
    pub size: i64,
    pub path: String,
}

/// Picker row: a stored file plus how many components currently reference it.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(FromRow))]
pub struct AvailableFile {
    pub id: Uuid,
    pub file_name: String,
    pub file_type: FileCategory,
    pub component_count: i64,
}
