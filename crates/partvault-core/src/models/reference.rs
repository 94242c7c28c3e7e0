use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[cfg(feature = "sqlx")]
use sqlx::FromRow;

use super::category::{ComponentField, FileCategory};
use super::file::FileInfo;

/// One component-to-file association. The component identifier is an opaque
/// key owned by the external catalog; it is never parsed here.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(FromRow))]
pub struct FileReference {
    pub component_id: String,
    pub field: ComponentField,
    pub category: FileCategory,
    pub file_name: String,
    pub position: i64,
    pub created_at: DateTime<Utc>,
}

/// A component's files grouped by field, each list in insertion order.
pub type ComponentFiles = BTreeMap<ComponentField, Vec<FileInfo>>;
