//! Error types module
//!
//! All failures are unified under the `AppError` enum, which can represent
//! database, storage, and consistency-rule errors. Validation errors
//! (`NotFound`, `NameConflict`, `CardinalityViolation`, `DuplicateReference`)
//! are raised before any mutation and carry enough context (category,
//! filename, component) for the caller to act.
//!
//! The `Database` variant and `From<sqlx::Error>` are gated behind the `sqlx`
//! feature.

use std::io;

#[cfg(feature = "sqlx")]
use sqlx::Error as SqlxError;

use crate::models::{ComponentField, FileCategory};

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for recoverable issues
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error responses - defines how an error should be presented.
/// This trait allows errors to self-describe their HTTP response
/// characteristics without the core crate depending on any HTTP types.
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "name_conflict")
    fn error_code(&self) -> &'static str;

    /// Whether this error is recoverable (can be retried)
    fn is_recoverable(&self) -> bool;

    /// Suggested action for the client
    fn suggested_action(&self) -> Option<&'static str>;

    /// Client-facing message (may differ from internal error message)
    fn client_message(&self) -> String;

    /// Whether details should be hidden in production
    fn is_sensitive(&self) -> bool;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[cfg(feature = "sqlx")]
    #[error("Database error: {0}")]
    Database(#[source] SqlxError),

    #[cfg(not(feature = "sqlx"))]
    #[error("Database error: {0}")]
    Database(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Name conflict: '{file_name}' already exists in category {category}")]
    NameConflict {
        category: FileCategory,
        file_name: String,
    },

    #[error("Cardinality violation: field {field} of component {component_id} already holds a file")]
    CardinalityViolation {
        component_id: String,
        field: ComponentField,
    },

    #[error("Duplicate reference: component {component_id} already links '{file_name}' via {field}")]
    DuplicateReference {
        component_id: String,
        field: ComponentField,
        file_name: String,
    },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Internal error with source")]
    InternalWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

// Error conversion implementations following Rust best practices
#[cfg(feature = "sqlx")]
impl From<SqlxError> for AppError {
    fn from(err: SqlxError) -> Self {
        AppError::Database(err)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::Internal(format!("IO error: {}", err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InvalidInput(format!("JSON parsing error: {}", err))
    }
}

/// Static metadata for each variant: (http_status, error_code, recoverable,
/// suggested_action, sensitive, log_level). client_message stays per-variant
/// for dynamic content.
fn static_metadata(
    err: &AppError,
) -> (
    u16,
    &'static str,
    bool,
    Option<&'static str>,
    bool,
    LogLevel,
) {
    match err {
        AppError::Database(_) => (500, "database_error", true, Some("Retry the request"), true, LogLevel::Error),
        AppError::NotFound(_) => (404, "not_found", false, None, false, LogLevel::Debug),
        AppError::NameConflict { .. } => (
            409,
            "name_conflict",
            false,
            Some("Choose a different filename or link the existing file"),
            false,
            LogLevel::Debug,
        ),
        AppError::CardinalityViolation { .. } => (
            409,
            "cardinality_violation",
            false,
            Some("Unlink the current file from the field first"),
            false,
            LogLevel::Debug,
        ),
        AppError::DuplicateReference { .. } => (
            409,
            "duplicate_reference",
            false,
            None,
            false,
            LogLevel::Debug,
        ),
        AppError::InvalidInput(_) => (400, "invalid_input", false, None, false, LogLevel::Debug),
        AppError::Internal(_) => (500, "internal_error", true, Some("Retry the request"), true, LogLevel::Error),
        AppError::InternalWithSource { .. } => {
            (500, "internal_error", true, Some("Retry the request"), true, LogLevel::Error)
        }
    }
}

impl AppError {
    /// Short variant name, used as a structured logging field.
    pub fn error_type(&self) -> &'static str {
        match self {
            AppError::Database(_) => "Database",
            AppError::NotFound(_) => "NotFound",
            AppError::NameConflict { .. } => "NameConflict",
            AppError::CardinalityViolation { .. } => "CardinalityViolation",
            AppError::DuplicateReference { .. } => "DuplicateReference",
            AppError::InvalidInput(_) => "InvalidInput",
            AppError::Internal(_) => "Internal",
            AppError::InternalWithSource { .. } => "InternalWithSource",
        }
    }

    /// Full internal message, including sources where present.
    pub fn detailed_message(&self) -> String {
        match self {
            AppError::InternalWithSource { message, source } => {
                format!("{}: {:#}", message, source)
            }
            other => other.to_string(),
        }
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        static_metadata(self).0
    }

    fn error_code(&self) -> &'static str {
        static_metadata(self).1
    }

    fn is_recoverable(&self) -> bool {
        static_metadata(self).2
    }

    fn suggested_action(&self) -> Option<&'static str> {
        static_metadata(self).3
    }

    fn is_sensitive(&self) -> bool {
        static_metadata(self).4
    }

    fn log_level(&self) -> LogLevel {
        static_metadata(self).5
    }

    fn client_message(&self) -> String {
        match self {
            AppError::Database(_) | AppError::Internal(_) | AppError::InternalWithSource { .. } => {
                "Internal server error".to_string()
            }
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_map_to_client_statuses() {
        let err = AppError::NotFound("footprint/x.kicad_mod".into());
        assert_eq!(err.http_status_code(), 404);
        assert_eq!(err.error_code(), "not_found");
        assert!(!err.is_sensitive());

        let err = AppError::NameConflict {
            category: FileCategory::Footprint,
            file_name: "x.kicad_mod".into(),
        };
        assert_eq!(err.http_status_code(), 409);
        assert_eq!(err.error_code(), "name_conflict");
        assert_eq!(err.log_level(), LogLevel::Debug);
    }

    #[test]
    fn internal_errors_hide_details() {
        let err = AppError::Internal("disk on fire".into());
        assert!(err.is_sensitive());
        assert_eq!(err.client_message(), "Internal server error");
        assert_eq!(err.log_level(), LogLevel::Error);
    }

    #[test]
    fn conflict_errors_carry_context() {
        let err = AppError::DuplicateReference {
            component_id: "CMP-77".into(),
            field: ComponentField::PadFile,
            file_name: "PAD1.pad".into(),
        };
        let message = err.client_message();
        assert!(message.contains("CMP-77"));
        assert!(message.contains("PAD1.pad"));
        assert!(message.contains("pad_file"));
    }
}
