//! Partvault Core Library
//!
//! This crate provides the core domain models, error types, configuration, and
//! the naming policy helpers that are shared across all partvault components.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod naming;

// Re-export commonly used types
pub use config::Config;
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use models::{
    AvailableFile, CadFile, Cardinality, ComponentField, ComponentFiles, ExtractionReport,
    FileCategory, FileInfo, FileReference, MemberFailure, UploadFileResult, UploadKind,
    UploadReport,
};
