//! Domain models shared across the workspace.

pub mod category;
pub mod file;
pub mod reference;
pub mod report;

pub use category::{Cardinality, ComponentField, FileCategory};
pub use file::{AvailableFile, CadFile, FileInfo};
pub use reference::{ComponentFiles, FileReference};
pub use report::{ExtractionReport, MemberFailure, UploadFileResult, UploadKind, UploadReport};
