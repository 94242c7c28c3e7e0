//! API constants
//!
//! Versioned base path for all routes. Bump the version here when the wire
//! contract changes incompatibly.

/// API base path prefix, including version.
pub const API_PREFIX: &str = "/api/v0";
