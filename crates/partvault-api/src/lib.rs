//! Partvault API Library
//!
//! HTTP surface for the CAD asset consistency layer: handlers, application
//! state, error conversion, and setup. The binary in `main.rs` wires this to
//! configuration from the environment; tests build the same router against
//! temporary resources.

mod api_doc;

pub mod constants;
pub mod error;
pub mod handlers;
pub mod setup;
pub mod state;

pub use error::ErrorResponse;
