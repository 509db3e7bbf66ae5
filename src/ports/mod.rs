//! Ports layer: Trait definitions for external operations.
//!
//! Following Hexagonal Architecture, these traits define the boundary
//! between the application and the remote diagnostic service.

mod diagnostic_api;

pub use diagnostic_api::{ApiError, CsvUpload, DiagnosticApi};
