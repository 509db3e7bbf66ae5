//! # medscan
//!
//! Terminal client for an AI-assisted diagnostic service.
//!
//! This crate provides:
//! - Lab value entry with client-side validation
//! - Submission to the remote analysis service
//! - Risk charts and a formatted results panel
//!
//! ## Architecture
//!
//! The crate follows Hexagonal Architecture:
//! - `domain`: Core types (PatientRecord, AnalysisResult, form, validation)
//! - `ports`: Trait definitions for the remote service
//! - `adapters`: Concrete implementations (reqwest HTTP client, log sanitizer)
//! - `application`: Request orchestration
//! - `presentation`: Chart, results and notification state
//! - `tui`: Terminal user interface

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod presentation;
pub mod tui;

pub use domain::{AnalysisResult, PatientRecord, RiskLevel};

/// Result type for medscan operations
pub type Result<T> = std::result::Result<T, MedscanError>;

/// Main error type for medscan
#[derive(Debug, thiserror::Error)]
pub enum MedscanError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Diagnostic service error: {0}")]
    Api(#[from] ports::ApiError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
