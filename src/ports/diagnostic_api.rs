//! Diagnostic API port: Trait for the remote analysis service.
//!
//! This trait abstracts the HTTP backend from the application logic so the
//! orchestrator can be driven by a scripted implementation in tests.

use std::path::Path;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::domain::{AnalysisResult, PatientRecord};

/// Failures of a single call to the diagnostic service.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    /// The service answered with an `error` field.
    #[error("Error: {0}")]
    Application(String),

    /// The request never produced a response.
    #[error("{0}")]
    Transport(String),

    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// The response body was not JSON or not the expected shape.
    #[error("invalid response: {0}")]
    Decode(String),

    /// A local file needed for the request could not be read.
    #[error("cannot read {path}: {message}")]
    Io { path: String, message: String },
}

/// Successful payload of `POST /api/upload_csv`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CsvUpload {
    /// First row of the file, keyed by column name.
    pub patient_data: Map<String, Value>,
    pub total_records: usize,
}

/// Remote analysis service.
///
/// Each call is a single request/response exchange; implementations do not
/// retry.
#[async_trait]
pub trait DiagnosticApi: Send + Sync {
    /// Submit a record for rule-based and model-based analysis.
    ///
    /// # Errors
    /// Returns `ApiError::Application` if the service reports an error, or a
    /// transport/decode error if no usable response arrives.
    async fn analyze(&self, record: &PatientRecord) -> Result<AnalysisResult, ApiError>;

    /// Upload a CSV file of patient rows.
    ///
    /// # Errors
    /// Returns `ApiError::Io` if the file cannot be read, otherwise as
    /// [`DiagnosticApi::analyze`].
    async fn upload_csv(&self, path: &Path) -> Result<CsvUpload, ApiError>;

    /// Ask the service for a generated sample patient.
    ///
    /// # Errors
    /// As [`DiagnosticApi::analyze`].
    async fn generate_sample(&self) -> Result<PatientRecord, ApiError>;
}
