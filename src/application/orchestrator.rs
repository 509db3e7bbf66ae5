//! Request orchestration: form → record → service → result.
//!
//! This service coordinates:
//! - Lab value validation
//! - Record assembly (with id generation)
//! - The analysis, CSV upload and sample calls
//! - Mapping failures to user-facing messages

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use thiserror::Error;

use crate::domain::{
    validate_form, AnalysisResult, FieldId, PatientForm, PatientRecord, ValidationError,
};
use crate::ports::{ApiError, DiagnosticApi};

pub const MISSING_FIELDS_MESSAGE: &str = "Please fill in all required fields";
pub const SAMPLE_LOADED_MESSAGE: &str = "Sample patient data generated successfully!";
pub const FORM_CLEARED_MESSAGE: &str = "Form cleared successfully";

/// The three calls the UI can make.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Analyze,
    UploadCsv,
    GenerateSample,
}

impl Operation {
    fn failure_prefix(self) -> &'static str {
        match self {
            Self::Analyze => "Network error",
            Self::UploadCsv => "Error uploading file",
            Self::GenerateSample => "Error generating sample data",
        }
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Analyze => "analyze",
            Self::UploadCsv => "upload_csv",
            Self::GenerateSample => "generate_sample",
        }
    }
}

/// Message shown to the user when `operation` fails with `err`.
#[must_use]
pub fn failure_message(operation: Operation, err: &ApiError) -> String {
    match err {
        ApiError::Application(_) => err.to_string(),
        _ => format!("{}: {}", operation.failure_prefix(), err),
    }
}

#[must_use]
pub fn csv_loaded_message(total_records: usize) -> String {
    format!("Successfully loaded {total_records} patient records. First patient data populated.")
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SubmitError {
    #[error("{}", .0.iter().map(ToString::to_string).collect::<Vec<_>>().join(", "))]
    Invalid(Vec<ValidationError>),

    #[error("Please fill in all required fields")]
    MissingFields(Vec<FieldId>),

    #[error(transparent)]
    Api(#[from] ApiError),
}

/// A completed analysis together with the record it was made for.
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    pub record: PatientRecord,
    pub result: AnalysisResult,
}

/// Form contents produced by an upload.
#[derive(Debug, Clone, PartialEq)]
pub struct CsvImport {
    pub form: PatientForm,
    pub total_records: usize,
}

/// Drives requests to the diagnostic service.
pub struct RequestOrchestrator<A: DiagnosticApi> {
    api: Arc<A>,
}

impl<A: DiagnosticApi> Clone for RequestOrchestrator<A> {
    fn clone(&self) -> Self {
        Self {
            api: Arc::clone(&self.api),
        }
    }
}

impl<A: DiagnosticApi> RequestOrchestrator<A> {
    pub fn new(api: Arc<A>) -> Self {
        Self { api }
    }

    /// Validate the form and build the record to send. No network access.
    ///
    /// # Errors
    /// Returns `SubmitError::Invalid` for lab values that fail validation,
    /// then `SubmitError::MissingFields` for required fields that are absent.
    pub fn prepare(&self, form: &PatientForm) -> Result<PatientRecord, SubmitError> {
        validate_form(form).map_err(SubmitError::Invalid)?;
        form.to_record().map_err(SubmitError::MissingFields)
    }

    /// Send a prepared record for analysis.
    ///
    /// # Errors
    /// Returns `SubmitError::Api` if the service reports an error or cannot
    /// be reached.
    pub async fn analyze(&self, record: PatientRecord) -> Result<Analysis, SubmitError> {
        let started = Instant::now();
        tracing::info!("Submitting patient record for analysis");

        match self.api.analyze(&record).await {
            Ok(result) => {
                tracing::info!(
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    conditions = result.rule_results.conditions.len(),
                    "Analysis complete"
                );
                Ok(Analysis { record, result })
            }
            Err(e) => {
                tracing::warn!(
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Analysis failed: {}",
                    e
                );
                Err(e.into())
            }
        }
    }

    /// Validate, build and submit in one step.
    ///
    /// # Errors
    /// See [`RequestOrchestrator::prepare`] and [`RequestOrchestrator::analyze`].
    pub async fn submit(&self, form: &PatientForm) -> Result<Analysis, SubmitError> {
        let record = self.prepare(form)?;
        self.analyze(record).await
    }

    /// Upload a CSV and turn its first row into form contents.
    ///
    /// # Errors
    /// Returns the service or file error unchanged.
    pub async fn upload_csv(&self, path: &Path) -> Result<CsvImport, ApiError> {
        let upload = self.api.upload_csv(path).await.inspect_err(|e| {
            tracing::warn!("CSV upload failed: {}", e);
        })?;

        let mut form = PatientForm::default();
        form.populate_from_csv_row(&upload.patient_data);
        tracing::info!(total_records = upload.total_records, "CSV upload complete");

        Ok(CsvImport {
            form,
            total_records: upload.total_records,
        })
    }

    /// Fetch a generated patient and turn it into form contents.
    ///
    /// # Errors
    /// Returns the service error unchanged.
    pub async fn generate_sample(&self) -> Result<PatientForm, ApiError> {
        let record = self.api.generate_sample().await.inspect_err(|e| {
            tracing::warn!("Sample generation failed: {}", e);
        })?;

        let mut form = PatientForm::default();
        form.populate_from_record(&record);
        Ok(form)
    }
}
