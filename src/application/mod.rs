//! Application layer: Use cases and services.
//!
//! This module orchestrates domain logic with ports to implement
//! the request/response cycles of the client.

mod orchestrator;

pub use orchestrator::{
    csv_loaded_message, failure_message, Analysis, CsvImport, Operation, RequestOrchestrator,
    SubmitError, FORM_CLEARED_MESSAGE, MISSING_FIELDS_MESSAGE, SAMPLE_LOADED_MESSAGE,
};

#[cfg(test)]
pub(crate) use orchestrator::tests as fixtures;
