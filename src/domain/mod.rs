//! Domain layer: Core types and client-side rules.
//!
//! Pure data types plus the validation and normalisation logic that runs
//! before and after talking to the diagnostic service.

mod analysis;
pub mod form;
mod patient;
pub mod validation;
mod visualization;

pub use analysis::{AnalysisResult, MlResults, ModelPrediction, RiskLevel, RuleResults};
pub use form::{FieldId, FieldKind, PatientForm};
pub use patient::{format_measurement, generate_patient_id, Gender, PatientRecord};
pub use validation::{validate_form, ValidationError};
pub use visualization::{normalize_radar, NormalRange, VisualizationData};
