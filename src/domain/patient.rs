//! Patient record submitted to the analysis endpoint.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Prefix used for identifiers generated on the client.
pub const GENERATED_ID_PREFIX: &str = "PAT_";

/// Number of random base-36 characters after the prefix.
const GENERATED_ID_LEN: usize = 9;

const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Biological sex as accepted by the backend model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    /// All selectable values, in form order.
    pub const ALL: [Gender; 2] = [Gender::Male, Gender::Female];

    /// Parse a form or CSV value. Accepts the full label or its initial.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "male" | "m" => Some(Self::Male),
            "female" | "f" => Some(Self::Female),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Male => "Male",
            Self::Female => "Female",
        }
    }
}

impl std::fmt::Display for Gender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One patient submission.
///
/// Built fresh from the form on every submit and dropped once the
/// response has been rendered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientRecord {
    pub patient_id: String,
    pub age: u32,
    pub gender: Gender,
    /// Fasting glucose in mg/dL
    pub glucose: f64,
    /// mmHg
    pub systolic_bp: f64,
    /// mmHg
    pub diastolic_bp: f64,
    /// Total cholesterol in mg/dL
    pub cholesterol: f64,
    pub bmi: f64,
}

/// Generate a client-side patient identifier: `PAT_` followed by nine
/// random lowercase base-36 characters.
#[must_use]
pub fn generate_patient_id() -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..GENERATED_ID_LEN)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect();
    format!("{GENERATED_ID_PREFIX}{suffix}")
}

/// Format a measurement for display or for a form buffer.
///
/// Whole numbers print without a fractional part (`120`, not `120.0`).
#[must_use]
pub fn format_measurement(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}
