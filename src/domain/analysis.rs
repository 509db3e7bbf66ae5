//! Analysis result types returned by the diagnostic backend.

use serde::{Deserialize, Serialize};

use super::VisualizationData;

/// Risk level classification produced by the backend rule engine.
///
/// Labels the client does not know are kept verbatim so they can still be
/// displayed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RiskLevel {
    /// No condition detected
    Normal,
    /// One or two conditions detected
    Moderate,
    /// Three or more conditions detected
    High,
    Other(String),
}

impl RiskLevel {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Normal => "Normal",
            Self::Moderate => "Moderate",
            Self::High => "High",
            Self::Other(label) => label,
        }
    }

    /// CSS class suffix used by the results markup (`risk-normal`, ...).
    #[must_use]
    pub fn css_class(&self) -> String {
        format!("risk-{}", self.as_str().to_lowercase())
    }
}

impl From<String> for RiskLevel {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Normal" => Self::Normal,
            "Moderate" => Self::Moderate,
            "High" => Self::High,
            _ => Self::Other(value),
        }
    }
}

impl From<RiskLevel> for String {
    fn from(level: RiskLevel) -> Self {
        level.as_str().to_string()
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rule-based assessment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleResults {
    pub conditions: Vec<String>,
    #[serde(default)]
    pub risk_factors: Vec<String>,
    pub risk_level: RiskLevel,
    #[serde(default)]
    pub risk_emoji: String,
    pub recommendations: Vec<String>,
}

/// Model-based prediction. The backend reports model failures in `error`
/// rather than failing the whole analysis.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MlResults {
    #[serde(default)]
    pub predicted_risk: Option<String>,
    /// Confidence as a percentage (0-100)
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub error: Option<String>,
}

/// A usable model prediction (present and error-free).
#[derive(Debug, Clone, PartialEq)]
pub struct ModelPrediction {
    pub predicted_risk: String,
    pub confidence: f64,
}

impl MlResults {
    /// The prediction, if the model produced one without error.
    #[must_use]
    pub fn prediction(&self) -> Option<ModelPrediction> {
        if self.error.as_deref().is_some_and(|e| !e.is_empty()) {
            return None;
        }
        Some(ModelPrediction {
            predicted_risk: self.predicted_risk.clone()?,
            confidence: self.confidence?,
        })
    }
}

/// Successful payload of `POST /api/analyze`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AnalysisResult {
    pub visualization: VisualizationData,
    pub rule_results: RuleResults,
    #[serde(default)]
    pub ml_results: Option<MlResults>,
}
