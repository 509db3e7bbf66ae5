//! Results panel: what the user sees after an analysis.
//!
//! The panel is rebuilt wholesale from each response. It is drawn by the TUI
//! and can also be rendered as the HTML markup of the results region.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

use crate::domain::{format_measurement, MlResults, ModelPrediction, PatientRecord, RiskLevel, RuleResults};

use super::RenderError;

pub const PLACEHOLDER_MESSAGE: &str = "Enter patient data and press [Enter] to see results";
pub const NO_CONDITIONS_MESSAGE: &str = "No specific conditions detected";
pub const DISCLAIMER: &str = "This AI-assisted diagnostic tool is not a substitute for professional medical advice. Please consult with a qualified healthcare provider.";

#[derive(Debug, Clone, PartialEq)]
pub struct PatientIdentity {
    pub patient_id: String,
    pub age: u32,
    pub gender: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RiskBadge {
    pub level: RiskLevel,
    pub emoji: String,
}

impl RiskBadge {
    /// `"🟡 Moderate Risk"`
    #[must_use]
    pub fn label(&self) -> String {
        if self.emoji.is_empty() {
            format!("{} Risk", self.level)
        } else {
            format!("{} {} Risk", self.emoji, self.level)
        }
    }
}

/// Panel sections, in display order.
#[derive(Debug, Clone, PartialEq)]
pub enum ResultSection {
    PatientInfo(PatientIdentity),
    /// Empty means no condition was detected.
    Conditions(Vec<String>),
    RiskAssessment(RiskBadge),
    ModelPrediction(ModelPrediction),
    Recommendations(Vec<String>),
    Disclaimer,
}

impl ResultSection {
    #[must_use]
    pub fn title(&self) -> &'static str {
        match self {
            Self::PatientInfo(_) => "Patient Information",
            Self::Conditions(_) => "Detected Conditions",
            Self::RiskAssessment(_) => "Risk Assessment",
            Self::ModelPrediction(_) => "AI Prediction",
            Self::Recommendations(_) => "Recommendations",
            Self::Disclaimer => "Disclaimer",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResultsReport {
    pub sections: Vec<ResultSection>,
    pub generated_at: DateTime<Local>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum ResultsPanel {
    #[default]
    Placeholder,
    Report(ResultsReport),
}

impl ResultsPanel {
    /// Build the panel for one analysis.
    ///
    /// The model block only appears when `ml` is present and error-free.
    #[must_use]
    pub fn build(record: &PatientRecord, rules: &RuleResults, ml: Option<&MlResults>) -> Self {
        let mut sections = vec![
            ResultSection::PatientInfo(PatientIdentity {
                patient_id: record.patient_id.clone(),
                age: record.age,
                gender: record.gender.to_string(),
            }),
            ResultSection::Conditions(rules.conditions.clone()),
            ResultSection::RiskAssessment(RiskBadge {
                level: rules.risk_level.clone(),
                emoji: rules.risk_emoji.clone(),
            }),
        ];

        if let Some(prediction) = ml.and_then(MlResults::prediction) {
            sections.push(ResultSection::ModelPrediction(prediction));
        }

        sections.push(ResultSection::Recommendations(rules.recommendations.clone()));
        sections.push(ResultSection::Disclaimer);

        Self::Report(ResultsReport {
            sections,
            generated_at: Local::now(),
        })
    }

    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        matches!(self, Self::Placeholder)
    }

    #[must_use]
    pub fn report(&self) -> Option<&ResultsReport> {
        match self {
            Self::Report(report) => Some(report),
            Self::Placeholder => None,
        }
    }

    /// Markup of the results region.
    #[must_use]
    pub fn to_html(&self) -> String {
        match self {
            Self::Placeholder => format!(
                "<div class=\"text-center text-muted\">\n  <p>{}</p>\n</div>\n",
                escape_html(PLACEHOLDER_MESSAGE)
            ),
            Self::Report(report) => report.to_html(),
        }
    }
}

impl ResultsReport {
    /// Markup of the report, every server-provided string escaped.
    #[must_use]
    pub fn to_html(&self) -> String {
        let mut html = String::from("<div class=\"fade-in\">\n");

        for section in &self.sections {
            if let ResultSection::Disclaimer = section {
                let _ = writeln!(
                    html,
                    "  <div class=\"alert alert-info mt-3\"><strong>Disclaimer:</strong> {}</div>",
                    escape_html(DISCLAIMER)
                );
                continue;
            }

            html.push_str("  <div class=\"result-item\">\n");
            let _ = writeln!(html, "    <h6>{}</h6>", section.title());

            match section {
                ResultSection::PatientInfo(who) => {
                    let _ = writeln!(html, "    <p><strong>ID:</strong> {}</p>", escape_html(&who.patient_id));
                    let _ = writeln!(html, "    <p><strong>Age:</strong> {} years</p>", who.age);
                    let _ = writeln!(html, "    <p><strong>Gender:</strong> {}</p>", escape_html(&who.gender));
                }
                ResultSection::Conditions(conditions) if conditions.is_empty() => {
                    let _ = writeln!(html, "    <p class=\"text-success\">{NO_CONDITIONS_MESSAGE}</p>");
                }
                ResultSection::Conditions(conditions) => {
                    for condition in conditions {
                        let _ = writeln!(html, "    <p class=\"text-warning\">{}</p>", escape_html(condition));
                    }
                }
                ResultSection::RiskAssessment(badge) => {
                    let _ = writeln!(
                        html,
                        "    <div class=\"text-center\"><span class=\"risk-badge {}\">{}</span></div>",
                        escape_html(&badge.level.css_class()),
                        escape_html(&badge.label())
                    );
                }
                ResultSection::ModelPrediction(prediction) => {
                    let _ = writeln!(
                        html,
                        "    <p><strong>Predicted Risk:</strong> {}</p>",
                        escape_html(&prediction.predicted_risk)
                    );
                    let _ = writeln!(
                        html,
                        "    <p><strong>Confidence:</strong> {}%</p>",
                        format_measurement(prediction.confidence)
                    );
                }
                ResultSection::Recommendations(items) => {
                    html.push_str("    <div class=\"recommendations-list\">\n");
                    for item in items {
                        let _ = writeln!(
                            html,
                            "      <div class=\"recommendation-item\"><span>{}</span></div>",
                            escape_html(item)
                        );
                    }
                    html.push_str("    </div>\n");
                }
                ResultSection::Disclaimer => {}
            }

            html.push_str("  </div>\n");
        }

        html.push_str("</div>\n");
        html
    }

    /// Write a standalone HTML document into `dir`.
    ///
    /// The file name carries the generation time, never the patient id.
    ///
    /// # Errors
    /// Returns `RenderError::Io` if the directory or file cannot be written.
    pub fn export_html(&self, dir: &Path) -> Result<PathBuf, RenderError> {
        std::fs::create_dir_all(dir).map_err(|e| RenderError::Io {
            path: dir.display().to_string(),
            message: e.to_string(),
        })?;

        let name = format!(
            "medscan-report-{}.html",
            self.generated_at.format("%Y%m%d-%H%M%S")
        );
        let path = dir.join(name);
        let document = format!(
            "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n<title>Diagnostic report ({})</title>\n</head>\n<body>\n{}</body>\n</html>\n",
            self.generated_at.format("%Y-%m-%d %H:%M"),
            self.to_html()
        );

        std::fs::write(&path, document).map_err(|e| RenderError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Ok(path)
    }
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
