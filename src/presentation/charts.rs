//! Chart state for the health-metric bar chart and the radar chart.
//!
//! The app owns one [`Charts`] value created by [`Charts::initialize`] and
//! passes it to the update and draw routines.

use crate::domain::{normalize_radar, VisualizationData};

use super::RenderError;

pub const METRIC_LABELS: [&str; 5] = ["Glucose", "Systolic BP", "Diastolic BP", "Cholesterol", "BMI"];

/// Alpha applied to the bar fill (`#rrggbb` + `99`).
pub const BAR_FILL_ALPHA: u8 = 0x99;

/// RGBA colour as used by the chart series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChartColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl ChartColor {
    /// Patient series blue
    pub const PATIENT: ChartColor = ChartColor::rgb(52, 152, 219);

    /// Normal-range series green
    pub const NORMAL_RANGE: ChartColor = ChartColor::rgb(46, 204, 113);

    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 0xff }
    }

    #[must_use]
    pub const fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    /// Parse `#rrggbb` or `#rrggbbaa`.
    #[must_use]
    pub fn parse_hex(raw: &str) -> Option<Self> {
        let hex = raw.trim().strip_prefix('#')?;
        if !hex.is_ascii() || !(hex.len() == 6 || hex.len() == 8) {
            return None;
        }
        let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        let a = if hex.len() == 8 { byte(6)? } else { 0xff };
        Some(Self {
            r: byte(0)?,
            g: byte(2)?,
            b: byte(4)?,
            a,
        })
    }

    /// CSS hex notation; alpha is omitted when opaque.
    #[must_use]
    pub fn to_css(&self) -> String {
        if self.a == 0xff {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

/// Per-metric magnitudes and colours.
#[derive(Debug, Clone, PartialEq)]
pub struct BarChart {
    pub labels: Vec<String>,
    pub values: Vec<f64>,
    pub fill: Vec<ChartColor>,
    pub border: Vec<ChartColor>,
}

/// Normalised [0, 1] positions per metric.
#[derive(Debug, Clone, PartialEq)]
pub struct RadarChart {
    pub labels: Vec<String>,
    pub patient: Vec<f64>,
    /// Reference series, always at the in-range midpoint
    pub normal_range: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Charts {
    pub bar: BarChart,
    pub radar: RadarChart,
}

impl Charts {
    /// Fresh charts: five metrics, zero data, default colours.
    #[must_use]
    pub fn initialize() -> Self {
        let labels: Vec<String> = METRIC_LABELS.iter().map(|l| l.to_string()).collect();
        let n = labels.len();

        Self {
            bar: BarChart {
                labels: labels.clone(),
                values: vec![0.0; n],
                fill: vec![ChartColor::PATIENT.with_alpha(BAR_FILL_ALPHA); n],
                border: vec![ChartColor::PATIENT; n],
            },
            radar: RadarChart {
                labels,
                patient: vec![0.0; n],
                normal_range: vec![0.5; n],
            },
        }
    }

    /// Apply a visualization payload to both charts.
    ///
    /// Nothing is changed when the payload is rejected.
    ///
    /// # Errors
    /// Returns `RenderError::Misaligned` if the payload arrays differ in length.
    pub fn update(&mut self, viz: &VisualizationData) -> Result<(), RenderError> {
        let n = viz.check_aligned().map_err(RenderError::Misaligned)?;

        if viz.metrics.len() == n && n > 0 {
            self.bar.labels = viz.metrics.clone();
            self.radar.labels = viz.metrics.clone();
        } else if self.bar.labels.len() != n {
            self.bar.labels = (0..n)
                .map(|i| {
                    METRIC_LABELS
                        .get(i)
                        .map_or_else(|| format!("Metric {}", i + 1), |l| l.to_string())
                })
                .collect();
            self.radar.labels = self.bar.labels.clone();
        }

        let opaque: Vec<ChartColor> = viz
            .colors
            .iter()
            .map(|c| ChartColor::parse_hex(c).unwrap_or(ChartColor::PATIENT).with_alpha(0xff))
            .collect();

        self.bar.values = viz.values.clone();
        self.bar.fill = opaque.iter().map(|c| c.with_alpha(BAR_FILL_ALPHA)).collect();
        self.bar.border = opaque;

        self.radar.patient = viz
            .values
            .iter()
            .zip(&viz.normal_ranges)
            .map(|(value, range)| normalize_radar(*value, *range))
            .collect();
        self.radar.normal_range = vec![0.5; n];

        Ok(())
    }

    /// Zero both charts' patient data.
    pub fn reset(&mut self) {
        self.bar.values.iter_mut().for_each(|v| *v = 0.0);
        self.radar.patient.iter_mut().for_each(|v| *v = 0.0);
    }
}

impl Default for Charts {
    fn default() -> Self {
        Self::initialize()
    }
}
