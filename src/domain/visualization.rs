//! Chart payload returned alongside an analysis.

use serde::{Deserialize, Serialize};

/// Radar position for a value under its normal range.
pub const RADAR_BELOW_RANGE: f64 = 0.3;

/// Radar position for a value inside its normal range.
pub const RADAR_IN_RANGE: f64 = 0.5;

/// Radar position ceiling.
pub const RADAR_MAX: f64 = 1.0;

/// Backend-supplied normal range for one metric. Used for display
/// normalisation only.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalRange {
    pub min: f64,
    pub max: f64,
}

/// Per-metric values, ranges and colours, index-aligned.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct VisualizationData {
    #[serde(default)]
    pub metrics: Vec<String>,
    pub values: Vec<f64>,
    pub normal_ranges: Vec<NormalRange>,
    pub colors: Vec<String>,
}

impl VisualizationData {
    /// Check that the parallel arrays line up.
    ///
    /// # Errors
    /// Returns the offending lengths when `values`, `normal_ranges` and
    /// `colors` differ (or `metrics`, when supplied).
    pub fn check_aligned(&self) -> Result<usize, String> {
        let n = self.values.len();
        let metrics_ok = self.metrics.is_empty() || self.metrics.len() == n;
        if self.normal_ranges.len() != n || self.colors.len() != n || !metrics_ok {
            return Err(format!(
                "misaligned visualization arrays: values={}, normal_ranges={}, colors={}, metrics={}",
                n,
                self.normal_ranges.len(),
                self.colors.len(),
                self.metrics.len()
            ));
        }
        Ok(n)
    }
}

/// Map a value to a radar position in [0, 1].
///
/// Below range gives a fixed low point, inside gives the midpoint, above
/// grows with the overshoot relative to `max` and is capped at 1. This is a
/// visual heuristic, not a clinical scale.
#[must_use]
pub fn normalize_radar(value: f64, range: NormalRange) -> f64 {
    if value < range.min {
        RADAR_BELOW_RANGE
    } else if value > range.max {
        (RADAR_IN_RANGE + (value - range.max) / range.max).min(RADAR_MAX)
    } else {
        RADAR_IN_RANGE
    }
}
