//! Peak value types shared by both pipeline stages.

use serde::{Deserialize, Serialize};

/// Sentinel allele label for off-ladder peaks, which could not be assigned a
/// size-calibrated allele and are excluded from primary selection.
pub const OFF_LADDER: &str = "OL";

/// One detected peak as read from a GeneMapper export, after field
/// normalization but before any thresholding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawPeakRecord {
    pub sample_id: String,
    pub marker: String,
    /// Single-letter dye channel code, stray quoting already stripped.
    pub dye: String,
    pub allele: String,
    /// Base-pair length; `None` when the export field was non-numeric.
    pub size: Option<f64>,
    /// Signal intensity; `None` when the export field was non-numeric.
    pub height: Option<f64>,
}

/// A peak that survived primary selection, annotated with its height
/// relative to the tallest peak in its set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Peak {
    pub allele: String,
    pub height: f64,
    pub size: f64,
    /// Percentage of the tallest peak in the set, rounded to 2 decimals.
    pub relative_height: f64,
}

/// Primary peaks for one (sample, marker) pair, sorted by descending height.
///
/// Every member satisfies `relative_height >= 10.0`; an empty set means the
/// marker produced no usable signal.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PrimaryPeakSet {
    /// Dye channel code of the marker's rows (empty when the set is empty).
    pub dye: String,
    peaks: Vec<Peak>,
}

impl PrimaryPeakSet {
    /// Build a set from peaks already sorted by descending height.
    pub fn new(dye: String, peaks: Vec<Peak>) -> PrimaryPeakSet {
        PrimaryPeakSet { dye, peaks }
    }

    /// The empty set, returned for markers with no usable signal.
    pub fn empty() -> PrimaryPeakSet {
        PrimaryPeakSet::default()
    }

    pub fn is_empty(&self) -> bool {
        self.peaks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.peaks.len()
    }

    pub fn peaks(&self) -> &[Peak] {
        &self.peaks
    }

    /// Peak heights in set order (descending).
    pub fn heights(&self) -> Vec<f64> {
        self.peaks.iter().map(|p| p.height).collect()
    }

    /// Height of the tallest peak, or `None` for an empty set.
    pub fn max_height(&self) -> Option<f64> {
        self.peaks.first().map(|p| p.height)
    }
}

/// Round to 2 decimal places, matching the report precision used throughout.
pub fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}
