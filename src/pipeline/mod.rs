//! Per-sample orchestration of the two classification stages.
//!
//! Each (sample, marker) unit reads only the immutable configuration and
//! its own row slice, so batches fan out across samples with rayon and
//! collect in input order.

use crate::call::call_peaks;
use crate::config::AnalysisConfig;
use crate::contamination::{classify_contamination, ContaminationResult};
use crate::data::{group_by_sample, PrimaryPeakSet, RawPeakRecord};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Classified peaks for one marker of one sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerCall {
    pub marker: String,
    pub peaks: PrimaryPeakSet,
    /// `None` means "not contaminated".
    pub contamination: Option<ContaminationResult>,
}

/// All marker calls for one sample, in panel order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleAnalysis {
    pub sample_id: String,
    pub calls: Vec<MarkerCall>,
}

impl SampleAnalysis {
    /// Markers flagged as contaminated, in panel order.
    pub fn contaminated_markers(&self) -> Vec<&str> {
        self.calls
            .iter()
            .filter(|c| c.contamination.is_some())
            .map(|c| c.marker.as_str())
            .collect()
    }
}

/// Run both stages over one sample's raw rows.
///
/// Markers absent from the rows or yielding an empty primary set are
/// omitted from the calls.
pub fn analyze_sample(
    sample_id: String,
    rows: &[RawPeakRecord],
    config: &AnalysisConfig,
) -> SampleAnalysis {
    let calls = call_peaks(rows, config)
        .into_iter()
        .map(|(marker, peaks)| {
            let contamination = classify_contamination(&peaks);
            MarkerCall {
                marker,
                peaks,
                contamination,
            }
        })
        .collect();

    SampleAnalysis { sample_id, calls }
}

/// Analyze every sample in a batch, in parallel, preserving the order in
/// which samples first appear in the input.
pub fn analyze_batch(records: Vec<RawPeakRecord>, config: &AnalysisConfig) -> Vec<SampleAnalysis> {
    group_by_sample(records)
        .into_par_iter()
        .map(|(sample_id, rows)| analyze_sample(sample_id, &rows, config))
        .collect()
}
