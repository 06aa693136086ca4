//! Primary peak selection.
//!
//! From the raw peaks of one marker, picks the peaks that represent real
//! allele calls rather than noise or artifact: a dye-specific minimum
//! cutoff, a maximum cutoff (skipped for negative controls and single
//! survivors), and a relative-height floor against the tallest survivor.

use crate::config::{AnalysisConfig, Dye, DyeCutoffs};
use crate::data::{round2, Peak, PrimaryPeakSet, RawPeakRecord, OFF_LADDER};

/// Minimum percentage of the tallest peak a call must reach to survive.
pub const RELATIVE_HEIGHT_FLOOR: f64 = 10.0;

/// Substring of a sample identifier marking a negative control.
pub const NEGATIVE_CONTROL_TAG: &str = "NEG";

/// Select the primary peaks for one marker of one sample.
///
/// `rows` must already be restricted to a single (sample, marker) pair; all
/// rows of a marker share one dye channel, read from the first row. Missing
/// or malformed data never errors: any no-signal condition yields the empty
/// set.
///
/// Negative control samples (identifier containing `"NEG"`) skip the
/// maximum cutoff, since any signal at all in a negative control is
/// informative. A single peak surviving the minimum cutoff is kept
/// unconditionally.
pub fn select_primary_peaks(rows: &[&RawPeakRecord], cutoffs: &DyeCutoffs) -> PrimaryPeakSet {
    let first = match rows.first() {
        Some(first) => first,
        None => return PrimaryPeakSet::empty(),
    };
    let dye_code = first.dye.trim_start_matches('"');
    if dye_code.is_empty() {
        return PrimaryPeakSet::empty();
    }
    let bounds = cutoffs.bounds(Dye::from_code(dye_code));
    let is_neg_control = first.sample_id.contains(NEGATIVE_CONTROL_TAG);

    // Off-ladder rows and rows with unparseable numeric fields are excluded.
    let mut survivors: Vec<(&str, f64, f64)> = rows
        .iter()
        .filter(|r| r.allele != OFF_LADDER)
        .filter_map(|r| Some((r.allele.as_str(), r.height?, r.size?)))
        .filter(|&(_, height, _)| height >= bounds.min)
        .collect();

    if survivors.is_empty() {
        return PrimaryPeakSet::empty();
    }

    survivors.sort_by(|a, b| b.1.total_cmp(&a.1));

    // A lone survivor is kept regardless of the maximum cutoff; negative
    // controls skip the maximum cutoff entirely.
    if survivors.len() > 1 && !is_neg_control {
        survivors.retain(|&(_, height, _)| height <= bounds.max);
        if survivors.is_empty() {
            return PrimaryPeakSet::empty();
        }
    }

    let max_height = survivors[0].1;
    let peaks: Vec<Peak> = survivors
        .into_iter()
        .map(|(allele, height, size)| Peak {
            allele: allele.to_string(),
            height,
            size,
            relative_height: round2(height / max_height * 100.0),
        })
        .filter(|p| p.relative_height >= RELATIVE_HEIGHT_FLOOR)
        .collect();

    PrimaryPeakSet::new(dye_code.to_string(), peaks)
}

/// Select primary peaks for every marker of one sample, in panel order.
///
/// Markers absent from the rows, or whose selection comes back empty, are
/// omitted rather than reported.
pub fn call_peaks(
    sample_rows: &[RawPeakRecord],
    config: &AnalysisConfig,
) -> Vec<(String, PrimaryPeakSet)> {
    config
        .marker_order
        .iter()
        .filter_map(|marker| {
            let rows = crate::data::rows_for_marker(sample_rows, marker);
            if rows.is_empty() {
                return None;
            }
            let set = select_primary_peaks(&rows, &config.dye_cutoffs);
            if set.is_empty() {
                None
            } else {
                Some((marker.clone(), set))
            }
        })
        .collect()
}
