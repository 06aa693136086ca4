//! Contamination detection over a marker's primary peaks.
//!
//! A single-contributor locus carries at most two alleles. When a marker
//! has three or more primary peaks, this module partitions them into a
//! dominant main-profile cluster and a minor contamination cluster, and
//! reports the split only when the clusters' mean-height ratio falls inside
//! the acceptance band.

mod kmeans;

pub use kmeans::{fit_kmeans, standardize, KMeansFit};

use crate::data::{round2, Peak, PrimaryPeakSet};
use serde::{Deserialize, Serialize};

/// Acceptance band for the contamination ratio, inclusive on both ends.
pub const MIN_RELATIVE_DISTANCE: f64 = 0.1;
pub const MAX_RELATIVE_DISTANCE: f64 = 0.8;

/// A consecutive height drop must exceed this fraction of the tallest peak
/// to qualify as a cluster boundary on the three-peak path.
pub const HEIGHT_DROP_FRACTION: f64 = 0.3;

/// Seed for the clustering path; fixed so classification is reproducible.
const KMEANS_SEED: u64 = 42;

/// Peak sets of this length use the height-drop heuristic instead of
/// clustering.
const SMALL_SET_LEN: usize = 3;

/// A marker flagged as carrying signal from more than one contributor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContaminationResult {
    pub is_contaminated: bool,
    /// The dominant contributor's peaks, descending height (normally 2).
    pub main_profile_peaks: Vec<Peak>,
    /// The minor contributor's peaks, descending height.
    pub contamination_peaks: Vec<Peak>,
    /// Mean contamination height over mean main height, rounded to 2
    /// decimals; always within `[0.1, 0.8]`.
    pub relative_distance: f64,
}

/// Decide whether a marker's primary peaks indicate more than one
/// contributor.
///
/// Returns `None` ("not contaminated") for sets of two or fewer peaks, when
/// no qualifying split exists, or when the split's mean-height ratio falls
/// outside the acceptance band. Pure function: identical input always
/// produces identical output.
pub fn classify_contamination(set: &PrimaryPeakSet) -> Option<ContaminationResult> {
    if set.len() <= 2 {
        return None;
    }

    // Re-derive order and relative heights rather than trusting the input.
    let mut peaks: Vec<Peak> = set.peaks().to_vec();
    peaks.sort_by(|a, b| b.height.total_cmp(&a.height));
    let max_height = peaks[0].height;
    for peak in &mut peaks {
        peak.relative_height = round2(peak.height / max_height * 100.0);
    }

    let (main, contamination) = if peaks.len() == SMALL_SET_LEN {
        split_by_height_drop(&peaks)?
    } else {
        split_by_clustering(&peaks)?
    };

    let relative_distance = round2(mean_height(&contamination) / mean_height(&main));
    if !(MIN_RELATIVE_DISTANCE..=MAX_RELATIVE_DISTANCE).contains(&relative_distance) {
        return None;
    }

    Some(ContaminationResult {
        is_contaminated: true,
        main_profile_peaks: main,
        contamination_peaks: contamination,
        relative_distance,
    })
}

fn mean_height(peaks: &[Peak]) -> f64 {
    peaks.iter().map(|p| p.height).sum::<f64>() / peaks.len() as f64
}

/// Three-peak path: split at the first consecutive height drop exceeding
/// 30% of the tallest peak.
fn split_by_height_drop(peaks: &[Peak]) -> Option<(Vec<Peak>, Vec<Peak>)> {
    let threshold = HEIGHT_DROP_FRACTION * peaks[0].height;
    let boundary = (1..peaks.len())
        .find(|&i| peaks[i - 1].height - peaks[i].height > threshold)?;
    Some((peaks[..boundary].to_vec(), peaks[boundary..].to_vec()))
}

/// Clustering path for four or more peaks.
///
/// Standardized `(height, size)` features are partitioned by deterministic
/// k-means for k = 2 and k = 3. The first candidate count is scored by raw
/// inertia, each later one by its inertia relative to the previous count's;
/// the smaller score wins, preferring k = 2 on ties. The two clusters with
/// the highest mean heights become the main and contamination candidates.
fn split_by_clustering(peaks: &[Peak]) -> Option<(Vec<Peak>, Vec<Peak>)> {
    let points: Vec<[f64; 2]> = peaks.iter().map(|p| [p.height, p.size]).collect();
    let scaled = standardize(&points);

    let fit2 = fit_kmeans(&scaled, 2, KMEANS_SEED);
    let fit3 = fit_kmeans(&scaled, 3.min(scaled.len()), KMEANS_SEED);

    let score2 = fit2.inertia;
    let fit = if fit2.inertia > f64::EPSILON {
        let score3 = fit3.inertia / fit2.inertia;
        if score3 < score2 {
            &fit3
        } else {
            &fit2
        }
    } else {
        // A perfect two-way partition cannot be improved upon.
        &fit2
    };

    let n_clusters = fit.centroids.len();
    let mut clusters: Vec<Vec<Peak>> = vec![Vec::new(); n_clusters];
    for (peak, &label) in peaks.iter().zip(&fit.labels) {
        clusters[label].push(peak.clone());
    }
    clusters.retain(|c| !c.is_empty());
    if clusters.len() < 2 {
        return None;
    }

    clusters.sort_by(|a, b| mean_height(b).total_cmp(&mean_height(a)));
    let mut main = clusters[0].clone();
    let mut contamination = clusters[1].clone();
    main.sort_by(|a, b| b.height.total_cmp(&a.height));
    contamination.sort_by(|a, b| b.height.total_cmp(&a.height));
    Some((main, contamination))
}
