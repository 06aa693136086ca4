//! Deterministic 2-D k-means for peak clustering.
//!
//! Fixed-iteration Lloyd's algorithm over `(height, size)` feature vectors.
//! Initialization is a seeded pick of the first centroid followed by greedy
//! farthest-point selection, so repeated runs on the same input always
//! produce the same partition. Ties in assignment and selection resolve to
//! the lowest index.

/// Iteration cap for Lloyd's algorithm; small peak sets converge in a
/// handful of passes.
const MAX_ITER: usize = 100;

/// Result of one k-means fit.
#[derive(Debug, Clone, PartialEq)]
pub struct KMeansFit {
    /// Cluster label per input point.
    pub labels: Vec<usize>,
    pub centroids: Vec<[f64; 2]>,
    /// Total within-cluster sum of squared distances.
    pub inertia: f64,
}

/// Standardize each dimension to zero mean and unit variance.
///
/// A zero-variance dimension is left centered only, so constant features do
/// not produce NaNs.
pub fn standardize(points: &[[f64; 2]]) -> Vec<[f64; 2]> {
    let n = points.len();
    if n == 0 {
        return Vec::new();
    }

    let mut scaled = vec![[0.0; 2]; n];
    for dim in 0..2 {
        let mean = points.iter().map(|p| p[dim]).sum::<f64>() / n as f64;
        let variance = points
            .iter()
            .map(|p| {
                let d = p[dim] - mean;
                d * d
            })
            .sum::<f64>()
            / n as f64;
        let std_dev = variance.sqrt();
        let scale = if std_dev > 0.0 { std_dev } else { 1.0 };
        for (i, p) in points.iter().enumerate() {
            scaled[i][dim] = (p[dim] - mean) / scale;
        }
    }
    scaled
}

fn squared_distance(a: &[f64; 2], b: &[f64; 2]) -> f64 {
    let dx = a[0] - b[0];
    let dy = a[1] - b[1];
    dx * dx + dy * dy
}

/// Linear congruential step (glibc constants); enough randomness for a
/// reproducible initial pick.
fn lcg_next(state: &mut u64) -> u64 {
    *state = state.wrapping_mul(1_103_515_245).wrapping_add(12_345);
    (*state >> 16) & 0x7FFF
}

/// Choose `k` initial centroids: one seeded pick, then greedy
/// farthest-point selection.
fn init_centroids(points: &[[f64; 2]], k: usize, seed: u64) -> Vec<[f64; 2]> {
    let mut state = seed;
    let first = (lcg_next(&mut state) as usize) % points.len();
    let mut chosen = vec![first];

    while chosen.len() < k {
        let mut best_idx = 0;
        let mut best_dist = -1.0;
        for (idx, point) in points.iter().enumerate() {
            if chosen.contains(&idx) {
                continue;
            }
            let nearest = chosen
                .iter()
                .map(|&c| squared_distance(point, &points[c]))
                .fold(f64::INFINITY, f64::min);
            if nearest > best_dist {
                best_dist = nearest;
                best_idx = idx;
            }
        }
        chosen.push(best_idx);
    }

    chosen.into_iter().map(|i| points[i]).collect()
}

/// Fit k-means over standardized points.
///
/// `k` must be in `1..=points.len()`; behavior is fully deterministic for a
/// given `seed`.
pub fn fit_kmeans(points: &[[f64; 2]], k: usize, seed: u64) -> KMeansFit {
    debug_assert!(k >= 1 && k <= points.len());

    let n = points.len();
    let mut centroids = init_centroids(points, k, seed);
    let mut labels = vec![0usize; n];

    for _ in 0..MAX_ITER {
        // Assignment: nearest centroid, lowest index on ties.
        let mut changed = false;
        for (i, point) in points.iter().enumerate() {
            let mut best = 0;
            let mut best_dist = squared_distance(point, &centroids[0]);
            for (c, centroid) in centroids.iter().enumerate().skip(1) {
                let dist = squared_distance(point, centroid);
                if dist < best_dist {
                    best_dist = dist;
                    best = c;
                }
            }
            if labels[i] != best {
                labels[i] = best;
                changed = true;
            }
        }

        // Repair empty clusters with the point farthest from its centroid,
        // never stealing from a singleton cluster.
        for empty in 0..k {
            if labels.iter().any(|&l| l == empty) {
                continue;
            }
            let mut counts = vec![0usize; k];
            for &l in &labels {
                counts[l] += 1;
            }
            let mut farthest: Option<(usize, f64)> = None;
            for (i, point) in points.iter().enumerate() {
                if counts[labels[i]] <= 1 {
                    continue;
                }
                let dist = squared_distance(point, &centroids[labels[i]]);
                if farthest.map_or(true, |(_, d)| dist > d) {
                    farthest = Some((i, dist));
                }
            }
            if let Some((i, _)) = farthest {
                labels[i] = empty;
                changed = true;
            }
        }

        // Update step.
        let mut sums = vec![[0.0f64; 2]; k];
        let mut counts = vec![0usize; k];
        for (i, point) in points.iter().enumerate() {
            sums[labels[i]][0] += point[0];
            sums[labels[i]][1] += point[1];
            counts[labels[i]] += 1;
        }
        for c in 0..k {
            if counts[c] > 0 {
                centroids[c] = [sums[c][0] / counts[c] as f64, sums[c][1] / counts[c] as f64];
            }
        }

        if !changed {
            break;
        }
    }

    let inertia = points
        .iter()
        .enumerate()
        .map(|(i, p)| squared_distance(p, &centroids[labels[i]]))
        .sum();

    KMeansFit {
        labels,
        centroids,
        inertia,
    }
}
