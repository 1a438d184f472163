use tracing::{debug, info, warn};

use crate::TARGET_CLUSTER;

use super::error::ClusterError;
use super::matrix::DissimilarityMatrix;
use super::types::{Linkage, LinkageConfig, LinkageMethod, MergeStep};

/// Tolerance before a decrease between successive merge dissimilarities
/// counts as a monotonicity violation. Average linkage over a valid
/// matrix is non-decreasing; anything beyond this is corrupted input.
pub const MONOTONICITY_TOLERANCE: f64 = 1e-9;

/// Build the agglomerative merge tree for a dissimilarity matrix.
///
/// Runs the naive O(N³) agglomeration: repeatedly merge the pair of
/// active clusters with the minimum working dissimilarity, then update
/// distances from the new cluster to every remaining one using the
/// configured linkage rule. Ties break on the lowest (i, j) id pair so
/// results are reproducible across runs and platforms.
///
/// The input matrix is never modified; all work happens on a private
/// copy, so a cancelled or failed run leaves nothing behind and the
/// builder can simply be invoked again.
///
/// # Arguments
/// * `matrix` - Validated N×N dissimilarity matrix
/// * `config` - Linkage strategy (average is the only supported method)
///
/// # Returns
/// * `Ok(Linkage)` - Exactly N−1 merge steps in merge order
/// * `Err(ClusterError::DegenerateInput)` - If the matrix has fewer than 2 items
pub fn build_linkage(
    matrix: &DissimilarityMatrix,
    config: LinkageConfig,
) -> Result<Linkage, ClusterError> {
    let n = matrix.len();
    if n < 2 {
        return Err(ClusterError::DegenerateInput { items: n });
    }

    info!(
        target: TARGET_CLUSTER,
        "Building {:?}-linkage tree for {} items",
        config.method,
        n
    );

    // Working distances over all 2N−1 cluster ids; the top-left N×N
    // block starts as a copy of the input, merge rows are filled in as
    // clusters are created.
    let total = 2 * n - 1;
    let mut dist = vec![0.0f64; total * total];
    for i in 0..n {
        for j in 0..n {
            dist[i * total + j] = matrix.get(i, j);
        }
    }

    let mut size = vec![0usize; total];
    size[..n].fill(1);

    // Kept sorted ascending; new merge ids are always the largest so a
    // push preserves the order, and the lexicographic pair scan below
    // lands on the lowest (i, j) pair among ties.
    let mut active: Vec<usize> = (0..n).collect();

    let mut steps = Vec::with_capacity(n - 1);
    let mut monotonicity_violations = Vec::new();
    let mut previous = f64::NEG_INFINITY;

    for step in 0..n - 1 {
        let mut best = f64::INFINITY;
        let mut best_pair = (active[0], active[1]);
        for (ai, &a) in active.iter().enumerate() {
            for &b in &active[ai + 1..] {
                let d = dist[a * total + b];
                if d < best {
                    best = d;
                    best_pair = (a, b);
                }
            }
        }
        let (left, right) = best_pair;

        if best < previous - MONOTONICITY_TOLERANCE {
            warn!(
                target: TARGET_CLUSTER,
                "Non-monotonic merge at step {}: dissimilarity {} after {}; continuing with observed value",
                step,
                best,
                previous
            );
            monotonicity_violations.push(step);
        }
        previous = best;

        let merged = n + step;
        size[merged] = size[left] + size[right];
        debug!(
            target: TARGET_CLUSTER,
            "Merge {}: ({}, {}) at {:.6}, size {}",
            merged,
            left,
            right,
            best,
            size[merged]
        );

        active.retain(|&id| id != left && id != right);
        for &other in &active {
            let d = updated_distance(
                config.method,
                size[left],
                size[right],
                dist[left * total + other],
                dist[right * total + other],
            );
            dist[merged * total + other] = d;
            dist[other * total + merged] = d;
        }
        active.push(merged);

        steps.push(MergeStep {
            left,
            right,
            dissimilarity: best,
            size: size[merged],
        });
    }

    info!(
        target: TARGET_CLUSTER,
        "Merge tree complete: {} merges, final dissimilarity {:.6}",
        steps.len(),
        previous
    );

    Ok(Linkage {
        leaves: n,
        steps,
        monotonicity_violations,
    })
}

/// Lance–Williams update: distance from the cluster merged out of `i`
/// and `j` to another active cluster `m`.
fn updated_distance(
    method: LinkageMethod,
    size_i: usize,
    size_j: usize,
    d_im: f64,
    d_jm: f64,
) -> f64 {
    match method {
        LinkageMethod::Average => {
            (size_i as f64 * d_im + size_j as f64 * d_jm) / (size_i + size_j) as f64
        }
    }
}
