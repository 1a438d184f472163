use tracing::info;

use crate::TARGET_CLUSTER;

use super::error::ClusterError;
use super::types::{Linkage, ModuleAssignment};
use super::union_find::UnionFind;

/// Cut a merge tree at a dissimilarity threshold and label the modules.
///
/// Merges with dissimilarity at or below the threshold are applied;
/// everything above is cut. The boundary is inclusive (`<=`): a merge
/// sitting exactly at the threshold is kept. Labels 1..K are assigned
/// in order of the smallest leaf index in each surviving component, so
/// the numbering is canonical and repeat calls with the same inputs
/// return the identical assignment.
///
/// The threshold itself is unrestricted: +∞ keeps every merge (one
/// module), a value below the first merge keeps none (all singletons).
/// `CutConfig::validate` is the place where caller-facing thresholds
/// are restricted to finite values ≥ 0.
///
/// # Arguments
/// * `linkage` - Merge tree over N leaves
/// * `threshold` - Dissimilarity above which tree edges are removed
///
/// # Returns
/// * `Ok(ModuleAssignment)` - Positive module label per leaf
/// * `Err(ClusterError::MalformedTree)` - If the merge sequence is
///   inconsistent with the declared leaf count
pub fn cut_tree(linkage: &Linkage, threshold: f64) -> Result<ModuleAssignment, ClusterError> {
    validate_tree(linkage)?;

    let n = linkage.leaves;
    let mut uf = UnionFind::new(n);

    // members[id] holds the original leaves under cluster id. Child
    // entries are drained into the parent as merges are processed;
    // tree validation guarantees each id is consumed at most once.
    let mut members: Vec<Vec<usize>> = (0..n).map(|leaf| vec![leaf]).collect();

    for step in &linkage.steps {
        let mut merged = std::mem::take(&mut members[step.left]);
        merged.append(&mut std::mem::take(&mut members[step.right]));

        if step.dissimilarity <= threshold {
            let first = merged[0];
            for &leaf in &merged[1..] {
                uf.union(first, leaf);
            }
        }

        members.push(merged);
    }

    // Number modules 1..K by first appearance in leaf order, which is
    // exactly "smallest leaf index in each module".
    let mut label_of_root: Vec<Option<u32>> = vec![None; n];
    let mut labels = vec![0u32; n];
    let mut modules = 0u32;
    for leaf in 0..n {
        let root = uf.find(leaf);
        let label = match label_of_root[root] {
            Some(label) => label,
            None => {
                modules += 1;
                label_of_root[root] = Some(modules);
                modules
            }
        };
        labels[leaf] = label;
    }

    info!(
        target: TARGET_CLUSTER,
        "Cut at {:.6}: {} leaves -> {} modules",
        threshold,
        n,
        modules
    );

    Ok(ModuleAssignment {
        labels,
        modules: modules as usize,
    })
}

/// Confirm the merge sequence encodes a single-root binary tree.
///
/// Checks that there are exactly N−1 steps, every child id refers to a
/// cluster created strictly earlier, and no id is merged twice. With
/// 2(N−1) child slots over the 2N−2 non-root ids, those two conditions
/// imply every id except the root appears as a child exactly once.
fn validate_tree(linkage: &Linkage) -> Result<(), ClusterError> {
    let n = linkage.leaves;
    let expected = n.saturating_sub(1);
    if linkage.steps.len() != expected {
        return Err(ClusterError::malformed_tree(
            linkage.steps.len(),
            format!(
                "{} leaves require exactly {} merges, got {}",
                n,
                expected,
                linkage.steps.len()
            ),
        ));
    }

    let mut used = vec![false; n + expected];
    for (idx, step) in linkage.steps.iter().enumerate() {
        let limit = n + idx;
        for child in [step.left, step.right] {
            if child >= limit {
                return Err(ClusterError::malformed_tree(
                    idx,
                    format!("child id {child} does not refer to an earlier cluster (limit {limit})"),
                ));
            }
            if used[child] {
                return Err(ClusterError::malformed_tree(
                    idx,
                    format!("cluster id {child} appears as a child more than once"),
                ));
            }
            used[child] = true;
        }
    }

    Ok(())
}
