use serde::{Deserialize, Serialize};

use super::error::ClusterError;
use super::DEFAULT_CUT_THRESHOLD;

/// Linkage strategy used when two clusters merge.
///
/// A tagged variant rather than a string so additional strategies
/// (single, complete) extend the enum instead of adding per-step
/// string comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LinkageMethod {
    /// Size-weighted mean of pairwise distances (UPGMA).
    #[default]
    Average,
}

/// A single agglomeration event in the merge tree.
///
/// `left` and `right` are cluster ids: 0..N−1 for original leaves,
/// N..2N−2 for earlier merges. Children always refer to clusters
/// created strictly earlier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MergeStep {
    pub left: usize,
    pub right: usize,
    /// Dissimilarity at which the two clusters merged.
    pub dissimilarity: f64,
    /// Number of original leaves in the merged cluster.
    pub size: usize,
}

/// The complete merge tree: N leaves plus N−1 ordered merge steps.
///
/// Immutable once built; cutting at different thresholds never
/// modifies the tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Linkage {
    /// Number of original items (leaves).
    pub leaves: usize,
    /// Merge events in the order they occurred.
    pub steps: Vec<MergeStep>,
    /// Indices of steps whose dissimilarity decreased beyond tolerance
    /// relative to the previous step. Empty on well-formed input; a
    /// non-empty list points at matrix corruption upstream.
    pub monotonicity_violations: Vec<usize>,
}

impl Linkage {
    /// Largest merge dissimilarity in the tree, or `None` for an empty tree.
    pub fn max_dissimilarity(&self) -> Option<f64> {
        self.steps
            .iter()
            .map(|step| step.dissimilarity)
            .fold(None, |max, d| Some(max.map_or(d, |m| f64::max(m, d))))
    }
}

/// Flat module labels produced by cutting a merge tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleAssignment {
    /// Module label per leaf index, always ≥ 1. Labels are numbered
    /// 1..K in order of the smallest leaf index in each module.
    pub labels: Vec<u32>,
    /// Number of distinct modules (K).
    pub modules: usize,
}

impl ModuleAssignment {
    /// Module label of a single leaf.
    pub fn module_of(&self, leaf: usize) -> u32 {
        self.labels[leaf]
    }
}

/// Configuration for the linkage builder.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct LinkageConfig {
    pub method: LinkageMethod,
}

/// Configuration for the tree cut.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CutConfig {
    /// Merges at or below this dissimilarity are kept; everything
    /// above is cut.
    pub threshold: f64,
}

impl Default for CutConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_CUT_THRESHOLD,
        }
    }
}

impl CutConfig {
    /// Validate the externally supplied threshold.
    ///
    /// Dissimilarities are non-negative, so a caller-facing threshold
    /// must be finite and ≥ 0.
    pub fn validate(&self) -> Result<(), ClusterError> {
        if !self.threshold.is_finite() || self.threshold < 0.0 {
            return Err(ClusterError::invalid_parameter(format!(
                "cut threshold must be finite and >= 0, got {}",
                self.threshold
            )));
        }
        Ok(())
    }
}
