use thiserror::Error;

/// Errors surfaced by the clustering engine.
///
/// Every variant carries enough detail (indices and values) to debug a
/// malformed input without re-running under a debugger.
#[derive(Debug, Error)]
pub enum ClusterError {
    /// The dissimilarity matrix violates one of its invariants:
    /// asymmetry beyond tolerance, a negative or non-finite entry,
    /// or a nonzero diagonal.
    #[error("invalid dissimilarity matrix at ({row}, {col}): {reason}")]
    InvalidMatrix {
        row: usize,
        col: usize,
        reason: String,
    },

    /// The matrix storage does not match the declared item count.
    #[error("matrix shape mismatch: {labels} labels but {values} values (expected {expected})")]
    ShapeMismatch {
        labels: usize,
        values: usize,
        expected: usize,
    },

    /// Fewer than two items; clustering is undefined.
    #[error("clustering requires at least 2 items, got {items}")]
    DegenerateInput { items: usize },

    /// A merge sequence inconsistent with its declared leaf count.
    #[error("malformed merge tree at step {step}: {reason}")]
    MalformedTree { step: usize, reason: String },

    /// A configuration value outside its documented range.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

impl ClusterError {
    pub fn invalid_matrix(row: usize, col: usize, reason: impl Into<String>) -> Self {
        ClusterError::InvalidMatrix {
            row,
            col,
            reason: reason.into(),
        }
    }

    pub fn malformed_tree(step: usize, reason: impl Into<String>) -> Self {
        ClusterError::MalformedTree {
            step,
            reason: reason.into(),
        }
    }

    pub fn invalid_parameter(reason: impl Into<String>) -> Self {
        ClusterError::InvalidParameter(reason.into())
    }
}
