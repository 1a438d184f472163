use serde::{Deserialize, Serialize};

use super::error::ClusterError;

/// Relative tolerance before `d[i][j]` vs `d[j][i]` counts as asymmetric.
pub const SYMMETRY_TOLERANCE: f64 = 1e-6;

/// Dense symmetric matrix of pairwise dissimilarities between labeled items.
///
/// Larger values mean more different. Stored row-major with a zero diagonal.
/// Validation happens once at construction; after that the matrix is
/// read-only and the linkage builder works on its own copy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DissimilarityMatrix {
    labels: Vec<String>,
    values: Vec<f64>,
}

impl DissimilarityMatrix {
    /// Build a matrix from item labels and row-major values.
    ///
    /// # Arguments
    /// * `labels` - One identifier per item, in row/column order
    /// * `values` - Row-major N×N dissimilarities
    ///
    /// # Returns
    /// * `Err(ClusterError::ShapeMismatch)` - If `values.len() != labels.len()²`
    /// * `Err(ClusterError::InvalidMatrix)` - On a negative, non-finite or
    ///   asymmetric entry, or a nonzero diagonal. The input is never silently
    ///   symmetrized or clamped.
    pub fn new(labels: Vec<String>, values: Vec<f64>) -> Result<Self, ClusterError> {
        let n = labels.len();
        if values.len() != n * n {
            return Err(ClusterError::ShapeMismatch {
                labels: n,
                values: values.len(),
                expected: n * n,
            });
        }

        for row in 0..n {
            for col in 0..n {
                let value = values[row * n + col];
                if !value.is_finite() {
                    return Err(ClusterError::invalid_matrix(
                        row,
                        col,
                        format!("non-finite entry {value}"),
                    ));
                }
                if value < 0.0 {
                    return Err(ClusterError::invalid_matrix(
                        row,
                        col,
                        format!("negative entry {value}"),
                    ));
                }
            }
            let diagonal = values[row * n + row];
            if diagonal != 0.0 {
                return Err(ClusterError::invalid_matrix(
                    row,
                    row,
                    format!("nonzero diagonal entry {diagonal}"),
                ));
            }
        }

        // Only the upper triangle needs checking against its mirror.
        for row in 0..n {
            for col in (row + 1)..n {
                let upper = values[row * n + col];
                let lower = values[col * n + row];
                let scale = upper.abs().max(lower.abs()).max(1.0);
                if (upper - lower).abs() > SYMMETRY_TOLERANCE * scale {
                    return Err(ClusterError::invalid_matrix(
                        row,
                        col,
                        format!("asymmetric pair: d[{row}][{col}]={upper} but d[{col}][{row}]={lower}"),
                    ));
                }
            }
        }

        Ok(Self { labels, values })
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Item identifiers in index order.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Dissimilarity between items `i` and `j`.
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.values[i * self.labels.len() + j]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn label(s: &str) -> String {
        s.to_string()
    }

    #[test]
    fn test_accepts_valid_matrix() {
        let matrix = DissimilarityMatrix::new(
            vec![label("a"), label("b")],
            vec![0.0, 0.4, 0.4, 0.0],
        )
        .expect("valid matrix");

        assert_eq!(matrix.len(), 2);
        assert_eq!(matrix.get(0, 1), 0.4);
        assert_eq!(matrix.get(1, 0), 0.4);
    }

    #[test]
    fn test_accepts_asymmetry_within_tolerance() {
        // Rounding noise well below the relative tolerance must pass.
        let matrix = DissimilarityMatrix::new(
            vec![label("a"), label("b")],
            vec![0.0, 0.5, 0.5 + 1e-9, 0.0],
        );
        assert!(matrix.is_ok());
    }

    #[test]
    fn test_rejects_asymmetry_beyond_tolerance() {
        let result = DissimilarityMatrix::new(
            vec![label("a"), label("b"), label("c")],
            vec![
                0.0, 0.2, 0.3, //
                0.9, 0.0, 0.4, //
                0.3, 0.4, 0.0,
            ],
        );

        match result {
            Err(ClusterError::InvalidMatrix { row, col, .. }) => {
                assert_eq!((row, col), (0, 1));
            }
            other => panic!("expected InvalidMatrix, got {other:?}"),
        }
    }

    #[test]
    fn test_rejects_negative_entry() {
        let result = DissimilarityMatrix::new(
            vec![label("a"), label("b")],
            vec![0.0, -0.1, -0.1, 0.0],
        );
        assert!(matches!(result, Err(ClusterError::InvalidMatrix { .. })));
    }

    #[test]
    fn test_rejects_non_finite_entry() {
        let result = DissimilarityMatrix::new(
            vec![label("a"), label("b")],
            vec![0.0, f64::NAN, f64::NAN, 0.0],
        );
        assert!(matches!(result, Err(ClusterError::InvalidMatrix { .. })));
    }

    #[test]
    fn test_rejects_nonzero_diagonal() {
        let result = DissimilarityMatrix::new(
            vec![label("a"), label("b")],
            vec![0.1, 0.4, 0.4, 0.0],
        );
        match result {
            Err(ClusterError::InvalidMatrix { row, col, .. }) => {
                assert_eq!((row, col), (0, 0));
            }
            other => panic!("expected InvalidMatrix, got {other:?}"),
        }
    }

    #[test]
    fn test_rejects_shape_mismatch() {
        let result = DissimilarityMatrix::new(vec![label("a"), label("b")], vec![0.0, 0.4, 0.4]);
        assert!(matches!(result, Err(ClusterError::ShapeMismatch { .. })));
    }
}
