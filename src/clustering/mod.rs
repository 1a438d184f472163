// Module declarations
pub mod cut;
pub mod error;
pub mod linkage;
pub mod matrix;
pub mod types;
mod union_find;

// Re-export the engine surface at the module root
pub use cut::cut_tree;
pub use error::ClusterError;
pub use linkage::{build_linkage, MONOTONICITY_TOLERANCE};
pub use matrix::{DissimilarityMatrix, SYMMETRY_TOLERANCE};
pub use types::{CutConfig, Linkage, LinkageConfig, LinkageMethod, MergeStep, ModuleAssignment};

/// Default dissimilarity threshold for the tree cut.
pub const DEFAULT_CUT_THRESHOLD: f64 = 0.95;
