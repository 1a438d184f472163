use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use hclust::clustering::{build_linkage, cut_tree, CutConfig, LinkageConfig};
use hclust::loader;

/// Group items into modules by cutting an average-linkage merge tree.
///
/// Reads a precomputed dissimilarity matrix (first column holds the
/// item identifiers), builds the merge tree, cuts it at the requested
/// threshold and writes the sorted item/module table.
#[derive(Parser)]
#[clap(name = "detect_modules", about = "Detect modules in a dissimilarity matrix")]
struct Cli {
    /// Path to the dissimilarity matrix CSV
    #[clap(default_value = "dissimilarity_matrix.csv")]
    matrix: PathBuf,

    /// Dissimilarity threshold for the tree cut
    #[clap(short, long, default_value = "0.95")]
    threshold: f64,

    /// Output CSV path for the module assignments
    #[clap(short, long, default_value = "modules.csv")]
    output: PathBuf,
}

fn main() -> Result<()> {
    hclust::logging::configure_logging();

    let args = Cli::parse();
    let cut = CutConfig {
        threshold: args.threshold,
    };
    cut.validate()?;

    let matrix = loader::load_matrix(&args.matrix)?;

    info!("Running hierarchical clustering on {} items...", matrix.len());
    let linkage = build_linkage(&matrix, LinkageConfig::default())?;
    if let Some(max) = linkage.max_dissimilarity() {
        info!(
            "Merge tree complete: {} merges, dissimilarity range up to {:.4}",
            linkage.steps.len(),
            max
        );
    }
    if !linkage.monotonicity_violations.is_empty() {
        info!(
            "Observed {} non-monotonic merges; check the input matrix for corruption",
            linkage.monotonicity_violations.len()
        );
    }

    let assignment = cut_tree(&linkage, cut.threshold)?;
    info!(
        "Clustering done! Identified {} modules at threshold {}",
        assignment.modules, cut.threshold
    );

    loader::write_modules(&args.output, matrix.labels(), &assignment)?;
    info!("Results saved to {}", args.output.display());

    Ok(())
}
