use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use tracing::info;

use crate::clustering::{DissimilarityMatrix, ModuleAssignment};
use crate::TARGET_LOADER;

/// Load a dissimilarity matrix from a CSV file.
///
/// Expected layout matches the upstream pipeline's export: a header row
/// with an empty first cell followed by the item identifiers, then one
/// row per item whose first cell repeats the identifier.
pub fn load_matrix(path: &Path) -> Result<DissimilarityMatrix> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read matrix from {}", path.display()))?;
    let matrix = parse_matrix(&text)
        .with_context(|| format!("failed to parse matrix from {}", path.display()))?;
    info!(
        target: TARGET_LOADER,
        "Loaded matrix with {} items from {}",
        matrix.len(),
        path.display()
    );
    Ok(matrix)
}

/// Parse a dissimilarity matrix from CSV text.
pub fn parse_matrix(text: &str) -> Result<DissimilarityMatrix> {
    let mut lines = text.lines().enumerate();
    let (_, header) = match lines.next() {
        Some(line) => line,
        None => bail!("empty input, expected a header row"),
    };

    // Header: empty corner cell, then one column per item.
    let labels: Vec<String> = header
        .split(',')
        .skip(1)
        .map(|cell| cell.trim().to_string())
        .collect();
    if labels.is_empty() {
        bail!("header row declares no items");
    }

    let n = labels.len();
    let mut values = Vec::with_capacity(n * n);
    let mut rows = 0usize;

    for (line_no, line) in lines {
        if line.trim().is_empty() {
            continue;
        }
        let mut cells = line.split(',');
        let row_label = cells.next().unwrap_or_default().trim();
        if rows >= n {
            bail!("line {}: more rows than header columns ({n})", line_no + 1);
        }
        if row_label != labels[rows] {
            bail!(
                "line {}: row label '{}' does not match header label '{}'",
                line_no + 1,
                row_label,
                labels[rows]
            );
        }

        let mut row_values = 0usize;
        for cell in cells {
            let value: f64 = cell.trim().parse().with_context(|| {
                format!("line {}: unparsable value '{}'", line_no + 1, cell.trim())
            })?;
            values.push(value);
            row_values += 1;
        }
        if row_values != n {
            bail!(
                "line {}: expected {} values, got {}",
                line_no + 1,
                n,
                row_values
            );
        }
        rows += 1;
    }

    if rows != n {
        bail!("expected {n} rows, got {rows}");
    }

    DissimilarityMatrix::new(labels, values).map_err(Into::into)
}

/// Write module assignments as a CSV sorted by module label.
///
/// Columns are `item,module`; within a module, items keep their
/// original order, matching the upstream pipeline's sorted export.
pub fn write_modules(path: &Path, items: &[String], assignment: &ModuleAssignment) -> Result<()> {
    let rendered = render_modules(items, assignment);
    fs::write(path, rendered)
        .with_context(|| format!("failed to write modules to {}", path.display()))?;
    info!(
        target: TARGET_LOADER,
        "Saved {} items in {} modules to {}",
        items.len(),
        assignment.modules,
        path.display()
    );
    Ok(())
}

fn render_modules(items: &[String], assignment: &ModuleAssignment) -> String {
    let mut order: Vec<usize> = (0..items.len()).collect();
    order.sort_by_key(|&leaf| assignment.labels[leaf]);

    let mut out = String::from("item,module\n");
    for leaf in order {
        out.push_str(&items[leaf]);
        out.push(',');
        out.push_str(&assignment.labels[leaf].to_string());
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const SMALL_MATRIX: &str = "\
,geneA,geneB,geneC
geneA,0.0,0.2,0.8
geneB,0.2,0.0,0.8
geneC,0.8,0.8,0.0
";

    #[test]
    fn test_parse_small_matrix() {
        let matrix = parse_matrix(SMALL_MATRIX).expect("parse");
        assert_eq!(matrix.len(), 3);
        assert_eq!(matrix.labels()[0], "geneA");
        assert_eq!(matrix.get(0, 2), 0.8);
        assert_eq!(matrix.get(2, 2), 0.0);
    }

    #[test]
    fn test_parse_rejects_ragged_row() {
        let text = ",a,b\na,0.0,0.1\nb,0.1\n";
        assert!(parse_matrix(text).is_err());
    }

    #[test]
    fn test_parse_rejects_non_numeric_value() {
        let text = ",a,b\na,0.0,oops\nb,0.1,0.0\n";
        assert!(parse_matrix(text).is_err());
    }

    #[test]
    fn test_parse_rejects_label_mismatch() {
        let text = ",a,b\nb,0.0,0.1\na,0.1,0.0\n";
        assert!(parse_matrix(text).is_err());
    }

    #[test]
    fn test_parse_rejects_missing_rows() {
        let text = ",a,b\na,0.0,0.1\n";
        assert!(parse_matrix(text).is_err());
    }

    #[test]
    fn test_parse_surfaces_matrix_validation() {
        // Asymmetric beyond tolerance must fail, never symmetrize.
        let text = ",a,b\na,0.0,0.9\nb,0.1,0.0\n";
        assert!(parse_matrix(text).is_err());
    }

    #[test]
    fn test_render_modules_sorted_by_label() {
        let items = vec!["x".to_string(), "y".to_string(), "z".to_string()];
        let assignment = ModuleAssignment {
            labels: vec![2, 1, 2],
            modules: 2,
        };

        let rendered = render_modules(&items, &assignment);
        assert_eq!(rendered, "item,module\ny,1\nx,2\nz,2\n");
    }
}
