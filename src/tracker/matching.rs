//! Maximum-weight assignment between detections (rows) and tracks (columns).

use ndarray::Array2;

use crate::error::{FusionError, Result};

/// How a pair returned by [`solve_assignment`] relates to the original matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairKind {
    /// Both the row and the column exist in the original matrix.
    Matched,
    /// The row is padding: the column received no row (more columns than rows).
    UnmatchedColumn,
    /// The column is padding: the row received no column (more rows than columns).
    UnmatchedRow,
}

/// One (row, column) pair of a square assignment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AssignedPair {
    pub row: usize,
    pub col: usize,
    /// Weight of the pair in the original matrix, 0 for padding pairs.
    pub weight: f64,
    pub kind: PairKind,
}

impl AssignedPair {
    /// Whether both indices fall inside the original matrix.
    pub fn is_matched(&self) -> bool {
        self.kind == PairKind::Matched
    }
}

#[derive(Debug, Clone)]
pub struct Assignment {
    /// Sum of the weights of all `Matched` pairs.
    pub total_weight: f64,
    /// Exactly `max(R, C)` pairs, one per row and one per column of the padded matrix.
    pub pairs: Vec<AssignedPair>,
}

impl Assignment {
    pub fn matched(&self) -> impl Iterator<Item = &AssignedPair> {
        self.pairs.iter().filter(|p| p.is_matched())
    }
}

/// Solve a maximum-weight perfect matching over an R×C weight matrix.
///
/// The matrix is padded to `max(R, C)` square with zero weights and handed to
/// LAPJV as a minimum-cost problem (`cost = max_weight - weight`). Padding
/// pairs are reported with an explicit [`PairKind`] instead of leaving callers
/// to compare indices against the original bounds.
pub fn solve_assignment(weights: &Array2<f64>) -> Result<Assignment> {
    let (num_rows, num_cols) = weights.dim();

    if num_rows == 0 || num_cols == 0 {
        return Err(FusionError::EmptyCostMatrix {
            rows: num_rows,
            cols: num_cols,
        });
    }

    if weights.iter().any(|w| !w.is_finite()) {
        return Err(FusionError::AssignmentFailed(
            "weight matrix contains non-finite values".to_string(),
        ));
    }

    let max_weight = weights.iter().copied().fold(0.0_f64, f64::max);

    let size = num_rows.max(num_cols);
    let mut padded = Array2::<f64>::from_elem((size, size), max_weight);

    for i in 0..num_rows {
        for j in 0..num_cols {
            padded[[i, j]] = max_weight - weights[[i, j]];
        }
    }

    let row_to_col = if size == 1 {
        vec![0]
    } else {
        lapjv::lapjv(&padded)
            .map_err(|e| FusionError::AssignmentFailed(format!("{:?}", e)))?
            .0
    };

    let mut total_weight = 0.0;
    let mut pairs = Vec::with_capacity(size);

    for (row, &col) in row_to_col.iter().enumerate() {
        let kind = if row >= num_rows {
            PairKind::UnmatchedColumn
        } else if col >= num_cols {
            PairKind::UnmatchedRow
        } else {
            PairKind::Matched
        };

        let weight = match kind {
            PairKind::Matched => weights[[row, col]],
            _ => 0.0,
        };
        total_weight += weight;

        pairs.push(AssignedPair {
            row,
            col,
            weight,
            kind,
        });
    }

    Ok(Assignment {
        total_weight,
        pairs,
    })
}
