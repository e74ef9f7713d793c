//! Compressed sparse row (CSR) matrix: the solver-facing, read-only format.
//!
//! Row `r` spans `row_offsets[r]..row_offsets[r + 1]` in `col_indices` and
//! `values`, with columns strictly increasing. [`CsrMatrix::try_new`] (and
//! deserialization) check every invariant; matrices produced by
//! [`DokMatrix::to_csr`](super::DokMatrix::to_csr) satisfy them by
//! construction.

use serde::{Deserialize, Serialize};

use crate::mesh_error::FvmError;

/// Immutable CSR matrix.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "CsrParts")]
pub struct CsrMatrix {
    rows: usize,
    cols: usize,
    row_offsets: Vec<usize>,
    col_indices: Vec<usize>,
    values: Vec<f64>,
}

/// Unvalidated CSR arrays, as read from a serialized matrix.
#[derive(Deserialize)]
struct CsrParts {
    rows: usize,
    cols: usize,
    row_offsets: Vec<usize>,
    col_indices: Vec<usize>,
    values: Vec<f64>,
}

impl TryFrom<CsrParts> for CsrMatrix {
    type Error = FvmError;

    fn try_from(parts: CsrParts) -> Result<Self, Self::Error> {
        CsrMatrix::try_new(
            parts.rows,
            parts.cols,
            parts.row_offsets,
            parts.col_indices,
            parts.values,
        )
    }
}

fn invalid(message: impl Into<String>) -> FvmError {
    FvmError::InvalidCompressed(message.into())
}

impl CsrMatrix {
    /// Build a CSR matrix, validating dimensions, offsets and column order.
    pub fn try_new(
        rows: usize,
        cols: usize,
        row_offsets: Vec<usize>,
        col_indices: Vec<usize>,
        values: Vec<f64>,
    ) -> Result<Self, FvmError> {
        if rows == 0 || cols == 0 {
            return Err(FvmError::InvalidDimension { rows, cols });
        }
        if row_offsets.len() != rows + 1 {
            return Err(invalid(format!(
                "row_offsets has length {}, expected {}",
                row_offsets.len(),
                rows + 1
            )));
        }
        if col_indices.len() != values.len() {
            return Err(invalid(format!(
                "{} column indices for {} values",
                col_indices.len(),
                values.len()
            )));
        }
        if row_offsets[0] != 0 {
            return Err(invalid("row_offsets[0] must be 0"));
        }
        if row_offsets[rows] != values.len() {
            return Err(invalid(format!(
                "row_offsets[{rows}] = {} but nnz = {}",
                row_offsets[rows],
                values.len()
            )));
        }
        for r in 0..rows {
            let (start, end) = (row_offsets[r], row_offsets[r + 1]);
            if start > end {
                return Err(invalid(format!("row_offsets decrease at row {r}")));
            }
            if end > col_indices.len() {
                return Err(invalid(format!("row {r} extends past nnz")));
            }
            let row_cols = &col_indices[start..end];
            if let Some(&j) = row_cols.iter().find(|&&j| j >= cols) {
                return Err(invalid(format!("column {j} in row {r} exceeds {cols} columns")));
            }
            if row_cols.windows(2).any(|w| w[0] >= w[1]) {
                return Err(invalid(format!(
                    "columns of row {r} are not strictly increasing"
                )));
            }
        }
        Ok(Self::from_parts_unchecked(
            rows,
            cols,
            row_offsets,
            col_indices,
            values,
        ))
    }

    pub(crate) fn from_parts_unchecked(
        rows: usize,
        cols: usize,
        row_offsets: Vec<usize>,
        col_indices: Vec<usize>,
        values: Vec<f64>,
    ) -> Self {
        debug_assert_eq!(row_offsets.len(), rows + 1);
        debug_assert_eq!(col_indices.len(), values.len());
        Self {
            rows,
            cols,
            row_offsets,
            col_indices,
            values,
        }
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Number of stored entries.
    #[inline]
    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn row_offsets(&self) -> &[usize] {
        &self.row_offsets
    }

    #[inline]
    pub fn col_indices(&self) -> &[usize] {
        &self.col_indices
    }

    #[inline]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// `(column, value)` pairs of row `i`; empty for an out-of-range row.
    pub fn row(&self, i: usize) -> impl Iterator<Item = (usize, f64)> + '_ {
        let (start, end) = if i < self.rows {
            (self.row_offsets[i], self.row_offsets[i + 1])
        } else {
            (0, 0)
        };
        self.col_indices[start..end]
            .iter()
            .copied()
            .zip(self.values[start..end].iter().copied())
    }

    /// Value at `(i, j)`; `0.0` for absent or out-of-bounds entries.
    pub fn get(&self, i: usize, j: usize) -> f64 {
        if i >= self.rows {
            return 0.0;
        }
        let (start, end) = (self.row_offsets[i], self.row_offsets[i + 1]);
        match self.col_indices[start..end].binary_search(&j) {
            Ok(pos) => self.values[start + pos],
            Err(_) => 0.0,
        }
    }

    /// Main diagonal (length `min(rows, cols)`), zeros where absent.
    pub fn diagonal(&self) -> Vec<f64> {
        (0..self.rows.min(self.cols)).map(|i| self.get(i, i)).collect()
    }

    /// Sparse matrix-vector product `y = A x`.
    pub fn mul_vec(&self, x: &[f64], y: &mut [f64]) -> Result<(), FvmError> {
        if x.len() != self.cols || y.len() != self.rows {
            return Err(FvmError::Configuration(format!(
                "mul_vec: {}x{} matrix with x of length {} and y of length {}",
                self.rows,
                self.cols,
                x.len(),
                y.len()
            )));
        }
        for (i, yi) in y.iter_mut().enumerate() {
            *yi = self.row(i).map(|(j, v)| v * x[j]).sum();
        }
        Ok(())
    }

    /// `true` when `|A[i,j] - A[j,i]| <= tol` for every stored entry.
    pub fn is_symmetric(&self, tol: f64) -> bool {
        if self.rows != self.cols {
            return false;
        }
        (0..self.rows).all(|i| self.row(i).all(|(j, v)| (v - self.get(j, i)).abs() <= tol))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sparse::DokMatrix;

    fn sample() -> CsrMatrix {
        // [ 2 -1  0 ]
        // [-1  2 -1 ]
        // [ 0 -1  2 ]
        CsrMatrix::try_new(
            3,
            3,
            vec![0, 2, 5, 7],
            vec![0, 1, 0, 1, 2, 1, 2],
            vec![2.0, -1.0, -1.0, 2.0, -1.0, -1.0, 2.0],
        )
        .unwrap()
    }

    #[test]
    fn accessors_and_spmv() {
        let a = sample();
        assert_eq!(a.nnz(), 7);
        assert_eq!(a.get(1, 2), -1.0);
        assert_eq!(a.get(0, 2), 0.0);
        assert_eq!(a.get(5, 0), 0.0);
        assert_eq!(a.diagonal(), vec![2.0, 2.0, 2.0]);
        assert!(a.is_symmetric(0.0));
        let mut y = vec![0.0; 3];
        a.mul_vec(&[1.0, 2.0, 3.0], &mut y).unwrap();
        assert_eq!(y, vec![0.0, 0.0, 4.0]);
        assert!(a.mul_vec(&[1.0], &mut y).is_err());
    }

    #[test]
    fn invalid_arrays_are_rejected() {
        assert!(CsrMatrix::try_new(2, 2, vec![0, 1], vec![0], vec![1.0]).is_err());
        assert!(CsrMatrix::try_new(2, 2, vec![1, 1, 1], vec![0], vec![1.0]).is_err());
        assert!(CsrMatrix::try_new(2, 2, vec![0, 2, 1], vec![0, 1], vec![1.0, 1.0]).is_err());
        assert!(CsrMatrix::try_new(2, 2, vec![0, 1, 1], vec![2], vec![1.0]).is_err());
        assert!(CsrMatrix::try_new(1, 3, vec![0, 2], vec![1, 1], vec![1.0, 2.0]).is_err());
        let err = CsrMatrix::try_new(1, 3, vec![0, 2], vec![2, 1], vec![1.0, 2.0]).unwrap_err();
        assert_eq!(err.kind(), crate::mesh_error::ErrorKind::Ingestion);
        assert!(matches!(
            CsrMatrix::try_new(0, 3, vec![0], vec![], vec![]),
            Err(FvmError::InvalidDimension { .. })
        ));
    }

    #[test]
    fn compressed_round_trip_is_identity() {
        let a = sample();
        let back = DokMatrix::from_csr(&a).unwrap().to_csr();
        assert_eq!(back, a);
    }

    #[test]
    fn serde_validates_on_load() {
        let a = sample();
        let json = serde_json::to_string(&a).unwrap();
        let back: CsrMatrix = serde_json::from_str(&json).unwrap();
        assert_eq!(back, a);

        let broken = json.replace("\"row_offsets\":[0,2,5,7]", "\"row_offsets\":[0,2,5,6]");
        assert!(serde_json::from_str::<CsrMatrix>(&broken).is_err());
    }
}
