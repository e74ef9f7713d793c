//! Dictionary-of-keys sparse matrix used as the assembly target.
//!
//! Entries live in a `row -> (col -> value)` map. Explicit zeros are never
//! stored: writing `0.0` removes the entry, and a row whose last entry is
//! removed disappears from the outer map.
//!
//! Reads are lenient (out-of-bounds reads return `0.0`), writes are strict
//! (out-of-bounds writes fail with [`FvmError::OutOfBounds`]).

use hashbrown::HashMap;

use super::csr::CsrMatrix;
use crate::mesh_error::FvmError;

/// Sparse matrix in dictionary-of-keys format.
#[derive(Clone, Debug, PartialEq)]
pub struct DokMatrix {
    entries: HashMap<usize, HashMap<usize, f64>>,
    rows: usize,
    cols: usize,
}

impl DokMatrix {
    /// Create an empty `rows x cols` matrix. Both dimensions must be positive.
    pub fn new(rows: usize, cols: usize) -> Result<Self, FvmError> {
        if rows == 0 || cols == 0 {
            return Err(FvmError::InvalidDimension { rows, cols });
        }
        Ok(Self {
            entries: HashMap::new(),
            rows,
            cols,
        })
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    fn check_bounds(&self, i: usize, j: usize) -> Result<(), FvmError> {
        if i >= self.rows || j >= self.cols {
            return Err(FvmError::OutOfBounds {
                row: i,
                col: j,
                rows: self.rows,
                cols: self.cols,
            });
        }
        Ok(())
    }

    /// Store `value` at `(i, j)`; `0.0` removes any existing entry.
    pub fn set(&mut self, i: usize, j: usize, value: f64) -> Result<(), FvmError> {
        self.check_bounds(i, j)?;
        if value != 0.0 {
            self.entries.entry(i).or_default().insert(j, value);
        } else if let Some(row) = self.entries.get_mut(&i) {
            row.remove(&j);
            if row.is_empty() {
                self.entries.remove(&i);
            }
        }
        Ok(())
    }

    /// Value at `(i, j)`; `0.0` for absent or out-of-bounds entries.
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.entries
            .get(&i)
            .and_then(|row| row.get(&j))
            .copied()
            .unwrap_or(0.0)
    }

    /// Add `delta` to the entry at `(i, j)`.
    pub fn add(&mut self, i: usize, j: usize, delta: f64) -> Result<(), FvmError> {
        let current = self.get(i, j);
        self.set(i, j, current + delta)
    }

    /// Replace row `row` by the identity row: every column zeroed, then the
    /// diagonal set to `1.0`.
    pub fn set_unit_row(&mut self, row: usize) -> Result<(), FvmError> {
        self.check_bounds(row, row)?;
        self.entries.remove(&row);
        self.set(row, row, 1.0)
    }

    /// Number of stored (nonzero) entries.
    pub fn nnz(&self) -> usize {
        self.entries.values().map(HashMap::len).sum()
    }

    /// Stored entries of row `i`, sorted by column.
    pub fn row_entries(&self, i: usize) -> Vec<(usize, f64)> {
        let mut row: Vec<(usize, f64)> = self
            .entries
            .get(&i)
            .map(|r| r.iter().map(|(&j, &v)| (j, v)).collect())
            .unwrap_or_default();
        row.sort_unstable_by_key(|&(j, _)| j);
        row
    }

    /// All stored entries as `(row, col, value)` in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        let mut rows: Vec<usize> = self.entries.keys().copied().collect();
        rows.sort_unstable();
        rows.into_iter()
            .flat_map(move |i| self.row_entries(i).into_iter().map(move |(j, v)| (i, j, v)))
    }

    /// Convert to compressed sparse row format.
    ///
    /// Rows are visited in ascending order and each row's columns are sorted,
    /// so the output satisfies every [`CsrMatrix`] invariant.
    pub fn to_csr(&self) -> CsrMatrix {
        let nnz = self.nnz();
        let mut values = Vec::with_capacity(nnz);
        let mut col_indices = Vec::with_capacity(nnz);
        let mut row_offsets = Vec::with_capacity(self.rows + 1);
        row_offsets.push(0);
        for i in 0..self.rows {
            for (j, v) in self.row_entries(i) {
                col_indices.push(j);
                values.push(v);
            }
            row_offsets.push(values.len());
        }
        CsrMatrix::from_parts_unchecked(self.rows, self.cols, row_offsets, col_indices, values)
    }

    /// Rebuild a DOK matrix from compressed form by `set`-ing every entry.
    pub fn from_csr(csr: &CsrMatrix) -> Result<Self, FvmError> {
        let mut dok = DokMatrix::new(csr.rows(), csr.cols())?;
        for i in 0..csr.rows() {
            for (j, v) in csr.row(i) {
                dok.set(i, j, v)?;
            }
        }
        Ok(dok)
    }
}
