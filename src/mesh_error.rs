//! FvmError: Unified error type for mesh-fvm public APIs
//!
//! Every fallible operation in the crate (ingestion, topology, geometry,
//! matrix access, assembly, solve and result writing) reports through
//! [`FvmError`]. Variants carry the offending identifiers (cell ids, edge
//! keys, matrix indices) so a failed run can be diagnosed from the error alone.

use crate::solver::SolverError;
use thiserror::Error;

/// Coarse classification of [`FvmError`] variants.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Non-positive matrix size.
    InvalidDimension,
    /// Matrix write outside the declared extent.
    OutOfBounds,
    /// Edge shared by more than two cells, or a cell with fewer than 3 vertices.
    Topology,
    /// Zero-area polygon, zero-length edge or zero flux distance.
    DegenerateGeometry,
    /// Invalid boundary-type selector or pipeline misuse.
    Configuration,
    /// Malformed mesh source or I/O failure.
    Ingestion,
    /// External solve failed or did not converge.
    Solver,
}

/// Unified error type for mesh-fvm operations.
#[derive(Debug, Error)]
pub enum FvmError {
    /// Matrix constructed with a zero dimension.
    #[error("invalid matrix dimensions: rows={rows}, cols={cols}")]
    InvalidDimension { rows: usize, cols: usize },
    /// Matrix write outside `[0, rows) x [0, cols)`.
    #[error("index ({row}, {col}) out of bounds for {rows}x{cols} matrix")]
    OutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },
    /// Compressed arrays violate the CSR invariants.
    #[error("invalid compressed matrix: {0}")]
    InvalidCompressed(String),
    /// A cell has fewer than three vertices.
    #[error("Topology error: cell {cell} has {vertices} vertices (at least 3 required)")]
    DegenerateCell { cell: usize, vertices: usize },
    /// An edge is referenced by more than two cells.
    #[error("Topology error: edge {edge:?} is shared by cells {cells:?}")]
    NonManifoldEdge { edge: [usize; 2], cells: Vec<usize> },
    /// Polygon with (numerically) zero signed area.
    #[error("degenerate geometry: {0}")]
    InvalidGeometry(String),
    /// Cell whose polygon has zero area.
    #[error("degenerate geometry: cell {cell} has zero area ({area:e})")]
    ZeroAreaCell { cell: usize, area: f64 },
    /// Interior face whose cell centers coincide along the face normal.
    #[error("degenerate geometry: zero flux distance across edge {edge:?} between cells {left} and {right}")]
    ZeroFluxDistance {
        edge: [usize; 2],
        left: usize,
        right: usize,
    },
    /// Boundary-type selector outside {1, 2, 3}.
    #[error("invalid boundary type {0} (expected 1, 2 or 3)")]
    InvalidBoundaryType(i64),
    /// Pipeline operation invoked in the wrong state.
    #[error("invalid pipeline state: {0}")]
    InvalidState(String),
    /// Mismatched input lengths or other configuration problems.
    #[error("configuration error: {0}")]
    Configuration(String),
    /// A cell references a point outside the point list.
    #[error("cell {cell} references point {point}, but the mesh has {num_points} points")]
    PointIndexOutOfRange {
        cell: usize,
        point: usize,
        num_points: usize,
    },
    /// Malformed mesh file.
    #[error("mesh parse error: {0}")]
    MeshIoParse(String),
    /// I/O failure while reading or writing a mesh.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Linear solver failure.
    #[error(transparent)]
    Solver(#[from] SolverError),
}

impl FvmError {
    /// Classify the error into one of the pipeline error kinds.
    pub fn kind(&self) -> ErrorKind {
        match self {
            FvmError::InvalidDimension { .. } => ErrorKind::InvalidDimension,
            FvmError::OutOfBounds { .. } => ErrorKind::OutOfBounds,
            FvmError::DegenerateCell { .. } | FvmError::NonManifoldEdge { .. } => {
                ErrorKind::Topology
            }
            FvmError::InvalidGeometry(_)
            | FvmError::ZeroAreaCell { .. }
            | FvmError::ZeroFluxDistance { .. } => ErrorKind::DegenerateGeometry,
            FvmError::InvalidBoundaryType(_)
            | FvmError::InvalidState(_)
            | FvmError::Configuration(_) => ErrorKind::Configuration,
            FvmError::PointIndexOutOfRange { .. }
            | FvmError::MeshIoParse(_)
            | FvmError::InvalidCompressed(_)
            | FvmError::Io(_) => ErrorKind::Ingestion,
            FvmError::Solver(_) => ErrorKind::Solver,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_group_variants() {
        let err = FvmError::NonManifoldEdge {
            edge: [1, 2],
            cells: vec![0, 3, 7],
        };
        assert_eq!(err.kind(), ErrorKind::Topology);
        assert!(err.to_string().contains("[0, 3, 7]"));

        let err = FvmError::InvalidBoundaryType(4);
        assert_eq!(err.kind(), ErrorKind::Configuration);

        let err: FvmError = SolverError::DimensionMismatch { rows: 2, rhs: 3 }.into();
        assert_eq!(err.kind(), ErrorKind::Solver);

        let err: FvmError = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert_eq!(err.kind(), ErrorKind::Ingestion);

        let err = FvmError::InvalidCompressed("row offsets decrease".into());
        assert_eq!(err.kind(), ErrorKind::Ingestion);
    }
}
