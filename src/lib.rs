#![cfg_attr(docsrs, feature(doc_cfg))]
//! # mesh-fvm
//!
//! mesh-fvm assembles and solves a cell-centered finite-volume (two-point
//! flux) discretization of `-Δu = f` on unstructured 2D polygon meshes, and
//! writes the per-cell solution back next to the mesh.
//!
//! ## Pipeline
//! - [`io`] reads a legacy VTK mesh (or [`mesh_generation`] builds one) into a
//!   [`mesh::RawMesh`].
//! - [`mesh::PolyMesh`] validates the cells, extracts face topology
//!   ([`topology`]) and lazily computes centroids and areas ([`geometry`]).
//! - [`assembly`] turns faces, boundary data and the source term into a
//!   [`sparse::DokMatrix`] and right-hand side, pinned at cell 0.
//! - The matrix is compressed to [`sparse::CsrMatrix`] and handed to a
//!   [`solver::LinearSolver`].
//! - [`driver::FvmDriver`] sequences these steps and rejects out-of-order use.
//!
//! ## Features
//! - `rayon`: compute interior face coefficients in parallel.
//!
//! ## Logging
//! The crate logs through the `log` facade and installs no logger.
//!
//! ```toml
//! [dependencies]
//! mesh-fvm = "0.1"
//! # features = ["rayon"]
//! ```

pub mod assembly;
pub mod driver;
pub mod geometry;
pub mod io;
pub mod mesh;
pub mod mesh_error;
pub mod mesh_generation;
pub mod solver;
pub mod sparse;
pub mod topology;

/// A convenient prelude to import the most-used traits & types:
pub mod prelude {
    pub use crate::assembly::{
        BoundaryType, CsrSystem, FnProblem, LinearSystem, ProblemData, RobinData,
        assemble_system,
    };
    pub use crate::driver::{FvmDriver, PipelineState, RunConfig, run};
    pub use crate::geometry::{Point, PolygonMetrics, polygon_metrics};
    pub use crate::io::{
        CellFieldStore, ResultWriter, VtkReader, VtkResultWriter, VtkWriter, read_vtk_file,
    };
    pub use crate::mesh::{CellGeometry, PolyMesh, RawMesh};
    pub use crate::mesh_error::{ErrorKind, FvmError};
    pub use crate::solver::{BiCgStab, LinearSolver, SolverConfig, SolverError};
    pub use crate::sparse::{CsrMatrix, DokMatrix};
    pub use crate::topology::{CellPair, Edge, EdgeKey, FacePair, FaceTopology};
}
