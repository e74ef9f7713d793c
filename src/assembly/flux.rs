//! Two-point flux assembly of `-Δu = f` into a DOK matrix and right-hand side.

#[cfg(feature = "rayon")]
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::problem::{BoundaryType, ProblemData};
use crate::geometry::{
    EPS, Point, edge_length, edge_midpoint, edge_normal, edge_tolerance, normal_distance,
};
use crate::mesh::{CellGeometry, PolyMesh};
use crate::mesh_error::FvmError;
use crate::sparse::{CsrMatrix, DokMatrix};
use crate::topology::FacePair;

/// Assembled linear system `A u = b`.
#[derive(Clone, Debug, PartialEq)]
pub struct LinearSystem {
    pub matrix: DokMatrix,
    pub rhs: Vec<f64>,
}

impl LinearSystem {
    /// Convert the matrix to CSR, consuming the assembly form.
    pub fn compress(self) -> CsrSystem {
        CsrSystem {
            matrix: self.matrix.to_csr(),
            rhs: self.rhs,
        }
    }
}

/// Solver-facing system with the matrix in CSR form.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CsrSystem {
    pub matrix: CsrMatrix,
    pub rhs: Vec<f64>,
}

/// Flux coefficient `g / h` of one interior face.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FaceCoefficient {
    pub left: usize,
    pub right: usize,
    pub value: f64,
}

/// Coefficient of an interior face: edge length over the distance between
/// the two cell centers measured along the face normal.
pub fn interior_coefficient(
    points: &[Point],
    centers: &[Point],
    face: &FacePair,
) -> Result<FaceCoefficient, FvmError> {
    let edge = face.edge.to_array();
    let left = face.cells.left;
    let right = face.cells.right.ok_or_else(|| {
        FvmError::InvalidState(format!("edge {edge:?} has no right cell"))
    })?;
    let (pi, pj) = (points[face.edge.a], points[face.edge.b]);
    let normal = edge_normal(pi, pj)?;
    let g = edge_length(pi, pj);
    let h = normal_distance(centers[left], centers[right], normal);
    if h <= EPS * g {
        return Err(FvmError::ZeroFluxDistance { edge, left, right });
    }
    Ok(FaceCoefficient {
        left,
        right,
        value: g / h,
    })
}

/// Coefficients of every interior face, in face order.
#[cfg(not(feature = "rayon"))]
pub fn interior_coefficients(
    mesh: &PolyMesh,
    geometry: &CellGeometry,
) -> Result<Vec<FaceCoefficient>, FvmError> {
    mesh.faces()
        .interior()
        .iter()
        .map(|face| interior_coefficient(mesh.points(), &geometry.centers, face))
        .collect()
}

/// Coefficients of every interior face, in face order, computed in parallel.
#[cfg(feature = "rayon")]
pub fn interior_coefficients(
    mesh: &PolyMesh,
    geometry: &CellGeometry,
) -> Result<Vec<FaceCoefficient>, FvmError> {
    mesh.faces()
        .interior()
        .par_iter()
        .map(|face| interior_coefficient(mesh.points(), &geometry.centers, face))
        .collect()
}

/// Assemble the pinned system for `mesh` under `boundary`.
///
/// Interior fluxes, boundary contributions and the area-weighted source are
/// accumulated first; row 0 is then replaced by the identity row with
/// `b[0] = problem.reference_value(center_0)`.
pub fn assemble_system<P>(
    mesh: &PolyMesh,
    problem: &P,
    boundary: BoundaryType,
) -> Result<LinearSystem, FvmError>
where
    P: ProblemData + ?Sized,
{
    let mut system = assemble_unpinned(mesh, problem, boundary)?;
    pin_reference(&mut system, mesh, problem)?;
    log::debug!(
        "assembled {n}x{n} system: {} interior faces, {} boundary faces ({boundary:?}), nnz={}",
        mesh.faces().interior().len(),
        mesh.faces().boundary().len(),
        system.matrix.nnz(),
        n = mesh.num_cells(),
    );
    Ok(system)
}

/// Flux, boundary and source contributions without the reference pin.
///
/// Under [`BoundaryType::Neumann`] the resulting matrix is singular (constant
/// null space) and symmetric.
pub fn assemble_unpinned<P>(
    mesh: &PolyMesh,
    problem: &P,
    boundary: BoundaryType,
) -> Result<LinearSystem, FvmError>
where
    P: ProblemData + ?Sized,
{
    let geometry = mesh.geometry()?;
    let n = mesh.num_cells();
    let mut matrix = DokMatrix::new(n, n)?;
    let mut rhs = vec![0.0; n];

    for FaceCoefficient { left, right, value } in interior_coefficients(mesh, geometry)? {
        matrix.add(left, left, value)?;
        matrix.add(right, right, value)?;
        matrix.add(left, right, -value)?;
        matrix.add(right, left, -value)?;
    }

    for face in mesh.faces().boundary() {
        apply_boundary_face(mesh, geometry, problem, boundary, face, &mut matrix, &mut rhs)?;
    }

    for (cell, b) in rhs.iter_mut().enumerate() {
        *b += problem.source(&geometry.centers[cell]) * geometry.volumes[cell];
    }
    Ok(LinearSystem { matrix, rhs })
}

/// Replace row 0 by the identity row and pin `b[0]` to the reference value
/// at the center of cell 0.
pub fn pin_reference<P>(
    system: &mut LinearSystem,
    mesh: &PolyMesh,
    problem: &P,
) -> Result<(), FvmError>
where
    P: ProblemData + ?Sized,
{
    let center = mesh
        .geometry()?
        .centers
        .first()
        .copied()
        .ok_or(FvmError::InvalidDimension { rows: 0, cols: 0 })?;
    system.matrix.set_unit_row(0)?;
    system.rhs[0] = problem.reference_value(&center);
    Ok(())
}

fn apply_boundary_face<P>(
    mesh: &PolyMesh,
    geometry: &CellGeometry,
    problem: &P,
    boundary: BoundaryType,
    face: &FacePair,
    matrix: &mut DokMatrix,
    rhs: &mut [f64],
) -> Result<(), FvmError>
where
    P: ProblemData + ?Sized,
{
    let cell = face.cells.left;
    let (pi, pj) = (mesh.points()[face.edge.a], mesh.points()[face.edge.b]);
    let g = edge_length(pi, pj);
    if g <= edge_tolerance(pi, pj) {
        return Ok(());
    }
    let mid = edge_midpoint(pi, pj);

    let (transmissibility, target) = match boundary {
        BoundaryType::Neumann => {
            rhs[cell] += g * problem.boundary_flux(&mid);
            return Ok(());
        }
        BoundaryType::Dirichlet => {
            let h = half_distance(geometry, face, pi, pj, mid)?;
            (g / h, problem.boundary_value(&mid))
        }
        BoundaryType::Robin => {
            let robin = problem.robin(&mid);
            if robin.coefficient <= 0.0 {
                return Ok(());
            }
            let h = half_distance(geometry, face, pi, pj, mid)?;
            (g / (h + 1.0 / robin.coefficient), robin.ambient)
        }
    };
    matrix.add(cell, cell, transmissibility)?;
    rhs[cell] += transmissibility * target;
    Ok(())
}

// Distance from the owning cell's center to the face midpoint along the normal.
fn half_distance(
    geometry: &CellGeometry,
    face: &FacePair,
    pi: Point,
    pj: Point,
    mid: Point,
) -> Result<f64, FvmError> {
    let cell = face.cells.left;
    let h = normal_distance(geometry.centers[cell], mid, edge_normal(pi, pj)?);
    if h <= EPS * edge_length(pi, pj) {
        return Err(FvmError::ZeroFluxDistance {
            edge: face.edge.to_array(),
            left: cell,
            right: cell,
        });
    }
    Ok(h)
}
