//! Polygonal mesh container.
//!
//! A [`PolyMesh`] owns its points and cells, the face topology derived from
//! them, and (lazily) the per-cell centroids and areas. The mesh is immutable
//! once built, so the derived data never needs invalidation.

use once_cell::sync::OnceCell;

use crate::geometry::{Point, polygon_metrics};
use crate::mesh_error::FvmError;
use crate::topology::{FaceTopology, build_faces, validate_cells};

/// Points and cell loops as delivered by a mesh reader or generator.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RawMesh {
    pub points: Vec<Point>,
    pub cells: Vec<Vec<usize>>,
}

/// Cell centroids and areas, indexed by cell id.
#[derive(Clone, Debug, PartialEq)]
pub struct CellGeometry {
    pub centers: Vec<Point>,
    /// Unsigned cell areas.
    pub volumes: Vec<f64>,
}

impl CellGeometry {
    /// Total mesh area.
    pub fn total_volume(&self) -> f64 {
        self.volumes.iter().sum()
    }
}

/// Immutable 2D polygonal mesh with face topology.
#[derive(Debug)]
pub struct PolyMesh {
    points: Vec<Point>,
    cells: Vec<Vec<usize>>,
    faces: FaceTopology,
    geometry: OnceCell<CellGeometry>,
}

impl PolyMesh {
    /// Validate the cells and build the face topology.
    ///
    /// Fails on cells with fewer than three vertices, out-of-range point
    /// indices, and edges shared by more than two cells.
    pub fn new(points: Vec<Point>, cells: Vec<Vec<usize>>) -> Result<Self, FvmError> {
        validate_cells(&cells, points.len())?;
        let faces = build_faces(&cells)?;
        Ok(Self {
            points,
            cells,
            faces,
            geometry: OnceCell::new(),
        })
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn cells(&self) -> &[Vec<usize>] {
        &self.cells
    }

    pub fn num_points(&self) -> usize {
        self.points.len()
    }

    pub fn num_cells(&self) -> usize {
        self.cells.len()
    }

    pub fn faces(&self) -> &FaceTopology {
        &self.faces
    }

    /// Coordinates of a cell's vertex loop.
    pub fn cell_vertices(&self, cell: usize) -> Option<Vec<Point>> {
        self.cells
            .get(cell)
            .map(|loop_ids| loop_ids.iter().map(|&p| self.points[p]).collect())
    }

    /// Cell centroids and areas, computed on first access.
    pub fn geometry(&self) -> Result<&CellGeometry, FvmError> {
        self.geometry
            .get_or_try_init(|| compute_cell_geometry(&self.points, &self.cells))
    }
}

impl TryFrom<RawMesh> for PolyMesh {
    type Error = FvmError;

    fn try_from(raw: RawMesh) -> Result<Self, Self::Error> {
        PolyMesh::new(raw.points, raw.cells)
    }
}

/// Compute the centroid and unsigned area of every cell.
///
/// A zero-area cell aborts with [`FvmError::ZeroAreaCell`]. Clockwise cells
/// are accepted (their centroid is unaffected) and reported once via `log`.
pub fn compute_cell_geometry(
    points: &[Point],
    cells: &[Vec<usize>],
) -> Result<CellGeometry, FvmError> {
    let mut centers = Vec::with_capacity(cells.len());
    let mut volumes = Vec::with_capacity(cells.len());
    let mut clockwise = 0usize;
    let mut vertices: Vec<Point> = Vec::new();
    for (cell, loop_ids) in cells.iter().enumerate() {
        vertices.clear();
        for &p in loop_ids {
            let point = points.get(p).ok_or(FvmError::PointIndexOutOfRange {
                cell,
                point: p,
                num_points: points.len(),
            })?;
            vertices.push(*point);
        }
        let metrics = polygon_metrics(&vertices).map_err(|_| FvmError::ZeroAreaCell {
            cell,
            area: signed_area_hint(&vertices),
        })?;
        if metrics.is_clockwise() {
            clockwise += 1;
        }
        centers.push(metrics.centroid);
        volumes.push(metrics.area());
    }
    if clockwise > 0 {
        log::warn!("{clockwise} of {} cells are wound clockwise", cells.len());
    }
    Ok(CellGeometry { centers, volumes })
}

// Shoelace area for error reporting; zero for loops too short to have one.
fn signed_area_hint(vertices: &[Point]) -> f64 {
    if vertices.len() < 3 {
        return 0.0;
    }
    let n = vertices.len();
    (0..n)
        .map(|i| {
            let (a, b) = (vertices[i], vertices[(i + 1) % n]);
            a[0] * b[1] - a[1] * b[0]
        })
        .sum::<f64>()
        / 2.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_squares() -> PolyMesh {
        let points = vec![
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [2.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [1.0, 1.0, 0.0],
            [2.0, 1.0, 0.0],
        ];
        PolyMesh::new(points, vec![vec![0, 1, 4, 3], vec![1, 2, 5, 4]]).unwrap()
    }

    #[test]
    fn geometry_is_lazy_and_cached() {
        let mesh = two_squares();
        assert!(mesh.geometry.get().is_none());
        let geom = mesh.geometry().unwrap();
        assert!((geom.centers[0][0] - 0.5).abs() < 1e-12);
        assert!((geom.centers[0][1] - 0.5).abs() < 1e-12);
        assert!((geom.centers[1][0] - 1.5).abs() < 1e-12);
        assert!((geom.centers[1][1] - 0.5).abs() < 1e-12);
        assert_eq!(geom.volumes, vec![1.0, 1.0]);
        assert!(std::ptr::eq(geom, mesh.geometry().unwrap()));
        assert_eq!(geom.total_volume(), 2.0);
    }

    #[test]
    fn faces_are_built_on_construction() {
        let mesh = two_squares();
        assert_eq!(mesh.faces().interior().len(), 1);
        assert_eq!(mesh.faces().boundary().len(), 6);
        assert_eq!(mesh.cell_vertices(1).unwrap()[1], [2.0, 0.0, 0.0]);
        assert!(mesh.cell_vertices(2).is_none());
    }

    #[test]
    fn zero_area_cell_is_reported_with_its_id() {
        let points = vec![
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [1.0, 1.0, 0.0],
            [2.0, 2.0, 0.0],
        ];
        let mesh = PolyMesh::new(points, vec![vec![0, 1, 2], vec![0, 2, 3]]).unwrap();
        let err = mesh.geometry().unwrap_err();
        assert!(matches!(err, FvmError::ZeroAreaCell { cell: 1, .. }));
    }

    #[test]
    fn invalid_cells_fail_construction() {
        let points = vec![[0.0; 3]; 3];
        assert!(matches!(
            PolyMesh::new(points.clone(), vec![vec![0, 1]]),
            Err(FvmError::DegenerateCell { cell: 0, .. })
        ));
        assert!(matches!(
            PolyMesh::try_from(RawMesh {
                points,
                cells: vec![vec![0, 1, 3]],
            }),
            Err(FvmError::PointIndexOutOfRange { point: 3, .. })
        ));
    }
}
