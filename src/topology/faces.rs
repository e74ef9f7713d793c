//! Face extraction from a polygon soup.
//!
//! Every cell is an ordered loop of point indices. Walking each loop yields
//! candidate edges; an edge seen by one cell is a boundary face, an edge seen
//! by two cells is an interior face, and an edge seen by three or more cells
//! makes the mesh non-manifold.
//!
//! Face records are emitted sorted by their canonical [`EdgeKey`], so the
//! face order (and therefore the matrix assembly order) is reproducible.

use hashbrown::HashMap;
use hashbrown::hash_map::Entry;
use itertools::Itertools;

use crate::mesh_error::FvmError;

/// Canonical (ascending) point-index pair identifying an edge regardless of
/// the direction in which a cell traverses it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeKey {
    pub lo: usize,
    pub hi: usize,
}

impl EdgeKey {
    /// Canonicalize an unordered pair.
    #[inline]
    pub fn new(a: usize, b: usize) -> Self {
        if a <= b {
            Self { lo: a, hi: b }
        } else {
            Self { lo: b, hi: a }
        }
    }

    #[inline]
    pub fn to_array(self) -> [usize; 2] {
        [self.lo, self.hi]
    }
}

/// Geometric face: the two endpoint indices of an edge, in the order the
/// first referencing cell traverses them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Edge {
    pub a: usize,
    pub b: usize,
}

impl Edge {
    #[inline]
    pub fn key(&self) -> EdgeKey {
        EdgeKey::new(self.a, self.b)
    }

    #[inline]
    pub fn to_array(self) -> [usize; 2] {
        [self.a, self.b]
    }
}

/// Topological face: the cells on either side of an edge. `right` is `None`
/// on the domain boundary.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CellPair {
    pub left: usize,
    pub right: Option<usize>,
}

impl CellPair {
    #[inline]
    pub fn is_boundary(&self) -> bool {
        self.right.is_none()
    }
}

/// Face pair record binding a geometric face to its topological face.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FacePair {
    pub edge: Edge,
    pub cells: CellPair,
}

impl FacePair {
    #[inline]
    pub fn key(&self) -> EdgeKey {
        self.edge.key()
    }
}

/// Interior and boundary face records of a mesh.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FaceTopology {
    interior: Vec<FacePair>,
    boundary: Vec<FacePair>,
    num_cells: usize,
}

impl FaceTopology {
    /// Faces shared by exactly two cells.
    pub fn interior(&self) -> &[FacePair] {
        &self.interior
    }

    /// Faces referenced by exactly one cell.
    pub fn boundary(&self) -> &[FacePair] {
        &self.boundary
    }

    /// Number of cells the faces were built from.
    pub fn num_cells(&self) -> usize {
        self.num_cells
    }

    /// Total number of faces.
    pub fn len(&self) -> usize {
        self.interior.len() + self.boundary.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of boundary faces touching each cell.
    pub fn boundary_face_counts(&self) -> Vec<usize> {
        let mut counts = vec![0usize; self.num_cells];
        for face in &self.boundary {
            counts[face.cells.left] += 1;
        }
        counts
    }

    /// Cell-to-cell adjacency through interior faces.
    pub fn cell_adjacency(&self) -> CellAdjacency {
        let mut adj: Vec<Vec<usize>> = vec![Vec::new(); self.num_cells];
        for face in &self.interior {
            if let Some(right) = face.cells.right {
                let left = face.cells.left;
                if left != right {
                    adj[left].push(right);
                    adj[right].push(left);
                }
            }
        }

        let mut xadj = Vec::with_capacity(self.num_cells + 1);
        let mut adjncy = Vec::with_capacity(2 * self.interior.len());
        xadj.push(0);
        for mut nbrs in adj {
            // two cells may share more than one edge
            nbrs.sort_unstable();
            nbrs.dedup();
            adjncy.extend(nbrs);
            xadj.push(adjncy.len());
        }
        CellAdjacency { xadj, adjncy }
    }
}

/// CSR adjacency graph over cells: `adjncy[xadj[i]..xadj[i+1]]` are the
/// neighbours of cell `i`, sorted ascending. Symmetric and self-free.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CellAdjacency {
    pub xadj: Vec<usize>,
    pub adjncy: Vec<usize>,
}

impl CellAdjacency {
    /// Neighbours of `cell`; empty for an unknown cell id.
    pub fn neighbors(&self, cell: usize) -> &[usize] {
        match (self.xadj.get(cell), self.xadj.get(cell + 1)) {
            (Some(&start), Some(&end)) => &self.adjncy[start..end],
            _ => &[],
        }
    }

    /// Number of cells in the graph.
    pub fn num_cells(&self) -> usize {
        self.xadj.len().saturating_sub(1)
    }
}

/// Reject cells with fewer than three vertices or out-of-range point indices.
pub fn validate_cells(cells: &[Vec<usize>], num_points: usize) -> Result<(), FvmError> {
    for (cell, vertices) in cells.iter().enumerate() {
        if vertices.len() < 3 {
            return Err(FvmError::DegenerateCell {
                cell,
                vertices: vertices.len(),
            });
        }
        if let Some(&point) = vertices.iter().find(|&&p| p >= num_points) {
            return Err(FvmError::PointIndexOutOfRange {
                cell,
                point,
                num_points,
            });
        }
    }
    Ok(())
}

// At most two cells may reference an edge; a third is reported immediately.
struct EdgeSlot {
    edge: Edge,
    cells: [usize; 2],
    count: u8,
}

/// Build the interior and boundary face records of a polygon mesh.
///
/// Interior records keep the two cells in encounter order (`left` is the cell
/// that first traversed the edge); boundary records have `right = None`.
pub fn build_faces(cells: &[Vec<usize>]) -> Result<FaceTopology, FvmError> {
    let mut slots: HashMap<EdgeKey, EdgeSlot> = HashMap::with_capacity(2 * cells.len());

    for (cell_id, vertices) in cells.iter().enumerate() {
        if vertices.len() < 3 {
            return Err(FvmError::DegenerateCell {
                cell: cell_id,
                vertices: vertices.len(),
            });
        }
        for (a, b) in vertices
            .iter()
            .copied()
            .circular_tuple_windows::<(usize, usize)>()
        {
            let edge = Edge { a, b };
            match slots.entry(edge.key()) {
                Entry::Vacant(vacant) => {
                    vacant.insert(EdgeSlot {
                        edge,
                        cells: [cell_id, cell_id],
                        count: 1,
                    });
                }
                Entry::Occupied(mut occupied) => {
                    let slot = occupied.get_mut();
                    if slot.count >= 2 {
                        return Err(FvmError::NonManifoldEdge {
                            edge: edge.key().to_array(),
                            cells: vec![slot.cells[0], slot.cells[1], cell_id],
                        });
                    }
                    slot.cells[1] = cell_id;
                    slot.count = 2;
                }
            }
        }
    }

    let mut ordered: Vec<(EdgeKey, EdgeSlot)> = slots.into_iter().collect();
    ordered.sort_unstable_by_key(|(key, _)| *key);

    let mut interior = Vec::new();
    let mut boundary = Vec::new();
    for (_, slot) in ordered {
        if slot.count == 2 {
            interior.push(FacePair {
                edge: slot.edge,
                cells: CellPair {
                    left: slot.cells[0],
                    right: Some(slot.cells[1]),
                },
            });
        } else {
            boundary.push(FacePair {
                edge: slot.edge,
                cells: CellPair {
                    left: slot.cells[0],
                    right: None,
                },
            });
        }
    }

    log::debug!(
        "built {} interior and {} boundary faces for {} cells",
        interior.len(),
        boundary.len(),
        cells.len()
    );

    Ok(FaceTopology {
        interior,
        boundary,
        num_cells: cells.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_squares() -> Vec<Vec<usize>> {
        // 3---4---5
        // | 0 | 1 |
        // 0---1---2
        vec![vec![0, 1, 4, 3], vec![1, 2, 5, 4]]
    }

    #[test]
    fn single_quad_is_all_boundary() {
        let faces = build_faces(&[vec![0, 1, 2, 3]]).unwrap();
        assert!(faces.interior().is_empty());
        assert_eq!(faces.boundary().len(), 4);
        assert!(faces.boundary().iter().all(|f| f.cells.is_boundary()));
        assert!(faces.boundary().iter().all(|f| f.cells.left == 0));
    }

    #[test]
    fn two_squares_share_one_face() {
        let faces = build_faces(&two_squares()).unwrap();
        assert_eq!(faces.interior().len(), 1);
        assert_eq!(faces.boundary().len(), 6);
        let shared = faces.interior()[0];
        assert_eq!(shared.key(), EdgeKey::new(1, 4));
        // cell 0 traverses 1 -> 4 first
        assert_eq!(shared.edge, Edge { a: 1, b: 4 });
        assert_eq!(
            shared.cells,
            CellPair {
                left: 0,
                right: Some(1)
            }
        );
    }

    #[test]
    fn faces_sorted_by_canonical_key() {
        let faces = build_faces(&two_squares()).unwrap();
        let keys: Vec<EdgeKey> = faces.boundary().iter().map(FacePair::key).collect();
        let mut sorted = keys.clone();
        sorted.sort();
        assert_eq!(keys, sorted);
    }

    #[test]
    fn edge_shared_by_three_cells_is_rejected() {
        let cells = vec![vec![0, 1, 2], vec![1, 0, 3], vec![0, 1, 4]];
        let err = build_faces(&cells).unwrap_err();
        match err {
            FvmError::NonManifoldEdge { edge, cells } => {
                assert_eq!(edge, [0, 1]);
                assert_eq!(cells, vec![0, 1, 2]);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn short_cell_is_rejected() {
        let err = build_faces(&[vec![0, 1]]).unwrap_err();
        assert!(matches!(
            err,
            FvmError::DegenerateCell {
                cell: 0,
                vertices: 2
            }
        ));
    }

    #[test]
    fn validate_catches_out_of_range_points() {
        assert!(validate_cells(&two_squares(), 6).is_ok());
        let err = validate_cells(&two_squares(), 5).unwrap_err();
        assert!(matches!(
            err,
            FvmError::PointIndexOutOfRange {
                cell: 1,
                point: 5,
                num_points: 5
            }
        ));
    }

    #[test]
    fn adjacency_and_boundary_counts() {
        let faces = build_faces(&two_squares()).unwrap();
        let adj = faces.cell_adjacency();
        assert_eq!(adj.xadj, vec![0, 1, 2]);
        assert_eq!(adj.neighbors(0), &[1]);
        assert_eq!(adj.neighbors(1), &[0]);
        assert!(adj.neighbors(7).is_empty());
        assert_eq!(faces.boundary_face_counts(), vec![3, 3]);
    }
}
