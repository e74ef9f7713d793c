//! Cell type metadata for mesh cells.

/// Cell types that can appear in a legacy VTK unstructured grid.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum CellType {
    /// 0D vertex (VTK 1).
    Vertex,
    /// 1D segment/edge (VTK 3).
    Segment,
    /// 1D poly-line (VTK 4).
    PolyLine,
    /// 2D simplex (VTK 5).
    Triangle,
    /// 2D polygon with an arbitrary vertex count (VTK 7).
    Polygon,
    /// 2D quad (VTK 9).
    Quadrilateral,
    /// Any other VTK type, carrying the raw identifier.
    Other(i32),
}

impl Default for CellType {
    fn default() -> Self {
        CellType::Polygon
    }
}

impl CellType {
    /// Map a legacy VTK cell type identifier.
    pub fn from_vtk(id: i32) -> Self {
        match id {
            1 => CellType::Vertex,
            3 => CellType::Segment,
            4 => CellType::PolyLine,
            5 => CellType::Triangle,
            7 => CellType::Polygon,
            9 => CellType::Quadrilateral,
            other => CellType::Other(other),
        }
    }

    /// Legacy VTK cell type identifier.
    pub fn vtk_id(self) -> i32 {
        match self {
            CellType::Vertex => 1,
            CellType::Segment => 3,
            CellType::PolyLine => 4,
            CellType::Triangle => 5,
            CellType::Polygon => 7,
            CellType::Quadrilateral => 9,
            CellType::Other(id) => id,
        }
    }

    /// Most specific 2D type for a polygon with `n` vertices.
    pub fn for_polygon(n: usize) -> Self {
        match n {
            3 => CellType::Triangle,
            4 => CellType::Quadrilateral,
            _ => CellType::Polygon,
        }
    }

    /// Returns the topological dimension of the cell, when known.
    pub fn dimension(self) -> Option<u8> {
        match self {
            CellType::Vertex => Some(0),
            CellType::Segment | CellType::PolyLine => Some(1),
            CellType::Triangle | CellType::Polygon | CellType::Quadrilateral => Some(2),
            CellType::Other(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vtk_ids_round_trip() {
        for id in [1, 3, 4, 5, 7, 9, 10, 12] {
            assert_eq!(CellType::from_vtk(id).vtk_id(), id);
        }
        assert_eq!(CellType::from_vtk(10).dimension(), None);
        assert_eq!(CellType::for_polygon(4), CellType::Quadrilateral);
        assert_eq!(CellType::for_polygon(6).dimension(), Some(2));
    }
}
