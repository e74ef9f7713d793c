//! Top-level module for mesh topology.
//!
//! This module turns a list of polygonal cells into oriented face records:
//! - [`faces`]: edge extraction, interior/boundary classification and cell adjacency
//! - [`cell_type`]: VTK cell type metadata for 2D polygonal cells
//!
//! Most users will call [`build_faces`] (directly or through
//! [`crate::mesh::PolyMesh::new`]) and consume the resulting [`FaceTopology`].

pub mod cell_type;
pub mod faces;

pub use cell_type::CellType;
pub use faces::{
    CellAdjacency, CellPair, Edge, EdgeKey, FacePair, FaceTopology, build_faces, validate_cells,
};
