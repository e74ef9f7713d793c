//! Mesh ingestion and result output.
//!
//! Meshes are read from legacy ASCII VTK files into a [`RawMesh`]; computed
//! per-cell fields leave the pipeline through a [`ResultWriter`].

pub mod vtk;

use std::collections::BTreeMap;

use crate::mesh::PolyMesh;
use crate::mesh_error::FvmError;

pub use crate::mesh::RawMesh;
pub use vtk::{
    VtkAppendWriter, VtkData, VtkReader, VtkResultWriter, VtkWriter, append_cell_scalars,
    read_vtk_file,
};

/// Sink for named per-cell fields.
pub trait ResultWriter {
    /// Store `values` (one per cell of `mesh`) under `name`.
    fn write_cell_field(
        &mut self,
        mesh: &PolyMesh,
        name: &str,
        values: &[f64],
    ) -> Result<(), FvmError>;
}

/// In-memory [`ResultWriter`].
#[derive(Debug, Default, Clone, PartialEq)]
pub struct CellFieldStore {
    fields: BTreeMap<String, Vec<f64>>,
}

impl CellFieldStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&[f64]> {
        self.fields.get(name).map(Vec::as_slice)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn into_fields(self) -> BTreeMap<String, Vec<f64>> {
        self.fields
    }
}

impl ResultWriter for CellFieldStore {
    fn write_cell_field(
        &mut self,
        mesh: &PolyMesh,
        name: &str,
        values: &[f64],
    ) -> Result<(), FvmError> {
        if values.len() != mesh.num_cells() {
            return Err(FvmError::Configuration(format!(
                "field {name:?} has {} values for {} cells",
                values.len(),
                mesh.num_cells()
            )));
        }
        self.fields.insert(name.to_string(), values.to_vec());
        Ok(())
    }
}

impl<W: ResultWriter + ?Sized> ResultWriter for &mut W {
    fn write_cell_field(
        &mut self,
        mesh: &PolyMesh,
        name: &str,
        values: &[f64],
    ) -> Result<(), FvmError> {
        (**self).write_cell_field(mesh, name, values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_checks_length_and_keeps_fields() {
        let mesh = PolyMesh::new(
            vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            vec![vec![0, 1, 2]],
        )
        .unwrap();
        let mut store = CellFieldStore::new();
        store.write_cell_field(&mesh, "u", &[4.0]).unwrap();
        assert!(store.write_cell_field(&mesh, "v", &[1.0, 2.0]).is_err());
        assert_eq!(store.get("u"), Some(&[4.0][..]));
        assert_eq!(store.names().collect::<Vec<_>>(), vec!["u"]);
    }
}
