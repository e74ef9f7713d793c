//! Legacy VTK (`.vtk`) reader/writer for 2D unstructured grids.
//!
//! Only ASCII files with an `UNSTRUCTURED_GRID` dataset are supported.
//! Triangles, quads and general polygons become mesh cells; vertex and
//! line cells (boundary annotations left by mesh generators) are skipped;
//! volumetric cells are rejected.

use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::io::{BufReader, BufWriter, Read, Write};
use std::iter::Peekable;
use std::path::{Path, PathBuf};

use super::ResultWriter;
use crate::geometry::Point;
use crate::mesh::{PolyMesh, RawMesh};
use crate::mesh_error::FvmError;
use crate::topology::CellType;

#[derive(Debug, Default, Clone)]
pub struct VtkReader;

#[derive(Debug, Default, Clone)]
pub struct VtkWriter;

/// Mesh plus the `CELL_DATA` scalar arrays found in a VTK file.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct VtkData {
    pub mesh: RawMesh,
    /// Scalar arrays over the kept (2D) cells, keyed by name.
    pub cell_scalars: BTreeMap<String, Vec<f64>>,
    /// Number of cells listed in the file, skipped ones included.
    pub file_cells: usize,
    /// Position in the file's cell list of each kept cell.
    pub source_cells: Vec<usize>,
}

fn parse_error(message: impl Into<String>) -> FvmError {
    FvmError::MeshIoParse(message.into())
}

fn next_token<I>(tokens: &mut I, what: &str) -> Result<String, FvmError>
where
    I: Iterator<Item = String>,
{
    tokens
        .next()
        .ok_or_else(|| parse_error(format!("missing {what}")))
}

fn next_parsed<T, I>(tokens: &mut I, what: &str) -> Result<T, FvmError>
where
    T: std::str::FromStr,
    I: Iterator<Item = String>,
{
    let token = next_token(tokens, what)?;
    token
        .parse()
        .map_err(|_| parse_error(format!("invalid {what} {token:?}")))
}

fn expect_keyword<I>(tokens: &mut I, keyword: &str) -> Result<(), FvmError>
where
    I: Iterator<Item = String>,
{
    let token = next_token(tokens, keyword)?;
    if token != keyword {
        return Err(parse_error(format!("expected {keyword}, found {token:?}")));
    }
    Ok(())
}

impl VtkReader {
    /// Parse points and 2D cells.
    pub fn read<R: Read>(&self, reader: R) -> Result<RawMesh, FvmError> {
        Ok(self.read_with_fields(reader)?.mesh)
    }

    /// Parse points, 2D cells and any `CELL_DATA` scalar arrays.
    pub fn read_with_fields<R: Read>(&self, mut reader: R) -> Result<VtkData, FvmError> {
        let mut input = String::new();
        reader.read_to_string(&mut input)?;
        let mut lines = input.lines();
        let _version = lines.next();
        let _title = lines.next();
        let format = lines.next().ok_or_else(|| parse_error("missing ASCII line"))?;
        if format.trim() != "ASCII" {
            return Err(parse_error("VTK ASCII format required"));
        }
        let dataset = lines.next().ok_or_else(|| parse_error("missing DATASET line"))?;
        if !dataset.trim().ends_with("UNSTRUCTURED_GRID") {
            return Err(parse_error("VTK UNSTRUCTURED_GRID required"));
        }

        let mut tokens = lines
            .flat_map(str::split_whitespace)
            .map(str::to_string)
            .peekable();

        expect_keyword(&mut tokens, "POINTS")?;
        let num_points: usize = next_parsed(&mut tokens, "point count")?;
        let _point_type = next_token(&mut tokens, "point type")?;
        let mut points = Vec::with_capacity(num_points);
        for _ in 0..num_points {
            let mut p: Point = [0.0; 3];
            for coord in &mut p {
                *coord = next_parsed(&mut tokens, "point coordinate")?;
            }
            points.push(p);
        }

        expect_keyword(&mut tokens, "CELLS")?;
        let num_cells: usize = next_parsed(&mut tokens, "cell count")?;
        let _total_size: usize = next_parsed(&mut tokens, "cell list size")?;
        let mut connectivity = Vec::with_capacity(num_cells);
        for _ in 0..num_cells {
            let count: usize = next_parsed(&mut tokens, "cell size")?;
            let mut cell = Vec::with_capacity(count);
            for _ in 0..count {
                cell.push(next_parsed::<usize, _>(&mut tokens, "cell connectivity")?);
            }
            connectivity.push(cell);
        }

        expect_keyword(&mut tokens, "CELL_TYPES")?;
        let num_types: usize = next_parsed(&mut tokens, "cell type count")?;
        if num_types != num_cells {
            return Err(parse_error(format!(
                "CELL_TYPES count {num_types} does not match CELLS count {num_cells}"
            )));
        }
        let mut cells = Vec::with_capacity(num_cells);
        let mut kept = Vec::with_capacity(num_cells);
        let mut skipped = 0usize;
        for (index, cell) in connectivity.into_iter().enumerate() {
            let vtk_id: i32 = next_parsed(&mut tokens, "cell type")?;
            match CellType::from_vtk(vtk_id).dimension() {
                Some(2) => {
                    kept.push(index);
                    cells.push(cell);
                }
                Some(_) => skipped += 1,
                None => {
                    return Err(parse_error(format!(
                        "unsupported VTK cell type {vtk_id} for cell {index}"
                    )));
                }
            }
        }
        if skipped > 0 {
            log::warn!("skipped {skipped} vertex/line cells while reading VTK mesh");
        }

        let all_scalars = parse_attributes(&mut tokens, num_cells)?;
        let cell_scalars = all_scalars
            .into_iter()
            .map(|(name, values)| (name, kept.iter().map(|&i| values[i]).collect()))
            .collect();

        log::debug!("read VTK mesh: {} points, {} cells", points.len(), cells.len());
        Ok(VtkData {
            mesh: RawMesh { points, cells },
            cell_scalars,
            file_cells: num_cells,
            source_cells: kept,
        })
    }
}

// Attribute sections after CELL_TYPES. CELL_DATA scalars are returned;
// POINT_DATA scalars and FIELD arrays are consumed and dropped.
fn parse_attributes<I>(
    tokens: &mut Peekable<I>,
    num_cells: usize,
) -> Result<BTreeMap<String, Vec<f64>>, FvmError>
where
    I: Iterator<Item = String>,
{
    let mut scalars = BTreeMap::new();
    let mut current: Option<(bool, usize)> = None;
    while let Some(token) = tokens.next() {
        match token.as_str() {
            "CELL_DATA" => {
                let n: usize = next_parsed(tokens, "CELL_DATA count")?;
                if n != num_cells {
                    return Err(parse_error(format!(
                        "CELL_DATA count {n} does not match {num_cells} cells"
                    )));
                }
                current = Some((true, n));
            }
            "POINT_DATA" => {
                let n: usize = next_parsed(tokens, "POINT_DATA count")?;
                current = Some((false, n));
            }
            "SCALARS" => {
                let (is_cell, n) =
                    current.ok_or_else(|| parse_error("SCALARS outside CELL_DATA/POINT_DATA"))?;
                let name = next_token(tokens, "scalar name")?;
                let _data_type = next_token(tokens, "scalar type")?;
                let components = match tokens.peek() {
                    Some(t) if t != "LOOKUP_TABLE" => next_parsed(tokens, "scalar components")?,
                    _ => 1usize,
                };
                if tokens.peek().is_some_and(|t| t == "LOOKUP_TABLE") {
                    tokens.next();
                    let _table = next_token(tokens, "lookup table name")?;
                }
                let mut values = Vec::with_capacity(n * components);
                for _ in 0..n * components {
                    values.push(next_parsed::<f64, _>(tokens, "scalar value")?);
                }
                if is_cell && components == 1 {
                    scalars.insert(name, values);
                }
            }
            "FIELD" => {
                let _field_name = next_token(tokens, "field name")?;
                let arrays: usize = next_parsed(tokens, "field array count")?;
                for _ in 0..arrays {
                    let _name = next_token(tokens, "field array name")?;
                    let components: usize = next_parsed(tokens, "field components")?;
                    let tuples: usize = next_parsed(tokens, "field tuples")?;
                    let _data_type = next_token(tokens, "field type")?;
                    for _ in 0..components * tuples {
                        next_token(tokens, "field value")?;
                    }
                }
            }
            other => return Err(parse_error(format!("unexpected token {other:?}"))),
        }
    }
    Ok(scalars)
}

impl VtkWriter {
    /// Write the mesh and the given cell scalar arrays.
    pub fn write<W: Write>(
        &self,
        mut writer: W,
        mesh: &PolyMesh,
        cell_scalars: &BTreeMap<String, Vec<f64>>,
    ) -> Result<(), FvmError> {
        writeln!(writer, "# vtk DataFile Version 3.0")?;
        writeln!(writer, "mesh-fvm")?;
        writeln!(writer, "ASCII")?;
        writeln!(writer, "DATASET UNSTRUCTURED_GRID")?;
        writeln!(writer, "POINTS {} double", mesh.num_points())?;
        for p in mesh.points() {
            writeln!(writer, "{} {} {}", p[0], p[1], p[2])?;
        }

        let total_size: usize = mesh.cells().iter().map(|c| c.len() + 1).sum();
        writeln!(writer, "CELLS {} {}", mesh.num_cells(), total_size)?;
        for cell in mesh.cells() {
            write!(writer, "{}", cell.len())?;
            for idx in cell {
                write!(writer, " {idx}")?;
            }
            writeln!(writer)?;
        }
        writeln!(writer, "CELL_TYPES {}", mesh.num_cells())?;
        for cell in mesh.cells() {
            writeln!(writer, "{}", CellType::for_polygon(cell.len()).vtk_id())?;
        }

        if !cell_scalars.is_empty() {
            writeln!(writer, "CELL_DATA {}", mesh.num_cells())?;
            for (name, values) in cell_scalars {
                check_field_len(mesh, name, values)?;
                write_scalars(&mut writer, name, values)?;
            }
        }
        writer.flush()?;
        Ok(())
    }
}

fn check_field_len(mesh: &PolyMesh, name: &str, values: &[f64]) -> Result<(), FvmError> {
    if values.len() != mesh.num_cells() {
        return Err(FvmError::Configuration(format!(
            "field {name:?} has {} values for {} cells",
            values.len(),
            mesh.num_cells()
        )));
    }
    Ok(())
}

fn write_scalars<W: Write>(writer: &mut W, name: &str, values: &[f64]) -> Result<(), FvmError> {
    if name.is_empty() || name.contains(char::is_whitespace) {
        return Err(FvmError::Configuration(format!(
            "invalid VTK array name {name:?}"
        )));
    }
    writeln!(writer, "SCALARS {name} double 1")?;
    writeln!(writer, "LOOKUP_TABLE default")?;
    for v in values {
        writeln!(writer, "{v}")?;
    }
    Ok(())
}

/// Value written for vertex/line cells when appending to a file that has them.
pub const SKIPPED_CELL_FILL: f64 = 0.0;

/// Append a `CELL_DATA` scalar array to an existing VTK file.
///
/// `values` holds one entry per 2D cell, in the order [`VtkReader`] returns
/// them. Vertex and line cells still listed in the file receive
/// [`SKIPPED_CELL_FILL`], so the array covers every cell of the file.
/// The `CELL_DATA` header is emitted only if the file does not contain one
/// yet, so repeated calls stack several arrays under one header.
pub fn append_cell_scalars(path: &Path, name: &str, values: &[f64]) -> Result<(), FvmError> {
    let existing = std::fs::read_to_string(path)?;
    let layout = VtkReader.read_with_fields(existing.as_bytes())?;
    if values.len() != layout.source_cells.len() {
        return Err(FvmError::Configuration(format!(
            "field {name:?} has {} values for {} cells in {}",
            values.len(),
            layout.source_cells.len(),
            path.display()
        )));
    }
    let mut padded = vec![SKIPPED_CELL_FILL; layout.file_cells];
    for (&index, &value) in layout.source_cells.iter().zip(values) {
        padded[index] = value;
    }

    let has_header = existing.lines().any(|l| l.trim_start().starts_with("CELL_DATA"));
    let mut writer = BufWriter::new(OpenOptions::new().append(true).open(path)?);
    if !existing.is_empty() && !existing.ends_with('\n') {
        writeln!(writer)?;
    }
    if !has_header {
        writeln!(writer, "CELL_DATA {}", layout.file_cells)?;
    }
    write_scalars(&mut writer, name, &padded)?;
    writer.flush()?;
    Ok(())
}

/// Read a mesh from a legacy VTK file on disk.
pub fn read_vtk_file(path: impl AsRef<Path>) -> Result<RawMesh, FvmError> {
    let file = File::open(path.as_ref())?;
    VtkReader.read(BufReader::new(file))
}

/// [`ResultWriter`] that rewrites a complete VTK file (mesh plus every field
/// written so far) on each call.
#[derive(Debug, Clone)]
pub struct VtkResultWriter {
    path: PathBuf,
    fields: BTreeMap<String, Vec<f64>>,
}

impl VtkResultWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            fields: BTreeMap::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ResultWriter for VtkResultWriter {
    fn write_cell_field(
        &mut self,
        mesh: &PolyMesh,
        name: &str,
        values: &[f64],
    ) -> Result<(), FvmError> {
        check_field_len(mesh, name, values)?;
        self.fields.insert(name.to_string(), values.to_vec());
        let file = File::create(&self.path)?;
        VtkWriter.write(BufWriter::new(file), mesh, &self.fields)?;
        log::info!("wrote field {name:?} to {}", self.path.display());
        Ok(())
    }
}

/// [`ResultWriter`] that appends scalar arrays to an existing mesh file.
#[derive(Debug, Clone)]
pub struct VtkAppendWriter {
    path: PathBuf,
}

impl VtkAppendWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ResultWriter for VtkAppendWriter {
    fn write_cell_field(
        &mut self,
        mesh: &PolyMesh,
        name: &str,
        values: &[f64],
    ) -> Result<(), FvmError> {
        check_field_len(mesh, name, values)?;
        append_cell_scalars(&self.path, name, values)?;
        log::info!("appended field {name:?} to {}", self.path.display());
        Ok(())
    }
}
