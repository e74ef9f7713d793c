//! Structured 2D mesh generators over axis-aligned rectangles.
//!
//! Points are numbered row by row (`j * (nx + 1) + i`) and every cell is
//! wound counter-clockwise.

use crate::mesh::RawMesh;
use crate::mesh_error::FvmError;

fn invalid_geometry(message: impl Into<String>) -> FvmError {
    FvmError::InvalidGeometry(message.into())
}

fn grid_points(
    nx: usize,
    ny: usize,
    min: [f64; 2],
    max: [f64; 2],
) -> Result<Vec<[f64; 3]>, FvmError> {
    if nx == 0 || ny == 0 {
        return Err(invalid_geometry("nx and ny must be positive"));
    }
    if !(max[0] > min[0] && max[1] > min[1]) {
        return Err(invalid_geometry(format!(
            "empty rectangle [{min:?}, {max:?}]"
        )));
    }
    let dx = (max[0] - min[0]) / nx as f64;
    let dy = (max[1] - min[1]) / ny as f64;
    let mut vertices = Vec::with_capacity((nx + 1) * (ny + 1));
    for j in 0..=ny {
        for i in 0..=nx {
            vertices.push([min[0] + dx * i as f64, min[1] + dy * j as f64, 0.0]);
        }
    }
    Ok(vertices)
}

// Counter-clockwise corners of grid square (i, j).
fn square(nx: usize, i: usize, j: usize) -> [usize; 4] {
    let row_stride = nx + 1;
    let v0 = j * row_stride + i;
    [v0, v0 + 1, v0 + 1 + row_stride, v0 + row_stride]
}

/// Structured quadrilateral mesh over `[min, max]` with `nx`×`ny` cells.
pub fn quad_mesh(nx: usize, ny: usize, min: [f64; 2], max: [f64; 2]) -> Result<RawMesh, FvmError> {
    let points = grid_points(nx, ny, min, max)?;
    let mut cells = Vec::with_capacity(nx * ny);
    for j in 0..ny {
        for i in 0..nx {
            cells.push(square(nx, i, j).to_vec());
        }
    }
    Ok(RawMesh { points, cells })
}

/// Structured triangle mesh: each grid square split along its
/// lower-left to upper-right diagonal, giving `2 * nx * ny` cells.
pub fn tri_mesh(nx: usize, ny: usize, min: [f64; 2], max: [f64; 2]) -> Result<RawMesh, FvmError> {
    let points = grid_points(nx, ny, min, max)?;
    let mut cells = Vec::with_capacity(2 * nx * ny);
    for j in 0..ny {
        for i in 0..nx {
            let [a, b, c, d] = square(nx, i, j);
            cells.push(vec![a, b, c]);
            cells.push(vec![a, c, d]);
        }
    }
    Ok(RawMesh { points, cells })
}
