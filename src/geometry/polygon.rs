//! Planar polygon and edge metrics.
//!
//! Polygons are given as closed vertex loops (the last vertex connects back to
//! the first). All quantities are evaluated in the xy-plane; the z coordinate
//! is carried through centroids but never enters an area, length or normal.

use crate::mesh_error::FvmError;

/// A mesh vertex `(x, y, z)`.
pub type Point = [f64; 3];

/// Relative tolerance: a length (area) at or below `EPS` times its local
/// reference length (squared) is treated as zero.
pub const EPS: f64 = 1e-12;

/// Signed area and centroid of a polygon.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PolygonMetrics {
    /// Area-weighted centroid.
    pub centroid: Point,
    /// Signed area; positive for counter-clockwise loops.
    pub signed_area: f64,
}

impl PolygonMetrics {
    /// Unsigned area.
    #[inline]
    pub fn area(&self) -> f64 {
        self.signed_area.abs()
    }

    /// `true` when the loop is wound clockwise.
    #[inline]
    pub fn is_clockwise(&self) -> bool {
        self.signed_area < 0.0
    }
}

/// Compute the signed area and centroid of a polygon by fanning triangles
/// from the first vertex.
///
/// Each triangle `(v0, vj, vj+1)` contributes its signed area
/// `((vj - v0) x (vj+1 - v0)).z / 2` and its own centroid weighted by that
/// area. A loop with fewer than three vertices or zero total area is rejected.
pub fn polygon_metrics(vertices: &[Point]) -> Result<PolygonMetrics, FvmError> {
    if vertices.len() < 3 {
        return Err(FvmError::InvalidGeometry(format!(
            "polygon has {} vertices, at least 3 required",
            vertices.len()
        )));
    }
    let v0 = vertices[0];
    let mut signed_area = 0.0;
    let mut weighted = [0.0; 3];
    for pair in vertices[1..].windows(2) {
        let (vi, vj) = (pair[0], pair[1]);
        let a = cross_z(sub(vi, v0), sub(vj, v0)) / 2.0;
        signed_area += a;
        for k in 0..3 {
            weighted[k] += (v0[k] + vi[k] + vj[k]) * a / 3.0;
        }
    }
    let extent = bounding_extent(vertices);
    if signed_area.abs() <= EPS * extent * extent {
        return Err(FvmError::InvalidGeometry(format!(
            "polygon has zero area ({signed_area:e}) for extent {extent:e}"
        )));
    }
    Ok(PolygonMetrics {
        centroid: [
            weighted[0] / signed_area,
            weighted[1] / signed_area,
            weighted[2] / signed_area,
        ],
        signed_area,
    })
}

/// In-plane length of the edge `(pi, pj)`.
#[inline]
pub fn edge_length(pi: Point, pj: Point) -> f64 {
    let d = sub(pj, pi);
    (d[0] * d[0] + d[1] * d[1]).sqrt()
}

/// Midpoint of the edge `(pi, pj)`.
#[inline]
pub fn edge_midpoint(pi: Point, pj: Point) -> Point {
    [
        0.5 * (pi[0] + pj[0]),
        0.5 * (pi[1] + pj[1]),
        0.5 * (pi[2] + pj[2]),
    ]
}

/// Length below which the edge `(pi, pj)` counts as collapsed, relative to
/// the magnitude of its endpoint coordinates.
#[inline]
pub fn edge_tolerance(pi: Point, pj: Point) -> f64 {
    let scale = [pi[0], pi[1], pj[0], pj[1]]
        .into_iter()
        .fold(0.0, |m: f64, c| m.max(c.abs()));
    EPS * scale
}

/// Unit in-plane normal of the edge `(pi, pj)`.
///
/// The normal is `(dy, -dx) / |d|` with `d = pj - pi`, i.e. it points to the
/// right of the edge direction. For a counter-clockwise cell this is the
/// outward normal.
pub fn edge_normal(pi: Point, pj: Point) -> Result<[f64; 2], FvmError> {
    let nx = pj[1] - pi[1];
    let ny = -(pj[0] - pi[0]);
    let len = (nx * nx + ny * ny).sqrt();
    if len <= edge_tolerance(pi, pj) {
        return Err(FvmError::InvalidGeometry(format!(
            "zero-length edge between {pi:?} and {pj:?}"
        )));
    }
    Ok([nx / len, ny / len])
}

/// Absolute distance between `from` and `to` measured along `normal`.
#[inline]
pub fn normal_distance(from: Point, to: Point, normal: [f64; 2]) -> f64 {
    let d = sub(to, from);
    (d[0] * normal[0] + d[1] * normal[1]).abs()
}

#[inline]
pub(crate) fn sub(a: Point, b: Point) -> Point {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

#[inline]
fn cross_z(a: Point, b: Point) -> f64 {
    a[0] * b[1] - a[1] * b[0]
}

// Longer side of the in-plane bounding box.
fn bounding_extent(vertices: &[Point]) -> f64 {
    let (mut lo, mut hi) = ([f64::INFINITY; 2], [f64::NEG_INFINITY; 2]);
    for v in vertices {
        for k in 0..2 {
            lo[k] = lo[k].min(v[k]);
            hi[k] = hi[k].max(v[k]);
        }
    }
    (hi[0] - lo[0]).max(hi[1] - lo[1])
}
