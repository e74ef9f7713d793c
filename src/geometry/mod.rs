//! Geometry utilities for mesh-fvm.
//!
//! This module provides the planar polygon kernel (signed area, centroid) and
//! the edge helpers (length, midpoint, normal) used by flux assembly.

pub mod polygon;

pub use polygon::{
    EPS, Point, PolygonMetrics, edge_length, edge_midpoint, edge_normal, edge_tolerance,
    normal_distance, polygon_metrics,
};
