#![allow(dead_code)]
use std::path::PathBuf;

use mesh_fvm::mesh::PolyMesh;
use mesh_fvm::mesh_generation::quad_mesh;

/// Two unit squares side by side: cells 0 = [0,1]x[0,1], 1 = [1,2]x[0,1].
pub fn two_squares() -> PolyMesh {
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

/// `n`×`n` quads on the unit square.
pub fn unit_square(n: usize) -> PolyMesh {
    PolyMesh::try_from(quad_mesh(n, n, [0.0, 0.0], [1.0, 1.0]).unwrap()).unwrap()
}

/// Largest pointwise difference.
pub fn max_abs_diff(a: &[f64], b: &[f64]) -> f64 {
    assert_eq!(a.len(), b.len());
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y).abs())
        .fold(0.0, f64::max)
}

/// Fresh path in the system temp directory, unique per process and tag.
pub fn temp_path(tag: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("mesh-fvm-{}-{tag}.vtk", std::process::id()));
    let _ = std::fs::remove_file(&path);
    path
}
