// cargo run --example poisson_manufactured [-- mesh.vtk [output.vtk]]
//
// Solves -Δu = f on the unit square with Neumann data taken from a known
// solution, writes the field to VTK and reports the error at cell centers.
// Without a mesh argument a 40x40 quad grid is generated.
use std::time::Instant;

use mesh_fvm::prelude::*;
use mesh_fvm::mesh_generation::quad_mesh;

fn exact_solution(p: &Point) -> f64 {
    let (x, y) = (p[0], p[1]);
    (10.0 * x * x).cos() * (10.0 * y).sin() + (10.0 * x * x).sin() * (10.0 * x).cos()
}

fn exact_rhs(p: &Point) -> f64 {
    let (x, y) = (p[0], p[1]);
    let (s2, c2) = ((10.0 * x * x).sin(), (10.0 * x * x).cos());
    (20.0 * s2 + (400.0 * x * x + 100.0) * c2) * (10.0 * y).sin()
        + (400.0 * x * x + 100.0) * (10.0 * x).cos() * s2
        + (400.0 * x * (10.0 * x).sin() - 20.0 * (10.0 * x).cos()) * c2
}

fn exact_dudx(p: &Point) -> f64 {
    let (x, y) = (p[0], p[1]);
    20.0 * x * (10.0 * x).cos() * (10.0 * x * x).cos()
        - 10.0 * (10.0 * x * x).sin() * ((10.0 * x).sin() + 2.0 * x * (10.0 * y).sin())
}

fn exact_dudy(p: &Point) -> f64 {
    let (x, y) = (p[0], p[1]);
    10.0 * (10.0 * x * x).cos() * (10.0 * y).cos()
}

// Outward normal derivative on the sides of the unit square.
fn exact_dudn(p: &Point) -> f64 {
    let (x, y) = (p[0], p[1]);
    if x.abs() < 1e-6 {
        -exact_dudx(p)
    } else if (x - 1.0).abs() < 1e-6 {
        exact_dudx(p)
    } else if y.abs() < 1e-6 {
        -exact_dudy(p)
    } else if (y - 1.0).abs() < 1e-6 {
        exact_dudy(p)
    } else {
        0.0
    }
}

fn main() -> Result<(), FvmError> {
    env_logger::init();
    let start = Instant::now();
    let mut args = std::env::args().skip(1);

    let raw = match args.next() {
        Some(path) => read_vtk_file(&path)?,
        None => quad_mesh(40, 40, [0.0, 0.0], [1.0, 1.0])?,
    };
    let output = args.next().unwrap_or_else(|| "poisson_manufactured.vtk".to_string());
    let mesh = PolyMesh::try_from(raw)?;

    let problem = FnProblem::new(exact_rhs, exact_dudn, exact_solution);
    let config = RunConfig::default();
    let mut writer = VtkResultWriter::new(&output);
    let driver = run(mesh, &problem, &config, &mut writer)?;

    if let (Some(mesh), Some(u)) = (driver.mesh(), driver.solution()) {
        let centers = &mesh.geometry()?.centers;
        let max_error = u
            .iter()
            .zip(centers)
            .map(|(uh, c)| (uh - exact_solution(c)).abs())
            .fold(0.0, f64::max);
        println!("cells      = {}", mesh.num_cells());
        println!("max error  = {max_error:.3e}");
    }
    println!("written to {output}");
    println!("time       = {:?}", start.elapsed());
    Ok(())
}
