mod util;

use mesh_fvm::assembly::{BoundaryType, FnProblem, RobinData, assemble_unpinned};
use mesh_fvm::driver::{FvmDriver, PipelineState, RunConfig, run};
use mesh_fvm::io::CellFieldStore;
use mesh_fvm::mesh::PolyMesh;
use mesh_fvm::mesh_generation::{quad_mesh, tri_mesh};
use mesh_fvm::solver::BiCgStab;
use util::{max_abs_diff, two_squares, unit_square};

#[test]
fn zero_data_pinned_to_five_gives_constant_field() {
    let mut store = CellFieldStore::new();
    let driver = run(
        two_squares(),
        &FnProblem::constant(0.0, 0.0, 5.0),
        &RunConfig::default(),
        &mut store,
    )
    .unwrap();
    assert_eq!(driver.state(), PipelineState::Solved);
    let u = store.get("u").unwrap();
    assert!(max_abs_diff(u, &[5.0, 5.0]) < 1e-9, "{u:?}");
}

#[test]
fn pinned_constant_on_quad_grids_of_every_shape() {
    for (nx, ny) in [(1, 1), (2, 1), (2, 2), (3, 1), (3, 3), (4, 1), (4, 4), (8, 1), (8, 8)] {
        let mesh = PolyMesh::try_from(quad_mesh(nx, ny, [0.0, 0.0], [1.0, 1.0]).unwrap()).unwrap();
        let mut store = CellFieldStore::new();
        run(
            mesh,
            &FnProblem::constant(0.0, 0.0, 5.0),
            &RunConfig::default(),
            &mut store,
        )
        .unwrap_or_else(|e| panic!("{nx}x{ny}: {e}"));
        let u = store.get("u").unwrap();
        assert!(max_abs_diff(u, &vec![5.0; nx * ny]) < 1e-7, "{nx}x{ny}: {u:?}");
    }
}

#[test]
fn constant_field_on_triangles() {
    let mesh = PolyMesh::try_from(tri_mesh(4, 3, [0.0, 0.0], [2.0, 1.0]).unwrap()).unwrap();
    let n = mesh.num_cells();
    let mut store = CellFieldStore::new();
    run(
        mesh,
        &FnProblem::constant(0.0, 0.0, -1.5),
        &RunConfig::default(),
        &mut store,
    )
    .unwrap();
    assert!(max_abs_diff(store.get("u").unwrap(), &vec![-1.5; n]) < 1e-8);
}

#[test]
fn unpinned_two_cell_matrix_is_symmetric() {
    let mesh = two_squares();
    let system =
        assemble_unpinned(&mesh, &FnProblem::constant(1.0, 0.0, 0.0), BoundaryType::Neumann)
            .unwrap();
    let csr = system.matrix.to_csr();
    assert!(csr.is_symmetric(0.0));
    // Row sums vanish: constants are in the null space.
    for i in 0..2 {
        assert!(csr.row(i).map(|(_, v)| v).sum::<f64>().abs() < 1e-12);
    }
    assert_eq!(system.rhs, vec![1.0, 1.0]);
}

#[test]
fn dirichlet_reproduces_linear_field() {
    let exact = |p: &[f64; 3]| 1.0 + p[0] + 2.0 * p[1];
    let mesh = unit_square(6);
    let centers = mesh.geometry().unwrap().centers.clone();
    let mut driver = FvmDriver::new();
    driver.set_boundary_type(1).unwrap();
    driver.set_mesh(mesh).unwrap();
    driver
        .assemble(&FnProblem::new(|_| 0.0, |_| 0.0, exact))
        .unwrap();
    driver.solve(&BiCgStab::default()).unwrap();
    let expected: Vec<f64> = centers.iter().map(exact).collect();
    assert!(max_abs_diff(driver.solution().unwrap(), &expected) < 1e-7);
}

#[test]
fn robin_with_uniform_ambient_gives_ambient() {
    let problem = FnProblem::constant(0.0, 0.0, 2.0).with_robin(|_| RobinData {
        coefficient: 10.0,
        ambient: 2.0,
    });
    let config = RunConfig {
        boundary_type: BoundaryType::Robin,
        field_name: "temperature".into(),
        ..RunConfig::default()
    };
    let mut store = CellFieldStore::new();
    run(unit_square(5), &problem, &config, &mut store).unwrap();
    let t = store.get("temperature").unwrap();
    assert!(max_abs_diff(t, &[2.0; 25]) < 1e-8);
}
