mod util;

use mesh_fvm::assembly::{BoundaryType, CsrSystem, FnProblem, assemble_system};
use mesh_fvm::driver::RunConfig;
use mesh_fvm::solver::SolverConfig;
use util::two_squares;

#[test]
fn run_config_round_trips() {
    let config = RunConfig {
        boundary_type: BoundaryType::Robin,
        solver: SolverConfig {
            max_iterations: 50,
            rel_tolerance: 1e-8,
            abs_tolerance: 1e-12,
        },
        field_name: "phi".into(),
    };
    let json = serde_json::to_string_pretty(&config).unwrap();
    assert!(json.contains("\"boundary_type\": 3"));
    let back: RunConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(back, config);
}

#[test]
fn empty_object_gives_defaults() {
    let config: RunConfig = serde_json::from_str("{}").unwrap();
    assert_eq!(config, RunConfig::default());
    assert_eq!(config.boundary_type, BoundaryType::Neumann);
}

#[test]
fn assembled_system_dump_round_trips() {
    let mesh = two_squares();
    let system = assemble_system(
        &mesh,
        &FnProblem::constant(1.0, 0.0, 3.0),
        BoundaryType::Neumann,
    )
    .unwrap()
    .compress();
    let json = serde_json::to_string(&system).unwrap();
    let back: CsrSystem = serde_json::from_str(&json).unwrap();
    assert_eq!(back, system);
    assert_eq!(back.rhs, vec![3.0, 1.0]);

    let corrupted = json.replace("\"col_indices\":[0,0,1]", "\"col_indices\":[0,1,0]");
    assert!(serde_json::from_str::<CsrSystem>(&corrupted).is_err());
}
