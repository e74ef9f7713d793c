//! Pipeline driver: mesh → assembly → CSR → solve → result output.
//!
//! [`FvmDriver`] enforces the order `Unconfigured → GridSet → Assembled →
//! Solved`. An operation invoked out of order fails with
//! [`FvmError::InvalidState`] and leaves the driver untouched; a failed
//! assembly or solve also leaves the state where it was. `Solved` is
//! terminal: a new run uses a new driver.

use serde::{Deserialize, Serialize};

use crate::assembly::{BoundaryType, CsrSystem, ProblemData, assemble_system};
use crate::io::ResultWriter;
use crate::mesh::PolyMesh;
use crate::mesh_error::FvmError;
use crate::solver::{BiCgStab, LinearSolver, SolverConfig, SolverError};

/// Driver lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PipelineState {
    Unconfigured,
    GridSet,
    Assembled,
    Solved,
}

/// Settings for a one-shot [`run`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub boundary_type: BoundaryType,
    pub solver: SolverConfig,
    /// Name of the written cell field.
    pub field_name: String,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            boundary_type: BoundaryType::Neumann,
            solver: SolverConfig::default(),
            field_name: "u".to_string(),
        }
    }
}

#[derive(Debug)]
pub struct FvmDriver {
    state: PipelineState,
    boundary: Option<BoundaryType>,
    mesh: Option<PolyMesh>,
    system: Option<CsrSystem>,
    solution: Option<Vec<f64>>,
}

impl Default for FvmDriver {
    fn default() -> Self {
        Self::new()
    }
}

fn wrong_state(operation: &str, state: PipelineState) -> FvmError {
    FvmError::InvalidState(format!("{operation} is not allowed in state {state:?}"))
}

impl FvmDriver {
    pub fn new() -> Self {
        Self {
            state: PipelineState::Unconfigured,
            boundary: None,
            mesh: None,
            system: None,
            solution: None,
        }
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    pub fn boundary_type(&self) -> Option<BoundaryType> {
        self.boundary
    }

    pub fn mesh(&self) -> Option<&PolyMesh> {
        self.mesh.as_ref()
    }

    /// Assembled system, available from `Assembled` on.
    pub fn system(&self) -> Option<&CsrSystem> {
        self.system.as_ref()
    }

    /// Per-cell solution, available once `Solved`.
    pub fn solution(&self) -> Option<&[f64]> {
        self.solution.as_deref()
    }

    /// Select the boundary family by its integer selector (1, 2 or 3).
    pub fn set_boundary_type(&mut self, selector: i64) -> Result<(), FvmError> {
        if matches!(self.state, PipelineState::Assembled | PipelineState::Solved) {
            return Err(wrong_state("set_boundary_type", self.state));
        }
        self.boundary = Some(BoundaryType::try_from(selector)?);
        Ok(())
    }

    pub fn set_mesh(&mut self, mesh: PolyMesh) -> Result<(), FvmError> {
        if self.state != PipelineState::Unconfigured {
            return Err(wrong_state("set_mesh", self.state));
        }
        log::info!(
            "mesh set: {} points, {} cells, {} faces",
            mesh.num_points(),
            mesh.num_cells(),
            mesh.faces().len()
        );
        self.mesh = Some(mesh);
        self.state = PipelineState::GridSet;
        Ok(())
    }

    /// Assemble and compress the system for the configured mesh.
    pub fn assemble<P>(&mut self, problem: &P) -> Result<(), FvmError>
    where
        P: ProblemData + ?Sized,
    {
        let mesh = match (&self.state, &self.mesh) {
            (PipelineState::GridSet, Some(mesh)) => mesh,
            _ => return Err(wrong_state("assemble", self.state)),
        };
        let boundary = self
            .boundary
            .ok_or_else(|| FvmError::InvalidState("boundary type not set".into()))?;
        let system = assemble_system(mesh, problem, boundary)?.compress();
        log::info!(
            "assembled {} cells, nnz={}",
            system.rhs.len(),
            system.matrix.nnz()
        );
        self.system = Some(system);
        self.state = PipelineState::Assembled;
        Ok(())
    }

    pub fn solve<S>(&mut self, solver: &S) -> Result<(), FvmError>
    where
        S: LinearSolver + ?Sized,
    {
        let system = match (&self.state, &self.system) {
            (PipelineState::Assembled, Some(system)) => system,
            _ => return Err(wrong_state("solve", self.state)),
        };
        let solution = solver.solve(&system.matrix, &system.rhs)?;
        if solution.len() != system.rhs.len() {
            return Err(SolverError::DimensionMismatch {
                rows: system.rhs.len(),
                rhs: solution.len(),
            }
            .into());
        }
        log::info!("solved for {} unknowns", solution.len());
        self.solution = Some(solution);
        self.state = PipelineState::Solved;
        Ok(())
    }

    /// Hand the solution to `writer` as the cell field `name`.
    pub fn write_result<W>(&self, writer: &mut W, name: &str) -> Result<(), FvmError>
    where
        W: ResultWriter + ?Sized,
    {
        match (&self.state, &self.mesh, &self.solution) {
            (PipelineState::Solved, Some(mesh), Some(solution)) => {
                writer.write_cell_field(mesh, name, solution)
            }
            _ => Err(wrong_state("write_result", self.state)),
        }
    }
}

/// Run the whole pipeline with a [`BiCgStab`] solver built from `config`.
pub fn run<P, W>(
    mesh: PolyMesh,
    problem: &P,
    config: &RunConfig,
    writer: &mut W,
) -> Result<FvmDriver, FvmError>
where
    P: ProblemData + ?Sized,
    W: ResultWriter + ?Sized,
{
    let mut driver = FvmDriver::new();
    driver.set_boundary_type(config.boundary_type.selector())?;
    driver.set_mesh(mesh)?;
    driver.assemble(problem)?;
    driver.solve(&BiCgStab::new(config.solver))?;
    driver.write_result(writer, &config.field_name)?;
    Ok(driver)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembly::FnProblem;
    use crate::io::CellFieldStore;
    use crate::mesh_error::ErrorKind;
    use crate::sparse::CsrMatrix;

    fn two_squares() -> PolyMesh {
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

    struct Failing;

    impl LinearSolver for Failing {
        fn solve(&self, _a: &CsrMatrix, _b: &[f64]) -> Result<Vec<f64>, SolverError> {
            Err(SolverError::Breakdown("test".into()))
        }
    }

    struct Truncating;

    impl LinearSolver for Truncating {
        fn solve(&self, _a: &CsrMatrix, b: &[f64]) -> Result<Vec<f64>, SolverError> {
            Ok(vec![0.0; b.len() - 1])
        }
    }

    #[test]
    fn states_advance_in_order() {
        let mut driver = FvmDriver::new();
        assert_eq!(driver.state(), PipelineState::Unconfigured);
        driver.set_boundary_type(2).unwrap();
        driver.set_mesh(two_squares()).unwrap();
        assert_eq!(driver.state(), PipelineState::GridSet);
        driver.assemble(&FnProblem::constant(0.0, 0.0, 5.0)).unwrap();
        assert_eq!(driver.state(), PipelineState::Assembled);
        assert!(driver.system().is_some());
        driver.solve(&BiCgStab::default()).unwrap();
        assert_eq!(driver.state(), PipelineState::Solved);
        let mut store = CellFieldStore::new();
        driver.write_result(&mut store, "u").unwrap();
        for v in store.get("u").unwrap() {
            assert!((v - 5.0).abs() < 1e-9);
        }
    }

    #[test]
    fn misuse_is_rejected_without_changing_state() {
        let mut driver = FvmDriver::new();
        let problem = FnProblem::constant(0.0, 0.0, 0.0);
        let err = driver.assemble(&problem).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert!(driver.solve(&BiCgStab::default()).is_err());
        assert!(driver.write_result(&mut CellFieldStore::new(), "u").is_err());
        assert_eq!(driver.state(), PipelineState::Unconfigured);

        driver.set_mesh(two_squares()).unwrap();
        assert!(matches!(
            driver.assemble(&problem),
            Err(FvmError::InvalidState(_))
        ));
        assert!(driver.set_mesh(two_squares()).is_err());
        assert!(matches!(
            driver.set_boundary_type(7),
            Err(FvmError::InvalidBoundaryType(7))
        ));
        assert_eq!(driver.boundary_type(), None);
        assert_eq!(driver.state(), PipelineState::GridSet);

        driver.set_boundary_type(1).unwrap();
        driver.assemble(&problem).unwrap();
        assert!(driver.set_boundary_type(2).is_err());
        assert!(driver.assemble(&problem).is_err());
    }

    #[test]
    fn solver_failures_propagate() {
        let mut driver = FvmDriver::new();
        driver.set_boundary_type(2).unwrap();
        driver.set_mesh(two_squares()).unwrap();
        driver.assemble(&FnProblem::constant(0.0, 0.0, 1.0)).unwrap();
        let err = driver.solve(&Failing).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Solver);
        assert!(matches!(
            driver.solve(&Truncating),
            Err(FvmError::Solver(SolverError::DimensionMismatch { rows: 2, rhs: 1 }))
        ));
        assert_eq!(driver.state(), PipelineState::Assembled);
        assert!(driver.solution().is_none());
    }

    #[test]
    fn run_config_defaults_and_json() {
        let config: RunConfig =
            serde_json::from_str(r#"{"boundary_type": 1, "field_name": "pressure"}"#).unwrap();
        assert_eq!(config.boundary_type, BoundaryType::Dirichlet);
        assert_eq!(config.solver, SolverConfig::default());
        assert_eq!(config.field_name, "pressure");
        assert!(serde_json::from_str::<RunConfig>(r#"{"boundary_type": 9}"#).is_err());

        let json = serde_json::to_string(&RunConfig::default()).unwrap();
        assert_eq!(serde_json::from_str::<RunConfig>(&json).unwrap(), RunConfig::default());
    }

    #[test]
    fn run_executes_every_phase() {
        let mut store = CellFieldStore::new();
        let driver = run(
            two_squares(),
            &FnProblem::constant(0.0, 0.0, 5.0),
            &RunConfig::default(),
            &mut store,
        )
        .unwrap();
        assert_eq!(driver.state(), PipelineState::Solved);
        assert_eq!(store.get("u").map(<[f64]>::len), Some(2));
    }
}
