//! Finite-volume assembly: problem data, boundary families and the
//! two-point flux discretization.

pub mod flux;
pub mod problem;

pub use flux::{
    CsrSystem, FaceCoefficient, LinearSystem, assemble_system, assemble_unpinned,
    interior_coefficient, interior_coefficients, pin_reference,
};
pub use problem::{BoundaryType, FnProblem, ProblemData, RobinData};
