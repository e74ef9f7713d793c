//! Linear solvers for the assembled CSR system.
//!
//! The pinned finite-volume matrix is nonsymmetric (row 0 is an identity row
//! while column 0 keeps its flux couplings), so the default solver is a
//! Jacobi-preconditioned BiCGSTAB rather than conjugate gradients.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sparse::CsrMatrix;

/// Failure of a linear solve.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SolverError {
    /// Right-hand side length does not match the matrix.
    #[error("solver error: {rows}-row matrix with right-hand side of length {rhs}")]
    DimensionMismatch { rows: usize, rhs: usize },
    /// Matrix is not square.
    #[error("solver error: matrix is {rows}x{cols}, expected square")]
    NotSquare { rows: usize, cols: usize },
    /// Iteration limit reached above tolerance.
    #[error("solver error: no convergence after {iterations} iterations (residual {residual:e})")]
    NotConverged { iterations: usize, residual: f64 },
    /// A Krylov scalar vanished.
    #[error("solver error: breakdown ({0})")]
    Breakdown(String),
}

/// Iteration controls shared by the iterative solvers.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    pub max_iterations: usize,
    /// Tolerance relative to `||b||`.
    pub rel_tolerance: f64,
    pub abs_tolerance: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_iterations: 2000,
            rel_tolerance: 1e-10,
            abs_tolerance: 1e-14,
        }
    }
}

impl SolverConfig {
    /// Residual norm below which a solve counts as converged.
    pub fn threshold(&self, b_norm: f64) -> f64 {
        self.abs_tolerance.max(self.rel_tolerance * b_norm)
    }
}

/// Solve `A x = b` for a square CSR matrix.
pub trait LinearSolver {
    fn solve(&self, a: &CsrMatrix, b: &[f64]) -> Result<Vec<f64>, SolverError>;
}

/// Jacobi-preconditioned BiCGSTAB, starting from `x = 0`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BiCgStab {
    pub config: SolverConfig,
}

const TINY: f64 = 1e-300;

impl BiCgStab {
    pub fn new(config: SolverConfig) -> Self {
        Self { config }
    }
}

impl LinearSolver for BiCgStab {
    fn solve(&self, a: &CsrMatrix, b: &[f64]) -> Result<Vec<f64>, SolverError> {
        check_dimensions(a, b)?;
        let n = b.len();
        let tol = self.config.threshold(l2_norm(b));
        let inv_diag: Vec<f64> = a
            .diagonal()
            .into_iter()
            .map(|d| if d.abs() > TINY { 1.0 / d } else { 1.0 })
            .collect();

        let mut x = vec![0.0; n];
        let mut r = b.to_vec();
        if l2_norm(&r) <= tol {
            return Ok(x);
        }
        let mut r_hat = r.clone();
        let (mut rho, mut alpha, mut omega) = (1.0, 1.0, 1.0);
        let mut p = vec![0.0; n];
        let mut v = vec![0.0; n];
        let mut y = vec![0.0; n];
        let mut s = vec![0.0; n];
        let mut z = vec![0.0; n];
        let mut t = vec![0.0; n];

        for iteration in 1..=self.config.max_iterations {
            let mut rho_next = dot(&r_hat, &r);
            if rho_next.abs() <= f64::EPSILON * l2_norm(&r_hat) * l2_norm(&r) {
                // r is orthogonal to the shadow residual but not yet small:
                // restart from the current iterate with r_hat = r.
                log::debug!("BiCGSTAB restart at iteration {iteration}");
                r_hat.copy_from_slice(&r);
                p.fill(0.0);
                v.fill(0.0);
                (rho, alpha, omega) = (1.0, 1.0, 1.0);
                rho_next = dot(&r_hat, &r);
                if rho_next.abs() < TINY {
                    return Err(SolverError::Breakdown(format!(
                        "rho vanished at iteration {iteration}"
                    )));
                }
            }
            let beta = (rho_next / rho) * (alpha / omega);
            for i in 0..n {
                p[i] = r[i] + beta * (p[i] - omega * v[i]);
                y[i] = inv_diag[i] * p[i];
            }
            spmv(a, &y, &mut v);
            let denom = dot(&r_hat, &v);
            if denom.abs() < TINY {
                return Err(SolverError::Breakdown(format!(
                    "<r_hat, v> vanished at iteration {iteration}"
                )));
            }
            alpha = rho_next / denom;
            for i in 0..n {
                s[i] = r[i] - alpha * v[i];
                x[i] += alpha * y[i];
            }
            let s_norm = l2_norm(&s);
            if s_norm <= tol {
                log::info!("BiCGSTAB converged in {iteration} iterations (residual {s_norm:e})");
                return Ok(x);
            }

            for i in 0..n {
                z[i] = inv_diag[i] * s[i];
            }
            spmv(a, &z, &mut t);
            let tt = dot(&t, &t);
            if tt < TINY {
                return Err(SolverError::Breakdown(format!("<t, t> vanished at iteration {iteration}")));
            }
            omega = dot(&t, &s) / tt;
            for i in 0..n {
                x[i] += omega * z[i];
                r[i] = s[i] - omega * t[i];
            }
            let r_norm = l2_norm(&r);
            if r_norm <= tol {
                log::info!("BiCGSTAB converged in {iteration} iterations (residual {r_norm:e})");
                return Ok(x);
            }
            if omega.abs() < TINY {
                return Err(SolverError::Breakdown(format!("omega vanished at iteration {iteration}")));
            }
            rho = rho_next;
        }

        Err(SolverError::NotConverged {
            iterations: self.config.max_iterations,
            residual: l2_norm(&r),
        })
    }
}

fn check_dimensions(a: &CsrMatrix, b: &[f64]) -> Result<(), SolverError> {
    if a.rows() != a.cols() {
        return Err(SolverError::NotSquare {
            rows: a.rows(),
            cols: a.cols(),
        });
    }
    if a.rows() != b.len() {
        return Err(SolverError::DimensionMismatch {
            rows: a.rows(),
            rhs: b.len(),
        });
    }
    Ok(())
}

fn spmv(a: &CsrMatrix, x: &[f64], y: &mut [f64]) {
    for (i, yi) in y.iter_mut().enumerate() {
        *yi = a.row(i).map(|(j, v)| v * x[j]).sum();
    }
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

fn l2_norm(v: &[f64]) -> f64 {
    dot(v, v).sqrt()
}

/// Euclidean norm of `b - A x`.
pub fn residual_norm(a: &CsrMatrix, x: &[f64], b: &[f64]) -> Result<f64, SolverError> {
    check_dimensions(a, b)?;
    if x.len() != a.cols() {
        return Err(SolverError::DimensionMismatch {
            rows: a.rows(),
            rhs: x.len(),
        });
    }
    let mut ax = vec![0.0; b.len()];
    spmv(a, x, &mut ax);
    Ok(ax
        .iter()
        .zip(b)
        .map(|(l, r)| (r - l) * (r - l))
        .sum::<f64>()
        .sqrt())
}
