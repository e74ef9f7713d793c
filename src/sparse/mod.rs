//! Sparse matrix engine.
//!
//! [`DokMatrix`] is the mutable, key-indexed assembly format; [`CsrMatrix`]
//! is the immutable compressed format handed to linear solvers. Conversion
//! is lossless in both directions for matrices without explicit zeros.

pub mod csr;
pub mod dok;

pub use csr::CsrMatrix;
pub use dok::DokMatrix;
