//! Iterative solvers for linear systems
//!
//! - [`cg`]: Conjugate Gradient for symmetric positive definite systems
//! - [`pcg`]: preconditioned CG with optional initial guess

mod cg;

pub use cg::{CgConfig, CgSolution, cg, pcg};
