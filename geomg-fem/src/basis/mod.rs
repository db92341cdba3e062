//! Finite element basis functions
//!
//! Tensor-product Q1 Lagrange functions on the unit cell and the mapped
//! values and gradients used during cell integration.

mod lagrange;
mod shape;

pub use lagrange::*;
pub use shape::*;
