//! Numerical quadrature for finite element integration
//!
//! Gauss-Legendre rules on the unit interval and their tensor products on the
//! unit square and cube.

mod gauss;

pub use gauss::*;
