//! Preconditioners for iterative solvers
//!
//! - **DiagonalPreconditioner** (Jacobi): damped diagonal scaling, fully parallel
//! - **IdentityPreconditioner**: no preconditioning

mod diagonal;

pub use diagonal::DiagonalPreconditioner;

// Re-export IdentityPreconditioner from traits
pub use crate::traits::IdentityPreconditioner;
