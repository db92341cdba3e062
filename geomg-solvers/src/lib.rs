//! Linear algebra building blocks for geometric multigrid
//!
//! This crate provides the sparse storage, solvers and operator traits that the
//! multigrid preconditioner in `geomg-fem` is assembled from and plugged into.
//!
//! # Features
//!
//! - **Sparse Matrices**: CSR storage, a triplet accumulator with an explicit
//!   `compress` step, and a lazy transposed view
//! - **Iterative Solvers**: CG and preconditioned CG
//! - **Direct Solvers**: LU decomposition with partial pivoting
//! - **Preconditioners**: damped Jacobi, identity
//! - **Generic Scalar Types**: works with f64 and f32
//!
//! # Example
//!
//! ```ignore
//! use geomg_solvers::{CgConfig, DiagonalPreconditioner, TripletMatrix, pcg};
//!
//! let mut acc = TripletMatrix::new(n, n);
//! // ... scatter cell matrices ...
//! let matrix = acc.compress();
//!
//! let jacobi = DiagonalPreconditioner::from_csr(&matrix);
//! let solution = pcg(&matrix, &jacobi, &rhs, None, &CgConfig::default());
//! ```

pub mod blas_helpers;
pub mod direct;
pub mod iterative;
pub mod parallel;
pub mod preconditioners;
pub mod sparse;
pub mod traits;

// Re-export main types
pub use sparse::{CsrMatrix, Transposed, TripletMatrix};
pub use traits::{IdentityPreconditioner, LinearOperator, Preconditioner, Scalar};

// Re-export solvers
pub use direct::{LuError, LuFactorization, lu_factorize, lu_solve};
pub use iterative::{CgConfig, CgSolution, cg, pcg};

// Re-export preconditioners
pub use preconditioners::DiagonalPreconditioner;
