//! Geometric multigrid for adaptive finite elements
//!
//! This crate solves the Poisson problem `-∇·(a ∇u) = f` with Q1 elements on
//! locally refined quadrilateral and hexahedral meshes, using conjugate
//! gradients preconditioned by a geometric multigrid V-cycle with local
//! smoothing.
//!
//! # Features
//!
//! - **Meshes**: refinement trees with all levels kept, hanging nodes, 2D and 3D
//! - **Constraints**: hanging-node and Dirichlet constraints condensed during assembly
//! - **Multigrid**: level matrices on all cells of a level, refinement-edge
//!   interface matrices, exact Q1 prolongation, Jacobi or Gauss-Seidel
//!   smoothing, CG or LU on the coarse level
//! - **Adaptivity**: flux-recovery error indicator and fixed-fraction marking
//!
//! # Example
//!
//! ```ignore
//! use geomg_fem::{LaplaceConfig, LaplaceProblem};
//!
//! let mut problem = LaplaceProblem::new(LaplaceConfig::default())?;
//! for report in problem.run()? {
//!     println!("{} DoFs: {} iterations", report.n_dofs, report.solve.iterations);
//! }
//! ```

pub mod assembly;
pub mod basis;
pub mod config;
pub mod constraints;
pub mod dofs;
pub mod error;
pub mod mesh;
pub mod multigrid;
pub mod quadrature;
pub mod solver;

pub use config::{LaplaceConfig, OuterSolverConfig};
pub use error::{ConfigError, ErrorKind, MeshError, MultigridError, SolverError};
pub use multigrid::{Multigrid, MultigridConfig, MultigridHierarchy, VCycleReport};
pub use solver::{CycleReport, LaplaceProblem, SolveReport};

/// Library version
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }
}
