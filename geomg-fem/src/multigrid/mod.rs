//! Geometric multigrid on locally refined meshes
//!
//! Level operators are assembled on all cells of each level, with
//! refinement-edge DoFs eliminated and their coupling kept in separate
//! interface matrices. The V-cycle in [`Multigrid`] plugs into any solver that
//! takes a [`solvers::Preconditioner`].

mod coarse;
mod constrained_dofs;
mod cycle;
mod hierarchy;
mod level_assembly;
mod smoother;
mod transfer;

pub use coarse::*;
pub use constrained_dofs::*;
pub use cycle::*;
pub use hierarchy::*;
pub use level_assembly::*;
pub use smoother::*;
pub use transfer::*;
