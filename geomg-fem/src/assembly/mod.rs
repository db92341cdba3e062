//! Finite element assembly
//!
//! Cell-wise forms and the constrained global system on the active mesh. The
//! per-level multigrid operators are assembled in [`crate::multigrid`].

mod forms;
mod system;

pub use forms::*;
pub use system::*;

pub(crate) use system::local_matrices;
