//! Constraints on the active-mesh DoFs
//!
//! - [`AffineConstraints`]: constraint lines, condensation during assembly
//! - hanging-node constraints for locally refined meshes
//! - Dirichlet boundary values

mod affine;
mod boundary;
mod hanging;

pub use affine::*;
pub use boundary::*;
pub use hanging::*;
