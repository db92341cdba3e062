//! Hierarchical meshes for geometric multigrid
//!
//! Quadrilateral (2D) and hexahedral (3D) cells refined isotropically into a
//! tree whose levels are kept for the multigrid hierarchy.

mod generators;
mod reference;
mod refinement;
mod triangulation;
mod types;

pub use generators::*;
pub use reference::{HEXAHEDRON, QUADRILATERAL, ReferenceCell};
pub use refinement::*;
pub use triangulation::*;
pub use types::*;
