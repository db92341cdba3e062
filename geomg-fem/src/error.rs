//! Error types for meshes, multigrid setup, configuration and the driver
//!
//! Numerical non-convergence inside a V-cycle is not an error: it is carried
//! in [`crate::multigrid::CoarseSolveReport`] and logged.

use crate::mesh::BoundaryId;
use solvers::LuError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while building or refining a triangulation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MeshError {
    #[error("unsupported spatial dimension {0}, only 2 and 3 are supported")]
    UnsupportedDimension(usize),
    #[error("coarse mesh has no cells")]
    EmptyMesh,
    #[error("cell {cell} has {found} vertices, expected {expected}")]
    WrongVertexCount {
        cell: usize,
        found: usize,
        expected: usize,
    },
    #[error("cell {cell} references vertex {vertex}, but only {n_vertices} vertices exist")]
    VertexOutOfRange {
        cell: usize,
        vertex: usize,
        n_vertices: usize,
    },
    #[error("cell {0} is inverted or degenerate (non-positive Jacobian at its center)")]
    InvertedCell(usize),
    #[error("cell {0} does not exist or is not active")]
    NotActive(usize),
    #[error("invalid subdivisions {0:?} for this dimension")]
    InvalidSubdivisions(Vec<usize>),
}

/// Class of a multigrid setup error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Mesh and DoF numbering disagree; the hierarchy cannot be built
    Structural,
    /// The request itself is invalid; detected before any assembly
    Configuration,
}

/// Errors raised while setting up the multigrid hierarchy
#[derive(Error, Debug)]
pub enum MultigridError {
    #[error("DoF numbering belongs to mesh epoch {dofs}, but the mesh is at epoch {mesh}")]
    StaleDofs { dofs: u64, mesh: u64 },
    #[error("DoF handler has {dofs} levels, mesh has {mesh}")]
    LevelCountMismatch { dofs: usize, mesh: usize },
    #[error("level {level}: {owned} locally owned DoFs, but {expected} DoFs on the level")]
    OwnershipMismatch {
        level: usize,
        owned: usize,
        expected: usize,
    },
    #[error("level {level}: DoF {dof} is not reached by prolongation from the coarser level")]
    UnreachableLevelDof { level: usize, dof: usize },
    #[error("global DoF {0} is neither constrained nor represented on any level")]
    UncoveredDof(usize),
    #[error("boundary id {0} does not occur on the mesh")]
    UnknownBoundaryId(BoundaryId),
    #[error("coarsest level has no cells")]
    EmptyCoarseLevel,
    #[error("coarse direct solver setup failed: {0}")]
    CoarseFactorization(#[from] LuError),
}

impl MultigridError {
    /// Structural or configuration error, per the setup error taxonomy
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnknownBoundaryId(_) | Self::EmptyCoarseLevel | Self::CoarseFactorization(_) => {
                ErrorKind::Configuration
            }
            Self::StaleDofs { .. }
            | Self::LevelCountMismatch { .. }
            | Self::OwnershipMismatch { .. }
            | Self::UnreachableLevelDof { .. }
            | Self::UncoveredDof(_) => ErrorKind::Structural,
        }
    }
}

/// Errors raised while loading or validating a configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid configuration file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Errors raised by the Laplace driver
#[derive(Error, Debug)]
pub enum SolverError {
    #[error("mesh error: {0}")]
    Mesh(#[from] MeshError),
    #[error("multigrid setup failed: {0}")]
    Multigrid(#[from] MultigridError),
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("direct solve failed: {0}")]
    Direct(#[from] LuError),
    #[error("{0} must run before this step")]
    NotReady(&'static str),
    #[error("outer solver did not converge after {iterations} iterations (relative residual {residual:.3e})")]
    ConvergenceFailure { iterations: usize, residual: f64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(
            MultigridError::UnknownBoundaryId(7).kind(),
            ErrorKind::Configuration
        );
        assert_eq!(MultigridError::EmptyCoarseLevel.kind(), ErrorKind::Configuration);
        assert_eq!(MultigridError::UncoveredDof(3).kind(), ErrorKind::Structural);
        assert_eq!(
            MultigridError::OwnershipMismatch {
                level: 1,
                owned: 3,
                expected: 4
            }
            .kind(),
            ErrorKind::Structural
        );
    }

    #[test]
    fn test_messages() {
        let err = MultigridError::UnreachableLevelDof { level: 2, dof: 5 };
        assert_eq!(
            err.to_string(),
            "level 2: DoF 5 is not reached by prolongation from the coarser level"
        );
        let err = SolverError::ConvergenceFailure {
            iterations: 500,
            residual: 1.5e-3,
        };
        assert!(err.to_string().contains("500 iterations"));
    }
}
