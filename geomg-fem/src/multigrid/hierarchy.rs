//! Multigrid hierarchy for one mesh epoch
//!
//! Holds everything the V-cycle reads: level matrices, interface matrices,
//! transfer operators and the constrained level DoFs. It is built from scratch
//! after every refinement and discarded at the next one.

use super::constrained_dofs::MgConstrainedDofs;
use super::level_assembly::assemble_level_operators;
use super::transfer::MgTransfer;
use crate::assembly::BilinearForm;
use crate::constraints::AffineConstraints;
use crate::dofs::DofHandler;
use crate::error::MultigridError;
use crate::mesh::{BoundaryId, Triangulation};
use crate::quadrature::QGauss;
use solvers::{CsrMatrix, Transposed};
use std::collections::BTreeSet;

/// Operators of one level
#[derive(Debug, Clone)]
pub struct MultigridLevel {
    pub n_dofs: usize,
    /// Level matrix with boundary and refinement-edge DoFs eliminated
    pub matrix: CsrMatrix<f64>,
    /// Couplings from refinement-edge rows to interior columns
    pub interface: CsrMatrix<f64>,
}

/// Complete multigrid hierarchy
#[derive(Debug, Clone)]
pub struct MultigridHierarchy {
    epoch: u64,
    levels: Vec<MultigridLevel>,
    transfer: MgTransfer,
    constrained_dofs: MgConstrainedDofs,
}

impl MultigridHierarchy {
    /// Validate the setup, then assemble all level operators
    ///
    /// Configuration and structural checks run before any assembly work, so
    /// a failed build leaves nothing behind.
    pub fn build<B: BilinearForm + ?Sized>(
        tria: &Triangulation,
        dofs: &DofHandler,
        dirichlet_ids: &BTreeSet<BoundaryId>,
        form: &B,
        quadrature: &QGauss,
    ) -> Result<Self, MultigridError> {
        if tria.level_cells(0).is_empty() {
            return Err(MultigridError::EmptyCoarseLevel);
        }
        let mut constrained_dofs = MgConstrainedDofs::initialize(tria, dofs)?;
        for level in 0..dofs.n_levels() {
            let owned = dofs.locally_owned_mg_dofs(level).n_elements();
            let expected = dofs.n_level_dofs(level);
            if owned != expected {
                return Err(MultigridError::OwnershipMismatch {
                    level,
                    owned,
                    expected,
                });
            }
        }
        constrained_dofs.make_zero_boundary_constraints(tria, dofs, dirichlet_ids)?;

        let operators = assemble_level_operators(tria, dofs, &constrained_dofs, form, quadrature);
        let transfer = MgTransfer::build(tria, dofs, &constrained_dofs)?;

        let levels: Vec<MultigridLevel> = operators
            .matrices
            .into_iter()
            .zip(operators.interface)
            .map(|(matrix, interface)| MultigridLevel {
                n_dofs: matrix.num_rows,
                matrix,
                interface,
            })
            .collect();

        log::info!(
            "multigrid hierarchy: {} levels, level DoFs {:?}",
            levels.len(),
            levels.iter().map(|l| l.n_dofs).collect::<Vec<_>>()
        );
        Ok(Self {
            epoch: tria.epoch(),
            levels,
            transfer,
            constrained_dofs,
        })
    }

    pub fn n_levels(&self) -> usize {
        self.levels.len()
    }

    pub fn level(&self, level: usize) -> &MultigridLevel {
        &self.levels[level]
    }

    /// Interface operator used on the way down (edge rows, interior columns)
    pub fn edge_down(&self, level: usize) -> &CsrMatrix<f64> {
        &self.levels[level].interface
    }

    /// Interface operator used on the way up; the transpose of
    /// [`edge_down`](Self::edge_down), never stored
    pub fn edge_up(&self, level: usize) -> Transposed<'_, CsrMatrix<f64>> {
        Transposed::new(&self.levels[level].interface)
    }

    pub fn transfer(&self) -> &MgTransfer {
        &self.transfer
    }

    pub fn constrained_dofs(&self) -> &MgConstrainedDofs {
        &self.constrained_dofs
    }

    /// Mesh epoch the hierarchy was built for
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Whether the hierarchy still matches the mesh
    pub fn is_current(&self, tria: &Triangulation) -> bool {
        self.epoch == tria.epoch()
    }

    /// Check that the level spaces cover every unconstrained global DoF
    pub fn check_coverage(&self, constraints: &AffineConstraints) -> Result<(), MultigridError> {
        self.transfer.check_coverage(constraints)
    }
}
