//! Transfer operators for multigrid
//!
//! Prolongation from level L-1 to level L interpolates the coarse Q1 function
//! exactly: a child vertex takes the average of the parent vertices it sits
//! between. Columns of coarse boundary DoFs are left out. Restriction is the
//! plain transpose.
//!
//! Vectors move between the global (active mesh) space and the level spaces
//! through the active cells: each global DoF is represented on the level of
//! the active cells around it, refinement-edge level DoFs excluded.

use super::constrained_dofs::MgConstrainedDofs;
use crate::constraints::AffineConstraints;
use crate::dofs::DofHandler;
use crate::error::MultigridError;
use crate::mesh::Triangulation;
use ndarray::Array1;
use solvers::{CsrMatrix, TripletMatrix};

/// Prolongation matrices and global/level copy maps for one mesh epoch
#[derive(Debug, Clone)]
pub struct MgTransfer {
    /// `prolongation[L - 1]` maps level L-1 to level L
    prolongation: Vec<CsrMatrix<f64>>,
    /// `copy_indices[level]`: `(global dof, level dof)` pairs
    copy_indices: Vec<Vec<(usize, usize)>>,
    n_level_dofs: Vec<usize>,
    n_global: usize,
}

impl MgTransfer {
    pub fn build(
        tria: &Triangulation,
        dofs: &DofHandler,
        mg: &MgConstrainedDofs,
    ) -> Result<Self, MultigridError> {
        let reference = tria.reference_cell();
        let n_levels = tria.n_levels();
        let n_level_dofs: Vec<usize> = (0..n_levels).map(|l| dofs.n_level_dofs(l)).collect();

        let mut prolongation = Vec::with_capacity(n_levels.saturating_sub(1));
        for level in 1..n_levels {
            let (n_fine, n_coarse) = (n_level_dofs[level], n_level_dofs[level - 1]);
            let mut triplets = TripletMatrix::new(n_fine, n_coarse);
            let mut row_done = vec![false; n_fine];

            for &parent in tria.level_cells(level - 1) {
                let Some(children) = &tria.cell(parent).children else {
                    continue;
                };
                let coarse_dofs = dofs.cell_level_dof_indices(parent);
                for (child_idx, &child) in children.iter().enumerate() {
                    let fine_dofs = dofs.cell_level_dof_indices(child);
                    for (vertex, &fine) in fine_dofs.iter().enumerate() {
                        if row_done[fine] {
                            continue;
                        }
                        row_done[fine] = true;
                        let support = reference.child_vertex_support(child_idx, vertex);
                        let weight = 1.0 / support.len() as f64;
                        for parent_vertex in support {
                            let coarse = coarse_dofs[parent_vertex];
                            if !mg.is_boundary_index(level - 1, coarse) {
                                triplets.add(fine, coarse, weight);
                            }
                        }
                    }
                }
            }

            if let Some(dof) = row_done.iter().position(|done| !done) {
                return Err(MultigridError::UnreachableLevelDof { level, dof });
            }
            prolongation.push(triplets.compress());
        }

        let mut copy_indices = vec![Vec::new(); n_levels];
        let mut seen: Vec<Vec<bool>> = n_level_dofs.iter().map(|&n| vec![false; n]).collect();
        for cell in tria.active_cells() {
            let level = tria.cell(cell).level;
            let Some(global_dofs) = dofs.cell_dof_indices(cell) else {
                continue;
            };
            let level_dofs = dofs.cell_level_dof_indices(cell);
            for (&global, &level_dof) in global_dofs.iter().zip(level_dofs) {
                if seen[level][level_dof] || mg.at_refinement_edge(level, level_dof) {
                    continue;
                }
                seen[level][level_dof] = true;
                copy_indices[level].push((global, level_dof));
            }
        }

        Ok(Self {
            prolongation,
            copy_indices,
            n_level_dofs,
            n_global: dofs.n_dofs(),
        })
    }

    pub fn n_levels(&self) -> usize {
        self.n_level_dofs.len()
    }

    /// Matrix mapping level `to_level - 1` to `to_level`
    pub fn prolongation_matrix(&self, to_level: usize) -> &CsrMatrix<f64> {
        &self.prolongation[to_level - 1]
    }

    /// `P coarse`
    pub fn prolongate(&self, to_level: usize, coarse: &Array1<f64>) -> Array1<f64> {
        self.prolongation_matrix(to_level).matvec(coarse)
    }

    /// `dst += Pᵀ src`, with `src` on `from_level` and `dst` one level below
    pub fn restrict_and_add(&self, from_level: usize, dst: &mut Array1<f64>, src: &Array1<f64>) {
        self.prolongation_matrix(from_level).matvec_transpose_add(src, dst);
    }

    /// Split a global vector into level vectors
    pub fn copy_to_mg(&self, global: &Array1<f64>) -> Vec<Array1<f64>> {
        self.copy_indices
            .iter()
            .zip(&self.n_level_dofs)
            .map(|(indices, &n)| {
                let mut level = Array1::zeros(n);
                for &(g, l) in indices {
                    level[l] = global[g];
                }
                level
            })
            .collect()
    }

    /// Gather level vectors into a global vector; unreached entries are zero
    pub fn copy_from_mg(&self, levels: &[Array1<f64>]) -> Array1<f64> {
        let mut global = Array1::zeros(self.n_global);
        for (indices, level) in self.copy_indices.iter().zip(levels) {
            for &(g, l) in indices {
                global[g] = level[l];
            }
        }
        global
    }

    /// Whether `copy_from_mg` writes global DoF `dof`
    pub fn is_copied(&self, dof: usize) -> bool {
        self.copy_indices
            .iter()
            .any(|indices| indices.iter().any(|&(g, _)| g == dof))
    }

    /// Every unconstrained global DoF must be represented on some level
    pub fn check_coverage(&self, constraints: &AffineConstraints) -> Result<(), MultigridError> {
        let mut covered = vec![false; self.n_global];
        for &(g, _) in self.copy_indices.iter().flatten() {
            covered[g] = true;
        }
        match (0..self.n_global).find(|&d| !covered[d] && !constraints.is_constrained(d)) {
            Some(dof) => Err(MultigridError::UncoveredDof(dof)),
            None => Ok(()),
        }
    }
}
