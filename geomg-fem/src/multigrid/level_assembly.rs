//! Level matrices and interface matrices
//!
//! Every cell of a level contributes, active or not. The level matrix is the
//! form with boundary and refinement-edge DoFs eliminated (unit diagonal);
//! the interface matrix keeps only the couplings from refinement-edge rows to
//! interior columns. The opposite direction is its transpose and is never
//! stored.

use super::constrained_dofs::MgConstrainedDofs;
use crate::assembly::{BilinearForm, local_matrices};
use crate::constraints::AffineConstraints;
use crate::dofs::DofHandler;
use crate::mesh::Triangulation;
use crate::quadrature::QGauss;
use ndarray::Array2;
use solvers::{CsrMatrix, TripletMatrix};

/// Whether local entry `(i, j)` belongs to the interface matrix
///
/// `i` must be on the refinement edge and `j` off it; boundary DoFs may only
/// contribute on the diagonal.
#[inline]
pub fn interface_entry_kept(
    edge_i: bool,
    edge_j: bool,
    boundary_i: bool,
    boundary_j: bool,
    same_dof: bool,
) -> bool {
    edge_i && !edge_j && ((!boundary_i && !boundary_j) || (boundary_i && same_dof))
}

/// Zero every entry of a cell matrix that the interface matrix does not keep
pub fn filter_interface_matrix(
    local: &Array2<f64>,
    level_dofs: &[usize],
    level: usize,
    mg: &MgConstrainedDofs,
) -> Array2<f64> {
    let edge: Vec<bool> = level_dofs
        .iter()
        .map(|&d| mg.at_refinement_edge(level, d))
        .collect();
    let boundary: Vec<bool> = level_dofs
        .iter()
        .map(|&d| mg.is_boundary_index(level, d))
        .collect();

    let mut filtered = local.clone();
    for ((i, j), value) in filtered.indexed_iter_mut() {
        let same_dof = level_dofs[i] == level_dofs[j];
        if !interface_entry_kept(edge[i], edge[j], boundary[i], boundary[j], same_dof) {
            *value = 0.0;
        }
    }
    filtered
}

/// Per-level operators, indexed by level
#[derive(Debug, Clone)]
pub struct LevelOperators {
    pub matrices: Vec<CsrMatrix<f64>>,
    pub interface: Vec<CsrMatrix<f64>>,
}

/// Assemble the level and interface matrices of all levels
///
/// All contributions are scattered into accumulators first; the matrices are
/// compressed only once every level has been assembled.
pub fn assemble_level_operators<B: BilinearForm + ?Sized>(
    tria: &Triangulation,
    dofs: &DofHandler,
    mg: &MgConstrainedDofs,
    form: &B,
    quadrature: &QGauss,
) -> LevelOperators {
    let n_levels = tria.n_levels();
    let no_constraints = AffineConstraints::new();
    let mut level_acc = Vec::with_capacity(n_levels);
    let mut interface_acc = Vec::with_capacity(n_levels);

    for level in 0..n_levels {
        let n = dofs.n_level_dofs(level);
        let cells = tria.level_cells(level);
        let constraints = mg.level_constraints(level);
        let mut matrix = TripletMatrix::new(n, n);
        let mut interface = TripletMatrix::new(n, n);

        let locals = local_matrices(tria, cells, form, quadrature);
        for (&cell, local) in cells.iter().zip(&locals) {
            let level_dofs = dofs.cell_level_dof_indices(cell);
            constraints.distribute_local_to_global(local, None, level_dofs, &mut matrix, None);

            let filtered = filter_interface_matrix(local, level_dofs, level, mg);
            no_constraints.distribute_local_to_global(
                &filtered,
                None,
                level_dofs,
                &mut interface,
                None,
            );
        }
        constraints.add_unit_diagonal(&mut matrix);

        log::debug!(
            "level {}: {} cells, {} DoFs, {} constrained",
            level,
            cells.len(),
            n,
            constraints.n_constraints()
        );
        level_acc.push(matrix);
        interface_acc.push(interface);
    }

    LevelOperators {
        matrices: level_acc.into_iter().map(TripletMatrix::compress).collect(),
        interface: interface_acc.into_iter().map(TripletMatrix::compress).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interface_predicate() {
        // edge row, interior column
        assert!(interface_entry_kept(true, false, false, false, false));
        // wrong direction or both on the edge
        assert!(!interface_entry_kept(false, true, false, false, false));
        assert!(!interface_entry_kept(true, true, false, false, false));
        // boundary on either side blocks off-diagonal couplings
        assert!(!interface_entry_kept(true, false, true, false, false));
        assert!(!interface_entry_kept(true, false, false, true, false));
        assert!(!interface_entry_kept(true, false, true, true, false));
        // the boundary diagonal branch
        assert!(interface_entry_kept(true, false, true, false, true));
        assert!(interface_entry_kept(true, false, true, true, true));
    }

    #[test]
    fn test_filter_keeps_edge_to_interior_only() {
        use crate::mesh::hyper_cube;
        use std::collections::BTreeSet;

        let mut tria = hyper_cube(2, 0.0, 1.0).expect("valid mesh");
        tria.refine_global(1);
        let first_child = tria.cell(0).children.clone().expect("refined")[0];
        tria.execute_refinement(&[first_child]).expect("active cell");
        let dofs = DofHandler::distribute(&tria);
        let mut mg = MgConstrainedDofs::initialize(&tria, &dofs).expect("consistent");
        mg.make_zero_boundary_constraints(&tria, &dofs, &BTreeSet::from([0]))
            .expect("known id");

        let local = Array2::from_elem((4, 4), 1.0);
        for &cell in tria.level_cells(2) {
            let level_dofs = dofs.cell_level_dof_indices(cell);
            let filtered = filter_interface_matrix(&local, level_dofs, 2, &mg);
            for ((i, j), &v) in filtered.indexed_iter() {
                if v != 0.0 {
                    assert!(mg.at_refinement_edge(2, level_dofs[i]));
                    assert!(!mg.at_refinement_edge(2, level_dofs[j]));
                    assert!(!mg.is_boundary_index(2, level_dofs[i]));
                    assert!(!mg.is_boundary_index(2, level_dofs[j]));
                }
            }
        }
    }
}
