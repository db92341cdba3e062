//! Assembly of the constrained global system on the active mesh

use super::forms::{BilinearForm, LinearForm};
use crate::basis::{CellValues, FeQ1};
use crate::constraints::AffineConstraints;
use crate::dofs::DofHandler;
use crate::mesh::Triangulation;
use crate::quadrature::QGauss;
use ndarray::{Array1, Array2};
use solvers::parallel::parallel_map_indexed;
use solvers::{CsrMatrix, TripletMatrix};

/// Assembled global matrix and right-hand side
#[derive(Debug, Clone)]
pub struct SystemAssembly {
    pub matrix: CsrMatrix<f64>,
    pub rhs: Array1<f64>,
}

/// Cell matrices of `form` on `cells`, computed in parallel
pub(crate) fn local_matrices<B: BilinearForm + ?Sized>(
    tria: &Triangulation,
    cells: &[usize],
    form: &B,
    quadrature: &QGauss,
) -> Vec<Array2<f64>> {
    let fe = FeQ1::new(tria.dimension());
    parallel_map_indexed(cells.len(), |k| {
        let mut values = CellValues::new(fe, quadrature);
        values.reinit(&tria.cell_points(cells[k]));
        form.cell_matrix(&values)
    })
}

/// Assemble `form` and `source` over the active cells with `constraints`
/// condensed into the system
///
/// Constrained rows get a unit diagonal and a zero right-hand side; call
/// [`AffineConstraints::distribute`] on the solution afterwards.
pub fn assemble_system<B, L>(
    tria: &Triangulation,
    dofs: &DofHandler,
    constraints: &AffineConstraints,
    form: &B,
    source: &L,
    quadrature: &QGauss,
) -> SystemAssembly
where
    B: BilinearForm + ?Sized,
    L: LinearForm + ?Sized,
{
    let n = dofs.n_dofs();
    let cells: Vec<usize> = tria.active_cells().collect();
    let fe = FeQ1::new(tria.dimension());

    let contributions: Vec<(Array2<f64>, Array1<f64>)> =
        parallel_map_indexed(cells.len(), |k| {
            let mut values = CellValues::new(fe, quadrature);
            values.reinit(&tria.cell_points(cells[k]));
            (form.cell_matrix(&values), source.cell_vector(&values))
        });

    let mut triplets = TripletMatrix::new(n, n);
    let mut rhs = Array1::zeros(n);
    for (&cell, (local_matrix, local_rhs)) in cells.iter().zip(&contributions) {
        if let Some(cell_dofs) = dofs.cell_dof_indices(cell) {
            constraints.distribute_local_to_global(
                local_matrix,
                Some(local_rhs),
                cell_dofs,
                &mut triplets,
                Some(&mut rhs),
            );
        }
    }
    constraints.add_unit_diagonal(&mut triplets);
    let matrix = triplets.compress();

    log::debug!(
        "assembled system: {} DoFs, {} non-zeros, {} constraints",
        n,
        matrix.nnz(),
        constraints.n_constraints()
    );
    SystemAssembly { matrix, rhs }
}
