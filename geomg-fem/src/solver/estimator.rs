//! Flux-recovery error indicator
//!
//! The discrete flux `a ∇u_h` jumps across cell faces. Averaging it at the
//! vertices (weighted by cell volume) gives a continuous recovered flux `G`;
//! the indicator of cell K is `η_K² = ∫_K a⁻¹ |G - a ∇u_h|²`.

use crate::assembly::Coefficient;
use crate::basis::{CellValues, FeQ1, Jacobian};
use crate::dofs::DofHandler;
use crate::mesh::Triangulation;
use crate::quadrature::QGauss;
use ndarray::Array1;
use solvers::parallel::parallel_map_indexed;

/// Reference coordinates of vertex `v`: bit `a` is the coordinate along axis `a`
fn reference_vertex(v: usize) -> [f64; 3] {
    [
        (v & 1) as f64,
        ((v >> 1) & 1) as f64,
        ((v >> 2) & 1) as f64,
    ]
}

/// Flux of one active cell at its vertices, with the cell volume and the
/// coefficient it was evaluated with
struct CellFlux {
    vertex_flux: Vec<[f64; 3]>,
    volume: f64,
    coefficient: f64,
}

/// Error indicator per active cell, in [`Triangulation::active_cells`] order
///
/// `solution` must hold the distributed solution, hanging values included.
pub fn estimate_error<C: Coefficient + ?Sized>(
    tria: &Triangulation,
    dofs: &DofHandler,
    solution: &Array1<f64>,
    coefficient: &C,
    quadrature: &QGauss,
) -> Vec<f64> {
    let dim = tria.dimension();
    let fe = FeQ1::new(dim);
    let cells: Vec<usize> = tria.active_cells().collect();
    let n_vertices = fe.dofs_per_cell();

    let local_values = |cell: usize| -> Vec<f64> {
        dofs.cell_dof_indices(cell)
            .map(|d| d.iter().map(|&i| solution[i]).collect())
            .unwrap_or_else(|| vec![0.0; n_vertices])
    };

    let fluxes: Vec<CellFlux> = parallel_map_indexed(cells.len(), |k| {
        let cell = cells[k];
        let points = tria.cell_points(cell);
        let u = local_values(cell);
        let a = coefficient.value(&tria.cell_center(cell));

        let vertex_flux = (0..n_vertices)
            .map(|v| {
                let jacobian = Jacobian::at(&fe, &points, &reference_vertex(v));
                let mut flux = [0.0; 3];
                for (i, &ui) in u.iter().enumerate() {
                    let g = jacobian.transform_gradient(&fe.shape_grad(i, &reference_vertex(v)));
                    for d in 0..dim {
                        flux[d] += a * ui * g[d];
                    }
                }
                flux
            })
            .collect();

        let mut values = CellValues::new(fe, quadrature);
        values.reinit(&points);
        let volume = (0..values.n_quadrature_points()).map(|q| values.jxw(q)).sum();
        CellFlux {
            vertex_flux,
            volume,
            coefficient: a,
        }
    });

    // volume-weighted average at every vertex
    let mut recovered = vec![[0.0; 3]; tria.n_vertices()];
    let mut weight = vec![0.0; tria.n_vertices()];
    for (&cell, flux) in cells.iter().zip(&fluxes) {
        for (v, &vertex) in tria.cell(cell).vertices.iter().enumerate() {
            for d in 0..dim {
                recovered[vertex][d] += flux.volume * flux.vertex_flux[v][d];
            }
            weight[vertex] += flux.volume;
        }
    }
    for (g, &w) in recovered.iter_mut().zip(&weight) {
        if w > 0.0 {
            g.iter_mut().for_each(|x| *x /= w);
        }
    }

    let indicators = parallel_map_indexed(cells.len(), |k| {
        let cell = cells[k];
        let u = local_values(cell);
        let a = fluxes[k].coefficient;
        let vertices = &tria.cell(cell).vertices;
        let mut values = CellValues::new(fe, quadrature);
        values.reinit(&tria.cell_points(cell));

        let mut eta_sqr = 0.0;
        for q in 0..values.n_quadrature_points() {
            let mut diff = [0.0; 3];
            for i in 0..n_vertices {
                let phi = values.shape_value(i, q);
                let grad = values.shape_grad(i, q);
                for d in 0..dim {
                    diff[d] += phi * recovered[vertices[i]][d] - a * u[i] * grad[d];
                }
            }
            let norm_sqr: f64 = diff.iter().map(|x| x * x).sum();
            eta_sqr += norm_sqr / a * values.jxw(q);
        }
        eta_sqr.sqrt()
    });

    log::debug!(
        "estimated error: {} cells, total {:.3e}",
        indicators.len(),
        indicators.iter().map(|e| e * e).sum::<f64>().sqrt()
    );
    indicators
}
