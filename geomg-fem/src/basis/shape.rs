//! Mapped shape functions on physical cells
//!
//! [`CellValues`] evaluates the Q1 basis at the points of a quadrature rule
//! on one multilinear cell: shape values, physical gradients and `JxW`.

use super::lagrange::FeQ1;
use crate::mesh::Point;
use crate::quadrature::QGauss;

/// Jacobian matrix for coordinate transformation
/// Maps reference cell coordinates to physical coordinates
#[derive(Debug, Clone, Copy)]
pub struct Jacobian {
    /// Entries `matrix[a][b] = dx_a / dxi_b`; unused rows/columns are zero
    pub matrix: [[f64; 3]; 3],
    /// Determinant of Jacobian
    pub det: f64,
    /// Inverse of Jacobian (for gradient transformation)
    pub inverse: [[f64; 3]; 3],
    dim: usize,
}

impl Jacobian {
    /// Jacobian of the multilinear map through `vertices` at reference point `xi`
    pub fn at(fe: &FeQ1, vertices: &[Point], xi: &[f64; 3]) -> Self {
        let dim = fe.dimension();
        let mut j = [[0.0; 3]; 3];
        for (k, vertex) in vertices.iter().enumerate() {
            let g = fe.shape_grad(k, xi);
            for (a, row) in j.iter_mut().enumerate().take(dim) {
                for (b, entry) in row.iter_mut().enumerate().take(dim) {
                    *entry += vertex.coord(a) * g[b];
                }
            }
        }

        let mut inverse = [[0.0; 3]; 3];
        let det;
        if dim == 2 {
            det = j[0][0] * j[1][1] - j[0][1] * j[1][0];
            let inv_det = 1.0 / det;
            inverse[0][0] = j[1][1] * inv_det;
            inverse[0][1] = -j[0][1] * inv_det;
            inverse[1][0] = -j[1][0] * inv_det;
            inverse[1][1] = j[0][0] * inv_det;
        } else {
            det = j[0][0] * (j[1][1] * j[2][2] - j[1][2] * j[2][1])
                - j[0][1] * (j[1][0] * j[2][2] - j[1][2] * j[2][0])
                + j[0][2] * (j[1][0] * j[2][1] - j[1][1] * j[2][0]);
            let inv_det = 1.0 / det;
            for a in 0..3 {
                for b in 0..3 {
                    // cofactor of (b, a), transposed into (a, b)
                    let (r0, r1) = ((b + 1) % 3, (b + 2) % 3);
                    let (c0, c1) = ((a + 1) % 3, (a + 2) % 3);
                    inverse[a][b] = (j[r0][c0] * j[r1][c1] - j[r0][c1] * j[r1][c0]) * inv_det;
                }
            }
        }

        Self {
            matrix: j,
            det,
            inverse,
            dim,
        }
    }

    /// Map a reference gradient to physical coordinates: J^{-T} ∇ξ
    pub fn transform_gradient(&self, grad_ref: &[f64; 3]) -> [f64; 3] {
        let mut grad = [0.0; 3];
        for (a, g) in grad.iter_mut().enumerate().take(self.dim) {
            *g = (0..self.dim)
                .map(|b| self.inverse[b][a] * grad_ref[b])
                .sum();
        }
        grad
    }
}

/// Shape function data on one cell at the points of a quadrature rule
#[derive(Debug, Clone)]
pub struct CellValues {
    fe: FeQ1,
    quadrature: QGauss,
    /// `values[q][i]`, independent of the cell
    values: Vec<Vec<f64>>,
    /// `ref_grads[q][i]`, independent of the cell
    ref_grads: Vec<Vec<[f64; 3]>>,
    grads: Vec<Vec<[f64; 3]>>,
    jxw: Vec<f64>,
    points: Vec<Point>,
}

impl CellValues {
    pub fn new(fe: FeQ1, quadrature: &QGauss) -> Self {
        let n = fe.dofs_per_cell();
        let values = quadrature
            .points()
            .iter()
            .map(|q| (0..n).map(|i| fe.shape_value(i, &q.coords)).collect())
            .collect();
        let ref_grads: Vec<Vec<[f64; 3]>> = quadrature
            .points()
            .iter()
            .map(|q| (0..n).map(|i| fe.shape_grad(i, &q.coords)).collect())
            .collect();
        let n_q = quadrature.len();
        Self {
            fe,
            quadrature: quadrature.clone(),
            values,
            grads: ref_grads.clone(),
            ref_grads,
            jxw: vec![0.0; n_q],
            points: vec![Point::default(); n_q],
        }
    }

    /// Recompute mapped quantities for the cell with the given vertices
    pub fn reinit(&mut self, vertices: &[Point]) {
        let n = self.fe.dofs_per_cell();
        for (q, qp) in self.quadrature.points().iter().enumerate() {
            let jacobian = Jacobian::at(&self.fe, vertices, &qp.coords);
            self.jxw[q] = jacobian.det * qp.weight;
            for i in 0..n {
                self.grads[q][i] = jacobian.transform_gradient(&self.ref_grads[q][i]);
            }
            let mut x = Point::default();
            for (i, vertex) in vertices.iter().enumerate() {
                let phi = self.values[q][i];
                x.x += phi * vertex.x;
                x.y += phi * vertex.y;
                x.z += phi * vertex.z;
            }
            self.points[q] = x;
        }
    }

    pub fn dofs_per_cell(&self) -> usize {
        self.fe.dofs_per_cell()
    }

    pub fn n_quadrature_points(&self) -> usize {
        self.quadrature.len()
    }

    pub fn dimension(&self) -> usize {
        self.fe.dimension()
    }

    #[inline]
    pub fn shape_value(&self, i: usize, q: usize) -> f64 {
        self.values[q][i]
    }

    /// Physical gradient of shape function `i` at quadrature point `q`
    #[inline]
    pub fn shape_grad(&self, i: usize, q: usize) -> &[f64; 3] {
        &self.grads[q][i]
    }

    /// Determinant times quadrature weight
    #[inline]
    pub fn jxw(&self, q: usize) -> f64 {
        self.jxw[q]
    }

    /// Mapped quadrature point
    #[inline]
    pub fn quadrature_point(&self, q: usize) -> &Point {
        &self.points[q]
    }
}
