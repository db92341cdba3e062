//! Tensor-product Q1 Lagrange basis on the unit cell `[0, 1]^dim`
//!
//! Basis function `k` belongs to the vertex with lexicographic index `k`:
//! it equals 1 there and is the product of the 1D hat functions `x` or `1 - x`
//! selected by the bits of `k`.

use crate::mesh::ReferenceCell;

#[inline]
fn hat(vertex: usize, axis: usize, xi: &[f64; 3]) -> f64 {
    if ReferenceCell::vertex_bit(vertex, axis) == 1 {
        xi[axis]
    } else {
        1.0 - xi[axis]
    }
}

/// Value of the Q1 basis function of `vertex` at reference point `xi`
pub fn q1_value(dim: usize, vertex: usize, xi: &[f64; 3]) -> f64 {
    (0..dim).map(|axis| hat(vertex, axis, xi)).product()
}

/// Reference gradient of the Q1 basis function of `vertex` at `xi`
pub fn q1_gradient(dim: usize, vertex: usize, xi: &[f64; 3]) -> [f64; 3] {
    let mut grad = [0.0; 3];
    for (axis, g) in grad.iter_mut().enumerate().take(dim) {
        let slope = if ReferenceCell::vertex_bit(vertex, axis) == 1 {
            1.0
        } else {
            -1.0
        };
        *g = (0..dim)
            .filter(|&other| other != axis)
            .map(|other| hat(vertex, other, xi))
            .product::<f64>()
            * slope;
    }
    grad
}

/// Continuous Q1 element on quadrilaterals or hexahedra
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeQ1 {
    dim: usize,
}

impl FeQ1 {
    pub fn new(dim: usize) -> Self {
        Self { dim }
    }

    pub fn dimension(&self) -> usize {
        self.dim
    }

    /// Polynomial degree per direction
    pub fn degree(&self) -> usize {
        1
    }

    pub fn dofs_per_cell(&self) -> usize {
        1 << self.dim
    }

    pub fn shape_value(&self, i: usize, xi: &[f64; 3]) -> f64 {
        q1_value(self.dim, i, xi)
    }

    pub fn shape_grad(&self, i: usize, xi: &[f64; 3]) -> [f64; 3] {
        q1_gradient(self.dim, i, xi)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_q1_kronecker_property() {
        for dim in [2, 3] {
            let fe = FeQ1::new(dim);
            let reference = ReferenceCell::for_dimension(dim).expect("supported");
            for i in 0..fe.dofs_per_cell() {
                for j in 0..fe.dofs_per_cell() {
                    let xi = reference.vertex_coordinates(j);
                    let expected = if i == j { 1.0 } else { 0.0 };
                    assert_relative_eq!(fe.shape_value(i, &xi), expected);
                }
            }
        }
    }

    #[test]
    fn test_partition_of_unity() {
        let xi = [0.3, 0.7, 0.2];
        for dim in [2, 3] {
            let fe = FeQ1::new(dim);
            let sum: f64 = (0..fe.dofs_per_cell()).map(|i| fe.shape_value(i, &xi)).sum();
            assert_relative_eq!(sum, 1.0, epsilon = 1e-14);

            let mut grad_sum = [0.0; 3];
            for i in 0..fe.dofs_per_cell() {
                let g = fe.shape_grad(i, &xi);
                for a in 0..3 {
                    grad_sum[a] += g[a];
                }
            }
            for g in grad_sum {
                assert_relative_eq!(g, 0.0, epsilon = 1e-14);
            }
        }
    }

    #[test]
    fn test_gradient_matches_finite_difference() {
        let fe = FeQ1::new(3);
        let xi = [0.25, 0.6, 0.4];
        let h = 1e-6;
        for i in 0..8 {
            let g = fe.shape_grad(i, &xi);
            for axis in 0..3 {
                let mut plus = xi;
                let mut minus = xi;
                plus[axis] += h;
                minus[axis] -= h;
                let fd = (fe.shape_value(i, &plus) - fe.shape_value(i, &minus)) / (2.0 * h);
                assert_relative_eq!(g[axis], fd, epsilon = 1e-8);
            }
        }
    }
}
