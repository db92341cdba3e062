//! Diagonal (Jacobi) preconditioner
//!
//! Scales by the damped inverse diagonal of A. Used directly as a
//! preconditioner and as the Jacobi relaxation inside multigrid smoothers.
//!
//! This preconditioner is embarrassingly parallel since it only involves
//! element-wise operations.

use crate::sparse::CsrMatrix;
use crate::traits::{Preconditioner, Scalar};
use ndarray::Array1;

#[cfg(feature = "native")]
use rayon::prelude::*;

/// Diagonal magnitude treated as a missing diagonal
const ZERO_DIAGONAL: f64 = 1e-30;

/// Diagonal (Jacobi) preconditioner
///
/// M^(-1) = ω diag(A)^(-1); rows with a vanishing diagonal are passed through
/// unscaled.
#[derive(Debug, Clone)]
pub struct DiagonalPreconditioner<T: Scalar> {
    /// Damped inverse diagonal elements
    inv_diag: Array1<T>,
    relaxation: T,
}

impl<T: Scalar> DiagonalPreconditioner<T> {
    /// Create a diagonal preconditioner from a CSR matrix
    pub fn from_csr(matrix: &CsrMatrix<T>) -> Self {
        Self::from_diagonal(&matrix.diagonal())
    }

    /// Create from a diagonal vector directly
    pub fn from_diagonal(diag: &Array1<T>) -> Self {
        let inv_diag = diag.mapv(|d| {
            if d.is_zero_approx(T::of(ZERO_DIAGONAL)) {
                T::one()
            } else {
                d.recip()
            }
        });
        Self {
            inv_diag,
            relaxation: T::one(),
        }
    }

    /// Damp the scaling by `omega`
    pub fn with_relaxation(mut self, omega: T) -> Self {
        self.relaxation = omega;
        self
    }

    fn apply_sequential(&self, r: &Array1<T>) -> Array1<T> {
        let omega = self.relaxation;
        r.iter()
            .zip(self.inv_diag.iter())
            .map(|(&ri, &di)| omega * ri * di)
            .collect()
    }

    #[cfg(feature = "native")]
    fn apply_parallel(&self, r: &Array1<T>) -> Array1<T> {
        let omega = self.relaxation;
        let results: Vec<T> = (0..r.len())
            .into_par_iter()
            .map(|i| omega * r[i] * self.inv_diag[i])
            .collect();
        Array1::from_vec(results)
    }
}

impl<T: Scalar> Preconditioner<T> for DiagonalPreconditioner<T> {
    fn apply(&self, r: &Array1<T>) -> Array1<T> {
        assert_eq!(r.len(), self.inv_diag.len(), "vector size mismatch");

        #[cfg(feature = "native")]
        {
            if r.len() >= 1000 {
                return self.apply_parallel(r);
            }
        }
        self.apply_sequential(r)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn test_diagonal_preconditioner() {
        let precond = DiagonalPreconditioner::from_diagonal(&array![2.0_f64, 4.0, 1.0]);
        let result = precond.apply(&array![2.0, 8.0, 3.0]);

        assert_relative_eq!(result[0], 1.0, epsilon = 1e-12);
        assert_relative_eq!(result[1], 2.0, epsilon = 1e-12);
        assert_relative_eq!(result[2], 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_diagonal_from_csr_with_relaxation() {
        let matrix = CsrMatrix::from_dense(&array![[4.0_f64, 1.0], [1.0, 2.0]], 1e-15);
        let precond = DiagonalPreconditioner::from_csr(&matrix).with_relaxation(0.5);

        let result = precond.apply(&array![4.0, 4.0]);
        assert_relative_eq!(result[0], 0.5, epsilon = 1e-12);
        assert_relative_eq!(result[1], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_zero_diagonal_passes_through() {
        let precond = DiagonalPreconditioner::from_diagonal(&array![0.0_f64, 2.0]);
        let result = precond.apply(&array![3.0, 4.0]);
        assert_relative_eq!(result[0], 3.0, epsilon = 1e-12);
        assert_relative_eq!(result[1], 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_parallel_path_matches_sequential() {
        let n = 1500;
        let diag = Array1::from_iter((0..n).map(|i| 1.0 + i as f64));
        let precond = DiagonalPreconditioner::from_diagonal(&diag).with_relaxation(0.8);
        let r = Array1::from_elem(n, 2.0_f64);
        let z = precond.apply(&r);
        for i in 0..n {
            assert_relative_eq!(z[i], 1.6 / (1.0 + i as f64), epsilon = 1e-14);
        }
    }
}
