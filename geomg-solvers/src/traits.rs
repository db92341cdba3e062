//! Core traits for the linear algebra layer
//!
//! These traits let the Krylov solvers and the multigrid preconditioner work
//! with assembled sparse matrices, lazy views and matrix-free operators
//! interchangeably.

use ndarray::Array1;
use num_traits::{Float, FromPrimitive, NumAssign, ToPrimitive};
use std::fmt::Debug;
use std::iter::Sum;

/// Real floating-point field used for matrix entries and vectors.
///
/// Implemented for `f64` and `f32`.
pub trait Scalar:
    Float + NumAssign + FromPrimitive + ToPrimitive + Sum + Debug + Send + Sync + 'static
{
    /// Convert an `f64` constant into this field
    fn of(value: f64) -> Self;

    /// Whether the magnitude of `self` is below `tol`
    #[inline]
    fn is_zero_approx(&self, tol: Self) -> bool {
        self.abs() < tol
    }
}

impl Scalar for f64 {
    #[inline]
    fn of(value: f64) -> Self {
        value
    }
}

impl Scalar for f32 {
    #[inline]
    fn of(value: f64) -> Self {
        value as f32
    }
}

/// Trait for linear operators (matrices) that can perform matrix-vector products.
pub trait LinearOperator<T: Scalar>: Send + Sync {
    /// Number of rows in the operator
    fn num_rows(&self) -> usize;

    /// Number of columns in the operator
    fn num_cols(&self) -> usize;

    /// Apply the operator: y = A * x
    fn apply(&self, x: &Array1<T>) -> Array1<T>;

    /// Apply the transpose: y = A^T * x
    fn apply_transpose(&self, x: &Array1<T>) -> Array1<T>;

    /// Check if the operator is square
    fn is_square(&self) -> bool {
        self.num_rows() == self.num_cols()
    }
}

/// Trait for preconditioners used in iterative solvers.
///
/// A preconditioner M approximates A^(-1), so that M*A is better conditioned
/// than A alone. Implementations must be linear and must not keep state
/// between applications.
pub trait Preconditioner<T: Scalar>: Send + Sync {
    /// Apply the preconditioner: y = M * r
    fn apply(&self, r: &Array1<T>) -> Array1<T>;
}

/// Identity preconditioner (no preconditioning)
#[derive(Clone, Debug, Default)]
pub struct IdentityPreconditioner;

impl<T: Scalar> Preconditioner<T> for IdentityPreconditioner {
    fn apply(&self, r: &Array1<T>) -> Array1<T> {
        r.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn test_scalar_conversion() {
        assert_relative_eq!(<f64 as Scalar>::of(0.25), 0.25);
        assert_relative_eq!(<f32 as Scalar>::of(0.5), 0.5_f32);
        assert!(1e-12_f64.is_zero_approx(1e-10));
        assert!(!(-1e-3_f64).is_zero_approx(1e-10));
    }

    #[test]
    fn test_identity_preconditioner() {
        let r = array![1.0_f64, -2.0, 3.5];
        let z = Preconditioner::<f64>::apply(&IdentityPreconditioner, &r);
        assert_eq!(z, r);
    }
}
