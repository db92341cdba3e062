//! Lazy transposed view
//!
//! Wraps a borrowed operator and swaps `apply` and `apply_transpose`, so the
//! transpose of an assembled matrix can be applied without storing it.

use crate::traits::{LinearOperator, Scalar};
use ndarray::Array1;

/// Transposed view of an operator
#[derive(Debug)]
pub struct Transposed<'a, A: ?Sized> {
    inner: &'a A,
}

impl<'a, A: ?Sized> Transposed<'a, A> {
    /// View `inner` as its transpose
    pub fn new(inner: &'a A) -> Self {
        Self { inner }
    }

    /// The wrapped operator
    pub fn inner(&self) -> &'a A {
        self.inner
    }
}

impl<T: Scalar, A: LinearOperator<T> + ?Sized> LinearOperator<T> for Transposed<'_, A> {
    fn num_rows(&self) -> usize {
        self.inner.num_cols()
    }

    fn num_cols(&self) -> usize {
        self.inner.num_rows()
    }

    fn apply(&self, x: &Array1<T>) -> Array1<T> {
        self.inner.apply_transpose(x)
    }

    fn apply_transpose(&self, x: &Array1<T>) -> Array1<T> {
        self.inner.apply(x)
    }
}
