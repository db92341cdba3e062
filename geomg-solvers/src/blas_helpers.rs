//! Vector kernels shared by the solvers
//!
//! Plain Rust loops over `ndarray` storage; the compiler vectorises these well
//! enough for the level sizes multigrid works with.

use crate::traits::Scalar;
use ndarray::Array1;

/// Compute inner product (x, y) = Σ x_i * y_i
#[inline]
pub fn inner_product<T: Scalar>(x: &Array1<T>, y: &Array1<T>) -> T {
    assert_eq!(
        x.len(),
        y.len(),
        "Vector lengths must match for inner product"
    );
    x.iter()
        .zip(y.iter())
        .fold(T::zero(), |acc, (&xi, &yi)| acc + xi * yi)
}

/// Compute vector 2-norm: ||x||_2 = sqrt(Σ x_i^2)
#[inline]
pub fn vector_norm<T: Scalar>(x: &Array1<T>) -> T {
    vector_norm_sqr(x).sqrt()
}

/// Compute vector norm squared: ||x||_2^2 = Σ x_i^2
#[inline]
pub fn vector_norm_sqr<T: Scalar>(x: &Array1<T>) -> T {
    x.iter().fold(T::zero(), |acc, &xi| acc + xi * xi)
}

/// Compute axpy: y = α * x + y
#[inline]
pub fn axpy<T: Scalar>(alpha: T, x: &Array1<T>, y: &mut Array1<T>) {
    for (xi, yi) in x.iter().zip(y.iter_mut()) {
        *yi += alpha * *xi;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn test_inner_product_and_norm() {
        let x = array![3.0_f64, 4.0];
        let y = array![1.0_f64, -1.0];
        assert_relative_eq!(inner_product(&x, &y), -1.0);
        assert_relative_eq!(vector_norm(&x), 5.0);
        assert_relative_eq!(vector_norm_sqr(&x), 25.0);
    }

    #[test]
    fn test_axpy() {
        let x = array![1.0_f64, 2.0, 3.0];
        let mut y = array![1.0_f64, 1.0, 1.0];
        axpy(2.0, &x, &mut y);
        assert_eq!(y, array![3.0, 5.0, 7.0]);
    }
}
