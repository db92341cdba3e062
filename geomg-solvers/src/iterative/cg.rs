//! CG (Conjugate Gradient) solver
//!
//! The Conjugate Gradient method for symmetric positive definite systems,
//! with an optional preconditioner that must itself be symmetric positive
//! (semi)definite.

use crate::blas_helpers::{axpy, inner_product, vector_norm};
use crate::traits::{IdentityPreconditioner, LinearOperator, Preconditioner, Scalar};
use ndarray::Array1;

/// CG solver configuration
#[derive(Debug, Clone)]
pub struct CgConfig<R> {
    /// Maximum number of iterations
    pub max_iterations: usize,
    /// Relative tolerance for convergence (||r|| / ||b||)
    pub tolerance: R,
    /// Print progress every N iterations (0 = no output)
    pub print_interval: usize,
}

impl Default for CgConfig<f64> {
    fn default() -> Self {
        Self {
            max_iterations: 1000,
            tolerance: 1e-6,
            print_interval: 0,
        }
    }
}

/// CG solver result
#[derive(Debug)]
pub struct CgSolution<T: Scalar> {
    /// Solution vector
    pub x: Array1<T>,
    /// Number of iterations
    pub iterations: usize,
    /// Final relative residual
    pub residual: T,
    /// Whether convergence was achieved
    pub converged: bool,
}

/// Solve Ax = b using the Conjugate Gradient method
///
/// Note: This method is only correct for symmetric positive definite matrices.
pub fn cg<T, A>(operator: &A, b: &Array1<T>, config: &CgConfig<T>) -> CgSolution<T>
where
    T: Scalar,
    A: LinearOperator<T> + ?Sized,
{
    pcg(operator, &IdentityPreconditioner, b, None, config)
}

/// Solve Ax = b with preconditioned CG, starting from `x0` (zero if `None`)
///
/// A zero right-hand side returns the initial guess immediately, so a zero
/// `b` with no initial guess gives exactly the zero vector.
pub fn pcg<T, A, P>(
    operator: &A,
    preconditioner: &P,
    b: &Array1<T>,
    x0: Option<&Array1<T>>,
    config: &CgConfig<T>,
) -> CgSolution<T>
where
    T: Scalar,
    A: LinearOperator<T> + ?Sized,
    P: Preconditioner<T> + ?Sized,
{
    let n = b.len();
    let mut x = match x0 {
        Some(guess) => guess.clone(),
        None => Array1::from_elem(n, T::zero()),
    };

    let b_norm = vector_norm(b);
    if b_norm == T::zero() {
        return CgSolution {
            x,
            iterations: 0,
            residual: T::zero(),
            converged: true,
        };
    }

    let mut r = match x0 {
        Some(_) => b - &operator.apply(&x),
        None => b.clone(),
    };
    let mut rel_residual = vector_norm(&r) / b_norm;
    if rel_residual < config.tolerance {
        return CgSolution {
            x,
            iterations: 0,
            residual: rel_residual,
            converged: true,
        };
    }

    let mut z = preconditioner.apply(&r);
    let mut p = z.clone();
    let mut rz = inner_product(&r, &z);

    for iter in 0..config.max_iterations {
        let q = operator.apply(&p);
        let pq = inner_product(&p, &q);
        if pq <= T::zero() {
            log::warn!(
                "CG breakdown at iteration {}: (p, Ap) = {:.3e}",
                iter,
                pq.to_f64().unwrap_or(f64::NAN)
            );
            return CgSolution {
                x,
                iterations: iter,
                residual: rel_residual,
                converged: false,
            };
        }

        let alpha = rz / pq;
        axpy(alpha, &p, &mut x);
        axpy(-alpha, &q, &mut r);

        rel_residual = vector_norm(&r) / b_norm;

        if config.print_interval > 0 && (iter + 1) % config.print_interval == 0 {
            log::info!(
                "CG iteration {}: relative residual = {:.6e}",
                iter + 1,
                rel_residual.to_f64().unwrap_or(0.0)
            );
        }

        if rel_residual < config.tolerance {
            return CgSolution {
                x,
                iterations: iter + 1,
                residual: rel_residual,
                converged: true,
            };
        }

        z = preconditioner.apply(&r);
        let rz_new = inner_product(&r, &z);
        let beta = rz_new / rz;
        rz = rz_new;

        // p = z + beta * p
        p = &z + &p.mapv(|pi| pi * beta);
    }

    CgSolution {
        x,
        iterations: config.max_iterations,
        residual: rel_residual,
        converged: false,
    }
}
