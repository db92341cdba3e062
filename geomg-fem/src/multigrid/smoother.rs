//! Smoothers for multigrid methods
//!
//! Damped Jacobi and Gauss-Seidel relaxation on a level matrix. Gauss-Seidel
//! sweeps forward before the coarse-grid correction and backward after it, so
//! the V-cycle stays symmetric.

use ndarray::Array1;
use serde::{Deserialize, Serialize};
use solvers::{CsrMatrix, DiagonalPreconditioner, Preconditioner};

/// Smoother type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SmootherType {
    /// Damped Jacobi
    Jacobi,
    /// Gauss-Seidel, direction given by the V-cycle
    GaussSeidel,
    /// Symmetric Gauss-Seidel (forward then backward)
    SymmetricGaussSeidel,
}

/// Smoother configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmootherConfig {
    pub smoother_type: SmootherType,
    /// Number of smoothing steps
    pub steps: usize,
    /// Damping factor, used by Jacobi
    pub relaxation: f64,
}

impl Default for SmootherConfig {
    fn default() -> Self {
        Self {
            smoother_type: SmootherType::Jacobi,
            steps: 2,
            relaxation: 0.5,
        }
    }
}

/// Sweep order for Gauss-Seidel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepDirection {
    Forward,
    Backward,
}

/// Smoother bound to one level matrix
#[derive(Debug, Clone)]
pub struct LevelSmoother {
    config: SmootherConfig,
    jacobi: DiagonalPreconditioner<f64>,
}

impl LevelSmoother {
    pub fn new(matrix: &CsrMatrix<f64>, config: SmootherConfig) -> Self {
        Self {
            config,
            jacobi: DiagonalPreconditioner::from_csr(matrix).with_relaxation(config.relaxation),
        }
    }

    pub fn config(&self) -> &SmootherConfig {
        &self.config
    }

    /// Apply `steps` relaxation steps to `A x = b`, updating `x` in place
    pub fn smooth(
        &self,
        matrix: &CsrMatrix<f64>,
        x: &mut Array1<f64>,
        b: &Array1<f64>,
        direction: SweepDirection,
    ) {
        for _ in 0..self.config.steps {
            match self.config.smoother_type {
                SmootherType::Jacobi => {
                    let r = matrix.residual(x, b);
                    *x += &self.jacobi.apply(&r);
                }
                SmootherType::GaussSeidel => gauss_seidel_sweep(matrix, x, b, direction),
                SmootherType::SymmetricGaussSeidel => {
                    gauss_seidel_sweep(matrix, x, b, SweepDirection::Forward);
                    gauss_seidel_sweep(matrix, x, b, SweepDirection::Backward);
                }
            }
        }
    }
}

/// Single Gauss-Seidel sweep
fn gauss_seidel_sweep(
    matrix: &CsrMatrix<f64>,
    x: &mut Array1<f64>,
    b: &Array1<f64>,
    direction: SweepDirection,
) {
    let n = matrix.num_rows;
    let sweep_row = |i: usize, x: &mut Array1<f64>| {
        let mut diagonal = 0.0;
        let mut sigma = 0.0;
        for (j, a) in matrix.row_entries(i) {
            if j == i {
                diagonal += a;
            } else {
                sigma += a * x[j];
            }
        }
        // zero diagonal: leave the entry alone
        if diagonal != 0.0 {
            x[i] = (b[i] - sigma) / diagonal;
        }
    };
    match direction {
        SweepDirection::Forward => (0..n).for_each(|i| sweep_row(i, x)),
        SweepDirection::Backward => (0..n).rev().for_each(|i| sweep_row(i, x)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use solvers::TripletMatrix;
    use solvers::blas_helpers::vector_norm;

    /// 1D Laplacian with Dirichlet rows folded out
    fn laplacian_1d(n: usize) -> CsrMatrix<f64> {
        let mut t = TripletMatrix::new(n, n);
        for i in 0..n {
            t.add(i, i, 2.0);
            if i > 0 {
                t.add(i, i - 1, -1.0);
            }
            if i + 1 < n {
                t.add(i, i + 1, -1.0);
            }
        }
        t.compress()
    }

    #[test]
    fn test_all_smoothers_reduce_residual() {
        let matrix = laplacian_1d(20);
        let b = Array1::from_shape_fn(20, |i| ((i * 7) % 5) as f64 - 2.0);
        for smoother_type in [
            SmootherType::Jacobi,
            SmootherType::GaussSeidel,
            SmootherType::SymmetricGaussSeidel,
        ] {
            let smoother = LevelSmoother::new(
                &matrix,
                SmootherConfig {
                    smoother_type,
                    ..SmootherConfig::default()
                },
            );
            let mut x = Array1::zeros(20);
            let initial_norm = vector_norm(&matrix.residual(&x, &b));
            smoother.smooth(&matrix, &mut x, &b, SweepDirection::Forward);
            let final_norm = vector_norm(&matrix.residual(&x, &b));
            assert!(
                final_norm < initial_norm,
                "{smoother_type:?} should reduce the residual"
            );
        }
    }

    #[test]
    fn test_jacobi_step_from_zero() {
        let matrix = laplacian_1d(4);
        let smoother = LevelSmoother::new(
            &matrix,
            SmootherConfig {
                steps: 1,
                ..SmootherConfig::default()
            },
        );
        let b = Array1::from_elem(4, 1.0);
        let mut x = Array1::zeros(4);
        smoother.smooth(&matrix, &mut x, &b, SweepDirection::Forward);
        // x = ω D⁻¹ b = 0.5 * 1/2
        for v in x.iter() {
            assert!((v - 0.25).abs() < 1e-15);
        }
    }

    #[test]
    fn test_gauss_seidel_directions_differ() {
        let matrix = laplacian_1d(5);
        let config = SmootherConfig {
            smoother_type: SmootherType::GaussSeidel,
            steps: 1,
            relaxation: 1.0,
        };
        let smoother = LevelSmoother::new(&matrix, config);
        let b = Array1::from_elem(5, 1.0);

        let mut forward = Array1::zeros(5);
        smoother.smooth(&matrix, &mut forward, &b, SweepDirection::Forward);
        let mut backward = Array1::zeros(5);
        smoother.smooth(&matrix, &mut backward, &b, SweepDirection::Backward);

        assert!((forward[0] - 0.5).abs() < 1e-15);
        assert!((backward[4] - 0.5).abs() < 1e-15);
        // mirrored problem, mirrored result
        for i in 0..5 {
            assert!((forward[i] - backward[4 - i]).abs() < 1e-15);
        }
    }
}
