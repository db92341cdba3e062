//! Coarse-grid solver
//!
//! CG to a tight relative tolerance, or a dense LU factorization computed once
//! per hierarchy. Non-convergence is reported, never raised.

use crate::error::MultigridError;
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use solvers::blas_helpers::vector_norm;
use solvers::{CgConfig, CsrMatrix, LuFactorization, cg, lu_factorize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoarseSolverType {
    /// Unpreconditioned conjugate gradients
    ConjugateGradient,
    /// Dense LU with partial pivoting
    Direct,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoarseSolverConfig {
    pub solver_type: CoarseSolverType,
    pub max_iterations: usize,
    /// Relative residual target; a direct solve above it is reported as unconverged
    pub tolerance: f64,
}

impl Default for CoarseSolverConfig {
    fn default() -> Self {
        Self {
            solver_type: CoarseSolverType::ConjugateGradient,
            max_iterations: 1000,
            tolerance: 1e-10,
        }
    }
}

/// Outcome of one coarse solve
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CoarseSolveReport {
    pub iterations: usize,
    /// Relative residual achieved
    pub residual: f64,
    pub converged: bool,
}

#[derive(Debug, Clone)]
pub enum CoarseSolver {
    Iterative {
        matrix: CsrMatrix<f64>,
        config: CgConfig<f64>,
    },
    Direct {
        matrix: CsrMatrix<f64>,
        factorization: LuFactorization<f64>,
        tolerance: f64,
    },
}

impl CoarseSolver {
    pub fn new(matrix: &CsrMatrix<f64>, config: &CoarseSolverConfig) -> Result<Self, MultigridError> {
        Ok(match config.solver_type {
            CoarseSolverType::ConjugateGradient => Self::Iterative {
                matrix: matrix.clone(),
                config: CgConfig {
                    max_iterations: config.max_iterations,
                    tolerance: config.tolerance,
                    print_interval: 0,
                },
            },
            CoarseSolverType::Direct => Self::Direct {
                matrix: matrix.clone(),
                factorization: lu_factorize(&matrix.to_dense())?,
                tolerance: config.tolerance,
            },
        })
    }

    /// Solve the coarse system for `rhs`
    ///
    /// An unconverged or failed solve still returns its best iterate together
    /// with a report that says so.
    pub fn solve(&self, rhs: &Array1<f64>) -> (Array1<f64>, CoarseSolveReport) {
        match self {
            Self::Iterative { matrix, config } => {
                let solution = cg(matrix, rhs, config);
                let report = CoarseSolveReport {
                    iterations: solution.iterations,
                    residual: solution.residual,
                    converged: solution.converged,
                };
                (solution.x, report)
            }
            Self::Direct {
                matrix,
                factorization,
                tolerance,
            } => match factorization.solve(rhs) {
                Ok(x) => {
                    let b_norm = vector_norm(rhs);
                    let residual = if b_norm > 0.0 {
                        vector_norm(&matrix.residual(&x, rhs)) / b_norm
                    } else {
                        0.0
                    };
                    let report = CoarseSolveReport {
                        iterations: 1,
                        residual,
                        converged: residual <= *tolerance,
                    };
                    (x, report)
                }
                Err(e) => {
                    log::warn!("coarse direct solve failed: {}", e);
                    let report = CoarseSolveReport {
                        iterations: 0,
                        residual: f64::INFINITY,
                        converged: false,
                    };
                    (Array1::zeros(rhs.len()), report)
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use solvers::TripletMatrix;

    fn spd(n: usize) -> CsrMatrix<f64> {
        let mut t = TripletMatrix::new(n, n);
        for i in 0..n {
            t.add(i, i, 4.0);
            if i > 0 {
                t.add(i, i - 1, -1.0);
                t.add(i - 1, i, -1.0);
            }
        }
        t.compress()
    }

    #[test]
    fn test_cg_and_direct_agree() {
        let matrix = spd(12);
        let rhs = Array1::from_shape_fn(12, |i| 1.0 + i as f64);

        let cg_solver = CoarseSolver::new(&matrix, &CoarseSolverConfig::default()).expect("cg");
        let (x_cg, report_cg) = cg_solver.solve(&rhs);
        assert!(report_cg.converged);
        assert!(report_cg.residual < 1e-10);

        let direct = CoarseSolver::new(
            &matrix,
            &CoarseSolverConfig {
                solver_type: CoarseSolverType::Direct,
                ..CoarseSolverConfig::default()
            },
        )
        .expect("factorizable");
        let (x_lu, report_lu) = direct.solve(&rhs);
        assert!(report_lu.converged);
        for i in 0..12 {
            assert_relative_eq!(x_cg[i], x_lu[i], epsilon = 1e-8);
        }
    }

    #[test]
    fn test_budget_exhaustion_is_reported() {
        let matrix = spd(30);
        let rhs = Array1::from_shape_fn(30, |i| (i as f64).sin());
        let solver = CoarseSolver::new(
            &matrix,
            &CoarseSolverConfig {
                max_iterations: 2,
                ..CoarseSolverConfig::default()
            },
        )
        .expect("cg");
        let (x, report) = solver.solve(&rhs);
        assert!(!report.converged);
        assert_eq!(report.iterations, 2);
        assert!(report.residual > 1e-10);
        assert_eq!(x.len(), 30);
    }

    fn direct_config() -> CoarseSolverConfig {
        CoarseSolverConfig {
            solver_type: CoarseSolverType::Direct,
            ..CoarseSolverConfig::default()
        }
    }

    #[test]
    fn test_direct_solve_with_pivot_cycle() {
        // partial pivoting permutes the rows as a 3-cycle
        let mut t = TripletMatrix::new(3, 3);
        let entries = [
            (0, 1, 2.0),
            (0, 2, 1.0),
            (1, 0, 1.0),
            (1, 1, 1.0),
            (2, 0, 2.0),
            (2, 2, 3.0),
        ];
        for (i, j, v) in entries {
            t.add(i, j, v);
        }
        let matrix = t.compress();
        let x_true = Array1::from(vec![1.0, -2.0, 0.5]);
        let rhs = matrix.matvec(&x_true);

        let solver = CoarseSolver::new(&matrix, &direct_config()).expect("factorizable");
        let (x, report) = solver.solve(&rhs);
        assert!(report.converged, "{report:?}");
        assert!(report.residual < 1e-14);
        for i in 0..3 {
            assert_relative_eq!(x[i], x_true[i], epsilon = 1e-12);
        }
    }

    #[test]
    fn test_direct_residual_above_tolerance_is_unconverged() {
        // factorization of a different operator leaves a large residual
        let matrix = spd(6);
        let mut shifted = matrix.to_dense();
        for i in 0..6 {
            shifted[[i, i]] += 3.0;
        }
        let solver = CoarseSolver::Direct {
            matrix,
            factorization: lu_factorize(&shifted).expect("factorizable"),
            tolerance: 1e-10,
        };
        let (x, report) = solver.solve(&Array1::ones(6));
        assert!(!report.converged);
        assert_eq!(report.iterations, 1);
        assert!(report.residual > 0.1, "{report:?}");
        assert!(x.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_singular_direct_setup_is_configuration_error() {
        let matrix = CsrMatrix::<f64>::new(3, 3);
        let err = CoarseSolver::new(
            &matrix,
            &CoarseSolverConfig {
                solver_type: CoarseSolverType::Direct,
                ..CoarseSolverConfig::default()
            },
        )
        .unwrap_err();
        assert!(matches!(err, MultigridError::CoarseFactorization(_)));
    }
}
