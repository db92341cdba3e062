//! Full solves through the Laplace driver

use geomg_fem::multigrid::{CoarseSolverType, SmootherType};
use geomg_fem::{LaplaceConfig, LaplaceProblem, SolverError};
use ndarray::Array1;
use std::collections::HashMap;

fn max_abs_diff(a: &Array1<f64>, b: &Array1<f64>) -> f64 {
    a.iter()
        .zip(b.iter())
        .fold(0.0_f64, |m, (x, y)| m.max((x - y).abs()))
}

fn setup_and_solve(problem: &mut LaplaceProblem) -> geomg_fem::SolveReport {
    problem.setup_system();
    problem.assemble_system().expect("assembled");
    problem.assemble_multigrid().expect("hierarchy");
    problem.solve().expect("converged")
}

/// Coefficient jump on the unit square, four global refinements
#[test]
fn coefficient_jump_benchmark_converges_fast_and_matches_direct_solve() {
    let mut problem = LaplaceProblem::new(LaplaceConfig::default()).expect("valid config");
    let report = setup_and_solve(&mut problem);
    assert_eq!(problem.triangulation().n_active_cells(), 256);
    assert_eq!(problem.dofs().expect("dofs").n_dofs(), 289);
    assert!(report.iterations < 20, "{} iterations", report.iterations);
    assert!(report.residual < 1e-8);

    let direct = problem.solve_direct().expect("factorizable");
    let diff = max_abs_diff(problem.solution(), &direct);
    assert!(diff < 1e-6, "max difference {diff:e}");
}

#[test]
fn solution_is_symmetric_about_the_diagonal() {
    let mut problem = LaplaceProblem::new(LaplaceConfig::default()).expect("valid config");
    setup_and_solve(&mut problem);

    let tria = problem.triangulation();
    let dofs = problem.dofs().expect("dofs");
    let key = |x: f64, y: f64| ((x * 16.0).round() as i64, (y * 16.0).round() as i64);
    let by_position: HashMap<(i64, i64), f64> = (0..dofs.n_dofs())
        .map(|d| {
            let p = tria.vertex(dofs.dof_vertex(d));
            (key(p.x, p.y), problem.solution()[d])
        })
        .collect();
    for (&(i, j), &value) in &by_position {
        let mirrored = by_position[&(j, i)];
        assert!((value - mirrored).abs() < 1e-6, "({i}, {j})");
    }
}

#[test]
fn adaptive_cycles_keep_iteration_counts_low() {
    let mut problem = LaplaceProblem::new(LaplaceConfig {
        cycles: 4,
        ..LaplaceConfig::default()
    })
    .expect("valid config");
    let reports = problem.run().expect("all cycles converge");
    assert_eq!(reports.len(), 4);

    for pair in reports.windows(2) {
        assert!(pair[1].n_active_cells > pair[0].n_active_cells);
        assert!(pair[1].level_dofs.len() >= pair[0].level_dofs.len());
    }
    for report in &reports {
        assert!(report.solve.residual < 1e-8);
        assert!(report.solve.iterations < 30, "{report:?}");
    }
    // local refinement created levels beyond the uniform ones
    assert!(reports[3].level_dofs.len() > 5);
}

#[test]
fn adaptive_mesh_matches_direct_solve() {
    let mut problem = LaplaceProblem::new(LaplaceConfig {
        initial_refinements: 3,
        ..LaplaceConfig::default()
    })
    .expect("valid config");
    setup_and_solve(&mut problem);
    problem.refine_grid().expect("refined");
    setup_and_solve(&mut problem);
    assert!(!problem.constraints().is_empty());

    let direct = problem.solve_direct().expect("factorizable");
    let diff = max_abs_diff(problem.solution(), &direct);
    assert!(diff < 1e-6, "max difference {diff:e}");
}

#[test]
fn all_smoother_and_coarse_solver_combinations_converge() {
    for smoother_type in [
        SmootherType::Jacobi,
        SmootherType::GaussSeidel,
        SmootherType::SymmetricGaussSeidel,
    ] {
        for solver_type in [CoarseSolverType::ConjugateGradient, CoarseSolverType::Direct] {
            let mut config = LaplaceConfig {
                initial_refinements: 3,
                cycles: 2,
                ..LaplaceConfig::default()
            };
            config.multigrid.pre_smoother.smoother_type = smoother_type;
            config.multigrid.post_smoother.smoother_type = smoother_type;
            config.multigrid.coarse.solver_type = solver_type;

            let mut problem = LaplaceProblem::new(config).expect("valid config");
            for report in problem.run().expect("converged") {
                assert!(
                    report.solve.iterations < 30,
                    "{smoother_type:?}/{solver_type:?}: {report:?}"
                );
            }
        }
    }
}

#[test]
fn iteration_count_does_not_grow_with_refinement() {
    let iterations: Vec<usize> = [3, 4, 5]
        .into_iter()
        .map(|initial_refinements| {
            let mut problem = LaplaceProblem::new(LaplaceConfig {
                initial_refinements,
                ..LaplaceConfig::default()
            })
            .expect("valid config");
            setup_and_solve(&mut problem).iterations
        })
        .collect();
    assert!(iterations[2] <= iterations[0] + 3, "{iterations:?}");
}

#[test]
fn three_dimensional_smoke_test() {
    let mut problem = LaplaceProblem::new(LaplaceConfig {
        dimension: 3,
        initial_refinements: 2,
        cycles: 2,
        ..LaplaceConfig::default()
    })
    .expect("valid config");
    let reports = problem.run().expect("converged");
    assert_eq!(reports[0].n_dofs, 125);
    for report in &reports {
        assert!(report.solve.residual < 1e-8);
        assert!(report.solve.iterations < 30, "{report:?}");
    }
    assert!(problem.solution().iter().all(|v| v.is_finite()));
}

#[test]
fn exhausted_outer_budget_is_reported() {
    let mut config = LaplaceConfig::default();
    config.outer.max_iterations = 1;
    let mut problem = LaplaceProblem::new(config).expect("valid config");
    problem.setup_system();
    problem.assemble_system().expect("assembled");
    problem.assemble_multigrid().expect("hierarchy");
    match problem.solve() {
        Err(SolverError::ConvergenceFailure { iterations, residual }) => {
            assert_eq!(iterations, 1);
            assert!(residual > 1e-8);
        }
        other => panic!("expected a convergence failure, got {other:?}"),
    }
}
