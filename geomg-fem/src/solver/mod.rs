//! Adaptive Laplace driver
//!
//! [`LaplaceProblem`] runs the usual adaptive loop on a hypercube: set up the
//! DoFs and constraints, assemble the global system and the multigrid levels,
//! solve with CG preconditioned by one V-cycle per iteration, estimate the
//! error and refine.
//!
//! Every refinement discards all derived structures; the next cycle builds
//! them again from the new mesh.

mod estimator;

pub use estimator::estimate_error;

use crate::assembly::{ConstantCoefficient, LaplaceForm, SourceForm, SystemAssembly, assemble_system};
use crate::config::LaplaceConfig;
use crate::constraints::{AffineConstraints, interpolate_boundary_values, make_hanging_node_constraints};
use crate::dofs::DofHandler;
use crate::error::SolverError;
use crate::mesh::{Triangulation, fixed_fraction_marking, hyper_cube};
use crate::multigrid::{Multigrid, MultigridHierarchy};
use crate::quadrature::QGauss;
use ndarray::Array1;
use serde::Serialize;
use solvers::{CgConfig, lu_solve, pcg};
use std::collections::BTreeSet;
use std::time::Instant;

/// Outcome of one preconditioned CG solve
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SolveReport {
    pub iterations: usize,
    /// Final residual relative to the right-hand side norm
    pub residual: f64,
    pub solve_time_ms: f64,
}

/// Summary of one adaptive cycle
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CycleReport {
    pub cycle: usize,
    pub n_active_cells: usize,
    pub n_dofs: usize,
    /// DoFs per level, coarsest first
    pub level_dofs: Vec<usize>,
    pub solve: SolveReport,
    /// Square root of the summed squared indicators
    pub estimated_error: f64,
}

/// Step-by-step driver for `-∇·(a ∇u) = f` with Dirichlet data
#[derive(Debug)]
pub struct LaplaceProblem {
    config: LaplaceConfig,
    triangulation: Triangulation,
    quadrature: QGauss,
    dofs: Option<DofHandler>,
    constraints: AffineConstraints,
    system: Option<SystemAssembly>,
    hierarchy: Option<MultigridHierarchy>,
    solution: Array1<f64>,
}

impl LaplaceProblem {
    /// Globally refined hypercube as described by `config`
    pub fn new(config: LaplaceConfig) -> Result<Self, SolverError> {
        config.validate()?;
        let [left, right] = config.domain;
        let mut triangulation = hyper_cube(config.dimension, left, right)?;
        triangulation.refine_global(config.initial_refinements);
        Self::with_triangulation(config, triangulation)
    }

    /// Start from an existing mesh; `config.dimension` is taken from the mesh
    pub fn with_triangulation(
        mut config: LaplaceConfig,
        triangulation: Triangulation,
    ) -> Result<Self, SolverError> {
        config.dimension = triangulation.dimension();
        config.validate()?;
        let quadrature = QGauss::new(config.dimension, config.quadrature_points);
        Ok(Self {
            config,
            triangulation,
            quadrature,
            dofs: None,
            constraints: AffineConstraints::new(),
            system: None,
            hierarchy: None,
            solution: Array1::zeros(0),
        })
    }

    /// Number the DoFs and build hanging-node and Dirichlet constraints
    pub fn setup_system(&mut self) {
        let dofs = DofHandler::distribute(&self.triangulation);

        let mut constraints = AffineConstraints::new();
        let n_hanging = make_hanging_node_constraints(&self.triangulation, &dofs, &mut constraints);
        let value = self.config.boundary_value;
        for &id in &self.config.dirichlet_ids {
            interpolate_boundary_values(&self.triangulation, &dofs, id, |_| value, &mut constraints);
        }
        constraints.close();

        log::info!(
            "setup: {} active cells, {} DoFs (by level: {:?}), {} hanging, {} constrained",
            self.triangulation.n_active_cells(),
            dofs.n_dofs(),
            (0..dofs.n_levels()).map(|l| dofs.n_level_dofs(l)).collect::<Vec<_>>(),
            n_hanging,
            constraints.n_constraints()
        );

        self.solution = Array1::zeros(dofs.n_dofs());
        self.constraints = constraints;
        self.dofs = Some(dofs);
        self.system = None;
        self.hierarchy = None;
    }

    /// Assemble the constrained global matrix and right-hand side
    pub fn assemble_system(&mut self) -> Result<(), SolverError> {
        let dofs = self.dofs.as_ref().ok_or(SolverError::NotReady("setup_system"))?;
        let system = assemble_system(
            &self.triangulation,
            dofs,
            &self.constraints,
            &LaplaceForm::new(self.config.coefficient),
            &SourceForm::new(ConstantCoefficient(self.config.source)),
            &self.quadrature,
        );
        self.system = Some(system);
        Ok(())
    }

    /// Build the multigrid hierarchy for the current mesh
    pub fn assemble_multigrid(&mut self) -> Result<(), SolverError> {
        let dofs = self.dofs.as_ref().ok_or(SolverError::NotReady("setup_system"))?;
        let start = Instant::now();
        let ids: BTreeSet<_> = self.config.dirichlet_ids.iter().copied().collect();
        let hierarchy = MultigridHierarchy::build(
            &self.triangulation,
            dofs,
            &ids,
            &LaplaceForm::new(self.config.coefficient),
            &self.quadrature,
        )?;
        hierarchy.check_coverage(&self.constraints)?;
        log::info!(
            "multigrid setup: {:.1}ms (parallel cell loops: {})",
            start.elapsed().as_secs_f64() * 1000.0,
            solvers::parallel::is_parallel_available()
        );
        self.hierarchy = Some(hierarchy);
        Ok(())
    }

    /// Solve with CG preconditioned by the V-cycle
    ///
    /// Fails with [`SolverError::ConvergenceFailure`] if the iteration budget
    /// runs out. On success the constrained values are filled in.
    pub fn solve(&mut self) -> Result<SolveReport, SolverError> {
        let system = self.system.as_ref().ok_or(SolverError::NotReady("assemble_system"))?;
        let hierarchy = self
            .hierarchy
            .as_ref()
            .ok_or(SolverError::NotReady("assemble_multigrid"))?;

        let start = Instant::now();
        let preconditioner = Multigrid::new(hierarchy, &self.config.multigrid)?;
        let cg_config = CgConfig {
            max_iterations: self.config.outer.max_iterations,
            tolerance: self.config.outer.tolerance,
            print_interval: 0,
        };
        let result = pcg(&system.matrix, &preconditioner, &system.rhs, None, &cg_config);
        let solve_time_ms = start.elapsed().as_secs_f64() * 1000.0;

        if !result.converged {
            return Err(SolverError::ConvergenceFailure {
                iterations: result.iterations,
                residual: result.residual,
            });
        }
        log::info!(
            "solve: {} CG iterations, relative residual {:.3e}, {:.1}ms",
            result.iterations,
            result.residual,
            solve_time_ms
        );

        let mut solution = result.x;
        self.constraints.distribute(&mut solution);
        self.solution = solution;
        Ok(SolveReport {
            iterations: result.iterations,
            residual: result.residual,
            solve_time_ms,
        })
    }

    /// Solve the same constrained system with dense LU, without multigrid
    ///
    /// Only meant for small meshes; returns the distributed solution and
    /// leaves the stored one untouched.
    pub fn solve_direct(&self) -> Result<Array1<f64>, SolverError> {
        let system = self.system.as_ref().ok_or(SolverError::NotReady("assemble_system"))?;
        let mut solution = lu_solve(&system.matrix.to_dense(), &system.rhs)?;
        self.constraints.distribute(&mut solution);
        Ok(solution)
    }

    /// Error indicator per active cell for the current solution
    pub fn estimate(&self) -> Result<Vec<f64>, SolverError> {
        let dofs = self.dofs.as_ref().ok_or(SolverError::NotReady("setup_system"))?;
        Ok(estimate_error(
            &self.triangulation,
            dofs,
            &self.solution,
            &self.config.coefficient,
            &self.quadrature,
        ))
    }

    /// Refine the cells carrying `refine_fraction` of the estimated error
    ///
    /// Returns the number of refined cells.
    pub fn refine_grid(&mut self) -> Result<usize, SolverError> {
        let indicators = self.estimate()?;
        let active: Vec<usize> = self.triangulation.active_cells().collect();
        let flagged: Vec<usize> = fixed_fraction_marking(&indicators, self.config.refine_fraction)
            .into_iter()
            .map(|k| active[k])
            .collect();
        let result = self.triangulation.execute_refinement(&flagged)?;
        log::debug!(
            "refined {} cells ({} flagged), {} new",
            result.refined_cells.len(),
            flagged.len(),
            result.new_cells.len()
        );

        self.dofs = None;
        self.system = None;
        self.hierarchy = None;
        Ok(result.refined_cells.len())
    }

    /// Run `config.cycles` adaptive cycles
    pub fn run(&mut self) -> Result<Vec<CycleReport>, SolverError> {
        let mut reports = Vec::with_capacity(self.config.cycles);
        for cycle in 0..self.config.cycles {
            if cycle > 0 {
                self.refine_grid()?;
            }
            self.setup_system();
            self.assemble_system()?;
            self.assemble_multigrid()?;
            let solve = self.solve()?;

            let estimated_error = self.estimate()?.iter().map(|e| e * e).sum::<f64>().sqrt();
            let dofs = self.dofs.as_ref().ok_or(SolverError::NotReady("setup_system"))?;
            let report = CycleReport {
                cycle,
                n_active_cells: self.triangulation.n_active_cells(),
                n_dofs: dofs.n_dofs(),
                level_dofs: (0..dofs.n_levels()).map(|l| dofs.n_level_dofs(l)).collect(),
                solve,
                estimated_error,
            };
            log::info!(
                "cycle {}: {} cells, {} DoFs, {} iterations, estimated error {:.3e}",
                cycle,
                report.n_active_cells,
                report.n_dofs,
                solve.iterations,
                estimated_error
            );
            reports.push(report);
        }
        Ok(reports)
    }

    pub fn config(&self) -> &LaplaceConfig {
        &self.config
    }

    pub fn triangulation(&self) -> &Triangulation {
        &self.triangulation
    }

    pub fn dofs(&self) -> Option<&DofHandler> {
        self.dofs.as_ref()
    }

    pub fn constraints(&self) -> &AffineConstraints {
        &self.constraints
    }

    pub fn system(&self) -> Option<&SystemAssembly> {
        self.system.as_ref()
    }

    pub fn hierarchy(&self) -> Option<&MultigridHierarchy> {
        self.hierarchy.as_ref()
    }

    /// Last solution, constrained values included
    pub fn solution(&self) -> &Array1<f64> {
        &self.solution
    }
}
