//! Adaptive Laplace solver with a geometric multigrid preconditioner
//!
//! Runs the coefficient-jump benchmark (or the problem described by a JSON
//! configuration) for a number of refinement cycles and writes one report per
//! cycle as JSON.
//!
//! Usage:
//!     cargo run --release --bin laplace-mg -- --cycles 6 --smoother gauss-seidel

use anyhow::Context;
use clap::{Parser, ValueEnum};
use geomg_fem::multigrid::{CoarseSolverType, SmootherType};
use geomg_fem::{CycleReport, LaplaceConfig, LaplaceProblem};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "laplace-mg")]
#[command(about = "Adaptive Q1 Laplace solver preconditioned by geometric multigrid")]
struct Args {
    /// Path to JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output JSON file for the cycle reports (stdout if omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Override spatial dimension
    #[arg(short, long)]
    dimension: Option<usize>,

    /// Override number of adaptive cycles
    #[arg(long)]
    cycles: Option<usize>,

    /// Override number of initial global refinements
    #[arg(long)]
    initial_refinements: Option<usize>,

    /// Override smoother (both pre and post)
    #[arg(short, long)]
    smoother: Option<CliSmoother>,

    /// Override smoothing steps (both pre and post)
    #[arg(long)]
    smoothing_steps: Option<usize>,

    /// Override coarse solver
    #[arg(long)]
    coarse: Option<CliCoarse>,

    /// Print the effective configuration and exit
    #[arg(long)]
    print_config: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliSmoother {
    Jacobi,
    GaussSeidel,
    SymmetricGaussSeidel,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliCoarse {
    Cg,
    Direct,
}

impl Args {
    /// Apply command-line overrides on top of the file configuration
    fn apply(&self, config: &mut LaplaceConfig) {
        if let Some(dimension) = self.dimension {
            config.dimension = dimension;
        }
        if let Some(cycles) = self.cycles {
            config.cycles = cycles;
        }
        if let Some(refinements) = self.initial_refinements {
            config.initial_refinements = refinements;
        }
        if let Some(smoother) = self.smoother {
            let smoother_type = match smoother {
                CliSmoother::Jacobi => SmootherType::Jacobi,
                CliSmoother::GaussSeidel => SmootherType::GaussSeidel,
                CliSmoother::SymmetricGaussSeidel => SmootherType::SymmetricGaussSeidel,
            };
            config.multigrid.pre_smoother.smoother_type = smoother_type;
            config.multigrid.post_smoother.smoother_type = smoother_type;
        }
        if let Some(steps) = self.smoothing_steps {
            config.multigrid.pre_smoother.steps = steps;
            config.multigrid.post_smoother.steps = steps;
        }
        if let Some(coarse) = self.coarse {
            config.multigrid.coarse.solver_type = match coarse {
                CliCoarse::Cg => CoarseSolverType::ConjugateGradient,
                CliCoarse::Direct => CoarseSolverType::Direct,
            };
        }
    }
}

fn print_summary(reports: &[CycleReport]) {
    println!(
        "{:>5} {:>10} {:>10} {:>6} {:>12} {:>12}",
        "cycle", "cells", "dofs", "iter", "residual", "est. error"
    );
    for r in reports {
        println!(
            "{:>5} {:>10} {:>10} {:>6} {:>12.3e} {:>12.3e}",
            r.cycle, r.n_active_cells, r.n_dofs, r.solve.iterations, r.solve.residual, r.estimated_error
        );
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => LaplaceConfig::from_json_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => LaplaceConfig::default(),
    };
    args.apply(&mut config);
    config.validate()?;

    if args.print_config {
        println!("{}", config.to_json_string()?);
        return Ok(());
    }

    let mut problem = LaplaceProblem::new(config)?;
    let reports = problem.run()?;

    let json = serde_json::to_string_pretty(&reports)?;
    match &args.output {
        Some(path) => {
            std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
            print_summary(&reports);
            println!("wrote {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}
