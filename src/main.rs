use cahn_hilliard::boundary::BoundaryMode;
use cahn_hilliard::initial::InitialCondition;
use cahn_hilliard::io::vtk::{export_history, export_solution};
use cahn_hilliard::linsolve::LinearSolverKind;
use cahn_hilliard::mesh::procedural::create_rectangular_uniform_tri_mesh_2d;
use cahn_hilliard::newton::{NewtonOutcome, NewtonSolver};
use cahn_hilliard::settings::ExperimentConfig;
use clap::{Parser, ValueEnum};
use eyre::eyre;
use log::info;
use std::fs;
use std::path::PathBuf;

/// Computes a steady-state solution of the Cahn-Hilliard equation on a rectangle.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// JSON experiment configuration. Command line flags override its values.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Maximum number of iterates, including the initial condition.
    #[arg(long)]
    max_iterations: Option<usize>,

    /// Interface width parameter.
    #[arg(long)]
    epsilon: Option<f64>,

    /// Tolerance on the norm of the Newton correction.
    #[arg(long)]
    tolerance: Option<f64>,

    /// Number of cells along each side of the domain.
    #[arg(short = 'n', long)]
    cells: Option<usize>,

    #[arg(long, value_enum)]
    boundary: Option<BoundaryArg>,

    #[arg(long, value_enum)]
    initial: Option<InitialArg>,

    /// Seed for the random initial condition.
    #[arg(long, default_value_t = 0)]
    seed: u64,

    #[arg(long, value_enum)]
    linear_solver: Option<LinearSolverArg>,

    /// Compute element contributions in parallel.
    #[arg(long)]
    parallel: bool,

    /// Directory for VTK output of every iterate.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Enable debug logging. `RUST_LOG` takes precedence.
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Copy, Clone, ValueEnum)]
enum BoundaryArg {
    Dirichlet,
    Free,
}

#[derive(Debug, Copy, Clone, ValueEnum)]
enum InitialArg {
    Smooth,
    Random,
    Discontinuous,
}

#[derive(Debug, Copy, Clone, ValueEnum)]
enum LinearSolverArg {
    SparseLu,
    DenseLu,
    Bicgstab,
}

impl Cli {
    fn experiment_config(&self) -> eyre::Result<ExperimentConfig> {
        let mut config = match &self.config {
            Some(path) => ExperimentConfig::from_json_file(path)?,
            None => ExperimentConfig::default(),
        };

        if let Some(max_iterations) = self.max_iterations {
            config.solver.max_iterations = max_iterations;
        }
        if let Some(epsilon) = self.epsilon {
            config.solver.epsilon = epsilon;
        }
        if let Some(tolerance) = self.tolerance {
            config.solver.tolerance = tolerance;
        }
        if let Some(cells) = self.cells {
            config.cells_x = cells;
            config.cells_y = cells;
        }
        if let Some(boundary) = self.boundary {
            config.boundary = match boundary {
                BoundaryArg::Dirichlet => BoundaryMode::Dirichlet,
                BoundaryArg::Free => BoundaryMode::Free,
            };
        }
        if let Some(initial) = self.initial {
            config.initial_condition = match initial {
                InitialArg::Smooth => InitialCondition::Smooth,
                InitialArg::Random => InitialCondition::Random {
                    amplitude: 1.0,
                    seed: self.seed,
                },
                InitialArg::Discontinuous => InitialCondition::Discontinuous,
            };
        }
        if let Some(linear_solver) = self.linear_solver {
            config.linear_solver = match linear_solver {
                LinearSolverArg::SparseLu => LinearSolverKind::SparseLu,
                LinearSolverArg::DenseLu => LinearSolverKind::DenseLu,
                LinearSolverArg::Bicgstab => LinearSolverKind::Bicgstab,
            };
        }
        config.parallel_assembly |= self.parallel;
        if self.output.is_some() {
            config.output_directory = self.output.clone();
        }

        config.solver.validate()?;
        Ok(config)
    }
}

fn main() -> eyre::Result<()> {
    let cli = Cli::parse();
    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter)).init();

    let config = cli.experiment_config()?;
    info!("Experiment configuration: {:?}", config);

    let rect = create_rectangular_uniform_tri_mesh_2d(config.domain, config.cells_x, config.cells_y);
    let partition = config.boundary.partition(&rect);
    let u0 = config
        .initial_condition
        .sample(rect.mesh.vertices(), &rect.bounds);

    let mut solver = NewtonSolver::new(config.solver)
        .with_linear_solver(config.linear_solver.build())
        .with_parallel_assembly(config.parallel_assembly);
    let outcome = solver.solve(&rect.mesh, &partition, u0)?;

    println!("{:>6} | {:>14}", "step", "|W|");
    for (step, norm) in outcome.history().correction_norms().iter().enumerate() {
        println!("{:>6} | {:>14.6e}", step + 1, norm);
    }

    if let Some(directory) = &config.output_directory {
        fs::create_dir_all(directory)?;
        export_history(&rect.mesh, outcome.history(), directory, "iterate")?;
        export_solution(&rect.mesh, outcome.final_iterate().as_slice(), directory.join("solution.vtk"))?;
    }

    match outcome {
        NewtonOutcome::Converged { iterations, .. } => {
            println!("Converged after {iterations} Newton steps.");
            Ok(())
        }
        NewtonOutcome::Exhausted { history } => {
            println!(
                "Not converged: iteration budget exhausted after {} Newton steps.",
                history.num_steps()
            );
            Ok(())
        }
        NewtonOutcome::LinearSolveFailed { step, error, .. } => {
            Err(eyre!("linear solve failed at step {step}: {error}"))
        }
    }
}
