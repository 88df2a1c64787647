//! Newton-Raphson iteration for the discrete steady-state Cahn-Hilliard equations.
//!
//! The solve is driven by a [`NewtonStepper`], a small state machine that moves from
//! [`NewtonState::Iterating`] to one of the terminal states [`NewtonState::Converged`],
//! [`NewtonState::Exhausted`] or [`NewtonState::LinearSolveFailed`]. Each step
//!
//! 1. assembles the global Jacobian `J` and residual `f` at the current iterate,
//! 2. solves `J[I, I] W[I] = f[I]` on the interior nodes `I` and sets `W = 0` on the boundary,
//! 3. updates the iterate `u ← u - W`,
//! 4. compares `|W|_2` against the tolerance.
//!
//! Boundary values are therefore never modified after initialization.
use crate::assembly::global::{restrict_csr, restrict_vector, CsrAssembler, GlobalSystem};
use crate::assembly::local::CahnHilliardElementAssembler;
use crate::boundary::NodePartition;
use crate::error::{CahnHilliardError, LinearSolveError, PartitionError};
use crate::linsolve::{BandedLuSolver, LinearSolver};
use crate::mesh::TriangleMesh2d;
use crate::potential::{DoubleWellPotential, QuarticDoubleWell};
use crate::settings::CahnHilliardSettings;
use log::{debug, info, warn};
use nalgebra::{DMatrix, DVector, DVectorView};

/// The sequence of iterates produced by a solve, starting with the initial condition.
#[derive(Debug, Clone, PartialEq)]
pub struct IterateHistory {
    iterates: Vec<DVector<f64>>,
    correction_norms: Vec<f64>,
}

impl IterateHistory {
    fn new(initial: DVector<f64>) -> Self {
        Self {
            iterates: vec![initial],
            correction_norms: Vec::new(),
        }
    }

    fn push(&mut self, iterate: DVector<f64>, correction_norm: f64) {
        self.iterates.push(iterate);
        self.correction_norms.push(correction_norm);
    }

    /// All iterates. Entry `k` is the iterate after `k` Newton steps.
    pub fn iterates(&self) -> &[DVector<f64>] {
        &self.iterates
    }

    /// Norm of the correction of every step. Entry `k` produced iterate `k + 1`.
    pub fn correction_norms(&self) -> &[f64] {
        &self.correction_norms
    }

    pub fn initial(&self) -> &DVector<f64> {
        &self.iterates[0]
    }

    pub fn last(&self) -> &DVector<f64> {
        self.iterates
            .last()
            .expect("History always contains the initial condition")
    }

    /// Number of Newton steps taken.
    pub fn num_steps(&self) -> usize {
        self.correction_norms.len()
    }

    /// The iterates as the columns of an `N × (steps + 1)` matrix.
    pub fn to_matrix(&self) -> DMatrix<f64> {
        DMatrix::from_columns(&self.iterates)
    }
}

/// How a solve ended.
///
/// Exhausting the iteration budget is not an error, but it is reported distinctly from
/// convergence so that a non-converged iterate is never mistaken for a solution.
#[derive(Debug, Clone, PartialEq)]
pub enum NewtonOutcome {
    /// The correction norm dropped below the tolerance after `iterations` steps.
    Converged { iterations: usize, history: IterateHistory },
    /// The iteration budget ran out. The last iterate is reported as-is.
    Exhausted { history: IterateHistory },
    /// The reduced Jacobian system could not be solved at the given step.
    LinearSolveFailed {
        step: usize,
        error: LinearSolveError,
        history: IterateHistory,
    },
}

impl NewtonOutcome {
    pub fn history(&self) -> &IterateHistory {
        match self {
            Self::Converged { history, .. } | Self::Exhausted { history } | Self::LinearSolveFailed { history, .. } => {
                history
            }
        }
    }

    pub fn into_history(self) -> IterateHistory {
        match self {
            Self::Converged { history, .. } | Self::Exhausted { history } | Self::LinearSolveFailed { history, .. } => {
                history
            }
        }
    }

    pub fn final_iterate(&self) -> &DVector<f64> {
        self.history().last()
    }

    pub fn is_converged(&self) -> bool {
        matches!(self, Self::Converged { .. })
    }

    /// Number of Newton steps that produced an iterate.
    pub fn num_steps(&self) -> usize {
        self.history().num_steps()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum NewtonState {
    /// The next call to [`NewtonStepper::step`] computes correction number `step + 1`.
    Iterating { step: usize },
    Converged { iterations: usize },
    Exhausted,
    LinearSolveFailed { step: usize, error: LinearSolveError },
}

impl NewtonState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Iterating { .. })
    }
}

/// Configures and runs Newton-Raphson solves.
#[derive(Debug, Clone)]
pub struct NewtonSolver<S = BandedLuSolver> {
    settings: CahnHilliardSettings,
    linear_solver: S,
    parallel_assembly: bool,
}

impl NewtonSolver {
    pub fn new(settings: CahnHilliardSettings) -> Self {
        Self {
            settings,
            linear_solver: BandedLuSolver::default(),
            parallel_assembly: false,
        }
    }
}

impl<S: LinearSolver> NewtonSolver<S> {
    pub fn with_linear_solver<S2: LinearSolver>(self, linear_solver: S2) -> NewtonSolver<S2> {
        NewtonSolver {
            settings: self.settings,
            linear_solver,
            parallel_assembly: self.parallel_assembly,
        }
    }

    pub fn with_parallel_assembly(self, parallel_assembly: bool) -> Self {
        Self {
            parallel_assembly,
            ..self
        }
    }

    pub fn settings(&self) -> &CahnHilliardSettings {
        &self.settings
    }

    /// Solves with the quartic double-well potential.
    pub fn solve(
        &mut self,
        mesh: &TriangleMesh2d<f64>,
        partition: &NodePartition,
        initial: DVector<f64>,
    ) -> Result<NewtonOutcome, CahnHilliardError> {
        self.solve_with_potential(mesh, partition, initial, QuarticDoubleWell)
    }

    pub fn solve_with_potential<P>(
        &mut self,
        mesh: &TriangleMesh2d<f64>,
        partition: &NodePartition,
        initial: DVector<f64>,
        potential: P,
    ) -> Result<NewtonOutcome, CahnHilliardError>
    where
        P: DoubleWellPotential<f64> + Sync,
    {
        info!(
            "Starting Newton solve with {} nodes ({} on the boundary), {} triangles",
            mesh.num_nodes(),
            partition.boundary().len(),
            mesh.num_elements()
        );
        let mut stepper = self.stepper(mesh, partition, initial, potential)?;
        while !stepper.state().is_terminal() {
            stepper.step()?;
        }
        let outcome = stepper.into_outcome();

        match &outcome {
            NewtonOutcome::Converged { iterations, .. } => info!("Newton converged in {} iterations", iterations),
            NewtonOutcome::Exhausted { history } => warn!(
                "Newton did not converge within {} iterations (last correction norm {:e})",
                history.num_steps(),
                history.correction_norms().last().copied().unwrap_or(f64::NAN)
            ),
            NewtonOutcome::LinearSolveFailed { step, error, .. } => {
                warn!("Newton aborted at step {}: {}", step, error)
            }
        }
        Ok(outcome)
    }

    /// Validates the input and sets up a stepper in its initial state.
    ///
    /// Boundary entries of the initial condition are set to zero when the partition has a
    /// non-empty boundary.
    pub fn stepper<'a, P>(
        &'a mut self,
        mesh: &'a TriangleMesh2d<f64>,
        partition: &'a NodePartition,
        mut initial: DVector<f64>,
        potential: P,
    ) -> Result<NewtonStepper<'a, P, S>, CahnHilliardError>
    where
        P: DoubleWellPotential<f64> + Sync,
    {
        self.settings.validate()?;
        mesh.validate()?;
        if partition.num_nodes() != mesh.num_nodes() {
            return Err(PartitionError::SizeMismatch {
                partition_nodes: partition.num_nodes(),
                mesh_nodes: mesh.num_nodes(),
            }
            .into());
        }
        if initial.len() != mesh.num_nodes() {
            return Err(CahnHilliardError::InitialConditionLength {
                expected: mesh.num_nodes(),
                actual: initial.len(),
            });
        }

        for node in partition.boundary() {
            initial[node.index()] = 0.0;
        }

        let state = if self.settings.max_iterations > 1 {
            NewtonState::Iterating { step: 0 }
        } else {
            NewtonState::Exhausted
        };

        Ok(NewtonStepper {
            mesh,
            partition,
            element_assembler: CahnHilliardElementAssembler::with_potential(self.settings.epsilon, potential),
            assembler: CsrAssembler::from_mesh(mesh),
            settings: self.settings,
            linear_solver: &mut self.linear_solver,
            parallel_assembly: self.parallel_assembly,
            history: IterateHistory::new(initial),
            state,
        })
    }
}

/// Performs Newton steps one at a time. Created by [`NewtonSolver::stepper`].
pub struct NewtonStepper<'a, P, S> {
    mesh: &'a TriangleMesh2d<f64>,
    partition: &'a NodePartition,
    element_assembler: CahnHilliardElementAssembler<f64, P>,
    assembler: CsrAssembler,
    settings: CahnHilliardSettings,
    linear_solver: &'a mut S,
    parallel_assembly: bool,
    history: IterateHistory,
    state: NewtonState,
}

impl<'a, P, S> NewtonStepper<'a, P, S>
where
    P: DoubleWellPotential<f64> + Sync,
    S: LinearSolver,
{
    pub fn state(&self) -> &NewtonState {
        &self.state
    }

    pub fn history(&self) -> &IterateHistory {
        &self.history
    }

    /// Assembles the global system at the current iterate.
    pub fn assemble(&self) -> Result<GlobalSystem<f64>, CahnHilliardError> {
        let u = DVectorView::from(self.history.last());
        let result = if self.parallel_assembly {
            self.assembler
                .par_assemble(self.mesh, &self.element_assembler, u)
        } else {
            self.assembler.assemble(self.mesh, &self.element_assembler, u)
        };
        result.map_err(|err| CahnHilliardError::Assembly(err.to_string()))
    }

    /// Performs a single Newton step and returns the new state.
    ///
    /// Does nothing once a terminal state has been reached.
    pub fn step(&mut self) -> Result<&NewtonState, CahnHilliardError> {
        let step = match self.state {
            NewtonState::Iterating { step } => step + 1,
            _ => return Ok(&self.state),
        };

        let system = self.assemble()?;
        let interior = self.partition.interior();
        let rhs = restrict_vector(DVectorView::from(&system.residual), interior);

        let correction = if rhs.iter().all(|f_i| f_i.is_finite()) {
            let reduced_jacobian = restrict_csr(&system.jacobian, interior);
            self.linear_solver.solve(&reduced_jacobian, &rhs)
        } else {
            Err(LinearSolveError::NonFinite)
        };

        let w_interior = match correction {
            Ok(w) => w,
            Err(error) => {
                warn!("Linear solve failed at Newton step {}: {}", step, error);
                self.state = NewtonState::LinearSolveFailed { step, error };
                return Ok(&self.state);
            }
        };

        let mut w = DVector::zeros(self.mesh.num_nodes());
        for (node, w_i) in interior.iter().zip(w_interior.iter()) {
            w[node.index()] = *w_i;
        }

        let correction_norm = w.norm();
        let next = self.history.last() - &w;
        self.history.push(next, correction_norm);
        debug!(
            "Newton step {}: |W| = {:e}, |f_interior| = {:e}",
            step,
            correction_norm,
            rhs.norm()
        );

        self.state = if correction_norm < self.settings.tolerance {
            NewtonState::Converged { iterations: step }
        } else if self.history.iterates().len() >= self.settings.max_iterations {
            NewtonState::Exhausted
        } else {
            NewtonState::Iterating { step }
        };
        Ok(&self.state)
    }

    /// Consumes the stepper and tags its history with the current state.
    ///
    /// # Panics
    ///
    /// Panics if called before a terminal state is reached.
    pub fn into_outcome(self) -> NewtonOutcome {
        let history = self.history;
        match self.state {
            NewtonState::Converged { iterations } => NewtonOutcome::Converged { iterations, history },
            NewtonState::Exhausted => NewtonOutcome::Exhausted { history },
            NewtonState::LinearSolveFailed { step, error } => NewtonOutcome::LinearSolveFailed { step, error, history },
            NewtonState::Iterating { step } => panic!("Newton iteration has not terminated (at step {step})"),
        }
    }
}
