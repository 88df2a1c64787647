//! Solver settings and experiment configuration.
use crate::boundary::BoundaryMode;
use crate::error::SettingsError;
use crate::initial::InitialCondition;
use crate::linsolve::LinearSolverKind;
use crate::mesh::procedural::Rectangle;
use eyre::WrapErr;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Parameters of the Newton-Raphson solve.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CahnHilliardSettings {
    /// Maximum number of iterates kept, including the initial condition.
    ///
    /// At most `max_iterations - 1` Newton corrections are computed.
    pub max_iterations: usize,
    /// Interface width parameter.
    pub epsilon: f64,
    /// The solve has converged once the Euclidean norm of a Newton correction drops below
    /// this value.
    pub tolerance: f64,
}

impl Default for CahnHilliardSettings {
    fn default() -> Self {
        Self {
            max_iterations: 50,
            epsilon: 0.1,
            tolerance: 1e-10,
        }
    }
}

impl CahnHilliardSettings {
    pub fn validate(&self) -> Result<(), SettingsError> {
        if !(self.epsilon.is_finite() && self.epsilon > 0.0) {
            return Err(SettingsError::InvalidEpsilon(self.epsilon));
        }
        if self.max_iterations < 1 {
            return Err(SettingsError::ZeroMaxIterations);
        }
        if !(self.tolerance.is_finite() && self.tolerance > 0.0) {
            return Err(SettingsError::InvalidTolerance(self.tolerance));
        }
        Ok(())
    }
}

/// Complete description of a single experiment: solver settings plus the inputs the solver is
/// handed by the mesh, boundary and initial condition collaborators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperimentConfig {
    pub solver: CahnHilliardSettings,
    pub domain: Rectangle<f64>,
    pub cells_x: usize,
    pub cells_y: usize,
    pub boundary: BoundaryMode,
    pub initial_condition: InitialCondition,
    pub linear_solver: LinearSolverKind,
    pub parallel_assembly: bool,
    /// Directory for VTK output. Nothing is written if absent.
    pub output_directory: Option<PathBuf>,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            solver: CahnHilliardSettings::default(),
            domain: Rectangle::unit_square(),
            cells_x: 20,
            cells_y: 20,
            boundary: BoundaryMode::default(),
            initial_condition: InitialCondition::default(),
            linear_solver: LinearSolverKind::default(),
            parallel_assembly: false,
            output_directory: None,
        }
    }
}

impl ExperimentConfig {
    pub fn from_json_str(json: &str) -> eyre::Result<Self> {
        let config: Self = serde_json::from_str(json).wrap_err("failed to parse experiment configuration")?;
        config.solver.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> eyre::Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).wrap_err_with(|| format!("failed to read {}", path.display()))?;
        Self::from_json_str(&json)
    }
}
