//! Error types for setting up and running a Cahn-Hilliard solve.
//!
//! Failures are split by where they can occur. Setup failures ([`MeshError`], [`SettingsError`],
//! [`PartitionError`]) abort a run before any assembly takes place and are reported through
//! [`CahnHilliardError`]. Linear solve failures ([`LinearSolveError`]) happen during Newton
//! iteration and are reported as a tagged outcome of the solve instead, see
//! [`NewtonOutcome`](crate::newton::NewtonOutcome).
use crate::mesh::NodeId;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum MeshError {
    #[error("triangle {element} references node {node} but the mesh only has {num_vertices} vertices")]
    NodeOutOfBounds {
        element: usize,
        node: NodeId,
        num_vertices: usize,
    },
    #[error("triangle {element} references node {node} more than once")]
    RepeatedNode { element: usize, node: NodeId },
    #[error("triangle {element} has non-positive signed area {area:e}")]
    DegenerateElement { element: usize, area: f64 },
    #[error("vertex {node} has non-finite coordinates")]
    NonFiniteVertex { node: NodeId },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SettingsError {
    #[error("interface width epsilon must be positive and finite, got {0}")]
    InvalidEpsilon(f64),
    #[error("maximum number of iterations must be at least 1")]
    ZeroMaxIterations,
    #[error("convergence tolerance must be positive and finite, got {0}")]
    InvalidTolerance(f64),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PartitionError {
    #[error("boundary node {node} is out of bounds for a mesh with {num_nodes} nodes")]
    NodeOutOfBounds { node: NodeId, num_nodes: usize },
    #[error("partition covers {partition_nodes} nodes but the mesh has {mesh_nodes}")]
    SizeMismatch { partition_nodes: usize, mesh_nodes: usize },
}

/// Failure to solve the linear system for a Newton correction.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LinearSolveError {
    #[error("reduced Jacobian is singular")]
    Singular,
    #[error("linear solve produced a non-finite correction")]
    NonFinite,
    #[error("iterative solver broke down after {iterations} iterations")]
    Breakdown { iterations: usize },
    #[error("iterative solver did not converge in {iterations} iterations (relative residual {relative_residual:e})")]
    NotConverged { iterations: usize, relative_residual: f64 },
    #[error("dimension mismatch: matrix is {nrows}x{ncols}, right-hand side has length {rhs_len}")]
    DimensionMismatch { nrows: usize, ncols: usize, rhs_len: usize },
}

/// Errors that prevent a solve from starting.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CahnHilliardError {
    #[error("invalid mesh: {0}")]
    Mesh(#[from] MeshError),
    #[error("invalid settings: {0}")]
    Settings(#[from] SettingsError),
    #[error("invalid node partition: {0}")]
    Partition(#[from] PartitionError),
    #[error("assembly failed: {0}")]
    Assembly(String),
    #[error("initial condition has length {actual}, expected one value per node ({expected})")]
    InitialConditionLength { expected: usize, actual: usize },
}
