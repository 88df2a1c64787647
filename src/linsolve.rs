//! Linear solvers for the reduced Newton system.
use crate::error::LinearSolveError;
use nalgebra::{DMatrix, DVector};
use nalgebra_sparse::CsrMatrix;
use serde::{Deserialize, Serialize};

mod banded;
mod bicgstab;

pub use banded::*;
pub use bicgstab::*;

/// Solves `A x = b` for a square sparse matrix `A`.
pub trait LinearSolver {
    fn solve(&mut self, matrix: &CsrMatrix<f64>, rhs: &DVector<f64>) -> Result<DVector<f64>, LinearSolveError>;
}

impl<S: LinearSolver + ?Sized> LinearSolver for &mut S {
    fn solve(&mut self, matrix: &CsrMatrix<f64>, rhs: &DVector<f64>) -> Result<DVector<f64>, LinearSolveError> {
        S::solve(self, matrix, rhs)
    }
}

impl<S: LinearSolver + ?Sized> LinearSolver for Box<S> {
    fn solve(&mut self, matrix: &CsrMatrix<f64>, rhs: &DVector<f64>) -> Result<DVector<f64>, LinearSolveError> {
        S::solve(self, matrix, rhs)
    }
}

/// Direct solver: densifies the matrix and factorizes it with partial-pivoting LU.
///
/// Needs `O(n^2)` memory, so it is only suitable for small systems and as a reference for
/// [`BandedLuSolver`].
#[derive(Debug, Copy, Clone, Default)]
pub struct DenseLuSolver;

impl LinearSolver for DenseLuSolver {
    fn solve(&mut self, matrix: &CsrMatrix<f64>, rhs: &DVector<f64>) -> Result<DVector<f64>, LinearSolveError> {
        check_dimensions(matrix, rhs)?;
        if rhs.is_empty() {
            return Ok(DVector::zeros(0));
        }

        let x = DMatrix::from(matrix)
            .lu()
            .solve(rhs)
            .ok_or(LinearSolveError::Singular)?;
        check_finite(x)
    }
}

/// Selection of the linear solver used for Newton corrections.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinearSolverKind {
    /// [`BandedLuSolver`] with Reverse Cuthill-McKee ordering.
    #[default]
    #[serde(alias = "direct")]
    SparseLu,
    /// [`DenseLuSolver`].
    DenseLu,
    /// [`BiCgStabSolver`] with default parameters.
    Bicgstab,
}

impl LinearSolverKind {
    pub fn build(self) -> Box<dyn LinearSolver> {
        match self {
            Self::SparseLu => Box::new(BandedLuSolver::default()),
            Self::DenseLu => Box::new(DenseLuSolver),
            Self::Bicgstab => Box::new(BiCgStabSolver::default()),
        }
    }
}

pub(crate) fn check_dimensions(matrix: &CsrMatrix<f64>, rhs: &DVector<f64>) -> Result<(), LinearSolveError> {
    if matrix.nrows() != matrix.ncols() || matrix.nrows() != rhs.len() {
        return Err(LinearSolveError::DimensionMismatch {
            nrows: matrix.nrows(),
            ncols: matrix.ncols(),
            rhs_len: rhs.len(),
        });
    }
    Ok(())
}

pub(crate) fn check_finite(x: DVector<f64>) -> Result<DVector<f64>, LinearSolveError> {
    if x.iter().all(|x_i| x_i.is_finite()) {
        Ok(x)
    } else {
        Err(LinearSolveError::NonFinite)
    }
}
