use super::{check_dimensions, check_finite, LinearSolver};
use crate::error::LinearSolveError;
use crate::reorder::{permuted_bandwidths, reverse_cuthill_mckee, Permutation};
use log::debug;
use nalgebra::{DMatrix, DVector};
use nalgebra_sparse::CsrMatrix;

/// Sparse direct solver for non-symmetric systems.
///
/// The rows and columns are first reordered with Reverse Cuthill-McKee, then the band of the
/// reordered matrix is factorized with partial-pivoting LU. For `n` unknowns and bandwidths
/// `kl`, `ku` after reordering, the factors take `n (2 kl + ku + 1)` values and the
/// factorization costs `O(n kl (kl + ku))`. On a structured `m x m` grid the reordered
/// bandwidth is `O(m)`, so memory grows like `m^3` instead of the `m^4` of a dense factorization.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct BandedLuSolver {
    /// Whether to apply the Reverse Cuthill-McKee ordering before factorizing.
    pub reorder: bool,
}

impl Default for BandedLuSolver {
    fn default() -> Self {
        Self { reorder: true }
    }
}

/// LU factorization with partial pivoting of a band matrix.
///
/// Column `j` of `band` holds entry `(i, j)` at offset `kl + ku + i - j`. The first `kl` offsets
/// receive the fill-in of `U` caused by row interchanges, and the multipliers of `L` are stored
/// below the diagonal in the order they were computed.
#[derive(Debug, Clone, PartialEq)]
pub struct BandedLu {
    band: DMatrix<f64>,
    pivots: Vec<usize>,
    kl: usize,
    ku: usize,
}

impl BandedLu {
    /// Factorizes `P A P^T` where `P` is the row and column permutation given by `perm`.
    pub fn factor(matrix: &CsrMatrix<f64>, perm: &Permutation) -> Result<Self, LinearSolveError> {
        let n = matrix.nrows();
        assert_eq!(perm.len(), n, "Permutation and matrix must have the same size.");
        let (kl, ku) = permuted_bandwidths(matrix.pattern(), perm);
        let width = kl + ku;

        let inverse = perm.inverse();
        let mut band = DMatrix::zeros(2 * kl + ku + 1, n);
        for (i, &source_row) in perm.perm().iter().enumerate() {
            let row = matrix.row(source_row);
            for (&source_col, &value) in row.col_indices().iter().zip(row.values()) {
                let j = inverse.source_index(source_col);
                band[(width + i - j, j)] = value;
            }
        }

        let mut lu = Self {
            band,
            pivots: Vec::with_capacity(n),
            kl,
            ku,
        };
        lu.eliminate()?;
        Ok(lu)
    }

    pub fn bandwidths(&self) -> (usize, usize) {
        (self.kl, self.ku)
    }

    pub fn dim(&self) -> usize {
        self.band.ncols()
    }

    fn eliminate(&mut self) -> Result<(), LinearSolveError> {
        let n = self.dim();
        let width = self.kl + self.ku;
        for k in 0..n {
            let last_row = (k + self.kl).min(n - 1);
            let last_col = (k + width).min(n - 1);

            let mut pivot_row = k;
            let mut pivot_abs = self.band[(width, k)].abs();
            for i in k + 1..=last_row {
                let candidate = self.band[(width + i - k, k)].abs();
                if candidate > pivot_abs {
                    pivot_row = i;
                    pivot_abs = candidate;
                }
            }
            self.pivots.push(pivot_row);

            if pivot_row != k {
                for j in k..=last_col {
                    self.band.swap((width + k - j, j), (width + pivot_row - j, j));
                }
            }

            let pivot = self.band[(width, k)];
            if pivot == 0.0 {
                return Err(LinearSolveError::Singular);
            }

            for i in k + 1..=last_row {
                let multiplier = self.band[(width + i - k, k)] / pivot;
                self.band[(width + i - k, k)] = multiplier;
                if multiplier != 0.0 {
                    for j in k + 1..=last_col {
                        let u_kj = self.band[(width + k - j, j)];
                        self.band[(width + i - j, j)] -= multiplier * u_kj;
                    }
                }
            }
        }
        Ok(())
    }

    /// Solves the factorized (permuted) system for the given right-hand side.
    pub fn solve(&self, rhs: &DVector<f64>) -> DVector<f64> {
        let n = self.dim();
        assert_eq!(rhs.len(), n, "Right-hand side and factorization must have the same size.");
        let width = self.kl + self.ku;
        let mut x = rhs.clone();

        for (k, &pivot_row) in self.pivots.iter().enumerate() {
            x.swap_rows(k, pivot_row);
            let x_k = x[k];
            if x_k != 0.0 {
                for i in k + 1..=(k + self.kl).min(n - 1) {
                    x[i] -= self.band[(width + i - k, k)] * x_k;
                }
            }
        }

        for k in (0..n).rev() {
            let mut sum = x[k];
            for j in k + 1..=(k + width).min(n - 1) {
                sum -= self.band[(width + k - j, j)] * x[j];
            }
            x[k] = sum / self.band[(width, k)];
        }
        x
    }
}

impl LinearSolver for BandedLuSolver {
    fn solve(&mut self, matrix: &CsrMatrix<f64>, rhs: &DVector<f64>) -> Result<DVector<f64>, LinearSolveError> {
        check_dimensions(matrix, rhs)?;
        let n = rhs.len();
        if n == 0 {
            return Ok(DVector::zeros(0));
        }
        if !matrix.values().iter().all(|a_ij| a_ij.is_finite()) {
            return Err(LinearSolveError::NonFinite);
        }

        let perm = if self.reorder {
            reverse_cuthill_mckee(matrix.pattern())
        } else {
            Permutation::identity(n)
        };
        let lu = BandedLu::factor(matrix, &perm)?;
        let (kl, ku) = lu.bandwidths();
        debug!("Banded LU of {} unknowns with bandwidths kl = {}, ku = {}", n, kl, ku);

        let permuted_rhs = DVector::from_vec(perm.apply_to_slice(rhs.as_slice()));
        let y = lu.solve(&permuted_rhs);
        let mut x = DVector::zeros(n);
        for (target, &source) in perm.perm().iter().enumerate() {
            x[source] = y[target];
        }
        check_finite(x)
    }
}
