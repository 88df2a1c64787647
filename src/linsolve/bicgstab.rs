use super::{check_dimensions, check_finite, LinearSolver};
use crate::error::LinearSolveError;
use log::debug;
use nalgebra::DVector;
use nalgebra_sparse::ops::serial::spmm_csr_dense;
use nalgebra_sparse::ops::Op;
use nalgebra_sparse::CsrMatrix;

/// Jacobi-preconditioned BiConjugate Gradient STABilized solver for non-symmetric,
/// possibly indefinite sparse systems.
///
/// Iteration stops once `|b - A x| <= tolerance * |b|`.
/// See <https://en.wikipedia.org/wiki/Biconjugate_gradient_stabilized_method>.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct BiCgStabSolver {
    pub max_iterations: usize,
    pub tolerance: f64,
}

impl Default for BiCgStabSolver {
    fn default() -> Self {
        Self {
            max_iterations: 10_000,
            tolerance: 1e-14,
        }
    }
}

/// Inverse diagonal of the matrix, with 1 in place of zero diagonal entries.
fn jacobi_preconditioner(matrix: &CsrMatrix<f64>) -> DVector<f64> {
    DVector::from_iterator(
        matrix.nrows(),
        (0..matrix.nrows()).map(|i| {
            let d = matrix
                .get_entry(i, i)
                .map(|entry| entry.into_value())
                .unwrap_or(0.0);
            if d != 0.0 {
                1.0 / d
            } else {
                1.0
            }
        }),
    )
}

impl LinearSolver for BiCgStabSolver {
    #[allow(non_snake_case)]
    fn solve(&mut self, A: &CsrMatrix<f64>, b: &DVector<f64>) -> Result<DVector<f64>, LinearSolveError> {
        check_dimensions(A, b)?;
        let n = b.len();
        let mut x = DVector::zeros(n);

        let b_norm = b.norm();
        if b_norm == 0.0 {
            return Ok(x);
        }
        let threshold = self.tolerance * b_norm;

        let d_inv = jacobi_preconditioner(A);
        let mut r = b.clone();
        let r_hat = r.clone();
        let mut p = DVector::zeros(n);
        let mut v = DVector::zeros(n);
        let mut t = DVector::zeros(n);
        let (mut rho_prev, mut alpha, mut omega) = (1.0, 1.0, 1.0);

        for iter in 1..=self.max_iterations {
            let rho = r_hat.dot(&r);
            if rho == 0.0 {
                return Err(LinearSolveError::Breakdown { iterations: iter });
            }

            let beta = (rho / rho_prev) * (alpha / omega);
            p = &r + (&p - &v * omega) * beta;

            let y = p.component_mul(&d_inv);
            spmm_csr_dense(0.0, &mut v, 1.0, Op::NoOp(A), Op::NoOp(&y));
            let r_hat_v = r_hat.dot(&v);
            if r_hat_v == 0.0 {
                return Err(LinearSolveError::Breakdown { iterations: iter });
            }
            alpha = rho / r_hat_v;

            let s = &r - &v * alpha;
            if s.norm() <= threshold {
                x.axpy(alpha, &y, 1.0);
                debug!("BiCGSTAB converged in {} iterations", iter);
                return check_finite(x);
            }

            let z = s.component_mul(&d_inv);
            spmm_csr_dense(0.0, &mut t, 1.0, Op::NoOp(A), Op::NoOp(&z));
            let t_t = t.dot(&t);
            if t_t == 0.0 {
                return Err(LinearSolveError::Breakdown { iterations: iter });
            }
            omega = t.dot(&s) / t_t;

            x.axpy(alpha, &y, 1.0);
            x.axpy(omega, &z, 1.0);
            r = &s - &t * omega;

            if r.norm() <= threshold {
                debug!("BiCGSTAB converged in {} iterations", iter);
                return check_finite(x);
            }
            if omega == 0.0 {
                return Err(LinearSolveError::Breakdown { iterations: iter });
            }
            rho_prev = rho;
        }

        Err(LinearSolveError::NotConverged {
            iterations: self.max_iterations,
            relative_residual: r.norm() / b_norm,
        })
    }
}
