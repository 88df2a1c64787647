//! Linear (P1) Lagrange finite element on a triangle.
use crate::Real;
use eyre::eyre;
use nalgebra::{Matrix2, Matrix2x3, Matrix3, Point2, Scalar, Vector2};
use numeric_literals::replace_float_literals;

/// A finite element representing linear basis functions on a triangle, in two dimensions.
///
/// The reference element is the triangle with corners (0, 0), (1, 0), (0, 1), with basis
/// functions `1 - ξ - η`, `ξ` and `η`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Tri3Element<T>
where
    T: Scalar,
{
    vertices: [Point2<T>; 3],
}

impl<T> Tri3Element<T>
where
    T: Scalar,
{
    pub fn from_vertices(vertices: [Point2<T>; 3]) -> Self {
        Self { vertices }
    }

    pub fn vertices(&self) -> &[Point2<T>; 3] {
        &self.vertices
    }
}

impl<T> Tri3Element<T>
where
    T: Real,
{
    /// The Jacobian of the affine map from the reference triangle to the physical triangle.
    pub fn reference_jacobian(&self) -> Matrix2<T> {
        let [a, b, c] = &self.vertices;
        Matrix2::from_columns(&[b - a, c - a])
    }

    /// Signed area, positive for counter-clockwise vertex order.
    #[replace_float_literals(T::from_f64(literal).unwrap())]
    pub fn signed_area(&self) -> T {
        0.5 * self.reference_jacobian().determinant()
    }

    pub fn area(&self) -> T {
        self.signed_area().abs()
    }

    /// Gradients of the reference basis functions, one column per basis function.
    #[rustfmt::skip]
    #[replace_float_literals(T::from_f64(literal).unwrap())]
    pub fn reference_gradients() -> Matrix2x3<T> {
        Matrix2x3::from_columns(&[
            Vector2::new(-1.0, -1.0),
            Vector2::new(1.0, 0.0),
            Vector2::new(0.0, 1.0),
        ])
    }

    /// Gradients of the physical basis functions, one column per basis function.
    ///
    /// The gradients are constant over the element.
    pub fn gradients(&self) -> eyre::Result<Matrix2x3<T>> {
        let j_inv_t = self
            .reference_jacobian()
            .try_inverse()
            .ok_or_else(|| eyre!("Singular element Jacobian encountered"))?
            .transpose();
        Ok(j_inv_t * Self::reference_gradients())
    }

    /// Element stiffness matrix `K_ab = ∫ ∇φ_a · ∇φ_b dx`.
    pub fn stiffness_matrix(&self) -> eyre::Result<Matrix3<T>> {
        let g = self.gradients()?;
        Ok(g.transpose() * g * self.area())
    }

    /// Consistent element mass matrix `M_ab = ∫ φ_a φ_b dx`.
    #[rustfmt::skip]
    #[replace_float_literals(T::from_f64(literal).unwrap())]
    pub fn mass_matrix(&self) -> Matrix3<T> {
        Matrix3::new(
            2.0, 1.0, 1.0,
            1.0, 2.0, 1.0,
            1.0, 1.0, 2.0,
        ) * (self.area() / 12.0)
    }
}
