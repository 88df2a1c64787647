//! Element-level assembly of the discrete Cahn-Hilliard equations.
use crate::element::Tri3Element;
use crate::mesh::{Tri3Connectivity, TriangleMesh2d};
use crate::potential::{DoubleWellPotential, QuarticDoubleWell};
use crate::Real;
use nalgebra::{DVectorView, Matrix3, Point2, Vector3};

/// The contribution of a single triangle to the global Newton system.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ElementContribution<T: Real> {
    /// Local tangent $J^K$, indexed by local vertex.
    pub jacobian: Matrix3<T>,
    /// Local residual $f^K$, indexed by local vertex.
    pub residual: Vector3<T>,
}

/// Computes the local Jacobian and residual of the steady-state Cahn-Hilliard problem
/// on linear triangles.
///
/// Given a triangle $K$ with stiffness matrix $A^K$, mass matrix $M^K$ and nodal values
/// $u \in \mathbb{R}^3$, the element residual and its derivative with respect to $u$ are
///
/// $$
/// f^K = \epsilon^2 A^K u + M^K W'(u), \qquad
/// J^K = \epsilon^2 A^K + M^K \operatorname{diag}(W''(u)),
/// $$
///
/// where $W$ is the double-well potential, applied entrywise to the nodal values. In other words,
/// the nonlinear term is interpolated in the same linear basis as $u$ before integration.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CahnHilliardElementAssembler<T, P = QuarticDoubleWell> {
    epsilon: T,
    potential: P,
}

impl<T: Real> CahnHilliardElementAssembler<T> {
    pub fn new(epsilon: T) -> Self {
        Self::with_potential(epsilon, QuarticDoubleWell)
    }
}

impl<T, P> CahnHilliardElementAssembler<T, P>
where
    T: Real,
    P: DoubleWellPotential<T>,
{
    pub fn with_potential(epsilon: T, potential: P) -> Self {
        Self { epsilon, potential }
    }

    pub fn epsilon(&self) -> T {
        self.epsilon
    }

    pub fn potential(&self) -> &P {
        &self.potential
    }

    pub fn assemble_element(
        &self,
        element: &Tri3Element<T>,
        u_local: &Vector3<T>,
    ) -> eyre::Result<ElementContribution<T>> {
        let eps2 = self.epsilon * self.epsilon;
        let a = element.stiffness_matrix()?;
        let m = element.mass_matrix();

        let w_prime = u_local.map(|u| self.potential.derivative(u));
        let w_second = u_local.map(|u| self.potential.second_derivative(u));

        let residual = a * u_local * eps2 + m * w_prime;
        let jacobian = a * eps2 + m * Matrix3::from_diagonal(&w_second);

        Ok(ElementContribution { jacobian, residual })
    }

    /// Gathers the nodal values of `u` for the given element and computes its contribution.
    pub fn assemble_mesh_element(
        &self,
        mesh: &TriangleMesh2d<T>,
        conn: &Tri3Connectivity,
        u: DVectorView<T>,
    ) -> eyre::Result<ElementContribution<T>> {
        let element = conn
            .element(mesh.vertices())
            .ok_or_else(|| eyre::eyre!("Element references vertices out of bounds"))?;
        let u_local = gather_global_to_local(u, conn);
        self.assemble_element(&element, &u_local)
    }
}

/// Gathers the entries of a global nodal vector belonging to the nodes of a triangle.
pub fn gather_global_to_local<T: Real>(u: DVectorView<T>, conn: &Tri3Connectivity) -> Vector3<T> {
    let [a, b, c] = conn.vertex_indices();
    Vector3::new(u[a], u[b], u[c])
}

/// Computes the local Jacobian and residual for a single triangle with the quartic double-well
/// potential.
pub fn assemble_local<T: Real>(
    coords: [Point2<T>; 3],
    u_local: Vector3<T>,
    epsilon: T,
) -> eyre::Result<ElementContribution<T>> {
    CahnHilliardElementAssembler::new(epsilon).assemble_element(&Tri3Element::from_vertices(coords), &u_local)
}
