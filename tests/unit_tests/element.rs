use cahn_hilliard::element::Tri3Element;
use matrixcompare::{assert_matrix_eq, assert_scalar_eq, prop_assert_matrix_eq, prop_assert_scalar_eq};
use nalgebra::{point, Matrix3, Point2, Vector3};
use proptest::prelude::*;

fn reference_triangle() -> Tri3Element<f64> {
    Tri3Element::from_vertices([point![0.0, 0.0], point![1.0, 0.0], point![0.0, 1.0]])
}

/// Counter-clockwise triangles that are not too close to degenerate.
fn ccw_triangle_strategy() -> impl Strategy<Value = Tri3Element<f64>> {
    let coord = -10.0..10.0f64;
    let vertex = [coord.clone(), coord].prop_map(|[x, y]| Point2::new(x, y));
    [vertex.clone(), vertex.clone(), vertex]
        .prop_map(|[a, b, c]| {
            let element = Tri3Element::from_vertices([a, b, c]);
            if element.signed_area() < 0.0 {
                Tri3Element::from_vertices([a, c, b])
            } else {
                element
            }
        })
        .prop_filter("Triangle must not be degenerate", |element| element.area() > 1e-2)
}

#[test]
fn reference_triangle_area_and_gradients() {
    let element = reference_triangle();
    assert_scalar_eq!(element.signed_area(), 0.5);
    assert_matrix_eq!(element.reference_jacobian(), nalgebra::Matrix2::identity());
    assert_matrix_eq!(
        element.gradients().unwrap(),
        Tri3Element::<f64>::reference_gradients()
    );
}

#[test]
fn clockwise_triangle_has_negative_signed_area() {
    let element = Tri3Element::from_vertices([point![0.0, 0.0], point![0.0, 1.0], point![1.0, 0.0]]);
    assert_scalar_eq!(element.signed_area(), -0.5);
    assert_scalar_eq!(element.area(), 0.5);
}

#[test]
#[rustfmt::skip]
fn reference_triangle_stiffness_and_mass() {
    let element = reference_triangle();
    let expected_stiffness = Matrix3::new(
         1.0, -0.5, -0.5,
        -0.5,  0.5,  0.0,
        -0.5,  0.0,  0.5,
    );
    let expected_mass = Matrix3::new(
        2.0, 1.0, 1.0,
        1.0, 2.0, 1.0,
        1.0, 1.0, 2.0,
    ) / 24.0;
    assert_matrix_eq!(element.stiffness_matrix().unwrap(), expected_stiffness, comp = abs, tol = 1e-14);
    assert_matrix_eq!(element.mass_matrix(), expected_mass, comp = abs, tol = 1e-14);
}

#[test]
fn degenerate_triangle_gradients_fail() {
    let element = Tri3Element::from_vertices([point![0.0, 0.0], point![1.0, 1.0], point![2.0, 2.0]]);
    assert_eq!(element.signed_area(), 0.0);
    assert!(element.gradients().is_err());
    assert!(element.stiffness_matrix().is_err());
}

proptest! {
    #[test]
    fn stiffness_is_symmetric_and_annihilates_constants(element in ccw_triangle_strategy()) {
        let k = element.stiffness_matrix().unwrap();
        let scale = k.amax();
        prop_assert_matrix_eq!(k, k.transpose(), comp = abs, tol = 1e-12 * scale);
        prop_assert_matrix_eq!(k * Vector3::repeat(1.0), Vector3::zeros(), comp = abs, tol = 1e-12 * scale);
    }

    #[test]
    fn mass_matrix_entries_sum_to_area(element in ccw_triangle_strategy()) {
        let m = element.mass_matrix();
        prop_assert_scalar_eq!(m.sum(), element.area(), comp = abs, tol = 1e-12 * element.area());
    }

    #[test]
    fn gradients_reproduce_linear_functions(element in ccw_triangle_strategy(), a in -5.0..5.0f64, b in -5.0..5.0f64) {
        // u(x, y) = a x + b y interpolated at the vertices has gradient (a, b)
        let [p0, p1, p2] = *element.vertices();
        let u = Vector3::new(a * p0.x + b * p0.y, a * p1.x + b * p1.y, a * p2.x + b * p2.y);
        let grad = element.gradients().unwrap() * u;
        prop_assert_matrix_eq!(grad, nalgebra::vector![a, b], comp = abs, tol = 1e-8);
    }
}
