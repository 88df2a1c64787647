use cahn_hilliard::initial::InitialCondition;
use cahn_hilliard::mesh::procedural::{create_unit_square_uniform_tri_mesh_2d, Rectangle};
use matrixcompare::assert_scalar_eq;
use nalgebra::{point, DVector};

#[test]
fn smooth_initial_condition_values() {
    let vertices = [point![0.0, 0.0], point![0.5, 0.0], point![0.25, 0.3], point![1.0, 1.0]];
    let u = InitialCondition::Smooth.sample(&vertices, &Rectangle::unit_square());
    assert_scalar_eq!(u[0], 1.0, comp = abs, tol = 1e-14);
    assert_scalar_eq!(u[1], -1.0, comp = abs, tol = 1e-14);
    assert_scalar_eq!(u[2], 0.0, comp = abs, tol = 1e-14);
    assert_scalar_eq!(u[3], -1.0, comp = abs, tol = 1e-14);
}

#[test]
fn random_initial_condition_is_seeded_and_bounded() {
    let rect = create_unit_square_uniform_tri_mesh_2d::<f64>(8);
    let sample = |seed| {
        InitialCondition::Random { amplitude: 0.25, seed }.sample(rect.mesh.vertices(), &rect.bounds)
    };

    let u = sample(42);
    assert_eq!(u.len(), rect.mesh.num_nodes());
    assert!(u.iter().all(|u_i| u_i.abs() <= 0.25));
    assert_eq!(u, sample(42));
    assert_ne!(u, sample(43));
}

#[test]
fn random_initial_condition_with_zero_amplitude_is_zero() {
    let rect = create_unit_square_uniform_tri_mesh_2d::<f64>(2);
    let u = InitialCondition::Random { amplitude: 0.0, seed: 1 }.sample(rect.mesh.vertices(), &rect.bounds);
    assert_eq!(u, DVector::zeros(9));
}

#[test]
fn discontinuous_initial_condition_splits_at_midline() {
    let bounds = Rectangle::new(point![2.0, 0.0], point![4.0, 1.0]);
    let vertices = [point![2.0, 0.5], point![2.99, 0.0], point![3.0, 1.0], point![4.0, 0.2]];
    let u = InitialCondition::Discontinuous.sample(&vertices, &bounds);
    assert_eq!(u.as_slice(), &[-1.0, -1.0, 1.0, 1.0]);
}

#[test]
fn constant_initial_condition() {
    let vertices = [point![0.0, 0.0], point![1.0, 1.0]];
    let u = InitialCondition::Constant { value: 0.3 }.sample(&vertices, &Rectangle::unit_square());
    assert_eq!(u.as_slice(), &[0.3, 0.3]);
}

#[test]
fn initial_condition_json_representation() {
    let ic: InitialCondition = serde_json::from_str(r#"{ "kind": "random", "amplitude": 0.5, "seed": 3 }"#).unwrap();
    assert_eq!(ic, InitialCondition::Random { amplitude: 0.5, seed: 3 });

    let ic: InitialCondition = serde_json::from_str(r#"{ "kind": "smooth" }"#).unwrap();
    assert_eq!(ic, InitialCondition::Smooth);
    assert_eq!(InitialCondition::default(), InitialCondition::Smooth);
}
