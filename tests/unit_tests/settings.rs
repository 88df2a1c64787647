use cahn_hilliard::boundary::BoundaryMode;
use cahn_hilliard::initial::InitialCondition;
use cahn_hilliard::linsolve::LinearSolverKind;
use cahn_hilliard::mesh::procedural::Rectangle;
use cahn_hilliard::settings::{CahnHilliardSettings, ExperimentConfig};
use nalgebra::point;
use std::path::PathBuf;

#[test]
fn empty_json_gives_defaults() {
    let config = ExperimentConfig::from_json_str("{}").unwrap();
    assert_eq!(config, ExperimentConfig::default());
    assert_eq!(config.solver, CahnHilliardSettings::default());
    assert_eq!(config.domain, Rectangle::unit_square());
    assert_eq!((config.cells_x, config.cells_y), (20, 20));
    assert_eq!(config.boundary, BoundaryMode::Dirichlet);
    assert_eq!(config.initial_condition, InitialCondition::Smooth);
    assert_eq!(config.linear_solver, LinearSolverKind::SparseLu);
    assert!(!config.parallel_assembly);
    assert_eq!(config.output_directory, None);
}

#[test]
fn partial_json_overrides_selected_fields() {
    let json = r#"{
        "solver": { "epsilon": 0.05, "max_iterations": 20 },
        "domain": { "min": [-1.0, 0.0], "max": [1.0, 2.0] },
        "cells_x": 8,
        "boundary": "free",
        "initial_condition": { "kind": "constant", "value": 0.5 },
        "linear_solver": "bicgstab",
        "parallel_assembly": true,
        "output_directory": "out"
    }"#;
    let config = ExperimentConfig::from_json_str(json).unwrap();

    assert_eq!(
        config.solver,
        CahnHilliardSettings {
            max_iterations: 20,
            epsilon: 0.05,
            tolerance: 1e-10,
        }
    );
    assert_eq!(config.domain, Rectangle::new(point![-1.0, 0.0], point![1.0, 2.0]));
    assert_eq!((config.cells_x, config.cells_y), (8, 20));
    assert_eq!(config.boundary, BoundaryMode::Free);
    assert_eq!(config.initial_condition, InitialCondition::Constant { value: 0.5 });
    assert_eq!(config.linear_solver, LinearSolverKind::Bicgstab);
    assert!(config.parallel_assembly);
    assert_eq!(config.output_directory, Some(PathBuf::from("out")));
}

#[test]
fn invalid_json_settings_are_rejected() {
    assert!(ExperimentConfig::from_json_str(r#"{ "solver": { "epsilon": -0.1 } }"#).is_err());
    assert!(ExperimentConfig::from_json_str(r#"{ "solver": { "max_iterations": 0 } }"#).is_err());
    assert!(ExperimentConfig::from_json_str(r#"{ "boundary": "periodic" }"#).is_err());
    assert!(ExperimentConfig::from_json_str("not json").is_err());
}

#[test]
fn missing_config_file_is_reported() {
    let error = ExperimentConfig::from_json_file("data/unit_tests/settings/does_not_exist.json").unwrap_err();
    assert!(error.to_string().contains("does_not_exist.json"));
}

#[test]
fn linear_solver_names() {
    let parse = |name: &str| {
        ExperimentConfig::from_json_str(&format!(r#"{{ "linear_solver": "{name}" }}"#))
            .unwrap()
            .linear_solver
    };
    assert_eq!(parse("sparse_lu"), LinearSolverKind::SparseLu);
    assert_eq!(parse("direct"), LinearSolverKind::SparseLu);
    assert_eq!(parse("dense_lu"), LinearSolverKind::DenseLu);
    assert_eq!(parse("bicgstab"), LinearSolverKind::Bicgstab);
}
