//! Steady-state solutions of the Cahn-Hilliard equation on rectangles, computed with linear
//! finite elements and Newton-Raphson iteration.
//!
//! The pieces fit together as follows:
//!
//! - [`mesh::procedural`] generates a triangle mesh of a rectangle,
//! - [`boundary`] partitions its nodes into boundary and interior nodes,
//! - [`initial`] samples an initial condition at the nodes,
//! - [`newton::NewtonSolver`] iterates, assembling the global system with
//!   [`assembly::global::CsrAssembler`] from the element contributions of
//!   [`assembly::local::CahnHilliardElementAssembler`] and solving the reduced systems with a
//!   [`linsolve::LinearSolver`] (by default the banded LU of [`linsolve::BandedLuSolver`]),
//! - [`io::vtk`] writes the iterates for visualization.
use nalgebra::RealField;

pub mod assembly;
pub mod boundary;
pub mod element;
pub mod error;
pub mod initial;
pub mod io;
pub mod linsolve;
pub mod mesh;
pub mod newton;
pub mod potential;
pub mod reorder;
pub mod settings;

pub extern crate nalgebra;
pub extern crate nalgebra_sparse;
pub extern crate vtkio;

/// Scalar type used by the generic geometry and assembly routines.
pub trait Real: RealField + Copy {}

impl<T> Real for T where T: RealField + Copy {}
