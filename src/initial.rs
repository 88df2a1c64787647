//! Initial condition presets for the order parameter.
use crate::mesh::procedural::Rectangle;
use nalgebra::{DVector, Point2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// A recipe for sampling the initial order parameter at the mesh nodes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InitialCondition {
    /// `cos(2πx) cos(πy)`.
    #[default]
    Smooth,
    /// Independent uniform samples in `[-amplitude, amplitude]`.
    Random { amplitude: f64, seed: u64 },
    /// `-1` left of the vertical midline of the domain and `+1` elsewhere.
    Discontinuous,
    Constant { value: f64 },
}

impl InitialCondition {
    pub fn sample(&self, vertices: &[Point2<f64>], bounds: &Rectangle<f64>) -> DVector<f64> {
        match *self {
            Self::Smooth => DVector::from_iterator(
                vertices.len(),
                vertices
                    .iter()
                    .map(|v| (2.0 * PI * v.x).cos() * (PI * v.y).cos()),
            ),
            Self::Random { amplitude, seed } => {
                let mut rng = StdRng::seed_from_u64(seed);
                DVector::from_fn(vertices.len(), |_, _| {
                    if amplitude > 0.0 {
                        rng.gen_range(-amplitude..=amplitude)
                    } else {
                        0.0
                    }
                })
            }
            Self::Discontinuous => {
                let midline = bounds.center().x;
                DVector::from_iterator(
                    vertices.len(),
                    vertices
                        .iter()
                        .map(|v| if v.x < midline { -1.0 } else { 1.0 }),
                )
            }
            Self::Constant { value } => DVector::repeat(vertices.len(), value),
        }
    }
}
