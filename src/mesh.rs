use crate::element::Tri3Element;
use crate::error::MeshError;
use crate::Real;
use itertools::Itertools;
use nalgebra::{distance, try_convert, Point2, Scalar};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Deref;

pub mod procedural;

/// Stable identifier of a mesh node.
///
/// Node ids index into the vertex arena of a [`TriangleMesh2d`], and into any per-node vector
/// (solution iterates, residuals) associated with that mesh.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(pub usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl From<usize> for NodeId {
    fn from(index: usize) -> Self {
        Self(index)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Connectivity of a linear triangle: three node ids, ordered counter-clockwise.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tri3Connectivity(pub [NodeId; 3]);

impl Tri3Connectivity {
    pub fn new(a: usize, b: usize, c: usize) -> Self {
        Self([NodeId(a), NodeId(b), NodeId(c)])
    }

    pub fn vertex_indices(&self) -> [usize; 3] {
        self.0.map(NodeId::index)
    }

    /// Returns the element formed by the vertices referenced by this connectivity.
    ///
    /// Returns `None` if any node id is out of bounds.
    pub fn element<T: Scalar>(&self, vertices: &[Point2<T>]) -> Option<Tri3Element<T>> {
        Some(Tri3Element::from_vertices([
            vertices.get(self.0[0].index()).cloned()?,
            vertices.get(self.0[1].index()).cloned()?,
            vertices.get(self.0[2].index()).cloned()?,
        ]))
    }
}

impl Deref for Tri3Connectivity {
    type Target = [NodeId; 3];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Index-based triangle mesh in two dimensions.
///
/// The vertex list is an arena addressed by [`NodeId`]. The mesh is immutable once constructed,
/// and is shared read-only by every step of a solve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(serialize = "T: Serialize", deserialize = "T: Deserialize<'de>"))]
pub struct TriangleMesh2d<T: Scalar> {
    vertices: Vec<Point2<T>>,
    connectivity: Vec<Tri3Connectivity>,
}

impl<T: Scalar> TriangleMesh2d<T> {
    /// Construct a mesh from vertices and connectivity without validating it.
    ///
    /// Users of the mesh are permitted to panic if the connectivity references vertices out of
    /// bounds. Use [`try_from_vertices_and_connectivity`](Self::try_from_vertices_and_connectivity)
    /// or [`validate`](Self::validate) for untrusted input.
    pub fn from_vertices_and_connectivity(vertices: Vec<Point2<T>>, connectivity: Vec<Tri3Connectivity>) -> Self {
        Self { vertices, connectivity }
    }

    pub fn vertices(&self) -> &[Point2<T>] {
        &self.vertices
    }

    pub fn vertex(&self, node: NodeId) -> Option<&Point2<T>> {
        self.vertices.get(node.index())
    }

    pub fn connectivity(&self) -> &[Tri3Connectivity] {
        &self.connectivity
    }

    pub fn num_nodes(&self) -> usize {
        self.vertices.len()
    }

    pub fn num_elements(&self) -> usize {
        self.connectivity.len()
    }

    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> {
        (0..self.vertices.len()).map(NodeId)
    }
}

impl<T: Real> TriangleMesh2d<T> {
    /// Construct a mesh, checking that every triangle references three distinct, in-bounds nodes
    /// and has positive signed area.
    pub fn try_from_vertices_and_connectivity(
        vertices: Vec<Point2<T>>,
        connectivity: Vec<Tri3Connectivity>,
    ) -> Result<Self, MeshError> {
        let mesh = Self::from_vertices_and_connectivity(vertices, connectivity);
        mesh.validate()?;
        Ok(mesh)
    }

    pub fn validate(&self) -> Result<(), MeshError> {
        for (node, v) in self.vertices.iter().enumerate() {
            if !(v.x.is_finite() && v.y.is_finite()) {
                return Err(MeshError::NonFiniteVertex { node: NodeId(node) });
            }
        }

        let num_vertices = self.vertices.len();
        for (element, conn) in self.connectivity.iter().enumerate() {
            for &node in conn.iter() {
                if node.index() >= num_vertices {
                    return Err(MeshError::NodeOutOfBounds {
                        element,
                        node,
                        num_vertices,
                    });
                }
            }
            if let Some((a, _)) = conn.iter().tuple_combinations().find(|(a, b)| a == b) {
                return Err(MeshError::RepeatedNode { element, node: *a });
            }

            let area = conn
                .element(&self.vertices)
                .expect("Indices were checked above")
                .signed_area();
            if area <= T::zero() {
                return Err(MeshError::DegenerateElement {
                    element,
                    area: try_convert(area).unwrap_or(f64::NAN),
                });
            }
        }
        Ok(())
    }

    pub fn element_iter(&self) -> impl '_ + Iterator<Item = Tri3Element<T>> {
        self.connectivity.iter().map(move |conn| {
            conn.element(&self.vertices)
                .expect("Mesh is not allowed to contain cells with indices out of bounds.")
        })
    }

    /// The length of the longest edge in the mesh.
    pub fn max_edge_length(&self) -> T {
        self.element_iter()
            .flat_map(|element| {
                let v = *element.vertices();
                v.into_iter()
                    .tuple_combinations()
                    .map(|(a, b)| distance(&a, &b))
                    .collect::<Vec<_>>()
            })
            .fold(T::zero(), |a, b| a.max(b))
    }
}
