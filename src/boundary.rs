//! Classification of mesh nodes into boundary and interior nodes.
use crate::error::PartitionError;
use crate::mesh::procedural::{Rectangle, RectangularMesh};
use crate::mesh::NodeId;
use crate::Real;
use nalgebra::{Point2, Vector2};
use numeric_literals::replace_float_literals;
use serde::{Deserialize, Serialize};

/// A partition of all mesh nodes into two disjoint, sorted sets.
///
/// Boundary nodes carry homogeneous Dirichlet conditions. An empty boundary set is valid and
/// means the problem is solved without any Dirichlet constraints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodePartition {
    boundary: Vec<NodeId>,
    interior: Vec<NodeId>,
    is_boundary: Vec<bool>,
}

impl NodePartition {
    /// A partition without boundary nodes.
    pub fn free(num_nodes: usize) -> Self {
        Self {
            boundary: Vec::new(),
            interior: (0..num_nodes).map(NodeId).collect(),
            is_boundary: vec![false; num_nodes],
        }
    }

    /// Builds a partition from an arbitrary collection of boundary nodes.
    ///
    /// Duplicate ids are ignored. All remaining nodes are interior.
    pub fn from_boundary_nodes(
        num_nodes: usize,
        boundary_nodes: impl IntoIterator<Item = NodeId>,
    ) -> Result<Self, PartitionError> {
        let mut is_boundary = vec![false; num_nodes];
        for node in boundary_nodes {
            let flag = is_boundary
                .get_mut(node.index())
                .ok_or(PartitionError::NodeOutOfBounds { node, num_nodes })?;
            *flag = true;
        }

        let (boundary, interior) = (0..num_nodes)
            .map(NodeId)
            .partition(|node| is_boundary[node.index()]);

        Ok(Self {
            boundary,
            interior,
            is_boundary,
        })
    }

    pub fn num_nodes(&self) -> usize {
        self.is_boundary.len()
    }

    pub fn boundary(&self) -> &[NodeId] {
        &self.boundary
    }

    pub fn interior(&self) -> &[NodeId] {
        &self.interior
    }

    pub fn is_boundary(&self, node: NodeId) -> bool {
        self.is_boundary.get(node.index()).copied().unwrap_or(false)
    }

    /// Whether Dirichlet conditions are active, i.e. the boundary set is non-empty.
    pub fn has_boundary(&self) -> bool {
        !self.boundary.is_empty()
    }
}

/// Classifies as boundary every vertex lying within half a cell of one of the sides of `bounds`.
///
/// The tolerance is taken per axis: `cell_size.x / 2` against the left and right sides and
/// `cell_size.y / 2` against the bottom and top sides, so that anisotropic cells never pull the
/// first interior row or column into the boundary.
#[replace_float_literals(T::from_f64(literal).unwrap())]
pub fn classify_rectangle_boundary<T>(
    vertices: &[Point2<T>],
    bounds: &Rectangle<T>,
    cell_size: &Vector2<T>,
) -> NodePartition
where
    T: Real,
{
    let tol = cell_size * 0.5;
    let near_side = |v: &Point2<T>| {
        (v.x - bounds.min.x).abs() < tol.x
            || (v.x - bounds.max.x).abs() < tol.x
            || (v.y - bounds.min.y).abs() < tol.y
            || (v.y - bounds.max.y).abs() < tol.y
    };

    let boundary_nodes = vertices
        .iter()
        .enumerate()
        .filter_map(|(idx, v)| near_side(v).then_some(NodeId(idx)));

    NodePartition::from_boundary_nodes(vertices.len(), boundary_nodes)
        .expect("Node ids are taken from the vertex list and therefore in bounds")
}

/// Which nodes carry Dirichlet conditions.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryMode {
    /// Homogeneous Dirichlet conditions on the sides of the rectangle.
    #[default]
    Dirichlet,
    /// No Dirichlet conditions.
    Free,
}

impl BoundaryMode {
    pub fn partition<T: Real>(&self, mesh: &RectangularMesh<T>) -> NodePartition {
        match self {
            Self::Dirichlet => classify_rectangle_boundary(mesh.mesh.vertices(), &mesh.bounds, &mesh.cell_size),
            Self::Free => NodePartition::free(mesh.mesh.num_nodes()),
        }
    }
}
