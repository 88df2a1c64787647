//! Basic procedural mesh generation routines.
use crate::mesh::{Tri3Connectivity, TriangleMesh2d};
use crate::Real;
use nalgebra::{Point2, Vector2};
use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle `[min.x, max.x] × [min.y, max.y]`.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(serialize = "T: Serialize", deserialize = "T: Deserialize<'de>"))]
pub struct Rectangle<T: Real> {
    pub min: Point2<T>,
    pub max: Point2<T>,
}

impl<T: Real> Rectangle<T> {
    pub fn new(min: Point2<T>, max: Point2<T>) -> Self {
        Self { min, max }
    }

    pub fn unit_square() -> Self {
        Self::new(Point2::origin(), Point2::new(T::one(), T::one()))
    }

    pub fn extents(&self) -> Vector2<T> {
        self.max - self.min
    }

    pub fn center(&self) -> Point2<T> {
        self.min + self.extents() / (T::one() + T::one())
    }
}

/// A generated mesh of a rectangle, along with the data the boundary classifier needs.
#[derive(Debug, Clone, PartialEq)]
pub struct RectangularMesh<T: Real> {
    pub mesh: TriangleMesh2d<T>,
    pub bounds: Rectangle<T>,
    /// Side lengths `(dx, dy)` of the rectangular cells.
    pub cell_size: Vector2<T>,
    /// The larger of the two cell side lengths.
    pub characteristic_length: T,
}

pub fn create_unit_square_uniform_tri_mesh_2d<T>(cells_per_dim: usize) -> RectangularMesh<T>
where
    T: Real,
{
    create_rectangular_uniform_tri_mesh_2d(Rectangle::unit_square(), cells_per_dim, cells_per_dim)
}

/// Generates a uniform triangle mesh of a rectangle with `cells_x × cells_y` rectangular cells,
/// each split into two counter-clockwise triangles along its diagonal.
///
/// Vertices are numbered row by row, starting in the bottom left corner. If either cell count
/// is zero, the mesh is empty.
pub fn create_rectangular_uniform_tri_mesh_2d<T>(
    bounds: Rectangle<T>,
    cells_x: usize,
    cells_y: usize,
) -> RectangularMesh<T>
where
    T: Real,
{
    if cells_x == 0 || cells_y == 0 {
        return RectangularMesh {
            mesh: TriangleMesh2d::from_vertices_and_connectivity(Vec::new(), Vec::new()),
            bounds,
            cell_size: Vector2::zeros(),
            characteristic_length: T::zero(),
        };
    }

    let extents = bounds.extents();
    let dx = extents.x / T::from_usize(cells_x).expect("Must be able to fit usize in T");
    let dy = extents.y / T::from_usize(cells_y).expect("Must be able to fit usize in T");

    let num_vertices_x = cells_x + 1;
    let to_global_vertex_index = |i, j| num_vertices_x * j + i;

    let mut vertices = Vec::with_capacity(num_vertices_x * (cells_y + 1));
    for j in 0..=cells_y {
        for i in 0..=cells_x {
            let i_as_t = T::from_usize(i).expect("Must be able to fit usize in T");
            let j_as_t = T::from_usize(j).expect("Must be able to fit usize in T");
            vertices.push(bounds.min + Vector2::new(i_as_t * dx, j_as_t * dy));
        }
    }

    let mut connectivity = Vec::with_capacity(2 * cells_x * cells_y);
    for j in 0..cells_y {
        for i in 0..cells_x {
            let sw = to_global_vertex_index(i, j);
            let se = to_global_vertex_index(i + 1, j);
            let nw = to_global_vertex_index(i, j + 1);
            let ne = to_global_vertex_index(i + 1, j + 1);
            connectivity.push(Tri3Connectivity::new(sw, se, ne));
            connectivity.push(Tri3Connectivity::new(sw, ne, nw));
        }
    }

    RectangularMesh {
        mesh: TriangleMesh2d::from_vertices_and_connectivity(vertices, connectivity),
        bounds,
        cell_size: Vector2::new(dx, dy),
        characteristic_length: dx.max(dy),
    }
}
