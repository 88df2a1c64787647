use cahn_hilliard::boundary::{classify_rectangle_boundary, BoundaryMode, NodePartition};
use cahn_hilliard::error::PartitionError;
use cahn_hilliard::mesh::procedural::{
    create_rectangular_uniform_tri_mesh_2d, create_unit_square_uniform_tri_mesh_2d, Rectangle,
};
use cahn_hilliard::mesh::NodeId;
use nalgebra::{point, vector};
use proptest::prelude::*;

#[test]
fn free_partition_has_only_interior_nodes() {
    let partition = NodePartition::free(4);
    assert!(!partition.has_boundary());
    assert!(partition.boundary().is_empty());
    assert_eq!(partition.interior(), &[NodeId(0), NodeId(1), NodeId(2), NodeId(3)]);
}

#[test]
fn partition_from_boundary_nodes_is_sorted_and_deduplicated() {
    let partition = NodePartition::from_boundary_nodes(5, [NodeId(3), NodeId(0), NodeId(3)]).unwrap();
    assert_eq!(partition.num_nodes(), 5);
    assert_eq!(partition.boundary(), &[NodeId(0), NodeId(3)]);
    assert_eq!(partition.interior(), &[NodeId(1), NodeId(2), NodeId(4)]);
    assert!(partition.is_boundary(NodeId(3)));
    assert!(!partition.is_boundary(NodeId(4)));
    assert!(!partition.is_boundary(NodeId(10)));
}

#[test]
fn partition_rejects_out_of_bounds_nodes() {
    let result = NodePartition::from_boundary_nodes(3, [NodeId(1), NodeId(3)]);
    assert_eq!(
        result.unwrap_err(),
        PartitionError::NodeOutOfBounds {
            node: NodeId(3),
            num_nodes: 3
        }
    );
}

#[test]
fn unit_square_boundary_is_perimeter() {
    let rect = create_unit_square_uniform_tri_mesh_2d::<f64>(4);
    let partition = BoundaryMode::Dirichlet.partition(&rect);

    assert_eq!(partition.boundary().len(), 16);
    assert_eq!(partition.interior().len(), 9);
    for node in rect.mesh.node_ids() {
        let v = rect.mesh.vertex(node).unwrap();
        let on_side = v.x == 0.0 || v.x == 1.0 || v.y == 0.0 || v.y == 1.0;
        assert_eq!(partition.is_boundary(node), on_side, "node {node} at {v}");
    }
}

#[test]
fn free_mode_has_no_boundary() {
    let rect = create_unit_square_uniform_tri_mesh_2d::<f64>(3);
    let partition = BoundaryMode::Free.partition(&rect);
    assert_eq!(partition, NodePartition::free(16));
}

#[test]
fn anisotropic_rectangle_boundary() {
    // Cells are 0.5 wide and 0.25 tall, so the tolerances are 0.25 in x and 0.125 in y
    let bounds = Rectangle::new(point![-1.0, -1.0], point![1.0, 0.0]);
    let rect = create_rectangular_uniform_tri_mesh_2d(bounds, 4, 4);
    assert_eq!(rect.characteristic_length, 0.5);
    assert_eq!(rect.cell_size, vector![0.5, 0.25]);

    let partition = classify_rectangle_boundary(rect.mesh.vertices(), &rect.bounds, &rect.cell_size);
    for node in partition.interior() {
        let v = rect.mesh.vertex(*node).unwrap();
        assert!(v.x > -1.0 && v.x < 1.0 && v.y > -1.0 && v.y < 0.0);
    }
    // 3 interior columns times 3 interior rows
    assert_eq!(partition.interior().len(), 9);
}

#[test]
fn coarse_direction_does_not_swallow_fine_interior_rows() {
    // dx = 0.5 and dy = 0.1: only the nodes on the sides are boundary nodes, even though the
    // interior rows are closer to the bottom and top than half of dx
    let rect = create_rectangular_uniform_tri_mesh_2d::<f64>(Rectangle::unit_square(), 2, 10);
    let partition = BoundaryMode::Dirichlet.partition(&rect);

    assert_eq!(rect.mesh.num_nodes(), 33);
    assert_eq!(partition.boundary().len(), 24);
    assert_eq!(partition.interior().len(), 9);
    for (k, node) in partition.interior().iter().enumerate() {
        let v = rect.mesh.vertex(*node).unwrap();
        assert!((v.x - 0.5).abs() < 1e-12, "interior node {node} at {v}");
        assert!((v.y - 0.1 * (k + 1) as f64).abs() < 1e-12, "interior node {node} at {v}");
    }

    // The transposed mesh has the same structure with the roles of x and y swapped
    let transposed = create_rectangular_uniform_tri_mesh_2d::<f64>(Rectangle::unit_square(), 10, 2);
    let partition = BoundaryMode::Dirichlet.partition(&transposed);
    assert_eq!(partition.interior().len(), 9);
    for node in partition.interior() {
        assert!((transposed.mesh.vertex(*node).unwrap().y - 0.5).abs() < 1e-12);
    }
}

proptest! {
    #[test]
    fn dirichlet_interior_is_the_inner_grid(
        cells_x in 1usize..15,
        cells_y in 1usize..15,
        width in 0.1..10.0f64,
        height in 0.1..10.0f64,
    ) {
        let bounds = Rectangle::new(point![0.0, 0.0], point![width, height]);
        let rect = create_rectangular_uniform_tri_mesh_2d(bounds, cells_x, cells_y);
        let partition = BoundaryMode::Dirichlet.partition(&rect);
        prop_assert_eq!(partition.interior().len(), (cells_x - 1) * (cells_y - 1));
        prop_assert_eq!(
            partition.boundary().len(),
            (cells_x + 1) * (cells_y + 1) - (cells_x - 1) * (cells_y - 1)
        );
    }
}
