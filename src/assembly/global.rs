//! Global assembly of the Newton system from element contributions.
use crate::assembly::local::{CahnHilliardElementAssembler, ElementContribution};
use crate::mesh::{NodeId, Tri3Connectivity, TriangleMesh2d};
use crate::potential::DoubleWellPotential;
use crate::Real;
use log::trace;
use nalgebra::{DVector, DVectorView, Scalar};
use nalgebra_sparse::pattern::SparsityPattern;
use nalgebra_sparse::CsrMatrix;
use rayon::prelude::*;
use std::collections::BTreeSet;

/// The global Jacobian and residual at a given iterate.
#[derive(Debug, Clone, PartialEq)]
pub struct GlobalSystem<T: Scalar> {
    pub jacobian: CsrMatrix<T>,
    pub residual: DVector<T>,
}

impl<T: Real> GlobalSystem<T> {
    /// A system with the given sparsity pattern whose entries are all zero.
    pub fn zeros(pattern: SparsityPattern) -> Self {
        let num_rows = pattern.major_dim();
        let values = vec![T::zero(); pattern.nnz()];
        let jacobian = CsrMatrix::try_from_pattern_and_values(pattern, values)
            .expect("Value count matches the pattern by construction");
        Self {
            jacobian,
            residual: DVector::zeros(num_rows),
        }
    }

    /// Adds an element contribution to the entries belonging to the nodes of the element.
    ///
    /// # Panics
    ///
    /// Panics if a node pair of the element is not part of the sparsity pattern.
    pub fn scatter_add(&mut self, conn: &Tri3Connectivity, contribution: &ElementContribution<T>) {
        let global = conn.vertex_indices();

        for (local_row, &global_row) in global.iter().enumerate() {
            self.residual[global_row] += contribution.residual[local_row];

            let mut csr_row = self.jacobian.row_mut(global_row);
            let (cols, values) = csr_row.cols_and_values_mut();
            for (local_col, &global_col) in global.iter().enumerate() {
                let idx = cols
                    .binary_search(&global_col)
                    .expect("Could not find column index associated with node in CSR row");
                values[idx] += contribution.jacobian[(local_row, local_col)];
            }
        }
    }
}

/// Computes the sparsity pattern of the global matrix: entry `(i, j)` is present if and only if
/// nodes `i` and `j` share at least one triangle.
pub fn assemble_pattern(num_nodes: usize, connectivity: &[Tri3Connectivity]) -> SparsityPattern {
    // Collecting into a BTreeSet stores every entry once, and yields them in row-major order
    let mut matrix_entries = BTreeSet::new();
    for conn in connectivity {
        let nodes = conn.vertex_indices();
        for &node_i in &nodes {
            for &node_j in &nodes {
                matrix_entries.insert((node_i, node_j));
            }
        }
    }

    let mut offsets = Vec::with_capacity(num_nodes + 1);
    let mut column_indices = Vec::with_capacity(matrix_entries.len());

    offsets.push(0);
    for (i, j) in matrix_entries {
        while i + 1 > offsets.len() {
            // Consecutive empty rows require more than one push
            offsets.push(column_indices.len());
        }
        column_indices.push(j);
    }

    while offsets.len() < num_nodes + 1 {
        offsets.push(column_indices.len());
    }

    SparsityPattern::try_from_offsets_and_indices(num_nodes, num_nodes, offsets, column_indices)
        .expect("Offsets and indices are sorted and in bounds by construction")
}

/// Lazily computes the contribution of every triangle of the mesh, in connectivity order.
pub fn element_contributions<'a, T, P>(
    mesh: &'a TriangleMesh2d<T>,
    element_assembler: &'a CahnHilliardElementAssembler<T, P>,
    u: DVectorView<'a, T>,
) -> impl 'a + Iterator<Item = eyre::Result<(Tri3Connectivity, ElementContribution<T>)>>
where
    T: Real,
    P: DoubleWellPotential<T>,
{
    mesh.connectivity().iter().map(move |conn| {
        element_assembler
            .assemble_mesh_element(mesh, conn, u)
            .map(|contribution| (*conn, contribution))
    })
}

/// Assembles the global Newton system for a fixed mesh.
///
/// The sparsity pattern only depends on the mesh, so it is computed once on construction and
/// reused. Each call to [`assemble`](Self::assemble) starts from a zero system, so assembling
/// twice with identical input produces identical output.
#[derive(Debug, Clone)]
pub struct CsrAssembler {
    pattern: SparsityPattern,
}

impl CsrAssembler {
    pub fn from_mesh<T: Scalar>(mesh: &TriangleMesh2d<T>) -> Self {
        let pattern = assemble_pattern(mesh.num_nodes(), mesh.connectivity());
        trace!(
            "Assembled sparsity pattern for {} nodes with {} entries",
            mesh.num_nodes(),
            pattern.nnz()
        );
        Self { pattern }
    }

    pub fn pattern(&self) -> &SparsityPattern {
        &self.pattern
    }

    /// Folds the element contributions into a zero-initialized system by scatter-adding.
    pub fn assemble<T, P>(
        &self,
        mesh: &TriangleMesh2d<T>,
        element_assembler: &CahnHilliardElementAssembler<T, P>,
        u: DVectorView<T>,
    ) -> eyre::Result<GlobalSystem<T>>
    where
        T: Real,
        P: DoubleWellPotential<T>,
    {
        self.check_dimensions(mesh, u.len())?;
        element_contributions(mesh, element_assembler, u).try_fold(
            GlobalSystem::zeros(self.pattern.clone()),
            |mut system, item| {
                let (conn, contribution) = item?;
                system.scatter_add(&conn, &contribution);
                Ok(system)
            },
        )
    }

    /// Same as [`assemble`](Self::assemble), but computes the element contributions in parallel.
    ///
    /// The contributions are scattered sequentially in connectivity order afterwards, so the
    /// result is bit-identical to the serial assembly.
    pub fn par_assemble<T, P>(
        &self,
        mesh: &TriangleMesh2d<T>,
        element_assembler: &CahnHilliardElementAssembler<T, P>,
        u: DVectorView<T>,
    ) -> eyre::Result<GlobalSystem<T>>
    where
        T: Real + Send + Sync,
        P: DoubleWellPotential<T> + Sync,
    {
        self.check_dimensions(mesh, u.len())?;
        let contributions = mesh
            .connectivity()
            .par_iter()
            .with_min_len(64)
            .map(|conn| element_assembler.assemble_mesh_element(mesh, conn, u))
            .collect::<eyre::Result<Vec<_>>>()?;

        let mut system = GlobalSystem::zeros(self.pattern.clone());
        for (conn, contribution) in mesh.connectivity().iter().zip(&contributions) {
            system.scatter_add(conn, contribution);
        }
        Ok(system)
    }

    fn check_dimensions<T: Scalar>(&self, mesh: &TriangleMesh2d<T>, u_len: usize) -> eyre::Result<()> {
        let n = self.pattern.major_dim();
        if mesh.num_nodes() != n || u_len != n {
            return Err(eyre::eyre!(
                "Dimension mismatch: assembler has {} nodes, mesh has {} nodes and u has length {}",
                n,
                mesh.num_nodes(),
                u_len
            ));
        }
        Ok(())
    }
}

/// Assembles the global Jacobian and residual at `u` with the quartic double-well potential.
pub fn assemble_global<T: Real>(
    mesh: &TriangleMesh2d<T>,
    u: DVectorView<T>,
    epsilon: T,
) -> eyre::Result<GlobalSystem<T>> {
    CsrAssembler::from_mesh(mesh).assemble(mesh, &CahnHilliardElementAssembler::new(epsilon), u)
}

/// Restricts a square CSR matrix to the rows and columns of the given nodes.
///
/// The nodes must be sorted in ascending order. Row and column `k` of the result correspond to
/// `nodes[k]`.
pub fn restrict_csr<T: Real>(matrix: &CsrMatrix<T>, nodes: &[NodeId]) -> CsrMatrix<T> {
    assert_eq!(matrix.nrows(), matrix.ncols(), "Matrix must be square");
    debug_assert!(nodes.windows(2).all(|w| w[0] < w[1]), "Nodes must be sorted and unique");

    let mut reduced_index = vec![None; matrix.nrows()];
    for (k, node) in nodes.iter().enumerate() {
        reduced_index[node.index()] = Some(k);
    }

    let mut offsets = Vec::with_capacity(nodes.len() + 1);
    let mut column_indices = Vec::new();
    let mut values = Vec::new();
    offsets.push(0);
    for node in nodes {
        let row = matrix.row(node.index());
        for (&col, &val) in row.col_indices().iter().zip(row.values()) {
            if let Some(k) = reduced_index[col] {
                column_indices.push(k);
                values.push(val);
            }
        }
        offsets.push(column_indices.len());
    }

    CsrMatrix::try_from_csr_data(nodes.len(), nodes.len(), offsets, column_indices, values)
        .expect("Restriction of a valid CSR matrix to sorted nodes is valid")
}

/// Gathers the entries of `v` at the given nodes.
pub fn restrict_vector<T: Real>(v: DVectorView<T>, nodes: &[NodeId]) -> DVector<T> {
    DVector::from_iterator(nodes.len(), nodes.iter().map(|node| v[node.index()]))
}
