//! Bandwidth-reducing orderings of sparse matrices.
use nalgebra_sparse::pattern::SparsityPattern;
use std::collections::VecDeque;
use thiserror::Error;

/// A representation of an index permutation.
///
/// More precisely, given `n` objects stored contiguously, the permutation internally
/// stores a permutation array `perm` such that for *target index* `i` in `0 .. n`,
/// the corresponding *source index* is given by
///
/// ```ignore
/// target[i] = source[perm[i]]
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Permutation {
    perm: Vec<usize>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Error)]
#[error("invalid permutation: index {index} is out of bounds or repeated")]
pub struct InvalidPermutation {
    pub index: usize,
}

impl Permutation {
    pub fn identity(n: usize) -> Self {
        Self { perm: (0..n).collect() }
    }

    pub fn from_vec(perm: Vec<usize>) -> Result<Self, InvalidPermutation> {
        let mut visited = vec![false; perm.len()];
        for &index in &perm {
            match visited.get_mut(index) {
                Some(seen @ false) => *seen = true,
                _ => return Err(InvalidPermutation { index }),
            }
        }
        Ok(Self { perm })
    }

    pub fn len(&self) -> usize {
        self.perm.len()
    }

    pub fn is_empty(&self) -> bool {
        self.perm.is_empty()
    }

    pub fn perm(&self) -> &[usize] {
        &self.perm
    }

    pub fn reverse(&mut self) {
        self.perm.reverse()
    }

    pub fn source_index(&self, target_index: usize) -> usize {
        self.perm[target_index]
    }

    pub fn inverse(&self) -> Permutation {
        let mut inverse_perm = vec![usize::MAX; self.len()];
        for (target_idx, &source_idx) in self.perm().iter().enumerate() {
            inverse_perm[source_idx] = target_idx;
        }
        Self { perm: inverse_perm }
    }

    pub fn apply_to_slice<T: Clone>(&self, slice: &[T]) -> Vec<T> {
        assert_eq!(slice.len(), self.len(), "Slice and permutation must have the same size.");
        self.perm()
            .iter()
            .map(|source_idx| slice[*source_idx].clone())
            .collect()
    }
}

/// Lower and upper bandwidth `(kl, ku)` of the pattern after applying `perm` symmetrically to its
/// rows and columns, i.e. the largest `i - j` and `j - i` over all stored entries `(i, j)`.
pub fn permuted_bandwidths(sparsity_pattern: &SparsityPattern, perm: &Permutation) -> (usize, usize) {
    let inverse = perm.inverse();
    let mut lower = 0;
    let mut upper = 0;
    for (target_row, &source_row) in perm.perm().iter().enumerate() {
        for &source_col in sparsity_pattern.lane(source_row) {
            let target_col = inverse.source_index(source_col);
            lower = lower.max(target_row.saturating_sub(target_col));
            upper = upper.max(target_col.saturating_sub(target_row));
        }
    }
    (lower, upper)
}

/// Create a vertex permutation for a sparse structurally symmetric matrix using the
/// Cuthill-McKee algorithm.
///
/// # Panics
///
/// Panics if the pattern is not square.
pub fn cuthill_mckee(sparsity_pattern: &SparsityPattern) -> Permutation {
    let n = sparsity_pattern.major_dim();
    assert_eq!(n, sparsity_pattern.minor_dim(), "Matrix must be square.");

    let adjacent_vertices = |vertex_idx: usize| sparsity_pattern.lane(vertex_idx);
    let vertex_degree = |vertex_idx: usize| adjacent_vertices(vertex_idx).len();

    let mut queue = VecDeque::new();
    let mut permutation = Vec::with_capacity(n);
    let mut visited = vec![false; n];
    let mut adjacency_workspace = Vec::new();

    // Disconnected patterns (block diagonal, empty rows) need one breadth-first search per
    // component, each started from the least-degree vertex not visited so far
    while permutation.len() < n {
        let least_degree_vertex = (0..n)
            .filter(|&vertex_idx| !visited[vertex_idx])
            .min_by_key(|&vertex_idx| vertex_degree(vertex_idx));

        if let Some(start_vertex) = least_degree_vertex {
            queue.push_back(start_vertex);
            visited[start_vertex] = true;

            while let Some(vertex) = queue.pop_front() {
                adjacency_workspace.clear();
                adjacency_workspace.extend_from_slice(adjacent_vertices(vertex));
                adjacency_workspace.sort_unstable_by_key(|&idx| vertex_degree(idx));

                permutation.push(vertex);

                for &adjacent_vertex in &adjacency_workspace {
                    if !visited[adjacent_vertex] {
                        visited[adjacent_vertex] = true;
                        queue.push_back(adjacent_vertex);
                    }
                }
            }
        }
    }

    Permutation { perm: permutation }
}

/// Create a vertex permutation for a sparse structurally symmetric matrix using the
/// Reverse Cuthill-McKee (RCM) algorithm.
pub fn reverse_cuthill_mckee(sparsity_pattern: &SparsityPattern) -> Permutation {
    let mut perm = cuthill_mckee(sparsity_pattern);
    perm.reverse();
    perm
}
