//! Export of meshes and nodal solutions to VTK files for visualization.
use crate::mesh::TriangleMesh2d;
use crate::newton::IterateHistory;
use eyre::eyre;
use log::info;
use std::path::{Path, PathBuf};
use vtkio::model::{
    Attribute, Attributes, ByteOrder, CellType, Cells, DataSet, Piece, UnstructuredGridPiece, Version, VertexNumbers,
    Vtk,
};

pub struct FiniteElementMeshDataSetBuilder<'a> {
    mesh: &'a TriangleMesh2d<f64>,
    // Only used for exporting directly to file
    title: Option<String>,
    point_attributes: Vec<Attribute>,
}

impl<'a> FiniteElementMeshDataSetBuilder<'a> {
    pub fn from_mesh(mesh: &'a TriangleMesh2d<f64>) -> Self {
        Self {
            mesh,
            title: None,
            point_attributes: Vec::new(),
        }
    }

    pub fn with_title(self, title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..self
        }
    }

    /// Attaches one scalar value per mesh vertex.
    ///
    /// # Panics
    ///
    /// Panics if the number of values differs from the number of vertices.
    pub fn with_point_scalar_attributes(mut self, name: impl Into<String>, values: &[f64]) -> Self {
        assert_eq!(
            values.len(),
            self.mesh.num_nodes(),
            "Point attributes must have one value per vertex"
        );
        self.point_attributes
            .push(Attribute::scalars(name, 1).with_data(values.to_vec()));
        self
    }

    pub fn try_build(&self) -> eyre::Result<DataSet> {
        // VTK points are always three-dimensional
        let points: Vec<f64> = self
            .mesh
            .vertices()
            .iter()
            .flat_map(|v| [v.x, v.y, 0.0])
            .collect();

        // Vertices is laid out as follows: N, i_1, i_2, ... i_N,
        // so for triangles this becomes 3 followed by the three vertex indices
        let mut vertices = Vec::with_capacity(4 * self.mesh.num_elements());
        for conn in self.mesh.connectivity() {
            vertices.push(3);
            for idx in conn.vertex_indices() {
                vertices.push(u32::try_from(idx).map_err(|_| eyre!("vertex index {} does not fit in u32", idx))?);
            }
        }
        let num_cells =
            u32::try_from(self.mesh.num_elements()).map_err(|_| eyre!("too many cells for a VTK file"))?;

        let piece = UnstructuredGridPiece {
            points: points.into(),
            cells: Cells {
                cell_verts: VertexNumbers::Legacy { num_cells, vertices },
                types: vec![CellType::Triangle; self.mesh.num_elements()],
            },
            data: Attributes {
                point: self.point_attributes.clone(),
                cell: Vec::new(),
            },
        };

        Ok(DataSet::UnstructuredGrid {
            meta: None,
            pieces: vec![Piece::Inline(Box::new(piece))],
        })
    }

    /// Convenience function for directly exporting the dataset to a file.
    ///
    /// The file format is determined by the extension (`.vtk` for legacy, `.vtu` for XML).
    pub fn try_export(&self, filename: impl AsRef<Path>) -> eyre::Result<()> {
        let filepath = filename.as_ref();
        let fallback_title = filepath
            .file_stem()
            .map(|os_str| os_str.to_string_lossy().to_string())
            .unwrap_or_else(|| "untitled".to_string());
        let dataset = self.try_build()?;
        Vtk {
            version: Version { major: 4, minor: 1 },
            title: self.title.clone().unwrap_or(fallback_title),
            byte_order: ByteOrder::BigEndian,
            data: dataset,
            file_path: None,
        }
        .export(filepath)
        .map_err(|err| eyre!("failed to export VTK file {}: {}", filepath.display(), err))?;
        Ok(())
    }
}

/// Writes the nodal solution `u` on the mesh to a single VTK file.
pub fn export_solution(mesh: &TriangleMesh2d<f64>, u: &[f64], path: impl AsRef<Path>) -> eyre::Result<()> {
    FiniteElementMeshDataSetBuilder::from_mesh(mesh)
        .with_title("Cahn-Hilliard steady state")
        .with_point_scalar_attributes("u", u)
        .try_export(path)
}

/// Writes every iterate of the history to `{directory}/{stem}_{k}.vtk`, where `k` is the
/// zero-padded step index, and returns the written paths.
pub fn export_history(
    mesh: &TriangleMesh2d<f64>,
    history: &IterateHistory,
    directory: impl AsRef<Path>,
    stem: &str,
) -> eyre::Result<Vec<PathBuf>> {
    let directory = directory.as_ref();
    let paths = history
        .iterates()
        .iter()
        .enumerate()
        .map(|(step, iterate)| {
            let path = directory.join(format!("{stem}_{step:03}.vtk"));
            FiniteElementMeshDataSetBuilder::from_mesh(mesh)
                .with_title(format!("Newton iterate {step}"))
                .with_point_scalar_attributes("u", iterate.as_slice())
                .try_export(&path)?;
            Ok(path)
        })
        .collect::<eyre::Result<Vec<_>>>()?;
    info!("Exported {} iterates to {}", paths.len(), directory.display());
    Ok(paths)
}
