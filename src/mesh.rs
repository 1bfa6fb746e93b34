//! Thin mesh and scalar-field adapters for batch construction.
//!
//! The streaming core only ever sees one simplex at a time; these
//! containers exist so whole meshes can be fed through it in a single
//! call. A [`SurfaceMesh`] holds triangles, a [`VolumeMesh`] tetrahedra;
//! both accept arbitrary-arity cells so that non-simplicial input can be
//! detected and rejected rather than silently mangled. Scalar fields are
//! plain per-vertex tuple arrays, optionally registered as named point
//! data on the mesh for the by-id / by-name build variants.

use crate::reeb_error::ReebGraphError;
use crate::topology::elements::VertexId;
use crate::topology::graph::ReebGraph;
use std::collections::BTreeMap;

/// A named per-vertex scalar array.
#[derive(Clone, Debug, PartialEq)]
pub struct ScalarField {
    name: String,
    values: Vec<f64>,
}

impl ScalarField {
    /// A field with one tuple per mesh vertex.
    pub fn new(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    /// The field name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of tuples.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when the field carries no tuples.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value at `vertex`.
    pub fn value(&self, vertex: VertexId) -> f64 {
        self.values[vertex as usize]
    }
}

/// Cells plus point data; generic over cell arity so that validation can
/// reject non-simplicial input.
#[derive(Clone, Debug, Default)]
struct CellMesh {
    vertex_count: usize,
    cells: Vec<Vec<VertexId>>,
    point_data: Vec<ScalarField>,
}

impl CellMesh {
    fn field_by_id(&self, id: usize) -> Result<&ScalarField, ReebGraphError> {
        self.point_data
            .get(id)
            .ok_or_else(|| ReebGraphError::NoSuchField(format!("with id {id}")))
    }

    fn field_by_name(&self, name: &str) -> Result<&ScalarField, ReebGraphError> {
        self.point_data
            .iter()
            .find(|f| f.name == name)
            .ok_or_else(|| ReebGraphError::NoSuchField(format!("named `{name}`")))
    }
}

/// A triangle mesh (2D simplicial complex).
#[derive(Clone, Debug, Default)]
pub struct SurfaceMesh {
    inner: CellMesh,
}

impl SurfaceMesh {
    /// An empty mesh over `vertex_count` vertices.
    pub fn new(vertex_count: usize) -> Self {
        Self {
            inner: CellMesh {
                vertex_count,
                ..CellMesh::default()
            },
        }
    }

    /// Number of vertices.
    pub fn vertex_count(&self) -> usize {
        self.inner.vertex_count
    }

    /// Number of cells.
    pub fn cell_count(&self) -> usize {
        self.inner.cells.len()
    }

    /// Append a triangle.
    pub fn add_triangle(&mut self, vertices: [VertexId; 3]) {
        self.inner.cells.push(vertices.to_vec());
    }

    /// Append a cell of arbitrary arity. Non-triangles make every build
    /// call fail with `NotSimplicialMesh`.
    pub fn add_cell(&mut self, vertices: Vec<VertexId>) {
        self.inner.cells.push(vertices);
    }

    /// Register a named per-vertex field, returning its id.
    pub fn attach_field(&mut self, field: ScalarField) -> usize {
        self.inner.point_data.push(field);
        self.inner.point_data.len() - 1
    }
}

/// A tetrahedral mesh (3D simplicial complex).
#[derive(Clone, Debug, Default)]
pub struct VolumeMesh {
    inner: CellMesh,
}

impl VolumeMesh {
    /// An empty mesh over `vertex_count` vertices.
    pub fn new(vertex_count: usize) -> Self {
        Self {
            inner: CellMesh {
                vertex_count,
                ..CellMesh::default()
            },
        }
    }

    /// Number of vertices.
    pub fn vertex_count(&self) -> usize {
        self.inner.vertex_count
    }

    /// Number of cells.
    pub fn cell_count(&self) -> usize {
        self.inner.cells.len()
    }

    /// Append a tetrahedron.
    pub fn add_tetrahedron(&mut self, vertices: [VertexId; 4]) {
        self.inner.cells.push(vertices.to_vec());
    }

    /// Append a cell of arbitrary arity. Non-tetrahedra make every build
    /// call fail with `NotSimplicialMesh`.
    pub fn add_cell(&mut self, vertices: Vec<VertexId>) {
        self.inner.cells.push(vertices);
    }

    /// Register a named per-vertex field, returning its id.
    pub fn attach_field(&mut self, field: ScalarField) -> usize {
        self.inner.point_data.push(field);
        self.inner.point_data.len() - 1
    }
}

impl ReebGraph {
    /// Build the Reeb graph of `field` over a surface mesh, processing
    /// every triangle once and closing the stream.
    pub fn build_surface(
        &mut self,
        mesh: &SurfaceMesh,
        field: &ScalarField,
    ) -> Result<(), ReebGraphError> {
        self.build_cells(&mesh.inner, field, 3)
    }

    /// Build from the surface mesh field with the given point-data id.
    pub fn build_surface_by_id(
        &mut self,
        mesh: &SurfaceMesh,
        field_id: usize,
    ) -> Result<(), ReebGraphError> {
        let field = mesh.inner.field_by_id(field_id)?.clone();
        self.build_cells(&mesh.inner, &field, 3)
    }

    /// Build from the surface mesh field with the given name.
    pub fn build_surface_by_name(
        &mut self,
        mesh: &SurfaceMesh,
        field_name: &str,
    ) -> Result<(), ReebGraphError> {
        let field = mesh.inner.field_by_name(field_name)?.clone();
        self.build_cells(&mesh.inner, &field, 3)
    }

    /// Build the Reeb graph of `field` over a volume mesh, processing
    /// every tetrahedron once and closing the stream.
    pub fn build_volume(
        &mut self,
        mesh: &VolumeMesh,
        field: &ScalarField,
    ) -> Result<(), ReebGraphError> {
        self.build_cells(&mesh.inner, field, 4)
    }

    /// Build from the volume mesh field with the given point-data id.
    pub fn build_volume_by_id(
        &mut self,
        mesh: &VolumeMesh,
        field_id: usize,
    ) -> Result<(), ReebGraphError> {
        let field = mesh.inner.field_by_id(field_id)?.clone();
        self.build_cells(&mesh.inner, &field, 4)
    }

    /// Build from the volume mesh field with the given name.
    pub fn build_volume_by_name(
        &mut self,
        mesh: &VolumeMesh,
        field_name: &str,
    ) -> Result<(), ReebGraphError> {
        let field = mesh.inner.field_by_name(field_name)?.clone();
        self.build_cells(&mesh.inner, &field, 4)
    }

    fn build_cells(
        &mut self,
        mesh: &CellMesh,
        field: &ScalarField,
        arity: usize,
    ) -> Result<(), ReebGraphError> {
        if field.len() != mesh.vertex_count {
            return Err(ReebGraphError::IncorrectField {
                name: field.name.clone(),
                expected: mesh.vertex_count,
                got: field.len(),
            });
        }
        for (cell, vertices) in mesh.cells.iter().enumerate() {
            if vertices.len() != arity {
                return Err(ReebGraphError::NotSimplicialMesh {
                    cell,
                    arity: vertices.len(),
                    expected: arity,
                });
            }
            for &v in vertices {
                if v < 0 || v as usize >= mesh.vertex_count {
                    return Err(ReebGraphError::VertexOutOfRange {
                        vertex: v,
                        count: mesh.vertex_count,
                    });
                }
            }
        }

        // Pre-count vertex stars so finalization happens online.
        let mut stars: BTreeMap<VertexId, usize> = BTreeMap::new();
        for vertices in &mesh.cells {
            for &v in vertices {
                *stars.entry(v).or_insert(0) += 1;
            }
        }
        for (v, count) in stars {
            self.declare_vertex_star(v, count)?;
        }

        for vertices in &mesh.cells {
            match arity {
                3 => self.stream_triangle(
                    vertices[0],
                    field.value(vertices[0]),
                    vertices[1],
                    field.value(vertices[1]),
                    vertices[2],
                    field.value(vertices[2]),
                )?,
                4 => self.stream_tetrahedron(
                    vertices[0],
                    field.value(vertices[0]),
                    vertices[1],
                    field.value(vertices[1]),
                    vertices[2],
                    field.value(vertices[2]),
                    vertices[3],
                    field.value(vertices[3]),
                )?,
                _ => unreachable!("cells validated above"),
            }
        }
        self.close_stream()
    }
}
