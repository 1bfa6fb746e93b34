//! # reeb-stream
//!
//! reeb-stream is an online Reeb graph constructor for piecewise-linear
//! scalar fields on simplicial meshes. Simplices are streamed one at a
//! time — triangles for surface meshes, tetrahedra for volume meshes —
//! each carrying per-vertex scalar values, and the crate maintains a
//! directed acyclic multigraph whose nodes are the critical points of the
//! field and whose arcs are the connected-component classes of the level
//! sets. Once the stream closes, the graph can be simplified by removing
//! features below a persistence (or user-defined) threshold while
//! preserving topological consistency.
//!
//! ## Features
//! - Streaming construction with online finalization: regular vertices
//!   are elided as soon as their star is complete, so memory tracks the
//!   advancing front rather than the mesh.
//! - Batch builds over [`mesh::SurfaceMesh`] / [`mesh::VolumeMesh`] with
//!   scalar fields selected directly, by point-data id, or by name.
//! - Loop detection (the loop count of a closed PL 2-manifold is its
//!   genus) and loop-aware simplification.
//! - Persistence-driven branch cancellation with a pluggable
//!   [`metric::SimplificationMetric`].
//! - A flattened, serializable [`digraph::DirectedGraph`] export with
//!   per-node mesh vertex ids and per-arc region vertex lists.
//!
//! ## Usage
//!
//! ```rust
//! use reeb_stream::prelude::*;
//!
//! # fn main() -> Result<(), reeb_stream::reeb_error::ReebGraphError> {
//! let mut graph = ReebGraph::new();
//! graph.stream_triangle(0, 0.0, 1, 1.0, 2, 2.0)?;
//! graph.close_stream()?;
//! assert_eq!(graph.number_of_nodes(), 2);
//! assert_eq!(graph.number_of_arcs(), 1);
//! let removed = graph.simplify(0.1, None)?;
//! assert_eq!(removed, 0);
//! # Ok(())
//! # }
//! ```
//!
//! The core is single-threaded and synchronous; repeated runs on the same
//! input stream produce byte-identical results (scalar ties are broken by
//! vertex id). To snapshot a graph mid-stream, [`ReebGraph::deep_copy`]
//! it and close the copy.

pub mod algs;
pub mod construction;
pub mod debug_invariants;
pub mod digraph;
pub mod mesh;
pub mod metric;
pub mod reeb_error;
pub mod topology;

pub use crate::topology::graph::ReebGraph;

/// A convenient prelude importing the most-used types.
pub mod prelude {
    pub use crate::algs::simplify::Cancellation;
    pub use crate::debug_invariants::DebugInvariants;
    pub use crate::digraph::{DirectedGraph, GraphEdge, GraphNode};
    pub use crate::mesh::{ScalarField, SurfaceMesh, VolumeMesh};
    pub use crate::metric::{PersistenceMetric, SimplificationMetric};
    pub use crate::reeb_error::ReebGraphError;
    pub use crate::topology::graph::{Cursor, ReebGraph};
    pub use crate::topology::handle::{ArcId, LabelId, NodeId};
}
