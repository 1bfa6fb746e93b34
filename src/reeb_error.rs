//! ReebGraphError: unified error type for the reeb-stream public APIs.
//!
//! This error type is used throughout the crate to provide robust,
//! non-panicking error handling for all public APIs. Input-shape errors
//! leave the graph unchanged; stream-state errors leave it in whatever
//! state preceded the bad call, and callers should discard it.

use thiserror::Error;

/// Unified error type for Reeb graph operations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ReebGraphError {
    /// Attempted to construct a handle with a zero value (reserved as null).
    #[error("handle must be non-zero (0 is reserved as the null sentinel)")]
    InvalidHandle,
    /// The scalar field does not have one tuple per mesh vertex.
    #[error("scalar field `{name}` has {got} tuples but the mesh has {expected} vertices")]
    IncorrectField {
        /// Name of the offending field.
        name: String,
        /// Number of mesh vertices.
        expected: usize,
        /// Number of tuples the field actually carries.
        got: usize,
    },
    /// The named or indexed scalar field is absent from the mesh point data.
    #[error("no scalar field {0}")]
    NoSuchField(String),
    /// A cell with the wrong arity was encountered (e.g. a quad in a
    /// triangle mesh). The graph is invalid afterwards.
    #[error("cell {cell} has {arity} vertices; expected {expected}-simplices only")]
    NotSimplicialMesh {
        /// Index of the offending cell.
        cell: usize,
        /// Number of vertices the cell has.
        arity: usize,
        /// Number of vertices a simplex of the mesh dimension has.
        expected: usize,
    },
    /// A cell references a vertex outside the mesh's vertex range.
    #[error("vertex {vertex} referenced by a cell is outside the mesh (vertex count {count})")]
    VertexOutOfRange {
        /// The out-of-range vertex id.
        vertex: i64,
        /// The mesh vertex count.
        count: usize,
    },
    /// A streaming call was made after `close_stream`.
    #[error("the stream has been closed; no further simplices can be added")]
    StreamClosed,
    /// An operation requiring a closed stream was called on an open one.
    #[error("the stream is still open; call close_stream first")]
    StreamOpen,
    /// Simplification threshold outside the unit interval.
    #[error("simplification threshold {0} is outside [0, 1]")]
    InvalidThreshold(f64),
    /// A structural invariant of the graph does not hold. Fatal: the graph
    /// must be discarded.
    #[error("topology invariant violated: {0}")]
    CorruptTopology(String),
}
