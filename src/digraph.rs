//! Exported directed-graph representation.
//!
//! `commit_simplification` flattens the internal arena tables into this
//! plain container: one entry per critical node carrying its mesh vertex
//! id and scalar value, one entry per arc carrying the ascending-sorted
//! vertex ids of the mesh region the arc represents. The container is the
//! interchange surface of the crate — serializable, independent of the
//! arena handles, and replaceable through
//! [`ReebGraph::set_graph`](crate::topology::graph::ReebGraph::set_graph)
//! for post-processing pipelines.

use crate::topology::elements::VertexId;
use serde::{Deserialize, Serialize};

/// A node of the exported graph: a critical point of the field.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    /// Identity of the critical point in the input mesh.
    pub vertex_id: VertexId,
    /// Scalar field value at the critical point.
    pub value: f64,
}

/// An edge of the exported graph: a region of the mesh between two
/// critical contours, oriented from lower to upper critical point.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GraphEdge {
    /// Index of the lower endpoint in the node list.
    pub source: usize,
    /// Index of the upper endpoint in the node list.
    pub target: usize,
    /// Mesh vertex ids interior to the region, sorted by function value.
    pub region: Vec<VertexId>,
}

/// The flattened Reeb graph published at commit time.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DirectedGraph {
    nodes: Vec<GraphNode>,
    edges: Vec<GraphEdge>,
}

impl DirectedGraph {
    /// An empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of edges.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// All nodes, in commit order.
    pub fn nodes(&self) -> &[GraphNode] {
        &self.nodes
    }

    /// All edges, in commit order.
    pub fn edges(&self) -> &[GraphEdge] {
        &self.edges
    }

    /// Append a node, returning its dense index.
    pub fn add_node(&mut self, vertex_id: VertexId, value: f64) -> usize {
        self.nodes.push(GraphNode { vertex_id, value });
        self.nodes.len() - 1
    }

    /// Append an edge from node index `source` to `target`.
    pub fn add_edge(&mut self, source: usize, target: usize, region: Vec<VertexId>) -> usize {
        debug_assert!(source < self.nodes.len() && target < self.nodes.len());
        self.edges.push(GraphEdge {
            source,
            target,
            region,
        });
        self.edges.len() - 1
    }

    /// Edges leaving node index `i` upward.
    pub fn out_edges(&self, i: usize) -> impl Iterator<Item = &GraphEdge> {
        self.edges.iter().filter(move |e| e.source == i)
    }

    /// Edges arriving at node index `i` from below.
    pub fn in_edges(&self, i: usize) -> impl Iterator<Item = &GraphEdge> {
        self.edges.iter().filter(move |e| e.target == i)
    }
}
