//! Node, arc and label records.
//!
//! The three record kinds mirror the data model of the streaming Reeb graph
//! algorithm: nodes are (possibly transient) mesh vertices, arcs are
//! monotonic level-set regions between two nodes, and labels thread the
//! propagation chains that the zipping step follows. All cross-references
//! are arena handles; `None` plays the role the null index plays in the
//! tables.

use crate::topology::handle::{ArcId, LabelId, NodeId};

/// Identifier of a propagation chain. Tags are derived from the stream
/// indices of a mesh edge's endpoints; `0` means "no label" in
/// [`add_path`](crate::topology::graph::ReebGraph::add_path).
pub type LabelTag = u64;

/// A mesh vertex id in the input mesh.
pub type VertexId = i64;

/// A regular mesh vertex elided into an arc's interior, kept with its
/// scalar value so that arc splits can partition regions by level.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SpanVertex {
    /// Mesh vertex id.
    pub vertex: VertexId,
    /// Scalar field value at the vertex.
    pub value: f64,
}

/// A critical point of the scalar field, or a transient mesh vertex while
/// its star is still streaming in.
#[derive(Clone, Debug)]
pub struct Node {
    /// Identity in the input mesh.
    pub vertex_id: VertexId,
    /// Scalar field value.
    pub value: f64,
    /// Head of the doubly linked list of arcs arriving from below.
    pub arc_down: Option<ArcId>,
    /// Head of the doubly linked list of arcs leaving above.
    pub arc_up: Option<ArcId>,
    /// Set once every incident mesh simplex has been seen.
    pub is_finalized: bool,
    /// Set once confirmed as a genuine critical point.
    pub is_critical: bool,
}

impl Node {
    /// A fresh, unconnected node for a mesh vertex.
    pub fn new(vertex_id: VertexId, value: f64) -> Self {
        Self {
            vertex_id,
            value,
            arc_down: None,
            arc_up: None,
            is_finalized: false,
            is_critical: false,
        }
    }
}

/// A monotonic path between two nodes, `node0` below `node1` in the vertex
/// order.
///
/// `up0`/`dw0` are the previous/next siblings in `node0`'s up-arc list;
/// `up1`/`dw1` the previous/next siblings in `node1`'s down-arc list.
#[derive(Clone, Debug)]
pub struct Arc {
    /// Lower endpoint.
    pub node0: NodeId,
    /// Upper endpoint.
    pub node1: NodeId,
    /// Previous sibling in `node0`'s up-arc list.
    pub up0: Option<ArcId>,
    /// Next sibling in `node0`'s up-arc list.
    pub dw0: Option<ArcId>,
    /// Previous sibling in `node1`'s down-arc list.
    pub up1: Option<ArcId>,
    /// Next sibling in `node1`'s down-arc list.
    pub dw1: Option<ArcId>,
    /// Head of the horizontal label list.
    pub label0: Option<LabelId>,
    /// Tail of the horizontal label list.
    pub label1: Option<LabelId>,
    /// Regular vertices elided into this arc's interior.
    pub span: Vec<SpanVertex>,
}

impl Arc {
    /// A fresh arc between `node0 < node1`, not yet threaded into any list.
    pub fn new(node0: NodeId, node1: NodeId) -> Self {
        Self {
            node0,
            node1,
            up0: None,
            dw0: None,
            up1: None,
            dw1: None,
            label0: None,
            label1: None,
            span: Vec::new(),
        }
    }
}

/// A marker tying an arc to a propagation chain.
///
/// Labels on the same arc thread the horizontal list (`h_prev`/`h_next`);
/// labels with the same tag on consecutive arcs of a monotone path thread
/// the vertical chain (`v_prev`/`v_next`).
#[derive(Clone, Debug)]
pub struct Label {
    /// Owning arc.
    pub arc: ArcId,
    /// Chain identifier.
    pub tag: LabelTag,
    /// Previous label on the same arc.
    pub h_prev: Option<LabelId>,
    /// Next label on the same arc.
    pub h_next: Option<LabelId>,
    /// Chain predecessor (on the arc below).
    pub v_prev: Option<LabelId>,
    /// Chain successor (on the arc above).
    pub v_next: Option<LabelId>,
}

impl Label {
    /// A fresh label for `arc` with the given chain tag, unthreaded.
    pub fn new(arc: ArcId, tag: LabelTag) -> Self {
        Self {
            arc,
            tag,
            h_prev: None,
            h_next: None,
            v_prev: None,
            v_next: None,
        }
    }
}
