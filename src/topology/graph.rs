//! Reeb graph storage and graph surgery primitives.
//!
//! [`ReebGraph`] owns the three arena tables plus the streaming bookkeeping
//! (vertex map, scalar range, loop table, cancellation history) and exposes
//! the low-level list surgery every higher layer is built from: arc
//! insertion and removal in the per-node incidence lists, arc splitting and
//! merging, and the degree-2 vertex collapse. All of these manipulate the
//! doubly linked sibling links in place; none of them allocates beyond the
//! arena tables.
//!
//! The query surface (counts, per-node and per-arc accessors, cursors) also
//! lives here. Iteration state is carried by cursor values returned to the
//! caller, never by the graph itself.

use crate::algs::simplify::Cancellation;
use crate::debug_invariants::DebugInvariants;
use crate::digraph::DirectedGraph;
use crate::reeb_error::ReebGraphError;
use crate::topology::arena::Table;
use crate::topology::elements::{Arc, Label, LabelTag, Node, SpanVertex, VertexId};
use crate::topology::handle::{ArcId, LabelId, NodeId};
use crate::topology::order::is_below;
use once_cell::sync::OnceCell;
use std::collections::BTreeMap;

/// Streaming bookkeeping for one mesh vertex.
#[derive(Clone, Debug)]
pub(crate) struct VertexEntry {
    /// Node allocated for the vertex (may be freed once the vertex is
    /// finalized and elided).
    pub(crate) node: NodeId,
    /// First-seen counter, used to derive edge label tags.
    pub(crate) stream_id: u32,
    /// Incident cells not yet streamed, when the caller declared a count.
    pub(crate) pending: Option<usize>,
    /// Set once the vertex went through `end_vertex`.
    pub(crate) finalized: bool,
}

/// An online Reeb graph under construction, and after `close_stream` the
/// finished graph with its simplification machinery.
///
/// The graph is single-threaded and synchronous; determinism is governed by
/// stream input order and the `(value, vertex id)` vertex order alone.
#[derive(Clone, Debug)]
pub struct ReebGraph {
    pub(crate) nodes: Table<NodeId, Node>,
    pub(crate) arcs: Table<ArcId, Arc>,
    pub(crate) labels: Table<LabelId, Label>,
    /// Mesh vertex id -> streaming entry. Ordered so that close-time
    /// finalization sweeps vertices deterministically.
    pub(crate) vertices: BTreeMap<VertexId, VertexEntry>,
    /// Star sizes declared before their vertex first appears on the stream.
    pub(crate) declared_stars: BTreeMap<VertexId, usize>,
    pub(crate) min_value: f64,
    pub(crate) max_value: f64,
    /// Closing arcs of the independent cycles, recorded by `find_loops`.
    pub(crate) loop_arcs: Vec<ArcId>,
    pub(crate) removed_loops: usize,
    pub(crate) components: OnceCell<usize>,
    pub(crate) stream_closed: bool,
    pub(crate) history_on: bool,
    pub(crate) history: Vec<Cancellation>,
    pub(crate) graph: DirectedGraph,
}

impl ReebGraph {
    /// Create an empty graph ready for streaming.
    pub fn new() -> Self {
        Self {
            nodes: Table::new(),
            arcs: Table::new(),
            labels: Table::new(),
            vertices: BTreeMap::new(),
            declared_stars: BTreeMap::new(),
            min_value: f64::INFINITY,
            max_value: f64::NEG_INFINITY,
            loop_arcs: Vec::new(),
            removed_loops: 0,
            components: OnceCell::new(),
            stream_closed: false,
            history_on: false,
            history: Vec::new(),
            graph: DirectedGraph::default(),
        }
    }

    /// Produce an independent clone of the whole graph state.
    ///
    /// To snapshot a graph mid-stream, deep-copy it first and call
    /// [`close_stream`](Self::close_stream) on the copy.
    pub fn deep_copy(&self) -> Self {
        self.clone()
    }

    // ---- element access --------------------------------------------------

    #[inline]
    pub(crate) fn node(&self, n: NodeId) -> &Node {
        self.nodes.get(n)
    }

    #[inline]
    pub(crate) fn node_mut(&mut self, n: NodeId) -> &mut Node {
        self.nodes.get_mut(n)
    }

    #[inline]
    pub(crate) fn arc(&self, a: ArcId) -> &Arc {
        self.arcs.get(a)
    }

    #[inline]
    pub(crate) fn arc_mut(&mut self, a: ArcId) -> &mut Arc {
        self.arcs.get_mut(a)
    }

    #[inline]
    pub(crate) fn label(&self, l: LabelId) -> &Label {
        self.labels.get(l)
    }

    /// Structural mutation entry point: drops derived caches.
    #[inline]
    fn touch(&mut self) {
        self.components.take();
    }

    pub(crate) fn alloc_node(&mut self, node: Node) -> NodeId {
        self.touch();
        self.nodes.alloc(node)
    }

    pub(crate) fn free_node(&mut self, n: NodeId) {
        self.touch();
        self.nodes.free(n);
    }

    pub(crate) fn alloc_arc(&mut self, arc: Arc) -> ArcId {
        self.touch();
        self.arcs.alloc(arc)
    }

    /// Free an arc record. The caller must already have unlinked it from
    /// both endpoint lists.
    pub(crate) fn free_arc(&mut self, a: ArcId) {
        self.touch();
        self.arcs.free(a);
    }

    pub(crate) fn alloc_label(&mut self, label: Label) -> LabelId {
        self.labels.alloc(label)
    }

    /// Free a label record. The caller must already have unthreaded it.
    pub(crate) fn free_label(&mut self, l: LabelId) {
        self.labels.free(l);
    }

    /// True when `a` precedes `b` in the `(value, vertex id)` vertex order.
    #[inline]
    pub(crate) fn node_is_below(&self, a: NodeId, b: NodeId) -> bool {
        let na = self.nodes.get(a);
        let nb = self.nodes.get(b);
        is_below((na.vertex_id, na.value), (nb.vertex_id, nb.value))
    }

    // ---- incidence list surgery ------------------------------------------

    /// Insert `a` at the head of `n`'s up-arc list.
    pub(crate) fn add_up_arc(&mut self, n: NodeId, a: ArcId) {
        let head = self.nodes.get(n).arc_up;
        {
            let arc = self.arcs.get_mut(a);
            arc.up0 = None;
            arc.dw0 = head;
        }
        if let Some(h) = head {
            self.arcs.get_mut(h).up0 = Some(a);
        }
        self.nodes.get_mut(n).arc_up = Some(a);
    }

    /// Insert `a` at the head of `n`'s down-arc list.
    pub(crate) fn add_down_arc(&mut self, n: NodeId, a: ArcId) {
        let head = self.nodes.get(n).arc_down;
        {
            let arc = self.arcs.get_mut(a);
            arc.up1 = None;
            arc.dw1 = head;
        }
        if let Some(h) = head {
            self.arcs.get_mut(h).up1 = Some(a);
        }
        self.nodes.get_mut(n).arc_down = Some(a);
    }

    /// Unlink `a` from `n`'s up-arc list, updating the head if needed.
    pub(crate) fn remove_up_arc(&mut self, n: NodeId, a: ArcId) {
        let (up0, dw0) = {
            let arc = self.arcs.get(a);
            (arc.up0, arc.dw0)
        };
        match up0 {
            Some(prev) => self.arcs.get_mut(prev).dw0 = dw0,
            None => self.nodes.get_mut(n).arc_up = dw0,
        }
        if let Some(next) = dw0 {
            self.arcs.get_mut(next).up0 = up0;
        }
    }

    /// Unlink `a` from `n`'s down-arc list, updating the head if needed.
    pub(crate) fn remove_down_arc(&mut self, n: NodeId, a: ArcId) {
        let (up1, dw1) = {
            let arc = self.arcs.get(a);
            (arc.up1, arc.dw1)
        };
        match up1 {
            Some(prev) => self.arcs.get_mut(prev).dw1 = dw1,
            None => self.nodes.get_mut(n).arc_down = dw1,
        }
        if let Some(next) = dw1 {
            self.arcs.get_mut(next).up1 = up1;
        }
    }

    /// Number of arcs arriving at `n` from below.
    pub fn down_degree(&self, n: NodeId) -> usize {
        let mut count = 0;
        let mut a = self.nodes.get(n).arc_down;
        while let Some(ai) = a {
            count += 1;
            a = self.arcs.get(ai).dw1;
        }
        count
    }

    /// Number of arcs leaving `n` upward.
    pub fn up_degree(&self, n: NodeId) -> usize {
        let mut count = 0;
        let mut a = self.nodes.get(n).arc_up;
        while let Some(ai) = a {
            count += 1;
            a = self.arcs.get(ai).dw0;
        }
        count
    }

    /// Ids of the arcs leaving `n` upward, in list order.
    pub fn node_up_arc_ids(&self, n: NodeId) -> Vec<ArcId> {
        let mut out = Vec::new();
        let mut a = self.nodes.get(n).arc_up;
        while let Some(ai) = a {
            out.push(ai);
            a = self.arcs.get(ai).dw0;
        }
        out
    }

    /// Ids of the arcs arriving at `n` from below, in list order.
    pub fn node_down_arc_ids(&self, n: NodeId) -> Vec<ArcId> {
        let mut out = Vec::new();
        let mut a = self.nodes.get(n).arc_down;
        while let Some(ai) = a {
            out.push(ai);
            a = self.arcs.get(ai).dw1;
        }
        out
    }

    /// True when `n` has exactly one down-arc, exactly one up-arc, and has
    /// not been confirmed critical. Meaningful once the node is finalized.
    pub(crate) fn is_regular(&self, n: NodeId) -> bool {
        let node = self.nodes.get(n);
        if node.is_critical {
            return false;
        }
        let single_down = matches!(node.arc_down, Some(a) if self.arcs.get(a).dw1.is_none());
        let single_up = matches!(node.arc_up, Some(a) if self.arcs.get(a).dw0.is_none());
        single_down && single_up
    }

    // ---- arc-level primitives --------------------------------------------

    /// Add a single unlabeled arc between `u` and `v`, swapping the
    /// endpoints into vertex order first.
    pub(crate) fn add_arc(&mut self, u: NodeId, v: NodeId) -> ArcId {
        let (lo, hi) = if self.node_is_below(u, v) {
            (u, v)
        } else {
            (v, u)
        };
        self.add_path(&[lo, hi], 0)
    }

    /// Create the `k-1` arcs of a monotone path through `nodes`, inserting
    /// each into its endpoints' lists. With a nonzero `tag`, one fresh
    /// label per arc is attached and threaded into a vertical chain.
    /// Returns the first arc.
    pub(crate) fn add_path(&mut self, nodes: &[NodeId], tag: LabelTag) -> ArcId {
        debug_assert!(nodes.len() >= 2, "a path needs at least two nodes");
        let mut first = None;
        let mut prev_label: Option<LabelId> = None;
        for pair in nodes.windows(2) {
            let (u, v) = (pair[0], pair[1]);
            debug_assert!(self.node_is_below(u, v), "path nodes must ascend");
            let a = self.alloc_arc(Arc::new(u, v));
            self.add_up_arc(u, a);
            self.add_down_arc(v, a);
            if tag != 0 {
                let l = self.set_label(a, tag);
                if let Some(p) = prev_label {
                    self.labels.get_mut(p).v_next = Some(l);
                    self.labels.get_mut(l).v_prev = Some(p);
                }
                prev_label = Some(l);
            }
            first.get_or_insert(a);
        }
        first.expect("path has at least one arc")
    }

    /// Split `a` at the existing node `m` strictly between its endpoints.
    /// `a` keeps the lower part; the new upper arc is returned. Every label
    /// of `a` gets a twin on the upper piece, threaded into its vertical
    /// chain, so chains keep covering the full span.
    pub(crate) fn split_arc(&mut self, a: ArcId, m: NodeId) -> ArcId {
        let w = self.arcs.get(a).node1;
        debug_assert!(self.node_is_below(self.arcs.get(a).node0, m));
        debug_assert!(self.node_is_below(m, w));
        self.remove_down_arc(w, a);
        let b = self.alloc_arc(Arc::new(m, w));
        self.arcs.get_mut(a).node1 = m;
        self.add_down_arc(m, a);
        self.add_up_arc(m, b);
        self.add_down_arc(w, b);

        let mut l = self.arcs.get(a).label0;
        while let Some(li) = l {
            let (tag, v_next, h_next) = {
                let lab = self.labels.get(li);
                (lab.tag, lab.v_next, lab.h_next)
            };
            let twin = self.set_label(b, tag);
            {
                let lab2 = self.labels.get_mut(twin);
                lab2.v_prev = Some(li);
                lab2.v_next = v_next;
            }
            if let Some(nx) = v_next {
                self.labels.get_mut(nx).v_prev = Some(twin);
            }
            self.labels.get_mut(li).v_next = Some(twin);
            l = h_next;
        }

        let pivot = {
            let node = self.nodes.get(m);
            (node.vertex_id, node.value)
        };
        let span = std::mem::take(&mut self.arcs.get_mut(a).span);
        let (lower, upper): (Vec<_>, Vec<_>) = span
            .into_iter()
            .partition(|sv| is_below((sv.vertex, sv.value), pivot));
        self.arcs.get_mut(a).span = lower;
        self.arcs.get_mut(b).span = upper;
        b
    }

    /// Merge `a1` into `a0`; both must span the same pair of nodes. The
    /// survivor takes the loser's labels (chains intact) and region
    /// vertices; `a1` is unlinked and freed.
    pub(crate) fn merge_arcs(&mut self, a0: ArcId, a1: ArcId) {
        debug_assert_ne!(a0, a1);
        let (n0, n1, l1_head, l1_tail) = {
            let arc1 = self.arcs.get(a1);
            (arc1.node0, arc1.node1, arc1.label0, arc1.label1)
        };
        debug_assert_eq!(self.arcs.get(a0).node0, n0, "merge of non-parallel arcs");
        debug_assert_eq!(self.arcs.get(a0).node1, n1, "merge of non-parallel arcs");
        self.remove_up_arc(n0, a1);
        self.remove_down_arc(n1, a1);

        let mut l = l1_head;
        while let Some(li) = l {
            self.labels.get_mut(li).arc = a0;
            l = self.labels.get(li).h_next;
        }
        if let Some(h1) = l1_head {
            match self.arcs.get(a0).label1 {
                Some(tail) => {
                    self.labels.get_mut(tail).h_next = Some(h1);
                    self.labels.get_mut(h1).h_prev = Some(tail);
                }
                None => self.arcs.get_mut(a0).label0 = Some(h1),
            }
            self.arcs.get_mut(a0).label1 = l1_tail;
        }

        let mut span1 = std::mem::take(&mut self.arcs.get_mut(a1).span);
        self.arcs.get_mut(a0).span.append(&mut span1);
        self.free_arc(a1);
    }

    /// Eliminate a degree-(1,1) node: the down-arc absorbs the up-arc, the
    /// upper endpoint's down-list is rewired so the survivor takes the
    /// absorbed arc's place, the absorbed arc's labels are detached with
    /// vertical-chain repair, and the node's mesh vertex is recorded on the
    /// survivor's region.
    pub(crate) fn vertex_collapse(&mut self, n: NodeId) {
        let (a0, a1) = {
            let node = self.nodes.get(n);
            (
                node.arc_down.expect("vertex_collapse needs a down-arc"),
                node.arc_up.expect("vertex_collapse needs an up-arc"),
            )
        };
        debug_assert!(self.arcs.get(a0).dw1.is_none(), "node has several down-arcs");
        debug_assert!(self.arcs.get(a1).dw0.is_none(), "node has several up-arcs");

        let (top, up1, dw1) = {
            let arc1 = self.arcs.get(a1);
            (arc1.node1, arc1.up1, arc1.dw1)
        };
        {
            let arc0 = self.arcs.get_mut(a0);
            arc0.node1 = top;
            arc0.up1 = up1;
            arc0.dw1 = dw1;
        }
        if let Some(prev) = up1 {
            self.arcs.get_mut(prev).dw1 = Some(a0);
        }
        if let Some(next) = dw1 {
            self.arcs.get_mut(next).up1 = Some(a0);
        }
        if self.nodes.get(top).arc_down == Some(a1) {
            self.nodes.get_mut(top).arc_down = Some(a0);
        }

        // Detach the absorbed arc's labels, bridging their chains.
        let mut l = self.arcs.get(a1).label0;
        while let Some(li) = l {
            let (h_next, v_prev, v_next) = {
                let lab = self.labels.get(li);
                (lab.h_next, lab.v_prev, lab.v_next)
            };
            if let Some(p) = v_prev {
                self.labels.get_mut(p).v_next = v_next;
            }
            if let Some(nx) = v_next {
                self.labels.get_mut(nx).v_prev = v_prev;
            }
            self.free_label(li);
            l = h_next;
        }

        let mut upper_span = std::mem::take(&mut self.arcs.get_mut(a1).span);
        let elided = {
            let node = self.nodes.get(n);
            SpanVertex {
                vertex: node.vertex_id,
                value: node.value,
            }
        };
        {
            let arc0 = self.arcs.get_mut(a0);
            arc0.span.push(elided);
            arc0.span.append(&mut upper_span);
        }
        self.free_arc(a1);
        self.free_node(n);
    }

    // ---- label helpers ---------------------------------------------------

    /// Attach a fresh label with `tag` at the head of `a`'s horizontal
    /// label list.
    pub(crate) fn set_label(&mut self, a: ArcId, tag: LabelTag) -> LabelId {
        let head = self.arcs.get(a).label0;
        let l = self.alloc_label(Label::new(a, tag));
        self.labels.get_mut(l).h_next = head;
        if let Some(h) = head {
            self.labels.get_mut(h).h_prev = Some(l);
        }
        let arc = self.arcs.get_mut(a);
        arc.label0 = Some(l);
        if arc.label1.is_none() {
            arc.label1 = Some(l);
        }
        l
    }

    /// Unthread `l` from its arc's horizontal list and its vertical chain,
    /// then free it.
    pub(crate) fn remove_label(&mut self, l: LabelId) {
        let (arc, h_prev, h_next, v_prev, v_next) = {
            let lab = self.labels.get(l);
            (lab.arc, lab.h_prev, lab.h_next, lab.v_prev, lab.v_next)
        };
        match h_prev {
            Some(p) => self.labels.get_mut(p).h_next = h_next,
            None => self.arcs.get_mut(arc).label0 = h_next,
        }
        match h_next {
            Some(nx) => self.labels.get_mut(nx).h_prev = h_prev,
            None => self.arcs.get_mut(arc).label1 = h_prev,
        }
        if let Some(p) = v_prev {
            self.labels.get_mut(p).v_next = v_next;
        }
        if let Some(nx) = v_next {
            self.labels.get_mut(nx).v_prev = v_prev;
        }
        self.free_label(l);
    }

    /// Linear scan of the up-arcs of `n` for a label carrying `tag`.
    pub fn find_up_label(&self, n: NodeId, tag: LabelTag) -> Option<LabelId> {
        let mut a = self.nodes.get(n).arc_up;
        while let Some(ai) = a {
            let arc = self.arcs.get(ai);
            let mut l = arc.label0;
            while let Some(li) = l {
                let lab = self.labels.get(li);
                if lab.tag == tag {
                    return Some(li);
                }
                l = lab.h_next;
            }
            a = arc.dw0;
        }
        None
    }

    /// Linear scan of the down-arcs of `n` for a label carrying `tag`.
    pub fn find_dw_label(&self, n: NodeId, tag: LabelTag) -> Option<LabelId> {
        let mut a = self.nodes.get(n).arc_down;
        while let Some(ai) = a {
            let arc = self.arcs.get(ai);
            let mut l = arc.label0;
            while let Some(li) = l {
                let lab = self.labels.get(li);
                if lab.tag == tag {
                    return Some(li);
                }
                l = lab.h_next;
            }
            a = arc.dw1;
        }
        None
    }

    // ---- queries ---------------------------------------------------------

    /// Number of live nodes.
    pub fn number_of_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Number of live arcs.
    pub fn number_of_arcs(&self) -> usize {
        self.arcs.len()
    }

    /// Number of independent cycles found at `close_stream`, minus those
    /// removed by loop simplification. For a closed PL 2-manifold this is
    /// the genus of the surface.
    pub fn number_of_loops(&self) -> usize {
        self.loop_arcs.len()
    }

    /// Number of loops removed by simplification so far.
    pub fn removed_loop_count(&self) -> usize {
        self.removed_loops
    }

    /// Number of connected components of the graph.
    pub fn number_of_connected_components(&self) -> usize {
        *self
            .components
            .get_or_init(|| crate::algs::loops::count_components(self))
    }

    /// Mesh vertex id of `n`.
    pub fn node_vertex_id(&self, n: NodeId) -> VertexId {
        self.nodes.get(n).vertex_id
    }

    /// Scalar field value of `n`.
    pub fn node_scalar_value(&self, n: NodeId) -> f64 {
        self.nodes.get(n).value
    }

    /// Lower endpoint of `a`.
    pub fn arc_down_node_id(&self, a: ArcId) -> NodeId {
        self.arcs.get(a).node0
    }

    /// Upper endpoint of `a`.
    pub fn arc_up_node_id(&self, a: ArcId) -> NodeId {
        self.arcs.get(a).node1
    }

    /// Live node ids in index order.
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.ids()
    }

    /// Live arc ids in index order.
    pub fn arc_ids(&self) -> impl Iterator<Item = ArcId> + '_ {
        self.arcs.ids()
    }

    /// A saturating forward/backward cursor over the node ids.
    pub fn node_cursor(&self) -> Cursor<NodeId> {
        Cursor::new(self.node_ids().collect())
    }

    /// A saturating forward/backward cursor over the arc ids.
    pub fn arc_cursor(&self) -> Cursor<ArcId> {
        Cursor::new(self.arc_ids().collect())
    }

    /// Smallest scalar value seen on the stream.
    pub fn minimum_scalar_value(&self) -> f64 {
        self.min_value
    }

    /// Largest scalar value seen on the stream.
    pub fn maximum_scalar_value(&self) -> f64 {
        self.max_value
    }

    /// Overall scalar span of the field. Zero until two distinct values
    /// have been streamed.
    pub fn scalar_span(&self) -> f64 {
        let span = self.max_value - self.min_value;
        if span.is_finite() && span > 0.0 {
            span
        } else {
            0.0
        }
    }

    /// Persistence of a single arc as a fraction of the global span.
    pub fn arc_persistence(&self, a: ArcId) -> f64 {
        let span = self.scalar_span();
        if span == 0.0 {
            return 0.0;
        }
        let arc = self.arcs.get(a);
        (self.nodes.get(arc.node1).value - self.nodes.get(arc.node0).value) / span
    }

    // ---- interop ---------------------------------------------------------

    /// The directed-graph representation published by the last commit.
    pub fn graph(&self) -> &DirectedGraph {
        &self.graph
    }

    /// Replace the internal directed-graph representation with a
    /// user-provided one (post-processing hook). Use with caution.
    pub fn set_graph(&mut self, graph: DirectedGraph) {
        self.graph = graph;
    }

    /// Toggle recording of `(removed, inserted)` arc pairs during
    /// simplification. Unstable; off by default.
    pub fn set_history_recording(&mut self, on: bool) {
        self.history_on = on;
    }

    /// Cancellations recorded while history recording was on.
    pub fn cancellation_history(&self) -> &[Cancellation] {
        &self.history
    }
}

impl Default for ReebGraph {
    fn default() -> Self {
        Self::new()
    }
}

/// A forward/backward cursor over a snapshot of element ids.
///
/// The first `next` returns the first id; once the last id is reached,
/// further `next` calls keep returning it. `previous` mirrors this at the
/// front. Cursor state lives in the cursor value, not in the graph.
#[derive(Clone, Debug)]
pub struct Cursor<I> {
    ids: Vec<I>,
    pos: Option<usize>,
}

impl<I: Copy> Cursor<I> {
    fn new(ids: Vec<I>) -> Self {
        Self { ids, pos: None }
    }

    /// Advance and return the current id, saturating at the last one.
    pub fn next(&mut self) -> Option<I> {
        if self.ids.is_empty() {
            return None;
        }
        let next = match self.pos {
            None => 0,
            Some(p) => (p + 1).min(self.ids.len() - 1),
        };
        self.pos = Some(next);
        Some(self.ids[next])
    }

    /// Step back and return the current id, saturating at the first one.
    pub fn previous(&mut self) -> Option<I> {
        if self.ids.is_empty() {
            return None;
        }
        let prev = match self.pos {
            None => 0,
            Some(p) => p.saturating_sub(1),
        };
        self.pos = Some(prev);
        Some(self.ids[prev])
    }
}

impl DebugInvariants for ReebGraph {
    fn validate_invariants(&self) -> Result<(), ReebGraphError> {
        use std::collections::HashSet;
        let corrupt = |msg: String| Err(ReebGraphError::CorruptTopology(msg));

        for (aid, arc) in self.arcs.iter() {
            if !self.nodes.contains(arc.node0) || !self.nodes.contains(arc.node1) {
                return corrupt(format!("arc {aid} references a cleared node"));
            }
            if !self.node_is_below(arc.node0, arc.node1) {
                return corrupt(format!("arc {aid} endpoints are not ascending"));
            }
        }

        let mut in_up_list: HashSet<ArcId> = HashSet::new();
        let mut in_down_list: HashSet<ArcId> = HashSet::new();
        for (nid, node) in self.nodes.iter() {
            let mut prev = None;
            let mut a = node.arc_up;
            while let Some(ai) = a {
                if !self.arcs.contains(ai) {
                    return corrupt(format!("up-list of node {nid} holds cleared arc {ai}"));
                }
                let arc = self.arcs.get(ai);
                if arc.node0 != nid {
                    return corrupt(format!("arc {ai} threaded at node {nid} has node0 {}", arc.node0));
                }
                if arc.up0 != prev {
                    return corrupt(format!("up-list back link broken at arc {ai}"));
                }
                if !in_up_list.insert(ai) {
                    return corrupt(format!("arc {ai} appears twice in up-lists"));
                }
                prev = Some(ai);
                a = arc.dw0;
            }
            let mut prev = None;
            let mut a = node.arc_down;
            while let Some(ai) = a {
                if !self.arcs.contains(ai) {
                    return corrupt(format!("down-list of node {nid} holds cleared arc {ai}"));
                }
                let arc = self.arcs.get(ai);
                if arc.node1 != nid {
                    return corrupt(format!("arc {ai} threaded at node {nid} has node1 {}", arc.node1));
                }
                if arc.up1 != prev {
                    return corrupt(format!("down-list back link broken at arc {ai}"));
                }
                if !in_down_list.insert(ai) {
                    return corrupt(format!("arc {ai} appears twice in down-lists"));
                }
                prev = Some(ai);
                a = arc.dw1;
            }
        }
        for aid in self.arcs.ids() {
            if !in_up_list.contains(&aid) {
                return corrupt(format!("arc {aid} missing from its lower endpoint's up-list"));
            }
            if !in_down_list.contains(&aid) {
                return corrupt(format!("arc {aid} missing from its upper endpoint's down-list"));
            }
        }

        // Horizontal label lists: ownership and threading.
        let mut threaded: HashSet<LabelId> = HashSet::new();
        for (aid, arc) in self.arcs.iter() {
            let mut prev = None;
            let mut l = arc.label0;
            while let Some(li) = l {
                if !self.labels.contains(li) {
                    return corrupt(format!("arc {aid} label list holds cleared label {li}"));
                }
                let lab = self.labels.get(li);
                if lab.arc != aid {
                    return corrupt(format!("label {li} on arc {aid} claims arc {}", lab.arc));
                }
                if lab.h_prev != prev {
                    return corrupt(format!("label list back link broken at label {li}"));
                }
                if !threaded.insert(li) {
                    return corrupt(format!("label {li} appears twice in label lists"));
                }
                prev = Some(li);
                l = lab.h_next;
            }
            if arc.label1 != prev {
                return corrupt(format!("arc {aid} label tail is out of date"));
            }
        }
        for lid in self.labels.ids() {
            if !threaded.contains(&lid) {
                return corrupt(format!("label {lid} belongs to no arc list"));
            }
        }

        // Vertical chains: same tag, mutual links, contiguous ascending arcs.
        for (lid, lab) in self.labels.iter() {
            if let Some(v) = lab.v_next {
                if !self.labels.contains(v) {
                    return corrupt(format!("label {lid} chain successor is cleared"));
                }
                let next = self.labels.get(v);
                if next.tag != lab.tag {
                    return corrupt(format!("chain through label {lid} changes tag"));
                }
                if next.v_prev != Some(lid) {
                    return corrupt(format!("chain back link broken at label {lid}"));
                }
                if self.arcs.get(next.arc).node0 != self.arcs.get(lab.arc).node1 {
                    return corrupt(format!("chain through label {lid} is not contiguous"));
                }
            }
        }
        Ok(())
    }
}
