//! Streaming incremental constructor.
//!
//! Simplices arrive one at a time, each carrying per-vertex scalar values.
//! Every triangle opens a propagation chain for each of its edges the first
//! time the edge is seen, then zips the two monotone paths issued from its
//! lowest vertex; a tetrahedron does the same for its four faces, the
//! shared edge chains carrying the interior identification. Vertices whose star is complete are finalized
//! on the fly: regular ones are elided immediately, which is what keeps the
//! working set proportional to the advancing front rather than the mesh.
//!
//! The stream must be closed with [`ReebGraph::close_stream`]; after that,
//! further stream calls fail with [`ReebGraphError::StreamClosed`].

use crate::reeb_error::ReebGraphError;
use crate::topology::elements::{LabelTag, Node, VertexId};
use crate::topology::graph::{ReebGraph, VertexEntry};
use crate::topology::handle::NodeId;
use crate::topology::order::vertex_order;

impl ReebGraph {
    /// Add one triangle of a surface mesh to the streaming computation.
    ///
    /// `vertex<i>_id` is the vertex's id in the mesh, `scalar<i>` the field
    /// value at that vertex. The stream must be finalized with
    /// [`close_stream`](Self::close_stream).
    pub fn stream_triangle(
        &mut self,
        vertex0_id: VertexId,
        scalar0: f64,
        vertex1_id: VertexId,
        scalar1: f64,
        vertex2_id: VertexId,
        scalar2: f64,
    ) -> Result<(), ReebGraphError> {
        if self.stream_closed {
            return Err(ReebGraphError::StreamClosed);
        }
        let mut verts = [
            (vertex0_id, scalar0),
            (vertex1_id, scalar1),
            (vertex2_id, scalar2),
        ];
        verts.sort_by(|a, b| vertex_order(*a, *b));
        let nodes = [
            self.mesh_vertex_node(verts[0].0, verts[0].1),
            self.mesh_vertex_node(verts[1].0, verts[1].1),
            self.mesh_vertex_node(verts[2].0, verts[2].1),
        ];
        self.add_mesh_triangle(nodes);
        for (vid, _) in verts {
            self.consume_pending(vid);
        }
        Ok(())
    }

    /// Add one tetrahedron of a volume mesh to the streaming computation.
    ///
    /// The stream must be finalized with [`close_stream`](Self::close_stream).
    #[allow(clippy::too_many_arguments)]
    pub fn stream_tetrahedron(
        &mut self,
        vertex0_id: VertexId,
        scalar0: f64,
        vertex1_id: VertexId,
        scalar1: f64,
        vertex2_id: VertexId,
        scalar2: f64,
        vertex3_id: VertexId,
        scalar3: f64,
    ) -> Result<(), ReebGraphError> {
        if self.stream_closed {
            return Err(ReebGraphError::StreamClosed);
        }
        let mut verts = [
            (vertex0_id, scalar0),
            (vertex1_id, scalar1),
            (vertex2_id, scalar2),
            (vertex3_id, scalar3),
        ];
        verts.sort_by(|a, b| vertex_order(*a, *b));
        let nodes = [
            self.mesh_vertex_node(verts[0].0, verts[0].1),
            self.mesh_vertex_node(verts[1].0, verts[1].1),
            self.mesh_vertex_node(verts[2].0, verts[2].1),
            self.mesh_vertex_node(verts[3].0, verts[3].1),
        ];
        self.add_mesh_tetrahedron(nodes);
        for (vid, _) in verts {
            self.consume_pending(vid);
        }
        Ok(())
    }

    /// Declare how many cells are incident to `vertex_id` before it first
    /// appears on the stream. Each streamed cell decrements the count;
    /// when it reaches zero the vertex is finalized online. Vertices
    /// without a declared count are finalized at
    /// [`close_stream`](Self::close_stream).
    pub fn declare_vertex_star(
        &mut self,
        vertex_id: VertexId,
        cell_count: usize,
    ) -> Result<(), ReebGraphError> {
        if self.stream_closed {
            return Err(ReebGraphError::StreamClosed);
        }
        if let Some(entry) = self.vertices.get_mut(&vertex_id) {
            entry.pending = Some(cell_count);
        } else {
            self.declared_stars.insert(vertex_id, cell_count);
        }
        Ok(())
    }

    /// Finalize the streaming computation. All still-pending vertices are
    /// finalized (in vertex-id order), labels are flushed, the loops of the
    /// finished graph are detected, and the initial directed-graph export
    /// is published. After this call no more simplices can be streamed.
    pub fn close_stream(&mut self) -> Result<(), ReebGraphError> {
        if self.stream_closed {
            return Err(ReebGraphError::StreamClosed);
        }
        let pending: Vec<NodeId> = self
            .vertices
            .values()
            .filter(|e| !e.finalized)
            .map(|e| e.node)
            .collect();
        for n in pending {
            self.end_vertex(n);
        }
        debug_assert!(self.vertices.values().all(|e| e.finalized));
        self.stream_closed = true;
        self.flush_labels();
        crate::algs::loops::find_loops(self);
        self.commit_simplification();
        crate::debug_invariants!(self, "construction::close_stream");
        Ok(())
    }

    // ---- internals -------------------------------------------------------

    /// Node for `vertex_id`, admitting the vertex on first sight.
    fn mesh_vertex_node(&mut self, vertex_id: VertexId, scalar: f64) -> NodeId {
        if let Some(entry) = self.vertices.get(&vertex_id) {
            debug_assert_eq!(
                self.node(entry.node).value,
                scalar,
                "vertex {vertex_id} streamed with two different scalars"
            );
            return entry.node;
        }
        self.add_mesh_vertex(vertex_id, scalar)
    }

    /// Allocate the node for a first-seen mesh vertex and register it in
    /// the vertex map with the next stream index.
    pub(crate) fn add_mesh_vertex(&mut self, vertex_id: VertexId, scalar: f64) -> NodeId {
        if scalar < self.min_value {
            self.min_value = scalar;
        }
        if scalar > self.max_value {
            self.max_value = scalar;
        }
        let node = self.alloc_node(Node::new(vertex_id, scalar));
        let stream_id = u32::try_from(self.vertices.len()).expect("stream exceeds u32 vertices");
        let pending = self.declared_stars.remove(&vertex_id);
        self.vertices.insert(
            vertex_id,
            VertexEntry {
                node,
                stream_id,
                pending,
                finalized: false,
            },
        );
        node
    }

    /// Tag of the propagation chain for the mesh edge `(lo, hi)`, `lo`
    /// below `hi` in the vertex order. Built from the endpoints' stream
    /// indices, so it is unique per edge and never zero.
    fn edge_tag(&self, lo: NodeId, hi: NodeId) -> LabelTag {
        let sid_lo = self.vertices[&self.node(lo).vertex_id].stream_id as u64;
        let sid_hi = self.vertices[&self.node(hi).vertex_id].stream_id as u64;
        let tag = sid_lo | (sid_hi << 32);
        // Distinct vertices have distinct stream ids, so a live edge can
        // never produce the reserved zero tag.
        debug_assert_ne!(tag, 0);
        tag
    }

    /// Open the propagation for edge `(lo, hi)` unless it is already live.
    fn ensure_edge(&mut self, lo: NodeId, hi: NodeId, tag: LabelTag) {
        if self.find_up_label(lo, tag).is_none() {
            self.add_path(&[lo, hi], tag);
        }
    }

    /// Insert one triangle, vertices in ascending vertex order.
    pub(crate) fn add_mesh_triangle(&mut self, n: [NodeId; 3]) {
        let t01 = self.edge_tag(n[0], n[1]);
        let t12 = self.edge_tag(n[1], n[2]);
        let t02 = self.edge_tag(n[0], n[2]);
        self.ensure_edge(n[0], n[1], t01);
        self.ensure_edge(n[1], n[2], t12);
        self.ensure_edge(n[0], n[2], t02);
        // Zip the wedge below the middle vertex, then the wedge above it.
        self.collapse(n[0], n[1], t01, t02);
        self.collapse(n[1], n[2], t12, t02);
    }

    /// Insert one tetrahedron, vertices in ascending vertex order. Each
    /// face is zipped like a triangle; the chains of the shared edges tie
    /// the four faces together, which identifies the interior.
    pub(crate) fn add_mesh_tetrahedron(&mut self, n: [NodeId; 4]) {
        let t01 = self.edge_tag(n[0], n[1]);
        let t02 = self.edge_tag(n[0], n[2]);
        let t03 = self.edge_tag(n[0], n[3]);
        let t12 = self.edge_tag(n[1], n[2]);
        let t13 = self.edge_tag(n[1], n[3]);
        let t23 = self.edge_tag(n[2], n[3]);
        self.ensure_edge(n[0], n[1], t01);
        self.ensure_edge(n[0], n[2], t02);
        self.ensure_edge(n[0], n[3], t03);
        self.ensure_edge(n[1], n[2], t12);
        self.ensure_edge(n[1], n[3], t13);
        self.ensure_edge(n[2], n[3], t23);

        self.collapse(n[0], n[1], t01, t02);
        self.collapse(n[1], n[2], t12, t02);
        self.collapse(n[0], n[1], t01, t03);
        self.collapse(n[1], n[3], t13, t03);
        self.collapse(n[0], n[2], t02, t03);
        self.collapse(n[2], n[3], t23, t03);
        self.collapse(n[1], n[2], t12, t13);
        self.collapse(n[2], n[3], t23, t13);
    }

    /// Zip the two propagation chains `tag_left` and `tag_right` starting
    /// at `start` until they meet `end` or run out.
    ///
    /// At each step the two current arcs are compared: the one whose upper
    /// endpoint sits higher is split at the other's upper endpoint, then
    /// the now-parallel pair is merged, the survivor taking both label
    /// sets. Nodes whose degree drops to (1, 1) while already finalized
    /// are collected and elided after the walk.
    pub(crate) fn collapse(
        &mut self,
        start: NodeId,
        end: NodeId,
        tag_left: LabelTag,
        tag_right: LabelTag,
    ) {
        let (mut l0, mut l1) = match (
            self.find_up_label(start, tag_left),
            self.find_up_label(start, tag_right),
        ) {
            (Some(a), Some(b)) => (a, b),
            _ => return,
        };
        let mut touched: Vec<NodeId> = Vec::new();
        loop {
            let a0 = self.label(l0).arc;
            let a1 = self.label(l1).arc;
            let top = if a0 == a1 {
                self.arc(a0).node1
            } else {
                let t0 = self.arc(a0).node1;
                let t1 = self.arc(a1).node1;
                let shared = if t0 == t1 {
                    t0
                } else if self.node_is_below(t0, t1) {
                    self.split_arc(a1, t0);
                    t0
                } else {
                    self.split_arc(a0, t1);
                    t1
                };
                touched.push(self.arc(a0).node0);
                touched.push(shared);
                self.merge_arcs(a0, a1);
                shared
            };
            if top == end {
                break;
            }
            l0 = match self.label(l0).v_next {
                Some(l) => l,
                None => break,
            };
            l1 = match self.label(l1).v_next {
                Some(l) => l,
                None => break,
            };
        }
        for n in touched {
            if self.nodes.contains(n)
                && self.node(n).is_finalized
                && self.down_degree(n) == 1
                && self.up_degree(n) == 1
            {
                // The zip revealed the node to be regular after all.
                self.node_mut(n).is_critical = false;
                self.vertex_collapse(n);
            }
        }
        crate::debug_invariants!(self, "construction::collapse");
    }

    /// Finalize a vertex whose star is complete: chains terminating at the
    /// node are dropped, regular nodes are elided, the rest are confirmed
    /// critical.
    pub(crate) fn end_vertex(&mut self, n: NodeId) {
        let vertex_id = self.node(n).vertex_id;
        self.node_mut(n).is_finalized = true;
        if let Some(entry) = self.vertices.get_mut(&vertex_id) {
            entry.finalized = true;
        }
        self.simplify_labels(n, 0, true, true);
        if self.is_regular(n) {
            self.vertex_collapse(n);
        } else {
            self.node_mut(n).is_critical = true;
        }
    }

    /// Drop the propagation chains that start or end at `n`. A chain
    /// endpoint at `n` means its mesh edge is incident to `n`; once the
    /// vertex's star is complete no future simplex can reference the tag,
    /// so the whole chain is dead. `only_tag == 0` matches every tag.
    pub(crate) fn simplify_labels(
        &mut self,
        n: NodeId,
        only_tag: LabelTag,
        go_down: bool,
        go_up: bool,
    ) {
        if go_down {
            let mut a = self.node(n).arc_down;
            while let Some(ai) = a {
                let next_arc = self.arc(ai).dw1;
                let mut l = self.arc(ai).label0;
                while let Some(li) = l {
                    let (tag, v_next, h_next) = {
                        let lab = self.label(li);
                        (lab.tag, lab.v_next, lab.h_next)
                    };
                    if (only_tag == 0 || tag == only_tag) && v_next.is_none() {
                        // Chain top at n: delete it all the way down.
                        let mut cur = Some(li);
                        while let Some(c) = cur {
                            let prev = self.label(c).v_prev;
                            self.remove_label(c);
                            cur = prev;
                        }
                    }
                    l = h_next;
                }
                a = next_arc;
            }
        }
        if go_up {
            let mut a = self.node(n).arc_up;
            while let Some(ai) = a {
                let next_arc = self.arc(ai).dw0;
                let mut l = self.arc(ai).label0;
                while let Some(li) = l {
                    let (tag, v_prev, h_next) = {
                        let lab = self.label(li);
                        (lab.tag, lab.v_prev, lab.h_next)
                    };
                    if (only_tag == 0 || tag == only_tag) && v_prev.is_none() {
                        // Chain bottom at n: delete it all the way up.
                        let mut cur = Some(li);
                        while let Some(c) = cur {
                            let next = self.label(c).v_next;
                            self.remove_label(c);
                            cur = next;
                        }
                    }
                    l = h_next;
                }
                a = next_arc;
            }
        }
    }

    /// Free every label and reset the arcs' label lists. Called once the
    /// stream closes; chains only matter while simplices can still arrive.
    pub(crate) fn flush_labels(&mut self) {
        let label_ids: Vec<_> = self.labels.ids().collect();
        for l in label_ids {
            self.labels.free(l);
        }
        let arc_ids: Vec<_> = self.arcs.ids().collect();
        for a in arc_ids {
            let arc = self.arc_mut(a);
            arc.label0 = None;
            arc.label1 = None;
        }
    }

    /// Decrement the pending-cell count of `vertex_id`; finalize when the
    /// star is complete.
    fn consume_pending(&mut self, vertex_id: VertexId) {
        let node = match self.vertices.get_mut(&vertex_id) {
            Some(entry) => match entry.pending.as_mut() {
                Some(count) => {
                    *count = count.saturating_sub(1);
                    if *count == 0 && !entry.finalized {
                        Some(entry.node)
                    } else {
                        None
                    }
                }
                None => None,
            },
            None => None,
        };
        if let Some(n) = node {
            self.end_vertex(n);
        }
    }
}
