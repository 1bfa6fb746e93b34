//! Topological simplification.
//!
//! Simplification removes features whose importance falls below a caller
//! threshold. Importance defaults to persistence (scalar span of the
//! feature over the global span) and can be overridden with a
//! [`SimplificationMetric`]. Loops found at close time are filtered first,
//! then leaf branches are cancelled by an iterated best-first search, and
//! finally the surviving graph is committed: regular nodes are elided and
//! the result is flattened into the exported [`DirectedGraph`].

use crate::digraph::DirectedGraph;
use crate::metric::SimplificationMetric;
use crate::reeb_error::ReebGraphError;
use crate::topology::elements::{SpanVertex, VertexId};
use crate::topology::graph::ReebGraph;
use crate::topology::handle::{ArcId, NodeId};
use crate::topology::order::vertex_order;
use std::cmp::{Ordering, Reverse};
use std::collections::{BinaryHeap, HashMap, HashSet};

/// One branch or loop cancellation, recorded as the mesh-vertex-id pairs of
/// the arcs it removed and inserted.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Cancellation {
    /// Endpoint vertex ids of the arcs the cancellation removed.
    pub removed: Vec<(VertexId, VertexId)>,
    /// Endpoint vertex ids of the arcs the cancellation inserted.
    pub inserted: Vec<(VertexId, VertexId)>,
}

/// Search direction for branch cancellation.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum Direction {
    /// From a minimum leaf, expanding along up-arcs.
    Up,
    /// From a maximum leaf, expanding along down-arcs.
    Down,
}

/// A monotone path from a leaf to a candidate join node.
#[derive(Clone, Debug)]
struct FeaturePath {
    value: f64,
    arcs: Vec<ArcId>,
    /// Leaf first, current far node last.
    nodes: Vec<NodeId>,
}

impl FeaturePath {
    fn last(&self) -> NodeId {
        *self.nodes.last().expect("paths are never empty")
    }

    fn order(&self, other: &Self) -> Ordering {
        self.value
            .total_cmp(&other.value)
            .then_with(|| self.arcs.len().cmp(&other.arcs.len()))
            .then_with(|| self.last().get().cmp(&other.last().get()))
    }
}

impl PartialEq for FeaturePath {
    fn eq(&self, other: &Self) -> bool {
        self.order(other) == Ordering::Equal
    }
}

impl Eq for FeaturePath {}

impl PartialOrd for FeaturePath {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.order(other))
    }
}

impl Ord for FeaturePath {
    fn cmp(&self, other: &Self) -> Ordering {
        self.order(other)
    }
}

impl ReebGraph {
    /// Simplify the graph: remove every loop and branch whose importance is
    /// below `threshold` (a fraction of the scalar span, in `[0, 1]`), then
    /// commit. With `None` the default persistence drives the filtering.
    ///
    /// Returns the number of arcs removed. The stream must be closed.
    pub fn simplify(
        &mut self,
        threshold: f64,
        metric: Option<&dyn SimplificationMetric>,
    ) -> Result<usize, ReebGraphError> {
        if !self.stream_closed {
            return Err(ReebGraphError::StreamOpen);
        }
        if threshold.is_nan() || !(0.0..=1.0).contains(&threshold) {
            return Err(ReebGraphError::InvalidThreshold(threshold));
        }
        let mut removed = 0;
        // A degenerate span means every feature has zero persistence and
        // nothing can sit strictly below a threshold; skip the sweeps.
        if threshold > 0.0 && self.scalar_span() > 0.0 {
            removed += self.simplify_loops(threshold, metric);
            removed += self.simplify_branches(threshold, metric);
        }
        self.commit_simplification();
        crate::debug_invariants!(self, "simplify::commit");
        Ok(removed)
    }

    /// Remove the recorded closing arc of every loop whose importance is
    /// below `threshold`. Stale loop entries (arcs merged away since
    /// detection) are kept for the loop count but never dereferenced.
    pub(crate) fn simplify_loops(
        &mut self,
        threshold: f64,
        metric: Option<&dyn SimplificationMetric>,
    ) -> usize {
        let entries = std::mem::take(&mut self.loop_arcs);
        let mut kept = Vec::with_capacity(entries.len());
        let mut removed = 0;
        for a in entries {
            if !self.arcs.contains(a) {
                kept.push(a);
                continue;
            }
            let value = match metric {
                Some(m) => m.value(self, &[a]),
                None => self.arc_persistence(a),
            };
            if value < threshold {
                if self.history_on {
                    let arc = self.arc(a);
                    let pair = (
                        self.node_vertex_id(arc.node0),
                        self.node_vertex_id(arc.node1),
                    );
                    self.history.push(Cancellation {
                        removed: vec![pair],
                        inserted: Vec::new(),
                    });
                }
                self.fast_arc_simplify(a);
                self.removed_loops += 1;
                removed += 1;
            } else {
                kept.push(a);
            }
        }
        self.loop_arcs = kept;
        removed
    }

    /// Cancel leaf branches below `threshold` until a full sweep over the
    /// arc table finds nothing left to cancel. Returns arcs removed.
    pub(crate) fn simplify_branches(
        &mut self,
        threshold: f64,
        metric: Option<&dyn SimplificationMetric>,
    ) -> usize {
        let mut removed = 0;
        loop {
            let mut progressed = false;
            let arc_ids: Vec<ArcId> = self.arc_ids().collect();
            for a in arc_ids {
                if !self.arcs.contains(a) {
                    continue;
                }
                let (n0, n1) = {
                    let arc = self.arc(a);
                    (arc.node0, arc.node1)
                };
                let direction = if self.down_degree(n0) == 0 && self.up_degree(n0) == 1 {
                    Direction::Up
                } else if self.up_degree(n1) == 0 && self.down_degree(n1) == 1 {
                    Direction::Down
                } else {
                    continue;
                };
                if let Some(path) = self.find_path(a, threshold, metric, direction) {
                    removed += self.cancel_branch(&path);
                    progressed = true;
                }
            }
            if !progressed {
                break;
            }
        }
        removed
    }

    /// Best-first search for the cheapest cancellable branch starting at
    /// the leaf arc `arc`.
    ///
    /// Candidate paths are ordered by `(simplification value, arc count,
    /// far node id)`; the search expands along up-arcs (minimum leaves) or
    /// down-arcs (maximum leaves) and accepts the first path whose far
    /// node joins back into the rest of the graph. Because the frontier is
    /// popped cheapest-first, a popped value at or above the threshold
    /// proves there is nothing cancellable.
    fn find_path(
        &self,
        arc: ArcId,
        threshold: f64,
        metric: Option<&dyn SimplificationMetric>,
        direction: Direction,
    ) -> Option<FeaturePath> {
        let (leaf, first_far) = {
            let a = self.arc(arc);
            match direction {
                Direction::Up => (a.node0, a.node1),
                Direction::Down => (a.node1, a.node0),
            }
        };
        let leaf_value = self.node_scalar_value(leaf);
        let span = self.scalar_span();
        debug_assert!(span > 0.0);

        let path_value = |arcs: &[ArcId], far: NodeId| -> f64 {
            match metric {
                Some(m) => m.value(self, arcs),
                None => (self.node_scalar_value(far) - leaf_value).abs() / span,
            }
        };

        let mut heap: BinaryHeap<Reverse<FeaturePath>> = BinaryHeap::new();
        let mut expanded: HashSet<NodeId> = HashSet::new();
        heap.push(Reverse(FeaturePath {
            value: path_value(&[arc], first_far),
            arcs: vec![arc],
            nodes: vec![leaf, first_far],
        }));

        while let Some(Reverse(path)) = heap.pop() {
            if path.value >= threshold {
                return None;
            }
            let far = path.last();
            if !expanded.insert(far) {
                continue;
            }
            let joins_back = match direction {
                Direction::Up => self.down_degree(far) >= 2,
                Direction::Down => self.up_degree(far) >= 2,
            };
            if joins_back {
                return Some(path);
            }
            let next_arcs = match direction {
                Direction::Up => self.node_up_arc_ids(far),
                Direction::Down => self.node_down_arc_ids(far),
            };
            for b in next_arcs {
                let next_far = match direction {
                    Direction::Up => self.arc(b).node1,
                    Direction::Down => self.arc(b).node0,
                };
                if expanded.contains(&next_far) {
                    continue;
                }
                let mut arcs = path.arcs.clone();
                arcs.push(b);
                let mut nodes = path.nodes.clone();
                nodes.push(next_far);
                heap.push(Reverse(FeaturePath {
                    value: path_value(&arcs, next_far),
                    arcs,
                    nodes,
                }));
            }
        }
        None
    }

    /// Cancel one branch: delete its arcs, re-home the side arcs of the
    /// emptied path nodes onto the join node, and free the emptied nodes.
    /// Returns arcs removed.
    fn cancel_branch(&mut self, path: &FeaturePath) -> usize {
        let mut record = Cancellation::default();
        let join = path.last();
        let mut removed = 0;

        for &a in &path.arcs {
            if self.history_on {
                let arc = self.arc(a);
                record.removed.push((
                    self.node_vertex_id(arc.node0),
                    self.node_vertex_id(arc.node1),
                ));
            }
            self.fast_arc_simplify(a);
            removed += 1;
        }

        for &n in &path.nodes[..path.nodes.len() - 1] {
            if !self.nodes.contains(n) {
                continue;
            }
            loop {
                let side = {
                    let node = self.node(n);
                    node.arc_up.or(node.arc_down)
                };
                let Some(b) = side else { break };
                let (b0, b1) = {
                    let arc = self.arc(b);
                    (arc.node0, arc.node1)
                };
                let other = if b0 == n { b1 } else { b0 };
                let span = std::mem::take(&mut self.arc_mut(b).span);
                if self.history_on {
                    record
                        .removed
                        .push((self.node_vertex_id(b0), self.node_vertex_id(b1)));
                }
                self.fast_arc_simplify(b);
                removed += 1;
                if other != join {
                    let replacement = self.add_arc(join, other);
                    self.arc_mut(replacement).span = span;
                    if self.history_on {
                        let arc = self.arc(replacement);
                        record.inserted.push((
                            self.node_vertex_id(arc.node0),
                            self.node_vertex_id(arc.node1),
                        ));
                    }
                }
            }
            self.free_node(n);
        }

        if self.history_on {
            self.history.push(record);
        }
        removed
    }

    /// Unlink one arc from both endpoint lists and free it.
    pub(crate) fn fast_arc_simplify(&mut self, a: ArcId) {
        debug_assert!(self.arc(a).label0.is_none(), "labels must be flushed");
        let (n0, n1) = {
            let arc = self.arc(a);
            (arc.node0, arc.node1)
        };
        self.remove_up_arc(n0, a);
        self.remove_down_arc(n1, a);
        self.free_arc(a);
    }

    /// Elide every remaining degree-(1,1) node, then flatten the node and
    /// arc tables into the exported directed graph. Each exported arc
    /// carries the ascending-sorted vertex ids of its region.
    pub(crate) fn commit_simplification(&mut self) {
        let node_ids: Vec<NodeId> = self.node_ids().collect();
        for n in node_ids {
            if !self.nodes.contains(n) {
                continue;
            }
            if self.down_degree(n) == 1 && self.up_degree(n) == 1 {
                // Whatever the construction thought, a (1,1) node is not a
                // critical point of the simplified field.
                self.node_mut(n).is_critical = false;
                self.vertex_collapse(n);
            }
        }

        let mut graph = DirectedGraph::default();
        let mut index: HashMap<NodeId, usize> = HashMap::new();
        for (nid, node) in self.nodes.iter() {
            index.insert(nid, graph.add_node(node.vertex_id, node.value));
        }
        let arc_ids: Vec<ArcId> = self.arc_ids().collect();
        for a in arc_ids {
            let arc = self.arc(a);
            let mut region: Vec<SpanVertex> = arc.span.clone();
            region.sort_by(|x, y| vertex_order((x.vertex, x.value), (y.vertex, y.value)));
            graph.add_edge(
                index[&arc.node0],
                index[&arc.node1],
                region.into_iter().map(|sv| sv.vertex).collect(),
            );
        }
        self.graph = graph;
    }
}
