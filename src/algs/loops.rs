//! Loop detection and connected components.
//!
//! A depth-first sweep over the undirected view of the graph classifies
//! every arc as either a tree arc or a closure arc; the closure arcs are
//! exactly the independent cycles, so their count is the first Betti
//! number of the graph — and the genus, for a closed orientable
//! 2-manifold. The sweep visits nodes in table index order and incident
//! arcs in list order, so the recorded closure arcs are deterministic.

use crate::topology::graph::ReebGraph;
use crate::topology::handle::{ArcId, NodeId};
use std::collections::HashSet;

/// Detect the cycles of the committed graph and record one closing arc per
/// cycle in the graph's loop table. Resets any previous loop bookkeeping.
pub(crate) fn find_loops(graph: &mut ReebGraph) {
    let mut loop_arcs: Vec<ArcId> = Vec::new();
    let mut seen_nodes: HashSet<NodeId> = HashSet::new();
    let mut seen_arcs: HashSet<ArcId> = HashSet::new();
    let mut stack: Vec<NodeId> = Vec::new();

    let roots: Vec<NodeId> = graph.node_ids().collect();
    for root in roots {
        if !seen_nodes.insert(root) {
            continue;
        }
        stack.push(root);
        while let Some(n) = stack.pop() {
            for a in incident_arcs(graph, n) {
                if !seen_arcs.insert(a) {
                    continue;
                }
                let arc = graph.arc(a);
                let other = if arc.node0 == n { arc.node1 } else { arc.node0 };
                if seen_nodes.insert(other) {
                    stack.push(other);
                } else {
                    // Back edge: this arc closes a cycle.
                    loop_arcs.push(a);
                }
            }
        }
    }

    graph.loop_arcs = loop_arcs;
    graph.removed_loops = 0;
}

/// Number of connected components of the undirected view.
pub(crate) fn count_components(graph: &ReebGraph) -> usize {
    let mut seen_nodes: HashSet<NodeId> = HashSet::new();
    let mut stack: Vec<NodeId> = Vec::new();
    let mut components = 0;

    for root in graph.node_ids() {
        if !seen_nodes.insert(root) {
            continue;
        }
        components += 1;
        stack.push(root);
        while let Some(n) = stack.pop() {
            for a in incident_arcs(graph, n) {
                let arc = graph.arc(a);
                let other = if arc.node0 == n { arc.node1 } else { arc.node0 };
                if seen_nodes.insert(other) {
                    stack.push(other);
                }
            }
        }
    }
    components
}

/// Up-arcs then down-arcs of `n`, in list order.
fn incident_arcs(graph: &ReebGraph, n: NodeId) -> Vec<ArcId> {
    let mut arcs = graph.node_up_arc_ids(n);
    arcs.extend(graph.node_down_arc_ids(n));
    arcs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::elements::Node;
    use crate::topology::graph::ReebGraph;

    fn path_graph(values: &[f64]) -> (ReebGraph, Vec<crate::topology::handle::NodeId>) {
        let mut g = ReebGraph::new();
        let nodes: Vec<_> = values
            .iter()
            .enumerate()
            .map(|(i, &f)| g.alloc_node(Node::new(i as i64, f)))
            .collect();
        for pair in nodes.windows(2) {
            g.add_arc(pair[0], pair[1]);
        }
        (g, nodes)
    }

    #[test]
    fn a_path_has_no_loops_and_one_component() {
        let (mut g, _) = path_graph(&[0.0, 1.0, 2.0]);
        find_loops(&mut g);
        assert_eq!(g.number_of_loops(), 0);
        assert_eq!(count_components(&g), 1);
    }

    #[test]
    fn a_parallel_arc_pair_is_one_loop() {
        let (mut g, nodes) = path_graph(&[0.0, 1.0]);
        g.add_arc(nodes[0], nodes[1]);
        find_loops(&mut g);
        assert_eq!(g.number_of_loops(), 1);
        assert_eq!(count_components(&g), 1);
    }

    #[test]
    fn disjoint_paths_are_separate_components() {
        let mut g = ReebGraph::new();
        let a0 = g.alloc_node(Node::new(0, 0.0));
        let a1 = g.alloc_node(Node::new(1, 1.0));
        let b0 = g.alloc_node(Node::new(2, 0.0));
        let b1 = g.alloc_node(Node::new(3, 1.0));
        g.add_arc(a0, a1);
        g.add_arc(b0, b1);
        find_loops(&mut g);
        assert_eq!(g.number_of_loops(), 0);
        assert_eq!(count_components(&g), 2);
    }

    #[test]
    fn theta_graph_has_two_loops() {
        let (mut g, nodes) = path_graph(&[0.0, 1.0]);
        g.add_arc(nodes[0], nodes[1]);
        g.add_arc(nodes[0], nodes[1]);
        find_loops(&mut g);
        assert_eq!(g.number_of_loops(), 2);
    }
}
