//! Property-based structural invariants over randomized disk meshes.

use proptest::prelude::*;
use reeb_stream::debug_invariants::DebugInvariants;
use reeb_stream::mesh::{ScalarField, SurfaceMesh};
use reeb_stream::ReebGraph;

/// Triangulated rectangular grid patch (a topological disk).
fn grid_disk(nx: usize, ny: usize) -> SurfaceMesh {
    let mut mesh = SurfaceMesh::new(nx * ny);
    let id = |i: usize, j: usize| (j * nx + i) as i64;
    for j in 0..ny - 1 {
        for i in 0..nx - 1 {
            mesh.add_triangle([id(i, j), id(i + 1, j), id(i + 1, j + 1)]);
            mesh.add_triangle([id(i, j), id(i + 1, j + 1), id(i, j + 1)]);
        }
    }
    mesh
}

fn build(nx: usize, ny: usize, raw: &[u32]) -> ReebGraph {
    // Coarse quantization keeps plenty of scalar ties in play, so the
    // vertex-id tie-break is exercised for real.
    let values: Vec<f64> = raw.iter().map(|&v| (v % 32) as f64 / 8.0).collect();
    let field = ScalarField::new("field", values);
    let mut g = ReebGraph::new();
    g.build_surface(&grid_disk(nx, ny), &field).unwrap();
    g
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn disks_build_into_valid_trees(
        (nx, ny) in (2usize..5, 2usize..5),
        seed in prop::collection::vec(any::<u32>(), 16),
    ) {
        let n = nx * ny;
        prop_assume!(seed.len() >= n);
        let g = build(nx, ny, &seed[..n]);

        g.validate_invariants().unwrap();
        // A disk is simply connected: the Reeb graph is a tree.
        prop_assert_eq!(g.number_of_loops(), 0);
        prop_assert_eq!(g.number_of_connected_components(), 1);
        prop_assert_eq!(g.number_of_arcs() + 1, g.number_of_nodes());
        // After close, no critical node is left with regular degrees.
        for node in g.node_ids() {
            let degrees = (g.down_degree(node), g.up_degree(node));
            prop_assert_ne!(degrees, (1, 1));
        }
    }

    #[test]
    fn arc_endpoints_always_ascend(
        (nx, ny) in (2usize..5, 2usize..5),
        seed in prop::collection::vec(any::<u32>(), 16),
    ) {
        let n = nx * ny;
        prop_assume!(seed.len() >= n);
        let g = build(nx, ny, &seed[..n]);
        for a in g.arc_ids() {
            let lo = g.arc_down_node_id(a);
            let hi = g.arc_up_node_id(a);
            let below = (g.node_scalar_value(lo), g.node_vertex_id(lo))
                < (g.node_scalar_value(hi), g.node_vertex_id(hi));
            prop_assert!(below, "arc {:?} endpoints do not ascend", a);
        }
    }

    #[test]
    fn simplification_is_monotone_and_leaves_valid_graphs(
        (nx, ny) in (3usize..5, 3usize..5),
        seed in prop::collection::vec(any::<u32>(), 16),
    ) {
        let n = nx * ny;
        prop_assume!(seed.len() >= n);
        let reference = build(nx, ny, &seed[..n]);

        prop_assert_eq!(reference.deep_copy().simplify(0.0, None).unwrap(), 0);

        let mut previous = usize::MAX;
        for threshold in [0.05, 0.25, 0.5, 1.0] {
            let mut g = reference.deep_copy();
            g.simplify(threshold, None).unwrap();
            g.validate_invariants().unwrap();
            prop_assert!(g.number_of_arcs() <= previous);
            previous = g.number_of_arcs();
        }
    }

    #[test]
    fn stream_order_invariance_on_random_disks(
        seed in prop::collection::vec(any::<u32>(), 9),
    ) {
        let mesh = grid_disk(3, 3);
        let values: Vec<f64> = seed.iter().map(|&v| (v % 16) as f64).collect();
        let field = ScalarField::new("field", values.clone());

        let mut forward = ReebGraph::new();
        forward.build_surface(&mesh, &field).unwrap();

        // Re-stream the same triangles by hand in reverse order.
        let mut cells = Vec::new();
        let id = |i: usize, j: usize| (j * 3 + i) as i64;
        for j in 0..2 {
            for i in 0..2 {
                cells.push([id(i, j), id(i + 1, j), id(i + 1, j + 1)]);
                cells.push([id(i, j), id(i + 1, j + 1), id(i, j + 1)]);
            }
        }
        let mut backward = ReebGraph::new();
        for cell in cells.iter().rev() {
            backward
                .stream_triangle(
                    cell[0],
                    values[cell[0] as usize],
                    cell[1],
                    values[cell[1] as usize],
                    cell[2],
                    values[cell[2] as usize],
                )
                .unwrap();
        }
        backward.close_stream().unwrap();

        prop_assert_eq!(forward.number_of_nodes(), backward.number_of_nodes());
        prop_assert_eq!(forward.number_of_arcs(), backward.number_of_arcs());
        let sig = |g: &ReebGraph| {
            let mut nodes: Vec<i64> = g.node_ids().map(|n| g.node_vertex_id(n)).collect();
            nodes.sort_unstable();
            let mut arcs: Vec<(i64, i64)> = g
                .arc_ids()
                .map(|a| {
                    (
                        g.node_vertex_id(g.arc_down_node_id(a)),
                        g.node_vertex_id(g.arc_up_node_id(a)),
                    )
                })
                .collect();
            arcs.sort_unstable();
            (nodes, arcs)
        };
        prop_assert_eq!(sig(&forward), sig(&backward));
    }
}
