//! End-to-end construction scenarios on small canonical meshes.

use reeb_stream::debug_invariants::DebugInvariants;
use reeb_stream::mesh::{ScalarField, SurfaceMesh, VolumeMesh};
use reeb_stream::ReebGraph;

/// Hexagonal bipyramid: ring vertices 0..=5, north pole 6, south pole 7.
/// Triangles fan from each pole over the ring.
fn bipyramid(values: [f64; 8]) -> (SurfaceMesh, ScalarField) {
    let mut mesh = SurfaceMesh::new(8);
    for i in 0..6i64 {
        let j = (i + 1) % 6;
        mesh.add_triangle([6, i, j]);
        mesh.add_triangle([7, i, j]);
    }
    let field = ScalarField::new("height", values.to_vec());
    (mesh, field)
}

#[test]
fn single_triangle_with_distinct_scalars() {
    let mut g = ReebGraph::new();
    g.stream_triangle(0, 0.0, 1, 1.0, 2, 2.0).unwrap();
    g.close_stream().unwrap();
    g.validate_invariants().unwrap();

    assert_eq!(g.number_of_nodes(), 2);
    assert_eq!(g.number_of_arcs(), 1);
    assert_eq!(g.number_of_loops(), 0);
    assert_eq!(g.number_of_connected_components(), 1);

    let a = g.arc_ids().next().unwrap();
    assert_eq!(g.node_vertex_id(g.arc_down_node_id(a)), 0);
    assert_eq!(g.node_vertex_id(g.arc_up_node_id(a)), 2);

    // The regular middle vertex was elided into the exported region.
    let exported = g.graph();
    assert_eq!(exported.node_count(), 2);
    assert_eq!(exported.edge_count(), 1);
    assert_eq!(exported.edges()[0].region, vec![1]);
}

#[test]
fn single_tetrahedron_with_distinct_scalars() {
    let mut g = ReebGraph::new();
    g.stream_tetrahedron(0, 0.0, 1, 1.0, 2, 2.0, 3, 3.0).unwrap();
    g.close_stream().unwrap();
    g.validate_invariants().unwrap();

    assert_eq!(g.number_of_nodes(), 2);
    assert_eq!(g.number_of_arcs(), 1);
    assert_eq!(g.number_of_loops(), 0);
    let a = g.arc_ids().next().unwrap();
    assert_eq!(g.node_vertex_id(g.arc_down_node_id(a)), 0);
    assert_eq!(g.node_vertex_id(g.arc_up_node_id(a)), 3);
}

#[test]
fn octahedron_sphere_is_a_single_arc() {
    // North 0, south 1, equator 2..=5; one max, one min, regular equator.
    let mut mesh = SurfaceMesh::new(6);
    for (a, b) in [(2, 3), (3, 4), (4, 5), (5, 2)] {
        mesh.add_triangle([0, a, b]);
        mesh.add_triangle([1, b, a]);
    }
    let field = ScalarField::new("height", vec![5.0, 0.0, 1.0, 2.0, 3.0, 4.0]);
    let mut g = ReebGraph::new();
    g.build_surface(&mesh, &field).unwrap();
    g.validate_invariants().unwrap();

    assert_eq!(g.number_of_nodes(), 2);
    assert_eq!(g.number_of_arcs(), 1);
    assert_eq!(g.number_of_loops(), 0);
    assert_eq!(g.number_of_connected_components(), 1);
    let a = g.arc_ids().next().unwrap();
    assert_eq!(g.node_vertex_id(g.arc_down_node_id(a)), 1);
    assert_eq!(g.node_vertex_id(g.arc_up_node_id(a)), 0);
    // The four equatorial vertices form the arc's region.
    let mut region = g.graph().edges()[0].region.clone();
    region.sort_unstable();
    assert_eq!(region, vec![2, 3, 4, 5]);
}

#[test]
fn double_well_sphere_has_four_leaves_and_two_saddles() {
    // Minima at ring vertices 0 and 3, maxima at 1 and 4, saddles at the
    // poles: the classic double-well graph
    //
    //   1    4
    //    \  /
    //     N (6)
    //     |
    //     S (7)
    //    /  \
    //   0    3
    let (mesh, field) = bipyramid([0.0, 1.0, 0.4, 0.2, 1.2, 0.6, 0.8, 0.5]);
    let mut g = ReebGraph::new();
    g.build_surface(&mesh, &field).unwrap();
    g.validate_invariants().unwrap();

    assert_eq!(g.number_of_nodes(), 6);
    assert_eq!(g.number_of_arcs(), 5);
    assert_eq!(g.number_of_loops(), 0);
    assert_eq!(g.number_of_connected_components(), 1);

    let mut leaves = Vec::new();
    let mut saddles = Vec::new();
    for n in g.node_ids() {
        let (down, up) = (g.down_degree(n), g.up_degree(n));
        match (down, up) {
            (0, 1) | (1, 0) => leaves.push(g.node_vertex_id(n)),
            _ => saddles.push((g.node_vertex_id(n), down, up)),
        }
    }
    leaves.sort_unstable();
    saddles.sort_unstable();
    assert_eq!(leaves, vec![0, 1, 3, 4]);
    assert_eq!(saddles, vec![(6, 1, 2), (7, 2, 1)]);
}

#[test]
fn two_disjoint_triangles_are_two_components() {
    let mut g = ReebGraph::new();
    g.stream_triangle(0, 0.0, 1, 1.0, 2, 2.0).unwrap();
    g.stream_triangle(10, 5.0, 11, 6.0, 12, 7.0).unwrap();
    g.close_stream().unwrap();

    assert_eq!(g.number_of_connected_components(), 2);
    assert_eq!(g.number_of_nodes(), 4);
    assert_eq!(g.number_of_arcs(), 2);
    assert_eq!(g.number_of_loops(), 0);
}

#[test]
fn volume_strip_of_tetrahedra() {
    // Two tetrahedra glued on face (1, 2, 3): still a single ball.
    let mut mesh = VolumeMesh::new(5);
    mesh.add_tetrahedron([0, 1, 2, 3]);
    mesh.add_tetrahedron([1, 2, 3, 4]);
    let field = ScalarField::new("height", vec![0.0, 1.0, 2.0, 3.0, 4.0]);
    let mut g = ReebGraph::new();
    g.build_volume(&mesh, &field).unwrap();
    g.validate_invariants().unwrap();

    assert_eq!(g.number_of_nodes(), 2);
    assert_eq!(g.number_of_arcs(), 1);
    assert_eq!(g.number_of_loops(), 0);
    let a = g.arc_ids().next().unwrap();
    assert_eq!(g.node_vertex_id(g.arc_down_node_id(a)), 0);
    assert_eq!(g.node_vertex_id(g.arc_up_node_id(a)), 4);
}

#[test]
fn cursors_walk_the_final_graph() {
    let (mesh, field) = bipyramid([0.0, 1.0, 0.4, 0.2, 1.2, 0.6, 0.8, 0.5]);
    let mut g = ReebGraph::new();
    g.build_surface(&mesh, &field).unwrap();

    let mut seen = Vec::new();
    let mut cursor = g.node_cursor();
    let mut last = None;
    while let Some(n) = cursor.next() {
        if last == Some(n) {
            break; // saturated at the end
        }
        seen.push(n);
        last = Some(n);
    }
    assert_eq!(seen.len(), g.number_of_nodes());

    let mut arcs = 0;
    let mut cursor = g.arc_cursor();
    let mut last = None;
    while let Some(a) = cursor.next() {
        if last == Some(a) {
            break;
        }
        arcs += 1;
        last = Some(a);
    }
    assert_eq!(arcs, g.number_of_arcs());
}

#[test]
fn exported_regions_are_sorted_by_value() {
    // A fan of four triangles along one monotone strip.
    let mut mesh = SurfaceMesh::new(6);
    mesh.add_triangle([0, 1, 2]);
    mesh.add_triangle([1, 2, 3]);
    mesh.add_triangle([2, 3, 4]);
    mesh.add_triangle([3, 4, 5]);
    let field = ScalarField::new("height", vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0]);
    let mut g = ReebGraph::new();
    g.build_surface(&mesh, &field).unwrap();

    assert_eq!(g.number_of_arcs(), 1);
    assert_eq!(g.graph().edges()[0].region, vec![1, 2, 3, 4]);
}
