use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

use reeb_stream::mesh::{ScalarField, SurfaceMesh};
use reeb_stream::ReebGraph;

/// Wrapped grid torus with a deterministic scrambled field.
fn torus(nx: i64, ny: i64) -> (SurfaceMesh, ScalarField) {
    let n = (nx * ny) as usize;
    let mut mesh = SurfaceMesh::new(n);
    let id = |i: i64, j: i64| j.rem_euclid(ny) * nx + i.rem_euclid(nx);
    for j in 0..ny {
        for i in 0..nx {
            let (a, b) = (id(i, j), id(i + 1, j));
            let (c, d) = (id(i, j + 1), id(i + 1, j + 1));
            mesh.add_triangle([a, b, d]);
            mesh.add_triangle([a, d, c]);
        }
    }
    let values: Vec<f64> = (0..n).map(|v| ((v * 2654435761) % 4093) as f64).collect();
    (mesh, ScalarField::new("scrambled", values))
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_surface");
    for size in [8i64, 16, 32] {
        let (mesh, field) = torus(size, size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| {
                let mut g = ReebGraph::new();
                g.build_surface(&mesh, &field).unwrap();
                g.number_of_loops()
            })
        });
    }
    group.finish();
}

fn bench_simplify(c: &mut Criterion) {
    let (mesh, field) = torus(16, 16);
    let mut reference = ReebGraph::new();
    reference.build_surface(&mesh, &field).unwrap();
    c.bench_function("simplify_half_span", |b| {
        b.iter(|| {
            let mut g = reference.deep_copy();
            g.simplify(0.5, None).unwrap()
        })
    });
}

criterion_group!(benches, bench_build, bench_simplify);
criterion_main!(benches);
