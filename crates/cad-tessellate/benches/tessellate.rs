use cad_primitives::{make_box, make_cylinder, make_sphere};
use cad_tessellate::{tessellate_body, TessellationParams};
use criterion::{criterion_group, criterion_main, Criterion};

fn bench_box(c: &mut Criterion) {
    let body = make_box(10.0, 10.0, 10.0, true);
    let params = TessellationParams::default();
    c.bench_function("tessellate_box", |b| b.iter(|| tessellate_body(&body, &params)));
}

fn bench_cylinder(c: &mut Criterion) {
    let body = make_cylinder(5.0, 10.0, 64, true);
    let params = TessellationParams::default();
    c.bench_function("tessellate_cylinder_64seg", |b| b.iter(|| tessellate_body(&body, &params)));
}

fn bench_sphere(c: &mut Criterion) {
    let body = make_sphere(5.0, 64, 32, true);
    let params = TessellationParams::default();
    c.bench_function("tessellate_sphere_64x32", |b| b.iter(|| tessellate_body(&body, &params)));
}

criterion_group!(benches, bench_box, bench_cylinder, bench_sphere);
criterion_main!(benches);
