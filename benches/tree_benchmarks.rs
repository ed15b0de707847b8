//! Benchmarks for tree generation

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use interactive_fractal_tree::{
    constants::MIN_BRANCH_LENGTH,
    interaction::InteractionParams,
    palette::Background,
    tree::{branch_count, grow_tree},
};
use nalgebra::Point2;
use rand::{rngs::StdRng, SeedableRng};

fn benchmark_grow_tree(c: &mut Criterion) {
    let mut group = c.benchmark_group("grow_tree");

    // Face widths from far away to close up
    for width in [10.0, 60.0, 120.0, 200.0] {
        let params = InteractionParams::from_face(width, 150.0);
        let palette = params.palette(Background::Dark);
        let segments = branch_count(params.len, params.len_fac, MIN_BRANCH_LENGTH).unwrap_or(0);
        let mut rng = StdRng::seed_from_u64(17);

        group.bench_with_input(
            BenchmarkId::new("face_width", format!("{width}px_{segments}seg")),
            &params,
            |b, params| {
                b.iter(|| {
                    black_box(
                        grow_tree(
                            Point2::new(512.0, 768.0),
                            black_box(params),
                            &palette,
                            MIN_BRANCH_LENGTH,
                            &mut rng,
                        )
                        .unwrap(),
                    )
                });
            },
        );
    }

    group.finish();
}

fn benchmark_branch_count(c: &mut Criterion) {
    c.bench_function("branch_count", |b| {
        b.iter(|| black_box(branch_count(black_box(600.0), black_box(0.7), MIN_BRANCH_LENGTH)));
    });
}

criterion_group!(benches, benchmark_grow_tree, benchmark_branch_count);
criterion_main!(benches);
