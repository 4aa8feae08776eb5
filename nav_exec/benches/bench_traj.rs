//! # Trajectory Generation Benchmark

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use nalgebra::Vector2;
use nav_lib::traj::{
    build_curved_path, build_linear_path, build_softened_curved_path, geom::OffsetPolicy,
    CurveStyle, Params,
};

fn traj_benchmark(c: &mut Criterion) {
    let params = Params {
        line_checkpoints: 20,
        line_round_decimals: 6,
        line_lead_in_factor: Some(0.03),
        curve_style: CurveStyle::Softened,
        curve_samples: 4,
        control_point_const: 0.5,
        offset: OffsetPolicy {
            base: 0.5,
            scale: 2.0,
            min_m: 0.5,
            max_m: 1.5,
        },
        mid_shift_m: 0.25,
        approach_dists_m: [4.0, 2.5, 1.5],
    };

    let start_m = Vector2::new(20.0, 0.0);
    let mid_m = Vector2::new(30.0, 10.0);
    let end_m = Vector2::new(20.0, 20.0);

    c.bench_function("build_linear_path", |b| {
        b.iter(|| {
            build_linear_path(
                black_box(&start_m),
                black_box(&end_m),
                params.line_checkpoints,
                params.line_round_decimals,
            )
        })
    });

    c.bench_function("build_curved_path", |b| {
        b.iter(|| {
            build_curved_path(
                black_box(&start_m),
                black_box(&mid_m),
                black_box(&end_m),
                params.curve_samples,
                params.control_point_const,
                &params.offset,
            )
            .unwrap()
        })
    });

    c.bench_function("build_softened_curved_path", |b| {
        b.iter(|| {
            build_softened_curved_path(
                black_box(&start_m),
                black_box(&mid_m),
                black_box(&end_m),
                &params,
            )
            .unwrap()
        })
    });
}

criterion_group!(benches, traj_benchmark);
criterion_main!(benches);
