use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::{rngs::StdRng, SeedableRng};

use ring_road::config::SceneParams;
use ring_road::driver::{FrameDriver, FrameState};
use ring_road::scene::compose_scene;
use ring_road::shape::RingShape;

fn bench_frame_step(c: &mut Criterion) {
    let params = SceneParams::default();
    let mut rng = StdRng::seed_from_u64(0);
    let composition = compose_scene(&params, 16.0 / 9.0, &mut rng);
    let driver = match FrameDriver::new(&params) {
        Ok(driver) => driver,
        Err(e) => panic!("default parameters rejected: {e}"),
    };

    c.bench_function("frame_step", |b| {
        let mut state = Some(FrameState::from_composition(&composition));
        let mut frame = 0u32;
        b.iter(|| {
            let t = f64::from(frame) / 60.0;
            frame = frame.wrapping_add(1);
            if let Some(current) = state.take() {
                let (next, output) = driver.step(&composition.scene, current, black_box(t), &mut rng);
                black_box(output.commands.len());
                state = Some(next);
            }
        });
    });
}

fn bench_compose_scene(c: &mut Criterion) {
    let mut group = c.benchmark_group("compose_scene");
    for count in [1_000usize, 3_000, 10_000] {
        let mut params = SceneParams::default();
        params.stars.count = count;
        group.bench_with_input(BenchmarkId::from_parameter(count), &params, |b, params| {
            let mut rng = StdRng::seed_from_u64(1);
            b.iter(|| black_box(compose_scene(params, 16.0 / 9.0, &mut rng)));
        });
    }
    group.finish();
}

fn bench_ring_tessellation(c: &mut Criterion) {
    let mut group = c.benchmark_group("ring_tessellate");
    for segments in [3u32, 8, 40] {
        let ring = RingShape::new(7.0, 7.2, segments);
        group.bench_with_input(BenchmarkId::from_parameter(segments), &ring, |b, ring| {
            b.iter(|| black_box(ring.tessellate()));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_frame_step, bench_compose_scene, bench_ring_tessellation);
criterion_main!(benches);
