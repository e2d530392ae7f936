use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use nbody_raytracer::utils::random_scene;
use nbody_raytracer::{ExecutionMode, Frame, Simulation};

const MODES: [(&str, ExecutionMode); 2] = [
    ("reference", ExecutionMode::Reference),
    ("parallel", ExecutionMode::Parallel),
];

fn bench_advance(c: &mut Criterion) {
    let mut group = c.benchmark_group("advance");
    group.sample_size(10);

    for n in [64usize, 256] {
        group.throughput(Throughput::Elements(n as u64));
        for (name, mode) in MODES {
            let mut sim = Simulation::new(random_scene(n, 42));
            sim.set_mode(mode);
            // Warmup
            sim.advance();
            group.bench_with_input(BenchmarkId::new(name, n), &n, |b, _| {
                b.iter(|| sim.advance());
            });
        }
    }
    group.finish();
}

fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("render");
    group.sample_size(10);

    let (width, height) = (256, 128);
    group.throughput(Throughput::Elements((width * height) as u64));
    for (name, mode) in MODES {
        let mut sim = Simulation::new(random_scene(128, 7));
        sim.set_mode(mode);
        sim.sort_by_depth();
        let mut frame = Frame::new(width, height);
        group.bench_function(name, |b| {
            b.iter(|| sim.render(&mut frame));
        });
    }
    group.finish();
}

fn bench_full_frame(c: &mut Criterion) {
    let mut group = c.benchmark_group("frame");
    group.sample_size(10);

    let mut sim = Simulation::new(random_scene(128, 11));
    let mut frame = Frame::new(256, 128);
    group.bench_function("step_parallel", |b| {
        b.iter(|| sim.step(&mut frame));
    });
    group.finish();
}

criterion_group!(benches, bench_advance, bench_render, bench_full_frame);
criterion_main!(benches);
