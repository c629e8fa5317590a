//! Criterion benchmarks for full simulation ticks.

use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use glam::IVec2;
use sandfall_core::simulation::MaterialId;
use sandfall_core::world::{NoopStats, World, seeded_rng};

const SIZE: u32 = 256;

/// 256x256 world with a stone floor, a sand heap, a water pool, acid and smoke.
fn make_mixed_world() -> World {
    let mut world = World::with_size(SIZE, SIZE).unwrap();
    let size = SIZE as i32;

    for x in (0..size).step_by(5) {
        world.apply_brush(IVec2::new(x, 2), 2, MaterialId::STONE).unwrap();
    }
    for x in (20..100).step_by(7) {
        world.apply_brush(IVec2::new(x, 120), 3, MaterialId::SAND).unwrap();
    }
    for x in (130..230).step_by(7) {
        world.apply_brush(IVec2::new(x, 80), 3, MaterialId::WATER).unwrap();
    }
    world.apply_brush(IVec2::new(180, 200), 4, MaterialId::ACID).unwrap();
    world.apply_brush(IVec2::new(60, 40), 6, MaterialId::SMOKE).unwrap();
    world.apply_brush(IVec2::new(200, 30), 4, MaterialId::GRAVEL).unwrap();
    world
}

/// Benchmark: one synchronous tick over the mixed 256x256 grid.
fn bench_step_mixed_256(c: &mut Criterion) {
    let mut world = make_mixed_world();
    let mut rng = seeded_rng(42);

    c.bench_function("step_mixed_256", |b| {
        b.iter(|| {
            world.step(&mut NoopStats, &mut rng).unwrap();
            black_box(world.tick_count());
        });
    });
}

/// Benchmark: one tick driven through the interruptible cursor.
fn bench_incremental_mixed_256(c: &mut Criterion) {
    let mut world = make_mixed_world();
    let mut rng = seeded_rng(42);

    c.bench_function("incremental_mixed_256", |b| {
        b.iter(|| {
            world.begin_incremental_tick().unwrap();
            while let sandfall_core::world::TickProgress::Yielded { processed } =
                world.resume_tick(&mut NoopStats, &mut rng)
            {
                black_box(processed);
            }
        });
    });
}

/// Benchmark: renderer pull after a tick.
fn bench_take_redraw_256(c: &mut Criterion) {
    let mut world = make_mixed_world();
    let mut rng = seeded_rng(7);

    c.bench_function("take_redraw_256", |b| {
        b.iter(|| {
            world.step(&mut NoopStats, &mut rng).unwrap();
            black_box(world.take_redraw().len());
        });
    });
}

criterion_group!(
    benches,
    bench_step_mixed_256,
    bench_incremental_mixed_256,
    bench_take_redraw_256
);
criterion_main!(benches);
