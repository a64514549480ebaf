use std::hint::black_box;
use std::time::Instant;

use glam::Vec2;
use showcase_common::DrawSurface;
use showcase_particles::{FieldConfig, ParticleField};

fn bench_tick(count: usize, iterations: usize) {
    let surface = DrawSurface::new(1920, 1080);
    let config = FieldConfig {
        count,
        ..FieldConfig::default()
    };
    let mut field = ParticleField::seeded(surface, config, 42);
    let pointer = Some(Vec2::new(960.0, 540.0));

    let start = Instant::now();
    for _ in 0..iterations {
        black_box(field.tick(black_box(surface), black_box(pointer)));
    }
    let elapsed = start.elapsed();
    let per_iter = elapsed / iterations as u32;
    println!("  tick ({count} particles, {iterations} iters): {per_iter:?}/iter, total {elapsed:?}");
}

fn bench_init(count: usize, iterations: usize) {
    let surface = DrawSurface::new(1920, 1080);
    let start = Instant::now();
    for i in 0..iterations {
        let config = FieldConfig {
            count,
            ..FieldConfig::default()
        };
        black_box(ParticleField::seeded(surface, config, i as u64));
    }
    let elapsed = start.elapsed();
    let per_iter = elapsed / iterations as u32;
    println!("  init ({count} particles, {iterations} iters): {per_iter:?}/iter, total {elapsed:?}");
}

fn main() {
    println!("particle field benchmarks");
    for count in [800, 10_000, 100_000] {
        bench_tick(count, 200);
    }
    for count in [800, 10_000] {
        bench_init(count, 50);
    }
}
