use criterion::{Criterion, black_box, criterion_group, criterion_main};
use qrgrid::utils::grayscale::{rgba_to_grayscale, rgba_to_grayscale_parallel};

fn bench_rgba_small(c: &mut Criterion) {
    let image = vec![128u8; 100 * 100 * 4];
    c.bench_function("rgba_to_grayscale_100x100", |b| {
        b.iter(|| rgba_to_grayscale(black_box(&image), black_box(100), black_box(100)))
    });
}

fn bench_rgba_medium(c: &mut Criterion) {
    let image = vec![128u8; 640 * 480 * 4];
    c.bench_function("rgba_to_grayscale_640x480", |b| {
        b.iter(|| rgba_to_grayscale(black_box(&image), black_box(640), black_box(480)))
    });
}

fn bench_rgba_parallel_large(c: &mut Criterion) {
    let image = vec![128u8; 1920 * 1080 * 4];
    c.bench_function("rgba_to_grayscale_parallel_1920x1080", |b| {
        b.iter(|| rgba_to_grayscale_parallel(black_box(&image), black_box(1920), black_box(1080)))
    });
}

criterion_group!(benches, bench_rgba_small, bench_rgba_medium, bench_rgba_parallel_large);
criterion_main!(benches);
