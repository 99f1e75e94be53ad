use criterion::{criterion_group, criterion_main, Criterion};
use rasterlab_image::{Image, ImageSize};
use std::hint::black_box;

const SIZE: ImageSize = ImageSize {
    width: 1920,
    height: 1080,
};

fn sample_image() -> Image<u8, 3> {
    Image::from_size_val(SIZE, 127).unwrap()
}

fn bench_image(c: &mut Criterion) {
    let mut group = c.benchmark_group("Image");

    group.bench_function("from_fn", |b| {
        b.iter(|| {
            Image::<u8, 3>::from_fn(black_box(SIZE), |row, col, ch| (row + col + ch) as u8)
                .unwrap()
        })
    });

    group.bench_function("split_channels", |b| {
        b.iter_batched(
            sample_image,
            |image| black_box(image).split_channels().unwrap(),
            criterion::BatchSize::LargeInput,
        )
    });

    group.finish();
}

criterion_group!(benches, bench_image);
criterion_main!(benches);
