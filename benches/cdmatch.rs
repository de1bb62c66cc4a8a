use cdmatch::kernel::{dilate_with, KernelShape, Radii};
use cdmatch::lowlevel::{ScalarDilation, SpanDilation};
use cdmatch::search::Variants;
use cdmatch::transform::gradient_image;
use cdmatch::{
    ColorDepthSearchAlgorithm, Image, PixelMatchConfig, PixelMatchProvider, Rgb,
    ShapeMatchConfig, ShapeMatchProvider, VariantKind, COLOR_DEPTH_LUT,
};
use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;

fn make_mip(width: usize, height: usize, seed: usize) -> Image {
    let mut data = Vec::with_capacity(width * height);
    for y in 0..height {
        for x in 0..width {
            let v = ((x * 13) ^ (y * 7) ^ (x * y) ^ seed) & 0xFF;
            if v < 80 {
                data.push(COLOR_DEPTH_LUT[(x + y + seed) % COLOR_DEPTH_LUT.len()]);
            } else {
                data.push(Rgb::BLACK);
            }
        }
    }
    Image::from_rgb(data, width, height).unwrap()
}

fn bench_pixel_match(c: &mut Criterion) {
    let query = make_mip(1210, 566, 0);
    let target = make_mip(1210, 566, 3);
    let alg = PixelMatchProvider::new(PixelMatchConfig::default())
        .unwrap()
        .create_algorithm(&query, None)
        .unwrap();
    let variants = Variants::new();

    c.bench_function("pixel_match_1210x566_shift2_mirror", |b| {
        b.iter(|| {
            let score = alg
                .calculate_matching_score(black_box(&target), &variants)
                .unwrap();
            black_box(score);
        })
    });
}

fn bench_shape_match(c: &mut Criterion) {
    let query = make_mip(400, 200, 0);
    let target = make_mip(400, 200, 5);
    let alg = ShapeMatchProvider::new(ShapeMatchConfig::default())
        .unwrap()
        .create_algorithm(&query, None)
        .unwrap();
    let gradient = gradient_image(&target, 20).unwrap();
    let variants = Variants::new().with_image(VariantKind::Gradient, gradient);

    c.bench_function("shape_match_400x200", |b| {
        b.iter(|| {
            let score = alg
                .calculate_matching_score(black_box(&target), &variants)
                .unwrap();
            black_box(score);
        })
    });
}

fn bench_dilation(c: &mut Criterion) {
    let image = make_mip(512, 256, 1);
    let radii = Radii::circle(10.0);

    c.bench_function("dilate_scalar_r10", |b| {
        b.iter(|| {
            let out =
                dilate_with(&ScalarDilation, black_box(&image), radii, KernelShape::Ellipsoid)
                    .unwrap();
            black_box(out);
        })
    });

    c.bench_function("dilate_span_r10", |b| {
        b.iter(|| {
            let out = dilate_with(&SpanDilation, black_box(&image), radii, KernelShape::Ellipsoid)
                .unwrap();
            black_box(out);
        })
    });

    #[cfg(feature = "rayon")]
    {
        use cdmatch::lowlevel::ParallelDilation;
        c.bench_function("dilate_rayon_r10", |b| {
            b.iter(|| {
                let out = dilate_with(
                    &ParallelDilation::default(),
                    black_box(&image),
                    radii,
                    KernelShape::Ellipsoid,
                )
                .unwrap();
                black_box(out);
            })
        });
    }
}

criterion_group!(benches, bench_pixel_match, bench_shape_match, bench_dilation);
criterion_main!(benches);
