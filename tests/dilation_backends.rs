use cdmatch::kernel::{dilate_with, KernelShape, Radii};
use cdmatch::lowlevel::{ScalarDilation, SpanDilation};
use cdmatch::{Image, Rgb};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn random_gray_volume(rng: &mut StdRng, w: usize, h: usize, d: usize) -> Image {
    let data: Vec<u16> = (0..w * h * d)
        .map(|_| if rng.random_bool(0.05) { rng.random() } else { 0 })
        .collect();
    Image::from_pixels(data, w, h, d).unwrap()
}

fn random_rgb(rng: &mut StdRng, w: usize, h: usize) -> Image {
    let data = (0..w * h)
        .map(|_| {
            if rng.random_bool(0.1) {
                Rgb::new(rng.random(), rng.random(), rng.random())
            } else {
                Rgb::BLACK
            }
        })
        .collect();
    Image::from_rgb(data, w, h).unwrap()
}

fn sparse_binary(rng: &mut StdRng, w: usize, h: usize, d: usize) -> Image {
    let data: Vec<u8> = (0..w * h * d).map(|_| u8::from(rng.random_bool(0.02))).collect();
    Image::from_pixels(data, w, h, d).unwrap()
}

#[test]
fn span_matches_scalar_on_volumes() {
    let mut rng = StdRng::seed_from_u64(11);
    let volume = random_gray_volume(&mut rng, 23, 17, 7);
    for radii in [
        Radii::sphere(0.0),
        Radii::sphere(1.0),
        Radii::new(3.0, 2.0, 1.0),
        Radii::new(2.5, 4.2, 0.0),
    ] {
        for shape in [KernelShape::Ellipsoid, KernelShape::Box] {
            let a = dilate_with(&ScalarDilation, &volume, radii, shape).unwrap();
            let b = dilate_with(&SpanDilation, &volume, radii, shape).unwrap();
            assert_eq!(a, b, "{radii:?} {shape:?}");
        }
    }
}

#[test]
fn span_matches_scalar_on_rgb() {
    let mut rng = StdRng::seed_from_u64(5);
    let image = random_rgb(&mut rng, 31, 19);
    for r in [1.0, 2.0, 5.0, 40.0] {
        let radii = Radii::circle(r);
        let a = dilate_with(&ScalarDilation, &image, radii, KernelShape::Ellipsoid).unwrap();
        let b = dilate_with(&SpanDilation, &image, radii, KernelShape::Ellipsoid).unwrap();
        assert_eq!(a, b, "radius {r}");
    }
}

#[test]
fn dilation_only_adds_foreground() {
    let mut rng = StdRng::seed_from_u64(3);
    let volume = sparse_binary(&mut rng, 20, 20, 6);
    let radii = Radii::new(2.0, 2.0, 1.0);
    let once = dilate_with(&SpanDilation, &volume, radii, KernelShape::Ellipsoid).unwrap();
    let twice = dilate_with(&SpanDilation, &once, radii, KernelShape::Ellipsoid).unwrap();
    for idx in 0..volume.len() {
        if volume.is_set(idx) {
            assert!(once.is_set(idx));
        }
        if once.is_set(idx) {
            assert!(twice.is_set(idx));
        }
    }
    assert!(once.count_set() >= volume.count_set());
    assert!(twice.count_set() >= once.count_set());
}

#[test]
fn single_voxel_grows_into_the_footprint() {
    let mut data = vec![0u8; 9 * 9];
    data[4 * 9 + 4] = 200;
    let image = Image::from_gray8(data, 9, 9).unwrap();
    let out = dilate_with(
        &SpanDilation,
        &image,
        Radii::circle(2.0),
        KernelShape::Ellipsoid,
    )
    .unwrap();
    assert_eq!(out.count_set(), 13);
    let px = out.pixels::<u8>().unwrap();
    assert_eq!(px[4 * 9 + 6], 200);
    assert_eq!(px[6 * 9 + 6], 0);
}
