//! Derived target variants consumed by the shape match.

use crate::image::Image;
use crate::kernel::{dilate_with, span::SpanDilation, DilationBackend, KernelShape, Radii};
use crate::transform::distance::squared_distances;
use crate::util::CdMatchResult;

/// Gray16 gradient image: rounded distance of every pixel to the nearest
/// target signal above `threshold`, saturated at `u16::MAX`.
pub fn gradient_image(target: &Image, threshold: i32) -> CdMatchResult<Image> {
    let dims = target.dims();
    let data: Vec<u16> = squared_distances(target, threshold)
        .into_iter()
        .map(|d| {
            let d = d.sqrt().round();
            if d >= f64::from(u16::MAX) {
                u16::MAX
            } else {
                d as u16
            }
        })
        .collect();
    Image::from_pixels(data, dims.width, dims.height, dims.depth)
}

/// Z-gap mask: the thresholded target max-filtered with an in-plane circle.
pub fn z_gap_mask(target: &Image, threshold: i32, radius: f64) -> CdMatchResult<Image> {
    z_gap_mask_with(&SpanDilation, target, threshold, radius)
}

/// [`z_gap_mask`] on an explicit dilation backend.
pub fn z_gap_mask_with<B: DilationBackend + ?Sized>(
    backend: &B,
    target: &Image,
    threshold: i32,
    radius: f64,
) -> CdMatchResult<Image> {
    dilate_with(
        backend,
        &target.threshold(threshold),
        Radii::circle(radius),
        KernelShape::Ellipsoid,
    )
}

#[cfg(test)]
mod tests {
    use super::{gradient_image, z_gap_mask};
    use crate::image::{Image, Rgb};

    #[test]
    fn gradient_is_zero_on_signal() {
        let mut data = vec![Rgb::BLACK; 9];
        data[4] = Rgb::new(0, 0, 200);
        let img = Image::from_rgb(data, 3, 3).unwrap();
        let grad = gradient_image(&img, 10).unwrap();
        let g = grad.pixels::<u16>().unwrap();
        assert_eq!(g[4], 0);
        assert_eq!(g[1], 1);
        assert_eq!(g[0], 1);
    }

    #[test]
    fn z_gap_mask_spreads_color() {
        let mut data = vec![Rgb::BLACK; 25];
        data[12] = Rgb::new(0, 0, 200);
        data[0] = Rgb::new(5, 5, 5);
        let img = Image::from_rgb(data, 5, 5).unwrap();
        let mask = z_gap_mask(&img, 10, 1.0).unwrap();
        let m = mask.pixels::<Rgb>().unwrap();
        assert_eq!(m[7], Rgb::new(0, 0, 200));
        assert_eq!(m[6], Rgb::BLACK);
        assert_eq!(m[0], Rgb::BLACK);
    }
}
