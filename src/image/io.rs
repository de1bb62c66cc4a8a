//! Convenience helpers for loading images via the `image` crate.
//!
//! Available when the `image-io` feature is enabled.

use crate::image::{Image, Rgb};
use crate::util::{CdMatchError, CdMatchResult};
use image::DynamicImage;
use std::path::Path;

/// Creates an owned RGB image from an 8-bit RGB buffer.
pub fn image_from_rgb8(img: &image::RgbImage) -> CdMatchResult<Image> {
    let data = img.pixels().map(|px| Rgb::from(px.0)).collect();
    Image::from_rgb(data, img.width() as usize, img.height() as usize)
}

/// Converts a decoded image, keeping gray images gray and everything else RGB.
pub fn image_from_dynamic(img: &DynamicImage) -> CdMatchResult<Image> {
    let width = img.width() as usize;
    let height = img.height() as usize;
    match img {
        DynamicImage::ImageLuma8(gray) => Image::from_gray8(gray.as_raw().clone(), width, height),
        DynamicImage::ImageLuma16(gray) => {
            Image::from_pixels(gray.as_raw().clone(), width, height, 1)
        }
        other => image_from_rgb8(&other.to_rgb8()),
    }
}

/// Loads an image from disk.
pub fn load_image<P: AsRef<Path>>(path: P) -> CdMatchResult<Image> {
    let img = image::open(path).map_err(|err| CdMatchError::ImageIo {
        reason: err.to_string(),
    })?;
    image_from_dynamic(&img)
}

/// Loads an image from disk and converts it to RGB.
pub fn load_rgb_image<P: AsRef<Path>>(path: P) -> CdMatchResult<Image> {
    let img = image::open(path).map_err(|err| CdMatchError::ImageIo {
        reason: err.to_string(),
    })?;
    image_from_rgb8(&img.to_rgb8())
}
