//! Histogram-based contrast stretching for gray images.

use crate::image::{Image, PixelData};
use crate::util::math::rescale_clamped;
use crate::util::{CdMatchError, CdMatchResult};

/// Configuration for [`stretch_contrast`].
#[derive(Clone, Debug)]
pub struct ContrastConfig {
    /// Fraction of non-zero pixels allowed to saturate at `target_max`.
    pub saturation: f64,
    /// Input value mapped to 0.
    pub default_min: u32,
    /// Output value assigned to the saturation threshold and above.
    pub target_max: u32,
}

impl Default for ContrastConfig {
    fn default() -> Self {
        Self {
            saturation: 0.0035,
            default_min: 0,
            target_max: 255,
        }
    }
}

/// Smallest intensity such that at least `saturation * n` non-zero pixels
/// lie at or above it, where `n` is the number of non-zero pixels.
pub fn saturation_threshold(values: impl Iterator<Item = u32>, saturation: f64) -> Option<u32> {
    let mut hist = vec![0usize; u16::MAX as usize + 1];
    let mut total = 0usize;
    let mut max_value = 0u32;
    for v in values.filter(|&v| v != 0) {
        let v = v.min(u16::MAX as u32);
        hist[v as usize] += 1;
        total += 1;
        max_value = max_value.max(v);
    }
    if total == 0 {
        return None;
    }
    let limit = total as f64 * saturation;
    let mut count = 0usize;
    for v in (1..=max_value).rev() {
        count += hist[v as usize];
        if count as f64 >= limit {
            return Some(v);
        }
    }
    Some(1)
}

/// Linearly rescales `[default_min, threshold]` to `[0, target_max]`.
///
/// Gray8 and Gray16 images keep their encoding. Images without any non-zero
/// pixel are returned unchanged.
pub fn stretch_contrast(image: &Image, cfg: &ContrastConfig) -> CdMatchResult<Image> {
    if !(0.0..=1.0).contains(&cfg.saturation) {
        return Err(CdMatchError::InvalidInput("saturation must be in [0, 1]"));
    }
    let dims = image.dims();
    let data = match image.data() {
        PixelData::Gray8(values) => {
            if cfg.target_max > u8::MAX as u32 {
                return Err(CdMatchError::InvalidInput(
                    "target max exceeds the 8-bit range",
                ));
            }
            let Some(threshold) =
                saturation_threshold(values.iter().map(|&v| u32::from(v)), cfg.saturation)
            else {
                return Ok(image.clone());
            };
            PixelData::Gray8(
                values
                    .iter()
                    .map(|&v| stretch_value(u32::from(v), threshold, cfg) as u8)
                    .collect(),
            )
        }
        PixelData::Gray16(values) => {
            if cfg.target_max > u16::MAX as u32 {
                return Err(CdMatchError::InvalidInput(
                    "target max exceeds the 16-bit range",
                ));
            }
            let Some(threshold) =
                saturation_threshold(values.iter().map(|&v| u32::from(v)), cfg.saturation)
            else {
                return Ok(image.clone());
            };
            PixelData::Gray16(
                values
                    .iter()
                    .map(|&v| stretch_value(u32::from(v), threshold, cfg) as u16)
                    .collect(),
            )
        }
        other => {
            return Err(CdMatchError::UnsupportedPixelType {
                op: "stretch_contrast",
                pixel_type: other.pixel_type(),
            })
        }
    };
    Image::new(dims.width, dims.height, dims.depth, data)
}

fn stretch_value(value: u32, threshold: u32, cfg: &ContrastConfig) -> u32 {
    let scaled = rescale_clamped(
        f64::from(value),
        f64::from(cfg.default_min),
        f64::from(threshold),
        f64::from(cfg.target_max),
    );
    scaled.round() as u32
}

#[cfg(test)]
mod tests {
    use super::saturation_threshold;

    #[test]
    fn threshold_ignores_zero_pixels() {
        let values = [0u32, 0, 0, 10, 20, 30, 40];
        assert_eq!(saturation_threshold(values.into_iter(), 0.0), Some(40));
        assert_eq!(saturation_threshold(values.into_iter(), 0.5), Some(30));
        assert_eq!(saturation_threshold(values.into_iter(), 1.0), Some(10));
        assert_eq!(saturation_threshold([0u32; 3].into_iter(), 0.5), None);
    }
}
