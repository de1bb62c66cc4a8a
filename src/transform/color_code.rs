//! Color-depth projection of a gray z-stack.
//!
//! Every slice is tinted with the LUT color of its depth, scaled by the voxel
//! intensity, and the tinted voxels are composited into a single RGB image.

use crate::color::{channel_order, ChannelOrder, HueBand, COLOR_DEPTH_LUT};
use crate::image::{Image, PixelData, Rgb};
use crate::trace::trace_span;
use crate::util::{CdMatchError, CdMatchResult};

/// Configuration for [`color_depth_mip`].
#[derive(Clone, Debug)]
pub struct ColorCodeConfig {
    /// Ramp sampled from the first to the last entry across the stack depth.
    pub lut: Vec<Rgb>,
    /// Intensity mapped to full LUT brightness; the stack maximum when `None`.
    pub intensity_max: Option<u32>,
}

impl Default for ColorCodeConfig {
    fn default() -> Self {
        Self {
            lut: COLOR_DEPTH_LUT.to_vec(),
            intensity_max: None,
        }
    }
}

/// LUT entry used for slice `z` of a stack with `depth` slices.
pub fn lut_index(z: usize, depth: usize, lut_len: usize) -> usize {
    if depth <= 1 || lut_len <= 1 {
        return 0;
    }
    (z * (lut_len - 1) + (depth - 1) / 2) / (depth - 1)
}

fn tint(color: Rgb, value: u32, intensity_max: u32) -> Rgb {
    let scale = |c: u8| -> u8 {
        let v = u64::from(c) * u64::from(value.min(intensity_max));
        ((v + u64::from(intensity_max) / 2) / u64::from(intensity_max)) as u8
    };
    Rgb::new(scale(color.r()), scale(color.g()), scale(color.b()))
}

fn more_saturated(candidate: &ChannelOrder, current: &ChannelOrder) -> bool {
    // ratios compared without division: c2/c1 < k2/k1
    u32::from(candidate.second_value) * u32::from(current.first_value)
        < u32::from(current.second_value) * u32::from(candidate.first_value)
}

/// What an equally bright deeper voxel does to the projection pixel.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TieRule {
    /// Replace the pixel when the candidate is strictly more saturated.
    Overwrite,
    /// Take the per-channel maximum of both colors.
    Merge,
}

/// Tie rule keyed by the hue band of the deeper voxel.
///
/// Bands where the second channel fades with depth sharpen toward a primary
/// and overwrite; bands where it rises blend into the existing color.
pub fn tie_rule(band: HueBand) -> TieRule {
    match band {
        HueBand::BlueRed => TieRule::Overwrite,
        HueBand::BlueGreen => TieRule::Merge,
        HueBand::GreenBlue => TieRule::Overwrite,
        HueBand::GreenRed => TieRule::Merge,
        HueBand::RedGreen => TieRule::Overwrite,
        HueBand::RedBlue => TieRule::Merge,
    }
}

fn merge(current: Rgb, candidate: Rgb) -> Rgb {
    Rgb::new(
        current.r().max(candidate.r()),
        current.g().max(candidate.g()),
        current.b().max(candidate.b()),
    )
}

/// Composites a deeper tinted voxel into the projection pixel.
///
/// A brighter dominant channel always wins. At equal brightness the band of
/// the candidate selects its [`TieRule`], so the result depends on argument
/// order.
pub fn composite(current: Rgb, candidate: Rgb) -> Rgb {
    let Some(cand) = channel_order(candidate) else {
        return current;
    };
    let Some(cur) = channel_order(current) else {
        return candidate;
    };
    if cand.first_value != cur.first_value {
        return if cand.first_value > cur.first_value {
            candidate
        } else {
            current
        };
    }
    let Some(band) = cand.band() else {
        return current;
    };
    match tie_rule(band) {
        TieRule::Merge => merge(current, candidate),
        TieRule::Overwrite if more_saturated(&cand, &cur) => candidate,
        TieRule::Overwrite => current,
    }
}

/// Projects a Gray8 or Gray16 stack into a color depth MIP.
pub fn color_depth_mip(stack: &Image, cfg: &ColorCodeConfig) -> CdMatchResult<Image> {
    if cfg.lut.is_empty() {
        return Err(CdMatchError::InvalidInput("color lut is empty"));
    }
    let dims = stack.dims();
    let _span = trace_span!("color_depth_mip", depth = dims.depth).entered();

    let values: Vec<u32> = match stack.data() {
        PixelData::Gray8(v) => v.iter().map(|&x| u32::from(x)).collect(),
        PixelData::Gray16(v) => v.iter().map(|&x| u32::from(x)).collect(),
        other => {
            return Err(CdMatchError::UnsupportedPixelType {
                op: "color_depth_mip",
                pixel_type: other.pixel_type(),
            })
        }
    };
    let intensity_max = cfg
        .intensity_max
        .unwrap_or_else(|| values.iter().copied().max().unwrap_or(0))
        .max(1);

    let plane = dims.plane_len();
    let mut out = vec![Rgb::BLACK; plane];
    for z in 0..dims.depth {
        let color = cfg.lut[lut_index(z, dims.depth, cfg.lut.len())];
        let slice = &values[z * plane..(z + 1) * plane];
        for (px, &value) in out.iter_mut().zip(slice) {
            if value == 0 {
                continue;
            }
            *px = composite(*px, tint(color, value, intensity_max));
        }
    }
    Image::from_rgb(out, dims.width, dims.height)
}

#[cfg(test)]
mod tests {
    use super::{composite, lut_index, tie_rule, TieRule};
    use crate::color::channel_order;
    use crate::image::Rgb;

    #[test]
    fn lut_index_spans_the_ramp() {
        assert_eq!(lut_index(0, 10, 256), 0);
        assert_eq!(lut_index(9, 10, 256), 255);
        assert_eq!(lut_index(0, 1, 256), 0);
    }

    #[test]
    fn brighter_candidate_wins() {
        let dim = Rgb::new(100, 0, 0);
        let bright = Rgb::new(0, 0, 200);
        assert_eq!(composite(dim, bright), bright);
        assert_eq!(composite(bright, dim), bright);
        assert_eq!(composite(Rgb::BLACK, dim), dim);
        assert_eq!(composite(dim, Rgb::BLACK), dim);
    }

    #[test]
    fn overwrite_bands_keep_the_more_saturated_color() {
        // (current, more saturated candidate) per overwrite band
        let cases = [
            (Rgb::new(120, 0, 200), Rgb::new(40, 0, 200)),
            (Rgb::new(0, 200, 90), Rgb::new(0, 200, 30)),
            (Rgb::new(200, 150, 0), Rgb::new(200, 20, 0)),
        ];
        for (pale, pure) in cases {
            let band = channel_order(pure).and_then(|o| o.band()).unwrap();
            assert_eq!(tie_rule(band), TieRule::Overwrite);
            assert_eq!(composite(pale, pure), pure, "{band:?}");
            assert_eq!(composite(pure, pale), pure, "{band:?}");
            assert_eq!(composite(pure, pure), pure, "{band:?}");
        }
    }

    #[test]
    fn merge_bands_take_channel_maxima() {
        // (current, candidate, merged) per merge band
        let cases = [
            (Rgb::new(90, 0, 200), Rgb::new(0, 60, 200), Rgb::new(90, 60, 200)),
            (Rgb::new(0, 200, 70), Rgb::new(110, 200, 0), Rgb::new(110, 200, 70)),
            (Rgb::new(200, 130, 0), Rgb::new(200, 0, 80), Rgb::new(200, 130, 80)),
        ];
        for (current, candidate, merged) in cases {
            let band = channel_order(candidate).and_then(|o| o.band()).unwrap();
            assert_eq!(tie_rule(band), TieRule::Merge);
            assert_eq!(composite(current, candidate), merged, "{band:?}");
        }
    }

    #[test]
    fn ties_depend_on_slice_order() {
        let blue_red = Rgb::new(90, 0, 200);
        let blue_green = Rgb::new(0, 60, 200);
        assert_eq!(composite(blue_red, blue_green), Rgb::new(90, 60, 200));
        // BlueRed overwrites only when more saturated: 90/200 vs 60/200
        assert_eq!(composite(blue_green, blue_red), blue_green);
    }

    #[test]
    fn grey_candidate_is_least_saturated() {
        let grey = Rgb::new(200, 200, 200);
        let red = Rgb::new(200, 10, 0);
        assert_eq!(composite(red, grey), red);
    }
}
