//! Color-depth lookup table and slice-gap computation.
//!
//! The table maps depth slice `i` (1-based slice number `i + 1`) to the color
//! used when rendering a color depth MIP. It is split into six contiguous
//! bands, one per [`HueBand`], and within a band the ratio of the
//! second-dominant to the dominant channel is strictly monotonic, so a
//! color can be mapped back to its slice by a nearest-ratio search.

use crate::color::{channel_order, HueBand};
use crate::image::Rgb;
use crate::util::math::channel_ratio;
use std::ops::RangeInclusive;

/// Number of entries in the color depth ramp.
pub const LUT_SIZE: usize = 256;

/// Color depth ramp, from shallow (magenta/blue) to deep (red/magenta).
pub static COLOR_DEPTH_LUT: [Rgb; LUT_SIZE] = [
    Rgb(0xF900FF), Rgb(0xF300FF), Rgb(0xEE00FF), Rgb(0xE800FF), Rgb(0xE200FF), Rgb(0xDC00FF),
    Rgb(0xD600FF), Rgb(0xD100FF), Rgb(0xCB00FF), Rgb(0xC500FF), Rgb(0xBF00FF), Rgb(0xB900FF),
    Rgb(0xB400FF), Rgb(0xAE00FF), Rgb(0xA800FF), Rgb(0xA200FF), Rgb(0x9C00FF), Rgb(0x9700FF),
    Rgb(0x9100FF), Rgb(0x8B00FF), Rgb(0x8500FF), Rgb(0x8000FF), Rgb(0x7A00FF), Rgb(0x7400FF),
    Rgb(0x6E00FF), Rgb(0x6800FF), Rgb(0x6300FF), Rgb(0x5D00FF), Rgb(0x5700FF), Rgb(0x5100FF),
    Rgb(0x4B00FF), Rgb(0x4600FF), Rgb(0x4000FF), Rgb(0x3A00FF), Rgb(0x3400FF), Rgb(0x2E00FF),
    Rgb(0x2900FF), Rgb(0x2300FF), Rgb(0x1D00FF), Rgb(0x1700FF), Rgb(0x1100FF), Rgb(0x0C00FF),
    Rgb(0x0600FF), Rgb(0x0006FF), Rgb(0x000CFF), Rgb(0x0011FF), Rgb(0x0017FF), Rgb(0x001DFF),
    Rgb(0x0023FF), Rgb(0x0029FF), Rgb(0x002EFF), Rgb(0x0034FF), Rgb(0x003AFF), Rgb(0x0040FF),
    Rgb(0x0046FF), Rgb(0x004BFF), Rgb(0x0051FF), Rgb(0x0057FF), Rgb(0x005DFF), Rgb(0x0063FF),
    Rgb(0x0068FF), Rgb(0x006EFF), Rgb(0x0074FF), Rgb(0x007AFF), Rgb(0x0080FF), Rgb(0x0085FF),
    Rgb(0x008BFF), Rgb(0x0091FF), Rgb(0x0097FF), Rgb(0x009CFF), Rgb(0x00A2FF), Rgb(0x00A8FF),
    Rgb(0x00AEFF), Rgb(0x00B4FF), Rgb(0x00B9FF), Rgb(0x00BFFF), Rgb(0x00C5FF), Rgb(0x00CBFF),
    Rgb(0x00D1FF), Rgb(0x00D6FF), Rgb(0x00DCFF), Rgb(0x00E2FF), Rgb(0x00E8FF), Rgb(0x00EEFF),
    Rgb(0x00F3FF), Rgb(0x00F9FF), Rgb(0x00FFF9), Rgb(0x00FFF3), Rgb(0x00FFEE), Rgb(0x00FFE8),
    Rgb(0x00FFE2), Rgb(0x00FFDC), Rgb(0x00FFD6), Rgb(0x00FFD1), Rgb(0x00FFCB), Rgb(0x00FFC5),
    Rgb(0x00FFBF), Rgb(0x00FFB9), Rgb(0x00FFB4), Rgb(0x00FFAE), Rgb(0x00FFA8), Rgb(0x00FFA2),
    Rgb(0x00FF9C), Rgb(0x00FF97), Rgb(0x00FF91), Rgb(0x00FF8B), Rgb(0x00FF85), Rgb(0x00FF80),
    Rgb(0x00FF7A), Rgb(0x00FF74), Rgb(0x00FF6E), Rgb(0x00FF68), Rgb(0x00FF63), Rgb(0x00FF5D),
    Rgb(0x00FF57), Rgb(0x00FF51), Rgb(0x00FF4B), Rgb(0x00FF46), Rgb(0x00FF40), Rgb(0x00FF3A),
    Rgb(0x00FF34), Rgb(0x00FF2E), Rgb(0x00FF29), Rgb(0x00FF23), Rgb(0x00FF1D), Rgb(0x00FF17),
    Rgb(0x00FF11), Rgb(0x00FF0C), Rgb(0x00FF06), Rgb(0x06FF00), Rgb(0x0CFF00), Rgb(0x11FF00),
    Rgb(0x17FF00), Rgb(0x1DFF00), Rgb(0x23FF00), Rgb(0x29FF00), Rgb(0x2EFF00), Rgb(0x34FF00),
    Rgb(0x3AFF00), Rgb(0x40FF00), Rgb(0x46FF00), Rgb(0x4BFF00), Rgb(0x51FF00), Rgb(0x57FF00),
    Rgb(0x5DFF00), Rgb(0x63FF00), Rgb(0x68FF00), Rgb(0x6EFF00), Rgb(0x74FF00), Rgb(0x7AFF00),
    Rgb(0x80FF00), Rgb(0x85FF00), Rgb(0x8BFF00), Rgb(0x91FF00), Rgb(0x97FF00), Rgb(0x9CFF00),
    Rgb(0xA2FF00), Rgb(0xA8FF00), Rgb(0xAEFF00), Rgb(0xB4FF00), Rgb(0xB9FF00), Rgb(0xBFFF00),
    Rgb(0xC5FF00), Rgb(0xCBFF00), Rgb(0xD1FF00), Rgb(0xD6FF00), Rgb(0xDCFF00), Rgb(0xE2FF00),
    Rgb(0xE8FF00), Rgb(0xEEFF00), Rgb(0xF3FF00), Rgb(0xF9FF00), Rgb(0xFFF900), Rgb(0xFFF300),
    Rgb(0xFFED00), Rgb(0xFFE700), Rgb(0xFFE100), Rgb(0xFFDB00), Rgb(0xFFD500), Rgb(0xFFD000),
    Rgb(0xFFCA00), Rgb(0xFFC400), Rgb(0xFFBE00), Rgb(0xFFB800), Rgb(0xFFB200), Rgb(0xFFAC00),
    Rgb(0xFFA600), Rgb(0xFFA000), Rgb(0xFF9A00), Rgb(0xFF9400), Rgb(0xFF8E00), Rgb(0xFF8800),
    Rgb(0xFF8200), Rgb(0xFF7D00), Rgb(0xFF7700), Rgb(0xFF7100), Rgb(0xFF6B00), Rgb(0xFF6500),
    Rgb(0xFF5F00), Rgb(0xFF5900), Rgb(0xFF5300), Rgb(0xFF4D00), Rgb(0xFF4700), Rgb(0xFF4100),
    Rgb(0xFF3B00), Rgb(0xFF3500), Rgb(0xFF2F00), Rgb(0xFF2A00), Rgb(0xFF2400), Rgb(0xFF1E00),
    Rgb(0xFF1800), Rgb(0xFF1200), Rgb(0xFF0C00), Rgb(0xFF0600), Rgb(0xFF0006), Rgb(0xFF000C),
    Rgb(0xFF0012), Rgb(0xFF0018), Rgb(0xFF001E), Rgb(0xFF0024), Rgb(0xFF002A), Rgb(0xFF002F),
    Rgb(0xFF0035), Rgb(0xFF003B), Rgb(0xFF0041), Rgb(0xFF0047), Rgb(0xFF004D), Rgb(0xFF0053),
    Rgb(0xFF0059), Rgb(0xFF005F), Rgb(0xFF0065), Rgb(0xFF006B), Rgb(0xFF0071), Rgb(0xFF0077),
    Rgb(0xFF007D), Rgb(0xFF0082), Rgb(0xFF0088), Rgb(0xFF008E), Rgb(0xFF0094), Rgb(0xFF009A),
    Rgb(0xFF00A0), Rgb(0xFF00A6), Rgb(0xFF00AC), Rgb(0xFF00B2), Rgb(0xFF00B8), Rgb(0xFF00BE),
    Rgb(0xFF00C4), Rgb(0xFF00CA), Rgb(0xFF00D0), Rgb(0xFF00D5), Rgb(0xFF00DB), Rgb(0xFF00E1),
    Rgb(0xFF00E7), Rgb(0xFF00ED), Rgb(0xFF00F3), Rgb(0xFF00F9),
];

/// Index range of the LUT entries belonging to `band`.
pub fn band_range(band: HueBand) -> RangeInclusive<usize> {
    match band {
        HueBand::BlueRed => 0..=42,
        HueBand::BlueGreen => 43..=85,
        HueBand::GreenBlue => 86..=128,
        HueBand::GreenRed => 129..=171,
        HueBand::RedGreen => 172..=213,
        HueBand::RedBlue => 214..=255,
    }
}

/// Returns the 1-based slice number whose LUT color best matches `px`.
///
/// Returns 0 when the pixel has no usable channel order. An exact ratio match
/// returns immediately; otherwise the entry with the smallest ratio
/// difference wins, later entries winning ties.
pub fn find_slice(px: Rgb) -> usize {
    let Some(order) = channel_order(px) else {
        return 0;
    };
    let Some(band) = order.band() else {
        return 0;
    };
    let ratio = order.ratio();

    let mut best = 0usize;
    let mut min_diff = f64::MAX;
    for idx in band_range(band) {
        let entry = COLOR_DEPTH_LUT[idx];
        let lut_ratio = channel_ratio(order.second.of(entry), order.first.of(entry));
        let diff = (lut_ratio - ratio).abs();
        if diff == 0.0 {
            return idx + 1;
        }
        if diff <= min_diff {
            min_diff = diff;
            best = idx + 1;
        }
    }
    best
}

/// Depth disagreement between a query and a target color, in slices.
///
/// When either color does not resolve to a slice the target slice number
/// (possibly 0) is returned unchanged.
pub fn color_slice_gap(query: Rgb, target: Rgb) -> i32 {
    let query_slice = find_slice(query) as i32;
    let target_slice = find_slice(target) as i32;
    if query_slice == 0 || target_slice == 0 {
        target_slice
    } else {
        (query_slice - target_slice).abs()
    }
}

#[cfg(test)]
mod tests {
    use super::{band_range, color_slice_gap, find_slice, COLOR_DEPTH_LUT};
    use crate::color::{channel_order, HueBand};
    use crate::image::Rgb;

    #[test]
    fn bands_tile_the_table() {
        let mut next = 0;
        for band in HueBand::ALL {
            let range = band_range(band);
            assert_eq!(*range.start(), next);
            next = range.end() + 1;
        }
        assert_eq!(next, COLOR_DEPTH_LUT.len());
    }

    #[test]
    fn entries_classify_into_their_own_band() {
        for band in HueBand::ALL {
            for idx in band_range(band) {
                let order = channel_order(COLOR_DEPTH_LUT[idx]).unwrap();
                assert_eq!(order.band(), Some(band), "entry {idx}");
            }
        }
    }

    #[test]
    fn black_resolves_to_no_slice() {
        assert_eq!(find_slice(Rgb::BLACK), 0);
        assert_eq!(color_slice_gap(Rgb::BLACK, COLOR_DEPTH_LUT[9]), 10);
        assert_eq!(color_slice_gap(COLOR_DEPTH_LUT[9], Rgb::BLACK), 0);
    }
}
