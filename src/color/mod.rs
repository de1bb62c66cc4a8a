//! Color-depth hue classification.
//!
//! A color depth MIP encodes z as hue along a six-band ramp. Each band is
//! identified by the dominant channel and the second-dominant channel of a
//! pixel; within a band the ratio `second / dominant` moves monotonically
//! from one end of the band to the other.

pub mod lut;

use crate::image::Rgb;
use crate::util::math::channel_ratio;

pub use lut::{color_slice_gap, find_slice, COLOR_DEPTH_LUT};

/// A single RGB channel.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Channel {
    Red,
    Green,
    Blue,
}

impl Channel {
    /// Reads this channel from a packed pixel.
    #[inline]
    pub fn of(self, px: Rgb) -> u8 {
        match self {
            Channel::Red => px.r(),
            Channel::Green => px.g(),
            Channel::Blue => px.b(),
        }
    }
}

/// Dominant and second-dominant channel of a pixel with their values.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ChannelOrder {
    pub first: Channel,
    pub second: Channel,
    pub first_value: u8,
    pub second_value: u8,
}

impl ChannelOrder {
    /// Ratio `second / first`, in `[0, 1]`.
    #[inline]
    pub fn ratio(&self) -> f64 {
        channel_ratio(self.second_value, self.first_value)
    }

    /// Hue band selected by the channel pair.
    pub fn band(&self) -> Option<HueBand> {
        HueBand::from_pair(self.first, self.second)
    }
}

/// Orders the channels of `px`.
///
/// Red wins ties for the dominant slot, then green. For the second slot the
/// earlier channel in RGB order wins ties. Black pixels have no order.
pub fn channel_order(px: Rgb) -> Option<ChannelOrder> {
    let (r, g, b) = (px.r(), px.g(), px.b());
    let (first, second) = if r >= g && r >= b {
        (Channel::Red, if g >= b { Channel::Green } else { Channel::Blue })
    } else if g >= r && g >= b {
        (Channel::Green, if r >= b { Channel::Red } else { Channel::Blue })
    } else {
        (Channel::Blue, if r >= g { Channel::Red } else { Channel::Green })
    };
    let first_value = first.of(px);
    if first_value == 0 {
        return None;
    }
    Some(ChannelOrder {
        first,
        second,
        first_value,
        second_value: second.of(px),
    })
}

/// The six hue bands of the color depth ramp, in ramp order.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum HueBand {
    /// Magenta to blue; red fades out.
    BlueRed,
    /// Blue to cyan; green rises.
    BlueGreen,
    /// Cyan to green; blue fades out.
    GreenBlue,
    /// Green to yellow; red rises.
    GreenRed,
    /// Yellow to red; green fades out.
    RedGreen,
    /// Red to magenta; blue rises.
    RedBlue,
}

impl HueBand {
    /// All bands in ramp order.
    pub const ALL: [HueBand; 6] = [
        HueBand::BlueRed,
        HueBand::BlueGreen,
        HueBand::GreenBlue,
        HueBand::GreenRed,
        HueBand::RedGreen,
        HueBand::RedBlue,
    ];

    /// Maps a (dominant, second) channel pair to its band.
    pub fn from_pair(first: Channel, second: Channel) -> Option<Self> {
        match (first, second) {
            (Channel::Blue, Channel::Red) => Some(HueBand::BlueRed),
            (Channel::Blue, Channel::Green) => Some(HueBand::BlueGreen),
            (Channel::Green, Channel::Blue) => Some(HueBand::GreenBlue),
            (Channel::Green, Channel::Red) => Some(HueBand::GreenRed),
            (Channel::Red, Channel::Green) => Some(HueBand::RedGreen),
            (Channel::Red, Channel::Blue) => Some(HueBand::RedBlue),
            _ => None,
        }
    }

    /// Position of the band along the ramp.
    pub fn index(self) -> usize {
        match self {
            HueBand::BlueRed => 0,
            HueBand::BlueGreen => 1,
            HueBand::GreenBlue => 2,
            HueBand::GreenRed => 3,
            HueBand::RedGreen => 4,
            HueBand::RedBlue => 5,
        }
    }

    /// `true` when the ratio grows along the ramp inside this band.
    pub fn ascending(self) -> bool {
        matches!(
            self,
            HueBand::BlueGreen | HueBand::GreenRed | HueBand::RedBlue
        )
    }
}

/// Continuous position of `px` along the hue ramp, in `[0, 6]`.
///
/// Adjacent bands meet where their ratios coincide (pure primaries at ratio
/// 0, secondaries at ratio 1), so the position is continuous across bands.
pub fn ramp_position(px: Rgb) -> Option<f64> {
    let order = channel_order(px)?;
    let band = order.band()?;
    let ratio = order.ratio();
    let offset = if band.ascending() { ratio } else { 1.0 - ratio };
    Some(band.index() as f64 + offset)
}

/// Hue distance between two pixels in ramp units; one unit spans one band.
///
/// Returns `f64::INFINITY` when either pixel is black.
pub fn pixel_gap(query: Rgb, target: Rgb) -> f64 {
    match (ramp_position(query), ramp_position(target)) {
        (Some(a), Some(b)) => (a - b).abs(),
        _ => f64::INFINITY,
    }
}

#[cfg(test)]
mod tests {
    use super::{channel_order, pixel_gap, ramp_position, Channel, HueBand};
    use crate::image::Rgb;

    #[test]
    fn channel_order_breaks_ties_in_rgb_order() {
        let order = channel_order(Rgb::new(255, 0, 0)).unwrap();
        assert_eq!((order.first, order.second), (Channel::Red, Channel::Green));
        let order = channel_order(Rgb::new(0, 0, 255)).unwrap();
        assert_eq!((order.first, order.second), (Channel::Blue, Channel::Red));
        let order = channel_order(Rgb::new(100, 100, 100)).unwrap();
        assert_eq!(order.first, Channel::Red);
        assert!(channel_order(Rgb::BLACK).is_none());
    }

    #[test]
    fn ramp_is_continuous_at_band_edges() {
        let cyan_from_blue = ramp_position(Rgb::new(0, 254, 255)).unwrap();
        let cyan_from_green = ramp_position(Rgb::new(0, 255, 254)).unwrap();
        assert!((cyan_from_blue - cyan_from_green).abs() < 0.01);
        assert_eq!(
            HueBand::from_pair(Channel::Green, Channel::Blue),
            Some(HueBand::GreenBlue)
        );
    }

    #[test]
    fn identical_pixels_have_zero_gap() {
        let px = Rgb::new(255, 0, 0);
        assert_eq!(pixel_gap(px, px), 0.0);
        assert!(pixel_gap(px, Rgb::BLACK).is_infinite());
    }
}
