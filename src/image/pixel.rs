//! Pixel encodings and the uniform per-pixel accessor trait.

use crate::image::{PixelData, PixelType};

/// Packed 24-bit RGB value laid out as `0x00RRGGBB`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct Rgb(pub u32);

impl Rgb {
    /// All channels zero.
    pub const BLACK: Rgb = Rgb(0);

    /// Packs three channel values.
    #[inline]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Rgb(((r as u32) << 16) | ((g as u32) << 8) | b as u32)
    }

    #[inline]
    pub const fn r(self) -> u8 {
        ((self.0 >> 16) & 0xff) as u8
    }

    #[inline]
    pub const fn g(self) -> u8 {
        ((self.0 >> 8) & 0xff) as u8
    }

    #[inline]
    pub const fn b(self) -> u8 {
        (self.0 & 0xff) as u8
    }

    /// Returns `[r, g, b]`.
    #[inline]
    pub const fn channels(self) -> [u8; 3] {
        [self.r(), self.g(), self.b()]
    }

    /// Returns `true` when at least one channel is strictly above `threshold`.
    #[inline]
    pub fn any_above(self, threshold: i32) -> bool {
        i32::from(self.r()) > threshold
            || i32::from(self.g()) > threshold
            || i32::from(self.b()) > threshold
    }
}

impl From<[u8; 3]> for Rgb {
    fn from([r, g, b]: [u8; 3]) -> Self {
        Rgb::new(r, g, b)
    }
}

/// Uniform accessor over the supported pixel encodings.
///
/// Transform kernels are written once against this trait and dispatched
/// through [`PixelData::visit`].
pub trait Pixel: Copy + Default + PartialEq + Send + Sync + 'static {
    /// Encoding tag of this pixel type.
    const TYPE: PixelType;

    /// Pointwise maximum. RGB pixels take the maximum per channel.
    fn max_px(self, other: Self) -> Self;

    /// Returns `true` for the background value.
    fn is_zero(self) -> bool;

    /// Returns a single channel value. Gray pixels expose channel 0 only.
    fn channel_value(self, channel: usize) -> i32;

    /// Integer representation (packed value for RGB, truncation for floats).
    fn to_integer(self) -> i32;

    /// Builds a pixel from its integer representation, saturating gray values.
    fn from_integer(value: i32) -> Self;

    /// Returns `true` when any channel is strictly above `threshold`.
    fn above(self, threshold: i32) -> bool;

    /// Wraps an owned buffer into the tagged container.
    fn wrap(data: Vec<Self>) -> PixelData;

    /// Borrows the typed buffer if the tag matches.
    fn slice(data: &PixelData) -> Option<&[Self]>;
}

impl Pixel for Rgb {
    const TYPE: PixelType = PixelType::Rgb24;

    #[inline]
    fn max_px(self, other: Self) -> Self {
        Rgb::new(
            self.r().max(other.r()),
            self.g().max(other.g()),
            self.b().max(other.b()),
        )
    }

    #[inline]
    fn is_zero(self) -> bool {
        self.0 & 0x00ff_ffff == 0
    }

    #[inline]
    fn channel_value(self, channel: usize) -> i32 {
        match channel {
            0 => i32::from(self.r()),
            1 => i32::from(self.g()),
            2 => i32::from(self.b()),
            _ => 0,
        }
    }

    #[inline]
    fn to_integer(self) -> i32 {
        (self.0 & 0x00ff_ffff) as i32
    }

    #[inline]
    fn from_integer(value: i32) -> Self {
        Rgb(value as u32 & 0x00ff_ffff)
    }

    #[inline]
    fn above(self, threshold: i32) -> bool {
        self.any_above(threshold)
    }

    fn wrap(data: Vec<Self>) -> PixelData {
        PixelData::Rgb24(data)
    }

    fn slice(data: &PixelData) -> Option<&[Self]> {
        match data {
            PixelData::Rgb24(values) => Some(values),
            _ => None,
        }
    }
}

macro_rules! gray_pixel {
    ($ty:ty, $tag:ident, $max:expr) => {
        impl Pixel for $ty {
            const TYPE: PixelType = PixelType::$tag;

            #[inline]
            fn max_px(self, other: Self) -> Self {
                self.max(other)
            }

            #[inline]
            fn is_zero(self) -> bool {
                self == 0
            }

            #[inline]
            fn channel_value(self, channel: usize) -> i32 {
                if channel == 0 {
                    i32::from(self)
                } else {
                    0
                }
            }

            #[inline]
            fn to_integer(self) -> i32 {
                i32::from(self)
            }

            #[inline]
            fn from_integer(value: i32) -> Self {
                value.clamp(0, $max) as $ty
            }

            #[inline]
            fn above(self, threshold: i32) -> bool {
                i32::from(self) > threshold
            }

            fn wrap(data: Vec<Self>) -> PixelData {
                PixelData::$tag(data)
            }

            fn slice(data: &PixelData) -> Option<&[Self]> {
                match data {
                    PixelData::$tag(values) => Some(values),
                    _ => None,
                }
            }
        }
    };
}

gray_pixel!(u8, Gray8, 255);
gray_pixel!(u16, Gray16, 65535);

impl Pixel for f32 {
    const TYPE: PixelType = PixelType::Float32;

    #[inline]
    fn max_px(self, other: Self) -> Self {
        self.max(other)
    }

    #[inline]
    fn is_zero(self) -> bool {
        self == 0.0
    }

    #[inline]
    fn channel_value(self, channel: usize) -> i32 {
        if channel == 0 {
            self as i32
        } else {
            0
        }
    }

    #[inline]
    fn to_integer(self) -> i32 {
        self as i32
    }

    #[inline]
    fn from_integer(value: i32) -> Self {
        value as f32
    }

    #[inline]
    fn above(self, threshold: i32) -> bool {
        self > threshold as f32
    }

    fn wrap(data: Vec<Self>) -> PixelData {
        PixelData::Float32(data)
    }

    fn slice(data: &PixelData) -> Option<&[Self]> {
        match data {
            PixelData::Float32(values) => Some(values),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Pixel, Rgb};

    #[test]
    fn rgb_packs_and_unpacks() {
        let px = Rgb::new(0x12, 0x34, 0x56);
        assert_eq!(px.0, 0x0012_3456);
        assert_eq!(px.channels(), [0x12, 0x34, 0x56]);
        assert_eq!(px.channel_value(1), 0x34);
    }

    #[test]
    fn rgb_max_is_per_channel() {
        let a = Rgb::new(10, 200, 0);
        let b = Rgb::new(20, 100, 5);
        assert_eq!(a.max_px(b), Rgb::new(20, 200, 5));
    }

    #[test]
    fn gray_from_integer_saturates() {
        assert_eq!(<u8 as Pixel>::from_integer(300), 255);
        assert_eq!(<u16 as Pixel>::from_integer(-4), 0);
    }
}
