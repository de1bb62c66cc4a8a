//! Owned 2D/3D images over a closed set of pixel encodings.
//!
//! An [`Image`] is a contiguous row-major buffer of `width * height * depth`
//! pixels; a 2D image has `depth == 1`. The linear index of `(x, y, z)` is
//! `(z * height + y) * width + x`. Images are treated as values: every
//! transform returns a new image.

use crate::util::{CdMatchError, CdMatchResult};

mod ops;
pub mod pixel;

#[cfg(feature = "image-io")]
pub mod io;

pub use pixel::{Pixel, Rgb};

/// Pixel encoding tag.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum PixelType {
    /// Packed 24-bit RGB.
    Rgb24,
    /// Unsigned 8-bit gray.
    Gray8,
    /// Unsigned 16-bit gray.
    Gray16,
    /// 32-bit float, used for intermediate results.
    Float32,
}

impl PixelType {
    /// Number of color channels.
    pub fn channels(self) -> usize {
        match self {
            PixelType::Rgb24 => 3,
            _ => 1,
        }
    }
}

/// Tagged pixel buffer.
#[derive(Clone, Debug, PartialEq)]
pub enum PixelData {
    Rgb24(Vec<Rgb>),
    Gray8(Vec<u8>),
    Gray16(Vec<u16>),
    Float32(Vec<f32>),
}

/// Callback that receives the typed buffer behind a [`PixelData`].
pub trait PixelVisitor {
    type Output;

    fn visit<P: Pixel>(self, data: &[P]) -> Self::Output;
}

impl PixelData {
    /// Returns the encoding tag.
    pub fn pixel_type(&self) -> PixelType {
        match self {
            PixelData::Rgb24(_) => PixelType::Rgb24,
            PixelData::Gray8(_) => PixelType::Gray8,
            PixelData::Gray16(_) => PixelType::Gray16,
            PixelData::Float32(_) => PixelType::Float32,
        }
    }

    /// Number of pixels in the buffer.
    pub fn len(&self) -> usize {
        match self {
            PixelData::Rgb24(v) => v.len(),
            PixelData::Gray8(v) => v.len(),
            PixelData::Gray16(v) => v.len(),
            PixelData::Float32(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Allocates a zero-filled buffer of the given encoding.
    pub fn zeros(pixel_type: PixelType, len: usize) -> Self {
        match pixel_type {
            PixelType::Rgb24 => PixelData::Rgb24(vec![Rgb::BLACK; len]),
            PixelType::Gray8 => PixelData::Gray8(vec![0; len]),
            PixelType::Gray16 => PixelData::Gray16(vec![0; len]),
            PixelType::Float32 => PixelData::Float32(vec![0.0; len]),
        }
    }

    /// Dispatches `visitor` on the typed buffer.
    pub fn visit<V: PixelVisitor>(&self, visitor: V) -> V::Output {
        match self {
            PixelData::Rgb24(v) => visitor.visit(v.as_slice()),
            PixelData::Gray8(v) => visitor.visit(v.as_slice()),
            PixelData::Gray16(v) => visitor.visit(v.as_slice()),
            PixelData::Float32(v) => visitor.visit(v.as_slice()),
        }
    }
}

/// Grid dimensions shared by images and kernels.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Dims {
    pub width: usize,
    pub height: usize,
    pub depth: usize,
}

impl Dims {
    /// Validates that no axis is zero and the pixel count fits in memory.
    pub fn new(width: usize, height: usize, depth: usize) -> CdMatchResult<Self> {
        let invalid = CdMatchError::InvalidDimensions {
            width,
            height,
            depth,
        };
        if width == 0 || height == 0 || depth == 0 {
            return Err(invalid);
        }
        width
            .checked_mul(height)
            .and_then(|v| v.checked_mul(depth))
            .ok_or(invalid)?;
        Ok(Self {
            width,
            height,
            depth,
        })
    }

    /// Total number of pixels.
    #[inline]
    pub fn len(&self) -> usize {
        self.width * self.height * self.depth
    }

    /// Always `false` for validated dimensions.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Pixels per z-plane.
    #[inline]
    pub fn plane_len(&self) -> usize {
        self.width * self.height
    }

    /// Linear index of `(x, y, z)`.
    #[inline]
    pub fn index(&self, x: usize, y: usize, z: usize) -> usize {
        (z * self.height + y) * self.width + x
    }

    /// Inverse of [`Dims::index`].
    #[inline]
    pub fn coords(&self, idx: usize) -> (usize, usize, usize) {
        let plane = self.plane_len();
        let z = idx / plane;
        let rem = idx % plane;
        (rem % self.width, rem / self.width, z)
    }

    /// Returns `(width, height, depth)`.
    #[inline]
    pub fn as_tuple(&self) -> (usize, usize, usize) {
        (self.width, self.height, self.depth)
    }
}

/// Owned image or volume buffer.
#[derive(Clone, Debug, PartialEq)]
pub struct Image {
    dims: Dims,
    data: PixelData,
}

impl Image {
    /// Creates an image from a tagged buffer, validating its length.
    pub fn new(width: usize, height: usize, depth: usize, data: PixelData) -> CdMatchResult<Self> {
        let dims = Dims::new(width, height, depth)?;
        if data.len() != dims.len() {
            return Err(CdMatchError::BufferLength {
                needed: dims.len(),
                got: data.len(),
            });
        }
        Ok(Self { dims, data })
    }

    /// Creates an image from a typed buffer.
    pub fn from_pixels<P: Pixel>(
        data: Vec<P>,
        width: usize,
        height: usize,
        depth: usize,
    ) -> CdMatchResult<Self> {
        Self::new(width, height, depth, P::wrap(data))
    }

    /// Creates a 2D RGB image.
    pub fn from_rgb(data: Vec<Rgb>, width: usize, height: usize) -> CdMatchResult<Self> {
        Self::from_pixels(data, width, height, 1)
    }

    /// Creates a 2D 8-bit gray image.
    pub fn from_gray8(data: Vec<u8>, width: usize, height: usize) -> CdMatchResult<Self> {
        Self::from_pixels(data, width, height, 1)
    }

    /// Creates a zero-filled image.
    pub fn zeros(
        pixel_type: PixelType,
        width: usize,
        height: usize,
        depth: usize,
    ) -> CdMatchResult<Self> {
        let dims = Dims::new(width, height, depth)?;
        Ok(Self {
            dims,
            data: PixelData::zeros(pixel_type, dims.len()),
        })
    }

    pub(crate) fn from_parts(dims: Dims, data: PixelData) -> Self {
        debug_assert_eq!(dims.len(), data.len());
        Self { dims, data }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.dims.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.dims.height
    }

    #[inline]
    pub fn depth(&self) -> usize {
        self.dims.depth
    }

    #[inline]
    pub fn dims(&self) -> Dims {
        self.dims
    }

    /// Total number of pixels.
    #[inline]
    pub fn len(&self) -> usize {
        self.dims.len()
    }

    /// Always `false` for a constructed image.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn pixel_type(&self) -> PixelType {
        self.data.pixel_type()
    }

    /// Returns the tagged buffer.
    pub fn data(&self) -> &PixelData {
        &self.data
    }

    /// Consumes the image and returns its buffer.
    pub fn into_data(self) -> PixelData {
        self.data
    }

    /// Borrows the typed buffer if the encoding matches `P`.
    pub fn pixels<P: Pixel>(&self) -> Option<&[P]> {
        P::slice(&self.data)
    }

    /// Borrows the RGB buffer, failing for other encodings.
    pub fn rgb(&self, op: &'static str) -> CdMatchResult<&[Rgb]> {
        self.pixels::<Rgb>()
            .ok_or(CdMatchError::UnsupportedPixelType {
                op,
                pixel_type: self.pixel_type(),
            })
    }

    /// Returns one channel of the pixel at linear index `idx`.
    pub fn channel_value(&self, idx: usize, channel: usize) -> i32 {
        match &self.data {
            PixelData::Rgb24(v) => v[idx].channel_value(channel),
            PixelData::Gray8(v) => v[idx].channel_value(channel),
            PixelData::Gray16(v) => v[idx].channel_value(channel),
            PixelData::Float32(v) => v[idx].channel_value(channel),
        }
    }

    /// Returns the integer representation of the pixel at `idx`.
    pub fn integer(&self, idx: usize) -> i32 {
        match &self.data {
            PixelData::Rgb24(v) => v[idx].to_integer(),
            PixelData::Gray8(v) => v[idx].to_integer(),
            PixelData::Gray16(v) => v[idx].to_integer(),
            PixelData::Float32(v) => v[idx].to_integer(),
        }
    }

    /// Overwrites the pixel at `idx` from its integer representation.
    pub fn set_integer(&mut self, idx: usize, value: i32) {
        match &mut self.data {
            PixelData::Rgb24(v) => v[idx] = Rgb::from_integer(value),
            PixelData::Gray8(v) => v[idx] = u8::from_integer(value),
            PixelData::Gray16(v) => v[idx] = u16::from_integer(value),
            PixelData::Float32(v) => v[idx] = f32::from_integer(value),
        }
    }

    /// Returns `true` when the pixel at `idx` differs from background.
    pub fn is_set(&self, idx: usize) -> bool {
        match &self.data {
            PixelData::Rgb24(v) => !v[idx].is_zero(),
            PixelData::Gray8(v) => v[idx] != 0,
            PixelData::Gray16(v) => v[idx] != 0,
            PixelData::Float32(v) => v[idx] != 0.0,
        }
    }

    /// Fails unless `other` has exactly the same width, height and depth.
    pub fn ensure_same_shape(&self, other: &Image) -> CdMatchResult<()> {
        if self.dims != other.dims {
            return Err(CdMatchError::DimensionMismatch {
                expected: self.dims.as_tuple(),
                got: other.dims.as_tuple(),
            });
        }
        Ok(())
    }
}
