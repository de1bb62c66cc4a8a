//! Elementwise and geometric image operations.

use crate::image::{Dims, Image, Pixel, PixelData, PixelVisitor};
use crate::util::{CdMatchError, CdMatchResult};

struct Threshold {
    threshold: i32,
}

impl PixelVisitor for Threshold {
    type Output = PixelData;

    fn visit<P: Pixel>(self, data: &[P]) -> PixelData {
        P::wrap(
            data.iter()
                .map(|&px| if px.above(self.threshold) { px } else { P::default() })
                .collect(),
        )
    }
}

struct MirrorX {
    dims: Dims,
}

impl PixelVisitor for MirrorX {
    type Output = PixelData;

    fn visit<P: Pixel>(self, data: &[P]) -> PixelData {
        let width = self.dims.width;
        let mut out = Vec::with_capacity(data.len());
        for row in data.chunks_exact(width) {
            out.extend(row.iter().rev().copied());
        }
        P::wrap(out)
    }
}

struct Masked<'a> {
    mask: &'a Image,
}

impl PixelVisitor for Masked<'_> {
    type Output = PixelData;

    fn visit<P: Pixel>(self, data: &[P]) -> PixelData {
        P::wrap(
            data.iter()
                .enumerate()
                .map(|(idx, &px)| if self.mask.is_set(idx) { px } else { P::default() })
                .collect(),
        )
    }
}

struct Binarize {
    threshold: i32,
}

impl PixelVisitor for Binarize {
    type Output = Vec<u8>;

    fn visit<P: Pixel>(self, data: &[P]) -> Vec<u8> {
        data.iter()
            .map(|&px| u8::from(px.above(self.threshold)))
            .collect()
    }
}

struct Plane {
    start: usize,
    len: usize,
}

impl PixelVisitor for Plane {
    type Output = PixelData;

    fn visit<P: Pixel>(self, data: &[P]) -> PixelData {
        P::wrap(data[self.start..self.start + self.len].to_vec())
    }
}

impl Image {
    /// Zeroes every pixel whose channels are all at or below `threshold`.
    pub fn threshold(&self, threshold: i32) -> Image {
        let data = self.data().visit(Threshold { threshold });
        Image::from_parts(self.dims(), data)
    }

    /// Reflects every row around the vertical center line.
    pub fn mirror_x(&self) -> Image {
        let data = self.data().visit(MirrorX { dims: self.dims() });
        Image::from_parts(self.dims(), data)
    }

    /// Zeroes every pixel where `mask` is background.
    pub fn apply_mask(&self, mask: &Image) -> CdMatchResult<Image> {
        self.ensure_same_shape(mask)?;
        let data = self.data().visit(Masked { mask });
        Ok(Image::from_parts(self.dims(), data))
    }

    /// 0/1 flags of pixels with any channel above `threshold`.
    pub(crate) fn foreground(&self, threshold: i32) -> Vec<u8> {
        self.data().visit(Binarize { threshold })
    }

    /// Gray8 0/1 map of pixels whose `channel` value is non-zero.
    pub fn channel_signal(&self, channel: usize) -> CdMatchResult<Image> {
        if channel >= self.pixel_type().channels() {
            return Err(CdMatchError::InvalidInput("channel index out of range"));
        }
        let data = (0..self.len())
            .map(|idx| u8::from(self.channel_value(idx, channel) > 0))
            .collect();
        Ok(Image::from_parts(self.dims(), PixelData::Gray8(data)))
    }

    /// Extracts z-plane `z` as a 2D image.
    pub fn slice_z(&self, z: usize) -> CdMatchResult<Image> {
        let dims = self.dims();
        if z >= dims.depth {
            return Err(CdMatchError::InvalidInput("z plane out of range"));
        }
        let len = dims.plane_len();
        let data = self.data().visit(Plane {
            start: z * len,
            len,
        });
        Ok(Image::from_parts(
            Dims {
                depth: 1,
                ..dims
            },
            data,
        ))
    }

    /// Number of non-background pixels.
    pub fn count_set(&self) -> usize {
        (0..self.len()).filter(|&idx| self.is_set(idx)).count()
    }
}
