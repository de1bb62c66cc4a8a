//! Scalar reference dilation: direct scan of every footprint offset.

use crate::image::{Dims, Image, Pixel, PixelData, PixelVisitor};
use crate::kernel::{DilationBackend, Footprint};
use crate::util::CdMatchResult;

/// Visits every neighbor of every pixel. Slow but obviously correct.
#[derive(Copy, Clone, Debug, Default)]
pub struct ScalarDilation;

struct DirectScan<'a> {
    dims: Dims,
    footprint: &'a Footprint,
}

impl PixelVisitor for DirectScan<'_> {
    type Output = PixelData;

    fn visit<P: Pixel>(self, src: &[P]) -> PixelData {
        let Dims {
            width,
            height,
            depth,
        } = self.dims;
        let mut out = Vec::with_capacity(src.len());
        for z in 0..depth {
            for y in 0..height {
                for x in 0..width {
                    let mut acc = src[self.dims.index(x, y, z)];
                    for row in self.footprint.rows() {
                        let zz = z as isize + row.dz;
                        let yy = y as isize + row.dy;
                        if zz < 0 || zz >= depth as isize || yy < 0 || yy >= height as isize {
                            continue;
                        }
                        let hw = row.half_width as isize;
                        let base = self.dims.index(0, yy as usize, zz as usize);
                        for dx in -hw..=hw {
                            let xx = x as isize + dx;
                            if xx < 0 || xx >= width as isize {
                                continue;
                            }
                            acc = acc.max_px(src[base + xx as usize]);
                        }
                    }
                    out.push(acc);
                }
            }
        }
        P::wrap(out)
    }
}

impl DilationBackend for ScalarDilation {
    fn name(&self) -> &'static str {
        "scalar"
    }

    fn dilate(&self, image: &Image, footprint: &Footprint) -> CdMatchResult<Image> {
        let dims = image.dims();
        let data = image.data().visit(DirectScan { dims, footprint });
        Image::new(dims.width, dims.height, dims.depth, data)
    }
}
