//! Separable row-span dilation.
//!
//! Each footprint row is a contiguous x-run, so the dilation of an output row
//! is the pointwise maximum of horizontally max-filtered source rows. The
//! horizontal filter uses the van Herk/Gil-Werman block decomposition, which
//! only needs an associative, idempotent maximum and therefore also works for
//! per-channel RGB maxima.

use crate::image::{Dims, Image, Pixel, PixelData, PixelVisitor};
use crate::kernel::{DilationBackend, Footprint};
use crate::util::CdMatchResult;

/// Row-span backend; cost grows with the footprint height, not its area.
#[derive(Copy, Clone, Debug, Default)]
pub struct SpanDilation;

/// Reusable buffers for one worker.
pub(crate) struct RowScratch<P> {
    prefix: Vec<P>,
    suffix: Vec<P>,
    filtered: Vec<P>,
}

impl<P: Pixel> RowScratch<P> {
    pub(crate) fn new(width: usize) -> Self {
        Self {
            prefix: vec![P::default(); width],
            suffix: vec![P::default(); width],
            filtered: vec![P::default(); width],
        }
    }
}

/// Max over `[x - hw, x + hw]` clamped to the row, written into `scratch.filtered`.
fn sliding_max<P: Pixel>(row: &[P], hw: usize, scratch: &mut RowScratch<P>) {
    let width = row.len();
    let k = 2 * hw + 1;
    let RowScratch {
        prefix,
        suffix,
        filtered,
    } = scratch;

    for i in 0..width {
        prefix[i] = if i % k == 0 {
            row[i]
        } else {
            prefix[i - 1].max_px(row[i])
        };
    }
    for i in (0..width).rev() {
        suffix[i] = if i == width - 1 || (i + 1) % k == 0 {
            row[i]
        } else {
            suffix[i + 1].max_px(row[i])
        };
    }
    for (x, out) in filtered.iter_mut().enumerate().take(width) {
        let a = x.saturating_sub(hw);
        let b = (x + hw).min(width - 1);
        *out = if a / k == b / k {
            if a % k == 0 {
                prefix[b]
            } else {
                suffix[a]
            }
        } else {
            suffix[a].max_px(prefix[b])
        };
    }
}

/// Dilates output row `(y, z)` of `src` into `out`.
pub(crate) fn dilate_row<P: Pixel>(
    src: &[P],
    dims: Dims,
    footprint: &Footprint,
    y: usize,
    z: usize,
    out: &mut [P],
    scratch: &mut RowScratch<P>,
) {
    let width = dims.width;
    let start = dims.index(0, y, z);
    out.copy_from_slice(&src[start..start + width]);
    for fp_row in footprint.rows() {
        let zz = z as isize + fp_row.dz;
        let yy = y as isize + fp_row.dy;
        if zz < 0 || zz >= dims.depth as isize || yy < 0 || yy >= dims.height as isize {
            continue;
        }
        let base = dims.index(0, yy as usize, zz as usize);
        let row = &src[base..base + width];
        if fp_row.half_width == 0 {
            for (acc, &px) in out.iter_mut().zip(row) {
                *acc = acc.max_px(px);
            }
            continue;
        }
        sliding_max(row, fp_row.half_width, scratch);
        for (acc, &px) in out.iter_mut().zip(&scratch.filtered) {
            *acc = acc.max_px(px);
        }
    }
}

struct SpanScan<'a> {
    dims: Dims,
    footprint: &'a Footprint,
}

impl PixelVisitor for SpanScan<'_> {
    type Output = PixelData;

    fn visit<P: Pixel>(self, src: &[P]) -> PixelData {
        let dims = self.dims;
        let mut out = vec![P::default(); src.len()];
        let mut scratch = RowScratch::new(dims.width);
        for (row_idx, out_row) in out.chunks_exact_mut(dims.width).enumerate() {
            let y = row_idx % dims.height;
            let z = row_idx / dims.height;
            dilate_row(src, dims, self.footprint, y, z, out_row, &mut scratch);
        }
        P::wrap(out)
    }
}

impl DilationBackend for SpanDilation {
    fn name(&self) -> &'static str {
        "span"
    }

    fn dilate(&self, image: &Image, footprint: &Footprint) -> CdMatchResult<Image> {
        let dims = image.dims();
        let data = image.data().visit(SpanScan { dims, footprint });
        Image::new(dims.width, dims.height, dims.depth, data)
    }
}
