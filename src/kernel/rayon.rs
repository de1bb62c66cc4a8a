//! Rayon-parallel dilation backend (feature-gated).
//!
//! Output rows are independent, so rows are distributed across threads and
//! each worker reuses the span kernel with its own scratch buffers.

use crate::image::{Dims, Image, Pixel, PixelData, PixelVisitor};
use crate::kernel::span::{dilate_row, RowScratch};
use crate::kernel::{DilationBackend, Footprint};
use crate::util::{CdMatchError, CdMatchResult};
use rayon::prelude::*;

/// Row-parallel span dilation.
///
/// With `threads == None` the global rayon pool is used. Otherwise a
/// dedicated pool is built for the call and dropped when it returns.
#[derive(Copy, Clone, Debug, Default)]
pub struct ParallelDilation {
    pub threads: Option<usize>,
}

impl ParallelDilation {
    pub fn with_threads(threads: usize) -> Self {
        Self {
            threads: Some(threads),
        }
    }
}

struct ParallelScan<'a> {
    dims: Dims,
    footprint: &'a Footprint,
}

impl PixelVisitor for ParallelScan<'_> {
    type Output = PixelData;

    fn visit<P: Pixel>(self, src: &[P]) -> PixelData {
        let dims = self.dims;
        let footprint = self.footprint;
        let mut out = vec![P::default(); src.len()];
        out.par_chunks_mut(dims.width).enumerate().for_each_init(
            || RowScratch::new(dims.width),
            |scratch, (row_idx, out_row)| {
                let y = row_idx % dims.height;
                let z = row_idx / dims.height;
                dilate_row(src, dims, footprint, y, z, out_row, scratch);
            },
        );
        P::wrap(out)
    }
}

impl DilationBackend for ParallelDilation {
    fn name(&self) -> &'static str {
        "rayon"
    }

    fn dilate(&self, image: &Image, footprint: &Footprint) -> CdMatchResult<Image> {
        let dims = image.dims();
        let run = || image.data().visit(ParallelScan { dims, footprint });
        let data = match self.threads {
            None => run(),
            Some(threads) => {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .build()
                    .map_err(|err| CdMatchError::Backend {
                        reason: err.to_string(),
                    })?;
                pool.install(run)
            }
        };
        Image::new(dims.width, dims.height, dims.depth, data)
    }
}
