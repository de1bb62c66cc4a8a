//! cdmatch scores color depth MIPs of neurons against each other.
//!
//! A color depth MIP is a 2D maximum intensity projection in which hue
//! encodes the depth of the brightest voxel. This crate provides the pixel
//! overlap match with shift/mirror search, the gradient area gap shape
//! match, the color depth lookup table, and the image transforms used to
//! prepare inputs (dilation, connected components, contrast stretching,
//! distance transform, color depth coding). Parallel variants are available
//! via the `rayon` feature; `image-io` adds file loading through `image`.

mod trace;

pub mod alignment;
mod candidate;
pub mod color;
pub mod image;
pub mod kernel;
pub mod lowlevel;
pub mod search;
pub mod transform;
pub mod util;

pub use alignment::AlignmentSpace;
pub use candidate::topk::TopK;
pub use color::{color_slice_gap, find_slice, COLOR_DEPTH_LUT};
pub use image::{Dims, Image, PixelData, PixelType, Rgb};
pub use kernel::{dilate, dilate_with, DilationBackend, KernelShape, Radii};
pub use search::{
    normalize_scores, search_targets, ColorDepthSearchAlgorithm, MatchRecord, NegativeQuery,
    PixelMatchAlgorithm, PixelMatchConfig, PixelMatchProvider, PixelMatchScore, SearchOutcome,
    SearchTarget, ShapeMatchAlgorithm, ShapeMatchConfig, ShapeMatchProvider, ShapeMatchScore,
    VariantKind, Variants,
};
#[cfg(feature = "rayon")]
pub use search::search_targets_par;
pub use util::{CdMatchError, CdMatchResult};
