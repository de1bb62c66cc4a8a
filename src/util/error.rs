//! Error types for cdmatch.

use crate::image::PixelType;
use thiserror::Error;

/// Result alias for cdmatch operations.
pub type CdMatchResult<T> = std::result::Result<T, CdMatchError>;

/// Errors that can occur when building or running color depth search algorithms.
///
/// Only configuration and shape problems are reported as errors. Missing
/// variant images and numeric degeneracies resolve to sentinel scores instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CdMatchError {
    /// Image dimensions are zero or overflow the addressable range.
    #[error("invalid dimensions {width}x{height}x{depth}")]
    InvalidDimensions {
        width: usize,
        height: usize,
        depth: usize,
    },
    /// The pixel buffer length does not match the declared dimensions.
    #[error("buffer length mismatch: needed {needed}, got {got}")]
    BufferLength { needed: usize, got: usize },
    /// Two images that must be aligned have different shapes.
    #[error("image size mismatch: expected {expected:?}, got {got:?}")]
    DimensionMismatch {
        expected: (usize, usize, usize),
        got: (usize, usize, usize),
    },
    /// The XY shift must be a non-negative even number.
    #[error("xy shift must be even, got {shift}")]
    OddShift { shift: usize },
    /// The alignment space key is not registered.
    #[error("unknown alignment space: {0}")]
    UnknownAlignmentSpace(String),
    /// The operation does not support the given pixel encoding.
    #[error("{op} does not support {pixel_type:?} pixels")]
    UnsupportedPixelType {
        op: &'static str,
        pixel_type: PixelType,
    },
    /// The input data or parameters are invalid.
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),
    /// A compute backend could not be set up.
    #[error("backend: {reason}")]
    Backend { reason: String },
    /// Reading or decoding an image failed.
    #[error("image io: {reason}")]
    ImageIo { reason: String },
}
