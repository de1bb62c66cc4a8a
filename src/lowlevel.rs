//! Low-level building blocks for custom search pipelines.
//!
//! These expose the dilation backends, query mask tables and per-pixel color
//! metrics behind the high-level providers. Most users should prefer
//! [`PixelMatchProvider`](crate::PixelMatchProvider) and
//! [`ShapeMatchProvider`](crate::ShapeMatchProvider).

pub use crate::candidate::topk::{sort_records_desc, TopK};
pub use crate::color::lut::band_range;
pub use crate::color::{channel_order, pixel_gap, ramp_position, Channel, ChannelOrder, HueBand};
#[cfg(feature = "rayon")]
pub use crate::kernel::rayon::ParallelDilation;
pub use crate::kernel::scalar::ScalarDilation;
pub use crate::kernel::span::SpanDilation;
pub use crate::kernel::{Footprint, FootprintRow, MAX_RADIUS};
pub use crate::search::mask::{mirror_position, shift_offsets, SENTINEL};
pub use crate::search::pixel_match::count_matches;
pub use crate::search::{score_targets, QueryMask, ShiftTable, ShiftVariant};
#[cfg(feature = "rayon")]
pub use crate::search::score_targets_par;
pub use crate::transform::contrast::saturation_threshold;
pub use crate::transform::color_code::{composite, lut_index, tie_rule, TieRule};
