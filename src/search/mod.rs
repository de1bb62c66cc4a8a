//! Color depth search algorithms.
//!
//! A provider validates search parameters once and builds an algorithm per
//! query. The algorithm precomputes everything derived from the query and is
//! then evaluated against many targets, possibly in parallel.

use crate::image::Image;
use crate::util::CdMatchResult;
use std::collections::HashMap;
use std::fmt;

pub mod batch;
pub mod mask;
pub mod pixel_match;
pub mod score;
pub mod shape_match;

pub use batch::{score_targets, search_targets, SearchOutcome, SearchTarget};
#[cfg(feature = "rayon")]
pub use batch::{score_targets_par, search_targets_par};
pub use mask::{QueryMask, ShiftTable, ShiftVariant};
pub use pixel_match::{
    NegativeQuery, PixelMatchAlgorithm, PixelMatchConfig, PixelMatchProvider, PixelMatchScore,
};
pub use score::{negative_score, normalize_scores, normalized_score, MatchRecord};
pub use shape_match::{ShapeMatchAlgorithm, ShapeMatchConfig, ShapeMatchProvider, ShapeMatchScore};

/// Auxiliary images derived from a target.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum VariantKind {
    /// Distance-to-signal gradient image.
    Gradient,
    /// Dilated, thresholded target.
    ZGap,
    /// 3D segmentation of the target.
    Segmentation3d,
    /// Skeletonized target.
    Skeleton,
}

/// Deferred loader of a variant image; `None` when the variant does not exist.
pub type VariantSupplier<'a> = Box<dyn Fn() -> Option<Image> + Send + Sync + 'a>;

/// Set of on-demand variant suppliers for one target.
#[derive(Default)]
pub struct Variants<'a> {
    suppliers: HashMap<VariantKind, VariantSupplier<'a>>,
}

impl<'a> Variants<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a supplier for `kind`, replacing any previous one.
    pub fn with_supplier<F>(mut self, kind: VariantKind, supplier: F) -> Self
    where
        F: Fn() -> Option<Image> + Send + Sync + 'a,
    {
        self.suppliers.insert(kind, Box::new(supplier));
        self
    }

    /// Registers an already loaded image for `kind`.
    pub fn with_image(self, kind: VariantKind, image: Image) -> Self {
        self.with_supplier(kind, move || Some(image.clone()))
    }

    /// Evaluates the supplier for `kind`.
    pub fn get(&self, kind: VariantKind) -> Option<Image> {
        self.suppliers.get(&kind).and_then(|supplier| supplier())
    }

    /// Returns `true` if a supplier is registered for `kind`.
    pub fn contains(&self, kind: VariantKind) -> bool {
        self.suppliers.contains_key(&kind)
    }
}

impl fmt::Debug for Variants<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.suppliers.keys()).finish()
    }
}

/// A query-specific scorer evaluated against many targets.
pub trait ColorDepthSearchAlgorithm: Send + Sync {
    /// Score record produced per target.
    type Score: Send;

    /// Query image the algorithm was built from.
    fn query_image(&self) -> &Image;

    /// Number of query foreground pixels.
    fn query_size(&self) -> usize;

    /// Variants this algorithm reads from the supplier map.
    fn required_variants(&self) -> &'static [VariantKind];

    /// Scores one target.
    ///
    /// Fails only on shape mismatches between query and target; missing
    /// variants resolve to sentinel scores.
    fn calculate_matching_score(
        &self,
        target: &Image,
        variants: &Variants<'_>,
    ) -> CdMatchResult<Self::Score>;
}
