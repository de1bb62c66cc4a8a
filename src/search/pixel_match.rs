//! Pixel-overlap color depth match with shift and mirror search.

use crate::color::pixel_gap;
use crate::image::{Image, Rgb};
use crate::search::mask::{QueryMask, ShiftTable};
use crate::search::{ColorDepthSearchAlgorithm, VariantKind, Variants};
use crate::trace::{trace_event, trace_span};
use crate::util::math::round_half_up;
use crate::util::{CdMatchError, CdMatchResult};

/// Parameters shared by every query of a pixel match search.
#[derive(Clone, Debug)]
pub struct PixelMatchConfig {
    /// Query pixels with any channel above this value form the mask.
    pub query_threshold: i32,
    /// Target pixels need a channel above this value to match.
    pub target_threshold: i32,
    /// Maximum hue distance, in ramp bands, for a pixel pair to match.
    pub z_tolerance: f64,
    /// Largest xy translation tried; must be even.
    pub xy_shift: usize,
    /// Also try the horizontally mirrored query.
    pub mirror: bool,
}

impl Default for PixelMatchConfig {
    fn default() -> Self {
        Self {
            query_threshold: 100,
            target_threshold: 100,
            z_tolerance: 0.02,
            xy_shift: 2,
            mirror: true,
        }
    }
}

/// Result of one pixel match comparison.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PixelMatchScore {
    /// Matching pixel count, reduced by the negative mask when present.
    pub match_count: i64,
    /// Matching fraction of the query mask.
    pub ratio: f64,
    /// Best count came from a mirrored variant.
    pub mirrored: bool,
}

impl PixelMatchScore {
    /// Score of an empty query.
    pub const NONE: PixelMatchScore = PixelMatchScore {
        match_count: 0,
        ratio: 0.0,
        mirrored: false,
    };
}

/// Background pattern whose matches are subtracted from the score.
#[derive(Copy, Clone, Debug)]
pub struct NegativeQuery<'a> {
    pub image: &'a Image,
    pub threshold: i32,
    pub mirror: bool,
}

/// Validated pixel match parameters.
#[derive(Clone, Debug)]
pub struct PixelMatchProvider {
    cfg: PixelMatchConfig,
}

impl PixelMatchProvider {
    /// Validates the configuration.
    pub fn new(cfg: PixelMatchConfig) -> CdMatchResult<Self> {
        if cfg.xy_shift % 2 != 0 {
            return Err(CdMatchError::OddShift {
                shift: cfg.xy_shift,
            });
        }
        if !cfg.z_tolerance.is_finite() || cfg.z_tolerance < 0.0 {
            return Err(CdMatchError::InvalidInput(
                "z tolerance must be finite and non-negative",
            ));
        }
        Ok(Self { cfg })
    }

    pub fn config(&self) -> &PixelMatchConfig {
        &self.cfg
    }

    /// Builds the algorithm for one query.
    pub fn create_algorithm(
        &self,
        query: &Image,
        negative: Option<NegativeQuery<'_>>,
    ) -> CdMatchResult<PixelMatchAlgorithm> {
        query.rgb("pixel match query")?;
        let _span = trace_span!("pixel_match_prepare").entered();

        let positive = MaskPlan::new(
            query.clone(),
            self.cfg.query_threshold,
            self.cfg.xy_shift,
            self.cfg.mirror,
        )?;
        let negative = match negative {
            Some(neg) => {
                neg.image.rgb("pixel match negative query")?;
                query.ensure_same_shape(neg.image)?;
                Some(MaskPlan::new(
                    neg.image.clone(),
                    neg.threshold,
                    self.cfg.xy_shift,
                    neg.mirror,
                )?)
            }
            None => None,
        };

        trace_event!(
            "pixel_match_query",
            size = positive.mask.len(),
            variants = positive.shifts.len()
        );
        Ok(PixelMatchAlgorithm {
            cfg: self.cfg.clone(),
            positive,
            negative,
        })
    }
}

#[derive(Clone, Debug)]
struct MaskPlan {
    image: Image,
    mask: QueryMask,
    shifts: ShiftTable,
}

impl MaskPlan {
    fn new(image: Image, threshold: i32, xy_shift: usize, mirror: bool) -> CdMatchResult<Self> {
        let mask = QueryMask::from_image(&image, threshold);
        let shifts = ShiftTable::new(&mask, xy_shift, mirror)?;
        Ok(Self {
            image,
            mask,
            shifts,
        })
    }

    /// Best count over all variants and whether it came from a mirrored one.
    fn best_count(&self, target: &[Rgb], target_threshold: i32, z_tolerance: f64) -> (usize, bool) {
        let Some(query) = self.image.pixels::<Rgb>() else {
            return (0, false);
        };
        let mut best = (0usize, false);
        for variant in self.shifts.variants() {
            let count = count_matches(
                query,
                self.mask.positions(),
                target,
                &variant.positions,
                target_threshold,
                z_tolerance,
            );
            if count > best.0 {
                best = (count, variant.mirrored);
            }
        }
        best
    }
}

/// Counts aligned query/target pairs whose colors agree within `z_tolerance`.
pub fn count_matches(
    query: &[Rgb],
    query_positions: &[usize],
    target: &[Rgb],
    target_positions: &[isize],
    target_threshold: i32,
    z_tolerance: f64,
) -> usize {
    query_positions
        .iter()
        .zip(target_positions)
        .filter(|&(&qpos, &tpos)| {
            if tpos < 0 {
                return false;
            }
            let target_px = target[tpos as usize];
            target_px.any_above(target_threshold)
                && pixel_gap(query[qpos], target_px) <= z_tolerance
        })
        .count()
}

/// Pixel match for one query, reusable across targets.
#[derive(Clone, Debug)]
pub struct PixelMatchAlgorithm {
    cfg: PixelMatchConfig,
    positive: MaskPlan,
    negative: Option<MaskPlan>,
}

impl PixelMatchAlgorithm {
    /// Shift/mirror variants of the query mask.
    pub fn shift_table(&self) -> &ShiftTable {
        &self.positive.shifts
    }

    /// Foreground positions of the query.
    pub fn query_mask(&self) -> &QueryMask {
        &self.positive.mask
    }

    /// Foreground size of the negative query, if any.
    pub fn negative_size(&self) -> Option<usize> {
        self.negative.as_ref().map(|plan| plan.mask.len())
    }
}

impl ColorDepthSearchAlgorithm for PixelMatchAlgorithm {
    type Score = PixelMatchScore;

    fn query_image(&self) -> &Image {
        &self.positive.image
    }

    fn query_size(&self) -> usize {
        self.positive.mask.len()
    }

    fn required_variants(&self) -> &'static [VariantKind] {
        &[]
    }

    fn calculate_matching_score(
        &self,
        target: &Image,
        _variants: &Variants<'_>,
    ) -> CdMatchResult<PixelMatchScore> {
        let query_size = self.positive.mask.len();
        if query_size == 0 {
            return Ok(PixelMatchScore::NONE);
        }
        self.positive.image.ensure_same_shape(target)?;
        let target_px = target.rgb("pixel match target")?;

        let (max_count, mirrored) = self.positive.best_count(
            target_px,
            self.cfg.target_threshold,
            self.cfg.z_tolerance,
        );
        let ratio = max_count as f64 / query_size as f64;

        let (match_count, ratio) = match &self.negative {
            Some(neg) if !neg.mask.is_empty() => {
                let neg_size = neg.mask.len() as f64;
                let (neg_count, _) =
                    neg.best_count(target_px, self.cfg.target_threshold, self.cfg.z_tolerance);
                let neg_count = neg_count as f64;
                (
                    round_half_up(max_count as f64 - neg_count * query_size as f64 / neg_size),
                    ratio - neg_count / neg_size,
                )
            }
            _ => (max_count as i64, ratio),
        };

        Ok(PixelMatchScore {
            match_count,
            ratio,
            mirrored,
        })
    }
}
