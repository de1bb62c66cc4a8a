//! Gradient area gap shape match.
//!
//! The query is compared against a target's gradient image (distance to the
//! nearest target signal) and its z-gap mask (the dilated target). Query
//! pixels far from any target signal, or whose depth color disagrees with the
//! nearby target color by more than the flux tolerance, accumulate penalty.
//! Query pixels in the bloom halo around bright regions are counted
//! separately as high-expression area.

use crate::color::color_slice_gap;
use crate::image::{Image, Rgb};
use crate::kernel::span::SpanDilation;
use crate::kernel::{dilate_with, DilationBackend, KernelShape, Radii, MAX_RADIUS};
use crate::search::score::negative_score;
use crate::search::{ColorDepthSearchAlgorithm, VariantKind, Variants};
use crate::trace::{trace_event, trace_span};
use crate::transform::z_gap_mask_with;
use crate::util::{CdMatchError, CdMatchResult};
use std::fmt;
use std::sync::Arc;

/// Dilation backend shared between algorithm instances.
pub type SharedBackend = Arc<dyn DilationBackend + Send + Sync>;

/// Shape match parameters.
#[derive(Clone, Debug)]
pub struct ShapeMatchConfig {
    pub query_threshold: i32,
    pub target_threshold: i32,
    /// Also score the horizontally mirrored query.
    pub mirror: bool,
    /// Circle radius of the on-the-fly z-gap mask.
    pub negative_radius: f64,
    /// Slice gaps up to this value fall back to the gradient penalty.
    pub flux: i32,
    /// Per-pixel penalties at or below this value are ignored.
    pub gap_noise: i64,
    /// Outer radius of the over-expression halo.
    pub over_expression_outer: f64,
    /// Inner radius of the over-expression halo.
    pub over_expression_inner: f64,
    /// RGB channel used as the query signal.
    pub signal_channel: usize,
}

impl Default for ShapeMatchConfig {
    fn default() -> Self {
        Self {
            query_threshold: 20,
            target_threshold: 20,
            mirror: true,
            negative_radius: 20.0,
            flux: 40,
            gap_noise: 3,
            over_expression_outer: 60.0,
            over_expression_inner: 20.0,
            signal_channel: 2,
        }
    }
}

/// Result of one shape match comparison. Fields are `-1` when unscored.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ShapeMatchScore {
    pub gradient_area_gap: i64,
    pub high_expression_area: i64,
    /// Combined penalty, see [`negative_score`].
    pub max_negative_score: i64,
    pub mirrored: bool,
}

impl ShapeMatchScore {
    /// Sentinel for targets without a gradient image.
    pub const UNSCORED: ShapeMatchScore = ShapeMatchScore {
        gradient_area_gap: -1,
        high_expression_area: -1,
        max_negative_score: -1,
        mirrored: false,
    };

    fn new(gradient_area_gap: i64, high_expression_area: i64, mirrored: bool) -> Self {
        Self {
            gradient_area_gap,
            high_expression_area,
            max_negative_score: negative_score(gradient_area_gap, high_expression_area),
            mirrored,
        }
    }

    pub fn negative_score(&self) -> i64 {
        self.max_negative_score
    }

    pub fn is_scored(&self) -> bool {
        self.max_negative_score >= 0
    }
}

/// Validated shape match parameters plus the dilation backend.
#[derive(Clone)]
pub struct ShapeMatchProvider {
    cfg: ShapeMatchConfig,
    backend: SharedBackend,
}

impl fmt::Debug for ShapeMatchProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShapeMatchProvider")
            .field("cfg", &self.cfg)
            .field("backend", &self.backend.name())
            .finish()
    }
}

impl ShapeMatchProvider {
    /// Validates the configuration; dilations run on [`SpanDilation`].
    pub fn new(cfg: ShapeMatchConfig) -> CdMatchResult<Self> {
        Self::with_backend(cfg, Arc::new(SpanDilation))
    }

    /// Same as [`ShapeMatchProvider::new`] with an explicit dilation backend.
    pub fn with_backend(cfg: ShapeMatchConfig, backend: SharedBackend) -> CdMatchResult<Self> {
        for r in [
            cfg.negative_radius,
            cfg.over_expression_inner,
            cfg.over_expression_outer,
        ] {
            if !r.is_finite() || r < 0.0 {
                return Err(CdMatchError::InvalidInput(
                    "shape match radii must be finite and non-negative",
                ));
            }
            if r > MAX_RADIUS {
                return Err(CdMatchError::InvalidInput(
                    "shape match radii must not exceed MAX_RADIUS",
                ));
            }
        }
        if cfg.over_expression_inner >= cfg.over_expression_outer {
            return Err(CdMatchError::InvalidInput(
                "over-expression inner radius must be below the outer radius",
            ));
        }
        if cfg.signal_channel >= 3 {
            return Err(CdMatchError::InvalidInput("signal channel must be 0, 1 or 2"));
        }
        Ok(Self { cfg, backend })
    }

    pub fn config(&self) -> &ShapeMatchConfig {
        &self.cfg
    }

    /// Prepares the query and its mirror, optionally restricted to `roi`.
    pub fn create_algorithm(
        &self,
        query: &Image,
        roi: Option<&Image>,
    ) -> CdMatchResult<ShapeMatchAlgorithm> {
        query.rgb("shape match query")?;
        if let Some(roi) = roi {
            query.ensure_same_shape(roi)?;
        }
        let _span = trace_span!("shape_match_prepare").entered();

        let thresholded = query.threshold(self.cfg.query_threshold);
        let masked = match roi {
            Some(roi) => thresholded.apply_mask(roi)?,
            None => thresholded,
        };

        let outer = dilate_with(
            self.backend.as_ref(),
            &masked,
            Radii::circle(self.cfg.over_expression_outer),
            KernelShape::Ellipsoid,
        )?;
        let inner = dilate_with(
            self.backend.as_ref(),
            &masked,
            Radii::circle(self.cfg.over_expression_inner),
            KernelShape::Ellipsoid,
        )?;
        let over_expression: Vec<u8> = (0..masked.len())
            .map(|idx| u8::from(outer.is_set(idx) && !inner.is_set(idx)))
            .collect();

        let plain = QueryView::new(masked, over_expression, self.cfg.signal_channel)?;
        let mirrored = if self.cfg.mirror {
            Some(plain.mirrored(roi, self.cfg.signal_channel)?)
        } else {
            None
        };

        trace_event!(
            "shape_match_query",
            size = plain.size,
            over_expression = plain.over_expression.iter().filter(|&&v| v != 0).count()
        );
        Ok(ShapeMatchAlgorithm {
            cfg: self.cfg.clone(),
            backend: Arc::clone(&self.backend),
            source: query.clone(),
            plain,
            mirrored,
        })
    }
}

/// Query pixels, signal presence and over-expression flags in one orientation.
#[derive(Clone, Debug)]
struct QueryView {
    image: Image,
    signal: Vec<u8>,
    over_expression: Vec<u8>,
    size: usize,
}

impl QueryView {
    fn new(image: Image, over_expression: Vec<u8>, signal_channel: usize) -> CdMatchResult<Self> {
        let signal = (0..image.len())
            .map(|idx| u8::from(image.channel_value(idx, signal_channel) > 0))
            .collect();
        let size = image.count_set();
        Ok(Self {
            image,
            signal,
            over_expression,
            size,
        })
    }

    fn mirrored(&self, roi: Option<&Image>, signal_channel: usize) -> CdMatchResult<Self> {
        let width = self.image.width();
        let flip = |flags: &[u8]| -> Vec<u8> {
            flags
                .chunks_exact(width)
                .flat_map(|row| row.iter().rev().copied())
                .collect()
        };
        let mut image = self.image.mirror_x();
        let mut over_expression = flip(&self.over_expression);
        if let Some(roi) = roi {
            image = image.apply_mask(roi)?;
            for (idx, flag) in over_expression.iter_mut().enumerate() {
                if !roi.is_set(idx) {
                    *flag = 0;
                }
            }
        }
        Self::new(image, over_expression, signal_channel)
    }
}

/// Shape match for one query, reusable across targets.
#[derive(Clone)]
pub struct ShapeMatchAlgorithm {
    cfg: ShapeMatchConfig,
    backend: SharedBackend,
    source: Image,
    plain: QueryView,
    mirrored: Option<QueryView>,
}

impl fmt::Debug for ShapeMatchAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShapeMatchAlgorithm")
            .field("cfg", &self.cfg)
            .field("backend", &self.backend.name())
            .field("query_size", &self.plain.size)
            .field("mirrored", &self.mirrored.is_some())
            .finish()
    }
}

/// Target data shared by the plain and mirrored evaluations.
struct TargetPlanes<'a> {
    thresholded: &'a [Rgb],
    z_gap: &'a [Rgb],
    gradient: &'a Image,
}

impl ShapeMatchAlgorithm {
    /// Over-expression flags of the unmirrored query.
    pub fn over_expression(&self) -> &[u8] {
        &self.plain.over_expression
    }

    /// Signal flags of the unmirrored query.
    pub fn signal(&self) -> &[u8] {
        &self.plain.signal
    }

    fn area_gap(&self, view: &QueryView, target: &TargetPlanes<'_>) -> CdMatchResult<i64> {
        let query = view.image.rgb("shape match query")?;
        let flux = self.cfg.flux;
        let mut gap = 0i64;
        for (idx, (&q, &z)) in query.iter().zip(target.z_gap).enumerate() {
            let penalty = if q != Rgb::BLACK && z != Rgb::BLACK {
                let slice_gap = color_slice_gap(q, z);
                if slice_gap > flux {
                    i64::from(slice_gap - flux)
                } else {
                    fallback_penalty(view, target.gradient, idx)
                }
            } else {
                fallback_penalty(view, target.gradient, idx)
            };
            if penalty > self.cfg.gap_noise {
                gap += penalty;
            }
        }
        Ok(gap)
    }

    fn high_expression_area(view: &QueryView, target: &TargetPlanes<'_>) -> i64 {
        view.over_expression
            .iter()
            .zip(target.thresholded)
            .filter(|&(&over, &px)| over != 0 && px != Rgb::BLACK)
            .count() as i64
    }

    fn score_view(
        &self,
        view: &QueryView,
        target: &TargetPlanes<'_>,
        mirrored: bool,
    ) -> CdMatchResult<ShapeMatchScore> {
        let gap = self.area_gap(view, target)?;
        let high = Self::high_expression_area(view, target);
        Ok(ShapeMatchScore::new(gap, high, mirrored))
    }
}

fn fallback_penalty(view: &QueryView, gradient: &Image, idx: usize) -> i64 {
    i64::from(view.signal[idx]) * i64::from(gradient.integer(idx))
}

impl ColorDepthSearchAlgorithm for ShapeMatchAlgorithm {
    type Score = ShapeMatchScore;

    fn query_image(&self) -> &Image {
        &self.source
    }

    fn query_size(&self) -> usize {
        self.plain.size
    }

    fn required_variants(&self) -> &'static [VariantKind] {
        &[VariantKind::Gradient, VariantKind::ZGap]
    }

    fn calculate_matching_score(
        &self,
        target: &Image,
        variants: &Variants<'_>,
    ) -> CdMatchResult<ShapeMatchScore> {
        let Some(gradient) = variants.get(VariantKind::Gradient) else {
            return Ok(ShapeMatchScore::UNSCORED);
        };
        self.source.ensure_same_shape(target)?;
        self.source.ensure_same_shape(&gradient)?;
        target.rgb("shape match target")?;

        let thresholded = target.threshold(self.cfg.target_threshold);
        let z_gap = match variants.get(VariantKind::ZGap) {
            Some(z_gap) => {
                self.source.ensure_same_shape(&z_gap)?;
                z_gap
            }
            None => z_gap_mask_with(
                self.backend.as_ref(),
                target,
                self.cfg.target_threshold,
                self.cfg.negative_radius,
            )?,
        };
        let planes = TargetPlanes {
            thresholded: thresholded.rgb("shape match target")?,
            z_gap: z_gap.rgb("shape match z-gap mask")?,
            gradient: &gradient,
        };

        let plain = self.score_view(&self.plain, &planes, false)?;
        let best = match &self.mirrored {
            Some(view) => {
                let mirrored = self.score_view(view, &planes, true)?;
                if mirrored.max_negative_score < plain.max_negative_score {
                    mirrored
                } else {
                    plain
                }
            }
            None => plain,
        };
        Ok(best)
    }
}
