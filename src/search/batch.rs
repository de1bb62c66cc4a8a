//! Scoring one query against a list of targets.

use crate::candidate::topk::{sort_records_desc, TopK};
use crate::image::Image;
use crate::search::score::{normalize_scores, MatchRecord};
use crate::search::{ColorDepthSearchAlgorithm, PixelMatchAlgorithm, ShapeMatchAlgorithm, Variants};
use crate::trace::{trace_event, trace_span};
use crate::util::{CdMatchError, CdMatchResult};

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// A target image and its variant suppliers.
#[derive(Debug)]
pub struct SearchTarget<'a> {
    pub image: Image,
    pub variants: Variants<'a>,
}

impl<'a> SearchTarget<'a> {
    pub fn new(image: Image) -> Self {
        Self {
            image,
            variants: Variants::new(),
        }
    }

    pub fn with_variants(image: Image, variants: Variants<'a>) -> Self {
        Self { image, variants }
    }
}

/// Ranked records plus the targets that failed to score.
#[derive(Debug, Default)]
pub struct SearchOutcome {
    /// Best first.
    pub records: Vec<MatchRecord>,
    /// Target index and error for each failed target.
    pub failures: Vec<(usize, CdMatchError)>,
}

/// Scores every target with `algorithm`, one result per target.
pub fn score_targets<A: ColorDepthSearchAlgorithm>(
    algorithm: &A,
    targets: &[SearchTarget<'_>],
) -> Vec<CdMatchResult<A::Score>> {
    let _span = trace_span!("score_targets", targets = targets.len()).entered();
    targets
        .iter()
        .map(|t| algorithm.calculate_matching_score(&t.image, &t.variants))
        .collect()
}

/// Parallel [`score_targets`]; results keep the target order.
#[cfg(feature = "rayon")]
pub fn score_targets_par<A: ColorDepthSearchAlgorithm>(
    algorithm: &A,
    targets: &[SearchTarget<'_>],
) -> Vec<CdMatchResult<A::Score>> {
    let _span = trace_span!("score_targets", targets = targets.len(), parallel = true).entered();
    targets
        .par_iter()
        .map(|t| algorithm.calculate_matching_score(&t.image, &t.variants))
        .collect()
}

fn score_one(
    pixel: &PixelMatchAlgorithm,
    shape: Option<&ShapeMatchAlgorithm>,
    index: usize,
    target: &SearchTarget<'_>,
) -> CdMatchResult<MatchRecord> {
    let pixel_score = pixel.calculate_matching_score(&target.image, &target.variants)?;
    let shape_score = shape
        .map(|alg| alg.calculate_matching_score(&target.image, &target.variants))
        .transpose()?;
    Ok(MatchRecord::new(index, pixel_score, shape_score))
}

fn finish(results: Vec<CdMatchResult<MatchRecord>>, top_k: Option<usize>) -> SearchOutcome {
    let mut outcome = SearchOutcome::default();
    for (index, result) in results.into_iter().enumerate() {
        match result {
            Ok(record) => outcome.records.push(record),
            Err(err) => outcome.failures.push((index, err)),
        }
    }
    normalize_scores(&mut outcome.records);
    match top_k {
        Some(k) => {
            let mut top = TopK::new(k);
            top.extend(std::mem::take(&mut outcome.records));
            outcome.records = top.into_sorted_desc();
        }
        None => sort_records_desc(&mut outcome.records),
    }
    trace_event!(
        "search_done",
        kept = outcome.records.len(),
        failed = outcome.failures.len()
    );
    outcome
}

/// Pixel match (plus shape match when given) over all targets, normalized
/// across the result set and ranked best first.
///
/// Failing targets are reported in [`SearchOutcome::failures`] and do not
/// take part in normalization. `top_k = None` keeps every record.
pub fn search_targets(
    pixel: &PixelMatchAlgorithm,
    shape: Option<&ShapeMatchAlgorithm>,
    targets: &[SearchTarget<'_>],
    top_k: Option<usize>,
) -> SearchOutcome {
    let _span = trace_span!("search_targets", targets = targets.len()).entered();
    let results = targets
        .iter()
        .enumerate()
        .map(|(index, target)| score_one(pixel, shape, index, target))
        .collect();
    finish(results, top_k)
}

/// Parallel [`search_targets`] with identical output.
#[cfg(feature = "rayon")]
pub fn search_targets_par(
    pixel: &PixelMatchAlgorithm,
    shape: Option<&ShapeMatchAlgorithm>,
    targets: &[SearchTarget<'_>],
    top_k: Option<usize>,
) -> SearchOutcome {
    let _span = trace_span!("search_targets", targets = targets.len(), parallel = true).entered();
    let results = targets
        .par_iter()
        .enumerate()
        .map(|(index, target)| score_one(pixel, shape, index, target))
        .collect();
    finish(results, top_k)
}
