//! Combined shape penalty and dataset-wide score normalization.

use crate::search::{PixelMatchScore, ShapeMatchScore};

/// Combines area gap and high-expression area into one penalty.
///
/// The high-expression area counts half, truncated toward zero. A negative
/// component counts as missing: the valid one is used alone and
/// `-1` is returned when neither is valid.
pub fn negative_score(gradient_area_gap: i64, high_expression_area: i64) -> i64 {
    match (gradient_area_gap >= 0, high_expression_area >= 0) {
        (true, true) => gradient_area_gap + high_expression_area / 2,
        (true, false) => gradient_area_gap,
        (false, true) => high_expression_area / 2,
        (false, false) => -1,
    }
}

/// Blends a pixel match count with a shape penalty.
///
/// Degenerate inputs (no pixel matches, no pixel maximum, no positive
/// penalty maximum, unscored penalty) return `pixel_score` unchanged.
pub fn normalized_score(
    pixel_score: i64,
    max_pixel_score: i64,
    negative: i64,
    max_negative: i64,
) -> f64 {
    if pixel_score == 0 || max_pixel_score == 0 || max_negative <= 0 || negative < 0 {
        return pixel_score as f64;
    }
    let bounded = (negative as f64 / max_negative as f64 * 2.5).clamp(0.002, 1.0);
    pixel_score as f64 / max_pixel_score as f64 / bounded * 100.0
}

/// Scores of one target within a search.
#[derive(Clone, Debug, PartialEq)]
pub struct MatchRecord {
    /// Position of the target in the searched list.
    pub target_index: usize,
    pub pixel: PixelMatchScore,
    pub shape: Option<ShapeMatchScore>,
    /// Filled by [`normalize_scores`]; the raw pixel count until then.
    pub normalized_score: f64,
}

impl MatchRecord {
    pub fn new(target_index: usize, pixel: PixelMatchScore, shape: Option<ShapeMatchScore>) -> Self {
        Self {
            target_index,
            pixel,
            shape,
            normalized_score: pixel.match_count as f64,
        }
    }
}

/// Fills `normalized_score` using the maxima across `records`.
pub fn normalize_scores(records: &mut [MatchRecord]) {
    let max_pixel = records
        .iter()
        .map(|r| r.pixel.match_count)
        .max()
        .unwrap_or(0);
    let max_negative = records
        .iter()
        .filter_map(|r| r.shape.map(|s| s.max_negative_score))
        .max()
        .unwrap_or(-1);
    for record in records.iter_mut() {
        let negative = record.shape.map_or(-1, |s| s.max_negative_score);
        record.normalized_score = normalized_score(
            record.pixel.match_count,
            max_pixel,
            negative,
            max_negative,
        );
    }
}
