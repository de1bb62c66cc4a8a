//! Numeric helpers shared by the scoring and transform kernels.

/// Rounds to the nearest integer with halves rounded towards positive infinity.
pub(crate) fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

/// Ratio of two channel values, `0.0` when the denominator is zero.
#[inline]
pub(crate) fn channel_ratio(num: u8, den: u8) -> f64 {
    if den == 0 {
        0.0
    } else {
        f64::from(num) / f64::from(den)
    }
}

/// Scales `value` from `[lo, hi]` onto `[0, out_max]`, clamping both ends.
pub(crate) fn rescale_clamped(value: f64, lo: f64, hi: f64, out_max: f64) -> f64 {
    if value <= lo {
        return 0.0;
    }
    if value >= hi || hi <= lo {
        return out_max;
    }
    (value - lo) / (hi - lo) * out_max
}
