//! Tolerant floating point comparisons used by the layout math.
//!
//! `f64::floor` and friends live in `std`; these helpers stay usable under `no_std`.

const DBL_EPSILON: f64 = 2.220_446_049_250_313e-16;

/// Two values are close when they differ by less than a magnitude-scaled epsilon.
pub(crate) fn are_close(a: f64, b: f64) -> bool {
    if a == b {
        return true;
    }
    let eps = (abs(a) + abs(b) + 10.0) * DBL_EPSILON;
    let delta = a - b;
    -eps < delta && eps > delta
}

pub(crate) fn less_than(a: f64, b: f64) -> bool {
    a < b && !are_close(a, b)
}

pub(crate) fn greater_than(a: f64, b: f64) -> bool {
    a > b && !are_close(a, b)
}

pub(crate) fn less_than_or_close(a: f64, b: f64) -> bool {
    a < b || are_close(a, b)
}

pub(crate) fn greater_than_or_close(a: f64, b: f64) -> bool {
    a > b || are_close(a, b)
}

pub(crate) fn abs(v: f64) -> f64 {
    if v < 0.0 { -v } else { v }
}

pub(crate) fn is_infinite(v: f64) -> bool {
    v == f64::INFINITY || v == f64::NEG_INFINITY
}

/// Largest integer not greater than `v`.
///
/// Values beyond the exactly representable integer range are already integral.
pub(crate) fn floor(v: f64) -> f64 {
    if v.is_nan() || is_infinite(v) || abs(v) >= 4_503_599_627_370_496.0 {
        return v;
    }
    let t = v as i64 as f64;
    if t > v { t - 1.0 } else { t }
}

pub(crate) fn ceil(v: f64) -> f64 {
    let f = floor(v);
    if f < v { f + 1.0 } else { f }
}

/// The non-negative fractional part, `v - floor(v)`.
pub(crate) fn fractional(v: f64) -> f64 {
    v - floor(v)
}

pub(crate) fn max(a: f64, b: f64) -> f64 {
    if a > b { a } else { b }
}

pub(crate) fn min(a: f64, b: f64) -> f64 {
    if a < b { a } else { b }
}

pub(crate) fn clamp(v: f64, lo: f64, hi: f64) -> f64 {
    max(lo, min(v, hi))
}
