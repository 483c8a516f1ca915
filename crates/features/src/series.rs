//! Element-wise series transforms.
//!
//! Every function returns a vector of the same length as its input with
//! `NaN` standing in for missing values. Positions that need data from before
//! the start of the series are missing.

/// `x[i] - x[i - n]`.
pub fn diff(x: &[f64], n: usize) -> Vec<f64> {
    (0..x.len())
        .map(|i| if i >= n { x[i] - x[i - n] } else { f64::NAN })
        .collect()
}

/// `x[i - n]`.
pub fn shift(x: &[f64], n: usize) -> Vec<f64> {
    (0..x.len())
        .map(|i| if i >= n { x[i - n] } else { f64::NAN })
        .collect()
}

/// `x[i] / x[i - n] - 1`.
pub fn pct_change(x: &[f64], n: usize) -> Vec<f64> {
    (0..x.len())
        .map(|i| if i >= n { x[i] / x[i - n] - 1.0 } else { f64::NAN })
        .collect()
}

/// `ln(x[i] / x[i - 1])`.
pub fn log_return(x: &[f64]) -> Vec<f64> {
    (0..x.len())
        .map(|i| if i >= 1 { (x[i] / x[i - 1]).ln() } else { f64::NAN })
        .collect()
}

/// Apply `f` to every element.
pub fn map(x: &[f64], f: impl Fn(f64) -> f64) -> Vec<f64> {
    x.iter().map(|&v| f(v)).collect()
}

/// Combine two aligned series element by element.
pub fn zip_with(a: &[f64], b: &[f64], f: impl Fn(f64, f64) -> f64) -> Vec<f64> {
    debug_assert_eq!(a.len(), b.len());
    a.iter().zip(b).map(|(&x, &y)| f(x, y)).collect()
}

/// Division where a zero denominator yields a missing value.
#[inline]
pub fn safe_div(num: f64, den: f64) -> f64 {
    if den == 0.0 {
        f64::NAN
    } else {
        num / den
    }
}

/// Element-wise [`safe_div`].
pub fn div(num: &[f64], den: &[f64]) -> Vec<f64> {
    zip_with(num, den, safe_div)
}

/// Positive part of each value; missing values stay missing.
pub fn clip_lower(x: &[f64], lo: f64) -> Vec<f64> {
    map(x, |v| if v.is_nan() { v } else { v.max(lo) })
}

/// Negative part of each value; missing values stay missing.
pub fn clip_upper(x: &[f64], hi: f64) -> Vec<f64> {
    map(x, |v| if v.is_nan() { v } else { v.min(hi) })
}

/// Replace missing values with `fill`.
pub fn fill_missing(x: &[f64], fill: f64) -> Vec<f64> {
    map(x, |v| if v.is_nan() { fill } else { v })
}

/// Absolute value of each element.
pub fn abs(x: &[f64]) -> Vec<f64> {
    map(x, f64::abs)
}

/// Replace infinities with the missing marker.
pub fn finite_or_nan(x: &[f64]) -> Vec<f64> {
    map(x, |v| if v.is_infinite() { f64::NAN } else { v })
}

/// Three-way direction: `1`, `-1`, or `0` for flat and missing values.
#[inline]
pub fn direction(v: f64) -> f64 {
    if v > 0.0 {
        1.0
    } else if v < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// `1.0` where `pred` holds, `0.0` otherwise (missing values count as false).
pub fn indicator(x: &[f64], pred: impl Fn(f64) -> bool) -> Vec<f64> {
    map(x, |v| if pred(v) { 1.0 } else { 0.0 })
}

/// Running sum that skips missing values (they stay missing in the output).
pub fn cumsum(x: &[f64]) -> Vec<f64> {
    let mut acc = 0.0;
    x.iter()
        .map(|&v| {
            if v.is_nan() {
                f64::NAN
            } else {
                acc += v;
                acc
            }
        })
        .collect()
}

/// Running product that skips missing values.
pub fn cumprod(x: &[f64]) -> Vec<f64> {
    let mut acc = 1.0;
    x.iter()
        .map(|&v| {
            if v.is_nan() {
                f64::NAN
            } else {
                acc *= v;
                acc
            }
        })
        .collect()
}

/// Carry the last present value forward over missing values.
pub fn ffill(x: &[f64]) -> Vec<f64> {
    let mut last = f64::NAN;
    x.iter()
        .map(|&v| {
            if !v.is_nan() {
                last = v;
            }
            last
        })
        .collect()
}

/// Exponentially weighted mean with `alpha = 2 / (span + 1)`, no bias adjustment.
pub fn ewm_span(x: &[f64], span: usize) -> Vec<f64> {
    ewm(x, 2.0 / (span as f64 + 1.0), 0)
}

/// Recursive exponentially weighted mean.
///
/// Seeded at the first present value. A missing input keeps the previous
/// output but still decays the weight of the history, so the next observation
/// carries more weight than usual. Values are emitted once `min_periods`
/// observations have been seen.
pub fn ewm(x: &[f64], alpha: f64, min_periods: usize) -> Vec<f64> {
    let decay = 1.0 - alpha;
    let mut out = Vec::with_capacity(x.len());
    let mut weighted = f64::NAN;
    let mut old_wt = 1.0;
    let mut nobs = 0usize;

    for &cur in x {
        let observed = !cur.is_nan();
        if observed {
            nobs += 1;
        }

        if weighted.is_nan() {
            if observed {
                weighted = cur;
            }
        } else {
            old_wt *= decay;
            if observed {
                if weighted != cur {
                    weighted = (old_wt * weighted + alpha * cur) / (old_wt + alpha);
                }
                old_wt = 1.0;
            }
        }

        out.push(if nobs >= min_periods.max(1) { weighted } else { f64::NAN });
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_diff_and_shift() {
        let x = [1.0, 3.0, 6.0, 10.0];
        let d = diff(&x, 1);
        assert!(d[0].is_nan());
        assert_eq!(&d[1..], &[2.0, 3.0, 4.0]);

        let d2 = diff(&x, 2);
        assert!(d2[1].is_nan());
        assert_eq!(d2[3], 7.0);

        let s = shift(&x, 3);
        assert!(s[2].is_nan());
        assert_eq!(s[3], 1.0);
    }

    #[test]
    fn test_short_series() {
        assert!(diff(&[5.0], 10)[0].is_nan());
        assert!(pct_change(&[], 3).is_empty());
    }

    #[test]
    fn test_pct_change() {
        let p = pct_change(&[100.0, 110.0, 99.0], 1);
        assert_relative_eq!(p[1], 0.1, epsilon = 1e-12);
        assert_relative_eq!(p[2], -0.1, epsilon = 1e-12);
    }

    #[test]
    fn test_safe_div_zero() {
        assert!(safe_div(1.0, 0.0).is_nan());
        assert_eq!(safe_div(1.0, 4.0), 0.25);
    }

    #[test]
    fn test_clip_keeps_missing() {
        let x = [f64::NAN, -2.0, 3.0];
        let up = clip_lower(&x, 0.0);
        assert!(up[0].is_nan());
        assert_eq!(&up[1..], &[0.0, 3.0]);
        let down = clip_upper(&x, 0.0);
        assert!(down[0].is_nan());
        assert_eq!(&down[1..], &[-2.0, 0.0]);
    }

    #[test]
    fn test_direction() {
        assert_eq!(direction(2.0), 1.0);
        assert_eq!(direction(-0.5), -1.0);
        assert_eq!(direction(0.0), 0.0);
        assert_eq!(direction(f64::NAN), 0.0);
    }

    #[test]
    fn test_cumsum_skips_missing() {
        let c = cumsum(&[f64::NAN, 1.0, 2.0, f64::NAN, 3.0]);
        assert!(c[0].is_nan());
        assert_eq!(c[2], 3.0);
        assert!(c[3].is_nan());
        assert_eq!(c[4], 6.0);
    }

    #[test]
    fn test_ffill() {
        let f = ffill(&[f64::NAN, 1.0, f64::NAN, f64::NAN, -1.0]);
        assert!(f[0].is_nan());
        assert_eq!(f[3], 1.0);
        assert_eq!(f[4], -1.0);
    }

    #[test]
    fn test_ewm_recursion() {
        // span 3 => alpha 0.5
        let e = ewm_span(&[2.0, 4.0, 8.0], 3);
        assert_relative_eq!(e[0], 2.0);
        assert_relative_eq!(e[1], 3.0);
        assert_relative_eq!(e[2], 5.5);
    }

    #[test]
    fn test_ewm_leading_missing_and_min_periods() {
        let e = ewm(&[f64::NAN, 1.0, 3.0, 5.0], 0.5, 2);
        assert!(e[0].is_nan());
        assert!(e[1].is_nan());
        assert_relative_eq!(e[2], 2.0);
        assert_relative_eq!(e[3], 3.5);
    }

    #[test]
    fn test_ewm_gap_decays_history() {
        // After a gap the old value has weight (1-a)^2 instead of (1-a)
        let e = ewm(&[0.0, f64::NAN, 1.0], 0.5, 0);
        assert_eq!(e[1], 0.0);
        assert_relative_eq!(e[2], 0.5 / 0.75, epsilon = 1e-12);
    }
}
