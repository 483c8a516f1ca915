//! Fixed-size rolling windows.
//!
//! A window ending at row `i` produces a value only when it is full and every
//! value inside it is present; otherwise the output at `i` is missing.

use statrs::statistics::{Data, Median, Statistics};

/// Apply `f` to every full, gap-free window of length `window`.
pub fn apply(x: &[f64], window: usize, f: impl Fn(&[f64]) -> f64) -> Vec<f64> {
    let mut out = vec![f64::NAN; x.len()];
    if window == 0 {
        return out;
    }
    // Count of missing values inside the current window
    let mut missing = 0usize;
    for i in 0..x.len() {
        if x[i].is_nan() {
            missing += 1;
        }
        if i >= window && x[i - window].is_nan() {
            missing -= 1;
        }
        if i + 1 >= window && missing == 0 {
            out[i] = f(&x[i + 1 - window..=i]);
        }
    }
    out
}

/// Apply `f` to pairs of aligned windows; missing if either window has a gap.
pub fn apply2(a: &[f64], b: &[f64], window: usize, f: impl Fn(&[f64], &[f64]) -> f64) -> Vec<f64> {
    debug_assert_eq!(a.len(), b.len());
    let n = a.len().min(b.len());
    let mut out = vec![f64::NAN; n];
    if window == 0 {
        return out;
    }
    for i in (window - 1)..n {
        let wa = &a[i + 1 - window..=i];
        let wb = &b[i + 1 - window..=i];
        if wa.iter().chain(wb).any(|v| v.is_nan()) {
            continue;
        }
        out[i] = f(wa, wb);
    }
    out
}

pub fn sum(x: &[f64], window: usize) -> Vec<f64> {
    apply(x, window, |w| w.iter().sum())
}

pub fn mean(x: &[f64], window: usize) -> Vec<f64> {
    apply(x, window, |w| w.mean())
}

/// Rolling standard deviation with `ddof` delta degrees of freedom (0 or 1).
pub fn std_dev(x: &[f64], window: usize, ddof: usize) -> Vec<f64> {
    apply(x, window, |w| window_std(w, ddof))
}

/// Rolling variance with `ddof` delta degrees of freedom (0 or 1).
pub fn variance(x: &[f64], window: usize, ddof: usize) -> Vec<f64> {
    apply(x, window, |w| {
        if ddof == 0 {
            w.population_variance()
        } else {
            w.variance()
        }
    })
}

pub fn min(x: &[f64], window: usize) -> Vec<f64> {
    apply(x, window, window_min)
}

pub fn max(x: &[f64], window: usize) -> Vec<f64> {
    apply(x, window, window_max)
}

pub fn median(x: &[f64], window: usize) -> Vec<f64> {
    apply(x, window, window_median)
}

/// Rolling Pearson correlation of two aligned series.
pub fn corr(a: &[f64], b: &[f64], window: usize) -> Vec<f64> {
    apply2(a, b, window, |wa, wb| {
        let cov = wa.covariance(wb);
        cov / (wa.variance() * wb.variance()).sqrt()
    })
}

/// Standard deviation of a window (`ddof` 0 = population, otherwise sample).
pub fn window_std(w: &[f64], ddof: usize) -> f64 {
    if ddof == 0 {
        w.population_std_dev()
    } else {
        w.std_dev()
    }
}

pub fn window_min(w: &[f64]) -> f64 {
    w.iter().copied().fold(f64::INFINITY, f64::min)
}

pub fn window_max(w: &[f64]) -> f64 {
    w.iter().copied().fold(f64::NEG_INFINITY, f64::max)
}

pub fn window_median(w: &[f64]) -> f64 {
    Data::new(w.to_vec()).median()
}

/// Percentile with linear interpolation between closest ranks, `q` in `[0, 100]`.
pub fn percentile(w: &[f64], q: f64) -> f64 {
    if w.is_empty() {
        return f64::NAN;
    }
    let mut sorted = w.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let pos = (q / 100.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_apply_requires_full_window() {
        let x = [1.0, 2.0, 3.0, 4.0];
        let s = sum(&x, 3);
        assert!(s[0].is_nan());
        assert!(s[1].is_nan());
        assert_eq!(s[2], 6.0);
        assert_eq!(s[3], 9.0);
    }

    #[test]
    fn test_apply_skips_windows_with_gaps() {
        let x = [f64::NAN, 2.0, 3.0, f64::NAN, 5.0, 6.0, 7.0];
        let m = mean(&x, 2);
        assert!(m[1].is_nan());
        assert_eq!(m[2], 2.5);
        assert!(m[3].is_nan());
        assert!(m[4].is_nan());
        assert_eq!(m[5], 5.5);
    }

    #[test]
    fn test_window_longer_than_series() {
        assert!(mean(&[1.0, 2.0], 5).iter().all(|v| v.is_nan()));
    }

    #[test]
    fn test_std_ddof() {
        let x = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_relative_eq!(std_dev(&x, 8, 0)[7], 2.0, epsilon = 1e-12);
        assert_relative_eq!(std_dev(&x, 8, 1)[7], (32.0f64 / 7.0).sqrt(), epsilon = 1e-12);
        assert_relative_eq!(variance(&x, 8, 0)[7], 4.0, epsilon = 1e-12);
    }

    #[test]
    fn test_min_max_median() {
        let x = [3.0, 1.0, 4.0, 1.5, 9.0];
        assert_eq!(min(&x, 3)[2], 1.0);
        assert_eq!(max(&x, 3)[4], 9.0);
        assert_eq!(median(&x, 3)[3], 1.5);
        assert_eq!(median(&x, 4)[4], 2.75);
    }

    #[test]
    fn test_percentile_linear() {
        let w = [1.0, 2.0, 3.0, 4.0];
        assert_relative_eq!(percentile(&w, 25.0), 1.75);
        assert_relative_eq!(percentile(&w, 75.0), 3.25);
        assert_relative_eq!(percentile(&w, 50.0), 2.5);
    }

    #[test]
    fn test_corr_perfect() {
        let a = [1.0, 2.0, 3.0, 4.0, 5.0];
        let b = [2.0, 4.0, 6.0, 8.0, 10.0];
        let c = corr(&a, &b, 5);
        assert_relative_eq!(c[4], 1.0, epsilon = 1e-12);
        let neg: Vec<f64> = b.iter().map(|v| -v).collect();
        assert_relative_eq!(corr(&a, &neg, 3)[4], -1.0, epsilon = 1e-12);
    }
}
