//! Least-squares fits against the bar index.
//!
//! Windows are regressed on `x = 0, 1, ..., n - 1`. The abscissa is centered
//! before fitting, which leaves slopes and residuals unchanged.

use crate::rolling;

/// Centered abscissa for a window of `n` points.
fn centered_x(n: usize) -> Vec<f64> {
    let mid = (n as f64 - 1.0) / 2.0;
    (0..n).map(|i| i as f64 - mid).collect()
}

/// OLS slope of `y` against its position.
pub fn ols_slope(y: &[f64]) -> f64 {
    let n = y.len();
    if n < 2 {
        return f64::NAN;
    }
    let x = centered_x(n);
    let y_mean = y.iter().sum::<f64>() / n as f64;
    let sxy: f64 = x.iter().zip(y).map(|(xi, yi)| xi * (yi - y_mean)).sum();
    let sxx: f64 = x.iter().map(|xi| xi * xi).sum();
    sxy / sxx
}

/// Population variance of the residuals of a quadratic fit.
///
/// Uses the orthogonal basis `{1, x, x^2 - mean(x^2)}` of the centered,
/// equally spaced abscissa, so no linear system has to be solved.
pub fn quadratic_residual_variance(y: &[f64]) -> f64 {
    let n = y.len();
    if n < 3 {
        return f64::NAN;
    }
    let x = centered_x(n);
    let nf = n as f64;
    let x2_mean = x.iter().map(|v| v * v).sum::<f64>() / nf;
    let q: Vec<f64> = x.iter().map(|v| v * v - x2_mean).collect();

    let y_mean = y.iter().sum::<f64>() / nf;
    let b1 = dot(&x, y) / dot(&x, &x);
    let b2 = dot(&q, y) / dot(&q, &q);

    let residuals: Vec<f64> = (0..n)
        .map(|i| y[i] - (y_mean + b1 * x[i] + b2 * q[i]))
        .collect();
    let r_mean = residuals.iter().sum::<f64>() / nf;
    residuals.iter().map(|r| (r - r_mean).powi(2)).sum::<f64>() / nf
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// Rolling OLS slope over windows of `window` rows.
pub fn rolling_slope(y: &[f64], window: usize) -> Vec<f64> {
    rolling::apply(y, window, ols_slope)
}

/// Residual of the current row against the rolling linear fit ending on it.
pub fn rolling_residual(y: &[f64], window: usize) -> Vec<f64> {
    rolling::apply(y, window, |w| {
        let n = w.len();
        let mean = w.iter().sum::<f64>() / n as f64;
        let last_x = (n as f64 - 1.0) / 2.0;
        w[n - 1] - (mean + ols_slope(w) * last_x)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_slope_of_line() {
        let y: Vec<f64> = (0..30).map(|i| 5.0 + 0.25 * i as f64).collect();
        assert_relative_eq!(ols_slope(&y), 0.25, epsilon = 1e-12);
    }

    #[test]
    fn test_quadratic_residual_zero_on_parabola() {
        let y: Vec<f64> = (0..40)
            .map(|i| {
                let x = i as f64;
                3.0 - 0.5 * x + 0.02 * x * x
            })
            .collect();
        assert!(quadratic_residual_variance(&y) < 1e-18);
    }

    #[test]
    fn test_quadratic_residual_positive_on_noise() {
        let y: Vec<f64> = (0..40).map(|i| if i % 2 == 0 { 1.0 } else { -1.0 }).collect();
        assert!(quadratic_residual_variance(&y) > 0.5);
    }

    #[test]
    fn test_rolling_residual_on_line_is_zero() {
        let y: Vec<f64> = (0..50).map(|i| 100.0 + 2.0 * i as f64).collect();
        let r = rolling_residual(&y, 30);
        assert!(r[28].is_nan());
        assert!(r[49].abs() < 1e-9);
    }

    #[test]
    fn test_rolling_slope_alignment() {
        let y: Vec<f64> = (0..10).map(|i| i as f64).collect();
        let s = rolling_slope(&y, 4);
        assert!(s[2].is_nan());
        assert_relative_eq!(s[3], 1.0, epsilon = 1e-12);
    }
}
