//! Entropy estimators over windows of values.
//!
//! Frequency-based estimators bucket exact values, so two returns that differ
//! in the last bit land in different buckets.

use crate::histogram::Histogram;
use ordered_float::OrderedFloat;
use std::collections::BTreeMap;

/// Offset inside natural-log estimators so empty buckets stay finite.
const LOG_EPS: f64 = 1e-10;

/// Shannon entropy in bits of the positive entries of `p`.
pub fn shannon_bits(p: &[f64]) -> f64 {
    -p.iter()
        .filter(|&&v| v > 0.0)
        .map(|&v| v * v.log2())
        .sum::<f64>()
}

/// Entropy in bits of an equal-width histogram's density values.
///
/// Densities are not probabilities, so the result is not bounded by
/// `log2(bins)` and can be negative.
pub fn histogram_entropy_bits(window: &[f64], bins: usize) -> f64 {
    shannon_bits(&Histogram::equal_width(window, bins).density())
}

/// Relative frequency of every distinct value.
pub fn value_frequencies(window: &[f64]) -> BTreeMap<OrderedFloat<f64>, f64> {
    let mut counts: BTreeMap<OrderedFloat<f64>, f64> = BTreeMap::new();
    let mut total = 0.0;
    for &v in window.iter().filter(|v| !v.is_nan()) {
        *counts.entry(OrderedFloat(v)).or_insert(0.0) += 1.0;
        total += 1.0;
    }
    for p in counts.values_mut() {
        *p /= total;
    }
    counts
}

/// `-sum p ln(p + eps)` over the distinct values of a window.
pub fn category_entropy(window: &[f64]) -> f64 {
    -value_frequencies(window)
        .values()
        .map(|&p| p * (p + LOG_EPS).ln())
        .sum::<f64>()
}

/// Entropy in bits of a window of `-1 / 0 / 1` states.
pub fn state_entropy_bits(window: &[f64]) -> f64 {
    if window.is_empty() {
        return f64::NAN;
    }
    let n = window.len() as f64;
    let p: Vec<f64> = [-1.0, 0.0, 1.0]
        .iter()
        .map(|&k| window.iter().filter(|&&v| v == k).count() as f64 / n)
        .collect();
    shannon_bits(&p)
}

/// Joint distribution of value pairs, skipping pairs with a missing side.
pub fn joint_frequencies(a: &[f64], b: &[f64]) -> BTreeMap<(OrderedFloat<f64>, OrderedFloat<f64>), f64> {
    let mut counts = BTreeMap::new();
    let mut total = 0.0;
    for (&x, &y) in a.iter().zip(b) {
        if x.is_nan() || y.is_nan() {
            continue;
        }
        *counts.entry((OrderedFloat(x), OrderedFloat(y))).or_insert(0.0) += 1.0;
        total += 1.0;
    }
    for p in counts.values_mut() {
        *p /= total;
    }
    counts
}

/// `-sum p(a, b) ln(p(a, b) + eps)` over observed pairs.
pub fn joint_entropy(a: &[f64], b: &[f64]) -> f64 {
    -joint_frequencies(a, b)
        .values()
        .map(|&p| p * (p + LOG_EPS).ln())
        .sum::<f64>()
}

/// Cross entropy of the joint distribution against the marginal of `a`:
/// `-sum p(a, b) ln(q(a) + eps)`, with `q` taken over every present `a`.
pub fn cross_entropy(a: &[f64], b: &[f64]) -> f64 {
    let marginal = value_frequencies(a);
    -joint_frequencies(a, b)
        .iter()
        .map(|(&(x, _), &p)| {
            let q = marginal.get(&x).copied().unwrap_or(LOG_EPS);
            p * (q + LOG_EPS).ln()
        })
        .sum::<f64>()
}

/// `-sum (x + 1) ln(x + 1 + eps) / ln(n)` over a window of growth rates.
pub fn growth_entropy(window: &[f64]) -> f64 {
    let n = window.len() as f64;
    -window
        .iter()
        .map(|&x| (x + 1.0) * (x + 1.0 + LOG_EPS).ln())
        .sum::<f64>()
        / n.ln()
}

/// `-sum s ln(s + eps)` where `s` is each value's share of the window sum.
pub fn share_entropy(window: &[f64]) -> f64 {
    let total: f64 = window.iter().sum();
    -window
        .iter()
        .map(|&x| {
            let s = x / total;
            s * (s + LOG_EPS).ln()
        })
        .sum::<f64>()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_shannon_bits_uniform() {
        assert_relative_eq!(shannon_bits(&[0.25; 4]), 2.0, epsilon = 1e-12);
        assert_relative_eq!(shannon_bits(&[1.0, 0.0]), 0.0);
    }

    #[test]
    fn test_state_entropy() {
        assert_relative_eq!(state_entropy_bits(&[1.0, -1.0, 1.0, -1.0]), 1.0, epsilon = 1e-12);
        assert_relative_eq!(state_entropy_bits(&[0.0; 6]), 0.0);
        assert!(state_entropy_bits(&[]).is_nan());
    }

    #[test]
    fn test_category_entropy_two_values() {
        let h = category_entropy(&[1.0, 1.0, -1.0, -1.0]);
        assert_relative_eq!(h, 2.0f64.ln(), epsilon = 1e-8);
    }

    #[test]
    fn test_joint_entropy_skips_missing_pairs() {
        let a = [f64::NAN, 0.1, 0.2, 0.1];
        let b = [1.0, 2.0, 2.0, 2.0];
        let freq = joint_frequencies(&a, &b);
        assert_eq!(freq.len(), 2);
        assert_relative_eq!(freq[&(OrderedFloat(0.1), OrderedFloat(2.0))], 2.0 / 3.0);
        assert!(joint_entropy(&a, &b) > 0.0);
    }

    #[test]
    fn test_cross_entropy_uses_full_marginal() {
        // a has a value (0.3) whose pair is missing on the b side
        let a = [0.1, 0.1, 0.3];
        let b = [1.0, 2.0, f64::NAN];
        let expected = -(2.0f64 / 3.0 + 1e-10).ln();
        assert_relative_eq!(cross_entropy(&a, &b), expected, epsilon = 1e-9);
    }

    #[test]
    fn test_share_entropy_uniform() {
        let h = share_entropy(&[2.0; 5]);
        assert_relative_eq!(h, 5.0f64.ln(), epsilon = 1e-8);
    }

    #[test]
    fn test_growth_entropy_flat() {
        // Zero growth: (1) * ln(1 + eps) ~ 0
        assert!(growth_entropy(&[0.0; 10]).abs() < 1e-8);
    }
}
