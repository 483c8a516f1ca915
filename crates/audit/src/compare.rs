//! Row-by-row comparison of original and perturbed outputs.

/// First row, excluding the last, where the two series disagree.
///
/// A row disagrees when exactly one side is missing, or when both are present,
/// unequal, and further apart than `tolerance`. Rows missing on both sides
/// agree. Equal infinities agree.
pub fn first_divergence(original: &[f64], perturbed: &[f64], tolerance: f64) -> Option<usize> {
    let checked = original.len().min(perturbed.len()).saturating_sub(1);
    (0..checked).find(|&i| diverges(original[i], perturbed[i], tolerance))
}

#[inline]
fn diverges(a: f64, b: f64, tolerance: f64) -> bool {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => false,
        (true, false) | (false, true) => true,
        (false, false) => a != b && (a - b).abs() > tolerance,
    }
}
