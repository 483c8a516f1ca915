//! Equal-width histograms over a window of values.

/// Histogram with equal-width bins spanning the range of the data.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    /// Bin edges, one more than the number of bins.
    edges: Vec<f64>,
    /// Observation count per bin.
    counts: Vec<usize>,
}

impl Histogram {
    /// Bin `values` into `bins` equal-width bins over `[min, max]`.
    ///
    /// A flat window is widened to `[v - 0.5, v + 0.5]`. The last bin is
    /// closed on the right so the maximum is counted. Missing values are
    /// ignored.
    pub fn equal_width(values: &[f64], bins: usize) -> Self {
        let present: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
        if bins == 0 || present.is_empty() {
            return Self {
                edges: Vec::new(),
                counts: vec![0; bins],
            };
        }

        let (mut first, mut last) = present
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
        if first == last {
            first -= 0.5;
            last += 0.5;
        }

        let step = (last - first) / bins as f64;
        let mut edges: Vec<f64> = (0..=bins).map(|i| first + i as f64 * step).collect();
        edges[bins] = last;

        let norm = bins as f64 / (last - first);
        let mut counts = vec![0usize; bins];
        for &v in &present {
            let mut idx = (((v - first) * norm) as usize).min(bins - 1);
            // Rounding in the scaled index can land one bin off
            if idx > 0 && v < edges[idx] {
                idx -= 1;
            } else if idx + 1 < bins && v >= edges[idx + 1] {
                idx += 1;
            }
            counts[idx] += 1;
        }

        Self { edges, counts }
    }

    /// Bin edges.
    pub fn edges(&self) -> &[f64] {
        &self.edges
    }

    /// Counts per bin.
    pub fn counts(&self) -> &[usize] {
        &self.counts
    }

    /// Total number of binned observations.
    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    /// Probability density per bin: count / (total * bin width).
    ///
    /// Integrates to one over the range; individual values may exceed one.
    pub fn density(&self) -> Vec<f64> {
        let total = self.total() as f64;
        if total == 0.0 {
            return vec![f64::NAN; self.counts.len()];
        }
        self.counts
            .iter()
            .zip(self.edges.windows(2))
            .map(|(&c, e)| c as f64 / (total * (e[1] - e[0])))
            .collect()
    }
}
