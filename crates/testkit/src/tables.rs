//! Synthetic bar tables.

use featlab_core::{Bar, BarTable, TimestampMs};

/// 2024-01-01 00:00:00 UTC.
pub const START_MS: TimestampMs = 1_704_067_200_000;

/// One minute in milliseconds.
pub const MINUTE_MS: TimestampMs = 60_000;

/// Small deterministic generator (splitmix64), enough for fixtures.
#[derive(Debug, Clone)]
pub struct SplitMix {
    state: u64,
}

impl SplitMix {
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    pub fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    /// Uniform in `[0, 1)`.
    pub fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Uniform in `[-1, 1)`.
    pub fn next_signed(&mut self) -> f64 {
        self.next_f64() * 2.0 - 1.0
    }
}

/// Random-walk OHLCV bars, one per minute, starting at 100.
///
/// Returns are up to 0.5% per bar with an occasional 3% jump. Every bar is
/// valid (positive prices, `low <= open, close <= high`).
pub fn random_walk_bars(n: usize, seed: u64) -> Vec<Bar> {
    let mut rng = SplitMix::new(seed);
    let mut close = 100.0;
    (0..n)
        .map(|i| {
            let open = close;
            let mut ret = rng.next_signed() * 0.005;
            if rng.next_f64() < 0.02 {
                ret += 0.03 * rng.next_signed().signum();
            }
            close = open * (1.0 + ret);
            let high = open.max(close) * (1.0 + rng.next_f64() * 0.002);
            let low = open.min(close) * (1.0 - rng.next_f64() * 0.002);
            Bar {
                ts_ms: START_MS + i as TimestampMs * MINUTE_MS,
                open,
                high,
                low,
                close,
                volume: 100.0 + (rng.next_f64() * 900.0).round(),
            }
        })
        .collect()
}

/// [`random_walk_bars`] wrapped in a table.
pub fn random_walk_table(n: usize, seed: u64) -> BarTable {
    BarTable::new(random_walk_bars(n, seed)).expect("random walk bars are valid")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_walk_is_deterministic() {
        assert_eq!(random_walk_bars(50, 7), random_walk_bars(50, 7));
        assert_ne!(random_walk_bars(50, 7), random_walk_bars(50, 8));
    }

    #[test]
    fn test_random_walk_bars_are_consistent() {
        let table = random_walk_table(500, 42);
        assert_eq!(table.len(), 500);
        for bar in table.bars() {
            assert!(bar.low <= bar.open.min(bar.close));
            assert!(bar.high >= bar.open.max(bar.close));
            assert!(bar.volume >= 100.0);
        }
    }

    #[test]
    fn test_unit_interval() {
        let mut rng = SplitMix::new(1);
        for _ in 0..1000 {
            let v = rng.next_f64();
            assert!((0.0..1.0).contains(&v));
        }
    }
}
