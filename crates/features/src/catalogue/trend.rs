//! Trend family: slopes, channels, and moving-average distances.

use super::{close_delta, close_returns, true_range};
use crate::regression;
use crate::rolling;
use crate::series::{self, safe_div};
use crate::unit::{Family, FormulaUnit};
use featlab_core::BarTable;

pub fn units() -> Vec<FormulaUnit> {
    use Family::Trend;
    vec![
        FormulaUnit::new("dyn_trend_slope_ema_20", Trend, 1, "First difference of EMA(20) of close", dyn_trend_slope_ema_20),
        FormulaUnit::new("dyn_trend_strength_ratio_50", Trend, 50, "Sum of up moves over sum of down moves, 50 bars", dyn_trend_strength_ratio_50),
        FormulaUnit::new("dyn_trend_angle_30", Trend, 29, "Angle in degrees of the 30-bar regression slope", dyn_trend_angle_30),
        FormulaUnit::new("dyn_trend_reversal_index_40", Trend, 40, "Sum of down moves over sum of up moves, 40 bars", dyn_trend_reversal_index_40),
        FormulaUnit::new("dyn_trend_consistency_25", Trend, 24, "Share of up bars among moving bars, 25 bars", dyn_trend_consistency_25),
        FormulaUnit::new("trend_swing_efficiency_30", Trend, 30, "Gains over losses inside a 30-bar window", trend_swing_efficiency_30),
        FormulaUnit::new("trend_channel_touch_freq_50", Trend, 49, "Share of closes on the 50-bar channel edges", trend_channel_touch_freq_50),
        FormulaUnit::new("trend_nonlin_slope_var_40", Trend, 39, "Residual variance of a 40-bar quadratic fit", trend_nonlin_slope_var_40),
        FormulaUnit::new("trend_cum_return", Trend, 0, "Compounded return since the first bar", trend_cum_return),
        FormulaUnit::new("trend_dpo_30", Trend, 45, "Detrended price oscillator, 30 bars", trend_dpo_30),
        FormulaUnit::new("trend_ema_angle_20", Trend, 1, "Arctangent of the relative EMA(20) change", trend_ema_angle_20),
        FormulaUnit::new("trend_epd_26", Trend, 26, "Close minus EMA(26) in units of mean absolute change", trend_epd_26),
        FormulaUnit::new("trend_hma_slope_21", Trend, 24, "First difference of the Hull moving average (21)", trend_hma_slope_21),
        FormulaUnit::new("trend_lin_resid_30", Trend, 29, "Close residual against the 30-bar linear fit", trend_lin_resid_30),
        FormulaUnit::new("trend_mm_mid_50", Trend, 49, "Close minus the 50-bar high/low midpoint", trend_mm_mid_50),
        FormulaUnit::new("trend_pvt_slope_20", Trend, 20, "20-bar slope of price-volume trend", trend_pvt_slope_20),
        FormulaUnit::new("trend_reversal_prob_12", Trend, 12, "Normalized change between consecutive 6-bar slopes", trend_reversal_prob_12),
        FormulaUnit::new("trend_spr_30", Trend, 29, "Close over SMA(30)", trend_spr_30),
        FormulaUnit::new("trend_supertrend_flag_14_3", Trend, 14, "Supertrend direction (ATR 14, multiplier 3)", trend_supertrend_flag_14_3),
        FormulaUnit::new("trend_wclose_slope_30", Trend, 29, "30-bar slope of the weighted close", trend_wclose_slope_30),
        FormulaUnit::new("smooth_hl_mid_10", Trend, 9, "SMA(10) of the high/low midpoint", smooth_hl_mid_10),
        FormulaUnit::new("shift_close_leadlag_5", Trend, 5, "Close over close five bars back", shift_close_leadlag_5),
    ]
}

/// Sum of positive and (negated) negative close changes over `window`.
pub(crate) fn up_down_sums(table: &BarTable, window: usize) -> (Vec<f64>, Vec<f64>) {
    let delta = close_delta(table);
    let up = rolling::sum(&series::clip_lower(&delta, 0.0), window);
    let down = series::map(&rolling::sum(&series::clip_upper(&delta, 0.0), window), |v| -v);
    (up, down)
}

/// Weighted moving average with linear weights `1..=n` (latest heaviest).
fn linear_wma(x: &[f64], n: usize) -> Vec<f64> {
    let weight_sum = (n * (n + 1) / 2) as f64;
    rolling::apply(x, n, |w| {
        w.iter()
            .enumerate()
            .map(|(i, v)| (i + 1) as f64 * v)
            .sum::<f64>()
            / weight_sum
    })
}

fn dyn_trend_slope_ema_20(table: &BarTable) -> Vec<f64> {
    series::diff(&series::ewm_span(&table.closes(), 20), 1)
}

fn dyn_trend_strength_ratio_50(table: &BarTable) -> Vec<f64> {
    let (up, down) = up_down_sums(table, 50);
    series::div(&up, &down)
}

fn dyn_trend_angle_30(table: &BarTable) -> Vec<f64> {
    series::map(&regression::rolling_slope(&table.closes(), 30), |m| m.atan().to_degrees())
}

fn dyn_trend_reversal_index_40(table: &BarTable) -> Vec<f64> {
    let (up, down) = up_down_sums(table, 40);
    series::div(&down, &up)
}

fn dyn_trend_consistency_25(table: &BarTable) -> Vec<f64> {
    let delta = close_delta(table);
    let pos = rolling::sum(&series::indicator(&delta, |d| d > 0.0), 25);
    let neg = rolling::sum(&series::indicator(&delta, |d| d < 0.0), 25);
    series::zip_with(&pos, &neg, |p, n| safe_div(p, p + n))
}

fn trend_swing_efficiency_30(table: &BarTable) -> Vec<f64> {
    rolling::apply(&close_delta(table), 30, |w| {
        let gains: f64 = w.iter().filter(|&&v| v > 0.0).sum();
        let losses: f64 = w.iter().filter(|&&v| v < 0.0).sum();
        if losses != 0.0 {
            gains / -losses
        } else {
            f64::NAN
        }
    })
}

fn trend_channel_touch_freq_50(table: &BarTable) -> Vec<f64> {
    const WINDOW: usize = 50;
    let bars = table.bars();
    let mut out = vec![f64::NAN; bars.len()];
    for i in (WINDOW - 1)..bars.len() {
        let window = &bars[i + 1 - WINDOW..=i];
        let upper = window.iter().map(|b| b.high).fold(f64::NEG_INFINITY, f64::max);
        let lower = window.iter().map(|b| b.low).fold(f64::INFINITY, f64::min);
        let touches = window
            .iter()
            .filter(|b| b.close >= upper || b.close <= lower)
            .count();
        out[i] = touches as f64 / WINDOW as f64;
    }
    out
}

fn trend_nonlin_slope_var_40(table: &BarTable) -> Vec<f64> {
    rolling::apply(&table.closes(), 40, regression::quadratic_residual_variance)
}

fn trend_cum_return(table: &BarTable) -> Vec<f64> {
    let growth = series::map(&series::fill_missing(&close_returns(table), 0.0), |r| 1.0 + r);
    series::map(&series::cumprod(&growth), |g| g - 1.0)
}

fn trend_dpo_30(table: &BarTable) -> Vec<f64> {
    let close = table.closes();
    let shifted = series::shift(&rolling::mean(&close, 30), 30 / 2 + 1);
    series::zip_with(&close, &shifted, |c, s| c - s)
}

fn trend_ema_angle_20(table: &BarTable) -> Vec<f64> {
    let ema = series::ewm_span(&table.closes(), 20);
    let slope = series::diff(&ema, 1);
    let prev = series::shift(&ema, 1);
    series::zip_with(&slope, &prev, |s, p| (s / p).atan())
}

fn trend_epd_26(table: &BarTable) -> Vec<f64> {
    let close = table.closes();
    let ema = series::ewm_span(&close, 26);
    let atr_like = rolling::mean(&series::abs(&close_delta(table)), 26);
    let gap = series::zip_with(&close, &ema, |c, e| c - e);
    series::div(&gap, &atr_like)
}

fn trend_hma_slope_21(table: &BarTable) -> Vec<f64> {
    let close = table.closes();
    let wma21 = linear_wma(&close, 21);
    let wma10 = linear_wma(&close, 10);
    let fast = series::zip_with(&wma10, &wma21, |a, b| 2.0 * a - b);
    // sqrt(21) truncated
    let hma = linear_wma(&fast, 4);
    series::diff(&hma, 1)
}

fn trend_lin_resid_30(table: &BarTable) -> Vec<f64> {
    regression::rolling_residual(&table.closes(), 30)
}

fn trend_mm_mid_50(table: &BarTable) -> Vec<f64> {
    let top = rolling::max(&table.highs(), 50);
    let bottom = rolling::min(&table.lows(), 50);
    let mid = series::zip_with(&top, &bottom, |h, l| (h + l) / 2.0);
    series::zip_with(&table.closes(), &mid, |c, m| c - m)
}

fn trend_pvt_slope_20(table: &BarTable) -> Vec<f64> {
    let flow = series::zip_with(&close_returns(table), &table.volumes(), |r, v| r * v);
    regression::rolling_slope(&series::cumsum(&flow), 20)
}

fn trend_reversal_prob_12(table: &BarTable) -> Vec<f64> {
    let close = table.closes();
    let lag6 = series::shift(&close, 6);
    let lag12 = series::shift(&close, 12);
    (0..close.len())
        .map(|i| {
            let s1 = close[i] - lag6[i];
            let s2 = lag6[i] - lag12[i];
            safe_div(s1 - s2, s1.abs() + s2.abs())
        })
        .collect()
}

fn trend_spr_30(table: &BarTable) -> Vec<f64> {
    let close = table.closes();
    series::div(&close, &rolling::mean(&close, 30))
}

fn trend_supertrend_flag_14_3(table: &BarTable) -> Vec<f64> {
    let atr = rolling::mean(&true_range(table), 14);
    let mid = table.map(|b| (b.high + b.low) / 2.0);
    let upper = series::shift(&series::zip_with(&mid, &atr, |m, a| m + 3.0 * a), 1);
    let lower = series::shift(&series::zip_with(&mid, &atr, |m, a| m - 3.0 * a), 1);

    let flags: Vec<f64> = table
        .bars()
        .iter()
        .enumerate()
        .map(|(i, b)| {
            if b.close > upper[i] {
                1.0
            } else if b.close < lower[i] {
                -1.0
            } else {
                f64::NAN
            }
        })
        .collect();
    series::ffill(&flags)
}

fn trend_wclose_slope_30(table: &BarTable) -> Vec<f64> {
    let weighted = table.map(|b| (b.high + b.low + 2.0 * b.close) / 4.0);
    regression::rolling_slope(&weighted, 30)
}

fn smooth_hl_mid_10(table: &BarTable) -> Vec<f64> {
    rolling::mean(&table.map(|b| (b.high + b.low) / 2.0), 10)
}

fn shift_close_leadlag_5(table: &BarTable) -> Vec<f64> {
    let close = table.closes();
    series::zip_with(&close, &series::shift(&close, 5), |c, p| c / p)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalogue::test_support::make_table;
    use approx::assert_relative_eq;
    use featlab_core::Bar;

    fn linear_table(n: usize, slope: f64) -> BarTable {
        let bars = (0..n)
            .map(|i| {
                let close = 100.0 + slope * i as f64;
                Bar {
                    ts_ms: i as i64 * 300_000,
                    open: close,
                    high: close + 1.0,
                    low: close - 1.0,
                    close,
                    volume: 10.0,
                }
            })
            .collect();
        BarTable::new(bars).unwrap()
    }

    #[test]
    fn test_angle_of_unit_slope() {
        let out = dyn_trend_angle_30(&linear_table(40, 1.0));
        assert!(out[28].is_nan());
        assert_relative_eq!(out[39], 45.0, epsilon = 1e-9);
    }

    #[test]
    fn test_strength_ratio_all_up_is_missing() {
        // No down moves => zero denominator
        let out = dyn_trend_strength_ratio_50(&linear_table(60, 0.5));
        assert!(out[59].is_nan());
    }

    #[test]
    fn test_consistency_all_up() {
        let out = dyn_trend_consistency_25(&linear_table(30, 0.5));
        assert!(out[23].is_nan());
        assert_relative_eq!(out[29], 1.0);
    }

    #[test]
    fn test_cum_return_compounds() {
        let table = linear_table(5, 10.0);
        let out = trend_cum_return(&table);
        assert_eq!(out[0], 0.0);
        assert_relative_eq!(out[4], 140.0 / 100.0 - 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_dpo_offset() {
        let out = trend_dpo_30(&make_table(60));
        assert!(out[44].is_nan());
        assert!(!out[45].is_nan());
    }

    #[test]
    fn test_hma_warmup() {
        let out = trend_hma_slope_21(&make_table(40));
        assert!(out[23].is_nan());
        assert!(!out[24].is_nan());
    }

    #[test]
    fn test_lin_resid_zero_on_line() {
        let out = trend_lin_resid_30(&linear_table(40, 2.0));
        assert!(out[39].abs() < 1e-9);
    }

    #[test]
    fn test_supertrend_flags_breakout() {
        let out = trend_supertrend_flag_14_3(&make_table(120));
        // The jump at bar 50 clears three ATRs above the prior midpoint
        assert_eq!(out[50], 1.0);
        assert!(out.iter().all(|v| v.is_nan() || *v == 1.0 || *v == -1.0));
    }

    #[test]
    fn test_channel_touch_bounds() {
        let out = trend_channel_touch_freq_50(&make_table(80));
        for v in &out[49..] {
            assert!((0.0..=1.0).contains(v));
        }
    }
}
