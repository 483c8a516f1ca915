//! Momentum family: rates of change, oscillators, and push measures.

use super::{close_delta, close_direction, close_returns, true_range};
use crate::entropy;
use crate::rolling;
use crate::series::{self, safe_div};
use crate::unit::{Family, FormulaUnit};
use featlab_core::BarTable;

pub fn units() -> Vec<FormulaUnit> {
    use Family::Momentum;
    vec![
        FormulaUnit::new("mom_impulse_strength_10", Momentum, 10, "10-bar change over 10-bar close std", mom_impulse_strength_10),
        FormulaUnit::new("mom_energy_osc_20", Momentum, 20, "Close change over 20-bar sum of squared changes", mom_energy_osc_20),
        FormulaUnit::new("mom_vol_weighted_roc_15", Momentum, 15, "15-bar return scaled by relative volume", mom_vol_weighted_roc_15),
        FormulaUnit::new("mom_inertia_30", Momentum, 30, "Sum of squared close changes, 30 bars", mom_inertia_30),
        FormulaUnit::new("mom_cumulative_push_20", Momentum, 20, "Net close change over 20 bars", mom_cumulative_push_20),
        FormulaUnit::new("mom_signed_energy_20", Momentum, 20, "Squared-change energy signed by the latest move", mom_signed_energy_20),
        FormulaUnit::new("mom_persistence_index_25", Momentum, 25, "Share of up moves, 25 bars", mom_persistence_index_25),
        FormulaUnit::new("mom_entropy_weighted_roc_15", Momentum, 29, "15-bar return weighted by its growth entropy", mom_entropy_weighted_roc_15),
        FormulaUnit::new("mom_ema_accel_14", Momentum, 0, "EMA(7) minus EMA(14) of close", mom_ema_accel_14),
        FormulaUnit::new("mom_ntrm_16", Momentum, 16, "True range change over its 16-bar mean", mom_ntrm_16),
        FormulaUnit::new("mom_rdi_40", Momentum, 40, "40-bar drift over mean absolute change", mom_rdi_40),
        FormulaUnit::new("mom_ret_accel_12", Momentum, 1, "EMA(6) minus EMA(12) of returns", mom_ret_accel_12),
        FormulaUnit::new("mom_ret_zscore_20", Momentum, 20, "Return z-score against 20 bars", mom_ret_zscore_20),
        FormulaUnit::new("mom_signflip_12", Momentum, 11, "Direction changes within 12 bars", mom_signflip_12),
        FormulaUnit::new("mom_williams_r_14", Momentum, 13, "Williams %R, 14 bars", mom_williams_r_14),
        FormulaUnit::new("osc_rsi_slope_14", Momentum, 15, "First difference of Wilder RSI(14)", osc_rsi_slope_14),
        FormulaUnit::new("mom_balance_of_power_14", Momentum, 13, "Mean balance of power, 14 bars", mom_balance_of_power_14),
        FormulaUnit::new("speed_close_zscore_20", Momentum, 19, "Close z-score against 20 bars", speed_close_zscore_20),
    ]
}

fn sum_of_squares(w: &[f64]) -> f64 {
    w.iter().map(|x| x * x).sum()
}

fn mom_impulse_strength_10(table: &BarTable) -> Vec<f64> {
    let close = table.closes();
    series::div(&series::diff(&close, 10), &rolling::std_dev(&close, 10, 1))
}

fn mom_energy_osc_20(table: &BarTable) -> Vec<f64> {
    let delta = close_delta(table);
    series::div(&delta, &rolling::apply(&delta, 20, sum_of_squares))
}

fn mom_vol_weighted_roc_15(table: &BarTable) -> Vec<f64> {
    let volume = table.volumes();
    let weight = series::zip_with(&volume, &rolling::mean(&volume, 15), |v, m| v / m);
    series::zip_with(&series::pct_change(&table.closes(), 15), &weight, |r, w| r * w)
}

fn mom_inertia_30(table: &BarTable) -> Vec<f64> {
    rolling::apply(&close_delta(table), 30, sum_of_squares)
}

fn mom_cumulative_push_20(table: &BarTable) -> Vec<f64> {
    rolling::sum(&close_delta(table), 20)
}

fn mom_signed_energy_20(table: &BarTable) -> Vec<f64> {
    rolling::apply(&close_delta(table), 20, |w| {
        sum_of_squares(w) * series::direction(w[w.len() - 1])
    })
}

fn mom_persistence_index_25(table: &BarTable) -> Vec<f64> {
    rolling::apply(&close_delta(table), 25, |w| {
        w.iter().filter(|&&v| v > 0.0).count() as f64 / 25.0
    })
}

fn mom_entropy_weighted_roc_15(table: &BarTable) -> Vec<f64> {
    let roc = series::pct_change(&table.closes(), 15);
    let weight = rolling::apply(&roc, 15, entropy::growth_entropy);
    series::zip_with(&roc, &weight, |r, e| r * e)
}

fn mom_ema_accel_14(table: &BarTable) -> Vec<f64> {
    let close = table.closes();
    series::zip_with(&series::ewm_span(&close, 7), &series::ewm_span(&close, 14), |f, s| f - s)
}

fn mom_ntrm_16(table: &BarTable) -> Vec<f64> {
    let tr = true_range(table);
    series::div(&series::diff(&tr, 1), &rolling::mean(&tr, 16))
}

fn mom_rdi_40(table: &BarTable) -> Vec<f64> {
    let close = table.closes();
    let atr_like = rolling::mean(&series::abs(&close_delta(table)), 40);
    series::div(&series::diff(&close, 40), &atr_like)
}

fn mom_ret_accel_12(table: &BarTable) -> Vec<f64> {
    let returns = close_returns(table);
    series::zip_with(&series::ewm_span(&returns, 6), &series::ewm_span(&returns, 12), |f, s| f - s)
}

fn mom_ret_zscore_20(table: &BarTable) -> Vec<f64> {
    zscore(&close_returns(table), 20)
}

/// `(x - mean) / population std` over a rolling window.
pub(crate) fn zscore(x: &[f64], window: usize) -> Vec<f64> {
    let mean = rolling::mean(x, window);
    let std = rolling::std_dev(x, window, 0);
    (0..x.len())
        .map(|i| safe_div(x[i] - mean[i], std[i]))
        .collect()
}

fn mom_signflip_12(table: &BarTable) -> Vec<f64> {
    let direction = close_direction(table);
    // The first bar has nothing to compare against and counts as a flip
    let flips: Vec<f64> = (0..direction.len())
        .map(|i| {
            if i == 0 || direction[i] != direction[i - 1] {
                1.0
            } else {
                0.0
            }
        })
        .collect();
    rolling::sum(&flips, 12)
}

fn mom_williams_r_14(table: &BarTable) -> Vec<f64> {
    let top = rolling::max(&table.highs(), 14);
    let bottom = rolling::min(&table.lows(), 14);
    let close = table.closes();
    (0..close.len())
        .map(|i| -100.0 * safe_div(top[i] - close[i], top[i] - bottom[i]))
        .collect()
}

fn osc_rsi_slope_14(table: &BarTable) -> Vec<f64> {
    const PERIOD: usize = 14;
    let delta = close_delta(table);
    let up = series::clip_lower(&delta, 0.0);
    let down = series::map(&series::clip_upper(&delta, 0.0), |v| -v);
    let alpha = 1.0 / PERIOD as f64;
    let gain = series::ewm(&up, alpha, PERIOD);
    let loss = series::ewm(&down, alpha, PERIOD);
    let rsi = series::map(&series::div(&gain, &loss), |rs| 100.0 - 100.0 / (1.0 + rs));
    series::diff(&rsi, 1)
}

fn mom_balance_of_power_14(table: &BarTable) -> Vec<f64> {
    let raw = table.map(|b| safe_div(b.close - b.open, b.range()));
    rolling::mean(&raw, 14)
}

fn speed_close_zscore_20(table: &BarTable) -> Vec<f64> {
    zscore(&table.closes(), 20)
}
