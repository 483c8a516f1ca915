//! Hybrid family: products of price, volatility, and volume signals.

use super::close_delta;
use super::volatility::close_volatility_20;
use super::volume::absorption;
use crate::entropy;
use crate::rolling;
use crate::series;
use crate::unit::{Family, FormulaUnit};
use featlab_core::BarTable;

pub fn units() -> Vec<FormulaUnit> {
    use Family::Hybrid;
    vec![
        FormulaUnit::new("hybrid_vol_mom_regime_score_50", Hybrid, 68, "Mean volatility-scaled 10-bar momentum, 50 bars", hybrid_vol_mom_regime_score_50),
        FormulaUnit::new("hybrid_volume_trend_conflict_20", Hybrid, 39, "Trend times volume deviation from its overall mean", hybrid_volume_trend_conflict_20),
        FormulaUnit::new("hybrid_price_absorption_strength_25", Hybrid, 25, "Volume-weighted absolute change, 25 bars", hybrid_price_absorption_strength_25),
        FormulaUnit::new("hybrid_entropy_trend_momentum_30", Hybrid, 88, "Trend, dispersion, and trend entropy combined, 30 bars", hybrid_entropy_trend_momentum_30),
        FormulaUnit::new("hybrid_liq_volatility_interplay_20", Hybrid, 38, "Mean of close volatility times mean volume, 20 bars", hybrid_liq_volatility_interplay_20),
        FormulaUnit::new("hybrid_price_volume_momentum_15", Hybrid, 29, "Mean product of price and volume momentum, 15 bars", hybrid_price_volume_momentum_15),
    ]
}

fn hybrid_vol_mom_regime_score_50(table: &BarTable) -> Vec<f64> {
    let momentum = series::diff(&table.closes(), 10);
    let scaled = series::div(&momentum, &close_volatility_20(table));
    rolling::mean(&scaled, 50)
}

/// Mean of the present values; missing when there are none.
fn nan_mean(x: &[f64]) -> f64 {
    let (sum, n) = x
        .iter()
        .filter(|v| !v.is_nan())
        .fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if n == 0 {
        f64::NAN
    } else {
        sum / n as f64
    }
}

/// The volume baseline is the mean over the whole table, so every row
/// depends on every other row.
fn hybrid_volume_trend_conflict_20(table: &BarTable) -> Vec<f64> {
    let trend = rolling::mean(&close_delta(table), 20);
    let avg_volume = rolling::mean(&table.volumes(), 20);
    let baseline = nan_mean(&avg_volume);
    let conflict = series::zip_with(&trend, &avg_volume, |t, v| t * (v - baseline));
    rolling::mean(&conflict, 20)
}

fn hybrid_price_absorption_strength_25(table: &BarTable) -> Vec<f64> {
    absorption(table, 25)
}

fn hybrid_entropy_trend_momentum_30(table: &BarTable) -> Vec<f64> {
    let delta = close_delta(table);
    let trend = rolling::mean(&delta, 30);
    let dispersion = rolling::std_dev(&delta, 30, 1);
    let trend_entropy = rolling::apply(&trend, 30, entropy::share_entropy);
    let combined: Vec<f64> = (0..delta.len())
        .map(|i| trend[i] * dispersion[i] * trend_entropy[i])
        .collect();
    rolling::mean(&combined, 30)
}

fn hybrid_liq_volatility_interplay_20(table: &BarTable) -> Vec<f64> {
    let mean_volume = rolling::mean(&table.volumes(), 20);
    let interplay = series::zip_with(&close_volatility_20(table), &mean_volume, |s, v| s * v);
    rolling::mean(&interplay, 20)
}

fn hybrid_price_volume_momentum_15(table: &BarTable) -> Vec<f64> {
    let close = table.closes();
    let price_mom = series::pct_change(&close, 15);
    let volume_mom = series::pct_change(&table.volumes(), 15);
    let push = series::diff(&close, 15);
    let product: Vec<f64> = (0..close.len())
        .map(|i| price_mom[i] * volume_mom[i] * push[i])
        .collect();
    rolling::mean(&product, 15)
}
