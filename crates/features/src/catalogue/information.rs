//! Information family: entropy of returns, ranges, and directions.

use super::{close_delta, close_direction, close_returns, ranges};
use crate::entropy;
use crate::rolling;
use crate::series::{self, safe_div};
use crate::unit::{Family, FormulaUnit};
use featlab_core::BarTable;
use std::collections::BTreeMap;

pub fn units() -> Vec<FormulaUnit> {
    use Family::Information;
    vec![
        FormulaUnit::new("info_return_entropy_20", Information, 20, "Growth entropy of close returns, 20 bars", info_return_entropy_20),
        FormulaUnit::new("info_volume_entropy_20", Information, 20, "Growth entropy of volume changes, 20 bars", info_volume_entropy_20),
        FormulaUnit::new("info_range_complexity_30", Information, 29, "Share entropy of bar ranges, 30 bars", info_range_complexity_30),
        FormulaUnit::new("info_joint_entropy_20", Information, 19, "Joint entropy of price and volume changes, 20 bars", info_joint_entropy_20),
        FormulaUnit::new("info_directional_variability_25", Information, 24, "Entropy of close directions, 25 bars", info_directional_variability_25),
        FormulaUnit::new("info_return_direction_entropy_40", Information, 39, "Entropy of close directions, 40 bars", info_return_direction_entropy_40),
        FormulaUnit::new("info_cross_entropy_price_volume_30", Information, 29, "Cross entropy of price against volume changes, 30 bars", info_cross_entropy_price_volume_30),
        FormulaUnit::new("info_range_entropy_20", Information, 19, "Histogram entropy of range over close, 20 bars", info_range_entropy_20),
        FormulaUnit::new("entropy_return_30", Information, 30, "Histogram entropy of close returns, 30 bars", entropy_return_30),
        FormulaUnit::new("ent_vol_sign_50", Information, 49, "Entropy of absolute-move direction states, 50 bars", ent_vol_sign_50),
        FormulaUnit::new("entropy_hour_agg", Information, 0, "Entropy of mean returns grouped by hour of day", entropy_hour_agg),
        FormulaUnit::new("stat_entropy_directional_30", Information, 29, "Up/down entropy of close changes, 30 bars", stat_entropy_directional_30),
    ]
}

fn info_return_entropy_20(table: &BarTable) -> Vec<f64> {
    rolling::apply(&close_returns(table), 20, entropy::growth_entropy)
}

fn info_volume_entropy_20(table: &BarTable) -> Vec<f64> {
    rolling::apply(&series::pct_change(&table.volumes(), 1), 20, entropy::growth_entropy)
}

fn info_range_complexity_30(table: &BarTable) -> Vec<f64> {
    rolling::apply(&ranges(table), 30, entropy::share_entropy)
}

/// Evaluate `f` on every trailing window pair, skipping nothing but the
/// positions before the first full window. Missing pairs are left to `f`.
fn trailing_pairs(a: &[f64], b: &[f64], window: usize, f: impl Fn(&[f64], &[f64]) -> f64) -> Vec<f64> {
    let mut out = vec![f64::NAN; a.len()];
    for i in window.saturating_sub(1)..a.len() {
        let start = i + 1 - window;
        out[i] = f(&a[start..=i], &b[start..=i]);
    }
    out
}

fn price_volume_changes(table: &BarTable) -> (Vec<f64>, Vec<f64>) {
    (close_returns(table), series::pct_change(&table.volumes(), 1))
}

fn info_joint_entropy_20(table: &BarTable) -> Vec<f64> {
    let (price, volume) = price_volume_changes(table);
    trailing_pairs(&price, &volume, 20, entropy::joint_entropy)
}

fn info_directional_variability_25(table: &BarTable) -> Vec<f64> {
    rolling::apply(&close_direction(table), 25, entropy::category_entropy)
}

fn info_return_direction_entropy_40(table: &BarTable) -> Vec<f64> {
    rolling::apply(&close_direction(table), 40, entropy::category_entropy)
}

fn info_cross_entropy_price_volume_30(table: &BarTable) -> Vec<f64> {
    let (price, volume) = price_volume_changes(table);
    trailing_pairs(&price, &volume, 30, entropy::cross_entropy)
}

fn info_range_entropy_20(table: &BarTable) -> Vec<f64> {
    let relative = series::finite_or_nan(&table.map(|b| b.range() / b.close));
    rolling::apply(&relative, 20, |w| entropy::histogram_entropy_bits(w, 5))
}

fn entropy_return_30(table: &BarTable) -> Vec<f64> {
    rolling::apply(&close_returns(table), 30, |w| entropy::histogram_entropy_bits(w, 5))
}

/// Direction of the change in absolute close moves, missing treated as flat.
pub(crate) fn move_size_direction(table: &BarTable) -> Vec<f64> {
    let moves = series::abs(&close_delta(table));
    series::map(&series::diff(&moves, 1), series::direction)
}

fn ent_vol_sign_50(table: &BarTable) -> Vec<f64> {
    rolling::apply(&move_size_direction(table), 50, entropy::state_entropy_bits)
}

/// Mean return per hour of day, normalised across hours, summarised as one
/// entropy value repeated on every row.
///
/// The value depends on the whole table, so it changes whenever any bar does.
fn entropy_hour_agg(table: &BarTable) -> Vec<f64> {
    let returns = close_returns(table);

    let mut groups: BTreeMap<u32, (f64, usize)> = BTreeMap::new();
    for (bar, &r) in table.bars().iter().zip(&returns) {
        let slot = groups.entry(bar.hour().unwrap_or(0)).or_insert((0.0, 0));
        if !r.is_nan() {
            slot.0 += r;
            slot.1 += 1;
        }
    }
    let means: Vec<f64> = groups
        .values()
        .filter(|(_, n)| *n > 0)
        .map(|(sum, n)| sum / *n as f64)
        .collect();

    let lo = means.iter().copied().fold(f64::INFINITY, f64::min);
    let hi = means.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let scaled: Vec<f64> = means.iter().map(|m| (m - lo) / (hi - lo + 1e-9)).collect();
    let value = entropy::shannon_bits(&scaled);

    vec![value; table.len()]
}

fn stat_entropy_directional_30(table: &BarTable) -> Vec<f64> {
    const WINDOW: usize = 30;
    let delta = close_delta(table);
    let up = rolling::sum(&series::indicator(&delta, |d| d > 0.0), WINDOW);
    let down = rolling::sum(&series::indicator(&delta, |d| d < 0.0), WINDOW);
    // A missing change is not equal to zero, so it counts as a move
    let movers = rolling::sum(&series::indicator(&delta, |d| d != 0.0), WINDOW);

    (0..delta.len())
        .map(|i| {
            let p_up = safe_div(up[i], movers[i]);
            let p_down = safe_div(down[i], movers[i]);
            if p_up.is_nan() {
                f64::NAN
            } else {
                entropy::shannon_bits(&[p_up, p_down])
            }
        })
        .collect()
}
