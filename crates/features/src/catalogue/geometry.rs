//! Geometry family: candle shape, position inside ranges, simple patterns.

use super::trend::up_down_sums;
use super::{close_delta, close_direction, ranges};
use crate::regression;
use crate::rolling;
use crate::series::{self, safe_div};
use crate::unit::{Family, FormulaUnit};
use featlab_core::BarTable;

pub fn units() -> Vec<FormulaUnit> {
    use Family::Geometry;
    vec![
        FormulaUnit::new("geo_body_wick_ratio", Geometry, 0, "Body size over total wick length", geo_body_wick_ratio),
        FormulaUnit::new("geo_direction_consistency_10", Geometry, 10, "Product of change signs when no bar is flat, 10 bars", geo_direction_consistency_10),
        FormulaUnit::new("geo_price_position_20", Geometry, 19, "Close position inside the 20-bar high-low span", geo_price_position_20),
        FormulaUnit::new("geo_price_reversal_flag_15", Geometry, 15, "Latest change opposes the change 14 bars earlier", geo_price_reversal_flag_15),
        FormulaUnit::new("geo_range_ratio_25", Geometry, 24, "Bar range over its 25-bar mean", geo_range_ratio_25),
        FormulaUnit::new("geo_trend_strength_balance_30", Geometry, 30, "Up moves over down moves, 30 bars", geo_trend_strength_balance_30),
        FormulaUnit::new("geo_struct_regime_score_50", Geometry, 49, "OLS slope of close, 50 bars", geo_struct_regime_score_50),
        FormulaUnit::new("pat_bwr_8", Geometry, 7, "Mean body over mean wick, 8 bars", pat_bwr_8),
        FormulaUnit::new("pat_cluster_5", Geometry, 4, "Five same-direction closes in a row", pat_cluster_5),
        FormulaUnit::new("pat_crc_18", Geometry, 17, "Bar range over its 18-bar mean", pat_crc_18),
        FormulaUnit::new("pat_engulf_strength_5", Geometry, 5, "Mean body growth ratio, 5 bars", pat_engulf_strength_5),
        FormulaUnit::new("pat_hl_bias_20", Geometry, 19, "Mean close location inside the bar, 20 bars", pat_hl_bias_20),
        FormulaUnit::new("pat_lower_shadow_pct_15", Geometry, 14, "Mean lower wick over mean range, 15 bars", pat_lower_shadow_pct_15),
        FormulaUnit::new("pat_rb_prop_20", Geometry, 19, "Mean body over mean range, 20 bars", pat_rb_prop_20),
        FormulaUnit::new("pat_upper_shadow_10", Geometry, 9, "Mean upper wick over mean body, 10 bars", pat_upper_shadow_10),
        FormulaUnit::new("pat_wick_sym_12", Geometry, 11, "Mean upper minus lower wick, 12 bars", pat_wick_sym_12),
        FormulaUnit::new("pattern_inside_bar_flag_1", Geometry, 1, "Bar range inside the previous bar", pattern_inside_bar_flag_1),
    ]
}

/// Ratio of two rolling means over the same window.
fn mean_ratio(num: &[f64], den: &[f64], window: usize) -> Vec<f64> {
    series::div(&rolling::mean(num, window), &rolling::mean(den, window))
}

fn geo_body_wick_ratio(table: &BarTable) -> Vec<f64> {
    table.map(|b| safe_div(b.body(), b.upper_wick() + b.lower_wick()))
}

fn geo_direction_consistency_10(table: &BarTable) -> Vec<f64> {
    rolling::apply(&close_delta(table), 10, |w| {
        if w.iter().all(|&d| d != 0.0) {
            w.iter().map(|&d| series::direction(d)).product()
        } else {
            0.0
        }
    })
}

fn geo_price_position_20(table: &BarTable) -> Vec<f64> {
    let lo = rolling::min(&table.lows(), 20);
    let hi = rolling::max(&table.highs(), 20);
    let close = table.closes();
    (0..close.len())
        .map(|i| safe_div(close[i] - lo[i], hi[i] - lo[i]))
        .collect()
}

fn geo_price_reversal_flag_15(table: &BarTable) -> Vec<f64> {
    rolling::apply(&close_delta(table), 15, |w| {
        if w[w.len() - 1] * w[0] < 0.0 {
            1.0
        } else {
            0.0
        }
    })
}

fn geo_range_ratio_25(table: &BarTable) -> Vec<f64> {
    let range = ranges(table);
    series::div(&range, &rolling::mean(&range, 25))
}

fn geo_trend_strength_balance_30(table: &BarTable) -> Vec<f64> {
    let (up, down) = up_down_sums(table, 30);
    series::div(&up, &down)
}

fn geo_struct_regime_score_50(table: &BarTable) -> Vec<f64> {
    regression::rolling_slope(&table.closes(), 50)
}

fn pat_bwr_8(table: &BarTable) -> Vec<f64> {
    let body = table.map(|b| b.body());
    let wick = table.map(|b| b.range() - b.body());
    mean_ratio(&body, &wick, 8)
}

fn pat_cluster_5(table: &BarTable) -> Vec<f64> {
    rolling::apply(&close_direction(table), 5, |w| {
        if w.iter().all(|&s| s == 1.0) {
            5.0
        } else if w.iter().all(|&s| s == -1.0) {
            -5.0
        } else {
            0.0
        }
    })
}

fn pat_crc_18(table: &BarTable) -> Vec<f64> {
    let range = ranges(table);
    series::div(&range, &rolling::mean(&range, 18))
}

fn pat_engulf_strength_5(table: &BarTable) -> Vec<f64> {
    let body = table.map(|b| b.body());
    let ratio = series::div(&body, &series::shift(&body, 1));
    rolling::mean(&ratio, 5)
}

fn pat_hl_bias_20(table: &BarTable) -> Vec<f64> {
    let location = table.map(|b| safe_div(b.close - b.low, b.range()));
    rolling::mean(&location, 20)
}

fn pat_lower_shadow_pct_15(table: &BarTable) -> Vec<f64> {
    mean_ratio(&table.map(|b| b.lower_wick()), &ranges(table), 15)
}

fn pat_rb_prop_20(table: &BarTable) -> Vec<f64> {
    mean_ratio(&table.map(|b| b.body()), &ranges(table), 20)
}

fn pat_upper_shadow_10(table: &BarTable) -> Vec<f64> {
    mean_ratio(&table.map(|b| b.upper_wick()), &table.map(|b| b.body()), 10)
}

fn pat_wick_sym_12(table: &BarTable) -> Vec<f64> {
    rolling::mean(&table.map(|b| b.upper_wick() - b.lower_wick()), 12)
}

fn pattern_inside_bar_flag_1(table: &BarTable) -> Vec<f64> {
    let bars = table.bars();
    (0..bars.len())
        .map(|i| match i.checked_sub(1).map(|p| &bars[p]) {
            None => f64::NAN,
            Some(prev) if bars[i].high <= prev.high && bars[i].low >= prev.low => 1.0,
            Some(_) => 0.0,
        })
        .collect()
}
