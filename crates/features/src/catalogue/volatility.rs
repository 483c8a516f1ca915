//! Volatility family: dispersion of prices, ranges, and returns.

use super::{close_delta, close_returns, ranges, true_range};
use crate::rolling;
use crate::series::{self, safe_div};
use crate::unit::{Family, FormulaUnit};
use featlab_core::{BarField, BarTable};

pub fn units() -> Vec<FormulaUnit> {
    use Family::Volatility;
    vec![
        FormulaUnit::new("vol_range_volatility_20", Volatility, 19, "Sample std of the high-low range, 20 bars", vol_range_volatility_20),
        FormulaUnit::new("vol_mean_reversion_ratio_30", Volatility, 29, "Relative distance of close from SMA(30)", vol_mean_reversion_ratio_30),
        FormulaUnit::new("vol_vol_of_vol_50", Volatility, 68, "50-bar std of the 20-bar close std", vol_vol_of_vol_50),
        FormulaUnit::new("vol_spike_density_25", Volatility, 24, "Share of bars with a volatility spike, 25 bars", vol_spike_density_25),
        FormulaUnit::new("vol_smooth_ratio_40", Volatility, 58, "Smoothed volatility over current volatility", vol_smooth_ratio_40),
        FormulaUnit::new("vol_dynamic_range_index_30", Volatility, 29, "Spread of bar ranges over their mean, 30 bars", vol_dynamic_range_index_30),
        FormulaUnit::new("vol_cluster_density_40", Volatility, 39, "Share of bars with above-average volatility, 40 bars", vol_cluster_density_40),
        FormulaUnit::new("vol_atr_norm_14", Volatility, 26, "ATR(14) over its 14-bar median", vol_atr_norm_14),
        FormulaUnit::new("vol_hl_compression_15", Volatility, 14, "Bar range over its 15-bar median", vol_hl_compression_15),
        FormulaUnit::new("vol_iqr_20", Volatility, 19, "Interquartile range of close, 20 bars", vol_iqr_20),
        FormulaUnit::new("vol_logvol_delta_1", Volatility, 2, "Change in log absolute close change", vol_logvol_delta_1),
        FormulaUnit::new("vol_mad_ratio_30", Volatility, 58, "Close deviation from median in MAD units, 30 bars", vol_mad_ratio_30),
        FormulaUnit::new("vol_mmvd_25", Volatility, 25, "Mean minus median absolute change, 25 bars", vol_mmvd_25),
        FormulaUnit::new("vol_rrr_10", Volatility, 9, "Bar range over its 10-bar mean", vol_rrr_10),
        FormulaUnit::new("vol_rtr_pos_14", Volatility, 13, "True range position inside its 14-bar span", vol_rtr_pos_14),
        FormulaUnit::new("vol_varret_25", Volatility, 25, "Population variance of returns, 25 bars", vol_varret_25),
        FormulaUnit::new("vol_true_range_zscore_20", Volatility, 32, "Z-score of ATR(14) against 20 bars", vol_true_range_zscore_20),
        FormulaUnit::new("risk_atr_14", Volatility, 13, "Average true range, 14 bars", risk_atr_14),
        FormulaUnit::new("risk_volatility_ratio_20", Volatility, 19, "Coefficient of variation of close, 20 bars", risk_volatility_ratio_20),
        FormulaUnit::new("bollinger_open_band_width_20", Volatility, 19, "Bollinger band width of open, 20 bars", bollinger_open_band_width_20),
        FormulaUnit::new("bollinger_high_band_width_20", Volatility, 19, "Bollinger band width of high, 20 bars", bollinger_high_band_width_20),
        FormulaUnit::new("bollinger_low_band_width_20", Volatility, 19, "Bollinger band width of low, 20 bars", bollinger_low_band_width_20),
        FormulaUnit::new("bollinger_close_band_width_20", Volatility, 19, "Bollinger band width of close, 20 bars", bollinger_close_band_width_20),
        FormulaUnit::new("log_return_open", Volatility, 1, "Log return of open", log_return_open),
        FormulaUnit::new("log_return_high", Volatility, 1, "Log return of high", log_return_high),
        FormulaUnit::new("log_return_low", Volatility, 1, "Log return of low", log_return_low),
        FormulaUnit::new("log_return_open_std", Volatility, 20, "Population std of open log returns, 20 bars", log_return_open_std),
        FormulaUnit::new("log_return_high_std", Volatility, 20, "Population std of high log returns, 20 bars", log_return_high_std),
        FormulaUnit::new("log_return_low_std", Volatility, 20, "Population std of low log returns, 20 bars", log_return_low_std),
        FormulaUnit::new("kurt_ret_30", Volatility, 59, "Rolling kurtosis of returns, 30 bars", kurt_ret_30),
        FormulaUnit::new("var_skewret_30", Volatility, 59, "Rolling skewness of returns, 30 bars", var_skewret_30),
    ]
}

/// Sample std of close over 20 bars, the base volatility series.
pub(crate) fn close_volatility_20(table: &BarTable) -> Vec<f64> {
    rolling::std_dev(&table.closes(), 20, 1)
}

fn vol_range_volatility_20(table: &BarTable) -> Vec<f64> {
    rolling::std_dev(&ranges(table), 20, 1)
}

fn vol_mean_reversion_ratio_30(table: &BarTable) -> Vec<f64> {
    let close = table.closes();
    let mean = rolling::mean(&close, 30);
    series::zip_with(&close, &mean, |c, m| safe_div((c - m).abs(), m))
}

fn vol_vol_of_vol_50(table: &BarTable) -> Vec<f64> {
    rolling::std_dev(&close_volatility_20(table), 50, 1)
}

fn vol_spike_density_25(table: &BarTable) -> Vec<f64> {
    let vol = close_volatility_20(table);
    let mean = rolling::mean(&vol, 25);
    let std = rolling::std_dev(&vol, 25, 1);
    // Comparisons against a missing threshold count as no spike
    let spikes: Vec<f64> = (0..vol.len())
        .map(|i| if vol[i] > mean[i] + 2.0 * std[i] { 1.0 } else { 0.0 })
        .collect();
    rolling::mean(&spikes, 25)
}

fn vol_smooth_ratio_40(table: &BarTable) -> Vec<f64> {
    let vol = close_volatility_20(table);
    series::div(&rolling::mean(&vol, 40), &vol)
}

fn vol_dynamic_range_index_30(table: &BarTable) -> Vec<f64> {
    rolling::apply(&ranges(table), 30, |w| {
        let mean = w.iter().sum::<f64>() / w.len() as f64;
        safe_div(rolling::window_max(w) - rolling::window_min(w), mean)
    })
}

fn vol_cluster_density_40(table: &BarTable) -> Vec<f64> {
    let vol = close_volatility_20(table);
    let mean = rolling::mean(&vol, 40);
    let above: Vec<f64> = (0..vol.len())
        .map(|i| if vol[i] > mean[i] { 1.0 } else { 0.0 })
        .collect();
    rolling::mean(&above, 40)
}

fn vol_atr_norm_14(table: &BarTable) -> Vec<f64> {
    let atr = rolling::mean(&true_range(table), 14);
    series::div(&atr, &rolling::median(&atr, 14))
}

fn vol_hl_compression_15(table: &BarTable) -> Vec<f64> {
    let range = ranges(table);
    series::div(&range, &rolling::median(&range, 15))
}

fn vol_iqr_20(table: &BarTable) -> Vec<f64> {
    rolling::apply(&table.closes(), 20, |w| {
        rolling::percentile(w, 75.0) - rolling::percentile(w, 25.0)
    })
}

fn vol_logvol_delta_1(table: &BarTable) -> Vec<f64> {
    let log_move = series::map(&close_delta(table), |d| {
        let a = d.abs();
        if a == 0.0 {
            f64::NAN
        } else {
            a.ln()
        }
    });
    series::diff(&log_move, 1)
}

fn vol_mad_ratio_30(table: &BarTable) -> Vec<f64> {
    let close = table.closes();
    let median = rolling::median(&close, 30);
    let deviation = series::zip_with(&close, &median, |c, m| c - m);
    let mad = rolling::median(&series::abs(&deviation), 30);
    series::div(&deviation, &mad)
}

fn vol_mmvd_25(table: &BarTable) -> Vec<f64> {
    let moves = series::abs(&close_delta(table));
    series::zip_with(&rolling::mean(&moves, 25), &rolling::median(&moves, 25), |a, m| a - m)
}

fn vol_rrr_10(table: &BarTable) -> Vec<f64> {
    let range = ranges(table);
    series::div(&range, &rolling::mean(&range, 10))
}

fn vol_rtr_pos_14(table: &BarTable) -> Vec<f64> {
    let tr = true_range(table);
    let lo = rolling::min(&tr, 14);
    let hi = rolling::max(&tr, 14);
    (0..tr.len())
        .map(|i| safe_div(tr[i] - lo[i], hi[i] - lo[i]))
        .collect()
}

fn vol_varret_25(table: &BarTable) -> Vec<f64> {
    rolling::variance(&close_returns(table), 25, 0)
}

fn vol_true_range_zscore_20(table: &BarTable) -> Vec<f64> {
    let atr = rolling::mean(&true_range(table), 14);
    let mean = rolling::mean(&atr, 20);
    let std = rolling::std_dev(&atr, 20, 1);
    let z: Vec<f64> = (0..atr.len())
        .map(|i| safe_div(atr[i] - mean[i], std[i]))
        .collect();
    series::finite_or_nan(&z)
}

fn risk_atr_14(table: &BarTable) -> Vec<f64> {
    rolling::mean(&true_range(table), 14)
}

fn risk_volatility_ratio_20(table: &BarTable) -> Vec<f64> {
    let close = table.closes();
    series::div(&rolling::std_dev(&close, 20, 0), &rolling::mean(&close, 20))
}

/// `2 * population std / mean` of one field over 20 bars.
fn band_width(table: &BarTable, field: BarField) -> Vec<f64> {
    let x = table.column(field);
    series::zip_with(&rolling::std_dev(&x, 20, 0), &rolling::mean(&x, 20), |sd, m| 2.0 * sd / m)
}

fn bollinger_open_band_width_20(table: &BarTable) -> Vec<f64> {
    band_width(table, BarField::Open)
}

fn bollinger_high_band_width_20(table: &BarTable) -> Vec<f64> {
    band_width(table, BarField::High)
}

fn bollinger_low_band_width_20(table: &BarTable) -> Vec<f64> {
    band_width(table, BarField::Low)
}

fn bollinger_close_band_width_20(table: &BarTable) -> Vec<f64> {
    band_width(table, BarField::Close)
}

fn log_return_open(table: &BarTable) -> Vec<f64> {
    series::log_return(&table.opens())
}

fn log_return_high(table: &BarTable) -> Vec<f64> {
    series::log_return(&table.highs())
}

fn log_return_low(table: &BarTable) -> Vec<f64> {
    series::log_return(&table.lows())
}

fn log_return_open_std(table: &BarTable) -> Vec<f64> {
    rolling::std_dev(&log_return_open(table), 20, 0)
}

fn log_return_high_std(table: &BarTable) -> Vec<f64> {
    rolling::std_dev(&log_return_high(table), 20, 0)
}

fn log_return_low_std(table: &BarTable) -> Vec<f64> {
    rolling::std_dev(&log_return_low(table), 20, 0)
}

/// Rolling mean of `(r - mean)^k` divided by `std^k`, population moments.
fn standardized_moment(table: &BarTable, window: usize, k: i32) -> Vec<f64> {
    let r = close_returns(table);
    let mean = rolling::mean(&r, window);
    let std = rolling::std_dev(&r, window, 0);
    let centered: Vec<f64> = (0..r.len()).map(|i| (r[i] - mean[i]).powi(k)).collect();
    let moment = rolling::mean(&centered, window);
    (0..r.len()).map(|i| moment[i] / std[i].powi(k)).collect()
}

fn kurt_ret_30(table: &BarTable) -> Vec<f64> {
    standardized_moment(table, 30, 4)
}

fn var_skewret_30(table: &BarTable) -> Vec<f64> {
    standardized_moment(table, 30, 3)
}
