//! Volume and liquidity family.

use super::{close_delta, signed_volume};
use super::momentum::zscore;
use super::volatility::close_volatility_20;
use crate::rolling;
use crate::series::{self, safe_div};
use crate::unit::{Family, FormulaUnit};
use featlab_core::BarTable;

pub fn units() -> Vec<FormulaUnit> {
    use Family::Volume;
    vec![
        FormulaUnit::new("liq_depth_ratio_15", Volume, 14, "Mean volume per unit of bar range, 15 bars", liq_depth_ratio_15),
        FormulaUnit::new("liq_volatility_corr_20", Volume, 38, "Correlation of close volatility and mean volume", liq_volatility_corr_20),
        FormulaUnit::new("liq_pressure_index_25", Volume, 24, "Signed volume share, 25 bars", liq_pressure_index_25),
        FormulaUnit::new("liq_absorption_ratio_30", Volume, 30, "Volume-weighted absolute change, 30 bars", liq_absorption_ratio_30),
        FormulaUnit::new("liq_turnover_rate_20", Volume, 19, "Volume over its 20-bar mean", liq_turnover_rate_20),
        FormulaUnit::new("liq_flow_balance_20", Volume, 19, "Net signed volume, 20 bars", liq_flow_balance_20),
        FormulaUnit::new("liq_spike_persistence_15", Volume, 14, "Share of volume-change spikes, 15 bars", liq_spike_persistence_15),
        FormulaUnit::new("flow_vol_sma_ratio_20", Volume, 19, "Volume over SMA(20) of volume", flow_vol_sma_ratio_20),
        FormulaUnit::new("flow_volatility_volume_ratio_20", Volume, 19, "Coefficient of variation of volume, 20 bars", flow_volatility_volume_ratio_20),
        FormulaUnit::new("press_price_volume_impact", Volume, 1, "Absolute close change times volume", press_price_volume_impact),
        FormulaUnit::new("sign_volcorr_30", Volume, 29, "Correlation of volume and return sign, 30 bars", sign_volcorr_30),
        FormulaUnit::new("vol_rel_volume_10_30", Volume, 29, "Mean volume 10 bars over 30 bars", vol_rel_volume_10_30),
        FormulaUnit::new("vol_vcr_15", Volume, 14, "Volume over its 15-bar maximum", vol_vcr_15),
        FormulaUnit::new("vol_vmo_14", Volume, 0, "EMA(6) minus EMA(14) of volume", vol_vmo_14),
        FormulaUnit::new("vol_vp_corr_20", Volume, 20, "Correlation of close change and volume, 20 bars", vol_vp_corr_20),
        FormulaUnit::new("vol_vroc_20", Volume, 20, "20-bar rate of change of volume", vol_vroc_20),
        FormulaUnit::new("vol_vsi_20", Volume, 19, "Volume z-score against 20 bars", vol_vsi_20),
        FormulaUnit::new("volu_accel_10", Volume, 2, "Second difference of volume", volu_accel_10),
        FormulaUnit::new("vol_volume_surge_ratio_5", Volume, 4, "Volume over its 5-bar median", vol_volume_surge_ratio_5),
    ]
}

fn liq_depth_ratio_15(table: &BarTable) -> Vec<f64> {
    let mean_volume = rolling::mean(&table.volumes(), 15);
    series::div(&mean_volume, &super::ranges(table))
}

fn liq_volatility_corr_20(table: &BarTable) -> Vec<f64> {
    let mean_volume = rolling::mean(&table.volumes(), 20);
    rolling::corr(&close_volatility_20(table), &mean_volume, 20)
}

fn liq_pressure_index_25(table: &BarTable) -> Vec<f64> {
    let net = rolling::sum(&signed_volume(table), 25);
    series::div(&net, &rolling::sum(&table.volumes(), 25))
}

/// `sum(|dc| * v) / sum(v)` over `window` bars.
pub(crate) fn absorption(table: &BarTable, window: usize) -> Vec<f64> {
    let volume = table.volumes();
    let moved = series::zip_with(&series::abs(&close_delta(table)), &volume, |d, v| d * v);
    series::div(&rolling::sum(&moved, window), &rolling::sum(&volume, window))
}

fn liq_absorption_ratio_30(table: &BarTable) -> Vec<f64> {
    absorption(table, 30)
}

fn liq_turnover_rate_20(table: &BarTable) -> Vec<f64> {
    let volume = table.volumes();
    series::zip_with(&volume, &rolling::mean(&volume, 20), |v, m| v / m)
}

fn liq_flow_balance_20(table: &BarTable) -> Vec<f64> {
    rolling::sum(&signed_volume(table), 20)
}

fn liq_spike_persistence_15(table: &BarTable) -> Vec<f64> {
    let change = series::pct_change(&table.volumes(), 1);
    let mean = rolling::mean(&change, 15);
    let std = rolling::std_dev(&change, 15, 1);
    let spikes: Vec<f64> = (0..change.len())
        .map(|i| if change[i] > mean[i] + 2.0 * std[i] { 1.0 } else { 0.0 })
        .collect();
    rolling::mean(&spikes, 15)
}

fn flow_vol_sma_ratio_20(table: &BarTable) -> Vec<f64> {
    let volume = table.volumes();
    series::div(&volume, &rolling::mean(&volume, 20))
}

fn flow_volatility_volume_ratio_20(table: &BarTable) -> Vec<f64> {
    let volume = table.volumes();
    series::div(&rolling::std_dev(&volume, 20, 0), &rolling::mean(&volume, 20))
}

fn press_price_volume_impact(table: &BarTable) -> Vec<f64> {
    series::zip_with(&series::abs(&close_delta(table)), &table.volumes(), |d, v| d * v)
}

fn sign_volcorr_30(table: &BarTable) -> Vec<f64> {
    let returns = series::fill_missing(&series::pct_change(&table.closes(), 1), 0.0);
    let sign = series::map(&returns, series::direction);
    rolling::corr(&table.volumes(), &sign, 30)
}

fn vol_rel_volume_10_30(table: &BarTable) -> Vec<f64> {
    let volume = table.volumes();
    series::div(&rolling::mean(&volume, 10), &rolling::mean(&volume, 30))
}

fn vol_vcr_15(table: &BarTable) -> Vec<f64> {
    let volume = table.volumes();
    series::div(&volume, &rolling::max(&volume, 15))
}

fn vol_vmo_14(table: &BarTable) -> Vec<f64> {
    let volume = table.volumes();
    series::zip_with(&series::ewm_span(&volume, 6), &series::ewm_span(&volume, 14), |f, s| f - s)
}

fn vol_vp_corr_20(table: &BarTable) -> Vec<f64> {
    rolling::corr(&close_delta(table), &table.volumes(), 20)
}

fn vol_vroc_20(table: &BarTable) -> Vec<f64> {
    let volume = table.volumes();
    let past = series::shift(&volume, 20);
    (0..volume.len())
        .map(|i| safe_div(volume[i] - past[i], past[i]))
        .collect()
}

fn vol_vsi_20(table: &BarTable) -> Vec<f64> {
    zscore(&table.volumes(), 20)
}

fn volu_accel_10(table: &BarTable) -> Vec<f64> {
    series::diff(&series::diff(&table.volumes(), 1), 1)
}

fn vol_volume_surge_ratio_5(table: &BarTable) -> Vec<f64> {
    let volume = table.volumes();
    series::finite_or_nan(&series::div(&volume, &rolling::median(&volume, 5)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalogue::test_support::make_table;
    use approx::assert_relative_eq;
    use featlab_core::Bar;

    fn table_from_volumes(volumes: &[f64]) -> BarTable {
        let bars = volumes
            .iter()
            .enumerate()
            .map(|(i, &v)| Bar {
                ts_ms: i as i64 * 60_000,
                open: 100.0,
                high: 101.0,
                low: 99.0,
                close: 100.0 + (i % 3) as f64,
                volume: v,
            })
            .collect();
        BarTable::new(bars).unwrap()
    }

    #[test]
    fn test_vcr_at_maximum_is_one() {
        let volumes: Vec<f64> = (1..=20).map(|v| v as f64).collect();
        let out = vol_vcr_15(&table_from_volumes(&volumes));
        assert!(out[13].is_nan());
        assert_relative_eq!(out[19], 1.0);
    }

    #[test]
    fn test_volume_accel() {
        let out = volu_accel_10(&table_from_volumes(&[1.0, 2.0, 4.0, 8.0]));
        assert!(out[1].is_nan());
        assert_relative_eq!(out[2], 1.0);
        assert_relative_eq!(out[3], 2.0);
    }

    #[test]
    fn test_pressure_index_bounds() {
        let out = liq_pressure_index_25(&make_table(100));
        for v in out.iter().filter(|v| !v.is_nan()) {
            assert!((-1.0..=1.0).contains(v));
        }
    }

    #[test]
    fn test_vroc_warmup() {
        let out = vol_vroc_20(&make_table(30));
        assert!(out[19].is_nan());
        assert!(!out[20].is_nan());
    }

    #[test]
    fn test_sign_volcorr_defined_from_first_row() {
        // Missing returns are filled as flat, so the first window is complete
        let out = sign_volcorr_30(&make_table(40));
        assert!(out[28].is_nan());
        assert!(!out[29].is_nan());
    }
}
