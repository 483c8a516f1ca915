//! Regime family: persistence and shape of the recent return distribution.

use super::information::move_size_direction;
use super::{close_delta, close_direction};
use crate::entropy;
use crate::rolling;
use crate::series::{self, safe_div};
use crate::unit::{Family, FormulaUnit};
use featlab_core::BarTable;

pub fn units() -> Vec<FormulaUnit> {
    use Family::Regime;
    vec![
        FormulaUnit::new("reg_ewm_slope_40", Regime, 1, "Exponentially weighted regression slope of close, span 40", reg_ewm_slope_40),
        FormulaUnit::new("reg_persist_dir_10", Regime, 9, "Mean close direction, 10 bars", reg_persist_dir_10),
        FormulaUnit::new("reg_rvolent_35", Regime, 34, "Entropy of absolute-move direction states, 35 bars", reg_rvolent_35),
        FormulaUnit::new("reg_skewret_50", Regime, 50, "Skewness of log returns, 50 bars", reg_skewret_50),
        FormulaUnit::new("reg_vstate_30", Regime, 30, "Absolute change position inside its 30-bar span", reg_vstate_30),
    ]
}

fn reg_ewm_slope_40(table: &BarTable) -> Vec<f64> {
    const SPAN: usize = 40;
    let close = table.closes();
    let t: Vec<f64> = (0..close.len()).map(|i| i as f64).collect();

    let t_mean = series::ewm_span(&t, SPAN);
    let c_mean = series::ewm_span(&close, SPAN);
    let tc_mean = series::ewm_span(&series::zip_with(&t, &close, |a, b| a * b), SPAN);
    let tt_mean = series::ewm_span(&series::map(&t, |a| a * a), SPAN);

    (0..close.len())
        .map(|i| {
            let cov = tc_mean[i] - t_mean[i] * c_mean[i];
            let var = tt_mean[i] - t_mean[i] * t_mean[i];
            safe_div(cov, var)
        })
        .collect()
}

fn reg_persist_dir_10(table: &BarTable) -> Vec<f64> {
    rolling::mean(&close_direction(table), 10)
}

fn reg_rvolent_35(table: &BarTable) -> Vec<f64> {
    rolling::apply(&move_size_direction(table), 35, entropy::state_entropy_bits)
}

fn reg_skewret_50(table: &BarTable) -> Vec<f64> {
    let log_returns = series::log_return(&table.closes());
    rolling::apply(&log_returns, 50, |w| {
        let n = w.len() as f64;
        let mean = w.iter().sum::<f64>() / n;
        let sd = rolling::window_std(w, 0);
        if sd == 0.0 {
            return f64::NAN;
        }
        w.iter().map(|x| ((x - mean) / sd).powi(3)).sum::<f64>() / n
    })
}

fn reg_vstate_30(table: &BarTable) -> Vec<f64> {
    let moves = series::abs(&close_delta(table));
    let lo = rolling::min(&moves, 30);
    let hi = rolling::max(&moves, 30);
    (0..moves.len())
        .map(|i| safe_div(moves[i] - lo[i], hi[i] - lo[i]))
        .collect()
}
