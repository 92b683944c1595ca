//! Empirical p-values and batch-wide FDR annotation of comparisons.
//!
//! # Algorithm
//!
//! For every comparison row in every result table:
//!
//! 1. p = min(fraction of R² differences < 0, fraction > 0)
//! 2. p_floor = max(p, 1 / n_iter)
//! 3. BH correction over all p_floor values of all tables jointly
//!
//! The family is the whole batch of comparisons across outcomes, not one
//! outcome at a time.

use crate::correct::bh::{correct_bh, BhCorrected};
use crate::data::{ResultTable, SignificanceAnnotation, SignificanceTier};
use crate::error::{RefnormError, Result};
use log::info;

/// Lower quantile of the reported interval.
pub const INTERVAL_LOWER: f64 = 0.05;
/// Upper quantile of the reported interval.
pub const INTERVAL_UPPER: f64 = 0.95;

/// Two-sided empirical p-value of a bootstrap distribution of differences.
///
/// Zero differences count toward neither tail. Returns NaN for an empty slice.
pub fn empirical_p_value(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    let n = values.len() as f64;
    let below = values.iter().filter(|&&v| v < 0.0).count() as f64;
    let above = values.iter().filter(|&&v| v > 0.0).count() as f64;
    (below / n).min(above / n)
}

/// Smallest p-value resolvable with `n_iter` resamples.
pub fn p_value_floor(p_value: f64, n_iter: usize) -> f64 {
    p_value.max(1.0 / n_iter as f64)
}

/// Empirical interval: the sorted values at positions `floor(q * n)`.
///
/// Positions are clamped to the last element. `None` for an empty slice.
pub fn empirical_interval(values: &[f64], lower: f64, upper: f64) -> Option<(f64, f64)> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let n = sorted.len();
    let at = |q: f64| sorted[((q * n as f64).floor() as usize).min(n - 1)];
    Some((at(lower), at(upper)))
}

struct Pending {
    table: usize,
    row: usize,
    p_value: f64,
    p_value_floor: f64,
    mean_difference: f64,
    lower: f64,
    upper: f64,
}

/// Annotate every comparison row of every table with its significance.
///
/// Rows without a comparison record are left unannotated.
///
/// # Returns
/// The BH correction over the whole batch, with ids `outcome:biomarker`.
pub fn annotate_significance(tables: &mut [ResultTable]) -> Result<BhCorrected> {
    let mut pending = Vec::new();
    let mut ids = Vec::new();

    for (t, table) in tables.iter().enumerate() {
        for (r, row) in table.rows.iter().enumerate() {
            let Some(comparison) = row.comparison.as_ref() else {
                continue;
            };
            let values = &comparison.distribution.values;
            let (lower, upper) = empirical_interval(values, INTERVAL_LOWER, INTERVAL_UPPER)
                .ok_or_else(|| {
                    RefnormError::EmptyData(format!(
                        "Bootstrap distribution for '{}' ({}) has no iterations",
                        comparison.biomarker, table.outcome
                    ))
                })?;

            let p_value = empirical_p_value(values);
            pending.push(Pending {
                table: t,
                row: r,
                p_value,
                p_value_floor: p_value_floor(p_value, values.len()),
                mean_difference: comparison.distribution.mean(),
                lower,
                upper,
            });
            ids.push(format!("{}:{}", table.outcome, comparison.biomarker));
        }
    }

    let floors: Vec<f64> = pending.iter().map(|p| p.p_value_floor).collect();
    let bh = correct_bh(&floors, &ids);

    for (p, &q) in pending.iter().zip(&bh.q_values) {
        tables[p.table].rows[p.row].significance = Some(SignificanceAnnotation {
            mean_difference: p.mean_difference,
            lower: p.lower,
            upper: p.upper,
            p_value: p.p_value,
            p_value_floor: p.p_value_floor,
            p_value_fdr: q,
            tier: SignificanceTier::from_fdr(q),
        });
    }

    info!(
        "Annotated {} comparison(s) across {} outcome(s); {} with FDR p < 0.05",
        bh.n_tests,
        tables.len(),
        bh.n_significant(0.05)
    );

    Ok(bh)
}
