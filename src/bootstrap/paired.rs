//! Paired bootstrap of the R² difference between two predictors.
//!
//! # Algorithm
//!
//! 1. Restrict the table to rows where both predictors and the outcome are present
//! 2. For each iteration draw `n` row indices with replacement
//! 3. Fit `outcome ~ first` and `outcome ~ second` on that same resample
//! 4. Record `R²(second) - R²(first)`
//!
//! Both fits of an iteration see identical rows in identical order, so the
//! recorded difference carries only the relative sampling noise between the
//! two predictors.

use crate::bootstrap::resample::{draw_checked, run_iterations, BootstrapConfig, Resampler};
use crate::data::{BootstrapDistribution, CompleteCases, ObservationTable};
use crate::error::{RefnormError, Result};
use crate::model::{fit_columns, UnivariateFit};
use log::debug;

/// The two fits of one bootstrap iteration.
#[derive(Debug, Clone)]
pub struct PairedFits {
    pub first: UnivariateFit,
    pub second: UnivariateFit,
    /// Source-table rows of the resample, in draw order.
    pub rows: Vec<usize>,
}

impl PairedFits {
    /// `R²(second) - R²(first)`.
    pub fn r_squared_difference(&self) -> f64 {
        self.second.r_squared - self.first.r_squared
    }
}

/// Fit both predictors on one resample of a complete-case subset.
pub fn paired_iteration(
    cases: &CompleteCases,
    first: &str,
    second: &str,
    outcome: &str,
    indices: &[usize],
) -> Result<PairedFits> {
    let boot = cases.resample(indices)?;
    let y = boot.column(outcome)?;

    let first_fit = fit_columns(first, outcome, &boot.column(first)?, &y)?;
    let second_fit = fit_columns(second, outcome, &boot.column(second)?, &y)?;

    Ok(PairedFits {
        first: first_fit,
        second: second_fit,
        rows: boot.row_indices().to_vec(),
    })
}

/// Bootstrap the R² difference between two predictors with the configured seed.
///
/// # Arguments
/// * `table` - Observation table
/// * `first` - Predictor whose R² is subtracted (e.g. the raw biomarker)
/// * `second` - Predictor compared against it (e.g. the normalized biomarker)
/// * `outcome` - Outcome column
/// * `config` - Iteration count, seed and parallelism
pub fn bootstrap_paired(
    table: &ObservationTable,
    first: &str,
    second: &str,
    outcome: &str,
    config: &BootstrapConfig,
) -> Result<BootstrapDistribution> {
    bootstrap_paired_with(table, first, second, outcome, config, &config.resampler())
}

/// Paired bootstrap with an explicit source of resample indices.
///
/// A failed fit in any iteration aborts the whole run.
pub fn bootstrap_paired_with<R: Resampler + ?Sized>(
    table: &ObservationTable,
    first: &str,
    second: &str,
    outcome: &str,
    config: &BootstrapConfig,
    resampler: &R,
) -> Result<BootstrapDistribution> {
    config.validate()?;

    let cases = table.complete_cases(&[first, second, outcome])?;
    let nobs = cases.nrows();
    if nobs < 2 {
        return Err(RefnormError::insufficient(
            second,
            format!("{} complete case(s) shared with '{}', at least 2 required", nobs, first),
        ));
    }

    let values = run_iterations(config, |iteration| {
        let indices = draw_checked(resampler, iteration, nobs)?;
        let fits = paired_iteration(&cases, first, second, outcome, &indices)?;
        Ok(fits.r_squared_difference())
    })?;

    debug!(
        "Bootstrapped '{}' vs '{}' on '{}': {} iterations over {} subjects",
        second, first, outcome, config.n_iter, nobs
    );

    Ok(BootstrapDistribution {
        first: first.to_string(),
        second: second.to_string(),
        outcome: outcome.to_string(),
        values,
        nobs,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bootstrap::resample::FixedResampler;
    use approx::assert_relative_eq;

    fn scenario_table() -> ObservationTable {
        ObservationTable::new(vec!["S1".into(), "S2".into(), "S3".into()])
            .with_column("a", vec![Some(1.0), Some(2.0), Some(3.0)])
            .unwrap()
            .with_column("b", vec![Some(2.0), Some(4.0), Some(6.0)])
            .unwrap()
            .with_column("y", vec![Some(1.0), Some(3.0), Some(2.0)])
            .unwrap()
    }

    fn scenario_indices() -> Vec<Vec<usize>> {
        vec![vec![0, 1, 2], vec![2, 1, 0], vec![1, 2, 0], vec![0, 0, 2]]
    }

    #[test]
    fn test_fixed_resamples_give_one_value_per_iteration() {
        let table = scenario_table();
        let resampler = FixedResampler::new(scenario_indices());
        let config = BootstrapConfig { n_iter: 4, seed: 0, parallel: false };

        let dist = bootstrap_paired_with(&table, "a", "b", "y", &config, &resampler).unwrap();

        assert_eq!(dist.values.len(), 4);
        assert_eq!(dist.nobs, 3);
        // b = 2a, so both fits explain the same variance on any shared resample
        for v in &dist.values {
            assert_relative_eq!(*v, 0.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_both_fits_use_the_same_rows() {
        let table = scenario_table();
        let cases = table.complete_cases(&["a", "b", "y"]).unwrap();
        let a = [1.0, 2.0, 3.0];
        let y = [1.0, 3.0, 2.0];

        for indices in scenario_indices() {
            let fits = paired_iteration(&cases, "a", "b", "y", &indices).unwrap();
            assert_eq!(fits.rows, indices);

            let a_boot: Vec<f64> = indices.iter().map(|&i| a[i]).collect();
            let y_boot: Vec<f64> = indices.iter().map(|&i| y[i]).collect();
            let expected = fit_columns("a", "y", &a_boot, &y_boot).unwrap();

            assert_relative_eq!(fits.first.r_squared, expected.r_squared, epsilon = 1e-12);
            assert_relative_eq!(
                fits.second.predictor_scaler.mean,
                2.0 * fits.first.predictor_scaler.mean,
                epsilon = 1e-12
            );
            assert_eq!(fits.first.outcome_scaler, fits.second.outcome_scaler);
        }
    }

    #[test]
    fn test_resample_of_one_repeated_row_is_fatal() {
        let table = scenario_table();
        let resampler = FixedResampler::new(vec![vec![0, 1, 2], vec![1, 1, 1]]);
        let config = BootstrapConfig { n_iter: 2, seed: 0, parallel: false };

        let result = bootstrap_paired_with(&table, "a", "b", "y", &config, &resampler);
        assert!(matches!(result, Err(RefnormError::InsufficientData { .. })));
    }

    #[test]
    fn test_seeded_runs_are_identical() {
        let n = 30;
        let x: Vec<Option<f64>> = (0..n).map(|i| Some(((i * 7) % 11) as f64)).collect();
        let z: Vec<Option<f64>> = (0..n).map(|i| Some(((i * 5) % 13) as f64 + 0.5)).collect();
        let y: Vec<Option<f64>> = (0..n)
            .map(|i| Some(((i * 7) % 11) as f64 + ((i * 3) % 4) as f64))
            .collect();
        let table = ObservationTable::new((0..n).map(|i| format!("S{}", i)).collect())
            .with_column("x", x)
            .unwrap()
            .with_column("z", z)
            .unwrap()
            .with_column("y", y)
            .unwrap();

        let parallel = BootstrapConfig { n_iter: 200, seed: 11, parallel: true };
        let sequential = BootstrapConfig { parallel: false, ..parallel.clone() };

        let d1 = bootstrap_paired(&table, "x", "z", "y", &parallel).unwrap();
        let d2 = bootstrap_paired(&table, "x", "z", "y", &parallel).unwrap();
        let d3 = bootstrap_paired(&table, "x", "z", "y", &sequential).unwrap();

        assert_eq!(d1, d2);
        assert_eq!(d1, d3);
        // x explains y far better than z
        assert!(d1.mean() < 0.0);
    }

    #[test]
    fn test_missing_rows_fixed_up_front() {
        let table = ObservationTable::new((0..5).map(|i| format!("S{}", i)).collect())
            .with_column("a", vec![Some(1.0), Some(2.0), None, Some(4.0), Some(5.0)])
            .unwrap()
            .with_column("b", vec![Some(1.5), Some(2.1), Some(3.3), None, Some(4.4)])
            .unwrap()
            .with_column("y", vec![Some(1.0), Some(2.5), Some(2.0), Some(4.0), Some(4.5)])
            .unwrap();
        let resampler = FixedResampler::new(vec![vec![0, 1, 2], vec![2, 0, 1]]);
        let config = BootstrapConfig { n_iter: 2, seed: 0, parallel: true };

        let dist = bootstrap_paired_with(&table, "a", "b", "y", &config, &resampler).unwrap();
        assert_eq!(dist.nobs, 3);
        assert_eq!(dist.values.len(), 2);
        // Same multiset of rows in both iterations
        assert_relative_eq!(dist.values[0], dist.values[1], epsilon = 1e-12);
    }
}
