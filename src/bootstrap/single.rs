//! Single-predictor bootstrap of R² and slope.
//!
//! Used to describe how stable one biomarker's own model is, rather than to
//! compare two biomarkers.

use crate::bootstrap::resample::{draw_checked, run_iterations, BootstrapConfig, Resampler};
use crate::correct::empirical_interval;
use crate::data::ObservationTable;
use crate::error::{RefnormError, Result};
use crate::model::fit_columns;
use log::{debug, info};
use serde::{Deserialize, Serialize};

/// Per-iteration R² and standardized slope for one predictor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SingleBootstrap {
    pub biomarker: String,
    pub outcome: String,
    pub r_squared: Vec<f64>,
    pub coefficients: Vec<f64>,
    /// Size of the complete-case subset.
    pub nobs: usize,
}

impl SingleBootstrap {
    /// Number of iterations.
    pub fn n_iter(&self) -> usize {
        self.r_squared.len()
    }

    pub fn mean_r_squared(&self) -> f64 {
        mean(&self.r_squared)
    }

    pub fn mean_coefficient(&self) -> f64 {
        mean(&self.coefficients)
    }

    /// Empirical R² interval between two quantiles.
    pub fn r_squared_interval(&self, lower: f64, upper: f64) -> Option<(f64, f64)> {
        empirical_interval(&self.r_squared, lower, upper)
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Bootstrap one predictor's model with the configured seed.
pub fn bootstrap_single(
    table: &ObservationTable,
    predictor: &str,
    outcome: &str,
    config: &BootstrapConfig,
) -> Result<SingleBootstrap> {
    bootstrap_single_with(table, predictor, outcome, config, &config.resampler())
}

/// Single-predictor bootstrap with an explicit source of resample indices.
pub fn bootstrap_single_with<R: Resampler + ?Sized>(
    table: &ObservationTable,
    predictor: &str,
    outcome: &str,
    config: &BootstrapConfig,
    resampler: &R,
) -> Result<SingleBootstrap> {
    config.validate()?;

    let cases = table.complete_cases(&[predictor, outcome])?;
    let nobs = cases.nrows();
    if nobs < 2 {
        return Err(RefnormError::insufficient(
            predictor,
            format!("{} complete case(s), at least 2 required", nobs),
        ));
    }

    let fits = run_iterations(config, |iteration| {
        let indices = draw_checked(resampler, iteration, nobs)?;
        let boot = cases.resample(&indices)?;
        let x = boot.column(predictor)?;
        let y = boot.column(outcome)?;
        let fit = fit_columns(predictor, outcome, &x, &y)?;
        Ok((fit.r_squared, fit.slope()))
    })?;

    debug!(
        "Bootstrapped '{}' on '{}': {} iterations over {} subjects",
        predictor, outcome, config.n_iter, nobs
    );

    let (r_squared, coefficients): (Vec<f64>, Vec<f64>) = fits.into_iter().unzip();
    Ok(SingleBootstrap {
        biomarker: predictor.to_string(),
        outcome: outcome.to_string(),
        r_squared,
        coefficients,
        nobs,
    })
}

/// Bootstrap every predictor against one outcome.
///
/// The k-th predictor draws from `config.for_stream(k)`.
pub fn bootstrap_single_batch(
    table: &ObservationTable,
    predictors: &[String],
    outcome: &str,
    config: &BootstrapConfig,
) -> Result<Vec<SingleBootstrap>> {
    info!(
        "Bootstrapping {} predictor(s) on '{}' ({} iterations)",
        predictors.len(),
        outcome,
        config.n_iter
    );
    predictors
        .iter()
        .enumerate()
        .map(|(k, p)| bootstrap_single(table, p, outcome, &config.for_stream(k)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bootstrap::resample::FixedResampler;
    use approx::assert_relative_eq;

    fn linear_table(n: usize) -> ObservationTable {
        let x: Vec<Option<f64>> = (0..n).map(|i| Some(i as f64)).collect();
        let y: Vec<Option<f64>> = (0..n).map(|i| Some(2.0 * i as f64 + 1.0)).collect();
        let noisy: Vec<Option<f64>> = (0..n).map(|i| Some(((i * 7) % 5) as f64)).collect();
        ObservationTable::new((0..n).map(|i| format!("S{}", i)).collect())
            .with_column("x", x)
            .unwrap()
            .with_column("noisy", noisy)
            .unwrap()
            .with_column("y", y)
            .unwrap()
    }

    #[test]
    fn test_perfect_predictor_concentrates_at_one() {
        let table = linear_table(40);
        let config = BootstrapConfig { n_iter: 200, seed: 3, parallel: true };

        let boot = bootstrap_single(&table, "x", "y", &config).unwrap();

        assert_eq!(boot.n_iter(), 200);
        assert_eq!(boot.nobs, 40);
        assert_relative_eq!(boot.mean_r_squared(), 1.0, epsilon = 1e-9);
        let var = boot
            .r_squared
            .iter()
            .map(|r| (r - boot.mean_r_squared()).powi(2))
            .sum::<f64>()
            / boot.n_iter() as f64;
        assert!(var < 1e-18);
        assert_relative_eq!(boot.mean_coefficient(), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_fixed_resample_values() {
        let table = ObservationTable::new(vec!["S1".into(), "S2".into(), "S3".into()])
            .with_column("a", vec![Some(1.0), Some(2.0), Some(3.0)])
            .unwrap()
            .with_column("y", vec![Some(1.0), Some(3.0), Some(2.0)])
            .unwrap();
        let resampler = FixedResampler::new(vec![vec![0, 1, 2], vec![2, 1, 0]]);
        let config = BootstrapConfig { n_iter: 2, seed: 0, parallel: false };

        let boot = bootstrap_single_with(&table, "a", "y", &config, &resampler).unwrap();

        assert_relative_eq!(boot.r_squared[0], 0.25, epsilon = 1e-12);
        assert_relative_eq!(boot.r_squared[1], 0.25, epsilon = 1e-12);
        assert_relative_eq!(boot.coefficients[0], 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_batch_keeps_order() {
        let table = linear_table(25);
        let predictors = vec!["noisy".to_string(), "x".to_string()];
        let config = BootstrapConfig { n_iter: 50, seed: 9, parallel: false };

        let batch = bootstrap_single_batch(&table, &predictors, "y", &config).unwrap();

        assert_eq!(batch.len(), 2);
        assert_eq!(batch[0].biomarker, "noisy");
        assert_eq!(batch[1].biomarker, "x");
        assert!(batch[0].mean_r_squared() < batch[1].mean_r_squared());
    }
}
