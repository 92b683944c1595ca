//! Univariate linear regression on standardized variables.
//!
//! The predictor and outcome are standardized over the rows used in the fit,
//! then the outcome is regressed on the predictor with an intercept by OLS.
//! On this scale the slope equals the Pearson correlation and R² its square.

use crate::data::{ObservationTable, RegressionResult};
use crate::error::{RefnormError, Result};
use crate::normalize::{standardize_pair, Standardizer};
use nalgebra::{DMatrix, DVector};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// A fitted `outcome ~ predictor` model on the standardized scale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnivariateFit {
    pub predictor: String,
    pub outcome: String,
    /// Intercept and slope.
    pub coefficients: Vec<f64>,
    /// Standard errors of the coefficients.
    pub std_errors: Vec<f64>,
    #[serde(skip)]
    pub residuals: Vec<f64>,
    /// Residual standard error.
    pub sigma: f64,
    pub r_squared: f64,
    pub df_residual: usize,
    pub nobs: usize,
    pub predictor_scaler: Standardizer,
    pub outcome_scaler: Standardizer,
}

impl UnivariateFit {
    pub fn intercept(&self) -> f64 {
        self.coefficients[0]
    }

    /// Standardized slope (the reported coefficient).
    pub fn slope(&self) -> f64 {
        self.coefficients[1]
    }

    /// t-statistic for a coefficient; `None` when the standard error is unusable.
    pub fn t_statistic(&self, index: usize) -> Option<f64> {
        let coef = self.coefficients.get(index)?;
        let se = self.std_errors.get(index)?;
        if *se > 0.0 {
            Some(coef / se)
        } else {
            None
        }
    }

    /// Predict the outcome on its original scale from raw predictor values.
    pub fn predict(&self, predictor: &[f64]) -> Vec<f64> {
        let z = self.predictor_scaler.transform(predictor);
        let fitted: Vec<f64> = z
            .iter()
            .map(|x| self.intercept() + self.slope() * x)
            .collect();
        self.outcome_scaler.inverse_transform(&fitted)
    }
}

/// Fit `outcome ~ predictor` on two aligned columns with no missing values.
pub fn fit_columns(predictor: &str, outcome: &str, x: &[f64], y: &[f64]) -> Result<UnivariateFit> {
    let pair = standardize_pair(predictor, x, outcome, y)?;
    let n_samples = pair.x.len();

    let design = DMatrix::from_fn(n_samples, 2, |i, j| if j == 0 { 1.0 } else { pair.x[i] });
    let xtx = design.transpose() * &design;
    let xtx_inv = xtx.try_inverse().ok_or_else(|| {
        RefnormError::insufficient(predictor, "design matrix is singular (X'X not invertible)")
    })?;

    let y_vec = DVector::from_column_slice(&pair.y);

    // beta = (X'X)^-1 X'y
    let beta = &xtx_inv * (design.transpose() * &y_vec);
    let coefficients: Vec<f64> = beta.iter().cloned().collect();

    let residuals_vec = &y_vec - &design * &beta;
    let residuals: Vec<f64> = residuals_vec.iter().cloned().collect();
    let rss: f64 = residuals.iter().map(|e| e * e).sum();

    let df_residual = n_samples.saturating_sub(2);
    let sigma = if df_residual > 0 {
        (rss / df_residual as f64).sqrt()
    } else {
        f64::NAN
    };

    let std_errors: Vec<f64> = (0..2).map(|j| sigma * xtx_inv[(j, j)].sqrt()).collect();

    // Standardized outcome: mean 0, so TSS is the plain sum of squares.
    let tss: f64 = pair.y.iter().map(|v| v * v).sum();
    let r_squared = 1.0 - rss / tss;
    if !r_squared.is_finite() {
        return Err(RefnormError::Numerical(format!(
            "Non-finite R² fitting '{}' on '{}'",
            outcome, predictor
        )));
    }

    Ok(UnivariateFit {
        predictor: predictor.to_string(),
        outcome: outcome.to_string(),
        coefficients,
        std_errors,
        residuals,
        sigma,
        r_squared,
        df_residual,
        nobs: n_samples,
        predictor_scaler: pair.x_scaler,
        outcome_scaler: pair.y_scaler,
    })
}

/// Fit a univariate model on the rows of a table where the inputs are present.
///
/// # Arguments
/// * `table` - Observation table
/// * `predictor` - Predictor column
/// * `outcome` - Outcome column
/// * `companion` - Optional column whose missingness also excludes a row, so
///   that different predictors can be fitted on the same subject pool
///
/// # Returns
/// RegressionResult with R², standardized slope and observation count.
pub fn fit_univariate(
    table: &ObservationTable,
    predictor: &str,
    outcome: &str,
    companion: Option<&str>,
) -> Result<RegressionResult> {
    let mut names = vec![predictor, outcome];
    if let Some(c) = companion {
        if !names.contains(&c) {
            names.push(c);
        }
    }

    let cases = table.complete_cases(&names)?;
    let x = cases.column(predictor)?;
    let y = cases.column(outcome)?;
    let model = fit_columns(predictor, outcome, &x, &y)?;

    Ok(RegressionResult {
        biomarker: predictor.to_string(),
        r_squared: model.r_squared,
        coefficient: model.slope(),
        nobs: model.nobs,
        model,
    })
}

/// Fit a univariate model for every predictor against one outcome.
///
/// Results are returned in the order of `predictors`. The first failure
/// aborts the batch.
pub fn test_linreg(
    table: &ObservationTable,
    predictors: &[String],
    outcome: &str,
    companion: Option<&str>,
) -> Result<Vec<RegressionResult>> {
    predictors
        .par_iter()
        .map(|p| fit_univariate(table, p, outcome, companion))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn create_test_table() -> ObservationTable {
        ObservationTable::new((0..6).map(|i| format!("S{}", i)).collect())
            .with_column("a", vec![Some(1.0), Some(2.0), Some(3.0), Some(4.0), Some(5.0), None])
            .unwrap()
            .with_column(
                "b",
                vec![Some(2.0), Some(1.0), Some(4.0), Some(3.0), Some(6.0), Some(5.0)],
            )
            .unwrap()
            .with_column("ref", vec![Some(1.0), Some(1.0), None, Some(1.0), Some(1.0), Some(1.0)])
            .unwrap()
            .with_column("const", vec![Some(7.0); 6])
            .unwrap()
            .with_column(
                "y",
                vec![Some(1.1), Some(1.9), Some(3.2), Some(3.9), Some(5.1), Some(6.0)],
            )
            .unwrap()
    }

    #[test]
    fn test_fit_columns_known_values() {
        // Centered x = [-1, 0, 1], y = [-1, 1, 0]; r = 1 / 2
        let fit = fit_columns("a", "y", &[1.0, 2.0, 3.0], &[1.0, 3.0, 2.0]).unwrap();

        assert_relative_eq!(fit.r_squared, 0.25, epsilon = 1e-12);
        assert_relative_eq!(fit.slope(), 0.5, epsilon = 1e-12);
        assert_relative_eq!(fit.intercept(), 0.0, epsilon = 1e-12);
        assert_eq!(fit.nobs, 3);
        assert_eq!(fit.df_residual, 1);

        // Standardized RSS = 2.25 on 1 df; sum of z_x^2 = 3, so SE(slope) = 1.5 / sqrt(3)
        assert_relative_eq!(fit.sigma, 1.5, epsilon = 1e-12);
        assert_relative_eq!(fit.t_statistic(1).unwrap(), 1.0 / 3f64.sqrt(), epsilon = 1e-12);
        assert!(fit.t_statistic(2).is_none());
    }

    #[test]
    fn test_perfect_correlation() {
        let x: Vec<f64> = (0..10).map(|i| i as f64).collect();
        let y: Vec<f64> = x.iter().map(|v| 3.0 * v - 2.0).collect();
        let fit = fit_columns("x", "y", &x, &y).unwrap();

        assert_relative_eq!(fit.r_squared, 1.0, epsilon = 1e-10);
        assert_relative_eq!(fit.slope(), 1.0, epsilon = 1e-10);

        let predicted = fit.predict(&[20.0]);
        assert_relative_eq!(predicted[0], 58.0, epsilon = 1e-8);
    }

    #[test]
    fn test_negative_slope_keeps_sign() {
        let fit = fit_columns("x", "y", &[1.0, 2.0, 3.0, 4.0], &[4.0, 3.5, 2.0, 1.0]).unwrap();
        assert!(fit.slope() < 0.0);
        assert_relative_eq!(fit.slope() * fit.slope(), fit.r_squared, epsilon = 1e-12);
    }

    #[test]
    fn test_fit_univariate_drops_missing() {
        let table = create_test_table();
        let result = fit_univariate(&table, "a", "y", None).unwrap();
        assert_eq!(result.nobs, 5);
        assert_eq!(result.biomarker, "a");
    }

    #[test]
    fn test_companion_gates_rows() {
        let table = create_test_table();
        let gated = fit_univariate(&table, "b", "y", Some("ref")).unwrap();
        let ungated = fit_univariate(&table, "b", "y", None).unwrap();

        assert_eq!(gated.nobs, 5);
        assert_eq!(ungated.nobs, 6);
    }

    #[test]
    fn test_constant_predictor_fails() {
        let table = create_test_table();
        let result = fit_univariate(&table, "const", "y", None);
        assert!(matches!(result, Err(RefnormError::InsufficientData { .. })));
    }

    #[test]
    fn test_too_few_rows_fails() {
        let result = fit_columns("x", "y", &[1.0], &[2.0]);
        assert!(matches!(result, Err(RefnormError::InsufficientData { .. })));
    }

    #[test]
    fn test_test_linreg_order() {
        let table = create_test_table();
        let predictors = vec!["b".to_string(), "a".to_string()];
        let results = test_linreg(&table, &predictors, "y", Some("ref")).unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].biomarker, "b");
        assert_eq!(results[1].biomarker, "a");
        assert_eq!(results[1].nobs, 4);
    }
}
