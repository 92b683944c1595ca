//! Summaries of single-predictor bootstrap runs.

use crate::bootstrap::SingleBootstrap;
use crate::correct::{INTERVAL_LOWER, INTERVAL_UPPER};
use crate::error::{RefnormError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Mean R² and its 90% empirical interval for one biomarker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StabilitySummary {
    pub biomarker: String,
    pub outcome: String,
    pub nobs: usize,
    pub n_iter: usize,
    pub r_squared_mean: f64,
    pub r_squared_lower: f64,
    pub r_squared_upper: f64,
    pub coefficient_mean: f64,
}

impl fmt::Display for StabilitySummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ~ {}: R2 = {:.4} [{:.4}, {:.4}], beta = {:.4} (n = {}, {} iterations)",
            self.outcome,
            self.biomarker,
            self.r_squared_mean,
            self.r_squared_lower,
            self.r_squared_upper,
            self.coefficient_mean,
            self.nobs,
            self.n_iter
        )
    }
}

/// Summarize each bootstrap run, keeping input order.
pub fn summarize_stability(runs: &[SingleBootstrap]) -> Result<Vec<StabilitySummary>> {
    runs.iter()
        .map(|run| {
            let (lower, upper) = run
                .r_squared_interval(INTERVAL_LOWER, INTERVAL_UPPER)
                .ok_or_else(|| {
                    RefnormError::EmptyData(format!(
                        "No bootstrap iterations for '{}'",
                        run.biomarker
                    ))
                })?;
            Ok(StabilitySummary {
                biomarker: run.biomarker.clone(),
                outcome: run.outcome.clone(),
                nobs: run.nobs,
                n_iter: run.n_iter(),
                r_squared_mean: run.mean_r_squared(),
                r_squared_lower: lower,
                r_squared_upper: upper,
                coefficient_mean: run.mean_coefficient(),
            })
        })
        .collect()
}
