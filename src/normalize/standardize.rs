//! Zero-mean, unit-variance scaling.
//!
//! Scaling uses the population standard deviation (divisor `n`), so a
//! standardized column has mean 0 and mean square 1.

use crate::error::{RefnormError, Result};
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

/// Location and scale fitted on one column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Standardizer {
    pub mean: f64,
    pub std: f64,
}

impl Standardizer {
    /// Fit on a column.
    ///
    /// Fails with `InsufficientData` for fewer than 2 values or a constant column.
    pub fn fit(name: &str, values: &[f64]) -> Result<Self> {
        if values.len() < 2 {
            return Err(RefnormError::insufficient(
                name,
                format!("{} observation(s), at least 2 required", values.len()),
            ));
        }

        let mean = values.iter().mean();
        let std = values.iter().population_std_dev();

        if !std.is_finite() || std == 0.0 || std <= f64::EPSILON * mean.abs() {
            return Err(RefnormError::insufficient(
                name,
                format!("zero variance across {} observations", values.len()),
            ));
        }

        Ok(Self { mean, std })
    }

    pub fn transform(&self, values: &[f64]) -> Vec<f64> {
        values.iter().map(|v| (v - self.mean) / self.std).collect()
    }

    /// Map standardized values back to the original scale.
    pub fn inverse_transform(&self, values: &[f64]) -> Vec<f64> {
        values.iter().map(|z| z * self.std + self.mean).collect()
    }
}

/// Two aligned columns standardized jointly.
#[derive(Debug, Clone)]
pub struct StandardizedPair {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub x_scaler: Standardizer,
    pub y_scaler: Standardizer,
}

/// Standardize a predictor and an outcome over the same rows.
pub fn standardize_pair(
    x_name: &str,
    x: &[f64],
    y_name: &str,
    y: &[f64],
) -> Result<StandardizedPair> {
    if x.len() != y.len() {
        return Err(RefnormError::DimensionMismatch {
            expected: x.len(),
            actual: y.len(),
        });
    }

    let x_scaler = Standardizer::fit(x_name, x)?;
    let y_scaler = Standardizer::fit(y_name, y)?;

    Ok(StandardizedPair {
        x: x_scaler.transform(x),
        y: y_scaler.transform(y),
        x_scaler,
        y_scaler,
    })
}
