//! Result types for biomarker normalization comparisons.

use crate::correct::significance::empirical_interval;
use crate::error::Result;
use crate::model::UnivariateFit;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// What a result row's predictor represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BiomarkerRole {
    /// Biomarker alone.
    Raw,
    /// The normalizing reference protein.
    Reference,
    /// Biomarker divided by the reference protein.
    Normalized,
}

impl BiomarkerRole {
    /// Get the descriptive name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Raw => "raw",
            Self::Reference => "reference",
            Self::Normalized => "normalized",
        }
    }
}

/// Significance marker derived from an FDR-corrected p-value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignificanceTier {
    /// FDR p < 0.001
    VeryHigh,
    /// FDR p < 0.01
    High,
    /// FDR p < 0.05
    Moderate,
    NotSignificant,
}

impl SignificanceTier {
    /// Classify an FDR-corrected p-value.
    pub fn from_fdr(p_fdr: f64) -> Self {
        if p_fdr < 0.001 {
            Self::VeryHigh
        } else if p_fdr < 0.01 {
            Self::High
        } else if p_fdr < 0.05 {
            Self::Moderate
        } else {
            Self::NotSignificant
        }
    }

    /// Star marker used in tables and plots.
    pub fn marker(&self) -> &'static str {
        match self {
            Self::VeryHigh => "***",
            Self::High => "**",
            Self::Moderate => "*",
            Self::NotSignificant => "",
        }
    }

    pub fn is_significant(&self) -> bool {
        !matches!(self, Self::NotSignificant)
    }
}

/// Univariate regression of the outcome on one predictor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegressionResult {
    /// Predictor column name.
    pub biomarker: String,
    /// Coefficient of determination.
    pub r_squared: f64,
    /// Standardized slope.
    pub coefficient: f64,
    /// Number of observations after missing-value removal.
    pub nobs: usize,
    /// The fitted model.
    pub model: UnivariateFit,
}

/// Bootstrap samples of a statistic for one comparison.
///
/// For paired runs each value is `R²(second) - R²(first)` on the same resample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BootstrapDistribution {
    /// Predictor whose R² is subtracted.
    pub first: String,
    /// Predictor whose R² is subtracted from.
    pub second: String,
    pub outcome: String,
    /// One value per iteration, in iteration order.
    pub values: Vec<f64>,
    /// Size of the complete-case subset every resample was drawn from.
    pub nobs: usize,
}

impl BootstrapDistribution {
    /// Number of bootstrap iterations.
    pub fn n_iter(&self) -> usize {
        self.values.len()
    }

    /// Mean of the bootstrap values.
    pub fn mean(&self) -> f64 {
        if self.values.is_empty() {
            return f64::NAN;
        }
        self.values.iter().sum::<f64>() / self.values.len() as f64
    }

    /// Empirical interval between two quantiles (e.g. 0.05 and 0.95).
    pub fn interval(&self, lower: f64, upper: f64) -> Option<(f64, f64)> {
        empirical_interval(&self.values, lower, upper)
    }
}

/// A normalized biomarker paired with the raw biomarker it is compared against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonRecord {
    /// Normalized biomarker.
    pub biomarker: String,
    /// Raw biomarker.
    pub compared_against: String,
    pub distribution: BootstrapDistribution,
    pub nobs: usize,
}

/// Significance of one comparison, derived from its bootstrap distribution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignificanceAnnotation {
    /// Mean R² difference over iterations.
    pub mean_difference: f64,
    /// 5th percentile of the R² differences.
    pub lower: f64,
    /// 95th percentile of the R² differences.
    pub upper: f64,
    /// Two-sided empirical p-value.
    pub p_value: f64,
    /// `max(p_value, 1 / n_iter)`, the value entering FDR correction.
    pub p_value_floor: f64,
    /// Benjamini-Hochberg corrected p-value.
    pub p_value_fdr: f64,
    pub tier: SignificanceTier,
}

/// One biomarker's row in a result table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultRow {
    pub biomarker: String,
    pub role: BiomarkerRole,
    pub regression: RegressionResult,
    /// Present only for normalized biomarkers.
    pub comparison: Option<ComparisonRecord>,
    /// Filled in by significance annotation.
    pub significance: Option<SignificanceAnnotation>,
}

impl ResultRow {
    /// Create a row without comparison data.
    pub fn new(role: BiomarkerRole, regression: RegressionResult) -> Self {
        Self {
            biomarker: regression.biomarker.clone(),
            role,
            regression,
            comparison: None,
            significance: None,
        }
    }

    pub fn nobs(&self) -> usize {
        self.regression.nobs
    }
}

/// All regression and comparison results for one outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultTable {
    pub outcome: String,
    pub rows: Vec<ResultRow>,
}

impl ResultTable {
    pub fn new(outcome: String, rows: Vec<ResultRow>) -> Self {
        Self { outcome, rows }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Iterate over rows.
    pub fn iter(&self) -> impl Iterator<Item = &ResultRow> {
        self.rows.iter()
    }

    /// First row for a biomarker.
    pub fn get(&self, biomarker: &str) -> Option<&ResultRow> {
        self.rows.iter().find(|r| r.biomarker == biomarker)
    }

    /// Rows carrying a comparison record, in table order.
    pub fn comparisons(&self) -> impl Iterator<Item = (&ResultRow, &ComparisonRecord)> {
        self.rows
            .iter()
            .filter_map(|r| r.comparison.as_ref().map(|c| (r, c)))
    }

    /// Bootstrap distribution keyed by biomarker identity and observation count.
    pub fn distribution(&self, biomarker: &str, nobs: usize) -> Option<&BootstrapDistribution> {
        self.comparisons()
            .find(|(_, c)| c.biomarker == biomarker && c.nobs == nobs)
            .map(|(_, c)| &c.distribution)
    }

    /// Count comparisons significant at an FDR threshold.
    pub fn n_significant(&self, alpha: f64) -> usize {
        self.rows
            .iter()
            .filter_map(|r| r.significance.as_ref())
            .filter(|s| s.p_value_fdr < alpha)
            .count()
    }

    /// Write the table to a TSV file. Absent values are written as `NA`.
    pub fn to_tsv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);

        writeln!(
            writer,
            "biomarker\trole\tR2\tBeta\tnobs\tcompared_against\tR2_difference\tlower\tupper\tP-value\tP-value FDR\tsig"
        )?;

        for r in &self.rows {
            let compared = r
                .comparison
                .as_ref()
                .map(|c| c.compared_against.as_str())
                .unwrap_or("NA");
            let s = r.significance.as_ref();
            writeln!(
                writer,
                "{}\t{}\t{:.6}\t{:.6}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
                r.biomarker,
                r.role.name(),
                r.regression.r_squared,
                r.regression.coefficient,
                r.nobs(),
                compared,
                fmt_fixed(s.map(|s| s.mean_difference)),
                fmt_fixed(s.map(|s| s.lower)),
                fmt_fixed(s.map(|s| s.upper)),
                fmt_sci(s.map(|s| s.p_value)),
                fmt_sci(s.map(|s| s.p_value_fdr)),
                s.map(|s| s.tier.marker()).unwrap_or(""),
            )?;
        }

        writer.flush()?;
        Ok(())
    }
}

fn fmt_fixed(value: Option<f64>) -> String {
    value.map_or_else(|| "NA".to_string(), |v| format!("{:.6}", v))
}

fn fmt_sci(value: Option<f64>) -> String {
    value.map_or_else(|| "NA".to_string(), |v| format!("{:.2e}", v))
}
