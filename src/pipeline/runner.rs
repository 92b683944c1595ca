//! Configured end-to-end comparison across outcomes.

use crate::bootstrap::BootstrapConfig;
use crate::compare::compare_biomarkers;
use crate::correct::{annotate_significance, BhCorrected};
use crate::data::{ObservationTable, ResultTable};
use crate::error::{RefnormError, Result};
use crate::normalize::{create_biomarker_ratios, DEFAULT_RATIO_SUFFIX};
use crate::summary::DisplayNames;
use log::info;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

fn default_name() -> String {
    "unnamed".to_string()
}

fn default_suffix() -> String {
    DEFAULT_RATIO_SUFFIX.to_string()
}

/// Comparison configuration for serialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonConfig {
    /// Name of the analysis.
    #[serde(default = "default_name")]
    pub name: String,
    /// Raw biomarker columns.
    pub biomarkers: Vec<String>,
    /// Reference protein column used as the ratio denominator.
    pub reference: String,
    /// Outcome columns; each gets its own result table.
    pub outcomes: Vec<String>,
    /// Suffix naming the ratio columns.
    #[serde(default = "default_suffix")]
    pub suffix: String,
    #[serde(default)]
    pub bootstrap: BootstrapConfig,
    /// Optional display names for reporting, keyed by column name.
    #[serde(default, skip_serializing_if = "DisplayNames::is_empty")]
    pub display_names: DisplayNames,
}

impl ComparisonConfig {
    /// Create a configuration with no biomarkers or outcomes.
    pub fn new(reference: &str) -> Self {
        Self {
            name: default_name(),
            biomarkers: Vec::new(),
            reference: reference.to_string(),
            outcomes: Vec::new(),
            suffix: default_suffix(),
            bootstrap: BootstrapConfig::default(),
            display_names: DisplayNames::new(),
        }
    }

    /// Set the analysis name.
    pub fn name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    /// Add a raw biomarker.
    pub fn biomarker(mut self, biomarker: &str) -> Self {
        self.biomarkers.push(biomarker.to_string());
        self
    }

    /// Add an outcome.
    pub fn outcome(mut self, outcome: &str) -> Self {
        self.outcomes.push(outcome.to_string());
        self
    }

    pub fn suffix(mut self, suffix: &str) -> Self {
        self.suffix = suffix.to_string();
        self
    }

    pub fn bootstrap(mut self, bootstrap: BootstrapConfig) -> Self {
        self.bootstrap = bootstrap;
        self
    }

    /// Load from YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(RefnormError::from)
    }

    /// Save to YAML string.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(RefnormError::from)
    }

    /// Load from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml(&yaml)
    }

    /// Names of the ratio columns this configuration creates.
    pub fn normalized_names(&self) -> Vec<String> {
        self.biomarkers
            .iter()
            .map(|b| crate::normalize::ratio_name(b, &self.suffix))
            .collect()
    }

    /// Check the configuration on its own.
    pub fn validate(&self) -> Result<()> {
        if self.biomarkers.is_empty() {
            return Err(RefnormError::InvalidParameter(
                "At least one biomarker is required".to_string(),
            ));
        }
        if self.outcomes.is_empty() {
            return Err(RefnormError::InvalidParameter(
                "At least one outcome is required".to_string(),
            ));
        }
        if self.biomarkers.contains(&self.reference) {
            return Err(RefnormError::InvalidParameter(format!(
                "Reference '{}' is also listed as a biomarker",
                self.reference
            )));
        }
        let mut seen = HashSet::new();
        if let Some(dup) = self.biomarkers.iter().find(|b| !seen.insert(b.as_str())) {
            return Err(RefnormError::InvalidParameter(format!(
                "Biomarker '{}' is listed twice",
                dup
            )));
        }
        self.bootstrap.validate()
    }

    /// Check that every configured column exists in a table.
    pub fn validate_against(&self, table: &ObservationTable) -> Result<()> {
        self.validate()?;
        let required = self
            .biomarkers
            .iter()
            .chain(&self.outcomes)
            .chain(std::iter::once(&self.reference));
        for name in required {
            if !table.has_column(name) {
                return Err(RefnormError::MissingColumn(name.clone()));
            }
        }
        Ok(())
    }
}

/// Output of a configured comparison.
#[derive(Debug, Clone)]
pub struct ComparisonRun {
    /// One annotated table per outcome, in configuration order.
    pub tables: Vec<ResultTable>,
    /// Batch-wide BH correction.
    pub fdr: BhCorrected,
    /// Ratio column names, in biomarker order.
    pub normalized: Vec<String>,
}

impl ComparisonRun {
    /// Result table for an outcome.
    pub fn table(&self, outcome: &str) -> Option<&ResultTable> {
        self.tables.iter().find(|t| t.outcome == outcome)
    }
}

/// Run the configured comparison on a table.
///
/// Ratios are built on a copy of the table. Outcome k bootstraps from
/// `config.bootstrap.for_stream(k)`, and FDR correction spans all outcomes.
pub fn run_comparison(
    table: &ObservationTable,
    config: &ComparisonConfig,
) -> Result<ComparisonRun> {
    config.validate_against(table)?;
    info!(
        "Running '{}': {} biomarker(s) / '{}' on {} outcome(s), {} iterations",
        config.name,
        config.biomarkers.len(),
        config.reference,
        config.outcomes.len(),
        config.bootstrap.n_iter
    );

    let mut work = table.clone();
    let normalized =
        create_biomarker_ratios(&mut work, &config.biomarkers, &config.reference, &config.suffix)?;

    let mut tables = config
        .outcomes
        .iter()
        .enumerate()
        .map(|(k, outcome)| {
            compare_biomarkers(
                &work,
                &config.biomarkers,
                &normalized,
                &config.reference,
                outcome,
                &config.bootstrap.for_stream(k),
            )
        })
        .collect::<Result<Vec<_>>>()?;

    let fdr = annotate_significance(&mut tables)?;

    Ok(ComparisonRun {
        tables,
        fdr,
        normalized,
    })
}
