//! Display names and comparison summaries for reporting.

use crate::data::{ResultTable, SignificanceTier};
use crate::error::{RefnormError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Mapping from biomarker column names to human-readable names.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DisplayNames {
    names: HashMap<String, String>,
}

impl DisplayNames {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create from (column, display name) pairs.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            names: pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }

    pub fn insert(&mut self, biomarker: &str, name: &str) {
        self.names.insert(biomarker.to_string(), name.to_string());
    }

    /// Display name for a biomarker; `MissingName` if none is registered.
    pub fn get(&self, biomarker: &str) -> Result<&str> {
        self.names
            .get(biomarker)
            .map(|s| s.as_str())
            .ok_or_else(|| RefnormError::MissingName(biomarker.to_string()))
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Grouping of a displayed biomarker by the reference it was divided by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DisplayCategory {
    /// Ratio with Aβ40.
    Ab40Ratio,
    /// Ratio with non-phosphorylated tau.
    NpTauRatio,
    /// Ratio with Aβ42.
    Ab42Ratio,
    /// Biomarker alone.
    Unnormalized,
}

impl DisplayCategory {
    /// Classify from a display name such as `p-tau217/Aβ40`.
    pub fn from_display_name(name: &str) -> Self {
        let lower = name.to_lowercase();
        if lower.contains("/ab40") || lower.contains("/aβ40") {
            Self::Ab40Ratio
        } else if lower.contains("/np-tau") {
            Self::NpTauRatio
        } else if lower.contains("/ab42") || lower.contains("/aβ42") {
            Self::Ab42Ratio
        } else {
            Self::Unnormalized
        }
    }

    /// Get the descriptive name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Ab40Ratio => "ab40_ratio",
            Self::NpTauRatio => "nptau_ratio",
            Self::Ab42Ratio => "ab42_ratio",
            Self::Unnormalized => "unnormalized",
        }
    }
}

/// Reporting view of one annotated comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonSummary {
    pub outcome: String,
    pub biomarker: String,
    pub compared_against: String,
    pub name: String,
    pub category: DisplayCategory,
    pub nobs: usize,
    pub mean_difference: f64,
    pub lower: f64,
    pub upper: f64,
    pub p_value: f64,
    pub p_value_fdr: f64,
    pub tier: SignificanceTier,
}

/// Summarize the annotated comparisons of a table, largest mean difference first.
///
/// Baseline rows are skipped. Comparison rows must already carry a
/// significance annotation.
pub fn summarize_comparisons(
    table: &ResultTable,
    names: &DisplayNames,
) -> Result<Vec<ComparisonSummary>> {
    let mut summaries = table
        .comparisons()
        .map(|(row, comparison)| {
            let s = row.significance.as_ref().ok_or_else(|| {
                RefnormError::InvalidParameter(format!(
                    "Comparison for '{}' on '{}' has not been annotated",
                    row.biomarker, table.outcome
                ))
            })?;
            let name = names.get(&row.biomarker)?;
            Ok(ComparisonSummary {
                outcome: table.outcome.clone(),
                biomarker: row.biomarker.clone(),
                compared_against: comparison.compared_against.clone(),
                name: name.to_string(),
                category: DisplayCategory::from_display_name(name),
                nobs: comparison.nobs,
                mean_difference: s.mean_difference,
                lower: s.lower,
                upper: s.upper,
                p_value: s.p_value,
                p_value_fdr: s.p_value_fdr,
                tier: s.tier,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    summaries.sort_by(|a, b| b.mean_difference.total_cmp(&a.mean_difference));
    Ok(summaries)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_category() {
        assert_eq!(DisplayCategory::from_display_name("p-tau217/Aβ40"), DisplayCategory::Ab40Ratio);
        assert_eq!(DisplayCategory::from_display_name("p-tau217/Ab40"), DisplayCategory::Ab40Ratio);
        assert_eq!(
            DisplayCategory::from_display_name("p-tau181/np-tau"),
            DisplayCategory::NpTauRatio
        );
        assert_eq!(DisplayCategory::from_display_name("NfL/Aβ42"), DisplayCategory::Ab42Ratio);
        assert_eq!(DisplayCategory::from_display_name("GFAP"), DisplayCategory::Unnormalized);
    }

    #[test]
    fn test_missing_name() {
        let names = DisplayNames::from_pairs([("ptau217", "p-tau217")]);
        assert_eq!(names.get("ptau217").unwrap(), "p-tau217");
        assert!(matches!(names.get("nfl"), Err(RefnormError::MissingName(n)) if n == "nfl"));
    }

    #[test]
    fn test_names_from_yaml() {
        let yaml = "ptau217_r: p-tau217/Aβ40\nnfl_r: NfL/Aβ40\n";
        let names: DisplayNames = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(names.len(), 2);
        assert_eq!(names.get("nfl_r").unwrap(), "NfL/Aβ40");
    }
}
