//! Batch comparison of raw and reference-normalized biomarkers.
//!
//! For one outcome this produces:
//!
//! - a regression row per raw biomarker, fitted on the subjects where its
//!   ratio is defined, so raw and normalized rows share a subject pool
//! - a regression row for the reference protein, fitted on the subjects where
//!   it is a usable denominator (present and non-zero)
//! - a regression row per normalized biomarker
//! - a paired bootstrap of `R²(normalized) - R²(raw)` per pair, joined onto the
//!   normalized rows by (biomarker, nobs)

use crate::bootstrap::{bootstrap_paired, BootstrapConfig};
use crate::data::{BiomarkerRole, ComparisonRecord, ObservationTable, ResultRow, ResultTable};
use crate::error::{RefnormError, Result};
use crate::model::{fit_univariate, test_linreg};
use crate::normalize::denominator_rows;
use log::{debug, info};
use rayon::prelude::*;

/// Bootstrap the R² difference for every (raw, normalized) pair.
///
/// Pair k draws from `config.for_stream(k)`.
///
/// # Returns
/// One ComparisonRecord per pair, in input order.
pub fn get_bootstrapped_diff(
    table: &ObservationTable,
    biomarkers: &[String],
    normalized: &[String],
    outcome: &str,
    config: &BootstrapConfig,
) -> Result<Vec<ComparisonRecord>> {
    check_paired_lists(biomarkers, normalized)?;

    biomarkers
        .iter()
        .zip(normalized)
        .enumerate()
        .map(|(k, (raw, norm))| {
            let distribution = bootstrap_paired(table, raw, norm, outcome, &config.for_stream(k))?;
            Ok(ComparisonRecord {
                biomarker: norm.clone(),
                compared_against: raw.clone(),
                nobs: distribution.nobs,
                distribution,
            })
        })
        .collect()
}

/// Compare normalized biomarkers against their raw counterparts for one outcome.
///
/// # Arguments
/// * `table` - Observation table holding biomarkers, ratios, reference and outcome
/// * `biomarkers` - Raw biomarker columns
/// * `normalized` - Ratio columns, in the same order as `biomarkers`
/// * `reference` - Reference protein column
/// * `outcome` - Outcome column
/// * `config` - Bootstrap configuration
///
/// # Returns
/// ResultTable with raw rows, the reference row, then normalized rows carrying
/// their comparison records.
pub fn compare_biomarkers(
    table: &ObservationTable,
    biomarkers: &[String],
    normalized: &[String],
    reference: &str,
    outcome: &str,
    config: &BootstrapConfig,
) -> Result<ResultTable> {
    check_paired_lists(biomarkers, normalized)?;
    info!(
        "Comparing {} biomarker(s) normalized by '{}' on '{}'",
        biomarkers.len(),
        reference,
        outcome
    );

    // Each raw biomarker is gated on its own ratio column
    let raw = biomarkers
        .par_iter()
        .zip(normalized)
        .map(|(b, norm)| fit_univariate(table, b, outcome, Some(norm)))
        .collect::<Result<Vec<_>>>()?;

    let pool = table.subset_subjects(&denominator_rows(table.column(reference)?))?;
    let reference_fit = fit_univariate(&pool, reference, outcome, None)?;

    let ratios = test_linreg(table, normalized, outcome, None)?;
    let comparisons = get_bootstrapped_diff(table, biomarkers, normalized, outcome, config)?;

    let mut rows: Vec<ResultRow> = raw
        .into_iter()
        .map(|r| ResultRow::new(BiomarkerRole::Raw, r))
        .collect();
    rows.push(ResultRow::new(BiomarkerRole::Reference, reference_fit));

    let normalized_rows: Vec<ResultRow> = ratios
        .into_iter()
        .map(|r| ResultRow::new(BiomarkerRole::Normalized, r))
        .collect();
    rows.extend(merge_comparisons(normalized_rows, comparisons)?);

    Ok(ResultTable::new(outcome.to_string(), rows))
}

/// Attach comparison records to rows by (biomarker, nobs).
///
/// Each row must match exactly one record and every record must be used.
pub fn merge_comparisons(
    mut rows: Vec<ResultRow>,
    comparisons: Vec<ComparisonRecord>,
) -> Result<Vec<ResultRow>> {
    let mut used = vec![false; comparisons.len()];

    for row in rows.iter_mut() {
        let matches: Vec<usize> = comparisons
            .iter()
            .enumerate()
            .filter(|(_, c)| c.biomarker == row.biomarker && c.nobs == row.nobs())
            .map(|(i, _)| i)
            .collect();

        if matches.len() != 1 {
            return Err(RefnormError::MergeKey {
                biomarker: row.biomarker.clone(),
                nobs: row.nobs(),
                matches: matches.len(),
            });
        }
        let idx = matches[0];
        if used[idx] {
            return Err(RefnormError::MergeKey {
                biomarker: row.biomarker.clone(),
                nobs: row.nobs(),
                matches: 2,
            });
        }
        used[idx] = true;
        row.comparison = Some(comparisons[idx].clone());
        debug!("Merged comparison for '{}' (nobs = {})", row.biomarker, row.nobs());
    }

    if let Some(idx) = used.iter().position(|u| !u) {
        let orphan = &comparisons[idx];
        return Err(RefnormError::MergeKey {
            biomarker: orphan.biomarker.clone(),
            nobs: orphan.nobs,
            matches: 0,
        });
    }

    Ok(rows)
}

fn check_paired_lists(biomarkers: &[String], normalized: &[String]) -> Result<()> {
    if biomarkers.len() != normalized.len() {
        return Err(RefnormError::DimensionMismatch {
            expected: biomarkers.len(),
            actual: normalized.len(),
        });
    }
    Ok(())
}
