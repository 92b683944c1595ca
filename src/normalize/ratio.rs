//! Biomarker-to-reference-protein ratios.
//!
//! Each biomarker is divided by the reference protein subject by subject.
//! The ratio is missing when either value is missing, when the reference is
//! zero, or when the quotient is not finite, so no infinities reach a
//! regression.

use crate::data::ObservationTable;
use crate::error::{RefnormError, Result};
use log::{debug, warn};

/// Suffix appended to a biomarker name to name its ratio column.
pub const DEFAULT_RATIO_SUFFIX: &str = "_refprot_normalized";

/// Name of the ratio column for a biomarker.
pub fn ratio_name(biomarker: &str, suffix: &str) -> String {
    format!("{}{}", biomarker, suffix)
}

/// Divide two columns elementwise, propagating missing values.
pub fn ratio_column(
    numerator: &[Option<f64>],
    denominator: &[Option<f64>],
) -> Vec<Option<f64>> {
    numerator
        .iter()
        .zip(denominator)
        .map(|(n, d)| match (n, d) {
            (Some(n), Some(d)) if *d != 0.0 => Some(n / d).filter(|r| r.is_finite()),
            _ => None,
        })
        .collect()
}

/// Rows where a reference value can serve as a denominator (present, non-zero, finite).
pub fn denominator_rows(denominator: &[Option<f64>]) -> Vec<usize> {
    denominator
        .iter()
        .enumerate()
        .filter(|(_, d)| matches!(d, Some(v) if *v != 0.0 && v.is_finite()))
        .map(|(i, _)| i)
        .collect()
}

/// Add a ratio column for every biomarker.
///
/// # Arguments
/// * `table` - Observation table; gains one column per biomarker
/// * `biomarkers` - Biomarker column names
/// * `reference` - Reference protein column name
/// * `suffix` - Appended to each biomarker name to name its ratio
///
/// # Returns
/// Names of the new ratio columns, in the order of `biomarkers`.
pub fn create_biomarker_ratios(
    table: &mut ObservationTable,
    biomarkers: &[String],
    reference: &str,
    suffix: &str,
) -> Result<Vec<String>> {
    if suffix.is_empty() {
        return Err(RefnormError::InvalidParameter(
            "Ratio suffix must not be empty".to_string(),
        ));
    }

    let denominator = table.column(reference)?.to_vec();
    let n_zero = denominator.iter().filter(|v| **v == Some(0.0)).count();
    if n_zero > 0 {
        warn!(
            "Reference protein '{}' is zero for {} subject(s); their ratios are treated as missing",
            reference, n_zero
        );
    }

    let mut names = Vec::with_capacity(biomarkers.len());
    for biomarker in biomarkers {
        let name = ratio_name(biomarker, suffix);
        let values = ratio_column(table.column(biomarker)?, &denominator);
        debug!(
            "Created '{}' ({} of {} subjects present)",
            name,
            values.iter().filter(|v| v.is_some()).count(),
            values.len()
        );
        table.add_column(&name, values)?;
        names.push(name);
    }

    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> ObservationTable {
        ObservationTable::new((0..4).map(|i| format!("S{}", i)).collect())
            .with_column("ptau217", vec![Some(2.0), None, Some(3.0), Some(4.0)])
            .unwrap()
            .with_column("nfl", vec![Some(10.0), Some(12.0), Some(9.0), None])
            .unwrap()
            .with_column("ab40", vec![Some(4.0), Some(5.0), Some(0.0), Some(8.0)])
            .unwrap()
    }

    #[test]
    fn test_denominator_rows() {
        let table = table();
        let rows = denominator_rows(table.column("ab40").unwrap());
        assert_eq!(rows, vec![0, 1, 3]);
        assert!(denominator_rows(&[None, Some(0.0)]).is_empty());
    }

    #[test]
    fn test_ratio_values() {
        let mut table = table();
        let names = create_biomarker_ratios(
            &mut table,
            &["ptau217".to_string(), "nfl".to_string()],
            "ab40",
            DEFAULT_RATIO_SUFFIX,
        )
        .unwrap();

        assert_eq!(
            names,
            vec!["ptau217_refprot_normalized", "nfl_refprot_normalized"]
        );
        assert_eq!(
            table.column("ptau217_refprot_normalized").unwrap(),
            &[Some(0.5), None, None, Some(0.5)]
        );
        assert_eq!(
            table.column("nfl_refprot_normalized").unwrap(),
            &[Some(2.5), Some(2.4), None, None]
        );
    }

    #[test]
    fn test_zero_reference_is_missing() {
        let ratios = ratio_column(&[Some(1.0), Some(0.0)], &[Some(0.0), Some(0.0)]);
        assert_eq!(ratios, vec![None, None]);
    }

    #[test]
    fn test_unknown_reference() {
        let mut table = table();
        let result = create_biomarker_ratios(&mut table, &["nfl".to_string()], "gfap", "_r");
        assert!(matches!(result, Err(RefnormError::MissingColumn(_))));
    }

    #[test]
    fn test_ratio_name_collision() {
        let mut table = table();
        let biomarkers = vec!["nfl".to_string()];
        create_biomarker_ratios(&mut table, &biomarkers, "ab40", "_r").unwrap();
        let again = create_biomarker_ratios(&mut table, &biomarkers, "ab40", "_r");
        assert!(matches!(again, Err(RefnormError::DuplicateColumn(_))));
    }
}
