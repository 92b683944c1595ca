//! Subject-by-variable observation table with explicit missing values.

use crate::error::{RefnormError, Result};
use nalgebra::DMatrix;
use std::collections::HashMap;
use std::path::Path;

/// Named numeric columns over a fixed list of subjects.
///
/// Each row is one subject. A cell is `None` when the value is missing.
#[derive(Debug, Clone, PartialEq)]
pub struct ObservationTable {
    subject_ids: Vec<String>,
    column_names: Vec<String>,
    columns: HashMap<String, Vec<Option<f64>>>,
}

impl ObservationTable {
    /// Create a table with the given subjects and no columns.
    pub fn new(subject_ids: Vec<String>) -> Self {
        Self {
            subject_ids,
            column_names: Vec::new(),
            columns: HashMap::new(),
        }
    }

    /// Builder-style variant of [`add_column`](Self::add_column).
    pub fn with_column(mut self, name: &str, values: Vec<Option<f64>>) -> Result<Self> {
        self.add_column(name, values)?;
        Ok(self)
    }

    /// Add a column. Its length must match the number of subjects.
    pub fn add_column(&mut self, name: &str, values: Vec<Option<f64>>) -> Result<()> {
        if values.len() != self.subject_ids.len() {
            return Err(RefnormError::DimensionMismatch {
                expected: self.subject_ids.len(),
                actual: values.len(),
            });
        }
        if self.columns.contains_key(name) {
            return Err(RefnormError::DuplicateColumn(name.to_string()));
        }
        self.column_names.push(name.to_string());
        self.columns.insert(name.to_string(), values);
        Ok(())
    }

    /// Load a table from a TSV file.
    ///
    /// Expected format:
    /// - First row: header; the first column holds subject IDs
    /// - Subsequent rows: subject ID followed by numeric values
    ///
    /// Empty cells, `NA` and `NaN` (any case) and non-finite numbers are read as missing.
    pub fn from_tsv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(true)
            .from_path(path)?;

        let headers = reader.headers()?.clone();
        if headers.len() < 2 {
            return Err(RefnormError::EmptyData(
                "Table must have at least one variable column".to_string(),
            ));
        }
        let column_names: Vec<String> = headers
            .iter()
            .skip(1)
            .map(|h| h.trim().to_string())
            .collect();

        let mut subject_ids = Vec::new();
        let mut values: Vec<Vec<Option<f64>>> = vec![Vec::new(); column_names.len()];

        for record in reader.records() {
            let record = record?;
            let subject = record.get(0).unwrap_or("").trim().to_string();
            for (j, column) in values.iter_mut().enumerate() {
                let raw = record.get(j + 1).unwrap_or("");
                let cell = parse_cell(raw).ok_or_else(|| {
                    RefnormError::InvalidParameter(format!(
                        "Non-numeric value '{}' in column '{}' for subject '{}'",
                        raw, column_names[j], subject
                    ))
                })?;
                column.push(cell);
            }
            subject_ids.push(subject);
        }

        if subject_ids.is_empty() {
            return Err(RefnormError::EmptyData("No subjects in table".to_string()));
        }

        let mut table = Self::new(subject_ids);
        for (name, column) in column_names.iter().zip(values) {
            table.add_column(name, column)?;
        }
        Ok(table)
    }

    /// Number of subjects (rows).
    pub fn n_subjects(&self) -> usize {
        self.subject_ids.len()
    }

    /// Subject IDs in row order.
    pub fn subject_ids(&self) -> &[String] {
        &self.subject_ids
    }

    /// Column names in insertion order.
    pub fn column_names(&self) -> &[String] {
        &self.column_names
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    /// Get a column by name.
    pub fn column(&self, name: &str) -> Result<&[Option<f64>]> {
        self.columns
            .get(name)
            .map(|c| c.as_slice())
            .ok_or_else(|| RefnormError::MissingColumn(name.to_string()))
    }

    /// Number of non-missing values in a column.
    pub fn n_present(&self, name: &str) -> Result<usize> {
        Ok(self.column(name)?.iter().filter(|v| v.is_some()).count())
    }

    /// Create a new table with only the specified subjects, in `indices` order.
    pub fn subset_subjects(&self, indices: &[usize]) -> Result<Self> {
        if let Some(&bad) = indices.iter().find(|&&i| i >= self.n_subjects()) {
            return Err(RefnormError::InvalidParameter(format!(
                "Subject index {} out of range for {} subjects",
                bad,
                self.n_subjects()
            )));
        }

        let mut subset = Self::new(indices.iter().map(|&i| self.subject_ids[i].clone()).collect());
        for name in &self.column_names {
            let column = &self.columns[name];
            subset.add_column(name, indices.iter().map(|&i| column[i]).collect())?;
        }
        Ok(subset)
    }

    /// Select the rows where every named column is present.
    ///
    /// All names are validated before any row is inspected.
    pub fn complete_cases(&self, names: &[&str]) -> Result<CompleteCases> {
        let columns: Vec<&[Option<f64>]> = names
            .iter()
            .map(|name| self.column(name))
            .collect::<Result<_>>()?;

        let row_indices: Vec<usize> = (0..self.n_subjects())
            .filter(|&i| columns.iter().all(|c| c[i].is_some()))
            .collect();

        let data = DMatrix::from_fn(row_indices.len(), columns.len(), |r, c| {
            columns[c][row_indices[r]].unwrap_or(f64::NAN)
        });

        Ok(CompleteCases {
            names: names.iter().map(|n| n.to_string()).collect(),
            data,
            row_indices,
        })
    }
}

fn parse_cell(raw: &str) -> Option<Option<f64>> {
    let v = raw.trim();
    if v.is_empty() || v.eq_ignore_ascii_case("na") || v.eq_ignore_ascii_case("nan") {
        return Some(None);
    }
    v.parse::<f64>().ok().map(|x| x.is_finite().then_some(x))
}

/// Dense subset of an [`ObservationTable`] with no missing values.
///
/// Rows are subjects (in `row_indices` order), columns follow `names`.
#[derive(Debug, Clone, PartialEq)]
pub struct CompleteCases {
    names: Vec<String>,
    data: DMatrix<f64>,
    row_indices: Vec<usize>,
}

impl CompleteCases {
    /// Number of complete rows.
    pub fn nrows(&self) -> usize {
        self.data.nrows()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Row positions in the source table (repeated for resampled subsets).
    pub fn row_indices(&self) -> &[usize] {
        &self.row_indices
    }

    pub fn matrix(&self) -> &DMatrix<f64> {
        &self.data
    }

    /// Get a column's values in row order.
    pub fn column(&self, name: &str) -> Result<Vec<f64>> {
        let j = self
            .names
            .iter()
            .position(|n| n == name)
            .ok_or_else(|| RefnormError::MissingColumn(name.to_string()))?;
        Ok(self.data.column(j).iter().copied().collect())
    }

    /// Build the resampled subset whose i-th row is row `indices[i]` of this one.
    pub fn resample(&self, indices: &[usize]) -> Result<CompleteCases> {
        if let Some(&bad) = indices.iter().find(|&&i| i >= self.nrows()) {
            return Err(RefnormError::InvalidParameter(format!(
                "Resample index {} out of range for {} rows",
                bad,
                self.nrows()
            )));
        }
        Ok(CompleteCases {
            names: self.names.clone(),
            data: self.data.select_rows(indices.iter()),
            row_indices: indices.iter().map(|&i| self.row_indices[i]).collect(),
        })
    }
}
