//! Variable transformations applied before modelling.
//!
//! - **Ratio**: biomarker divided by a reference protein
//! - **Standardize**: zero-mean, unit-variance scaling of a column

pub mod ratio;
pub mod standardize;

pub use ratio::{
    create_biomarker_ratios, denominator_rows, ratio_column, ratio_name, DEFAULT_RATIO_SUFFIX,
};
pub use standardize::{standardize_pair, StandardizedPair, Standardizer};
