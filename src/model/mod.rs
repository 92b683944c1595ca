//! Statistical models for biomarker-outcome association.

pub mod lm;

pub use lm::{fit_columns, fit_univariate, test_linreg, UnivariateFit};
