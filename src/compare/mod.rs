//! Orchestration of regression fits and paired bootstraps across biomarkers.

mod batch;

pub use batch::{compare_biomarkers, get_bootstrapped_diff, merge_comparisons};
