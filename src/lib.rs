//! Reference Protein Normalization Comparison Library
//!
//! This library tests whether dividing a biomarker by a reference protein
//! strengthens its association with a clinical outcome, compared with the
//! biomarker alone.
//!
//! # Overview
//!
//! The library is organized into composable modules:
//!
//! - **data**: Observation table and result types
//! - **normalize**: Biomarker ratios and standardization
//! - **model**: Univariate linear regression
//! - **bootstrap**: Paired and single-predictor bootstrap resampling
//! - **compare**: Batch comparison of raw and normalized biomarkers
//! - **correct**: Empirical p-values and Benjamini-Hochberg correction
//! - **summary**: Stability and reporting summaries
//! - **pipeline**: Configured runs across outcomes
//!
//! # Example
//!
//! ```no_run
//! use refnorm::prelude::*;
//!
//! let table = ObservationTable::from_tsv("cohort.tsv").unwrap();
//!
//! let config = ComparisonConfig::new("ab40")
//!     .biomarker("ptau217")
//!     .biomarker("nfl")
//!     .outcome("mmse")
//!     .bootstrap(BootstrapConfig::default());
//!
//! let run = run_comparison(&table, &config).unwrap();
//! for table in &run.tables {
//!     table.to_tsv(format!("{}.tsv", table.outcome)).unwrap();
//! }
//! ```

pub mod bootstrap;
pub mod compare;
pub mod correct;
pub mod data;
pub mod error;
pub mod model;
pub mod normalize;
pub mod pipeline;
pub mod summary;

/// Convenient re-exports for common usage.
pub mod prelude {
    pub use crate::bootstrap::{
        bootstrap_paired, bootstrap_paired_with, bootstrap_single, bootstrap_single_batch,
        bootstrap_single_with, paired_iteration, BootstrapConfig, FixedResampler, PairedFits,
        Resampler, SeededResampler, SingleBootstrap,
    };
    pub use crate::compare::{compare_biomarkers, get_bootstrapped_diff, merge_comparisons};
    pub use crate::correct::{
        annotate_significance, correct_bh, empirical_interval, empirical_p_value, p_value_floor,
        BhCorrected,
    };
    pub use crate::data::{
        BiomarkerRole, BootstrapDistribution, ComparisonRecord, CompleteCases, ObservationTable,
        RegressionResult, ResultRow, ResultTable, SignificanceAnnotation, SignificanceTier,
    };
    pub use crate::error::{RefnormError, Result};
    pub use crate::model::{fit_columns, fit_univariate, test_linreg, UnivariateFit};
    pub use crate::normalize::{
        create_biomarker_ratios, standardize_pair, Standardizer, DEFAULT_RATIO_SUFFIX,
    };
    pub use crate::pipeline::{run_comparison, ComparisonConfig, ComparisonRun};
    pub use crate::summary::{
        summarize_comparisons, summarize_stability, ComparisonSummary, DisplayCategory,
        DisplayNames, StabilitySummary,
    };
}
