//! Bootstrap resampling of univariate regression fits.
//!
//! - **paired**: R² difference between two predictors on shared resamples
//! - **single**: R² and slope of one predictor
//! - **resample**: configuration, seeding and index generation

pub mod paired;
pub mod resample;
pub mod single;

pub use paired::{bootstrap_paired, bootstrap_paired_with, paired_iteration, PairedFits};
pub use resample::{BootstrapConfig, FixedResampler, Resampler, SeededResampler};
pub use single::{bootstrap_single, bootstrap_single_batch, bootstrap_single_with, SingleBootstrap};
