//! Reporting summaries built on annotated results.
//!
//! - **stability**: R² mean and interval of single-predictor bootstraps
//! - **display**: display names, reference categories and sorted comparison summaries

pub mod display;
pub mod stability;

pub use display::{summarize_comparisons, ComparisonSummary, DisplayCategory, DisplayNames};
pub use stability::{summarize_stability, StabilitySummary};
