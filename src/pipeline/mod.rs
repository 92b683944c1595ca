//! Configuration and execution of a full normalization comparison.

mod runner;

pub use runner::{run_comparison, ComparisonConfig, ComparisonRun};
