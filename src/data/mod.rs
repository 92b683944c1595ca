//! Data structures for biomarker normalization comparisons.

mod result;
mod table;

pub use result::{
    BiomarkerRole, BootstrapDistribution, ComparisonRecord, RegressionResult, ResultRow,
    ResultTable, SignificanceAnnotation, SignificanceTier,
};
pub use table::{CompleteCases, ObservationTable};
