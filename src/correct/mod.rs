//! Significance of bootstrap comparisons and multiple testing correction.

pub mod bh;
pub mod significance;

pub use bh::{bh_adjust, correct_bh, BhCorrected};
pub use significance::{
    annotate_significance, empirical_interval, empirical_p_value, p_value_floor, INTERVAL_LOWER,
    INTERVAL_UPPER,
};
