//! Benjamini-Hochberg false discovery rate correction.

use serde::{Deserialize, Serialize};

/// Result of BH correction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BhCorrected {
    /// Test identifiers in original order.
    pub ids: Vec<String>,
    /// P-values that entered the correction.
    pub p_values: Vec<f64>,
    /// Adjusted p-values.
    pub q_values: Vec<f64>,
    /// Number of tests.
    pub n_tests: usize,
}

impl BhCorrected {
    /// Get the adjusted p-value for a test.
    pub fn get_qvalue(&self, id: &str) -> Option<f64> {
        let idx = self.ids.iter().position(|f| f == id)?;
        self.q_values.get(idx).copied()
    }

    /// Count significant results at a threshold.
    pub fn n_significant(&self, alpha: f64) -> usize {
        self.q_values.iter().filter(|&&q| q < alpha).count()
    }
}

/// Apply Benjamini-Hochberg FDR correction.
///
/// With p-values sorted ascending and ranks `1..=n`, the adjusted value is
/// q[i] = min(p[i] * n / rank[i], q[i+1]), capped at 1, and is reported in
/// the input order.
///
/// # Arguments
/// * `p_values` - Raw p-values
/// * `ids` - Test identifiers (same order as p_values)
pub fn correct_bh(p_values: &[f64], ids: &[String]) -> BhCorrected {
    BhCorrected {
        ids: ids.to_vec(),
        p_values: p_values.to_vec(),
        q_values: bh_adjust(p_values),
        n_tests: p_values.len(),
    }
}

/// BH-adjusted p-values in input order.
pub fn bh_adjust(p_values: &[f64]) -> Vec<f64> {
    let n = p_values.len();
    if n == 0 {
        return Vec::new();
    }

    let mut indices: Vec<usize> = (0..n).collect();
    indices.sort_by(|&a, &b| p_values[a].total_cmp(&p_values[b]));

    let mut q_sorted = vec![0.0; n];
    let n_f64 = n as f64;

    // Start from largest p-value
    q_sorted[n - 1] = p_values[indices[n - 1]].min(1.0);

    for i in (0..n - 1).rev() {
        let rank = i + 1;
        let adjusted = p_values[indices[i]] * n_f64 / rank as f64;
        q_sorted[i] = adjusted.min(q_sorted[i + 1]).min(1.0);
    }

    let mut q_values = vec![0.0; n];
    for (i, &orig_idx) in indices.iter().enumerate() {
        q_values[orig_idx] = q_sorted[i];
    }
    q_values
}
