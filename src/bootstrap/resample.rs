//! Resampling configuration and index generation.
//!
//! Every iteration draws from its own random stream, seeded from the run seed
//! and the iteration number. Iterations therefore do not share RNG state and
//! a parallel run reproduces a sequential one exactly.

use crate::error::{RefnormError, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Configuration for bootstrap resampling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BootstrapConfig {
    /// Number of bootstrap iterations.
    pub n_iter: usize,
    /// Random seed for reproducibility.
    pub seed: u64,
    /// Whether to run iterations in parallel.
    pub parallel: bool,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            n_iter: 1000,
            seed: 42,
            parallel: true,
        }
    }
}

impl BootstrapConfig {
    /// Create a quick configuration for testing (fewer iterations).
    pub fn quick() -> Self {
        Self {
            n_iter: 100,
            ..Default::default()
        }
    }

    /// Create a thorough configuration (more iterations).
    pub fn thorough() -> Self {
        Self {
            n_iter: 10000,
            ..Default::default()
        }
    }

    /// Same settings with a seed derived for the `stream`-th independent run.
    pub fn for_stream(&self, stream: usize) -> Self {
        Self {
            seed: splitmix64(self.seed ^ splitmix64(stream as u64)),
            ..self.clone()
        }
    }

    /// Seeded resampler for this configuration.
    pub fn resampler(&self) -> SeededResampler {
        SeededResampler::new(self.seed)
    }

    pub fn validate(&self) -> Result<()> {
        if self.n_iter == 0 {
            return Err(RefnormError::InvalidParameter(
                "n_iter must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

fn splitmix64(mut z: u64) -> u64 {
    z = z.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Source of resample indices.
///
/// `draw(iteration, n)` returns `n` row positions in `0..n` for one iteration.
/// Implementations must not depend on call order.
pub trait Resampler: Sync {
    fn draw(&self, iteration: usize, n: usize) -> Result<Vec<usize>>;
}

/// Uniform sampling with replacement, one `StdRng` per iteration.
#[derive(Debug, Clone, Copy)]
pub struct SeededResampler {
    seed: u64,
}

impl SeededResampler {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }
}

impl Resampler for SeededResampler {
    fn draw(&self, iteration: usize, n: usize) -> Result<Vec<usize>> {
        let mut rng = StdRng::seed_from_u64(self.seed.wrapping_add(iteration as u64));
        Ok((0..n).map(|_| rng.gen_range(0..n)).collect())
    }
}

/// Replays a fixed list of index vectors, one per iteration.
#[derive(Debug, Clone)]
pub struct FixedResampler {
    indices: Vec<Vec<usize>>,
}

impl FixedResampler {
    pub fn new(indices: Vec<Vec<usize>>) -> Self {
        Self { indices }
    }

    /// Number of iterations available.
    pub fn n_iter(&self) -> usize {
        self.indices.len()
    }
}

impl Resampler for FixedResampler {
    fn draw(&self, iteration: usize, _n: usize) -> Result<Vec<usize>> {
        self.indices.get(iteration).cloned().ok_or_else(|| {
            RefnormError::InvalidParameter(format!(
                "No resample indices for iteration {} ({} available)",
                iteration,
                self.indices.len()
            ))
        })
    }
}

/// Draw indices and check they form a resample of size `n`.
pub(crate) fn draw_checked<R: Resampler + ?Sized>(
    resampler: &R,
    iteration: usize,
    n: usize,
) -> Result<Vec<usize>> {
    let indices = resampler.draw(iteration, n)?;
    if indices.len() != n {
        return Err(RefnormError::DimensionMismatch {
            expected: n,
            actual: indices.len(),
        });
    }
    Ok(indices)
}

/// Run `iteration` for `0..n_iter`, in parallel if configured.
///
/// Output is in iteration order either way; the first error aborts the run.
pub(crate) fn run_iterations<T, F>(config: &BootstrapConfig, iteration: F) -> Result<Vec<T>>
where
    T: Send,
    F: Fn(usize) -> Result<T> + Sync + Send,
{
    if config.parallel {
        (0..config.n_iter).into_par_iter().map(iteration).collect()
    } else {
        (0..config.n_iter).map(iteration).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_draws_are_reproducible() {
        let a = SeededResampler::new(7);
        let b = SeededResampler::new(7);

        for iteration in 0..5 {
            let draw = a.draw(iteration, 25).unwrap();
            assert_eq!(draw, b.draw(iteration, 25).unwrap());
            assert_eq!(draw.len(), 25);
            assert!(draw.iter().all(|&i| i < 25));
        }
        assert_ne!(a.draw(0, 25).unwrap(), a.draw(1, 25).unwrap());
    }

    #[test]
    fn test_draws_use_replacement() {
        let draw = SeededResampler::new(1).draw(0, 200).unwrap();
        let mut unique = draw.clone();
        unique.sort_unstable();
        unique.dedup();
        assert!(unique.len() < draw.len());
    }

    #[test]
    fn test_streams_differ() {
        let config = BootstrapConfig::default();
        let s0 = config.for_stream(0);
        let s1 = config.for_stream(1);

        assert_ne!(s0.seed, s1.seed);
        assert_eq!(s0, config.for_stream(0));
        assert_eq!(s0.n_iter, config.n_iter);
    }

    #[test]
    fn test_fixed_resampler() {
        let fixed = FixedResampler::new(vec![vec![0, 1], vec![1, 1]]);
        assert_eq!(fixed.n_iter(), 2);
        assert_eq!(fixed.draw(1, 2).unwrap(), vec![1, 1]);
        assert!(fixed.draw(2, 2).is_err());
        assert!(draw_checked(&fixed, 0, 3).is_err());
    }

    #[test]
    fn test_run_iterations_order() {
        let parallel = BootstrapConfig { n_iter: 64, seed: 0, parallel: true };
        let sequential = BootstrapConfig { parallel: false, ..parallel.clone() };

        let p = run_iterations(&parallel, |i| Ok(i * 2)).unwrap();
        let s = run_iterations(&sequential, |i| Ok(i * 2)).unwrap();
        assert_eq!(p, s);
        assert_eq!(p[10], 20);
    }

    #[test]
    fn test_zero_iterations_invalid() {
        let config = BootstrapConfig { n_iter: 0, ..Default::default() };
        assert!(config.validate().is_err());
    }
}
