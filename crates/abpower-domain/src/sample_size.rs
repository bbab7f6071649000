//! Sample-size solver
//!
//! Bisects the per-variant sample size against the power evaluator. Power is
//! non-decreasing in `n` for a fixed configuration, so the upper bound always
//! holds a size that meets the target (or the ceiling when none does).

use crate::error::DomainResult;
use crate::hypothesis::{check_probability, TestConfiguration};
use crate::power::power_curve;

/// Lower bound of the search interval
pub const MIN_SAMPLE_SIZE: f64 = 10.0;

/// Upper bound of the search interval and practical per-variant ceiling
pub const MAX_SAMPLE_SIZE: f64 = 1_000_000.0;

/// Number of bisections (resolution of `MAX_SAMPLE_SIZE / 2^40`)
pub const SEARCH_ITERATIONS: u32 = 40;

/// Density resolution used while searching; it has no effect on power
pub const SEARCH_CURVE_POINTS: usize = 51;

/// Fraction of the ceiling at which a result is flagged as exceeding it
pub const CEILING_THRESHOLD: f64 = 0.99;

/// Search bounds and ceiling used by the solver
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverConfig {
    /// Lower search bound
    pub min_sample_size: f64,
    /// Upper search bound
    pub max_sample_size: f64,
    /// Fixed number of bisections
    pub iterations: u32,
    /// Curve points requested from the power evaluator per iteration
    pub search_curve_points: usize,
    /// Results at or above `max_sample_size * ceiling_threshold` are flagged
    pub ceiling_threshold: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            min_sample_size: MIN_SAMPLE_SIZE,
            max_sample_size: MAX_SAMPLE_SIZE,
            iterations: SEARCH_ITERATIONS,
            search_curve_points: SEARCH_CURVE_POINTS,
            ceiling_threshold: CEILING_THRESHOLD,
        }
    }
}

impl SolverConfig {
    /// Whether a solved size should be reported as hitting the ceiling
    pub fn exceeds_ceiling(&self, sample_size: f64) -> bool {
        sample_size >= self.max_sample_size * self.ceiling_threshold
    }
}

/// Outcome of a sample-size search
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleSizeResult {
    /// Smallest per-variant size found to reach the target power
    pub sample_size_per_variant: f64,
    /// Set when the result is at or near the search ceiling
    pub exceeds_max_sample_size: bool,
}

/// Find the per-variant sample size reaching `target_power`
///
/// Runs exactly `solver.iterations` bisections over
/// `[min_sample_size, max_sample_size]`, evaluating power at `floor(mid)`,
/// and returns the final upper bound.
pub fn solve_sample_size(
    config: &TestConfiguration,
    target_power: f64,
    solver: &SolverConfig,
) -> DomainResult<SampleSizeResult> {
    check_probability("power", target_power)?;

    let mut low = solver.min_sample_size;
    let mut high = solver.max_sample_size;

    for _ in 0..solver.iterations {
        let mid = (low + high) / 2.0;
        let result = power_curve(config, mid.floor() as u64, solver.search_curve_points)?;

        if result.power() >= target_power {
            high = mid;
        } else {
            low = mid;
        }
    }

    Ok(SampleSizeResult {
        sample_size_per_variant: high,
        exceeds_max_sample_size: solver.exceeds_ceiling(high),
    })
}
