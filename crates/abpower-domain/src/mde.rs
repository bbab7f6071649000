//! Minimum-detectable-effect sweep
//!
//! Solves the required sample size for a geometric progression of relative
//! lifts from 1% to 100% over the baseline rate.

use crate::error::{DomainError, DomainResult};
use crate::hypothesis::{Alternative, TestConfiguration};
use crate::power::linspace;
use crate::sample_size::{solve_sample_size, SolverConfig};

/// Smallest relative lift in the sweep, in percent
pub const MIN_RELATIVE_LIFT_PCT: f64 = 1.0;

/// Largest relative lift in the sweep, in percent
pub const MAX_RELATIVE_LIFT_PCT: f64 = 100.0;

/// Allowed number of swept lifts
pub const MDE_POINTS_RANGE: std::ops::RangeInclusive<usize> = 5..=50;

/// One point of the MDE / sample-size trade-off curve
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MdePoint {
    /// Relative lift over the baseline, in percent
    pub relative_lift_pct: f64,
    /// Absolute lift `comparison - baseline`, in proportion units
    pub absolute_lift: f64,
    /// Comparison rate implied by the lift, in proportion units
    pub comparison: f64,
    /// Required per-variant sample size
    pub sample_size_per_variant: f64,
}

/// `num` samples spaced evenly on a log scale over `[start, stop]`
///
/// Both endpoints are returned exactly. `start` and `stop` must be positive.
pub fn geomspace(start: f64, stop: f64, num: usize) -> Vec<f64> {
    let mut values: Vec<f64> = linspace(start.log10(), stop.log10(), num)
        .into_iter()
        .map(|exponent| 10f64.powf(exponent))
        .collect();

    if let Some(first) = values.first_mut() {
        *first = start;
    }
    if num > 1 {
        values[num - 1] = stop;
    }
    values
}

/// Sweep relative lifts and solve the sample size for each one
///
/// Lifts implying a comparison rate of 100% or more, and lifts whose solved
/// size reaches `solver.max_sample_size`, are left out of the curve. The
/// remaining points keep the ascending order of the lifts.
pub fn mde_curve(
    baseline: f64,
    alpha: f64,
    target_power: f64,
    alternative: Alternative,
    correlation: f64,
    num_points: usize,
    solver: &SolverConfig,
) -> DomainResult<Vec<MdePoint>> {
    if !MDE_POINTS_RANGE.contains(&num_points) {
        return Err(DomainError::out_of_range(
            "num_points",
            num_points as f64,
            "[5, 50]",
        ));
    }

    // Validates everything except the comparison rate, which varies per lift
    let base = TestConfiguration::new(baseline, baseline, alpha, alternative, correlation)?;

    let mut points = Vec::with_capacity(num_points);
    for relative_lift_pct in geomspace(MIN_RELATIVE_LIFT_PCT, MAX_RELATIVE_LIFT_PCT, num_points) {
        let comparison = baseline * (1.0 + relative_lift_pct / 100.0);
        if comparison >= 1.0 {
            continue;
        }

        let config = base.with_comparison(comparison)?;
        let solved = solve_sample_size(&config, target_power, solver)?;
        if solved.sample_size_per_variant >= solver.max_sample_size {
            continue;
        }

        points.push(MdePoint {
            relative_lift_pct,
            absolute_lift: comparison - baseline,
            comparison,
            sample_size_per_variant: solved.sample_size_per_variant,
        });
    }

    Ok(points)
}
