//! Percent-scaled planning operations
//!
//! Callers speak in percent (0–100) for every rate; the engine works in
//! proportions. These operations convert on the way in and out and bundle
//! the derived summaries a front end displays.

use crate::error::DomainResult;
use crate::hypothesis::{Alternative, TestConfiguration};
use crate::mde::mde_curve;
use crate::power::{density_curve, evaluate_power, power_curve, DEFAULT_CURVE_POINTS};
use crate::sample_size::{solve_sample_size, SolverConfig};
use crate::variance::cuped_reduction_pct;

fn to_pct(value: f64) -> f64 {
    value * 100.0
}

/// Inputs of a power-curve computation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PowerCurveRequest {
    /// Baseline rate in percent
    pub baseline_pct: f64,
    /// Comparison rate in percent
    pub comparison_pct: f64,
    /// Observations per variant
    pub sample_size_per_variant: u64,
    /// Significance level
    pub alpha: f64,
    /// Direction of the test
    pub alternative: Alternative,
    /// CUPED pre-experiment correlation
    pub correlation: f64,
    /// Resolution of the plotted densities
    pub num_points: usize,
}

impl PowerCurveRequest {
    /// Request with default alpha (0.05), two-sided test, no CUPED
    pub fn new(baseline_pct: f64, comparison_pct: f64, sample_size_per_variant: u64) -> Self {
        Self {
            baseline_pct,
            comparison_pct,
            sample_size_per_variant,
            alpha: 0.05,
            alternative: Alternative::TwoSided,
            correlation: 0.0,
            num_points: DEFAULT_CURVE_POINTS,
        }
    }
}

/// Same test evaluated without CUPED, for overlaying on a CUPED curve
#[derive(Debug, Clone, PartialEq)]
pub struct UnadjustedComparison {
    /// Null density without variance reduction, over the report's x axis
    pub null_pdf: Vec<f64>,
    /// Alternative density without variance reduction
    pub alt_pdf: Vec<f64>,
    /// Lower threshold in percent
    pub crit_low_pct: Option<f64>,
    /// Upper threshold in percent
    pub crit_high_pct: Option<f64>,
    /// Power without variance reduction
    pub power: f64,
}

/// Power curve with every rate expressed in percent
#[derive(Debug, Clone, PartialEq)]
pub struct PowerCurveReport {
    /// Significance level
    pub alpha: f64,
    /// Baseline rate in percent
    pub baseline_pct: f64,
    /// Comparison rate in percent
    pub comparison_pct: f64,
    /// Observations per variant
    pub sample_size_per_variant: u64,
    /// Statistical power
    pub power: f64,
    /// Type II error rate
    pub beta: f64,
    /// Lower threshold in percent (absent for `greater`)
    pub crit_low_pct: Option<f64>,
    /// Upper threshold in percent (absent for `less`)
    pub crit_high_pct: Option<f64>,
    /// Shared x axis in percent
    pub x_pct: Vec<f64>,
    /// Null density over `x_pct`
    pub null_pdf: Vec<f64>,
    /// Alternative density over `x_pct`
    pub alt_pdf: Vec<f64>,
    /// Direction of the test
    pub alternative: Alternative,
    /// CUPED pre-experiment correlation
    pub correlation: f64,
    /// Percentage of variance removed by CUPED
    pub variance_reduction_pct: f64,
    /// Present only when CUPED is active
    pub unadjusted: Option<UnadjustedComparison>,
}

/// Compute the power curve for percent-scaled inputs
pub fn compute_power_curve(request: &PowerCurveRequest) -> DomainResult<PowerCurveReport> {
    let config = TestConfiguration::from_percent(
        request.baseline_pct,
        request.comparison_pct,
        request.alpha,
        request.alternative,
        request.correlation,
    )?;

    let n = request.sample_size_per_variant;
    let result = power_curve(&config, n, request.num_points)?;

    let unadjusted = if request.correlation > 0.0 {
        let plain = evaluate_power(&config.without_cuped(), n)?;
        Some(UnadjustedComparison {
            null_pdf: density_curve(&result.x, config.baseline, plain.variance.se_null)?,
            alt_pdf: density_curve(&result.x, config.comparison, plain.variance.se_alt)?,
            crit_low_pct: plain.critical.low().map(to_pct),
            crit_high_pct: plain.critical.high().map(to_pct),
            power: plain.power,
        })
    } else {
        None
    };

    Ok(PowerCurveReport {
        alpha: request.alpha,
        baseline_pct: request.baseline_pct,
        comparison_pct: request.comparison_pct,
        sample_size_per_variant: n,
        power: result.power(),
        beta: result.beta(),
        crit_low_pct: result.critical_low().map(to_pct),
        crit_high_pct: result.critical_high().map(to_pct),
        x_pct: result.x.iter().copied().map(to_pct).collect(),
        variance_reduction_pct: result.summary.variance.variance_reduction_pct,
        null_pdf: result.null_pdf,
        alt_pdf: result.alt_pdf,
        alternative: request.alternative,
        correlation: request.correlation,
        unadjusted,
    })
}

/// Inputs of a sample-size computation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleSizeRequest {
    /// Baseline rate in percent
    pub baseline_pct: f64,
    /// Comparison rate in percent
    pub comparison_pct: f64,
    /// Significance level
    pub alpha: f64,
    /// Target power
    pub power: f64,
    /// Direction of the test
    pub alternative: Alternative,
    /// CUPED pre-experiment correlation
    pub correlation: f64,
}

impl SampleSizeRequest {
    /// Request with alpha 0.05, power 0.8, two-sided test, no CUPED
    pub fn new(baseline_pct: f64, comparison_pct: f64) -> Self {
        Self {
            baseline_pct,
            comparison_pct,
            alpha: 0.05,
            power: 0.8,
            alternative: Alternative::TwoSided,
            correlation: 0.0,
        }
    }
}

/// Required sample size plus lift summaries
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleSizeReport {
    /// Baseline rate in percent
    pub baseline_pct: f64,
    /// Comparison rate in percent
    pub comparison_pct: f64,
    /// Significance level
    pub alpha: f64,
    /// Target power
    pub power: f64,
    /// Required observations per variant
    pub sample_size_per_variant: f64,
    /// Both variants together
    pub total_sample_size: f64,
    /// Percentage-point difference between comparison and baseline
    pub absolute_lift_pct: f64,
    /// Relative change over the baseline, in percent
    pub relative_lift_pct: f64,
    /// Set when the result is at or near the search ceiling
    pub exceeds_max_sample_size: bool,
    /// Direction of the test
    pub alternative: Alternative,
    /// CUPED pre-experiment correlation
    pub correlation: f64,
    /// Percentage of variance removed by CUPED
    pub variance_reduction_pct: f64,
}

/// Solve the per-variant sample size for percent-scaled inputs
pub fn compute_sample_size(
    request: &SampleSizeRequest,
    solver: &SolverConfig,
) -> DomainResult<SampleSizeReport> {
    let config = TestConfiguration::from_percent(
        request.baseline_pct,
        request.comparison_pct,
        request.alpha,
        request.alternative,
        request.correlation,
    )?;

    let solved = solve_sample_size(&config, request.power, solver)?;
    let n = solved.sample_size_per_variant;

    Ok(SampleSizeReport {
        baseline_pct: request.baseline_pct,
        comparison_pct: request.comparison_pct,
        alpha: request.alpha,
        power: request.power,
        sample_size_per_variant: n,
        total_sample_size: n * 2.0,
        absolute_lift_pct: request.comparison_pct - request.baseline_pct,
        relative_lift_pct: (request.comparison_pct / request.baseline_pct - 1.0) * 100.0,
        exceeds_max_sample_size: solved.exceeds_max_sample_size,
        alternative: request.alternative,
        correlation: request.correlation,
        variance_reduction_pct: cuped_reduction_pct(request.correlation),
    })
}

/// Inputs of an MDE sweep
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MdeCurveRequest {
    /// Baseline rate in percent
    pub baseline_pct: f64,
    /// Significance level
    pub alpha: f64,
    /// Target power
    pub power: f64,
    /// Direction of the test
    pub alternative: Alternative,
    /// Number of swept lifts, 5 to 50
    pub num_points: usize,
    /// CUPED pre-experiment correlation
    pub correlation: f64,
}

impl MdeCurveRequest {
    /// Request with alpha 0.05, power 0.8, two-sided test, 20 points, no CUPED
    pub fn new(baseline_pct: f64) -> Self {
        Self {
            baseline_pct,
            alpha: 0.05,
            power: 0.8,
            alternative: Alternative::TwoSided,
            num_points: 20,
            correlation: 0.0,
        }
    }
}

/// One MDE curve point with rates in percent
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MdeCurvePoint {
    /// Relative lift over the baseline, in percent
    pub relative_lift_pct: f64,
    /// Percentage-point lift
    pub absolute_lift_pct: f64,
    /// Comparison rate in percent
    pub comparison_pct: f64,
    /// Required observations per variant
    pub sample_size_per_variant: f64,
}

/// MDE / sample-size trade-off curve
#[derive(Debug, Clone, PartialEq)]
pub struct MdeCurveReport {
    /// Baseline rate in percent
    pub baseline_pct: f64,
    /// Significance level
    pub alpha: f64,
    /// Target power
    pub power: f64,
    /// Points in ascending lift order; skipped lifts leave no entry
    pub points: Vec<MdeCurvePoint>,
}

/// Sweep relative lifts for a percent-scaled baseline
pub fn compute_mde_curve(
    request: &MdeCurveRequest,
    solver: &SolverConfig,
) -> DomainResult<MdeCurveReport> {
    // from_percent reports the baseline against its percent range
    let baseline = TestConfiguration::from_percent(
        request.baseline_pct,
        request.baseline_pct,
        request.alpha,
        request.alternative,
        request.correlation,
    )?
    .baseline;

    let points = mde_curve(
        baseline,
        request.alpha,
        request.power,
        request.alternative,
        request.correlation,
        request.num_points,
        solver,
    )?
    .into_iter()
    .map(|point| MdeCurvePoint {
        relative_lift_pct: point.relative_lift_pct,
        absolute_lift_pct: to_pct(point.absolute_lift),
        comparison_pct: to_pct(point.comparison),
        sample_size_per_variant: point.sample_size_per_variant,
    })
    .collect();

    Ok(MdeCurveReport {
        baseline_pct: request.baseline_pct,
        alpha: request.alpha,
        power: request.power,
        points,
    })
}
