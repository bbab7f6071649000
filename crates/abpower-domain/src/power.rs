//! Power evaluation in conversion-rate space
//!
//! The observed rate is modelled as `N(p0, se0²)` under the null and
//! `N(p1, se1²)` under the alternative. The critical region is computed in
//! z-space, mapped back around `p0` with `se0`, and power is read off the
//! alternative distribution's CDF.

use crate::error::{DomainError, DomainResult};
use crate::hypothesis::{check_probability, Alternative, TestConfiguration};
use crate::variance::VarianceModel;
use statrs::distribution::{Continuous, ContinuousCDF, Normal};

/// Default number of samples on the plotted x axis
pub const DEFAULT_CURVE_POINTS: usize = 201;

/// Rejection region of the test, in proportion units
///
/// The variant determines which thresholds exist: a two-sided test has both,
/// a `greater` test only the upper one and a `less` test only the lower one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CriticalRegion {
    /// Reject below `low` or above `high`
    TwoSided {
        /// Lower threshold
        low: f64,
        /// Upper threshold
        high: f64,
    },
    /// Reject above `high`
    Upper {
        /// Upper threshold
        high: f64,
    },
    /// Reject below `low`
    Lower {
        /// Lower threshold
        low: f64,
    },
}

impl CriticalRegion {
    /// Map the critical z value back around the null mean
    pub fn around(alternative: Alternative, p0: f64, z_crit: f64, se_null: f64) -> Self {
        let offset = z_crit * se_null;
        match alternative {
            Alternative::TwoSided => CriticalRegion::TwoSided {
                low: p0 - offset,
                high: p0 + offset,
            },
            Alternative::Greater => CriticalRegion::Upper { high: p0 + offset },
            Alternative::Less => CriticalRegion::Lower { low: p0 - offset },
        }
    }

    /// Lower threshold, if the region has one
    pub fn low(&self) -> Option<f64> {
        match *self {
            CriticalRegion::TwoSided { low, .. } | CriticalRegion::Lower { low } => Some(low),
            CriticalRegion::Upper { .. } => None,
        }
    }

    /// Upper threshold, if the region has one
    pub fn high(&self) -> Option<f64> {
        match *self {
            CriticalRegion::TwoSided { high, .. } | CriticalRegion::Upper { high } => Some(high),
            CriticalRegion::Lower { .. } => None,
        }
    }

    /// Probability of *not* rejecting when the observed rate follows `alt`
    fn acceptance_probability(&self, alt: &Normal) -> f64 {
        match *self {
            CriticalRegion::TwoSided { low, high } => alt.cdf(high) - alt.cdf(low),
            CriticalRegion::Upper { high } => alt.cdf(high),
            CriticalRegion::Lower { low } => 1.0 - alt.cdf(low),
        }
    }
}

/// Scalar outcome of a power evaluation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PowerSummary {
    /// Configuration that was evaluated
    pub config: TestConfiguration,
    /// Observations per variant
    pub sample_size_per_variant: u64,
    /// Standard errors used for both groups
    pub variance: VarianceModel,
    /// Rejection thresholds
    pub critical: CriticalRegion,
    /// Probability of rejecting the null under the alternative
    pub power: f64,
    /// Type II error rate, `1 - power`
    pub beta: f64,
}

/// Power evaluation plus the densities needed to plot both distributions
#[derive(Debug, Clone, PartialEq)]
pub struct PowerCurveResult {
    /// Scalar results
    pub summary: PowerSummary,
    /// Shared x axis in proportion units, strictly increasing
    pub x: Vec<f64>,
    /// Null density sampled over `x`
    pub null_pdf: Vec<f64>,
    /// Alternative density sampled over `x`
    pub alt_pdf: Vec<f64>,
}

impl PowerCurveResult {
    /// Statistical power
    pub fn power(&self) -> f64 {
        self.summary.power
    }

    /// Type II error rate
    pub fn beta(&self) -> f64 {
        self.summary.beta
    }

    /// Lower critical threshold (absent for `greater` tests)
    pub fn critical_low(&self) -> Option<f64> {
        self.summary.critical.low()
    }

    /// Upper critical threshold (absent for `less` tests)
    pub fn critical_high(&self) -> Option<f64> {
        self.summary.critical.high()
    }
}

/// Critical value of the standard normal for the given test
pub fn z_critical(alpha: f64, alternative: Alternative) -> DomainResult<f64> {
    check_probability("alpha", alpha)?;
    let tail = if alternative.is_two_sided() {
        alpha / 2.0
    } else {
        alpha
    };
    Ok(standard_normal()?.inverse_cdf(1.0 - tail))
}

/// Evaluate power and critical thresholds at `n` observations per variant
pub fn evaluate_power(config: &TestConfiguration, n: u64) -> DomainResult<PowerSummary> {
    let p0 = config.baseline;
    let p1 = config.comparison;

    check_probability("baseline", p0)?;
    check_probability("comparison", p1)?;
    let variance = VarianceModel::new(p0, p1, n, config.correlation)?;

    let z_crit = z_critical(config.alpha, config.alternative)?;
    let critical = CriticalRegion::around(config.alternative, p0, z_crit, variance.se_null);

    let alt = normal(p1, variance.se_alt)?;

    // beta absorbs the clamping, power is derived from it
    let beta = critical.acceptance_probability(&alt).clamp(0.0, 1.0);
    let power = 1.0 - beta;

    Ok(PowerSummary {
        config: *config,
        sample_size_per_variant: n,
        variance,
        critical,
        power,
        beta,
    })
}

/// Evaluate power and sample both densities over `num_points` x values
///
/// Fails with `Numerical` when the standard errors are too small for the x
/// axis to hold `num_points` strictly increasing samples.
pub fn power_curve(
    config: &TestConfiguration,
    n: u64,
    num_points: usize,
) -> DomainResult<PowerCurveResult> {
    if num_points < 2 {
        return Err(DomainError::out_of_range(
            "num_points",
            num_points as f64,
            "[2, inf)",
        ));
    }

    let summary = evaluate_power(config, n)?;
    let p0 = config.baseline;
    let p1 = config.comparison;
    let se_max = summary.variance.max_se();

    let x_min = (p0.min(p1) - 4.0 * se_max).max(0.0);
    let x_max = (p0.max(p1) + 4.0 * se_max).min(1.0);
    let x = linspace(x_min, x_max, num_points);
    if x.windows(2).any(|w| w[0] >= w[1]) {
        return Err(DomainError::Numerical(format!(
            "x axis [{}, {}] cannot hold {} distinct samples",
            x_min, x_max, num_points
        )));
    }

    let null_pdf = density_curve(&x, p0, summary.variance.se_null)?;
    let alt_pdf = density_curve(&x, p1, summary.variance.se_alt)?;

    Ok(PowerCurveResult {
        summary,
        x,
        null_pdf,
        alt_pdf,
    })
}

/// Normal density with the given mean and standard error, sampled over `x`
///
/// Fails when the standard error is degenerate or any sample is not finite.
pub fn density_curve(x: &[f64], mean: f64, se: f64) -> DomainResult<Vec<f64>> {
    let dist = normal(mean, se)?;
    let pdf: Vec<f64> = x.iter().map(|&xi| dist.pdf(xi)).collect();

    if pdf.iter().any(|v| !v.is_finite()) {
        return Err(DomainError::Numerical(format!(
            "non-finite density for mean {} and standard error {}",
            mean, se
        )));
    }

    Ok(pdf)
}

/// `num` evenly spaced samples over `[start, stop]`, both ends included
pub fn linspace(start: f64, stop: f64, num: usize) -> Vec<f64> {
    match num {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (num - 1) as f64;
            let mut values: Vec<f64> = (0..num).map(|i| start + i as f64 * step).collect();
            values[num - 1] = stop;
            values
        }
    }
}

fn standard_normal() -> DomainResult<Normal> {
    normal(0.0, 1.0)
}

fn normal(mean: f64, std_dev: f64) -> DomainResult<Normal> {
    Normal::new(mean, std_dev).map_err(|e| {
        DomainError::Numerical(format!(
            "invalid normal distribution (mean {}, sd {}): {}",
            mean, std_dev, e
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(alternative: Alternative) -> TestConfiguration {
        TestConfiguration::new(0.10, 0.12, 0.05, alternative, 0.0).unwrap()
    }

    #[test]
    fn test_z_critical_values() {
        let two = z_critical(0.05, Alternative::TwoSided).unwrap();
        let one = z_critical(0.05, Alternative::Greater).unwrap();
        assert!((two - 1.959964).abs() < 1e-5);
        assert!((one - 1.644854).abs() < 1e-5);
        assert!(z_critical(1.0, Alternative::TwoSided).is_err());
    }

    #[test]
    fn test_basic_power_curve() {
        let result = power_curve(&config(Alternative::TwoSided), 1000, DEFAULT_CURVE_POINTS).unwrap();
        assert_eq!(result.x.len(), 201);
        assert_eq!(result.null_pdf.len(), 201);
        assert_eq!(result.alt_pdf.len(), 201);
        assert!(result.power() > 0.0 && result.power() < 1.0);
        assert!((result.power() + result.beta() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_two_sided_thresholds_bracket_baseline() {
        let result = power_curve(&config(Alternative::TwoSided), 1000, 51).unwrap();
        let low = result.critical_low().unwrap();
        let high = result.critical_high().unwrap();
        assert!(low < 0.10 && 0.10 < high);
        assert!((0.10 - low - (high - 0.10)).abs() < 1e-12);
    }

    #[test]
    fn test_one_sided_thresholds() {
        let greater = evaluate_power(&config(Alternative::Greater), 1000).unwrap();
        assert!(greater.critical.low().is_none());
        assert!(greater.critical.high().is_some());

        let less_config = TestConfiguration::new(0.12, 0.10, 0.05, Alternative::Less, 0.0).unwrap();
        let less = evaluate_power(&less_config, 1000).unwrap();
        assert!(less.critical.low().is_some());
        assert!(less.critical.high().is_none());
        assert!(less.power > 0.0 && less.power < 1.0);
    }

    #[test]
    fn test_one_sided_has_more_power() {
        let greater = evaluate_power(&config(Alternative::Greater), 1000).unwrap();
        let two = evaluate_power(&config(Alternative::TwoSided), 1000).unwrap();
        assert!(greater.power > two.power);
    }

    #[test]
    fn test_thresholds_use_null_standard_error() {
        let summary = evaluate_power(&config(Alternative::Greater), 1000).unwrap();
        let z = z_critical(0.05, Alternative::Greater).unwrap();
        let expected = 0.10 + z * summary.variance.se_null;
        assert!((summary.critical.high().unwrap() - expected).abs() < 1e-15);
    }

    #[test]
    fn test_densities_integrate_to_one() {
        let result = power_curve(&config(Alternative::TwoSided), 1000, DEFAULT_CURVE_POINTS).unwrap();
        let trapezoid = |ys: &[f64]| -> f64 {
            result
                .x
                .windows(2)
                .zip(ys.windows(2))
                .map(|(xs, ys)| (xs[1] - xs[0]) * (ys[0] + ys[1]) / 2.0)
                .sum()
        };
        assert!((trapezoid(&result.null_pdf) - 1.0).abs() < 0.01);
        assert!((trapezoid(&result.alt_pdf) - 1.0).abs() < 0.01);
        assert!(result.null_pdf.iter().all(|&v| v >= 0.0));
    }

    #[test]
    fn test_axis_is_clipped_to_unit_interval() {
        let config = TestConfiguration::new(0.01, 0.02, 0.05, Alternative::TwoSided, 0.0).unwrap();
        let result = power_curve(&config, 20, 101).unwrap();
        assert_eq!(result.x[0], 0.0);
        assert!(result.x.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_cuped_increases_power() {
        let plain = evaluate_power(&config(Alternative::TwoSided), 1000).unwrap();
        let cuped_config =
            TestConfiguration::new(0.10, 0.12, 0.05, Alternative::TwoSided, 0.7).unwrap();
        let cuped = evaluate_power(&cuped_config, 1000).unwrap();
        assert!(cuped.power > plain.power);
        assert!((cuped.variance.variance_reduction_pct - 49.0).abs() < 1e-9);
    }

    #[test]
    fn test_invalid_inputs_rejected() {
        assert!(evaluate_power(&config(Alternative::TwoSided), 0).is_err());
        assert!(power_curve(&config(Alternative::TwoSided), 100, 1).is_err());

        let mut bad = config(Alternative::TwoSided);
        bad.baseline = 1.0;
        assert!(evaluate_power(&bad, 100).is_err());
    }

    #[test]
    fn test_degenerate_density_is_numerical_error() {
        let x = linspace(0.09, 0.11, 5);
        let err = density_curve(&x, 0.10, 0.0).unwrap_err();
        assert!(matches!(err, DomainError::Numerical(_)));
    }

    #[test]
    fn test_collapsed_axis_is_numerical_error() {
        let config = TestConfiguration::new(
            0.5,
            0.5,
            0.05,
            Alternative::TwoSided,
            0.9999999999999999,
        )
        .unwrap();

        let err = power_curve(&config, u64::MAX, DEFAULT_CURVE_POINTS).unwrap_err();
        assert!(matches!(err, DomainError::Numerical(_)));

        // The scalar evaluation does not depend on the axis
        assert!(evaluate_power(&config, u64::MAX).is_ok());
    }

    #[test]
    fn test_linspace_endpoints() {
        let xs = linspace(0.0, 1.0, 5);
        assert_eq!(xs, vec![0.0, 0.25, 0.5, 0.75, 1.0]);
        assert_eq!(linspace(0.3, 0.7, 1), vec![0.3]);
        assert!(linspace(0.3, 0.7, 0).is_empty());
    }
}
