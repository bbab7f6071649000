//! Variance model for the sample proportions of both groups
//!
//! Standard errors follow the normal approximation `sqrt(p(1-p)/n)`. CUPED
//! shrinks the variance of both groups by `1 - ρ²`, so each standard error
//! is multiplied by `sqrt(1 - ρ²)`.

use crate::error::{DomainError, DomainResult};

/// Factor applied to a standard error for a given pre-experiment correlation
///
/// Exactly `1.0` for a correlation of zero (including `-0.0`). The zero
/// check runs before the range check, so only strictly negative values,
/// values `>= 1` and NaN are rejected.
pub fn cuped_factor(correlation: f64) -> DomainResult<f64> {
    if correlation == 0.0 {
        return Ok(1.0);
    }
    if !(0.0..1.0).contains(&correlation) {
        return Err(DomainError::out_of_range("correlation", correlation, "[0, 1)"));
    }

    Ok((1.0 - correlation * correlation).sqrt())
}

/// Percentage of variance removed by CUPED (`ρ² × 100`)
pub fn cuped_reduction_pct(correlation: f64) -> f64 {
    if correlation <= 0.0 {
        return 0.0;
    }
    correlation * correlation * 100.0
}

/// Standard errors of both groups' sampling distributions
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VarianceModel {
    /// Standard error under the null (baseline rate), CUPED-adjusted
    pub se_null: f64,
    /// Standard error under the alternative (comparison rate), CUPED-adjusted
    pub se_alt: f64,
    /// Percentage of variance removed by CUPED
    pub variance_reduction_pct: f64,
}

impl VarianceModel {
    /// Derive the model for rates `p0`, `p1` at `n` observations per variant
    pub fn new(p0: f64, p1: f64, n: u64, correlation: f64) -> DomainResult<Self> {
        if n == 0 {
            return Err(DomainError::out_of_range(
                "sample_size_per_variant",
                0.0,
                "[1, inf)",
            ));
        }

        let factor = cuped_factor(correlation)?;
        let n = n as f64;

        Ok(Self {
            se_null: (p0 * (1.0 - p0) / n).sqrt() * factor,
            se_alt: (p1 * (1.0 - p1) / n).sqrt() * factor,
            variance_reduction_pct: cuped_reduction_pct(correlation),
        })
    }

    /// The wider of the two standard errors
    pub fn max_se(&self) -> f64 {
        self.se_null.max(self.se_alt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_correlation_is_identity() {
        assert_eq!(cuped_factor(0.0), Ok(1.0));
        assert_eq!(cuped_factor(-0.0), Ok(1.0));
        assert_eq!(cuped_reduction_pct(0.0), 0.0);
    }

    #[test]
    fn test_correlation_out_of_range() {
        assert!(cuped_factor(-0.1).is_err());
        assert!(cuped_factor(1.0).is_err());
        assert!(cuped_factor(1.5).is_err());
        assert!(cuped_factor(f64::NAN).is_err());
    }

    #[test]
    fn test_factor_and_reduction_for_point_seven() {
        let factor = cuped_factor(0.7).unwrap();
        assert!((factor - 0.51_f64.sqrt()).abs() < 1e-12);
        assert!((cuped_reduction_pct(0.7) - 49.0).abs() < 1e-9);
    }

    #[test]
    fn test_standard_errors() {
        let model = VarianceModel::new(0.1, 0.12, 1000, 0.0).unwrap();
        assert!((model.se_null - (0.09_f64 / 1000.0).sqrt()).abs() < 1e-15);
        assert!((model.se_alt - (0.1056_f64 / 1000.0).sqrt()).abs() < 1e-15);
        assert_eq!(model.max_se(), model.se_alt);
        assert_eq!(model.variance_reduction_pct, 0.0);
    }

    #[test]
    fn test_cuped_shrinks_both_groups_uniformly() {
        let plain = VarianceModel::new(0.1, 0.12, 1000, 0.0).unwrap();
        let cuped = VarianceModel::new(0.1, 0.12, 1000, 0.5).unwrap();
        let factor = 0.75_f64.sqrt();
        assert!((cuped.se_null - plain.se_null * factor).abs() < 1e-15);
        assert!((cuped.se_alt - plain.se_alt * factor).abs() < 1e-15);
        assert!((cuped.variance_reduction_pct - 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_sample_size_rejected() {
        assert!(VarianceModel::new(0.1, 0.12, 0, 0.0).is_err());
    }
}
