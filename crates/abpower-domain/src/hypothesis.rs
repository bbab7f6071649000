//! Hypothesis module - test direction and the validated test configuration

use crate::error::{DomainError, DomainResult};
use crate::variance::cuped_factor;

/// Alternative hypothesis of a two-sample proportion test
///
/// - TwoSided: detect any change (increase or decrease)
/// - Greater: detect an increase (comparison above baseline)
/// - Less: detect a decrease (comparison below baseline)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Alternative {
    /// Reject on either tail
    #[default]
    TwoSided,

    /// Reject on the upper tail only
    Greater,

    /// Reject on the lower tail only
    Less,
}

impl Alternative {
    /// Get the wire name of the alternative
    pub fn as_str(&self) -> &'static str {
        match self {
            Alternative::TwoSided => "two-sided",
            Alternative::Greater => "greater",
            Alternative::Less => "less",
        }
    }

    /// Parse an alternative from its wire name
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "two-sided" => Some(Alternative::TwoSided),
            "greater" => Some(Alternative::Greater),
            "less" => Some(Alternative::Less),
            _ => None,
        }
    }

    /// Whether the critical region covers both tails
    pub fn is_two_sided(&self) -> bool {
        matches!(self, Alternative::TwoSided)
    }
}

impl std::str::FromStr for Alternative {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid alternative: {}", s))
    }
}

impl std::fmt::Display for Alternative {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validated configuration of a planned A/B proportion test
///
/// Rates are proportions in the open interval (0, 1). Boundary values are
/// rejected, never clamped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TestConfiguration {
    /// Baseline (control) conversion rate p0
    pub baseline: f64,
    /// Comparison (variant) conversion rate p1
    pub comparison: f64,
    /// Significance level
    pub alpha: f64,
    /// Direction of the test
    pub alternative: Alternative,
    /// Pre-experiment covariate correlation used for CUPED, in [0, 1)
    pub correlation: f64,
}

impl TestConfiguration {
    /// Build a configuration from proportions in (0, 1)
    pub fn new(
        baseline: f64,
        comparison: f64,
        alpha: f64,
        alternative: Alternative,
        correlation: f64,
    ) -> DomainResult<Self> {
        check_probability("baseline", baseline)?;
        check_probability("comparison", comparison)?;
        check_probability("alpha", alpha)?;
        cuped_factor(correlation)?;

        Ok(Self {
            baseline,
            comparison,
            alpha,
            alternative,
            correlation,
        })
    }

    /// Build a configuration from percent-scaled rates in (0, 100)
    pub fn from_percent(
        baseline_pct: f64,
        comparison_pct: f64,
        alpha: f64,
        alternative: Alternative,
        correlation: f64,
    ) -> DomainResult<Self> {
        check_percent("baseline_pct", baseline_pct)?;
        check_percent("comparison_pct", comparison_pct)?;
        Self::new(
            baseline_pct / 100.0,
            comparison_pct / 100.0,
            alpha,
            alternative,
            correlation,
        )
    }

    /// Same configuration with a different comparison rate
    pub fn with_comparison(&self, comparison: f64) -> DomainResult<Self> {
        check_probability("comparison", comparison)?;
        Ok(Self { comparison, ..*self })
    }

    /// Same configuration with CUPED disabled
    pub fn without_cuped(&self) -> Self {
        Self {
            correlation: 0.0,
            ..*self
        }
    }
}

/// Reject rates and probabilities outside the open interval (0, 1)
pub(crate) fn check_probability(field: &'static str, value: f64) -> DomainResult<()> {
    if value > 0.0 && value < 1.0 {
        Ok(())
    } else {
        Err(DomainError::out_of_range(field, value, "(0, 1)"))
    }
}

fn check_percent(field: &'static str, value: f64) -> DomainResult<()> {
    if value > 0.0 && value < 100.0 {
        Ok(())
    } else {
        Err(DomainError::out_of_range(field, value, "(0, 100)"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alternative_round_trip_names() {
        for alt in [Alternative::TwoSided, Alternative::Greater, Alternative::Less] {
            assert_eq!(Alternative::parse(alt.as_str()), Some(alt));
        }
        assert_eq!("GREATER".parse::<Alternative>(), Ok(Alternative::Greater));
        assert!("both".parse::<Alternative>().is_err());
    }

    #[test]
    fn test_default_alternative_is_two_sided() {
        assert_eq!(Alternative::default(), Alternative::TwoSided);
        assert!(Alternative::default().is_two_sided());
    }

    #[test]
    fn test_from_percent_scales_rates() {
        let config =
            TestConfiguration::from_percent(10.0, 12.0, 0.05, Alternative::TwoSided, 0.0).unwrap();
        assert!((config.baseline - 0.10).abs() < 1e-12);
        assert!((config.comparison - 0.12).abs() < 1e-12);
    }

    #[test]
    fn test_boundary_rates_rejected() {
        for bad in [0.0, 100.0, -5.0, f64::NAN] {
            let err = TestConfiguration::from_percent(bad, 12.0, 0.05, Alternative::TwoSided, 0.0)
                .unwrap_err();
            assert!(matches!(
                err,
                DomainError::OutOfRange { field: "baseline_pct", .. }
            ));
        }

        let err = TestConfiguration::from_percent(10.0, 100.0, 0.05, Alternative::TwoSided, 0.0)
            .unwrap_err();
        assert!(matches!(
            err,
            DomainError::OutOfRange { field: "comparison_pct", .. }
        ));
    }

    #[test]
    fn test_alpha_and_correlation_validated() {
        assert!(TestConfiguration::new(0.1, 0.12, 0.0, Alternative::TwoSided, 0.0).is_err());
        assert!(TestConfiguration::new(0.1, 0.12, 1.0, Alternative::TwoSided, 0.0).is_err());
        assert!(TestConfiguration::new(0.1, 0.12, 0.05, Alternative::TwoSided, 1.0).is_err());
        assert!(TestConfiguration::new(0.1, 0.12, 0.05, Alternative::TwoSided, -0.1).is_err());
        assert!(TestConfiguration::new(0.1, 0.12, 0.05, Alternative::TwoSided, -0.0).is_ok());
    }

    #[test]
    fn test_without_cuped_keeps_other_fields() {
        let config = TestConfiguration::new(0.1, 0.12, 0.05, Alternative::Less, 0.7).unwrap();
        let plain = config.without_cuped();
        assert_eq!(plain.correlation, 0.0);
        assert_eq!(plain.alternative, Alternative::Less);
        assert_eq!(plain.baseline, config.baseline);
    }
}
