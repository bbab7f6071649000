//! JSON request and response bodies.
//!
//! Field names are camelCase on the wire. Requests are range-checked here
//! before they reach the engine, which re-validates on its own.

use abpower_domain::planner::UnadjustedComparison;
use abpower_domain::{
    Alternative, MdeCurveReport, MdeCurveRequest, PowerCurveReport, PowerCurveRequest,
    SampleSizeReport, SampleSizeRequest,
};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// A request field outside its accepted range
#[derive(Debug, Error)]
#[error("{field} must be {expected}, got {value}")]
pub struct ValidationError {
    /// Wire name of the field
    pub field: &'static str,
    /// Accepted range
    pub expected: &'static str,
    /// Rejected value
    pub value: String,
}

fn reject(field: &'static str, expected: &'static str, value: impl ToString) -> ValidationError {
    ValidationError {
        field,
        expected,
        value: value.to_string(),
    }
}

fn check_percent(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if value > 0.0 && value < 100.0 {
        Ok(())
    } else {
        Err(reject(field, "> 0 and < 100", value))
    }
}

fn check_unit(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if value > 0.0 && value < 1.0 {
        Ok(())
    } else {
        Err(reject(field, "> 0 and < 1", value))
    }
}

fn check_correlation(value: f64) -> Result<(), ValidationError> {
    if (0.0..1.0).contains(&value) {
        Ok(())
    } else {
        Err(reject("preExperimentCorrelation", ">= 0 and < 1", value))
    }
}

fn default_alpha() -> f64 {
    0.05
}

fn default_power() -> f64 {
    0.8
}

fn default_mde_points() -> usize {
    20
}

/// Wire form of the alternative hypothesis
///
/// Serialized as the engine's name for it (`"two-sided"`, `"greater"`,
/// `"less"`); parsing is case-insensitive and defaults to two-sided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AlternativeBody(pub Alternative);

impl Serialize for AlternativeBody {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.0.as_str())
    }
}

impl<'de> Deserialize<'de> for AlternativeBody {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        name.parse::<Alternative>()
            .map(AlternativeBody)
            .map_err(de::Error::custom)
    }
}

impl From<AlternativeBody> for Alternative {
    fn from(alternative: AlternativeBody) -> Self {
        alternative.0
    }
}

impl From<Alternative> for AlternativeBody {
    fn from(alternative: Alternative) -> Self {
        AlternativeBody(alternative)
    }
}

/// POST /power-curve body
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PowerCurveBody {
    /// Baseline rate in percent
    pub baseline_pct: f64,
    /// Comparison rate in percent
    pub comparison_pct: f64,
    /// Observations per variant
    pub sample_size_per_variant: u64,
    /// Significance level
    #[serde(default = "default_alpha")]
    pub alpha: f64,
    /// Direction of the test
    #[serde(default)]
    pub alternative: AlternativeBody,
    /// CUPED pre-experiment correlation
    #[serde(default)]
    pub pre_experiment_correlation: f64,
}

impl PowerCurveBody {
    /// Check every field against its accepted range
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_percent("baselinePct", self.baseline_pct)?;
        check_percent("comparisonPct", self.comparison_pct)?;
        if self.sample_size_per_variant == 0 {
            return Err(reject("sampleSizePerVariant", "> 0", 0));
        }
        check_unit("alpha", self.alpha)?;
        check_correlation(self.pre_experiment_correlation)
    }

    /// Engine request sampling the densities at `num_points` values
    pub fn to_request(&self, num_points: usize) -> PowerCurveRequest {
        PowerCurveRequest {
            baseline_pct: self.baseline_pct,
            comparison_pct: self.comparison_pct,
            sample_size_per_variant: self.sample_size_per_variant,
            alpha: self.alpha,
            alternative: self.alternative.into(),
            correlation: self.pre_experiment_correlation,
            num_points,
        }
    }
}

/// POST /power-curve response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PowerCurveResponse {
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
    /// Lower critical threshold in percent
    pub crit_low_pct: Option<f64>,
    /// Upper critical threshold in percent
    pub crit_high_pct: Option<f64>,
    /// Shared x axis in percent
    pub x_pct: Vec<f64>,
    /// Null density over `x_pct`
    pub null_pdf: Vec<f64>,
    /// Alternative density over `x_pct`
    pub alt_pdf: Vec<f64>,
    /// Direction of the test
    pub alternative: AlternativeBody,
    /// CUPED pre-experiment correlation
    pub pre_experiment_correlation: f64,
    /// Percentage of variance removed by CUPED
    pub variance_reduction_pct: f64,

    // Same test without CUPED, only populated when CUPED is enabled
    /// Null density without CUPED
    pub comparison_null_pdf: Option<Vec<f64>>,
    /// Alternative density without CUPED
    pub comparison_alt_pdf: Option<Vec<f64>>,
    /// Lower threshold without CUPED
    pub comparison_crit_low_pct: Option<f64>,
    /// Upper threshold without CUPED
    pub comparison_crit_high_pct: Option<f64>,
    /// Power without CUPED
    pub comparison_power: Option<f64>,
}

impl From<PowerCurveReport> for PowerCurveResponse {
    fn from(report: PowerCurveReport) -> Self {
        let (null_pdf, alt_pdf, crit_low, crit_high, power) = match report.unadjusted {
            Some(UnadjustedComparison {
                null_pdf,
                alt_pdf,
                crit_low_pct,
                crit_high_pct,
                power,
            }) => (
                Some(null_pdf),
                Some(alt_pdf),
                crit_low_pct,
                crit_high_pct,
                Some(power),
            ),
            None => (None, None, None, None, None),
        };

        PowerCurveResponse {
            alpha: report.alpha,
            baseline_pct: report.baseline_pct,
            comparison_pct: report.comparison_pct,
            sample_size_per_variant: report.sample_size_per_variant,
            power: report.power,
            beta: report.beta,
            crit_low_pct: report.crit_low_pct,
            crit_high_pct: report.crit_high_pct,
            x_pct: report.x_pct,
            null_pdf: report.null_pdf,
            alt_pdf: report.alt_pdf,
            alternative: report.alternative.into(),
            pre_experiment_correlation: report.correlation,
            variance_reduction_pct: report.variance_reduction_pct,
            comparison_null_pdf: null_pdf,
            comparison_alt_pdf: alt_pdf,
            comparison_crit_low_pct: crit_low,
            comparison_crit_high_pct: crit_high,
            comparison_power: power,
        }
    }
}

/// POST /sample-size body
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SampleSizeBody {
    /// Baseline rate in percent
    pub baseline_pct: f64,
    /// Comparison rate in percent
    pub comparison_pct: f64,
    /// Significance level
    #[serde(default = "default_alpha")]
    pub alpha: f64,
    /// Target power
    #[serde(default = "default_power")]
    pub power: f64,
    /// Direction of the test
    #[serde(default)]
    pub alternative: AlternativeBody,
    /// CUPED pre-experiment correlation
    #[serde(default)]
    pub pre_experiment_correlation: f64,
}

impl SampleSizeBody {
    /// Check every field against its accepted range
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_percent("baselinePct", self.baseline_pct)?;
        check_percent("comparisonPct", self.comparison_pct)?;
        check_unit("alpha", self.alpha)?;
        check_unit("power", self.power)?;
        check_correlation(self.pre_experiment_correlation)
    }

    /// Engine request for this body
    pub fn to_request(&self) -> SampleSizeRequest {
        SampleSizeRequest {
            baseline_pct: self.baseline_pct,
            comparison_pct: self.comparison_pct,
            alpha: self.alpha,
            power: self.power,
            alternative: self.alternative.into(),
            correlation: self.pre_experiment_correlation,
        }
    }
}

/// POST /sample-size response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SampleSizeResponse {
    /// Baseline rate in percent
    pub baseline_pct: f64,
    /// Comparison rate in percent
    pub comparison_pct: f64,
    /// Significance level
    pub alpha: f64,
    /// Statistical power
    pub power: f64,
    /// Observations per variant
    pub sample_size_per_variant: f64,
    /// Observations across both variants
    pub total_sample_size: f64,
    /// Percentage-point lift
    pub absolute_lift_pct: f64,
    /// Relative lift in percent
    pub relative_lift_pct: f64,
    /// True when close to or above the per-variant ceiling
    pub exceeds_max_sample_size: bool,
    /// Direction of the test
    pub alternative: AlternativeBody,
    /// CUPED pre-experiment correlation
    pub pre_experiment_correlation: f64,
    /// Percentage of variance removed by CUPED
    pub variance_reduction_pct: f64,
}

impl From<SampleSizeReport> for SampleSizeResponse {
    fn from(report: SampleSizeReport) -> Self {
        SampleSizeResponse {
            baseline_pct: report.baseline_pct,
            comparison_pct: report.comparison_pct,
            alpha: report.alpha,
            power: report.power,
            sample_size_per_variant: report.sample_size_per_variant,
            total_sample_size: report.total_sample_size,
            absolute_lift_pct: report.absolute_lift_pct,
            relative_lift_pct: report.relative_lift_pct,
            exceeds_max_sample_size: report.exceeds_max_sample_size,
            alternative: report.alternative.into(),
            pre_experiment_correlation: report.correlation,
            variance_reduction_pct: report.variance_reduction_pct,
        }
    }
}

/// POST /mde-curve body
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MdeCurveBody {
    /// Baseline rate in percent
    pub baseline_pct: f64,
    /// Significance level
    #[serde(default = "default_alpha")]
    pub alpha: f64,
    /// Target power
    #[serde(default = "default_power")]
    pub power: f64,
    /// Direction of the test
    #[serde(default)]
    pub alternative: AlternativeBody,
    /// Number of swept lifts
    #[serde(default = "default_mde_points")]
    pub num_points: usize,
    /// CUPED pre-experiment correlation
    #[serde(default)]
    pub pre_experiment_correlation: f64,
}

impl MdeCurveBody {
    /// Check every field against its accepted range
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_percent("baselinePct", self.baseline_pct)?;
        check_unit("alpha", self.alpha)?;
        check_unit("power", self.power)?;
        if !(5..=50).contains(&self.num_points) {
            return Err(reject("numPoints", ">= 5 and <= 50", self.num_points));
        }
        check_correlation(self.pre_experiment_correlation)
    }

    /// Engine request for this body
    pub fn to_request(&self) -> MdeCurveRequest {
        MdeCurveRequest {
            baseline_pct: self.baseline_pct,
            alpha: self.alpha,
            power: self.power,
            alternative: self.alternative.into(),
            num_points: self.num_points,
            correlation: self.pre_experiment_correlation,
        }
    }
}

/// One point of the MDE curve
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MdeCurvePointBody {
    /// Relative lift in percent
    pub relative_lift_pct: f64,
    /// Percentage-point lift
    pub absolute_lift_pct: f64,
    /// Comparison rate in percent
    pub comparison_pct: f64,
    /// Observations per variant
    pub sample_size_per_variant: f64,
}

/// POST /mde-curve response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MdeCurveResponse {
    /// Baseline rate in percent
    pub baseline_pct: f64,
    /// Significance level
    pub alpha: f64,
    /// Statistical power
    pub power: f64,
    /// Curve points in ascending lift order
    pub points: Vec<MdeCurvePointBody>,
}

impl From<MdeCurveReport> for MdeCurveResponse {
    fn from(report: MdeCurveReport) -> Self {
        MdeCurveResponse {
            baseline_pct: report.baseline_pct,
            alpha: report.alpha,
            power: report.power,
            points: report
                .points
                .into_iter()
                .map(|point| MdeCurvePointBody {
                    relative_lift_pct: point.relative_lift_pct,
                    absolute_lift_pct: point.absolute_lift_pct,
                    comparison_pct: point.comparison_pct,
                    sample_size_per_variant: point.sample_size_per_variant,
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn power_body(json: &str) -> PowerCurveBody {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_power_curve_defaults() {
        let body = power_body(r#"{"baselinePct": 10, "comparisonPct": 12, "sampleSizePerVariant": 1000}"#);
        assert_eq!(body.alpha, 0.05);
        assert_eq!(body.alternative, AlternativeBody(Alternative::TwoSided));
        assert_eq!(body.pre_experiment_correlation, 0.0);
        assert!(body.validate().is_ok());
    }

    #[test]
    fn test_alternative_wire_names() {
        let body = power_body(
            r#"{"baselinePct": 10, "comparisonPct": 12, "sampleSizePerVariant": 1000, "alternative": "greater"}"#,
        );
        assert_eq!(Alternative::from(body.alternative), Alternative::Greater);
        assert_eq!(
            serde_json::to_string(&AlternativeBody(Alternative::TwoSided)).unwrap(),
            r#""two-sided""#
        );
        let err = serde_json::from_str::<AlternativeBody>(r#""both""#).unwrap_err();
        assert!(err.to_string().contains("Invalid alternative: both"));
    }

    #[test]
    fn test_alternative_parsing_ignores_case() {
        let body: AlternativeBody = serde_json::from_str(r#""LESS""#).unwrap();
        assert_eq!(body, AlternativeBody(Alternative::Less));
        assert_eq!(serde_json::to_string(&body).unwrap(), r#""less""#);
    }

    #[test]
    fn test_power_curve_validation() {
        let body = power_body(r#"{"baselinePct": 0, "comparisonPct": 12, "sampleSizePerVariant": 1000}"#);
        assert_eq!(body.validate().unwrap_err().field, "baselinePct");

        let body = power_body(r#"{"baselinePct": 10, "comparisonPct": 12, "sampleSizePerVariant": 0}"#);
        assert_eq!(body.validate().unwrap_err().field, "sampleSizePerVariant");

        let body = power_body(
            r#"{"baselinePct": 10, "comparisonPct": 12, "sampleSizePerVariant": 10, "preExperimentCorrelation": 1.0}"#,
        );
        assert_eq!(body.validate().unwrap_err().field, "preExperimentCorrelation");
    }

    #[test]
    fn test_mde_points_range() {
        let body: MdeCurveBody = serde_json::from_str(r#"{"baselinePct": 10, "numPoints": 4}"#).unwrap();
        assert_eq!(body.validate().unwrap_err().field, "numPoints");

        let body: MdeCurveBody = serde_json::from_str(r#"{"baselinePct": 10}"#).unwrap();
        assert_eq!(body.num_points, 20);
        assert_eq!(body.power, 0.8);
        assert!(body.validate().is_ok());
    }

    #[test]
    fn test_sample_size_validation() {
        let body: SampleSizeBody =
            serde_json::from_str(r#"{"baselinePct": 10, "comparisonPct": 12, "power": 1.0}"#).unwrap();
        assert_eq!(body.validate().unwrap_err().field, "power");
    }
}
