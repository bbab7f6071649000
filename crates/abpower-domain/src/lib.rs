//! abpower Domain Layer
//!
//! Statistical engine for planning two-sample proportion (A/B) tests: power,
//! required sample size and the minimum-detectable-effect trade-off, with
//! optional CUPED variance reduction. Every operation is a pure function of
//! its inputs; nothing is cached or shared between calls.
//!
//! ## Layers
//!
//! - **variance**: standard errors of both groups, CUPED-adjusted
//! - **power**: critical thresholds in conversion-rate space, power, densities
//! - **sample_size**: fixed-iteration bisection over the power model
//! - **mde**: geometric sweep of relative lifts through the solver
//! - **planner**: percent-scaled (0–100) entry points used by the HTTP layer
//!
//! Internally every rate is a proportion in (0, 1).

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod hypothesis;
pub mod mde;
pub mod planner;
pub mod power;
pub mod sample_size;
pub mod variance;

// Re-exports for convenience
pub use error::{DomainError, DomainResult};
pub use hypothesis::{Alternative, TestConfiguration};
pub use mde::{mde_curve, MdePoint};
pub use planner::{
    compute_mde_curve, compute_power_curve, compute_sample_size, MdeCurveReport,
    MdeCurveRequest, PowerCurveReport, PowerCurveRequest, SampleSizeReport, SampleSizeRequest,
};
pub use power::{evaluate_power, power_curve, CriticalRegion, PowerCurveResult, PowerSummary};
pub use sample_size::{solve_sample_size, SampleSizeResult, SolverConfig};
pub use variance::VarianceModel;
