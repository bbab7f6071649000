//! HTTP request handlers for the Router service.
//!
//! Exposes the power-curve, sample-size and MDE-curve computations plus a
//! health check using axum.

use crate::types::{
    MdeCurveBody, MdeCurveResponse, PowerCurveBody, PowerCurveResponse, SampleSizeBody,
    SampleSizeResponse, ValidationError,
};
use abpower_domain::{
    compute_mde_curve, compute_power_curve, compute_sample_size, DomainError, SolverConfig,
};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router as AxumRouter,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

/// Shared application state
#[derive(Debug, Clone)]
pub struct AppState {
    /// Number of x-axis samples in power-curve responses
    pub curve_points: usize,
    /// Bounds used by the sample-size solver
    pub solver: SolverConfig,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            curve_points: abpower_domain::power::DEFAULT_CURVE_POINTS,
            solver: SolverConfig::default(),
        }
    }
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthCheckResponse {
    /// Overall health status
    pub status: String,
}

/// Error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}

/// Application error type
#[derive(Debug)]
pub enum AppError {
    /// Request field rejected at the boundary
    Validation(ValidationError),
    /// Error raised by the engine
    Domain(DomainError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::Validation(e) => {
                warn!("Rejected request: {}", e);
                (StatusCode::UNPROCESSABLE_ENTITY, e.to_string())
            }
            AppError::Domain(e @ DomainError::OutOfRange { .. }) => {
                warn!("Engine rejected input: {}", e);
                (StatusCode::UNPROCESSABLE_ENTITY, e.to_string())
            }
            AppError::Domain(e @ DomainError::Numerical(_)) => {
                error!("Computation failed: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
        };

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}

impl From<ValidationError> for AppError {
    fn from(e: ValidationError) -> Self {
        AppError::Validation(e)
    }
}

impl From<DomainError> for AppError {
    fn from(e: DomainError) -> Self {
        AppError::Domain(e)
    }
}

/// POST /power-curve - Null and alternative distributions over the observed rate
async fn power_curve(
    State(state): State<AppState>,
    Json(body): Json<PowerCurveBody>,
) -> Result<Json<PowerCurveResponse>, AppError> {
    body.validate()?;

    let report = compute_power_curve(&body.to_request(state.curve_points))?;
    debug!(
        baseline_pct = body.baseline_pct,
        comparison_pct = body.comparison_pct,
        n = body.sample_size_per_variant,
        alternative = %report.alternative,
        power = report.power,
        "Computed power curve"
    );

    Ok(Json(report.into()))
}

/// POST /sample-size - Required sample size per variant plus lift summaries
async fn sample_size(
    State(state): State<AppState>,
    Json(body): Json<SampleSizeBody>,
) -> Result<Json<SampleSizeResponse>, AppError> {
    body.validate()?;

    let report = compute_sample_size(&body.to_request(), &state.solver)?;
    debug!(
        baseline_pct = body.baseline_pct,
        comparison_pct = body.comparison_pct,
        n = report.sample_size_per_variant,
        alternative = %report.alternative,
        exceeds_max = report.exceeds_max_sample_size,
        "Solved sample size"
    );

    Ok(Json(report.into()))
}

/// POST /mde-curve - Sample size against minimum detectable effect
async fn mde_curve(
    State(state): State<AppState>,
    Json(body): Json<MdeCurveBody>,
) -> Result<Json<MdeCurveResponse>, AppError> {
    body.validate()?;

    let report = compute_mde_curve(&body.to_request(), &state.solver)?;
    debug!(
        baseline_pct = body.baseline_pct,
        requested = body.num_points,
        returned = report.points.len(),
        "Computed MDE curve"
    );

    Ok(Json(report.into()))
}

/// GET /health - Liveness check
async fn health_check() -> Json<HealthCheckResponse> {
    Json(HealthCheckResponse {
        status: "healthy".to_string(),
    })
}

/// Create the axum router with all routes
pub fn create_router(state: AppState) -> AxumRouter {
    AxumRouter::new()
        .route("/health", get(health_check))
        .route("/power-curve", post(power_curve))
        .route("/sample-size", post(sample_size))
        .route("/mde-curve", post(mde_curve))
        .with_state(state)
}
