//! abpower Router
//!
//! HTTP front for the power and sample-size engine. Parses and validates
//! percent-scaled JSON requests, calls into `abpower-domain` and serializes
//! the results.

#![warn(missing_docs)]

pub mod config;
pub mod handlers;
pub mod types;

use config::RouterConfig;
use handlers::{create_router, AppState};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Router error
#[derive(Debug, thiserror::Error)]
pub enum RouterError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Server binding error
    #[error("Failed to bind server: {0}")]
    Bind(#[from] std::io::Error),

    /// Server error
    #[error("Server error: {0}")]
    Server(String),
}

/// Install the global tracing subscriber
///
/// Logs go to stdout. The level comes from `RUST_LOG` and defaults to `info`.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stdout)
        .init();
}

/// Build the application state from configuration
pub fn app_state(config: &RouterConfig) -> AppState {
    AppState {
        curve_points: config.curve_points,
        solver: config.solver.to_solver_config(),
    }
}

/// Start the Router HTTP server
///
/// Builds the application state from configuration and serves the
/// computation routes until the process exits.
pub async fn start_server(config: RouterConfig) -> Result<(), RouterError> {
    config.validate()?;
    let state = app_state(&config);

    info!("Starting abpower Router");
    info!("Bind address: {}", config.bind_addr());
    info!("Curve points: {}", state.curve_points);
    info!(
        "Solver: n in [{}, {}], {} iterations",
        state.solver.min_sample_size, state.solver.max_sample_size, state.solver.iterations
    );

    let app = create_router(state);

    // Bind and serve
    let listener = TcpListener::bind(&config.bind_addr()).await?;
    info!("Router listening on {}", config.bind_addr());

    axum::serve(listener, app)
        .await
        .map_err(|e| RouterError::Server(e.to_string()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_state_from_config() {
        let config = RouterConfig::from_toml("curve_points = 51\n[solver]\niterations = 20").unwrap();
        let state = app_state(&config);
        assert_eq!(state.curve_points, 51);
        assert_eq!(state.solver.iterations, 20);
        assert_eq!(state.solver.max_sample_size, 1_000_000.0);
    }
}
