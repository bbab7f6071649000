//! Configuration file parsing for the Router.
//!
//! Loads settings from TOML files including bind address, curve resolution
//! and optional overrides of the sample-size solver bounds.

use abpower_domain::power::DEFAULT_CURVE_POINTS;
use abpower_domain::SolverConfig;
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

/// Router configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse config TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// A field holds an unusable value
    #[error("Invalid configuration value: {0}")]
    Invalid(String),
}

/// Router configuration loaded from TOML
#[derive(Debug, Clone, Deserialize)]
pub struct RouterConfig {
    /// Bind address (e.g., "0.0.0.0")
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// Bind port (e.g., 8000); the `PORT` environment variable takes precedence
    #[serde(default = "default_bind_port")]
    pub bind_port: u16,

    /// Number of x-axis samples in power-curve responses
    #[serde(default = "default_curve_points")]
    pub curve_points: usize,

    /// Sample-size solver overrides
    #[serde(default)]
    pub solver: SolverSettings,
}

/// Optional overrides for the sample-size solver
///
/// Unset fields keep the solver defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SolverSettings {
    /// Lower search bound
    pub min_sample_size: Option<f64>,
    /// Upper search bound and ceiling
    pub max_sample_size: Option<f64>,
    /// Number of bisections
    pub iterations: Option<u32>,
    /// Curve resolution used while searching
    pub search_curve_points: Option<usize>,
    /// Fraction of the ceiling at which results are flagged
    pub ceiling_threshold: Option<f64>,
}

impl SolverSettings {
    /// Merge the overrides onto the solver defaults
    pub fn to_solver_config(&self) -> SolverConfig {
        let defaults = SolverConfig::default();
        SolverConfig {
            min_sample_size: self.min_sample_size.unwrap_or(defaults.min_sample_size),
            max_sample_size: self.max_sample_size.unwrap_or(defaults.max_sample_size),
            iterations: self.iterations.unwrap_or(defaults.iterations),
            search_curve_points: self
                .search_curve_points
                .unwrap_or(defaults.search_curve_points),
            ceiling_threshold: self.ceiling_threshold.unwrap_or(defaults.ceiling_threshold),
        }
    }
}

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_bind_port() -> u16 {
    8000
}

fn default_curve_points() -> usize {
    DEFAULT_CURVE_POINTS
}

impl Default for RouterConfig {
    fn default() -> Self {
        RouterConfig {
            bind_address: default_bind_address(),
            bind_port: default_bind_port(),
            curve_points: default_curve_points(),
            solver: SolverSettings::default(),
        }
    }
}

impl RouterConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parse and validate configuration from a TOML string
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let config: RouterConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Check values that would make the engine reject every request
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.curve_points < 2 {
            return Err(ConfigError::Invalid(format!(
                "curve_points must be at least 2, got {}",
                self.curve_points
            )));
        }

        let solver = self.solver.to_solver_config();
        if !(solver.min_sample_size >= 1.0 && solver.min_sample_size < solver.max_sample_size) {
            return Err(ConfigError::Invalid(format!(
                "solver bounds must satisfy 1 <= min_sample_size < max_sample_size, got [{}, {}]",
                solver.min_sample_size, solver.max_sample_size
            )));
        }
        if solver.iterations == 0 {
            return Err(ConfigError::Invalid(
                "solver.iterations must be positive".to_string(),
            ));
        }
        if solver.search_curve_points < 2 {
            return Err(ConfigError::Invalid(
                "solver.search_curve_points must be at least 2".to_string(),
            ));
        }
        if !(solver.ceiling_threshold > 0.0 && solver.ceiling_threshold <= 1.0) {
            return Err(ConfigError::Invalid(format!(
                "solver.ceiling_threshold must be in (0, 1], got {}",
                solver.ceiling_threshold
            )));
        }

        Ok(())
    }

    /// Replace the bind port with the value of a `PORT`-style variable, if set
    pub fn apply_port_override(&mut self, port: Option<String>) -> Result<(), ConfigError> {
        if let Some(port) = port {
            self.bind_port = port
                .trim()
                .parse()
                .map_err(|_| ConfigError::Invalid(format!("PORT is not a valid port: {}", port)))?;
        }
        Ok(())
    }

    /// Get the full bind address (address:port)
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.bind_port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RouterConfig::default();
        assert_eq!(config.bind_address, "0.0.0.0");
        assert_eq!(config.bind_port, 8000);
        assert_eq!(config.curve_points, 201);
        assert_eq!(config.solver.to_solver_config(), SolverConfig::default());
    }

    #[test]
    fn test_bind_addr() {
        let config = RouterConfig::default();
        assert_eq!(config.bind_addr(), "0.0.0.0:8000");
    }

    #[test]
    fn test_parse_toml() {
        let toml = r#"
            bind_address = "127.0.0.1"
            bind_port = 9000
            curve_points = 101

            [solver]
            max_sample_size = 500000.0
            iterations = 30
        "#;

        let config = RouterConfig::from_toml(toml).unwrap();
        assert_eq!(config.bind_address, "127.0.0.1");
        assert_eq!(config.bind_port, 9000);
        assert_eq!(config.curve_points, 101);

        let solver = config.solver.to_solver_config();
        assert_eq!(solver.max_sample_size, 500_000.0);
        assert_eq!(solver.iterations, 30);
        assert_eq!(solver.min_sample_size, 10.0);
        assert_eq!(solver.search_curve_points, 51);
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config = RouterConfig::from_toml("").unwrap();
        assert_eq!(config.bind_addr(), "0.0.0.0:8000");
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(matches!(
            RouterConfig::from_toml("curve_points = 1"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            RouterConfig::from_toml("[solver]\nmin_sample_size = 2000000.0"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            RouterConfig::from_toml("[solver]\nceiling_threshold = 1.5"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            RouterConfig::from_toml("bind_port = \"eighty\""),
            Err(ConfigError::TomlParse(_))
        ));
    }

    #[test]
    fn test_port_override() {
        let mut config = RouterConfig::default();
        config.apply_port_override(Some("9090".to_string())).unwrap();
        assert_eq!(config.bind_port, 9090);

        config.apply_port_override(None).unwrap();
        assert_eq!(config.bind_port, 9090);

        assert!(config.apply_port_override(Some("http".to_string())).is_err());
    }
}
