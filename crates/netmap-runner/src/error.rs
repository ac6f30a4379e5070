//! Error types for the runner.

use thiserror::Error;

/// Errors that abort a collection run.
#[derive(Debug, Error)]
pub enum RunnerError {
    /// Invalid configuration value.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Configuration file could not be parsed.
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Collector error.
    #[error(transparent)]
    Collect(#[from] netmap_collect::CollectError),

    /// Map rendering error.
    #[error(transparent)]
    Geo(#[from] netmap_geo::GeoError),
}
