//! Configuration and orchestration for the `netmap` collector binary.

pub mod config;
mod error;
pub mod pipeline;

pub use config::{CollectorConfig, MapConfig, Overrides, API_KEY_ENV};
pub use error::RunnerError;
pub use pipeline::{collect_sources, map_provider, process, run, RunReport, SourceData};

/// Result type for runner operations.
pub type Result<T> = std::result::Result<T, RunnerError>;
