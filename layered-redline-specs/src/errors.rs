//! Error types for the scenario harness.

use thiserror::Error;

/// Errors that can occur while loading or running fixtures.
#[derive(Debug, Error)]
pub enum SpecError {
    /// Fixture file is not valid TOML or does not match the fixture shape.
    #[error("failed to parse fixture {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    /// Fixture file or directory could not be read.
    #[error("failed to load fixture: {path}: {message}")]
    Load { path: String, message: String },

    /// Expected-failures ledger could not be read.
    #[error("failed to load expected failures from {path}: {message}")]
    Ledger { path: String, message: String },
}

/// Result type for harness operations.
pub type SpecResult<T> = Result<T, SpecError>;
