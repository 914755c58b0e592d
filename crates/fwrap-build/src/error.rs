//! Error types for fwrap-build.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for fwrap-build operations.
pub type Result<T> = std::result::Result<T, BuildError>;

/// Errors that can occur while loading configuration and typemap files.
#[derive(Error, Debug)]
pub enum BuildError {
    /// Failed to read a configuration or typemap file.
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed TOML in a configuration or typemap file.
    #[error("Invalid TOML: {0}")]
    ParseToml(#[from] toml::de::Error),

    /// Failed to parse a JSON typemap file.
    #[error("Invalid JSON typemap file: {0}")]
    ParseJson(#[from] serde_json::Error),

    /// A typemap file with an extension other than `.toml` or `.json`.
    #[error("Unsupported typemap file format: {}", .0.display())]
    UnsupportedFormat(PathBuf),

    /// An option value the generator cannot use.
    #[error("Invalid configuration: {0}")]
    Validation(String),
}
