//! Error types for the Trailmark core library.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using `CoreError`.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Core error types for Trailmark.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration loading or parsing error.
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A locale file could not be parsed as JSON.
    #[error("Locale error in {path}: {source}")]
    Locale {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The authoritative locale has no dictionary file.
    #[error("Missing default locale '{code}' in {dir}")]
    MissingDefaultLocale { code: String, dir: PathBuf },

    /// File system I/O error, with the path that failed.
    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Generic configuration crate error.
    #[error("Config crate error: {0}")]
    ConfigCrate(#[from] config::ConfigError),
}

impl CoreError {
    /// Create a new configuration error with a message.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            source: None,
        }
    }

    /// Create a new configuration error with source.
    pub fn config_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Config {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a new locale parse error.
    pub fn locale(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Locale {
            path: path.into(),
            source,
        }
    }

    /// Create a new IO error bound to a path.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
