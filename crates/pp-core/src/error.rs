//! Core error type.
//!
//! Sub-crates define their own error enums and wrap `CoreError` (or one of
//! its variants) where they call into this crate.

use std::path::PathBuf;

use thiserror::Error;

/// The error type for `pp-core` and a common base for sub-crates.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path:   PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in {}: {source}", path.display())]
    Json {
        path:   PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl CoreError {
    /// Attach `path` to an I/O error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CoreError::Io { path: path.into(), source }
    }
}

/// Shorthand result type for `pp-core`.
pub type CoreResult<T> = Result<T, CoreError>;
