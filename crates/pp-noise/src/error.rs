use std::path::PathBuf;

use thiserror::Error;

use pp_core::CoreError;

#[derive(Debug, Error)]
pub enum NoiseError {
    #[error("noise configuration error: {0}")]
    Config(String),

    /// The canonical receiver-point file could not be used.
    #[error("malformed receiver points file {}: {message}", path.display())]
    ReceiverPoints { path: PathBuf, message: String },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path:   PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error in {}: {source}", path.display())]
    Csv {
        path:   PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error(transparent)]
    Core(#[from] CoreError),
}

impl NoiseError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        NoiseError::Io { path: path.into(), source }
    }

    pub(crate) fn csv(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        NoiseError::Csv { path: path.into(), source }
    }
}

pub type NoiseResult<T> = Result<T, NoiseError>;
