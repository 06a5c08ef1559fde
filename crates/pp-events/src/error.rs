use thiserror::Error;

use pp_core::CoreError;

#[derive(Debug, Error)]
pub enum EventError {
    /// Unparseable or out-of-domain event data.
    #[error("malformed event: {0}")]
    MalformedEvent(String),

    #[error("XML error at byte {position}: {message}")]
    Xml { position: usize, message: String },

    #[error(transparent)]
    Core(#[from] CoreError),
}

pub type EventResult<T> = Result<T, EventError>;
