use thiserror::Error;

use pp_events::EventError;

#[derive(Debug, Error)]
pub enum AggregateError {
    #[error("malformed event: {0}")]
    MalformedEvent(String),

    #[error("cannot merge aggregators with bin widths {ours} s and {theirs} s")]
    BinWidthMismatch { ours: f64, theirs: f64 },

    #[error(transparent)]
    Event(EventError),
}

impl From<EventError> for AggregateError {
    fn from(e: EventError) -> Self {
        match e {
            EventError::MalformedEvent(msg) => AggregateError::MalformedEvent(msg),
            other => AggregateError::Event(other),
        }
    }
}

pub type AggregateResult<T> = Result<T, AggregateError>;
