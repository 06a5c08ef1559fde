use thiserror::Error;

use pp_core::LinkId;
use pp_events::EventError;

#[derive(Debug, Error)]
pub enum RasterError {
    #[error("invalid raster parameter: {0}")]
    InvalidParameter(String),

    /// An event references a link the network does not contain.
    #[error("link {0} is not in the network")]
    UnknownLink(LinkId),

    #[error("malformed event: {0}")]
    MalformedEvent(String),

    #[error(transparent)]
    Event(EventError),
}

impl From<EventError> for RasterError {
    fn from(e: EventError) -> Self {
        match e {
            EventError::MalformedEvent(msg) => RasterError::MalformedEvent(msg),
            other => RasterError::Event(other),
        }
    }
}

pub type RasterResult<T> = Result<T, RasterError>;
