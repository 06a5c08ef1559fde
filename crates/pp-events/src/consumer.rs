//! The consumer interface driven by a plain forward loop over an event log.

use crate::{Event, EventError, EventResult};

/// A stage that accumulates state from events, one at a time.
///
/// The caller owns the loop: call [`ingest`](Self::ingest) per event, or
/// hand an iterator to [`ingest_all`](Self::ingest_all).  Implementors own their
/// accumulation state exclusively.
///
/// # Example
///
/// ```rust,ignore
/// let mut agg = TimeBinAggregator::new(binning);
/// for event in EventReader::from_path(path)? {
///     agg.ingest(&event?)?;
/// }
/// ```
pub trait EventConsumer {
    type Error: From<EventError>;

    /// Fold one event into the consumer's state.
    fn ingest(&mut self, event: &Event) -> Result<(), Self::Error>;

    /// Ingest every event from `events`, stopping at the first error.
    ///
    /// Returns the number of events ingested.
    fn ingest_all<I>(&mut self, events: I) -> Result<u64, Self::Error>
    where
        I: IntoIterator<Item = EventResult<Event>>,
    {
        let mut n = 0;
        for event in events {
            self.ingest(&event?)?;
            n += 1;
        }
        Ok(n)
    }
}
