//! `pp-aggregate`: emission totals per time bin, link, and pollutant.
//!
//! [`TimeBinAggregator`] is an [`EventConsumer`](pp_events::EventConsumer):
//! drive it with `ingest` / `ingest_all`, then call
//! [`finalize`](TimeBinAggregator::finalize) for the ordered result.
//!
//! ```rust,ignore
//! let mut agg = TimeBinAggregator::new(TimeBinning::new(3600.0)?);
//! agg.ingest_all(EventReader::from_path(&events)?)?;
//! let emissions = agg.finalize();
//! ```

pub mod aggregator;
pub mod error;


pub use aggregator::{BinEmissions, BinnedEmissions, EmissionEntry, LinkEmissions, TimeBinAggregator};
pub use error::{AggregateError, AggregateResult};
