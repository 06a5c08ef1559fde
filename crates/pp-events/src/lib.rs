//! `pp-events`: the event source adapter.
//!
//! The event log is an external format: this crate only reads it.  Events
//! come out of [`EventReader`] as a lazy, forward-only sequence of typed
//! [`Event`]s; downstream stages implement [`EventConsumer`].
//!
//! # Crate layout
//!
//! | Module       | Contents                                                   |
//! |--------------|------------------------------------------------------------|
//! | [`event`]    | `Event`, `LinkTraversal`, `EmissionRecord`                 |
//! | [`reader`]   | `EventReader` (XML, gzip-transparent)                      |
//! | [`consumer`] | `EventConsumer` trait                                      |
//! | [`error`]    | `EventError`, `EventResult<T>`                             |

pub mod consumer;
pub mod error;
pub mod event;
pub mod reader;


pub use consumer::EventConsumer;
pub use error::{EventError, EventResult};
pub use event::{EmissionKind, EmissionRecord, Event, LinkTraversal, TraversalDirection};
pub use reader::EventReader;
