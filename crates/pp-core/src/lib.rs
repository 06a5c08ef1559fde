//! `pp-core`: foundational types for the `rust_pp` post-processing pipeline.
//!
//! This crate is a dependency of every other `pp-*` crate.  It has no `pp-*`
//! dependencies.
//!
//! # What lives here
//!
//! | Module          | Contents                                              |
//! |-----------------|-------------------------------------------------------|
//! | [`ids`]         | `LinkId`, `NodeId`, `VehicleId`, `ReceiverPointId`    |
//! | [`geo`]         | `Coord`, `Bounds`                                     |
//! | [`time`]        | `TimeBin`, `TimeBinning`                              |
//! | [`pollutant`]   | `Pollutant` (closed set)                              |
//! | [`config`]      | `AnalysisConfig` and its sections                     |
//! | [`io`]          | `open_input` (transparent gzip)                       |
//! | [`xml`]         | attribute helpers for the XML loaders                 |
//! | [`error`]       | `CoreError`, `CoreResult`                             |

pub mod config;
pub mod error;
pub mod geo;
pub mod ids;
pub mod io;
pub mod pollutant;
pub mod time;
pub mod xml;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::{AnalysisConfig, CategoryConfig, EmissionsConfig, GridConfig, Kernel, NoiseConfig};
pub use error::{CoreError, CoreResult};
pub use geo::{Bounds, Coord};
pub use ids::{LinkId, NodeId, ReceiverPointId, VehicleId};
pub use io::{maybe_gunzip, open_input, InputReader};
pub use pollutant::Pollutant;
pub use time::{TimeBin, TimeBinning};
