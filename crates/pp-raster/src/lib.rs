//! `pp-raster`: emission grids smoothed over link geometry.
//!
//! # Crate layout
//!
//! | Module         | Contents                                              |
//! |----------------|-------------------------------------------------------|
//! | [`grid`]       | `Cell`, `GridTransform`, `Raster`, `RasterSet`        |
//! | [`footprint`]  | polyline sampling, kernel weights, per-link footprint |
//! | [`rasterizer`] | `Rasterizer` consumer, `analyze` driver               |
//! | [`error`]      | `RasterError`, `RasterResult<T>`                      |
//!
//! # Cargo features
//!
//! | Feature    | Effect                                                 |
//! |------------|--------------------------------------------------------|
//! | `parallel` | Computes link footprints on Rayon's thread pool.       |

pub mod error;
pub mod footprint;
pub mod grid;
pub mod rasterizer;

#[cfg(test)]
mod tests;

pub use error::{RasterError, RasterResult};
pub use footprint::{kernel_weight, link_footprint};
pub use grid::{Cell, GridTransform, Raster, RasterSet};
pub use rasterizer::{Rasterizer, analyze, analyze_with};
