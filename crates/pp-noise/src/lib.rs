//! `pp-noise`: merge of the noise stage's per-interval CSV files.
//!
//! The noise stage writes one directory per quantity (immission, considered
//! agent units, damages, …) with one file per time interval.  This crate
//! joins them on (receiver point, time bin) into one file per bin and
//! derives day/evening/night levels from the immissions.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                 |
//! |--------------|----------------------------------------------------------|
//! | [`receiver`] | canonical receiver-point loader                          |
//! | [`category`] | per-category directory scan                              |
//! | [`merge`]    | `NoiseMerger`, `merge`, `MergedNoise`, `MergeReport`     |
//! | [`write`]    | `merged_<start>.csv` writer                              |
//! | [`levels`]   | `L_den`, `L_day`, … and `immission_processed.csv`        |
//! | [`error`]    | `NoiseError`, `NoiseResult<T>`                           |
//!
//! # Cargo features
//!
//! | Feature    | Effect                                                 |
//! |------------|--------------------------------------------------------|
//! | `parallel` | Scans category directories on Rayon's thread pool.     |

pub mod category;
pub mod error;
pub mod levels;
pub mod merge;
pub mod receiver;
pub mod write;


pub use category::{CategoryScan, scan_category};
pub use error::{NoiseError, NoiseResult};
pub use levels::{NoiseLevels, compute_levels, lden, process_immissions, write_levels};
pub use merge::{MergeReport, MergedBin, MergedNoise, NoiseMerger, join, merge};
pub use receiver::{ReceiverPoint, ReceiverPoints, load_receiver_points};
pub use write::{merged_file_name, write_merged};
