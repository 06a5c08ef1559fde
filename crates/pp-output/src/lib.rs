//! `pp-output`: result writers for the rust_pp post-processing pipeline.
//!
//! Three backends are provided behind Cargo features:
//!
//! | Feature   | Backend     | Files created                                            |
//! |-----------|-------------|----------------------------------------------------------|
//! | *(none)*  | CSV         | `link_emissions.csv`, `Emission_Grid_Analysis.csv`       |
//! | `sqlite`  | SQLite      | `emissions.db`                                           |
//! | `parquet` | Parquet     | `link_emissions.parquet`, `emission_grid.parquet`        |
//!
//! All backends implement [`OutputWriter`].
//!
//! # Usage
//!
//! ```rust,ignore
//! use pp_output::{CsvWriter, write_results};
//!
//! let mut writer = CsvWriter::new(Path::new("./output"))?;
//! write_results(&mut writer, &binned, &rasters)?;
//! ```

pub mod csv;
pub mod error;
pub mod row;
pub mod writer;

#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(feature = "parquet")]
pub mod parquet;

#[cfg(test)]
mod tests;

pub use self::csv::CsvWriter;
pub use error::{OutputError, OutputResult};
pub use row::{GridCellRow, LinkEmissionRow};
pub use writer::{OutputWriter, write_results};

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteWriter;

#[cfg(feature = "parquet")]
pub use self::parquet::ParquetWriter;
