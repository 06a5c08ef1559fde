//! Parquet output backend (feature `parquet`).
//!
//! | File                      | Columns                                                     |
//! |---------------------------|-------------------------------------------------------------|
//! | `link_emissions.parquet`  | `time_bin`, `link_id`, `pollutant`, `value`                 |
//! | `emission_grid.parquet`   | `pollutant`, `cell_x`, `cell_y`, `center_x`, `center_y`, `value` |
//!
//! Every batch passed to the writer becomes one record batch.  The footer is
//! written by `finish()`; a file that was never finished cannot be read.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;

use crate::writer::OutputWriter;
use crate::{GridCellRow, LinkEmissionRow, OutputResult};

pub const LINK_EMISSIONS_FILE: &str = "link_emissions.parquet";
pub const GRID_FILE: &str = "emission_grid.parquet";

fn schema(fields: &[(&str, DataType)]) -> SchemaRef {
    Arc::new(Schema::new(
        fields
            .iter()
            .map(|(name, ty)| Field::new(*name, ty.clone(), false))
            .collect::<Vec<_>>(),
    ))
}

fn link_columns(rows: &[LinkEmissionRow]) -> Vec<ArrayRef> {
    vec![
        Arc::new(Float64Array::from_iter_values(rows.iter().map(|r| r.time_bin))),
        Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.link_id.as_str()))),
        Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.pollutant.as_str()))),
        Arc::new(Float64Array::from_iter_values(rows.iter().map(|r| r.value))),
    ]
}

fn grid_columns(rows: &[GridCellRow]) -> Vec<ArrayRef> {
    vec![
        Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.pollutant.as_str()))),
        Arc::new(Int64Array::from_iter_values(rows.iter().map(|r| r.cell_x))),
        Arc::new(Int64Array::from_iter_values(rows.iter().map(|r| r.cell_y))),
        Arc::new(Float64Array::from_iter_values(rows.iter().map(|r| r.center_x))),
        Arc::new(Float64Array::from_iter_values(rows.iter().map(|r| r.center_y))),
        Arc::new(Float64Array::from_iter_values(rows.iter().map(|r| r.value))),
    ]
}

// ── Sink ──────────────────────────────────────────────────────────────────────

/// One Parquet file and its schema.  `None` once closed.
struct Sink {
    path:   PathBuf,
    schema: SchemaRef,
    writer: Option<ArrowWriter<File>>,
}

impl Sink {
    fn create(dir: &Path, name: &str, schema: SchemaRef) -> OutputResult<Self> {
        let path = dir.join(name);
        let props = WriterProperties::builder()
            .set_compression(Compression::SNAPPY)
            .build();
        let writer = ArrowWriter::try_new(File::create(&path)?, Arc::clone(&schema), Some(props))?;
        Ok(Self { path, schema, writer: Some(writer) })
    }

    fn write(&mut self, columns: Vec<ArrayRef>) -> OutputResult<()> {
        let Some(writer) = self.writer.as_mut() else {
            return Ok(());
        };
        let batch = RecordBatch::try_new(Arc::clone(&self.schema), columns)?;
        writer.write(&batch)?;
        Ok(())
    }

    fn close(&mut self) -> OutputResult<()> {
        if let Some(writer) = self.writer.take() {
            let meta = writer.close()?;
            log::debug!("parquet: {} rows in {}", meta.num_rows, self.path.display());
        }
        Ok(())
    }
}

// ── ParquetWriter ─────────────────────────────────────────────────────────────

/// Writes link emissions and grid cells to two Parquet files.
pub struct ParquetWriter {
    links: Sink,
    grid:  Sink,
}

impl ParquetWriter {
    /// Create both files in `dir`.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let links = Sink::create(
            dir,
            LINK_EMISSIONS_FILE,
            schema(&[
                ("time_bin", DataType::Float64),
                ("link_id", DataType::Utf8),
                ("pollutant", DataType::Utf8),
                ("value", DataType::Float64),
            ]),
        )?;
        let grid = Sink::create(
            dir,
            GRID_FILE,
            schema(&[
                ("pollutant", DataType::Utf8),
                ("cell_x", DataType::Int64),
                ("cell_y", DataType::Int64),
                ("center_x", DataType::Float64),
                ("center_y", DataType::Float64),
                ("value", DataType::Float64),
            ]),
        )?;
        Ok(Self { links, grid })
    }
}

impl OutputWriter for ParquetWriter {
    fn write_link_emissions(&mut self, rows: &[LinkEmissionRow]) -> OutputResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        self.links.write(link_columns(rows))
    }

    fn write_grid_cells(&mut self, rows: &[GridCellRow]) -> OutputResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        self.grid.write(grid_columns(rows))
    }

    fn finish(&mut self) -> OutputResult<()> {
        let links = self.links.close();
        let grid = self.grid.close();
        links.and(grid)
    }
}
