//! The `OutputWriter` trait implemented by all backend writers.

use pp_aggregate::BinnedEmissions;
use pp_raster::RasterSet;

use crate::{GridCellRow, LinkEmissionRow, OutputResult};

/// Trait implemented by CSV, SQLite, and Parquet writers.
pub trait OutputWriter {
    /// Write a batch of per-link emission totals.
    fn write_link_emissions(&mut self, rows: &[LinkEmissionRow]) -> OutputResult<()>;

    /// Write a batch of grid cells.
    fn write_grid_cells(&mut self, rows: &[GridCellRow]) -> OutputResult<()>;

    /// Flush and close all underlying file handles.
    ///
    /// Idempotent.
    fn finish(&mut self) -> OutputResult<()>;
}

/// Write both result sets through `writer` and finish it.
///
/// On error the writer is still finished (best effort) and the first error
/// is returned.
pub fn write_results<W: OutputWriter>(
    writer:   &mut W,
    bins:     &BinnedEmissions,
    rasters:  &RasterSet,
) -> OutputResult<()> {
    let links = LinkEmissionRow::from_bins(bins);
    let cells = GridCellRow::from_rasters(rasters);
    let written = writer
        .write_link_emissions(&links)
        .and_then(|()| writer.write_grid_cells(&cells));
    let finished = writer.finish();
    written?;
    finished?;
    log::info!("wrote {} link emission rows and {} grid cells", links.len(), cells.len());
    Ok(())
}
