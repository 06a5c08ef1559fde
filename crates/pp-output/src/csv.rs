//! CSV output backend.
//!
//! Creates two files in the configured output directory:
//!
//! | File                          | Delimiter | Header                                   |
//! |-------------------------------|-----------|------------------------------------------|
//! | `link_emissions.csv`          | `;`       | `timeBin;linkId;pollutant;maxEmission`   |
//! | `Emission_Grid_Analysis.csv`  | `,`       | `Pollutant,CellX,CellY,Value`            |
//!
//! Link emission times and values are written with two decimals; grid values
//! in shortest round-trip form.  Numbers always use `.` as the decimal
//! separator.

use std::fs::File;
use std::path::Path;

use csv::{Writer, WriterBuilder};

use crate::writer::OutputWriter;
use crate::{GridCellRow, LinkEmissionRow, OutputError, OutputResult};

pub const LINK_EMISSIONS_FILE: &str = "link_emissions.csv";
pub const GRID_FILE: &str = "Emission_Grid_Analysis.csv";

/// Writes post-processing output to two CSV files.
///
/// If a write fails the rows written so far stay on disk; the `csv` writers
/// flush their buffers when dropped.
pub struct CsvWriter {
    links:    Writer<File>,
    grid:     Writer<File>,
    finished: bool,
}

impl CsvWriter {
    /// Create (or truncate) the two CSV files in `dir` and write the header rows.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let mut links = open(dir, LINK_EMISSIONS_FILE, b';')?;
        links.write_record(["timeBin", "linkId", "pollutant", "maxEmission"])?;

        let mut grid = open(dir, GRID_FILE, b',')?;
        grid.write_record(["Pollutant", "CellX", "CellY", "Value"])?;

        Ok(Self {
            links,
            grid,
            finished: false,
        })
    }
}

fn open(dir: &Path, name: &str, delimiter: u8) -> OutputResult<Writer<File>> {
    let path = dir.join(name);
    WriterBuilder::new()
        .delimiter(delimiter)
        .from_path(&path)
        .map_err(|source| OutputError::Create { path, source })
}

impl OutputWriter for CsvWriter {
    fn write_link_emissions(&mut self, rows: &[LinkEmissionRow]) -> OutputResult<()> {
        for row in rows {
            self.links.write_record(&[
                format!("{:.2}", row.time_bin),
                row.link_id.clone(),
                row.pollutant.as_str().to_owned(),
                format!("{:.2}", row.value),
            ])?;
        }
        Ok(())
    }

    fn write_grid_cells(&mut self, rows: &[GridCellRow]) -> OutputResult<()> {
        for row in rows {
            self.grid.write_record(&[
                row.pollutant.as_str().to_owned(),
                row.cell_x.to_string(),
                row.cell_y.to_string(),
                row.value.to_string(),
            ])?;
        }
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.links.flush()?;
        self.grid.flush()?;
        Ok(())
    }
}
