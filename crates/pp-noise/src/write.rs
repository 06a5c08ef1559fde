//! Merged-file writer.
//!
//! One `,`-delimited file per bin, `merged_<start>.csv`:
//!
//! ```csv
//! receiverPointId,immission,consideredAgentUnits,damages_receiverPoint
//! 0,55.2,,0.013
//! 1,,3.0,
//! ```

use std::path::{Path, PathBuf};

use csv::Writer;

use crate::merge::{MergedBin, MergedNoise};
use crate::{NoiseError, NoiseResult};

/// File name for the bin starting at `start` seconds.
///
/// `f64`'s `Display` drops the fraction of integral values, so bin 0 of
/// hourly bins is `merged_0.csv` and bin 1 is `merged_3600.csv`.
pub fn merged_file_name(start: f64) -> String {
    format!("merged_{start}.csv")
}

/// Write every merged bin into `dir` (created if missing).
///
/// Returns the written paths in bin order.  On error the files written so
/// far stay on disk.
pub fn write_merged(merged: &MergedNoise, dir: &Path) -> NoiseResult<Vec<PathBuf>> {
    std::fs::create_dir_all(dir).map_err(|e| NoiseError::io(dir, e))?;
    let mut written = Vec::with_capacity(merged.bins.len());
    for bin in &merged.bins {
        let path = dir.join(merged_file_name(bin.start));
        write_bin(merged, bin, &path)?;
        written.push(path);
    }
    log::info!("wrote {} merged noise files to {}", written.len(), dir.display());
    Ok(written)
}

fn write_bin(merged: &MergedNoise, bin: &MergedBin, path: &Path) -> NoiseResult<()> {
    let mut w = Writer::from_path(path).map_err(|e| NoiseError::csv(path, e))?;

    let mut header = Vec::with_capacity(merged.labels.len() + 1);
    header.push("receiverPointId");
    header.extend(merged.labels.iter().map(String::as_str));
    w.write_record(&header).map_err(|e| NoiseError::csv(path, e))?;

    for (point, row) in merged.points.iter().zip(&bin.rows) {
        let mut record = Vec::with_capacity(row.len() + 1);
        record.push(point.id.to_string());
        record.extend(row.iter().map(|v| v.map(|v| v.to_string()).unwrap_or_default()));
        w.write_record(&record).map_err(|e| NoiseError::csv(path, e))?;
    }
    w.flush().map_err(|e| NoiseError::io(path, e))?;
    Ok(())
}
