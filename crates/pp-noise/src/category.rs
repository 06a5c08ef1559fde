//! Per-category directory scan.
//!
//! A category directory holds one file per noise interval, named
//! `<label>_<end>.csv` where `<end>` is the interval's end time in seconds:
//!
//! ```text
//! immissions/
//!   immission_3600.0.csv     → bin [0, 3600)
//!   immission_7200.0.csv     → bin [3600, 7200)
//! ```
//!
//! Each file is delimited with a header row; column 0 is the receiver point
//! id and column 1 the value.  Further columns are ignored.

use std::collections::BTreeMap;
use std::fs::File;
use std::path::{Path, PathBuf};

use pp_core::{TimeBin, TimeBinning};

use crate::{NoiseError, NoiseResult};

/// Raw values of one category, keyed by bin and receiver point id.
#[derive(Clone, Debug, Default)]
pub struct CategoryScan {
    pub label:            String,
    pub values:           BTreeMap<TimeBin, BTreeMap<String, f64>>,
    pub files_read:       u64,
    /// Files in the directory that do not follow the naming pattern.
    pub files_ignored:    u64,
    pub unparseable_rows: u64,
    pub duplicate_rows:   u64,
}

/// Parse `<label>_<end>.csv` into the bin ending at `<end>`.
pub fn bin_of_file_name(name: &str, label: &str, binning: &TimeBinning) -> Option<TimeBin> {
    let end = name
        .strip_prefix(label)?
        .strip_prefix('_')?
        .strip_suffix(".csv")?
        .parse::<f64>()
        .ok()?;
    binning.bin_ending_at(end)
}

/// Read every interval file of one category.
///
/// A missing directory yields an empty scan with a warning: the noise stage
/// only writes directories for the quantities it computed.
pub fn scan_category(
    label:     &str,
    dir:       &Path,
    binning:   &TimeBinning,
    delimiter: u8,
) -> NoiseResult<CategoryScan> {
    let mut scan = CategoryScan { label: label.to_owned(), ..CategoryScan::default() };
    if !dir.is_dir() {
        log::warn!("noise category {label:?}: directory {} not found", dir.display());
        return Ok(scan);
    }

    let mut files: Vec<(TimeBin, PathBuf)> = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(|e| NoiseError::io(dir, e))? {
        let entry = entry.map_err(|e| NoiseError::io(dir, e))?;
        let path = entry.path();
        let bin = path
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(|n| bin_of_file_name(n, label, binning));
        match bin {
            Some(bin) if path.is_file() => files.push((bin, path)),
            _ => {
                log::debug!("noise category {label:?}: ignoring {}", path.display());
                scan.files_ignored += 1;
            }
        }
    }
    files.sort();

    for (bin, path) in files {
        read_category_file(&mut scan, bin, &path, delimiter)?;
        scan.files_read += 1;
    }
    log::info!(
        "noise category {label:?}: {} files, {} bins, {} skipped rows, {} duplicates",
        scan.files_read,
        scan.values.len(),
        scan.unparseable_rows,
        scan.duplicate_rows,
    );
    Ok(scan)
}

fn read_category_file(scan: &mut CategoryScan, bin: TimeBin, path: &Path, delimiter: u8) -> NoiseResult<()> {
    let file = File::open(path).map_err(|e| NoiseError::io(path, e))?;
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(file);

    let values = scan.values.entry(bin).or_default();
    for (i, result) in reader.records().enumerate() {
        let record = result.map_err(|e| NoiseError::csv(path, e))?;
        let id = record.get(0).map(str::trim).unwrap_or_default();
        let value = record
            .get(1)
            .and_then(|v| v.trim().parse::<f64>().ok())
            .filter(|v| v.is_finite());
        let value = match value {
            Some(v) if !id.is_empty() => v,
            _ => {
                log::warn!("{} row {}: skipping unparseable row {:?}", path.display(), i + 2, record);
                scan.unparseable_rows += 1;
                continue;
            }
        };
        if values.insert(id.to_owned(), value).is_some() {
            scan.duplicate_rows += 1;
        }
    }
    Ok(())
}
