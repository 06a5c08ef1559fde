//! The noise merge engine.
//!
//! # Join
//!
//! ```text
//! receiverPoints.csv ──► canonical rows (file order)
//! category k dir     ──► CategoryScan{bin → id → value}     (k = 0..n, parallel)
//!                          │
//!                          ▼
//! join table: BTreeMap<TimeBin, Vec<[Option<f64>; n]>>    row = receiver point
//! ```
//!
//! Every bin in which any category has a value for a canonical receiver
//! point gets one output file with one row per canonical receiver point; a
//! category with no value for that point and bin leaves its cell blank.  A
//! bin holding only orphan or no rows produces no file.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use rustc_hash::FxHashSet;

use pp_core::{TimeBin, TimeBinning};

use crate::category::{CategoryScan, scan_category};
use crate::receiver::{ReceiverPoints, load_receiver_points};
use crate::{NoiseError, NoiseResult};

// ── Report ────────────────────────────────────────────────────────────────────

/// Non-fatal issues met while merging.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MergeReport {
    pub files_read:       u64,
    pub files_ignored:    u64,
    /// Category values whose receiver point is not in the canonical file.
    pub orphan_keys:      u64,
    pub unparseable_rows: u64,
    pub duplicate_rows:   u64,
}

// ── Result ────────────────────────────────────────────────────────────────────

/// One merged time bin.
#[derive(Clone, Debug, PartialEq)]
pub struct MergedBin {
    pub bin:   TimeBin,
    /// Bin start, simulation seconds.
    pub start: f64,
    /// One row per receiver point in file order; one column per category.
    pub rows:  Vec<Vec<Option<f64>>>,
}

#[derive(Clone, Debug)]
pub struct MergedNoise {
    pub labels:  Vec<String>,
    pub binning: TimeBinning,
    pub points:  ReceiverPoints,
    /// Ascending by bin start.
    pub bins:    Vec<MergedBin>,
    pub report:  MergeReport,
}

impl MergedNoise {
    /// Column index of `label`.
    pub fn column(&self, label: &str) -> Option<usize> {
        self.labels.iter().position(|l| l == label)
    }

    /// Value of `label` for receiver point `id` in `bin`.
    pub fn value(&self, bin: TimeBin, id: &str, label: &str) -> Option<f64> {
        let col = self.column(label)?;
        let row = self.points.position(id)?;
        let b = self.bins.iter().find(|b| b.bin == bin)?;
        b.rows[row][col]
    }
}

// ── Engine ────────────────────────────────────────────────────────────────────

/// Joins per-category noise files on (receiver point, time bin).
///
/// ```rust,ignore
/// let merged = NoiseMerger::new(points_file, &labels, &dirs, 3600.0)?
///     .with_delimiter(b';')
///     .run()?;
/// write_merged(&merged, &out_dir)?;
/// ```
pub struct NoiseMerger {
    receiver_points: PathBuf,
    categories:      Vec<(String, PathBuf)>,
    binning:         TimeBinning,
    delimiter:       u8,
}

impl NoiseMerger {
    /// Fails with [`NoiseError::Config`] when the label and directory counts
    /// differ, there are no categories, or `time_bin_width <= 0`.
    pub fn new<L, D>(
        receiver_points: impl Into<PathBuf>,
        labels:          &[L],
        dirs:            &[D],
        time_bin_width:  f64,
    ) -> NoiseResult<Self>
    where
        L: AsRef<str>,
        D: AsRef<Path>,
    {
        if labels.len() != dirs.len() {
            return Err(NoiseError::Config(format!(
                "{} category labels but {} directories",
                labels.len(),
                dirs.len()
            )));
        }
        if labels.is_empty() {
            return Err(NoiseError::Config("no noise categories given".into()));
        }
        let binning = TimeBinning::new(time_bin_width)
            .map_err(|e| NoiseError::Config(e.to_string()))?;
        Ok(Self {
            receiver_points: receiver_points.into(),
            categories: labels
                .iter()
                .zip(dirs)
                .map(|(l, d)| (l.as_ref().to_owned(), d.as_ref().to_path_buf()))
                .collect(),
            binning,
            delimiter: b';',
        })
    }

    /// Field delimiter of the input files.  Default `;`.
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn run(&self) -> NoiseResult<MergedNoise> {
        let points = load_receiver_points(&self.receiver_points, self.delimiter)?;
        let scans = self.scan_all()?;
        Ok(join(points, scans, self.binning))
    }

    #[cfg(not(feature = "parallel"))]
    fn scan_all(&self) -> NoiseResult<Vec<CategoryScan>> {
        self.categories
            .iter()
            .map(|(label, dir)| scan_category(label, dir, &self.binning, self.delimiter))
            .collect()
    }

    #[cfg(feature = "parallel")]
    fn scan_all(&self) -> NoiseResult<Vec<CategoryScan>> {
        use rayon::prelude::*;

        // Indexed collect keeps category order.
        self.categories
            .par_iter()
            .map(|(label, dir)| scan_category(label, dir, &self.binning, self.delimiter))
            .collect()
    }
}

/// Merge noise categories on (receiver point, time bin).
pub fn merge<L, D>(
    receiver_points: &Path,
    labels:          &[L],
    dirs:            &[D],
    time_bin_width:  f64,
) -> NoiseResult<MergedNoise>
where
    L: AsRef<str>,
    D: AsRef<Path>,
{
    NoiseMerger::new(receiver_points, labels, dirs, time_bin_width)?.run()
}

/// Combine category scans in category order.
pub fn join(points: ReceiverPoints, scans: Vec<CategoryScan>, binning: TimeBinning) -> MergedNoise {
    let n = scans.len();
    let mut report = MergeReport::default();
    let mut table: BTreeMap<TimeBin, Vec<Vec<Option<f64>>>> = BTreeMap::new();

    for (col, scan) in scans.iter().enumerate() {
        report.files_read += scan.files_read;
        report.files_ignored += scan.files_ignored;
        report.unparseable_rows += scan.unparseable_rows;
        report.duplicate_rows += scan.duplicate_rows;

        let mut warned: FxHashSet<&str> = FxHashSet::default();
        for (&bin, values) in &scan.values {
            for (id, &value) in values {
                match points.position(id) {
                    Some(row) => {
                        let rows = table
                            .entry(bin)
                            .or_insert_with(|| vec![vec![None; n]; points.len()]);
                        rows[row][col] = Some(value);
                    }
                    None => {
                        report.orphan_keys += 1;
                        if warned.insert(id.as_str()) {
                            log::warn!(
                                "noise category {:?}: receiver point {id} is not in the receiver points file",
                                scan.label
                            );
                        }
                    }
                }
            }
        }
    }

    let bins: Vec<MergedBin> = table
        .into_iter()
        .map(|(bin, rows)| MergedBin { bin, start: binning.start(bin), rows })
        .collect();
    log::info!(
        "merged {} noise categories over {} receiver points into {} bins ({} orphan keys)",
        n,
        points.len(),
        bins.len(),
        report.orphan_keys,
    );
    MergedNoise {
        labels: scans.into_iter().map(|s| s.label).collect(),
        binning,
        points,
        bins,
        report,
    }
}
