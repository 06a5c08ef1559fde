//! Simulation time binning.
//!
//! # Design
//!
//! Event timestamps are simulation seconds (`f64`).  Aggregation partitions
//! time into fixed-width, half-open bins:
//!
//!   bin k = [k * width, (k + 1) * width)
//!
//! A `TimeBin` is the integer index `k`; the width lives in `TimeBinning`.
//! Keying maps by the integer index keeps them `Ord + Hash` and avoids
//! comparing floating-point start times.

use std::fmt;

use crate::{CoreError, CoreResult};

// ── TimeBin ───────────────────────────────────────────────────────────────────

/// Index of a half-open time bin.  Bin `k` starts at `k * width`.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
pub struct TimeBin(pub u64);

impl TimeBin {
    pub const ZERO: TimeBin = TimeBin(0);

    #[inline]
    pub fn next(self) -> TimeBin {
        TimeBin(self.0 + 1)
    }
}

impl fmt::Display for TimeBin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "bin{}", self.0)
    }
}

// ── TimeBinning ───────────────────────────────────────────────────────────────

/// Maps timestamps to [`TimeBin`]s and back for one fixed bin width.
///
/// Cheap to copy; holds no heap data.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TimeBinning {
    width: f64,
}

impl TimeBinning {
    /// Create a binning of `width_secs` seconds.
    ///
    /// Fails with [`CoreError::Config`] unless the width is finite and > 0.
    pub fn new(width_secs: f64) -> CoreResult<Self> {
        if !width_secs.is_finite() || width_secs <= 0.0 {
            return Err(CoreError::Config(format!(
                "time bin width must be a positive number of seconds, got {width_secs}"
            )));
        }
        Ok(Self { width: width_secs })
    }

    #[inline]
    pub fn width(&self) -> f64 {
        self.width
    }

    /// Start time (inclusive) of `bin`.
    #[inline]
    pub fn start(&self, bin: TimeBin) -> f64 {
        bin.0 as f64 * self.width
    }

    /// End time (exclusive) of `bin`.
    #[inline]
    pub fn end(&self, bin: TimeBin) -> f64 {
        self.start(bin.next())
    }

    /// The bin containing `time`, or `None` for negative or non-finite input
    /// and for times whose bin index does not fit a `u64`.
    ///
    /// A timestamp exactly on a boundary `k * width` belongs to bin `k`.
    pub fn bin_of(&self, time: f64) -> Option<TimeBin> {
        if !time.is_finite() || time < 0.0 {
            return None;
        }
        let q = (time / self.width).floor();
        // `u64::MAX as f64` is 2^64, the first value a u64 cannot hold.
        if q >= u64::MAX as f64 {
            return None;
        }
        let mut k = q as u64;
        // Division can round across a boundary; settle against start().
        if k > 0 && self.start(TimeBin(k)) > time {
            k -= 1;
        } else if let Some(next) = k.checked_add(1) {
            if self.start(TimeBin(next)) <= time {
                k = next;
            }
        }
        Some(TimeBin(k))
    }

    /// The bin whose end time is `end_time`.
    ///
    /// The noise stage labels its per-interval files by interval end
    /// (`3600` is the bin `[0, 3600)`).  Returns `None` when `end_time` is not
    /// a positive multiple of the width.
    pub fn bin_ending_at(&self, end_time: f64) -> Option<TimeBin> {
        if !end_time.is_finite() || end_time <= 0.0 {
            return None;
        }
        let k = (end_time / self.width).round();
        if k < 1.0 || (k * self.width - end_time).abs() > self.width * 1e-9 {
            return None;
        }
        Some(TimeBin(k as u64 - 1))
    }
}

impl fmt::Display for TimeBinning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} s bins", self.width)
    }
}
