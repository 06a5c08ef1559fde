//! Day / evening / night noise levels from merged hourly immissions.
//!
//! Each merged bin spreads its sound energy `10^(L/10)` over the hours of
//! the first day it overlaps, in proportion to the overlap.  With hourly
//! bins that is one bin per hour.  Period levels are energetic means over
//! the period's hours:
//!
//! | Level       | Hours        | H  |
//! |-------------|--------------|----|
//! | `L_day`     | 07:00–19:00  | 12 |
//! | `L_evening` | 19:00–23:00  | 4  |
//! | `L_night`   | 23:00–07:00  | 8  |
//! | `L_6-22`    | 06:00–22:00  | 16 |
//! | `L_22-6`    | 22:00–06:00  | 8  |
//!
//! Missing and non-positive levels carry no energy; a period without energy
//! has level 0.  `L_den` weights evening by +5 dB and night by +10 dB.

use std::path::{Path, PathBuf};

use csv::Writer;

use pp_core::{Coord, ReceiverPointId};

use crate::merge::MergedNoise;
use crate::{NoiseError, NoiseResult};

pub const LEVELS_FILE: &str = "immission_processed.csv";

const HOUR: f64 = 3_600.0;

/// Half-open hour ranges `[from, to)`, wrapping past midnight.
const DAY:     (usize, usize) = (7, 19);
const EVENING: (usize, usize) = (19, 23);
const NIGHT:   (usize, usize) = (23, 7);
const H6_22:   (usize, usize) = (6, 22);
const H22_6:   (usize, usize) = (22, 6);

#[derive(Clone, Debug, PartialEq)]
pub struct NoiseLevels {
    pub id:        ReceiverPointId,
    pub coord:     Coord,
    pub l_den:     f64,
    pub l_day:     f64,
    pub l_evening: f64,
    pub l_night:   f64,
    pub l_6_22:    f64,
    pub l_22_6:    f64,
}

/// `10·log10((12·10^(Ld/10) + 4·10^((Le+5)/10) + 8·10^((Ln+10)/10)) / 24)`.
pub fn lden(l_day: f64, l_evening: f64, l_night: f64) -> f64 {
    let e = 12.0 * energy(l_day) + 4.0 * energy(l_evening + 5.0) + 8.0 * energy(l_night + 10.0);
    10.0 * (e / 24.0).log10()
}

#[inline]
fn energy(level: f64) -> f64 {
    10f64.powf(level / 10.0)
}

fn period_level(hourly: &[f64; 24], (from, to): (usize, usize)) -> f64 {
    let hours: Vec<usize> = if from < to {
        (from..to).collect()
    } else {
        (from..24).chain(0..to).collect()
    };
    let sum: f64 = hours.iter().map(|&h| hourly[h]).sum();
    if sum > 0.0 {
        10.0 * (sum / hours.len() as f64).log10()
    } else {
        0.0
    }
}

/// Levels for every receiver point from the `label` column.
pub fn compute_levels(merged: &MergedNoise, label: &str) -> NoiseResult<Vec<NoiseLevels>> {
    let col = merged.column(label).ok_or_else(|| {
        NoiseError::Config(format!("no merged noise category named {label:?}"))
    })?;
    let width = merged.binning.width();

    let levels = merged
        .points
        .iter()
        .enumerate()
        .map(|(row, point)| {
            let mut hourly = [0.0f64; 24];
            for bin in &merged.bins {
                let Some(level) = bin.rows[row][col] else { continue };
                if level <= 0.0 {
                    continue;
                }
                let (start, end) = (bin.start, bin.start + width);
                let first = (start / HOUR).floor() as usize;
                for (h, slot) in hourly.iter_mut().enumerate().skip(first) {
                    let overlap = end.min((h + 1) as f64 * HOUR) - start.max(h as f64 * HOUR);
                    if overlap <= 0.0 {
                        break;
                    }
                    *slot += energy(level) * overlap / HOUR;
                }
            }
            let (l_day, l_evening, l_night) =
                (period_level(&hourly, DAY), period_level(&hourly, EVENING), period_level(&hourly, NIGHT));
            NoiseLevels {
                id: point.id.clone(),
                coord: point.coord,
                l_den: lden(l_day, l_evening, l_night),
                l_day,
                l_evening,
                l_night,
                l_6_22: period_level(&hourly, H6_22),
                l_22_6: period_level(&hourly, H22_6),
            }
        })
        .collect();
    Ok(levels)
}

/// Write `levels` to `path`.
pub fn write_levels(levels: &[NoiseLevels], path: &Path) -> NoiseResult<()> {
    let mut w = Writer::from_path(path).map_err(|e| NoiseError::csv(path, e))?;
    w.write_record([
        "receiverPointId", "xCoord", "yCoord", "L_den", "L_day", "L_evening", "L_night", "L_6-22", "L_22-6",
    ])
    .map_err(|e| NoiseError::csv(path, e))?;
    for l in levels {
        w.write_record(&[
            l.id.to_string(),
            l.coord.x.to_string(),
            l.coord.y.to_string(),
            l.l_den.to_string(),
            l.l_day.to_string(),
            l.l_evening.to_string(),
            l.l_night.to_string(),
            l.l_6_22.to_string(),
            l.l_22_6.to_string(),
        ])
        .map_err(|e| NoiseError::csv(path, e))?;
    }
    w.flush().map_err(|e| NoiseError::io(path, e))?;
    Ok(())
}

/// Compute levels from `label` and write [`LEVELS_FILE`] into `dir`.
pub fn process_immissions(merged: &MergedNoise, label: &str, dir: &Path) -> NoiseResult<PathBuf> {
    let levels = compute_levels(merged, label)?;
    std::fs::create_dir_all(dir).map_err(|e| NoiseError::io(dir, e))?;
    let path = dir.join(LEVELS_FILE);
    write_levels(&levels, &path)?;
    log::info!("wrote noise levels for {} receiver points to {}", levels.len(), path.display());
    Ok(path)
}
