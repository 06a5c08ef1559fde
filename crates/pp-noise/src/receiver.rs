//! Canonical receiver-point loader.
//!
//! # CSV format
//!
//! Written by the noise stage, `;`-delimited with a header:
//!
//! ```csv
//! receiverPointId;xCoord;yCoord
//! 0;4400.0;1200.0
//! 1;4650.0;1200.0
//! ```
//!
//! File order is the row order of every merged output file.  Any malformed
//! row or duplicate id fails the whole load.

use std::io::Read;
use std::path::Path;

use rustc_hash::FxHashMap;
use serde::Deserialize;

use pp_core::{Coord, ReceiverPointId};

use crate::{NoiseError, NoiseResult};

#[derive(Deserialize)]
struct ReceiverPointRecord {
    #[serde(rename = "receiverPointId")]
    id: String,
    #[serde(rename = "xCoord")]
    x:  f64,
    #[serde(rename = "yCoord")]
    y:  f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ReceiverPoint {
    pub id:    ReceiverPointId,
    pub coord: Coord,
}

/// Receiver points in file order with an id index.
#[derive(Clone, Debug, Default)]
pub struct ReceiverPoints {
    points: Vec<ReceiverPoint>,
    index:  FxHashMap<ReceiverPointId, usize>,
}

impl ReceiverPoints {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Position of `id` in file order.
    #[inline]
    pub fn position(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn get(&self, i: usize) -> Option<&ReceiverPoint> {
        self.points.get(i)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ReceiverPoint> {
        self.points.iter()
    }

    fn push(&mut self, point: ReceiverPoint) -> Result<(), String> {
        if self.index.contains_key(&point.id) {
            return Err(format!("duplicate receiver point {}", point.id));
        }
        self.index.insert(point.id.clone(), self.points.len());
        self.points.push(point);
        Ok(())
    }
}

impl TryFrom<Vec<ReceiverPoint>> for ReceiverPoints {
    type Error = String;

    /// Keeps the given order.  A repeated id fails, as it does when loading.
    fn try_from(points: Vec<ReceiverPoint>) -> Result<Self, Self::Error> {
        let mut out = ReceiverPoints::default();
        for p in points {
            out.push(p)?;
        }
        Ok(out)
    }
}

/// Load the receiver-point file at `path`.
pub fn load_receiver_points(path: &Path, delimiter: u8) -> NoiseResult<ReceiverPoints> {
    let file = std::fs::File::open(path).map_err(|e| NoiseError::io(path, e))?;
    let points = load_receiver_points_reader(file, delimiter).map_err(|message| {
        NoiseError::ReceiverPoints { path: path.to_path_buf(), message }
    })?;
    log::info!("loaded {} receiver points from {}", points.len(), path.display());
    Ok(points)
}

/// Like [`load_receiver_points`] but accepts any `Read` source.  Errors are
/// plain messages; the caller attaches the source name.
pub fn load_receiver_points_reader<R: Read>(reader: R, delimiter: u8) -> Result<ReceiverPoints, String> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut points = ReceiverPoints::default();
    for (i, result) in csv_reader.deserialize::<ReceiverPointRecord>().enumerate() {
        let row = result.map_err(|e| format!("row {}: {e}", i + 1))?;
        points.push(ReceiverPoint {
            id:    ReceiverPointId::from(row.id),
            coord: Coord::new(row.x, row.y),
        })?;
    }
    Ok(points)
}
