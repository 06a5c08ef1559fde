//! Grid coordinates and the sparse raster types.
//!
//! # Coordinates
//!
//! Cell `(x, y)` covers the half-open square
//!
//!   [origin.x + x * size, origin.x + (x + 1) * size)
//!   × [origin.y + y * size, origin.y + (y + 1) * size)
//!
//! The origin is the network bounding box's minimum corner pulled back by
//! the smoothing radius, so every cell that can receive emissions has
//! non-negative indices.

use std::collections::BTreeMap;
use std::fmt;

use pp_core::{Bounds, Coord, Pollutant};

/// Integer grid coordinate.  Orders by `x`, then `y`.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Cell {
    pub x: i64,
    pub y: i64,
}

impl Cell {
    #[inline]
    pub fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.x, self.y)
    }
}

// ── GridTransform ─────────────────────────────────────────────────────────────

/// Maps world coordinates to cells and back.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct GridTransform {
    origin:    Coord,
    cell_size: f64,
}

impl GridTransform {
    /// Caller guarantees `cell_size > 0`.
    pub fn new(origin: Coord, cell_size: f64) -> Self {
        Self { origin, cell_size }
    }

    /// Grid aligned to `bounds.min - margin`.  An empty box aligns to (0, 0).
    pub fn aligned_to(bounds: Bounds, cell_size: f64, margin: f64) -> Self {
        let origin = if bounds.is_empty() {
            Coord::default()
        } else {
            Coord::new(bounds.min.x - margin, bounds.min.y - margin)
        };
        Self::new(origin, cell_size)
    }

    #[inline]
    pub fn origin(&self) -> Coord {
        self.origin
    }

    #[inline]
    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    /// The cell containing `c`.
    #[inline]
    pub fn cell_of(&self, c: Coord) -> Cell {
        Cell {
            x: ((c.x - self.origin.x) / self.cell_size).floor() as i64,
            y: ((c.y - self.origin.y) / self.cell_size).floor() as i64,
        }
    }

    /// World coordinate of the centre of `cell`.
    #[inline]
    pub fn cell_center(&self, cell: Cell) -> Coord {
        Coord::new(
            self.origin.x + (cell.x as f64 + 0.5) * self.cell_size,
            self.origin.y + (cell.y as f64 + 0.5) * self.cell_size,
        )
    }
}

// ── Rasters ───────────────────────────────────────────────────────────────────

/// Sparse grid for one pollutant.  Cells that received nothing are absent.
pub type Raster = BTreeMap<Cell, f64>;

/// Per-pollutant rasters sharing one transform.
#[derive(Clone, Debug, PartialEq)]
pub struct RasterSet {
    pub transform: GridTransform,
    pub rasters:   BTreeMap<Pollutant, Raster>,
}

impl RasterSet {
    pub fn new(transform: GridTransform) -> Self {
        Self { transform, rasters: BTreeMap::new() }
    }

    pub fn get(&self, pollutant: Pollutant) -> Option<&Raster> {
        self.rasters.get(&pollutant)
    }

    /// Value of one cell, `None` if the cell received nothing.
    pub fn value(&self, pollutant: Pollutant, cell: Cell) -> Option<f64> {
        self.rasters.get(&pollutant)?.get(&cell).copied()
    }

    /// Populated cells across all pollutants.
    pub fn cell_count(&self) -> usize {
        self.rasters.values().map(|r| r.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.rasters.is_empty()
    }

    /// Sum of every cell for `pollutant`.
    pub fn total(&self, pollutant: Pollutant) -> f64 {
        self.rasters.get(&pollutant).map_or(0.0, |r| r.values().sum())
    }

    /// Every populated cell in output order: pollutant, then x, then y.
    pub fn cells(&self) -> impl Iterator<Item = (Pollutant, Cell, f64)> + '_ {
        self.rasters
            .iter()
            .flat_map(|(&p, r)| r.iter().map(move |(&c, &v)| (p, c, v)))
    }
}
