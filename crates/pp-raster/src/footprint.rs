//! Per-link cell weights.
//!
//! A link's footprint is the set of cells it spreads its emissions over,
//! each with a normalised weight (weights sum to 1).  It depends only on the
//! link geometry and the grid parameters, so it is computed once per link
//! no matter how many events the link carries.
//!
//! # Algorithm
//!
//! 1. Sample the polyline at a spacing of at most `min(cell, radius) / 2`
//!    (`cell / 2` when the radius is 0), endpoints included.
//! 2. Bulk-load the samples into an R-tree.
//! 3. Candidates: every cell in the polyline's bbox grown by `radius` whose
//!    centre lies within `radius` of its nearest sample, plus every cell
//!    that contains a sample.
//! 4. Weight each candidate by the kernel at its centre's nearest-sample
//!    distance and normalise.

use std::collections::BTreeMap;

use rstar::RTree;

use pp_core::{Bounds, Coord, GridConfig, Kernel};
use pp_network::Link;

use crate::{Cell, GridTransform};

/// Kernel weight at distance `d` (metres) from the link.
pub fn kernel_weight(kernel: Kernel, d: f64, cell_size: f64, radius: f64) -> f64 {
    match kernel {
        Kernel::InverseDistance => 1.0 / (d + cell_size / 2.0),
        Kernel::Gaussian => {
            let sigma = radius.max(cell_size) / 2.0;
            (-(d * d) / (2.0 * sigma * sigma)).exp()
        }
        Kernel::Uniform => 1.0,
    }
}

/// Sample spacing for the given grid parameters.
pub fn sample_step(cell_size: f64, radius: f64) -> f64 {
    if radius > 0.0 {
        cell_size.min(radius) / 2.0
    } else {
        cell_size / 2.0
    }
}

/// Points along `polyline` no further than `step` apart.
pub fn sample_polyline(polyline: &[Coord], step: f64) -> Vec<[f64; 2]> {
    let Some(first) = polyline.first() else {
        return Vec::new();
    };
    let mut out = vec![first.to_array()];
    for w in polyline.windows(2) {
        let n = (w[0].distance(w[1]) / step).ceil().max(1.0) as usize;
        out.extend((1..=n).map(|i| w[0].lerp(w[1], i as f64 / n as f64).to_array()));
    }
    out
}

/// Normalised `(cell, weight)` pairs for `link`, ascending by cell.
pub fn link_footprint(link: &Link, transform: &GridTransform, grid: &GridConfig) -> Vec<(Cell, f64)> {
    let radius = grid.smoothing_radius;
    let samples = sample_polyline(&link.polyline, sample_step(transform.cell_size(), radius));
    if samples.is_empty() {
        return Vec::new();
    }
    let sample_cells: Vec<Cell> = samples
        .iter()
        .map(|s| transform.cell_of(Coord::new(s[0], s[1])))
        .collect();
    let tree = RTree::bulk_load(samples);

    let nearest = |cell: Cell| -> f64 {
        let c = transform.cell_center(cell);
        tree.nearest_neighbor(&c.to_array())
            .map_or(f64::INFINITY, |p| c.distance(Coord::new(p[0], p[1])))
    };

    // cell → distance from its centre to the link
    let mut candidates: BTreeMap<Cell, f64> = BTreeMap::new();
    if radius > 0.0 {
        let reach = Bounds::from_coords(&link.polyline).expanded(radius);
        let lo = transform.cell_of(reach.min);
        let hi = transform.cell_of(reach.max);
        for x in lo.x..=hi.x {
            for y in lo.y..=hi.y {
                let cell = Cell::new(x, y);
                let d = nearest(cell);
                if d <= radius {
                    candidates.insert(cell, d);
                }
            }
        }
    }
    for cell in sample_cells {
        candidates.entry(cell).or_insert_with(|| nearest(cell));
    }

    let cell_size = transform.cell_size();
    let mut weighted: Vec<(Cell, f64)> = candidates
        .into_iter()
        .map(|(cell, d)| (cell, kernel_weight(grid.kernel, d, cell_size, radius)))
        .collect();
    let total: f64 = weighted.iter().map(|(_, w)| w).sum();
    if total > 0.0 && total.is_finite() {
        weighted.iter_mut().for_each(|(_, w)| *w /= total);
    } else {
        let n = weighted.len() as f64;
        weighted.iter_mut().for_each(|(_, w)| *w = 1.0 / n);
    }
    weighted
}
