//! Plain data row types written by output backends.

use pp_aggregate::BinnedEmissions;
use pp_core::Pollutant;
use pp_raster::RasterSet;

/// Total emission of one pollutant on one link within one time bin.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkEmissionRow {
    /// Bin start, simulation seconds.
    pub time_bin:  f64,
    pub link_id:   String,
    pub pollutant: Pollutant,
    pub value:     f64,
}

impl LinkEmissionRow {
    /// One row per (bin, link, pollutant), in aggregation output order.
    pub fn from_bins(bins: &BinnedEmissions) -> Vec<Self> {
        bins.entries()
            .map(|e| LinkEmissionRow {
                time_bin:  e.start,
                link_id:   e.link.as_str().to_owned(),
                pollutant: e.pollutant,
                value:     e.value,
            })
            .collect()
    }
}

/// Accumulated value of one grid cell for one pollutant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridCellRow {
    pub pollutant: Pollutant,
    pub cell_x:    i64,
    pub cell_y:    i64,
    /// Cell centre in the network's coordinate system.  Not written to CSV.
    pub center_x:  f64,
    pub center_y:  f64,
    pub value:     f64,
}

impl GridCellRow {
    /// One row per populated cell: pollutant, then x, then y.
    pub fn from_rasters(set: &RasterSet) -> Vec<Self> {
        set.cells()
            .map(|(pollutant, cell, value)| {
                let center = set.transform.cell_center(cell);
                GridCellRow {
                    pollutant,
                    cell_x: cell.x,
                    cell_y: cell.y,
                    center_x: center.x,
                    center_y: center.y,
                    value,
                }
            })
            .collect()
    }
}
