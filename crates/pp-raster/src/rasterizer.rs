//! The rasterizer consumer and its convenience driver.

use std::collections::BTreeMap;

use rustc_hash::FxHashMap;

use pp_core::{GridConfig, Kernel, Pollutant};
use pp_events::{Event, EventConsumer, EventResult};
use pp_network::{Link, LinkNetwork};

use crate::footprint::link_footprint;
use crate::{Cell, GridTransform, RasterError, RasterResult, RasterSet};

/// Spreads each link's emissions over the grid cells near its geometry.
///
/// Ingest only sums quantities per (link, pollutant).  Footprints are
/// computed once per link in [`finalize`](Self::finalize) and applied in
/// first-seen link order, so the result is identical for identical input
/// regardless of thread count.
pub struct Rasterizer<'n> {
    network:          &'n LinkNetwork,
    grid:             GridConfig,
    transform:        GridTransform,
    totals:           Vec<(&'n Link, BTreeMap<Pollutant, f64>)>,
    index:            FxHashMap<&'n str, usize>,
    events_seen:      u64,
    records_ingested: u64,
}

impl<'n> Rasterizer<'n> {
    /// Fails with [`RasterError::InvalidParameter`] unless `cell_size > 0`
    /// and `smoothing_radius >= 0`.
    pub fn new(network: &'n LinkNetwork, grid: &GridConfig) -> RasterResult<Self> {
        if !grid.cell_size.is_finite() || grid.cell_size <= 0.0 {
            return Err(RasterError::InvalidParameter(format!(
                "cell size must be > 0, got {}",
                grid.cell_size
            )));
        }
        if !grid.smoothing_radius.is_finite() || grid.smoothing_radius < 0.0 {
            return Err(RasterError::InvalidParameter(format!(
                "smoothing radius must be >= 0, got {}",
                grid.smoothing_radius
            )));
        }
        let transform = GridTransform::aligned_to(network.bounds(), grid.cell_size, grid.smoothing_radius);
        Ok(Self {
            network,
            grid: grid.clone(),
            transform,
            totals: Vec::new(),
            index: FxHashMap::default(),
            events_seen: 0,
            records_ingested: 0,
        })
    }

    pub fn transform(&self) -> GridTransform {
        self.transform
    }

    pub fn events_seen(&self) -> u64 {
        self.events_seen
    }

    pub fn records_ingested(&self) -> u64 {
        self.records_ingested
    }

    /// Distinct links that carried at least one emission record.
    pub fn link_count(&self) -> usize {
        self.totals.len()
    }

    /// Distribute the summed emissions and return the rasters.
    pub fn finalize(self) -> RasterSet {
        let footprints = self.footprints();
        let mut set = RasterSet::new(self.transform);
        for ((_, totals), footprint) in self.totals.iter().zip(&footprints) {
            for (&p, &q) in totals {
                if q == 0.0 {
                    continue;
                }
                let raster = set.rasters.entry(p).or_default();
                for &(cell, w) in footprint {
                    *raster.entry(cell).or_insert(0.0) += q * w;
                }
            }
        }
        log::info!(
            "rasterized {} emission records on {} links into {} cells ({} pollutants)",
            self.records_ingested,
            self.totals.len(),
            set.cell_count(),
            set.rasters.len(),
        );
        set
    }

    #[cfg(not(feature = "parallel"))]
    fn footprints(&self) -> Vec<Vec<(Cell, f64)>> {
        self.totals
            .iter()
            .map(|(link, _)| link_footprint(link, &self.transform, &self.grid))
            .collect()
    }

    #[cfg(feature = "parallel")]
    fn footprints(&self) -> Vec<Vec<(Cell, f64)>> {
        use rayon::prelude::*;

        // Indexed collect keeps link order.
        self.totals
            .par_iter()
            .map(|(link, _)| link_footprint(link, &self.transform, &self.grid))
            .collect()
    }
}

impl EventConsumer for Rasterizer<'_> {
    type Error = RasterError;

    fn ingest(&mut self, event: &Event) -> RasterResult<()> {
        self.events_seen += 1;
        let Some(record) = event.as_emission() else {
            return Ok(());
        };
        if !record.time.is_finite() || record.time < 0.0 {
            return Err(RasterError::MalformedEvent(format!(
                "emission on link {} has invalid time {}",
                record.link, record.time
            )));
        }
        let amounts = record.pollutants()?;

        let i = match self.index.get(record.link.as_str()) {
            Some(&i) => i,
            None => {
                let link = self
                    .network
                    .link(record.link.as_str())
                    .ok_or_else(|| RasterError::UnknownLink(record.link.clone()))?;
                let i = self.totals.len();
                self.index.insert(link.id.as_str(), i);
                self.totals.push((link, BTreeMap::new()));
                i
            }
        };
        let totals = &mut self.totals[i].1;
        for (p, v) in amounts {
            *totals.entry(p).or_insert(0.0) += v;
        }
        self.records_ingested += 1;
        Ok(())
    }
}

/// Rasterize every emission in `events` with the default kernel.
pub fn analyze<I>(
    events:           I,
    network:          &LinkNetwork,
    cell_size:        f64,
    smoothing_radius: f64,
) -> RasterResult<RasterSet>
where
    I: IntoIterator<Item = EventResult<Event>>,
{
    let grid = GridConfig { cell_size, smoothing_radius, kernel: Kernel::default() };
    analyze_with(events, network, &grid)
}

/// Like [`analyze`] with an explicit kernel.
pub fn analyze_with<I>(events: I, network: &LinkNetwork, grid: &GridConfig) -> RasterResult<RasterSet>
where
    I: IntoIterator<Item = EventResult<Event>>,
{
    let mut rasterizer = Rasterizer::new(network, grid)?;
    rasterizer.ingest_all(events)?;
    Ok(rasterizer.finalize())
}
