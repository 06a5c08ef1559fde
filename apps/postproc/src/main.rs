//! postproc: post-processing for a finished transport simulation run.
//!
//! ```text
//! postproc <config.json>
//! ```
//!
//! Stages:
//!
//! 1. Load the network geometry.
//! 2. Aggregate link emissions per time bin and rasterize them onto the
//!    grid.  Both read the event log independently and run in parallel.
//! 3. Write `link_emissions.csv` and `Emission_Grid_Analysis.csv` into the
//!    output directory.
//! 4. Merge the noise stage's per-category files into `merged_<start>.csv`
//!    and, if enabled, derive `immission_processed.csv`.
//!
//! Logging goes to stderr; set `RUST_LOG` to change the default `info` level.

use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result, bail};

use pp_aggregate::{BinnedEmissions, TimeBinAggregator};
use pp_core::{AnalysisConfig, GridConfig, NoiseConfig, TimeBinning};
use pp_events::{EventConsumer, EventReader};
use pp_network::{LinkNetwork, load_network_xml};
use pp_noise::{NoiseMerger, process_immissions, write_merged};
use pp_output::{CsvWriter, write_results};
use pp_raster::{RasterSet, Rasterizer};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    let Some(config_path) = std::env::args_os().nth(1) else {
        bail!("usage: postproc <config.json>");
    };
    let config_path = Path::new(&config_path);
    let config = AnalysisConfig::from_json_path(config_path)
        .with_context(|| format!("loading config {}", config_path.display()))?;

    let t0 = Instant::now();
    run(&config)?;
    log::info!("post-processing complete in {:.3} s", t0.elapsed().as_secs_f64());
    Ok(())
}

fn run(config: &AnalysisConfig) -> Result<()> {
    let out = &config.output_dir;
    std::fs::create_dir_all(out).with_context(|| format!("creating {}", out.display()))?;

    // 1. Network.
    let t = Instant::now();
    let network_path = config.network_path();
    let network = load_network_xml(&network_path)
        .with_context(|| format!("loading network {}", network_path.display()))?;
    log::info!("network stage: {:.3} s", t.elapsed().as_secs_f64());

    // 2. Aggregation and rasterization, each with its own read of the log.
    let t = Instant::now();
    let events = config.events_path();
    let binning = TimeBinning::new(config.emissions.time_bin_width_secs)?;
    let (bins, rasters) = rayon::join(
        || aggregate(&events, binning),
        || rasterize(&events, &network, &config.grid),
    );
    let bins = bins.context("aggregating link emissions")?;
    let rasters = rasters.context("rasterizing emissions")?;
    log::info!("emission stage: {:.3} s", t.elapsed().as_secs_f64());

    // 3. Emission outputs.
    let t = Instant::now();
    let mut writer = CsvWriter::new(out)?;
    write_results(&mut writer, &bins, &rasters).context("writing emission CSV files")?;
    write_extra_backends(out, &bins, &rasters)?;
    log::info!("output stage: {:.3} s", t.elapsed().as_secs_f64());

    // 4. Noise.
    match &config.noise {
        Some(noise) => {
            let t = Instant::now();
            run_noise(noise, out).context("noise post-processing")?;
            log::info!("noise stage: {:.3} s", t.elapsed().as_secs_f64());
        }
        None => log::info!("no noise section configured, skipping noise merge"),
    }
    Ok(())
}

fn aggregate(events: &Path, binning: TimeBinning) -> Result<BinnedEmissions> {
    let mut agg = TimeBinAggregator::new(binning);
    let reader = EventReader::from_path(events)?;
    agg.ingest_all(reader)
        .with_context(|| format!("reading {}", events.display()))?;
    Ok(agg.finalize())
}

fn rasterize(events: &Path, network: &LinkNetwork, grid: &GridConfig) -> Result<RasterSet> {
    let mut rasterizer = Rasterizer::new(network, grid)?;
    let reader = EventReader::from_path(events)?;
    rasterizer
        .ingest_all(reader)
        .with_context(|| format!("reading {}", events.display()))?;
    Ok(rasterizer.finalize())
}

#[cfg(any(feature = "sqlite", feature = "parquet"))]
fn write_extra_backends(out: &Path, bins: &BinnedEmissions, rasters: &RasterSet) -> Result<()> {
    #[cfg(feature = "sqlite")]
    {
        let mut w = pp_output::SqliteWriter::new(out)?;
        write_results(&mut w, bins, rasters).context("writing SQLite output")?;
    }
    #[cfg(feature = "parquet")]
    {
        let mut w = pp_output::ParquetWriter::new(out)?;
        write_results(&mut w, bins, rasters).context("writing Parquet output")?;
    }
    Ok(())
}

#[cfg(not(any(feature = "sqlite", feature = "parquet")))]
fn write_extra_backends(_out: &Path, _bins: &BinnedEmissions, _rasters: &RasterSet) -> Result<()> {
    Ok(())
}

fn run_noise(noise: &NoiseConfig, out: &Path) -> Result<()> {
    let (labels, dirs): (Vec<String>, Vec<_>) = noise.category_dirs(out).into_iter().unzip();
    log::info!(
        "merging noise categories {:?} (receiver point gap {} m)",
        labels,
        noise.receiver_point_gap
    );
    let merged = NoiseMerger::new(
        noise.receiver_points_path(out),
        &labels,
        &dirs,
        noise.time_bin_width_secs,
    )?
    .with_delimiter(noise.input_delimiter as u8)
    .run()?;

    let report = &merged.report;
    if report.orphan_keys + report.unparseable_rows + report.duplicate_rows > 0 {
        log::warn!(
            "noise merge: {} orphan receiver keys, {} unparseable rows, {} duplicate rows",
            report.orphan_keys,
            report.unparseable_rows,
            report.duplicate_rows,
        );
    }
    write_merged(&merged, &noise.merged_dir(out))?;

    if noise.process_immissions {
        process_immissions(&merged, &noise.immission_label, &noise.analysis_dir(out))?;
    }
    Ok(())
}
