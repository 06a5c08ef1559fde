//! Post-processing run configuration.
//!
//! Loaded from a JSON file by the `postproc` binary.  Every field except
//! `output_dir` has a default matching the scenario's usual layout, so a
//! minimal config is just `{ "output_dir": "output" }`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{CoreError, CoreResult};

// ── Top level ─────────────────────────────────────────────────────────────────

/// Top-level configuration for one post-processing run.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnalysisConfig {
    /// Simulation output directory.  Post-processing results land here too.
    pub output_dir: PathBuf,

    /// Event log.  Default: `<output_dir>/output_events.xml.gz`.
    #[serde(default)]
    pub events_file: Option<PathBuf>,

    /// Network geometry.  Default: `<output_dir>/output_network.xml.gz`.
    #[serde(default)]
    pub network_file: Option<PathBuf>,

    #[serde(default)]
    pub emissions: EmissionsConfig,

    #[serde(default)]
    pub grid: GridConfig,

    /// Noise merge settings.  `None` skips the noise pipeline.
    #[serde(default)]
    pub noise: Option<NoiseConfig>,
}

impl AnalysisConfig {
    /// Parse and validate a JSON config file.
    pub fn from_json_path(path: &Path) -> CoreResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| CoreError::io(path, e))?;
        let config: AnalysisConfig = serde_json::from_str(&text)
            .map_err(|source| CoreError::Json { path: path.to_path_buf(), source })?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a JSON config held in memory.
    pub fn from_json_str(text: &str) -> CoreResult<Self> {
        let config: AnalysisConfig = serde_json::from_str(text)
            .map_err(|e| CoreError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// A config with every default filled in, rooted at `output_dir`.
    pub fn with_output_dir(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir:   output_dir.into(),
            events_file:  None,
            network_file: None,
            emissions:    EmissionsConfig::default(),
            grid:         GridConfig::default(),
            noise:        Some(NoiseConfig::default()),
        }
    }

    pub fn events_path(&self) -> PathBuf {
        self.events_file
            .clone()
            .unwrap_or_else(|| self.output_dir.join("output_events.xml.gz"))
    }

    pub fn network_path(&self) -> PathBuf {
        self.network_file
            .clone()
            .unwrap_or_else(|| self.output_dir.join("output_network.xml.gz"))
    }

    /// Check numeric ranges and noise category pairing.
    pub fn validate(&self) -> CoreResult<()> {
        positive("emissions.time_bin_width_secs", self.emissions.time_bin_width_secs)?;
        positive("grid.cell_size", self.grid.cell_size)?;
        if !self.grid.smoothing_radius.is_finite() || self.grid.smoothing_radius < 0.0 {
            return Err(CoreError::Config(format!(
                "grid.smoothing_radius must be >= 0, got {}",
                self.grid.smoothing_radius
            )));
        }
        if let Some(noise) = &self.noise {
            noise.validate()?;
        }
        Ok(())
    }
}

fn positive(name: &str, value: f64) -> CoreResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(CoreError::Config(format!("{name} must be > 0, got {value}")))
    }
}

// ── Emissions ─────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EmissionsConfig {
    /// Width of the link-emission time bins.  Default: 3600.
    #[serde(default = "default_bin_width")]
    pub time_bin_width_secs: f64,
}

impl Default for EmissionsConfig {
    fn default() -> Self {
        Self { time_bin_width_secs: default_bin_width() }
    }
}

// ── Grid ──────────────────────────────────────────────────────────────────────

/// Distance-decay kernel used to spread a link's emissions over cells.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Kernel {
    /// `w = 1 / (d + cell_size / 2)`.
    #[default]
    InverseDistance,
    /// Gaussian with `sigma = max(radius, cell_size) / 2`.
    Gaussian,
    /// Equal weight for every cell in reach.
    Uniform,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GridConfig {
    /// Edge length of a square raster cell, metres.  Default: 50.
    #[serde(default = "default_cell_size")]
    pub cell_size: f64,

    /// Cells whose centre lies within this distance of a link receive a
    /// share of its emissions.  Default: 30.
    #[serde(default = "default_smoothing_radius")]
    pub smoothing_radius: f64,

    #[serde(default)]
    pub kernel: Kernel,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            cell_size:        default_cell_size(),
            smoothing_radius: default_smoothing_radius(),
            kernel:           Kernel::default(),
        }
    }
}

// ── Noise ─────────────────────────────────────────────────────────────────────

/// One noise dataset: a column label and the directory holding its files.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CategoryConfig {
    pub label: String,
    pub dir:   PathBuf,
}

impl CategoryConfig {
    pub fn new(label: impl Into<String>, dir: impl Into<PathBuf>) -> Self {
        Self { label: label.into(), dir: dir.into() }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NoiseConfig {
    /// Root of the noise stage output.  Relative paths below resolve against
    /// it.  Default: `<output_dir>/noise-analysis`.
    #[serde(default)]
    pub analysis_dir: Option<PathBuf>,

    /// Width of the noise computation intervals.  Default: 3600.
    #[serde(default = "default_bin_width")]
    pub time_bin_width_secs: f64,

    /// Spacing of the receiver-point grid used by the noise stage.
    #[serde(default = "default_receiver_point_gap")]
    pub receiver_point_gap: f64,

    /// Field delimiter of the noise stage's CSV files.  Default: `;`.
    #[serde(default = "default_input_delimiter")]
    pub input_delimiter: char,

    #[serde(default = "default_categories")]
    pub categories: Vec<CategoryConfig>,

    #[serde(default = "default_receiver_points_file")]
    pub receiver_points_file: PathBuf,

    /// Where merged per-bin files are written.  Default: `analysis_dir`.
    #[serde(default)]
    pub merged_dir: Option<PathBuf>,

    /// Derive day/evening/night levels from the merged immissions.
    #[serde(default = "default_true")]
    pub process_immissions: bool,

    /// Category label holding immission levels.  Default: `immission`.
    #[serde(default = "default_immission_label")]
    pub immission_label: String,
}

impl Default for NoiseConfig {
    fn default() -> Self {
        Self {
            analysis_dir:         None,
            time_bin_width_secs:  default_bin_width(),
            receiver_point_gap:   default_receiver_point_gap(),
            input_delimiter:      default_input_delimiter(),
            categories:           default_categories(),
            receiver_points_file: default_receiver_points_file(),
            merged_dir:           None,
            process_immissions:   true,
            immission_label:      default_immission_label(),
        }
    }
}

impl NoiseConfig {
    pub fn analysis_dir(&self, output_dir: &Path) -> PathBuf {
        self.analysis_dir
            .clone()
            .unwrap_or_else(|| output_dir.join("noise-analysis"))
    }

    /// Resolve `p` against the analysis directory unless it is absolute.
    pub fn resolve(&self, output_dir: &Path, p: &Path) -> PathBuf {
        if p.is_absolute() {
            p.to_path_buf()
        } else {
            self.analysis_dir(output_dir).join(p)
        }
    }

    pub fn receiver_points_path(&self, output_dir: &Path) -> PathBuf {
        self.resolve(output_dir, &self.receiver_points_file)
    }

    pub fn merged_dir(&self, output_dir: &Path) -> PathBuf {
        match &self.merged_dir {
            Some(d) => self.resolve(output_dir, d),
            None    => self.analysis_dir(output_dir),
        }
    }

    /// `(label, resolved directory)` pairs in configured order.
    pub fn category_dirs(&self, output_dir: &Path) -> Vec<(String, PathBuf)> {
        self.categories
            .iter()
            .map(|c| (c.label.clone(), self.resolve(output_dir, &c.dir)))
            .collect()
    }

    pub fn validate(&self) -> CoreResult<()> {
        positive("noise.time_bin_width_secs", self.time_bin_width_secs)?;
        positive("noise.receiver_point_gap", self.receiver_point_gap)?;
        if !self.input_delimiter.is_ascii() {
            return Err(CoreError::Config(format!(
                "noise.input_delimiter must be a single ASCII character, got {:?}",
                self.input_delimiter
            )));
        }
        if self.categories.is_empty() {
            return Err(CoreError::Config("noise.categories must not be empty".into()));
        }
        for (i, c) in self.categories.iter().enumerate() {
            if c.label.is_empty() {
                return Err(CoreError::Config(format!("noise.categories[{i}] has an empty label")));
            }
            if self.categories[..i].iter().any(|prev| prev.label == c.label) {
                return Err(CoreError::Config(format!("duplicate noise category {:?}", c.label)));
            }
        }
        Ok(())
    }
}

// ── Defaults ──────────────────────────────────────────────────────────────────

fn default_bin_width() -> f64 { 3_600.0 }
fn default_cell_size() -> f64 { 50.0 }
fn default_smoothing_radius() -> f64 { 30.0 }
fn default_receiver_point_gap() -> f64 { 250.0 }
fn default_input_delimiter() -> char { ';' }
fn default_true() -> bool { true }
fn default_immission_label() -> String { "immission".into() }

fn default_receiver_points_file() -> PathBuf {
    PathBuf::from("receiverPoints").join("receiverPoints.csv")
}

fn default_categories() -> Vec<CategoryConfig> {
    vec![
        CategoryConfig::new("immission", "immissions"),
        CategoryConfig::new("consideredAgentUnits", "consideredAgentUnits"),
        CategoryConfig::new("damages_receiverPoint", "damages_receiverPoint"),
    ]
}
