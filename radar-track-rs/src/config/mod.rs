//! Configuration types for the detection analysis tools.
//!
//! Everything lives in one YAML file; missing keys fall back to defaults so a
//! config only has to list its scenarios.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::criteria::ALL_BEAMS;

/// Errors raised while loading or resolving configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to access config '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("unknown scenario '{name}' (available: {available})")]
    UnknownScenario { name: String, available: String },
}

/// Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Recording campaign a scenario is taken from.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Dataset {
    #[default]
    New,
    Old,
}

/// Root folders for input recordings and generated output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Folder holding one sub-folder per dataset
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Where plots and exports go; `None` disables file output for plots
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            output_dir: None,
        }
    }
}

/// Sub-folder names of `data_dir` for each dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetsConfig {
    #[serde(default = "default_new_dataset")]
    pub new: String,

    #[serde(default = "default_old_dataset")]
    pub old: String,
}

fn default_new_dataset() -> String {
    "new".to_string()
}

fn default_old_dataset() -> String {
    "old".to_string()
}

impl Default for DatasetsConfig {
    fn default() -> Self {
        Self {
            new: default_new_dataset(),
            old: default_old_dataset(),
        }
    }
}

impl DatasetsConfig {
    pub fn folder(&self, dataset: Dataset) -> &str {
        match dataset {
            Dataset::New => &self.new,
            Dataset::Old => &self.old,
        }
    }
}

/// EGO vehicle geometry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeometryConfig {
    /// Width of the EGO car in meters
    #[serde(default = "default_ego_car_width")]
    pub ego_car_width: f64,
}

fn default_ego_car_width() -> f64 {
    1.88
}

impl Default for GeometryConfig {
    fn default() -> Self {
        Self {
            ego_car_width: default_ego_car_width(),
        }
    }
}

/// Default selection applied by the command line tools.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectionConfig {
    /// Beams to keep when none are given on the command line
    #[serde(default = "default_beams")]
    pub beams: Vec<u8>,
}

fn default_beams() -> Vec<u8> {
    ALL_BEAMS.to_vec()
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            beams: default_beams(),
        }
    }
}

/// File names of one recorded scenario; an empty name means not recorded.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScenarioFiles {
    #[serde(default)]
    pub left_radar: String,

    #[serde(default)]
    pub right_radar: String,

    #[serde(default)]
    pub left_dgps: String,

    #[serde(default)]
    pub right_dgps: String,

    #[serde(default)]
    pub both_dgps: String,

    /// Longitudinal offset (m) added to DGPS target positions
    #[serde(default)]
    pub dgps_x_compensation: f64,
}

/// Absolute file locations for one scenario.
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioPaths {
    pub name: String,
    pub left_radar: Option<PathBuf>,
    pub right_radar: Option<PathBuf>,
    pub left_dgps: Option<PathBuf>,
    pub right_dgps: Option<PathBuf>,
    pub both_dgps: Option<PathBuf>,
    pub dgps_x_compensation: f64,
    pub output_dir: Option<PathBuf>,
}

impl ScenarioPaths {
    /// DGPS file to pair with the radars: the shared one first, then left, then right.
    pub fn dgps(&self) -> Option<&Path> {
        self.both_dgps
            .as_deref()
            .or(self.left_dgps.as_deref())
            .or(self.right_dgps.as_deref())
    }

    /// Plot file name inside the output folder.
    pub fn plot_path(&self) -> Option<PathBuf> {
        self.output_dir
            .as_ref()
            .map(|dir| dir.join(format!("_tmp{}.png", self.name)))
    }
}

/// Main analysis configuration combining all sub-configs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisConfig {
    #[serde(default)]
    pub paths: PathsConfig,

    #[serde(default)]
    pub datasets: DatasetsConfig,

    #[serde(default)]
    pub geometry: GeometryConfig,

    #[serde(default)]
    pub selection: SelectionConfig,

    #[serde(default)]
    pub scenarios: BTreeMap<String, ScenarioFiles>,
}

impl AnalysisConfig {
    /// Load configuration from a YAML file.
    pub fn from_yaml<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::from_yaml_str(&content)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Save configuration to a YAML file.
    pub fn to_yaml<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            source: e,
        })
    }

    pub fn scenario_names(&self) -> impl Iterator<Item = &str> {
        self.scenarios.keys().map(String::as_str)
    }

    /// Resolve a scenario's file names against the dataset folder.
    pub fn resolve_scenario(&self, name: &str, dataset: Dataset) -> Result<ScenarioPaths> {
        let files = self
            .scenarios
            .get(name)
            .ok_or_else(|| ConfigError::UnknownScenario {
                name: name.to_string(),
                available: self.scenario_names().collect::<Vec<_>>().join(", "),
            })?;

        let base = self.paths.data_dir.join(self.datasets.folder(dataset));
        let resolve = |file: &str| {
            let file = file.trim();
            (!file.is_empty()).then(|| base.join(file))
        };

        Ok(ScenarioPaths {
            name: name.to_string(),
            left_radar: resolve(&files.left_radar),
            right_radar: resolve(&files.right_radar),
            left_dgps: resolve(&files.left_dgps),
            right_dgps: resolve(&files.right_dgps),
            both_dgps: resolve(&files.both_dgps),
            dgps_x_compensation: files.dgps_x_compensation,
            output_dir: self.paths.output_dir.clone(),
        })
    }
}
