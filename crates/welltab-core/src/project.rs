//! Project parameters: reservoir and PVT scalars, fitting results and
//! plotting data.
//!
//! A project is two files. `name.json` holds the parameters and fitting
//! results; `name_chart.json` next to it holds the plotting data, so that
//! redrawing curves never rewrites the parameter file.

use crate::error::{Result, WellTabError};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReservoirParameters {
    pub porosity: f64,
    /// m
    pub thickness: f64,
    /// m
    pub well_radius: f64,
    /// m³/d
    pub production_rate: f64,
    /// Keys written by other tools, kept as read.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for ReservoirParameters {
    fn default() -> Self {
        ReservoirParameters {
            porosity: 0.05,
            thickness: 20.0,
            well_radius: 0.1,
            production_rate: 50.0,
            extra: Map::new(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PvtParameters {
    /// mPa·s
    pub viscosity: f64,
    pub volume_factor: f64,
    /// 1/MPa
    pub compressibility: f64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for PvtParameters {
    fn default() -> Self {
        PvtParameters {
            viscosity: 0.5,
            volume_factor: 1.05,
            compressibility: 5e-4,
            extra: Map::new(),
        }
    }
}

/// On-disk layout of the parameter file.
#[derive(Debug, Default, Serialize, Deserialize)]
struct ProjectFile {
    #[serde(default)]
    reservoir: ReservoirParameters,
    #[serde(default)]
    pvt: PvtParameters,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    fitting: Value,
    /// Older files kept plotting data inline; read it but never write it back.
    #[serde(default, skip_serializing)]
    plotting_data: Option<Vec<Value>>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct ChartFile {
    #[serde(default)]
    plotting_data: Vec<Value>,
}

/// The open project. Owned by the caller; there is no global instance.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ProjectContext {
    path: Option<PathBuf>,
    pub reservoir: ReservoirParameters,
    pub pvt: PvtParameters,
    /// Fitting results as written by the analysis tools; `Null` when absent.
    pub fitting: Value,
    pub plotting_data: Vec<Value>,
    /// Top-level keys this type does not model; written back on save.
    pub extra: Map<String, Value>,
}

/// Path of the plotting-data file that belongs to `project`.
pub fn chart_path_for(project: &Path) -> PathBuf {
    let stem = project
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    project.with_file_name(format!("{}_chart.json", stem))
}

impl ProjectContext {
    /// A closed project with default parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a project file and its plotting data, if present.
    pub fn open(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let file: ProjectFile = serde_json::from_str(&text)?;

        let chart = chart_path_for(path);
        let plotting_data = if chart.exists() {
            let chart_file: ChartFile = serde_json::from_str(&std::fs::read_to_string(&chart)?)?;
            chart_file.plotting_data
        } else {
            file.plotting_data.unwrap_or_default()
        };

        tracing::info!(
            path = %path.display(),
            curves = plotting_data.len(),
            "Opened project"
        );
        Ok(ProjectContext {
            path: Some(path.to_path_buf()),
            reservoir: file.reservoir,
            pvt: file.pvt,
            fitting: file.fitting,
            plotting_data,
            extra: file.extra,
        })
    }

    pub fn is_open(&self) -> bool {
        self.path.is_some()
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn chart_path(&self) -> Option<PathBuf> {
        self.path.as_deref().map(chart_path_for)
    }

    /// Write the parameter file. Plotting data is not included.
    pub fn save(&self) -> Result<()> {
        let path = self.path.as_deref().ok_or(WellTabError::NoProjectLoaded)?;
        let file = ProjectFile {
            reservoir: self.reservoir.clone(),
            pvt: self.pvt.clone(),
            fitting: self.fitting.clone(),
            plotting_data: None,
            extra: self.extra.clone(),
        };
        std::fs::write(path, serde_json::to_string_pretty(&file)?)?;
        tracing::info!(path = %path.display(), "Saved project");
        Ok(())
    }

    /// Save under `path`, which becomes the project path.
    pub fn save_as(&mut self, path: &Path) -> Result<()> {
        self.path = Some(path.to_path_buf());
        self.save()
    }

    /// Write the plotting data to the chart file.
    pub fn save_plotting_data(&self) -> Result<()> {
        let chart = self.chart_path().ok_or(WellTabError::NoProjectLoaded)?;
        let file = ChartFile {
            plotting_data: self.plotting_data.clone(),
        };
        std::fs::write(&chart, serde_json::to_string_pretty(&file)?)?;
        tracing::debug!(path = %chart.display(), curves = self.plotting_data.len(), "Saved plotting data");
        Ok(())
    }

    /// Forget the project and go back to default parameters.
    pub fn close(&mut self) {
        *self = Self::default();
    }
}
