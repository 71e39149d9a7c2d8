// src/config.rs

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use crate::error::Result;

// --- Enums ---

/// What the distance channel of the site block measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DistanceMetric {
    /// Length of the fractional displacement mapped through the lattice (Angstroms).
    Cartesian,
    /// Length of the raw fractional displacement.
    Fractional,
}

// --- Calibration ---

/// Per-feature scale constants for normalization. Each global feature is
/// divided by its constant; the displacement channels are shifted by
/// `direction_offset` and then divided by `dir`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Calibration {
    pub atom: f64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub alpha: f64,
    pub beta: f64,
    pub gamma: f64,
    pub sg: f64,
    /// Distance channel scale. No calibrated default exists.
    #[serde(default)]
    pub length: Option<f64>,
    pub dir: f64,
    pub direction_offset: f64,
}

impl Default for Calibration {
    fn default() -> Self {
        Self {
            atom: 83.0,
            x: 0.979,
            y: 0.9813,
            z: 0.9782,
            a: 17.805,
            b: 20.8119,
            c: 29.077,
            alpha: 103.57,
            beta: 129.954,
            gamma: 120.0,
            sg: 227.0,
            length: None,
            dir: 0.78733,
            direction_offset: 0.9999933,
        }
    }
}

impl Calibration {
    pub fn with_length(mut self, length: f64) -> Self {
        self.length = Some(length);
        self
    }
}

// --- Main Config Struct ---

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub calibration: Calibration,

    #[serde(default = "default_metric")]
    pub distance_metric: DistanceMetric,

    /// Symmetry tolerance (Angstroms) for space-group detection of loaded files.
    #[serde(default = "default_symprec")]
    pub symprec: f64,
}

fn default_metric() -> DistanceMetric {
    DistanceMetric::Cartesian
}

fn default_symprec() -> f64 {
    1e-2
}

impl Default for Config {
    fn default() -> Self {
        Self {
            calibration: Calibration::default(),
            distance_metric: default_metric(),
            symprec: default_symprec(),
        }
    }
}

impl Config {
    /// Loads config from standard OS location (e.g., ~/.config/crysgraph/settings.json)
    pub fn load() -> (Self, String) {
        let path = Self::get_path();
        if path.exists() {
            match Self::load_from(&path) {
                Ok(cfg) => (cfg, format!("Config loaded from {:?}", path)),
                Err(e) => (Self::default(), format!("Error reading config: {}", e)),
            }
        } else {
            (
                Self::default(),
                "No config found. Using defaults.".to_string(),
            )
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }

    /// Saves config to standard OS location
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::get_path();
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    fn get_path() -> PathBuf {
        if let Some(proj) = ProjectDirs::from("org", "crysgraph", "crysgraph") {
            proj.config_dir().join("settings.json")
        } else {
            PathBuf::from("settings.json")
        }
    }
}
