//! Configuration loading from TOML.
//!
//! Reads `config.toml` and deserializes into strongly-typed structs.
//! Every section has built-in defaults so a partial file (or none at all)
//! still yields a usable configuration.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::info;

use crate::types::FeatureDefaults;

/// Top-level application configuration.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub paths: PathsConfig,
    pub data: DataConfig,
    pub training: TrainingConfig,
    pub search: SearchSection,
    pub features: FeatureDefaults,
}

/// Where artifacts are read from and written to.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct PathsConfig {
    pub data: String,
    pub model: String,
    pub report: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            data: "data/train.csv".into(),
            model: "models/acceptance_model.json".into(),
            report: "output/recommendation_report.json".into(),
        }
    }
}

/// Synthetic dataset parameters.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DataConfig {
    pub rows: usize,
    pub seed: u64,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self { rows: 1000, seed: 42 }
    }
}

/// Classifier training parameters.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct TrainingConfig {
    /// Share of rows held out for evaluation.
    pub test_fraction: f64,
    pub seed: u64,
    pub max_iterations: u64,
    /// L2 regularisation strength.
    pub alpha: f64,
    /// Bid prices outside [q, 1-q] quantiles are dropped before training.
    pub trim_quantile: f64,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            test_fraction: 0.2,
            seed: 42,
            max_iterations: 200,
            alpha: 0.1,
            trim_quantile: 0.01,
        }
    }
}

/// Price sweep parameters as written in the config file.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SearchSection {
    pub min_markup: f64,
    pub max_markup: f64,
    pub steps: usize,
    pub safe_probability_floor: f64,
    /// Optional wall-clock budget for one search, in milliseconds.
    pub deadline_ms: Option<u64>,
}

impl Default for SearchSection {
    fn default() -> Self {
        Self {
            min_markup: 0.0,
            max_markup: 0.5,
            steps: 50,
            safe_probability_floor: 0.7,
            deadline_ms: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path}"))?;
        let config: AppConfig = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {path}"))?;
        Ok(config)
    }

    /// Load configuration, falling back to defaults when the file is absent.
    /// A file that exists but fails to parse is still an error.
    pub fn load_or_default(path: &str) -> Result<Self> {
        if !Path::new(path).exists() {
            info!(path, "No config file found, using built-in defaults");
            return Ok(Self::default());
        }
        Self::load(path)
    }
}
