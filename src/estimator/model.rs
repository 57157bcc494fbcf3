//! Trained acceptance model and its on-disk artifact.
//!
//! The artifact is a self-contained JSON document: feature scaler, oriented
//! logistic weights and training metadata. Scoring needs nothing beyond
//! this file.

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use linfa_preprocessing::linear_scaling::LinearScaler;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

use crate::types::{FEATURE_COUNT, FEATURE_NAMES};

/// Current artifact schema version.
pub const ARTIFACT_VERSION: u32 = 1;

// ---------------------------------------------------------------------------
// Feature scaling
// ---------------------------------------------------------------------------

/// Per-feature standardisation parameters, as learned by linfa's
/// standard `LinearScaler`: `(x - offset) * scale`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureScaler {
    /// Per-feature means.
    pub offsets: Vec<f64>,
    /// Inverse standard deviations; constant columns keep a unit scale.
    pub scales: Vec<f64>,
}

impl FeatureScaler {
    /// Copy the parameters out of a fitted linfa scaler.
    pub fn from_linear(scaler: &LinearScaler<f64>) -> Self {
        Self {
            offsets: scaler.offsets().to_vec(),
            scales: scaler.scales().to_vec(),
        }
    }

    pub fn transform(&self, row: &[f64]) -> Vec<f64> {
        row.iter()
            .zip(self.offsets.iter().zip(&self.scales))
            .map(|(v, (o, s))| (v - o) * s)
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Model
// ---------------------------------------------------------------------------

/// Logistic acceptance model, oriented so the output is P(accepted).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcceptanceModel {
    pub format_version: u32,
    pub trained_at: DateTime<Utc>,
    pub feature_names: Vec<String>,
    pub training_rows: usize,
    pub scaler: FeatureScaler,
    pub intercept: f64,
    /// One weight per standardised feature.
    pub coefficients: Vec<f64>,
}

impl AcceptanceModel {
    pub fn new(scaler: FeatureScaler, intercept: f64, coefficients: Vec<f64>, training_rows: usize) -> Self {
        Self {
            format_version: ARTIFACT_VERSION,
            trained_at: Utc::now(),
            feature_names: FEATURE_NAMES.iter().map(|s| s.to_string()).collect(),
            training_rows,
            scaler,
            intercept,
            coefficients,
        }
    }

    /// Score one raw feature row.
    ///
    /// Fails on a row of the wrong width, non-finite inputs, or a
    /// non-finite result.
    pub fn score(&self, row: &[f64]) -> Result<f64> {
        if row.len() != self.coefficients.len() {
            bail!(
                "expected {} features, got {}",
                self.coefficients.len(),
                row.len()
            );
        }
        if let Some((idx, v)) = row.iter().enumerate().find(|(_, v)| !v.is_finite()) {
            let name = self.feature_names.get(idx).map(String::as_str).unwrap_or("?");
            bail!("feature {name} is not finite ({v})");
        }

        let scaled = self.scaler.transform(row);
        let z = self.intercept
            + scaled
                .iter()
                .zip(&self.coefficients)
                .map(|(x, w)| x * w)
                .sum::<f64>();
        let p = sigmoid(z);
        if !p.is_finite() {
            bail!("model produced a non-finite probability");
        }
        Ok(p)
    }

    /// Relative weight of each feature: |coefficient| normalised to sum 1.
    pub fn feature_importance(&self) -> Vec<(String, f64)> {
        let total: f64 = self.coefficients.iter().map(|w| w.abs()).sum();
        let mut importance: Vec<(String, f64)> = self
            .feature_names
            .iter()
            .zip(&self.coefficients)
            .map(|(name, w)| {
                let share = if total > 0.0 { w.abs() / total } else { 0.0 };
                (name.clone(), share)
            })
            .collect();
        importance.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        importance
    }

    /// Check internal consistency after deserialisation.
    pub fn validate(&self) -> Result<()> {
        if self.format_version != ARTIFACT_VERSION {
            bail!(
                "unsupported artifact version {} (expected {ARTIFACT_VERSION})",
                self.format_version
            );
        }
        if self.feature_names != FEATURE_NAMES {
            bail!("artifact features {:?} do not match {:?}", self.feature_names, FEATURE_NAMES);
        }
        if self.coefficients.len() != FEATURE_COUNT
            || self.scaler.offsets.len() != FEATURE_COUNT
            || self.scaler.scales.len() != FEATURE_COUNT
        {
            bail!("artifact weight dimensions are inconsistent");
        }
        Ok(())
    }

    /// Write the artifact as pretty JSON, creating parent directories.
    pub fn save(&self, path: &str) -> Result<()> {
        if let Some(parent) = Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create directory for {path}"))?;
            }
        }
        let json = serde_json::to_string_pretty(self).context("Failed to serialise model")?;
        std::fs::write(path, json).with_context(|| format!("Failed to write model to {path}"))?;

        let size = std::fs::metadata(path).map(|m| m.len()).unwrap_or(0);
        info!(path, bytes = size, "Model saved");
        Ok(())
    }

    /// Read and validate an artifact.
    pub fn load(path: &str) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read model from {path}"))?;
        let model: AcceptanceModel = serde_json::from_str(&json)
            .with_context(|| format!("Failed to parse model from {path}"))?;
        model
            .validate()
            .with_context(|| format!("Invalid model artifact {path}"))?;

        debug!(
            path,
            trained_at = %model.trained_at,
            rows = model.training_rows,
            "Model loaded"
        );
        Ok(model)
    }
}

/// Numerically stable logistic function.
pub fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
