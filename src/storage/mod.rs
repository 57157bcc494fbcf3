//! Recommendation report persistence.
//!
//! Saves and loads search reports as pretty JSON. A report captures the
//! order, the chosen prices and how they compare to the base price.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

use crate::types::{OrderContext, Recommendation};

/// Default report file path.
const DEFAULT_REPORT_FILE: &str = "output/recommendation_report.json";

/// Headline prices of a recommendation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSummary {
    pub optimal_price: f64,
    pub optimal_probability: f64,
    pub expected_revenue: f64,
    pub safe_price: f64,
    pub safe_probability: f64,
    pub safe_meets_floor: bool,
}

/// Comparison against simply accepting the base price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceAnalysis {
    /// Optimal price over base price, in percent.
    pub bid_increase_percent: f64,
    /// Optimal expected revenue over base price, in percent.
    pub revenue_improvement_percent: f64,
}

/// A persisted search result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationReport {
    pub id: String,
    pub generated_at: DateTime<Utc>,
    pub model: String,
    pub order: OrderContext,
    pub recommendation: PriceSummary,
    pub analysis: PriceAnalysis,
    pub candidates_evaluated: usize,
    pub degraded_candidates: usize,
}

impl RecommendationReport {
    pub fn from_recommendation(order: &OrderContext, model: &str, rec: &Recommendation) -> Self {
        let base = rec.base_price;
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            generated_at: Utc::now(),
            model: model.to_string(),
            order: order.clone(),
            recommendation: PriceSummary {
                optimal_price: rec.optimal.price,
                optimal_probability: rec.optimal.probability,
                expected_revenue: rec.optimal.expected_revenue,
                safe_price: rec.safe.price,
                safe_probability: rec.safe.probability,
                safe_meets_floor: rec.safe_meets_floor,
            },
            analysis: PriceAnalysis {
                bid_increase_percent: (rec.optimal.price - base) / base * 100.0,
                revenue_improvement_percent: (rec.optimal.expected_revenue - base) / base * 100.0,
            },
            candidates_evaluated: rec.candidates.len(),
            degraded_candidates: rec.degraded_candidates,
        }
    }
}

/// Save a report to a JSON file, creating parent directories.
pub fn save_report(report: &RecommendationReport, path: Option<&str>) -> Result<()> {
    let path = path.unwrap_or(DEFAULT_REPORT_FILE);
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory for {path}"))?;
        }
    }

    let json = serde_json::to_string_pretty(report).context("Failed to serialise report")?;
    std::fs::write(path, &json).with_context(|| format!("Failed to write report to {path}"))?;

    info!(path, id = %report.id, "Report saved");
    Ok(())
}

/// Load a report from a JSON file.
/// Returns None if the file doesn't exist.
pub fn load_report(path: Option<&str>) -> Result<Option<RecommendationReport>> {
    let path = path.unwrap_or(DEFAULT_REPORT_FILE);

    if !Path::new(path).exists() {
        debug!(path, "No saved report found");
        return Ok(None);
    }

    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read report from {path}"))?;
    let report: RecommendationReport = serde_json::from_str(&json)
        .with_context(|| format!("Failed to parse report from {path}"))?;

    debug!(path, id = %report.id, "Report loaded");
    Ok(Some(report))
}

/// Delete the report file if present.
pub fn delete_report(path: Option<&str>) -> Result<()> {
    let path = path.unwrap_or(DEFAULT_REPORT_FILE);
    if Path::new(path).exists() {
        std::fs::remove_file(path)
            .with_context(|| format!("Failed to delete report {path}"))?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
