//! Turning raw order records into model-ready training rows.
//!
//! Derives missing distance values, drops incomplete rows, and trims bid
//! price outliers by quantile.

use std::fmt;
use tracing::{debug, info, warn};

use super::OrderRecord;
use crate::types::FeatureVector;

/// One cleaned example: resolved features plus the acceptance label.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainingRow {
    pub features: FeatureVector,
    pub accepted: bool,
}

/// What cleaning did to the dataset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CleaningReport {
    pub rows_in: usize,
    pub rows_out: usize,
    /// Missing values per feature column, before derivation.
    pub missing_driver_rating: usize,
    pub missing_distance: usize,
    pub missing_order_hour: usize,
    /// Rows whose distance came from `distance_in_meters`.
    pub distance_derived: usize,
    /// Rows dropped for a missing or invalid feature.
    pub dropped_incomplete: usize,
    /// Rows dropped as bid price outliers.
    pub dropped_outliers: usize,
}

impl fmt::Display for CleaningReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Rows in:  {}", self.rows_in)?;
        writeln!(
            f,
            "Missing:  driver_rating={} distance={} order_hour={}",
            self.missing_driver_rating, self.missing_distance, self.missing_order_hour
        )?;
        writeln!(f, "Derived distance from meters: {}", self.distance_derived)?;
        writeln!(f, "Dropped incomplete: {}", self.dropped_incomplete)?;
        writeln!(f, "Dropped outliers:   {}", self.dropped_outliers)?;
        write!(f, "Rows out: {}", self.rows_out)
    }
}

/// Clean `records` into training rows.
///
/// `trim_quantile` = q drops rows whose bid price lies outside the
/// [q, 1 - q] quantiles; 0 disables trimming.
pub fn prepare_training_rows(records: &[OrderRecord], trim_quantile: f64) -> (Vec<TrainingRow>, CleaningReport) {
    let mut report = CleaningReport {
        rows_in: records.len(),
        ..Default::default()
    };

    let mut rows = Vec::with_capacity(records.len());
    for record in records {
        if record.driver_rating.is_none() {
            report.missing_driver_rating += 1;
        }
        if record.distance_km.is_none() {
            report.missing_distance += 1;
        }
        if record.order_hour.is_none() {
            report.missing_order_hour += 1;
        }

        let distance_km = match (record.distance_km, record.distance_in_meters) {
            (Some(km), _) => Some(km),
            (None, Some(m)) => {
                report.distance_derived += 1;
                Some(m / 1000.0)
            }
            (None, None) => None,
        };

        match to_row(record, distance_km) {
            Some(row) => rows.push(row),
            None => {
                debug!(order_id = record.order_id, "Dropping incomplete order");
                report.dropped_incomplete += 1;
            }
        }
    }

    if trim_quantile > 0.0 && !rows.is_empty() {
        let mut bids: Vec<f64> = rows.iter().map(|r| r.features.price_bid_local).collect();
        bids.sort_by(|a, b| a.total_cmp(b));
        let lo = quantile(&bids, trim_quantile);
        let hi = quantile(&bids, 1.0 - trim_quantile);
        let before = rows.len();
        rows.retain(|r| (lo..=hi).contains(&r.features.price_bid_local));
        report.dropped_outliers = before - rows.len();
        debug!(lo, hi, dropped = report.dropped_outliers, "Bid price outliers trimmed");
    }

    report.rows_out = rows.len();
    if report.dropped_incomplete > 0 {
        warn!(dropped = report.dropped_incomplete, "Orders dropped for missing features");
    }
    info!(rows_in = report.rows_in, rows_out = report.rows_out, "Dataset cleaned");

    (rows, report)
}

fn to_row(record: &OrderRecord, distance_km: Option<f64>) -> Option<TrainingRow> {
    let rating = record.driver_rating?;
    let distance_km = distance_km?;
    let hour = record.order_hour?;
    if record.price_start_local <= 0.0 || hour > 23 {
        return None;
    }

    let features = FeatureVector::new(
        record.price_start_local,
        record.price_bid_local,
        rating,
        distance_km,
        hour,
    );
    if !features.to_array().iter().all(|v| v.is_finite()) {
        return None;
    }

    Some(TrainingRow {
        features,
        accepted: record.accepted(),
    })
}

/// Linear-interpolated quantile of already sorted values.
pub fn quantile(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    let q = q.clamp(0.0, 1.0);
    let pos = q * (sorted.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    let frac = pos - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * frac
}
