//! Order dataset: record schema and CSV IO, plus synthesis, cleaning and summary.

pub mod cleaning;
pub mod summary;
pub mod synthetic;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// One historical bid as stored in the training CSV.
///
/// Feature columns are optional so that partially populated files load;
/// cleaning decides what to do with the gaps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRecord {
    pub order_id: u64,
    pub price_start_local: f64,
    pub price_bid_local: f64,
    #[serde(default)]
    pub driver_rating: Option<f64>,
    #[serde(default)]
    pub distance_km: Option<f64>,
    #[serde(default)]
    pub distance_in_meters: Option<f64>,
    #[serde(default)]
    pub order_hour: Option<u8>,
    /// 1 when the driver accepted the bid.
    pub is_done: u8,
}

impl OrderRecord {
    pub fn accepted(&self) -> bool {
        self.is_done != 0
    }

    /// Bid markup over the start price (0.1 = 10%).
    pub fn markup(&self) -> f64 {
        self.price_bid_local / self.price_start_local - 1.0
    }
}

/// Write records as CSV with a header row, creating parent directories.
pub fn write_csv(path: &str, records: &[OrderRecord]) -> Result<()> {
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory for {path}"))?;
        }
    }

    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to open {path} for writing"))?;
    for record in records {
        writer
            .serialize(record)
            .with_context(|| format!("Failed to write order {}", record.order_id))?;
    }
    writer.flush().with_context(|| format!("Failed to flush {path}"))?;

    info!(path, rows = records.len(), "Dataset written");
    Ok(())
}

/// Read records from a CSV file with a header row.
pub fn read_csv(path: &str) -> Result<Vec<OrderRecord>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("Failed to open dataset {path}"))?;

    let mut records = Vec::new();
    for (line, row) in reader.deserialize().enumerate() {
        let record: OrderRecord =
            row.with_context(|| format!("Failed to parse {path} row {}", line + 1))?;
        records.push(record);
    }

    info!(path, rows = records.len(), "Dataset loaded");
    Ok(records)
}
