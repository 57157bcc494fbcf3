//! Acceptance statistics for an order dataset, overall and per band.

use std::fmt;

use super::OrderRecord;

/// Acceptance statistics for one slice of the dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct AcceptanceBand {
    pub label: String,
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
    pub accepted: usize,
}

impl AcceptanceBand {
    pub fn acceptance_rate(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.accepted as f64 / self.count as f64
        }
    }
}

/// High-level description of an order dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetSummary {
    pub rows: usize,
    pub accepted: usize,
    pub mean_start_price: f64,
    pub mean_bid_price: f64,
    pub mean_markup: f64,
    pub by_markup: Vec<AcceptanceBand>,
    pub by_rating: Vec<AcceptanceBand>,
}

impl DatasetSummary {
    pub fn from_records(records: &[OrderRecord]) -> Self {
        let markup_edges = [0.0, 0.1, 0.2, 0.3, 0.4, 0.5, f64::INFINITY];
        let rating_edges = [0.0, 4.0, 4.5, 4.8, f64::INFINITY];

        Self {
            rows: records.len(),
            accepted: records.iter().filter(|r| r.accepted()).count(),
            mean_start_price: mean_of(records, |r| r.price_start_local),
            mean_bid_price: mean_of(records, |r| r.price_bid_local),
            mean_markup: mean_of(records, |r| r.markup()),
            by_markup: bands(records, &markup_edges, |r| Some(r.markup()), |lo, hi| {
                if hi.is_finite() {
                    format!("+{:.0}%..+{:.0}%", lo * 100.0, hi * 100.0)
                } else {
                    format!("+{:.0}%+", lo * 100.0)
                }
            }),
            by_rating: bands(records, &rating_edges, |r| r.driver_rating, |lo, hi| {
                if hi.is_finite() {
                    format!("{lo:.1}..{hi:.1}")
                } else {
                    format!("{lo:.1}+")
                }
            }),
        }
    }

    pub fn acceptance_rate(&self) -> f64 {
        if self.rows == 0 {
            0.0
        } else {
            self.accepted as f64 / self.rows as f64
        }
    }
}

fn mean_of(records: &[OrderRecord], value: impl Fn(&OrderRecord) -> f64) -> f64 {
    if records.is_empty() {
        return 0.0;
    }
    records.iter().map(value).sum::<f64>() / records.len() as f64
}

/// Bucket records by `value` into [edge_i, edge_i+1) bands; records without a
/// value are skipped. Markups below the first edge land in the first band.
fn bands(
    records: &[OrderRecord],
    edges: &[f64],
    value: impl Fn(&OrderRecord) -> Option<f64>,
    label: impl Fn(f64, f64) -> String,
) -> Vec<AcceptanceBand> {
    let mut out: Vec<AcceptanceBand> = edges
        .windows(2)
        .map(|w| AcceptanceBand {
            label: label(w[0], w[1]),
            lower: w[0],
            upper: w[1],
            count: 0,
            accepted: 0,
        })
        .collect();

    for record in records {
        let Some(v) = value(record) else { continue };
        let idx = out
            .iter()
            .position(|b| v < b.upper)
            .unwrap_or(out.len().saturating_sub(1));
        if let Some(band) = out.get_mut(idx) {
            band.count += 1;
            if record.accepted() {
                band.accepted += 1;
            }
        }
    }
    out
}

impl fmt::Display for DatasetSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Orders analysed: {}", self.rows)?;
        writeln!(
            f,
            "Accepted:        {} ({:.1}%)",
            self.accepted,
            self.acceptance_rate() * 100.0
        )?;
        writeln!(f, "Mean start price: {:.0}", self.mean_start_price)?;
        writeln!(f, "Mean bid price:   {:.0}", self.mean_bid_price)?;
        writeln!(f, "Mean markup:      {:.1}%", self.mean_markup * 100.0)?;
        writeln!(f, "\nAcceptance by markup:")?;
        for b in &self.by_markup {
            writeln!(f, "  {:<12} {:>5} orders  {:>5.1}%", b.label, b.count, b.acceptance_rate() * 100.0)?;
        }
        writeln!(f, "\nAcceptance by driver rating:")?;
        for b in &self.by_rating {
            writeln!(f, "  {:<12} {:>5} orders  {:>5.1}%", b.label, b.count, b.acceptance_rate() * 100.0)?;
        }
        Ok(())
    }
}
