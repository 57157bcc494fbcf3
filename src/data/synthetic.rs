//! Synthetic order generation.
//!
//! Draws seeded random orders whose acceptance follows a logistic response:
//! higher markups are accepted less often, better-rated drivers and rush
//! hours more often, long trips slightly less.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::info;

use super::OrderRecord;
use crate::estimator::model::sigmoid;

/// Generator parameters.
#[derive(Debug, Clone)]
pub struct SyntheticConfig {
    pub rows: usize,
    pub seed: u64,
    /// Largest markup a synthetic bid carries over its start price.
    pub max_markup: f64,
    /// Logit of acceptance at zero markup for an average order.
    pub base_logit: f64,
    /// Logit change per unit of markup (negative: dearer bids lose).
    pub markup_slope: f64,
    /// Logit change per rating point above 4.25.
    pub rating_slope: f64,
    /// Logit change per km above 10 km.
    pub distance_slope: f64,
    /// Logit bonus during morning and evening rush hours.
    pub rush_hour_bonus: f64,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            rows: 1000,
            seed: 42,
            max_markup: 0.6,
            base_logit: 2.2,
            markup_slope: -6.0,
            rating_slope: 0.8,
            distance_slope: -0.04,
            rush_hour_bonus: 0.4,
        }
    }
}

impl SyntheticConfig {
    /// Probability the generator uses to draw acceptance for one order.
    pub fn acceptance_probability(&self, markup: f64, rating: f64, distance_km: f64, hour: u8) -> f64 {
        let rush = if is_rush_hour(hour) { self.rush_hour_bonus } else { 0.0 };
        let z = self.base_logit
            + self.markup_slope * markup
            + self.rating_slope * (rating - 4.25)
            + self.distance_slope * (distance_km - 10.0)
            + rush;
        sigmoid(z)
    }
}

/// 07:00–09:59 and 17:00–20:59.
pub fn is_rush_hour(hour: u8) -> bool {
    matches!(hour, 7..=9 | 17..=20)
}

/// Generate `config.rows` orders deterministically from `config.seed`.
pub fn generate_orders(config: &SyntheticConfig) -> Vec<OrderRecord> {
    let mut rng = StdRng::seed_from_u64(config.seed);

    let records: Vec<OrderRecord> = (0..config.rows)
        .map(|i| {
            let start = f64::from(rng.gen_range(200u32..500));
            let markup = rng.gen::<f64>() * config.max_markup;
            let bid = (start * (1.0 + markup)).round();
            let rating = rng.gen_range(3.5..=5.0);
            let distance_km = rng.gen_range(1.0..20.0);
            let hour: u8 = rng.gen_range(0..24);

            let p = config.acceptance_probability(bid / start - 1.0, rating, distance_km, hour);
            let accepted = rng.gen_bool(p);

            OrderRecord {
                order_id: i as u64 + 1,
                price_start_local: start,
                price_bid_local: bid,
                driver_rating: Some(rating),
                distance_km: Some(distance_km),
                distance_in_meters: Some((distance_km * 1000.0).round()),
                order_hour: Some(hour),
                is_done: u8::from(accepted),
            }
        })
        .collect();

    let accepted = records.iter().filter(|r| r.accepted()).count();
    info!(
        rows = records.len(),
        seed = config.seed,
        acceptance_rate = format!("{:.1}%", 100.0 * accepted as f64 / records.len().max(1) as f64),
        "Synthetic orders generated"
    );

    records
}
