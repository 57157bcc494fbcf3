//! Price search over a markup sweep.

pub mod grid;
pub mod selection;

use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::config::SearchSection;
use crate::estimator::AcceptanceEstimator;
use crate::types::{OrderContext, Prediction, PriceCandidate, PricingError, Recommendation};
use grid::markup_grid;
use selection::{select_optimal, select_safe};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Sweep configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchConfig {
    pub min_markup: f64,
    pub max_markup: f64,
    /// Number of evenly spaced markups, bounds included.
    pub steps: usize,
    /// Minimum acceptance probability (inclusive) for the safe recommendation.
    pub safe_probability_floor: f64,
    /// Wall-clock budget for the whole sweep.
    pub deadline: Option<Duration>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            min_markup: 0.0,
            max_markup: 0.5,
            steps: 50,
            safe_probability_floor: 0.7,
            deadline: None,
        }
    }
}

impl From<&SearchSection> for SearchConfig {
    fn from(section: &SearchSection) -> Self {
        Self {
            min_markup: section.min_markup,
            max_markup: section.max_markup,
            steps: section.steps,
            safe_probability_floor: section.safe_probability_floor,
            deadline: section.deadline_ms.map(Duration::from_millis),
        }
    }
}

impl SearchConfig {
    /// Check the parts of the config not covered by grid construction.
    pub fn validate(&self) -> Result<(), PricingError> {
        if !(0.0..=1.0).contains(&self.safe_probability_floor) {
            return Err(PricingError::InvalidConfiguration(format!(
                "safe probability floor must be within [0, 1], got {}",
                self.safe_probability_floor
            )));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

/// Sweeps bid prices for one order and recommends an optimal and a safe bid.
pub struct PriceSearch<E> {
    estimator: E,
    config: SearchConfig,
}

impl<E: AcceptanceEstimator> PriceSearch<E> {
    pub fn new(estimator: E, config: SearchConfig) -> Self {
        Self { estimator, config }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn estimator(&self) -> &E {
        &self.estimator
    }

    /// Run the sweep for `context` using the configured bounds.
    ///
    /// Steps:
    /// 1. Validate the context and build the markup grid.
    /// 2. Query the estimator once per markup, in ascending order.
    /// 3. Pick the revenue maximum, then the revenue maximum among
    ///    candidates at or above the probability floor (falling back to
    ///    the optimal candidate when none qualify).
    pub fn find_optimal_price(&self, context: &OrderContext) -> Result<Recommendation, PricingError> {
        context.validate()?;
        self.config.validate()?;
        let markups = markup_grid(self.config.min_markup, self.config.max_markup, self.config.steps)?;

        let missing = missing_features(context);
        if !missing.is_empty() {
            warn!(
                missing = ?missing,
                "Order is missing features, estimator defaults will be substituted"
            );
        }

        let started = Instant::now();
        let base_price = context.base_price;
        let mut candidates = Vec::with_capacity(markups.len());

        for markup in markups {
            if let Some(budget) = self.config.deadline {
                let elapsed = started.elapsed();
                if elapsed > budget {
                    warn!(
                        evaluated = candidates.len(),
                        budget_ms = budget.as_millis() as u64,
                        "Price search deadline exceeded"
                    );
                    return Err(PricingError::DeadlineExceeded {
                        budget_ms: budget.as_millis(),
                        elapsed_ms: elapsed.as_millis(),
                    });
                }
            }

            let price = base_price * (1.0 + markup);
            let prediction = self.estimator.probability_of_acceptance(context, price)?;
            let (probability, degraded) = sanitize_probability(prediction.probability, prediction.degraded);
            if degraded {
                warn!(
                    price = format!("{price:.2}"),
                    markup = format!("{:.1}%", markup * 100.0),
                    "Degraded prediction for candidate"
                );
            }

            candidates.push(PriceCandidate {
                markup,
                price,
                probability,
                expected_revenue: price * probability,
                degraded,
            });
        }

        // Grid is never empty, so both selections over it succeed.
        let optimal_idx = select_optimal(&candidates).ok_or_else(|| {
            PricingError::InvalidConfiguration("sweep produced no candidates".into())
        })?;
        let optimal = candidates[optimal_idx];

        let (safe, safe_meets_floor) = match select_safe(&candidates, self.config.safe_probability_floor) {
            Some(idx) => (candidates[idx], true),
            None => {
                debug!(
                    floor = self.config.safe_probability_floor,
                    "No candidate meets the probability floor, safe falls back to optimal"
                );
                (optimal, false)
            }
        };

        let degraded_candidates = candidates.iter().filter(|c| c.degraded).count();

        info!(
            model = self.estimator.model_name(),
            base_price = format!("{base_price:.2}"),
            candidates = candidates.len(),
            optimal_price = format!("{:.2}", optimal.price),
            optimal_probability = format!("{:.1}%", optimal.probability * 100.0),
            expected_revenue = format!("{:.2}", optimal.expected_revenue),
            safe_price = format!("{:.2}", safe.price),
            safe_meets_floor,
            degraded = degraded_candidates,
            elapsed_us = started.elapsed().as_micros() as u64,
            "Price search complete"
        );

        Ok(Recommendation {
            base_price,
            optimal,
            safe,
            safe_meets_floor,
            degraded_candidates,
            candidates,
        })
    }
}

/// Clamp a probability into [0, 1]; a non-finite value becomes the degraded
/// neutral probability.
fn sanitize_probability(probability: f64, degraded: bool) -> (f64, bool) {
    if probability.is_finite() {
        (probability.clamp(0.0, 1.0), degraded)
    } else {
        (Prediction::NEUTRAL, true)
    }
}

/// Names of context features the estimator will have to default.
fn missing_features(context: &OrderContext) -> Vec<&'static str> {
    let mut missing = Vec::new();
    if context.driver_rating.is_none() {
        missing.push("driver_rating");
    }
    if context.distance_km.is_none() {
        missing.push("distance_km");
    }
    if context.order_hour.is_none() {
        missing.push("order_hour");
    }
    missing
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
