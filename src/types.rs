//! Shared types for RIDEBID.
//!
//! The data model used by the estimator adapter, the price search and the
//! reporting layer. Kept free of model-technology details so that any
//! `AcceptanceEstimator` implementation can sit behind it.

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Order context
// ---------------------------------------------------------------------------

/// Features describing one pricing decision.
///
/// Optional fields are filled from [`FeatureDefaults`] by the estimator
/// adapter when absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderContext {
    /// Starting (base) price of the order in local currency units.
    pub base_price: f64,
    /// Driver rating, 1.0–5.0.
    pub driver_rating: Option<f64>,
    /// Trip distance in kilometres.
    pub distance_km: Option<f64>,
    /// Hour of day the order was placed (0–23).
    pub order_hour: Option<u8>,
}

impl OrderContext {
    /// Context with only a base price; every other feature falls back to defaults.
    pub fn new(base_price: f64) -> Self {
        Self {
            base_price,
            driver_rating: None,
            distance_km: None,
            order_hour: None,
        }
    }

    pub fn with_driver_rating(mut self, rating: f64) -> Self {
        self.driver_rating = Some(rating);
        self
    }

    pub fn with_distance_km(mut self, km: f64) -> Self {
        self.distance_km = Some(km);
        self
    }

    pub fn with_order_hour(mut self, hour: u8) -> Self {
        self.order_hour = Some(hour);
        self
    }

    /// Reject contexts the search cannot price.
    pub fn validate(&self) -> Result<(), PricingError> {
        if !self.base_price.is_finite() || self.base_price <= 0.0 {
            return Err(PricingError::InvalidConfiguration(format!(
                "base price must be positive, got {}",
                self.base_price
            )));
        }
        if let Some(rating) = self.driver_rating {
            if !rating.is_finite() {
                return Err(PricingError::InvalidConfiguration(format!(
                    "driver rating must be finite, got {rating}"
                )));
            }
        }
        if let Some(km) = self.distance_km {
            if !km.is_finite() || km < 0.0 {
                return Err(PricingError::InvalidConfiguration(format!(
                    "distance must be a non-negative number of km, got {km}"
                )));
            }
        }
        if let Some(hour) = self.order_hour {
            if hour > 23 {
                return Err(PricingError::InvalidConfiguration(format!(
                    "order hour must be 0-23, got {hour}"
                )));
            }
        }
        Ok(())
    }
}

impl fmt::Display for OrderContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "base {:.0}", self.base_price)?;
        if let Some(r) = self.driver_rating {
            write!(f, " | rating {r:.1}")?;
        }
        if let Some(d) = self.distance_km {
            write!(f, " | {d:.1} km")?;
        }
        if let Some(h) = self.order_hour {
            write!(f, " | {h:02}:00")?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Feature defaults
// ---------------------------------------------------------------------------

/// Substitutes for features absent from an [`OrderContext`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureDefaults {
    pub driver_rating: f64,
    pub distance_km: f64,
    pub order_hour: u8,
}

impl Default for FeatureDefaults {
    fn default() -> Self {
        Self {
            driver_rating: 4.5,
            distance_km: 5.0,
            order_hour: 12,
        }
    }
}

// ---------------------------------------------------------------------------
// Feature vector
// ---------------------------------------------------------------------------

/// Column order of the model input.
pub const FEATURE_NAMES: [&str; 6] = [
    "price_start_local",
    "price_bid_local",
    "price_ratio",
    "driver_rating",
    "distance_km",
    "order_hour",
];

/// Number of model input features.
pub const FEATURE_COUNT: usize = FEATURE_NAMES.len();

/// Fully resolved model input for one (order, bid price) pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub price_start_local: f64,
    pub price_bid_local: f64,
    pub price_ratio: f64,
    pub driver_rating: f64,
    pub distance_km: f64,
    pub order_hour: f64,
}

impl FeatureVector {
    /// Build a row from raw values, deriving the price ratio.
    pub fn new(
        price_start_local: f64,
        price_bid_local: f64,
        driver_rating: f64,
        distance_km: f64,
        order_hour: u8,
    ) -> Self {
        Self {
            price_start_local,
            price_bid_local,
            price_ratio: price_bid_local / price_start_local,
            driver_rating,
            distance_km,
            order_hour: f64::from(order_hour),
        }
    }

    /// Values in [`FEATURE_NAMES`] order.
    pub fn to_array(&self) -> [f64; FEATURE_COUNT] {
        [
            self.price_start_local,
            self.price_bid_local,
            self.price_ratio,
            self.driver_rating,
            self.distance_km,
            self.order_hour,
        ]
    }
}

// ---------------------------------------------------------------------------
// Prediction
// ---------------------------------------------------------------------------

/// One answer from an acceptance estimator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Probability that the bid is accepted (0.0–1.0).
    pub probability: f64,
    /// True when the estimator could not score the input and returned the
    /// neutral fallback instead.
    pub degraded: bool,
}

impl Prediction {
    /// Probability returned when the model cannot score an input.
    pub const NEUTRAL: f64 = 0.5;

    pub fn scored(probability: f64) -> Self {
        Self {
            probability,
            degraded: false,
        }
    }

    pub fn neutral() -> Self {
        Self {
            probability: Self::NEUTRAL,
            degraded: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Candidates & recommendation
// ---------------------------------------------------------------------------

/// A bid price evaluated during the sweep.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceCandidate {
    /// Fractional increase over the base price (0.1 = 10%).
    pub markup: f64,
    pub price: f64,
    pub probability: f64,
    /// `price * probability`
    pub expected_revenue: f64,
    /// Probability came from the neutral fallback, not the model.
    pub degraded: bool,
}

impl PriceCandidate {
    pub fn markup_percent(&self) -> f64 {
        self.markup * 100.0
    }
}

impl fmt::Display for PriceCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.0} (+{:.1}%) | p={:.1}% | E[rev]={:.0}",
            self.price,
            self.markup_percent(),
            self.probability * 100.0,
            self.expected_revenue,
        )?;
        if self.degraded {
            write!(f, " [degraded]")?;
        }
        Ok(())
    }
}

/// Outcome of one price search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub base_price: f64,
    /// Revenue-maximizing candidate.
    pub optimal: PriceCandidate,
    /// Revenue-maximizing candidate among those meeting the probability
    /// floor; equal to `optimal` when none do.
    pub safe: PriceCandidate,
    /// False when no candidate met the floor and `safe` fell back to `optimal`.
    pub safe_meets_floor: bool,
    /// Number of candidates scored with the neutral fallback.
    pub degraded_candidates: usize,
    /// Every evaluated candidate, ascending by markup.
    pub candidates: Vec<PriceCandidate>,
}

impl Recommendation {
    /// Whether any candidate was scored in degraded mode.
    pub fn is_degraded(&self) -> bool {
        self.degraded_candidates > 0
    }

    /// Whether the safe recommendation differs from the optimal one.
    pub fn has_distinct_safe(&self) -> bool {
        self.safe.price != self.optimal.price
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Base price:    {:.0}", self.base_price)?;
        writeln!(f, "Optimal price: {}", self.optimal)?;
        if self.has_distinct_safe() {
            writeln!(f, "Safe price:    {}", self.safe)?;
        } else if !self.safe_meets_floor {
            writeln!(f, "Safe price:    none meets the floor, using optimal")?;
        }
        if self.is_degraded() {
            writeln!(
                f,
                "Warning: {}/{} candidates scored with neutral fallback",
                self.degraded_candidates,
                self.candidates.len()
            )?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors surfaced by the price search and the estimator adapter.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PricingError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Estimator unavailable: {0}")]
    EstimatorUnavailable(String),

    #[error("Search deadline exceeded: {elapsed_ms}ms elapsed, budget {budget_ms}ms")]
    DeadlineExceeded { budget_ms: u128, elapsed_ms: u128 },
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn make_candidate(markup: f64, probability: f64) -> PriceCandidate {
        let price = 300.0 * (1.0 + markup);
        PriceCandidate {
            markup,
            price,
            probability,
            expected_revenue: price * probability,
            degraded: false,
        }
    }

    #[test]
    fn test_context_builder() {
        let ctx = OrderContext::new(300.0)
            .with_driver_rating(4.7)
            .with_distance_km(5.2)
            .with_order_hour(18);
        assert_eq!(ctx.base_price, 300.0);
        assert_eq!(ctx.driver_rating, Some(4.7));
        assert_eq!(ctx.distance_km, Some(5.2));
        assert_eq!(ctx.order_hour, Some(18));
        assert!(ctx.validate().is_ok());
    }

    #[test]
    fn test_context_rejects_non_positive_price() {
        for price in [0.0, -10.0, f64::NAN, f64::INFINITY] {
            let err = OrderContext::new(price).validate().unwrap_err();
            assert!(matches!(err, PricingError::InvalidConfiguration(_)), "{price}");
        }
    }

    #[test]
    fn test_context_rejects_bad_hour() {
        let err = OrderContext::new(300.0).with_order_hour(24).validate().unwrap_err();
        assert!(matches!(err, PricingError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_context_rejects_bad_features() {
        let bad = [
            OrderContext::new(300.0).with_driver_rating(f64::NAN),
            OrderContext::new(300.0).with_driver_rating(f64::INFINITY),
            OrderContext::new(300.0).with_distance_km(-0.5),
            OrderContext::new(300.0).with_distance_km(f64::NAN),
            OrderContext::new(300.0).with_distance_km(f64::INFINITY),
        ];
        for order in bad {
            assert!(
                matches!(order.validate(), Err(PricingError::InvalidConfiguration(_))),
                "{order:?} should be rejected"
            );
        }
        assert!(OrderContext::new(300.0).with_distance_km(0.0).validate().is_ok());
    }

    #[test]
    fn test_context_display() {
        let ctx = OrderContext::new(300.0).with_order_hour(7);
        assert_eq!(format!("{ctx}"), "base 300 | 07:00");
    }

    #[test]
    fn test_feature_defaults() {
        let d = FeatureDefaults::default();
        assert_eq!(d.driver_rating, 4.5);
        assert_eq!(d.distance_km, 5.0);
        assert_eq!(d.order_hour, 12);
    }

    #[test]
    fn test_feature_vector_order() {
        let fv = FeatureVector::new(300.0, 330.0, 4.8, 5.0, 18);
        let arr = fv.to_array();
        assert_eq!(arr.len(), FEATURE_NAMES.len());
        assert_eq!(arr[0], 300.0);
        assert_eq!(arr[1], 330.0);
        assert!((arr[2] - 1.1).abs() < 1e-12);
        assert_eq!(arr[5], 18.0);
    }

    #[test]
    fn test_prediction_neutral() {
        let p = Prediction::neutral();
        assert_eq!(p.probability, 0.5);
        assert!(p.degraded);
        assert!(!Prediction::scored(0.8).degraded);
    }

    #[test]
    fn test_candidate_display() {
        let c = make_candidate(0.1, 0.8);
        assert_eq!(format!("{c}"), "330 (+10.0%) | p=80.0% | E[rev]=264");
    }

    #[test]
    fn test_recommendation_flags() {
        let optimal = make_candidate(0.3, 0.6);
        let safe = make_candidate(0.1, 0.8);
        let rec = Recommendation {
            base_price: 300.0,
            optimal,
            safe,
            safe_meets_floor: true,
            degraded_candidates: 0,
            candidates: vec![safe, optimal],
        };
        assert!(rec.has_distinct_safe());
        assert!(!rec.is_degraded());
        let text = format!("{rec}");
        assert!(text.contains("Optimal price"));
        assert!(text.contains("Safe price"));
    }

    #[test]
    fn test_error_display() {
        let e = PricingError::InvalidConfiguration("steps must be >= 1".into());
        assert_eq!(e.to_string(), "Invalid configuration: steps must be >= 1");
        let e = PricingError::DeadlineExceeded { budget_ms: 5, elapsed_ms: 9 };
        assert!(e.to_string().contains("9ms"));
    }
}
