//! Model-backed estimator adapter.
//!
//! Bridges an [`OrderContext`] to a scoring model: fills absent features
//! from [`FeatureDefaults`], substitutes the candidate bid price, and turns
//! per-input scoring failures into a degraded neutral prediction.

use anyhow::Result;
use tracing::warn;

use super::model::AcceptanceModel;
use super::AcceptanceEstimator;
use crate::types::{FeatureDefaults, FeatureVector, OrderContext, Prediction, PricingError};

/// Anything that can score a raw feature row.
pub trait ScoringModel {
    /// Probability of acceptance for one row in `FEATURE_NAMES` order.
    fn score(&self, row: &[f64]) -> Result<f64>;

    fn name(&self) -> &str;
}

impl ScoringModel for AcceptanceModel {
    fn score(&self, row: &[f64]) -> Result<f64> {
        AcceptanceModel::score(self, row)
    }

    fn name(&self) -> &str {
        "logistic-acceptance"
    }
}

/// [`AcceptanceEstimator`] over a [`ScoringModel`].
pub struct ModelEstimator<M> {
    model: M,
    defaults: FeatureDefaults,
}

impl<M: ScoringModel> ModelEstimator<M> {
    pub fn new(model: M, defaults: FeatureDefaults) -> Self {
        Self { model, defaults }
    }

    pub fn defaults(&self) -> &FeatureDefaults {
        &self.defaults
    }

    /// Resolve the full model input for one candidate bid.
    pub fn resolve_features(&self, context: &OrderContext, bid_price: f64) -> FeatureVector {
        let driver_rating = context.driver_rating.unwrap_or_else(|| {
            warn!(default = self.defaults.driver_rating, "driver_rating missing, using default");
            self.defaults.driver_rating
        });
        let distance_km = context.distance_km.unwrap_or_else(|| {
            warn!(default = self.defaults.distance_km, "distance_km missing, using default");
            self.defaults.distance_km
        });
        let order_hour = context.order_hour.unwrap_or_else(|| {
            warn!(default = self.defaults.order_hour, "order_hour missing, using default");
            self.defaults.order_hour
        });

        FeatureVector::new(context.base_price, bid_price, driver_rating, distance_km, order_hour)
    }
}

impl ModelEstimator<AcceptanceModel> {
    /// Load a trained artifact from disk.
    pub fn from_artifact(path: &str, defaults: FeatureDefaults) -> Result<Self, PricingError> {
        let model = AcceptanceModel::load(path)
            .map_err(|e| PricingError::EstimatorUnavailable(format!("{e:#}")))?;
        Ok(Self::new(model, defaults))
    }

    pub fn model(&self) -> &AcceptanceModel {
        &self.model
    }
}

impl<M: ScoringModel> AcceptanceEstimator for ModelEstimator<M> {
    fn probability_of_acceptance(
        &self,
        context: &OrderContext,
        bid_price: f64,
    ) -> Result<Prediction, PricingError> {
        let features = self.resolve_features(context, bid_price);

        match self.model.score(&features.to_array()) {
            Ok(p) if p.is_finite() => Ok(Prediction::scored(p.clamp(0.0, 1.0))),
            Ok(p) => {
                warn!(bid_price, probability = p, "Model returned non-finite probability, using neutral fallback");
                Ok(Prediction::neutral())
            }
            Err(e) => {
                warn!(bid_price, error = %e, "Model could not score input, using neutral fallback");
                Ok(Prediction::neutral())
            }
        }
    }

    fn model_name(&self) -> &str {
        self.model.name()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
