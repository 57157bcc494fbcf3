//! Acceptance estimation.
//!
//! Defines the `AcceptanceEstimator` trait consumed by the price search and
//! provides the model-backed adapter, the trained model artifact, the
//! training routine and evaluation metrics.

pub mod adapter;
pub mod metrics;
pub mod model;
pub mod training;

use crate::types::{OrderContext, Prediction, PricingError};

/// Abstraction over bid-acceptance predictors.
///
/// Implementors turn an order context plus a candidate bid price into the
/// probability that a driver accepts the bid. Failing to score a single
/// input is reported through [`Prediction::degraded`]; an `Err` means the
/// estimator as a whole is unusable and the caller should stop.
#[cfg_attr(test, mockall::automock)]
pub trait AcceptanceEstimator {
    /// Probability that `bid_price` is accepted for this order.
    fn probability_of_acceptance(
        &self,
        context: &OrderContext,
        bid_price: f64,
    ) -> Result<Prediction, PricingError>;

    /// Model identifier string.
    fn model_name(&self) -> &str;
}

impl<E: AcceptanceEstimator + ?Sized> AcceptanceEstimator for Box<E> {
    fn probability_of_acceptance(
        &self,
        context: &OrderContext,
        bid_price: f64,
    ) -> Result<Prediction, PricingError> {
        (**self).probability_of_acceptance(context, bid_price)
    }

    fn model_name(&self) -> &str {
        (**self).model_name()
    }
}

impl<E: AcceptanceEstimator + ?Sized> AcceptanceEstimator for &E {
    fn probability_of_acceptance(
        &self,
        context: &OrderContext,
        bid_price: f64,
    ) -> Result<Prediction, PricingError> {
        (**self).probability_of_acceptance(context, bid_price)
    }

    fn model_name(&self) -> &str {
        (**self).model_name()
    }
}
