//! Deterministic estimators for integration testing.
//!
//! Each stub derives the markup from the bid price and the order's base
//! price, so tests can describe acceptance as a function of markup.

use std::cell::Cell;

use ridebid::estimator::AcceptanceEstimator;
use ridebid::types::{OrderContext, Prediction, PricingError};

/// `p = max(0, 1 - slope * markup)`.
pub struct LinearStub {
    pub slope: f64,
}

impl AcceptanceEstimator for LinearStub {
    fn probability_of_acceptance(&self, context: &OrderContext, bid_price: f64) -> Result<Prediction, PricingError> {
        let markup = bid_price / context.base_price - 1.0;
        Ok(Prediction::scored((1.0 - self.slope * markup).max(0.0)))
    }

    fn model_name(&self) -> &str {
        "linear-stub"
    }
}

/// Same answer for every bid; optionally flagged as degraded.
pub struct ConstantStub {
    pub prediction: Prediction,
}

impl ConstantStub {
    pub fn scored(p: f64) -> Self {
        Self { prediction: Prediction::scored(p) }
    }

    pub fn neutral() -> Self {
        Self { prediction: Prediction::neutral() }
    }
}

impl AcceptanceEstimator for ConstantStub {
    fn probability_of_acceptance(&self, _context: &OrderContext, _bid_price: f64) -> Result<Prediction, PricingError> {
        Ok(self.prediction)
    }

    fn model_name(&self) -> &str {
        "constant-stub"
    }
}

/// Looks up the probability by exact bid price; unknown prices get 0.
pub struct TableStub {
    pub table: Vec<(f64, f64)>,
}

impl AcceptanceEstimator for TableStub {
    fn probability_of_acceptance(&self, _context: &OrderContext, bid_price: f64) -> Result<Prediction, PricingError> {
        let p = self
            .table
            .iter()
            .find(|(price, _)| *price == bid_price)
            .map(|(_, p)| *p)
            .unwrap_or(0.0);
        Ok(Prediction::scored(p))
    }

    fn model_name(&self) -> &str {
        "table-stub"
    }
}

/// Counts queries and delegates to an inner estimator.
pub struct CountingStub<E> {
    pub inner: E,
    pub calls: Cell<usize>,
}

impl<E> CountingStub<E> {
    pub fn new(inner: E) -> Self {
        Self { inner, calls: Cell::new(0) }
    }
}

impl<E: AcceptanceEstimator> AcceptanceEstimator for CountingStub<E> {
    fn probability_of_acceptance(&self, context: &OrderContext, bid_price: f64) -> Result<Prediction, PricingError> {
        self.calls.set(self.calls.get() + 1);
        self.inner.probability_of_acceptance(context, bid_price)
    }

    fn model_name(&self) -> &str {
        self.inner.model_name()
    }
}
