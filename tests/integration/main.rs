//! Integration tests: price search properties against stub estimators and
//! the full generate → train → optimize pipeline.

mod pipeline;
mod price_search;
mod stub_estimator;
