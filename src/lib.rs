//! RIDEBID: ride-hailing bid pricing assistant
//!
//! Library crate exposing all modules for use by integration tests
//! and the binary entry point.

pub mod config;
pub mod types;
pub mod data;
pub mod estimator;
pub mod pricing;
pub mod storage;
