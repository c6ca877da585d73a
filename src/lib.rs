//! Perfrank workspace-level test utilities.
//!
//! This crate exists solely to support workspace-level integration tests,
//! particularly the BDD/cucumber tests in `tests/cucumber.rs`.
//!
//! The actual perfrank functionality is in the workspace member crates:
//! - `perfrank-types`: Verdict, table and config contracts with JSON schemas
//! - `perfrank-stats`: ECDF, percentile and normalization transforms
//! - `perfrank-distance`: KS, Wasserstein and KL divergence metrics
//! - `perfrank-matrix`: Scoring matrix and rank table construction
//! - `perfrank-domain`: Grading and the regression tests
//! - `perfrank-fake`: Seeded synthetic sample scenarios
//! - `perfrank-app`: Application use cases and renderers
//! - `perfrank-cli`: CLI interface
//! - `perfrank`: Facade re-exporting the library crates
