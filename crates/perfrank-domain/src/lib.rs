//! Domain logic for perfrank.
//!
//! This crate is intentionally I/O-free: it turns raw statistics into
//! scores, letter ranks and gate decisions.

mod gate;
mod grade;
mod regression;

pub use gate::gate_verdict;
pub use grade::{
    Axis, Observation, combined_score, letter_rank, percentile_regression_test, punishment_total,
    raw_matrix_score, score_from_matrix,
};
pub use regression::{
    DivergenceTest, PercentileTest, RegressionTest, StatisticalDistanceTest,
    build_regression_test, distance_report,
};

pub use perfrank_error::{PerfrankError, Result};
