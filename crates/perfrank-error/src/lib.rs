//! Unified error types for perfrank.
//!
//! Every library crate in the workspace returns [`PerfrankError`]. The app and
//! CLI layers wrap it in `anyhow` with context.
//!
//! Statistical edge cases inside a single band (for example a KL divergence
//! with a zero denominator) never surface here; they are absorbed into a
//! sentinel value by the metric that hit them.

use thiserror::Error;

pub type Result<T, E = PerfrankError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum PerfrankError {
    /// Empty, non-finite or otherwise unusable sample.
    #[error("invalid sample: {0}")]
    InvalidSample(String),

    /// Fewer observations than a computation needs.
    #[error("insufficient data: need at least {required} values, got {actual}")]
    InsufficientData { required: usize, actual: usize },

    /// Boundary, rank or scoring table that cannot be used.
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl PerfrankError {
    pub fn invalid_sample(msg: impl Into<String>) -> Self {
        Self::InvalidSample(msg.into())
    }

    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }
}
