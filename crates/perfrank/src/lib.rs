//! perfrank: letter-rank performance regressions.
//!
//! This crate re-exports the workspace building blocks under one roof.
//! Most callers only need [`prelude`]:
//!
//! ```
//! use perfrank::prelude::*;
//!
//! let baseline: Vec<f64> = (1..=100).map(f64::from).collect();
//! let test = build_regression_test(TestKind::Distance, &ConfigFile::default()).unwrap();
//! let verdict = test.evaluate(&baseline, &baseline).unwrap();
//! assert_eq!(verdict.rank, Some(LetterRank::S));
//! ```

pub use perfrank_app as app;
pub use perfrank_distance as distance;
pub use perfrank_domain as domain;
pub use perfrank_error as error;
pub use perfrank_matrix as matrix;
pub use perfrank_stats as stats;
pub use perfrank_types as types;

pub use perfrank_error::{PerfrankError, Result};

pub mod prelude {
    pub use perfrank_app::{EvaluateRequest, EvaluateUseCase, render_markdown};
    pub use perfrank_domain::{
        DivergenceTest, PercentileTest, RegressionTest, StatisticalDistanceTest,
        build_regression_test, gate_verdict,
    };
    pub use perfrank_error::{PerfrankError, Result};
    pub use perfrank_types::{
        ConfigFile, GatePolicy, LetterRank, RegressionVerdict, TestKind, VerdictReceipt,
        VerdictStatus,
    };
}
