//! The pluggable regression tests.
//!
//! Each variant builds its scoring matrix once in `new` and is immutable
//! afterwards, so a single instance can grade many sample pairs from many
//! threads.

use crate::grade::{
    Axis, Observation, combined_score, letter_rank, percentile_regression_test, raw_matrix_score,
    score_from_matrix,
};
use perfrank_distance::{ks_2samp, ks_critical_value, percentile_divergence, wasserstein_distance};
use perfrank_error::{PerfrankError, Result};
use perfrank_matrix::{resolve_matrix, validate_ladder, validate_rank_table};
use perfrank_stats::{build_ecdf, mean, normalize_pair, percentile_curve, round_to};
use perfrank_types::{
    ConfigFile, DistanceReport, DistanceTestConfig, DivergenceTestConfig, PercentileTestConfig,
    RegressionVerdict, ScoringMatrix, TailTrim, TestKind,
};
use tracing::debug;

pub trait RegressionTest: Send + Sync {
    fn kind(&self) -> TestKind;

    /// Grades `benchmark` against `baseline`.
    fn evaluate(&self, baseline: &[f64], benchmark: &[f64]) -> Result<RegressionVerdict>;
}

/// KS and Wasserstein distance between two samples, rounded to 3 decimals.
pub fn distance_report(baseline: &[f64], benchmark: &[f64]) -> Result<DistanceReport> {
    let ks = ks_2samp(baseline, benchmark)?;
    let ws = wasserstein_distance(baseline, benchmark)?;
    Ok(DistanceReport {
        ks_distance: round_to(ks.statistic, 3),
        ks_pvalue: ks.pvalue,
        ks_critical_value: ks_critical_value(baseline.len(), benchmark.len()),
        wasserstein_distance: round_to(ws, 3),
        baseline_size: baseline.len(),
        benchmark_size: benchmark.len(),
    })
}

fn require_samples(min_samples: usize, baseline: &[f64], benchmark: &[f64]) -> Result<()> {
    let smallest = baseline.len().min(benchmark.len());
    if smallest < min_samples {
        return Err(PerfrankError::InsufficientData {
            required: min_samples,
            actual: smallest,
        });
    }
    Ok(())
}

fn validate_trim(trim: &TailTrim) -> Result<()> {
    let in_unit = |v: Option<f64>| v.is_none_or(|v| (0.0..=1.0).contains(&v));
    if !in_unit(trim.lower) || !in_unit(trim.upper) {
        return Err(PerfrankError::configuration(format!(
            "tail trim bounds must be within [0, 1], got {trim:?}"
        )));
    }
    if let (Some(lower), Some(upper)) = (trim.lower, trim.upper)
        && lower >= upper
    {
        return Err(PerfrankError::configuration(format!(
            "tail trim lower {lower} must be below upper {upper}"
        )));
    }
    Ok(())
}

/// KS + Wasserstein distance between max-normalized, tail-trimmed ECDFs.
#[derive(Debug, Clone)]
pub struct StatisticalDistanceTest {
    config: DistanceTestConfig,
    matrix: ScoringMatrix,
}

impl StatisticalDistanceTest {
    pub fn new(config: DistanceTestConfig) -> Result<Self> {
        validate_trim(&config.trim)?;
        validate_rank_table(&config.rank_table)?;
        let matrix = resolve_matrix(&config.matrix)?;
        if !matrix.is_dual() {
            return Err(PerfrankError::configuration(
                "distance scoring needs a dual (ks, wasserstein) matrix",
            ));
        }
        Ok(Self { config, matrix })
    }

    pub fn matrix(&self) -> &ScoringMatrix {
        &self.matrix
    }
}

impl RegressionTest for StatisticalDistanceTest {
    fn kind(&self) -> TestKind {
        TestKind::Distance
    }

    fn evaluate(&self, baseline: &[f64], benchmark: &[f64]) -> Result<RegressionVerdict> {
        let (a, b) = normalize_pair(baseline, benchmark, self.config.normalization)?;
        let ecdf_a = build_ecdf(&a, self.config.trim)?.values();
        let ecdf_b = build_ecdf(&b, self.config.trim)?.values();

        let distances = distance_report(&ecdf_a, &ecdf_b)?;
        let ks = distances.ks_distance;
        let ws = distances.wasserstein_distance;

        let ks_raw = raw_matrix_score(ks, &self.matrix, Axis::A)?;
        let ws_raw = raw_matrix_score(ws, &self.matrix, Axis::B)?;
        let score = combined_score(ks_raw, ws_raw);

        let observation = if self.config.rank_table.is_dual() {
            Observation::Dual(ks, ws)
        } else {
            Observation::Single(ks)
        };
        let rank = letter_rank(&self.config.rank_table, observation)?;

        debug!(ks, ws, ks_raw, ws_raw, score, %rank, "distance test graded");

        Ok(RegressionVerdict {
            test: TestKind::Distance,
            distances,
            divergence: None,
            percentiles: None,
            score,
            rank: Some(rank),
            passed: None,
        })
    }
}

/// Band-wise KL divergence of percentile curves, aggregated into a c-value.
#[derive(Debug, Clone)]
pub struct DivergenceTest {
    config: DivergenceTestConfig,
    matrix: ScoringMatrix,
    min_samples: usize,
}

impl DivergenceTest {
    pub fn new(config: DivergenceTestConfig) -> Result<Self> {
        config.range.validate()?;
        validate_rank_table(&config.rank_table)?;
        if config.rank_table.is_dual() {
            return Err(PerfrankError::configuration(
                "divergence ranks a single c-value; the rank table must be single-axis",
            ));
        }
        let matrix = resolve_matrix(&config.matrix)?;
        let min_samples = config.min_samples.unwrap_or_else(|| config.range.len());
        Ok(Self {
            config,
            matrix,
            min_samples,
        })
    }

    pub fn min_samples(&self) -> usize {
        self.min_samples
    }

    pub fn matrix(&self) -> &ScoringMatrix {
        &self.matrix
    }
}

impl RegressionTest for DivergenceTest {
    fn kind(&self) -> TestKind {
        TestKind::Divergence
    }

    fn evaluate(&self, baseline: &[f64], benchmark: &[f64]) -> Result<RegressionVerdict> {
        require_samples(self.min_samples, baseline, benchmark)?;

        let range = &self.config.range;
        let curve_a = percentile_curve(baseline, range)?;
        let curve_b = percentile_curve(benchmark, range)?;
        let divergence =
            percentile_divergence(&curve_a, &curve_b, range, self.config.normalization)?;

        let c_value = divergence.c_value;
        let score = score_from_matrix(c_value, &self.matrix, Axis::A)?;
        let rank = letter_rank(&self.config.rank_table, Observation::Single(c_value))?;

        debug!(c_value, score, %rank, sentinel_bands = divergence.sentinel_bands, "divergence test graded");

        Ok(RegressionVerdict {
            test: TestKind::Divergence,
            distances: distance_report(baseline, benchmark)?,
            divergence: Some(divergence),
            percentiles: None,
            score,
            rank: Some(rank),
            passed: None,
        })
    }
}

/// Boolean test over per-percentile relative change.
#[derive(Debug, Clone)]
pub struct PercentileTest {
    config: PercentileTestConfig,
    min_samples: usize,
}

impl PercentileTest {
    pub fn new(config: PercentileTestConfig) -> Result<Self> {
        config.range.validate()?;
        validate_ladder(&config.ladder)?;
        if !config.pass_threshold.is_finite() {
            return Err(PerfrankError::configuration(format!(
                "pass threshold must be finite, got {}",
                config.pass_threshold
            )));
        }
        let min_samples = config.min_samples.unwrap_or_else(|| config.range.len());
        Ok(Self {
            config,
            min_samples,
        })
    }

    pub fn min_samples(&self) -> usize {
        self.min_samples
    }
}

impl RegressionTest for PercentileTest {
    fn kind(&self) -> TestKind {
        TestKind::Percentile
    }

    fn evaluate(&self, baseline: &[f64], benchmark: &[f64]) -> Result<RegressionVerdict> {
        require_samples(self.min_samples, baseline, benchmark)?;

        let range = &self.config.range;
        let curve_a = percentile_curve(baseline, range)?;
        let curve_b = percentile_curve(benchmark, range)?;

        let (report, passed) = percentile_regression_test(
            &curve_a,
            &curve_b,
            &range.points(),
            &self.config.ladder,
            self.config.pass_threshold,
        )?;

        let avg = mean(&report.scores)?.clamp(0.0, 1.0);
        let score = match round_to(avg * 100.0, 2) {
            s if s == 0.0 => 1.0,
            s => s,
        };

        debug!(
            probability_value = report.probability_value,
            passed, score, "percentile test graded"
        );

        Ok(RegressionVerdict {
            test: TestKind::Percentile,
            distances: distance_report(baseline, benchmark)?,
            divergence: None,
            percentiles: Some(report),
            score,
            rank: None,
            passed: Some(passed),
        })
    }
}

/// Constructs the configured variant of `kind`.
pub fn build_regression_test(
    kind: TestKind,
    config: &ConfigFile,
) -> Result<Box<dyn RegressionTest>> {
    Ok(match kind {
        TestKind::Distance => Box::new(StatisticalDistanceTest::new(config.distance.clone())?),
        TestKind::Divergence => Box::new(DivergenceTest::new(config.divergence.clone())?),
        TestKind::Percentile => Box::new(PercentileTest::new(config.percentile.clone())?),
    })
}
