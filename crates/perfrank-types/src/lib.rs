//! Shared types for perfrank.
//!
//! Design goal: versioned, explicit, boring.
//! These structs are the verdict receipts, grading tables and config file
//! contracts exchanged between the domain, the app layer and the CLI.

use perfrank_error::PerfrankError;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

pub const VERDICT_SCHEMA_V1: &str = "perfrank.verdict.v1";
pub const MATRIX_SCHEMA_V1: &str = "perfrank.matrix.v1";

/// Seed used by the distance family's randomized scoring matrix.
pub const DEFAULT_MATRIX_SEED: u64 = 1996;

/// Minimum probability value for the percentile test to pass.
pub const DEFAULT_PERCENTILE_PASS_THRESHOLD: f64 = 0.90;

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ToolInfo {
    pub name: String,
    pub version: String,
}

// ----------------------------
// Ranks and test kinds
// ----------------------------

/// Severity classification of a detected regression, `S` (best) to `F` (worst).
///
/// Ordering follows severity: `S < A < ... < F`.
#[derive(
    Debug, Copy, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
pub enum LetterRank {
    S,
    A,
    B,
    C,
    D,
    E,
    F,
}

impl LetterRank {
    pub const ALL: [LetterRank; 7] = [
        LetterRank::S,
        LetterRank::A,
        LetterRank::B,
        LetterRank::C,
        LetterRank::D,
        LetterRank::E,
        LetterRank::F,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            LetterRank::S => "S",
            LetterRank::A => "A",
            LetterRank::B => "B",
            LetterRank::C => "C",
            LetterRank::D => "D",
            LetterRank::E => "E",
            LetterRank::F => "F",
        }
    }

    /// Quality weight, 7 for `S` down to 1 for `F`.
    pub fn weight(self) -> u8 {
        7 - self as u8
    }

    /// True if this rank is at least as good as `boundary`.
    pub fn meets(self, boundary: LetterRank) -> bool {
        self.weight() >= boundary.weight()
    }

    pub fn action(self) -> RankAction {
        match self {
            LetterRank::S | LetterRank::A => RankAction::Release,
            LetterRank::B => RankAction::ImpactAnalysis,
            _ => RankAction::Halt,
        }
    }
}

impl fmt::Display for LetterRank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LetterRank {
    type Err = PerfrankError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LetterRank::ALL
            .into_iter()
            .find(|r| r.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                PerfrankError::configuration(format!("unknown letter rank: {s} (expected S..F)"))
            })
    }
}

/// What a pipeline should do with a build graded at a given rank.
#[derive(Debug, Copy, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RankAction {
    /// Ship automatically.
    Release,
    /// Allowed, but someone should look at what changed.
    ImpactAnalysis,
    /// Stop the pipeline.
    Halt,
}

impl RankAction {
    pub fn as_str(self) -> &'static str {
        match self {
            RankAction::Release => "release",
            RankAction::ImpactAnalysis => "impact analysis",
            RankAction::Halt => "halt",
        }
    }
}

impl fmt::Display for RankAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(
    Debug, Copy, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq, PartialOrd, Ord, Hash,
    Default,
)]
#[serde(rename_all = "snake_case")]
pub enum TestKind {
    /// KS + Wasserstein distance between normalized ECDFs.
    #[default]
    Distance,
    /// KL divergence across percentile bands (c-value).
    Divergence,
    /// Per-percentile relative change ladder.
    Percentile,
}

impl TestKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TestKind::Distance => "distance",
            TestKind::Divergence => "divergence",
            TestKind::Percentile => "percentile",
        }
    }
}

impl fmt::Display for TestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TestKind {
    type Err = PerfrankError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "distance" => Ok(TestKind::Distance),
            "divergence" => Ok(TestKind::Divergence),
            "percentile" => Ok(TestKind::Percentile),
            other => Err(PerfrankError::configuration(format!(
                "unknown test kind: {other} (expected distance|divergence|percentile)"
            ))),
        }
    }
}

// ----------------------------
// Sample transforms
// ----------------------------

#[derive(Debug, Copy, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct EcdfPoint {
    pub value: f64,
    /// Fraction of observations `<=` value, in `(0, 1]`.
    pub probability: f64,
}

/// Sorted step-function view of a sample, optionally tail-trimmed.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Default)]
pub struct EmpiricalDistribution {
    pub points: Vec<EcdfPoint>,
}

impl EmpiricalDistribution {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }

    pub fn probabilities(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.probability).collect()
    }
}

/// ECDF tail trimming over sorted positions. The observation at position
/// `i` (0-based) of `n` is dropped when `(i + 1) / n <= lower` or
/// `(i + 1) / n >= upper`.
#[derive(Debug, Copy, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Default)]
pub struct TailTrim {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lower: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upper: Option<f64>,
}

impl TailTrim {
    pub fn none() -> Self {
        Self::default()
    }

    /// Drop the bottom and top 5%.
    pub fn both() -> Self {
        Self {
            lower: Some(0.05),
            upper: Some(0.95),
        }
    }

    /// Drop the top 4% only.
    pub fn upper_only() -> Self {
        Self {
            lower: None,
            upper: Some(0.96),
        }
    }

    pub fn is_none(&self) -> bool {
        self.lower.is_none() && self.upper.is_none()
    }

    pub fn keeps(&self, probability: f64) -> bool {
        self.lower.is_none_or(|l| probability > l) && self.upper.is_none_or(|u| probability < u)
    }
}

#[derive(Debug, Copy, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Normalization {
    #[default]
    None,
    /// Divide by the reference maximum.
    Max,
    /// Divide by the reference sum.
    Sum,
    /// Subtract the reference mean, divide by the reference standard deviation.
    #[serde(rename = "zscore")]
    ZScore,
}

/// Percentile cut points (inclusive) and the band width used to group them.
#[derive(Debug, Copy, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(default)]
pub struct PercentileRange {
    pub start: u32,
    pub end: u32,
    pub step: u32,
    /// Width of one band, in percentiles. A band spans `band_width / step + 1` points.
    pub band_width: u32,
}

impl Default for PercentileRange {
    fn default() -> Self {
        Self {
            start: 5,
            end: 95,
            step: 1,
            band_width: 5,
        }
    }
}

impl PercentileRange {
    pub fn validate(&self) -> Result<(), PerfrankError> {
        if self.step == 0 {
            return Err(PerfrankError::configuration("percentile step must be > 0"));
        }
        if self.start >= self.end || self.end > 100 {
            return Err(PerfrankError::configuration(format!(
                "percentile range {}..={} must satisfy start < end <= 100",
                self.start, self.end
            )));
        }
        if self.band_width == 0 || self.band_width % self.step != 0 {
            return Err(PerfrankError::configuration(format!(
                "band width {} must be a positive multiple of step {}",
                self.band_width, self.step
            )));
        }
        if self.band_width > self.end - self.start {
            return Err(PerfrankError::configuration(format!(
                "band width {} exceeds percentile range {}..={}",
                self.band_width, self.start, self.end
            )));
        }
        Ok(())
    }

    /// Cut points as percentages, e.g. `[5.0, 6.0, ..., 95.0]`.
    pub fn points(&self) -> Vec<f64> {
        (self.start..=self.end)
            .step_by(self.step.max(1) as usize)
            .map(f64::from)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.points().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Points between two consecutive band starts.
    pub fn band_stride(&self) -> usize {
        (self.band_width / self.step.max(1)) as usize
    }
}

// ----------------------------
// Scoring matrices and rank tables
// ----------------------------

/// One row of a punishment matrix.
///
/// `boundary_a` is the primary statistic (KS distance in dual tables),
/// `boundary_b` the secondary one (Wasserstein distance).
#[derive(Debug, Copy, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct ScoringMatrixEntry {
    pub boundary_a: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boundary_b: Option<f64>,

    pub punishment: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Default)]
pub struct ScoringMatrix {
    pub entries: Vec<ScoringMatrixEntry>,
}

impl ScoringMatrix {
    pub fn single(rows: &[(f64, f64)]) -> Self {
        Self {
            entries: rows
                .iter()
                .map(|&(boundary_a, punishment)| ScoringMatrixEntry {
                    boundary_a,
                    boundary_b: None,
                    punishment,
                })
                .collect(),
        }
    }

    pub fn dual(rows: &[(f64, f64, f64)]) -> Self {
        Self {
            entries: rows
                .iter()
                .map(|&(boundary_a, boundary_b, punishment)| ScoringMatrixEntry {
                    boundary_a,
                    boundary_b: Some(boundary_b),
                    punishment,
                })
                .collect(),
        }
    }

    /// Hand-tuned c-value table: bigger divergence, bigger penalty.
    pub fn divergence_preset() -> Self {
        Self::single(&[
            (0.005, 0.02),
            (0.010, 0.04),
            (0.020, 0.08),
            (0.040, 0.12),
            (0.080, 0.16),
            (0.160, 0.24),
            (0.320, 0.34),
        ])
    }

    pub fn is_dual(&self) -> bool {
        self.entries.first().is_some_and(|e| e.boundary_b.is_some())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total_punishment(&self) -> f64 {
        self.entries.iter().map(|e| e.punishment).sum()
    }
}

#[derive(Debug, Copy, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct LetterRankEntry {
    pub boundary_a: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boundary_b: Option<f64>,

    pub rank: LetterRank,
}

/// Ordered boundaries; an observation earns the first rank whose
/// boundary (or boundary pair) it is strictly below.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct RankTable {
    pub entries: Vec<LetterRankEntry>,
}

impl RankTable {
    fn from_single(bounds: [f64; 7]) -> Self {
        Self {
            entries: LetterRank::ALL
                .into_iter()
                .zip(bounds)
                .map(|(rank, boundary_a)| LetterRankEntry {
                    boundary_a,
                    boundary_b: None,
                    rank,
                })
                .collect(),
        }
    }

    /// KS (axis a) and Wasserstein (axis b) boundaries.
    pub fn distance_dual() -> Self {
        let ks = [0.060, 0.070, 0.080, 0.090, 0.100, 0.125, 0.150];
        let ws = [0.020, 0.030, 0.040, 0.050, 0.075, 0.100, 0.125];
        Self {
            entries: LetterRank::ALL
                .into_iter()
                .zip(ks.into_iter().zip(ws))
                .map(|(rank, (a, b))| LetterRankEntry {
                    boundary_a: a,
                    boundary_b: Some(b),
                    rank,
                })
                .collect(),
        }
    }

    pub fn distance_ks_only() -> Self {
        Self::from_single([0.02, 0.04, 0.06, 0.08, 0.10, 0.12, 0.14])
    }

    pub fn divergence() -> Self {
        Self::from_single([0.005, 0.010, 0.020, 0.040, 0.080, 0.160, 0.320])
    }

    pub fn is_dual(&self) -> bool {
        self.entries.first().is_some_and(|e| e.boundary_b.is_some())
    }
}

impl Default for RankTable {
    fn default() -> Self {
        Self::distance_dual()
    }
}

/// How sorted Dirichlet weights are paired with ascending boundaries.
#[derive(Debug, Copy, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum PunishmentOrder {
    /// Largest weight on the smallest boundary.
    #[default]
    Descending,
    /// Largest weight on the largest boundary.
    Ascending,
}

/// Parameters of a seeded, Dirichlet-weighted punishment matrix.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(default)]
pub struct DirichletSpec {
    pub seed: u64,
    pub size: usize,
    /// Symmetric Dirichlet concentration (alpha).
    pub concentration: f64,
    pub lower_bound_a: f64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub lower_bound_b: Option<f64>,

    pub increment: f64,
    pub order: PunishmentOrder,
}

impl Default for DirichletSpec {
    fn default() -> Self {
        Self {
            seed: DEFAULT_MATRIX_SEED,
            size: 100,
            concentration: 1.0,
            lower_bound_a: 0.060,
            lower_bound_b: Some(0.030),
            increment: 0.001,
            order: PunishmentOrder::Descending,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MatrixSource {
    Static(ScoringMatrix),
    Dirichlet(DirichletSpec),
}

impl Default for MatrixSource {
    fn default() -> Self {
        MatrixSource::Dirichlet(DirichletSpec::default())
    }
}

#[derive(Debug, Copy, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct LadderStep {
    /// Relative change magnitude, in percent.
    pub threshold: f64,
    pub punishment: f64,
}

/// Punishment ladders applied to per-percentile relative change.
///
/// Positive changes (slower) use `positive`, negative changes use `negative`;
/// thresholds on both sides are magnitudes.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct PercentileLadder {
    pub positive: Vec<LadderStep>,
    pub negative: Vec<LadderStep>,

    /// A step punishes only changes strictly beyond its threshold; otherwise
    /// a change equal to the threshold is punished too.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub strict: bool,
}

impl PercentileLadder {
    fn steps(rows: &[(f64, f64)]) -> Vec<LadderStep> {
        rows.iter()
            .map(|&(threshold, punishment)| LadderStep {
                threshold,
                punishment,
            })
            .collect()
    }

    /// Symmetric fine-grained ladder (0.5% .. 10%).
    pub fn fine() -> Self {
        let rows = [
            (0.5, 0.01),
            (1.0, 0.02),
            (2.0, 0.04),
            (3.0, 0.08),
            (4.0, 0.12),
            (5.0, 0.16),
            (6.0, 0.20),
            (7.0, 0.24),
            (8.0, 0.28),
            (9.0, 0.32),
            (10.0, 0.36),
        ];
        Self {
            positive: Self::steps(&rows),
            negative: Self::steps(&rows),
            strict: false,
        }
    }

    /// Coarse ladder: +20..+90% for slowdowns, -10..-30% for speedups.
    /// Thresholds are strict, so exactly +20% goes unpunished.
    pub fn coarse() -> Self {
        let punishments = [0.2, 0.4, 0.6, 0.8, 1.0];
        let positive: Vec<(f64, f64)> = [20.0, 30.0, 50.0, 75.0, 90.0]
            .into_iter()
            .zip(punishments)
            .collect();
        let negative: Vec<(f64, f64)> = [10.0, 15.0, 20.0, 25.0, 30.0]
            .into_iter()
            .zip(punishments)
            .collect();
        Self {
            positive: Self::steps(&positive),
            negative: Self::steps(&negative),
            strict: true,
        }
    }
}

impl Default for PercentileLadder {
    fn default() -> Self {
        Self::fine()
    }
}

// ----------------------------
// Reports and verdicts
// ----------------------------

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct DistanceReport {
    /// Two-sample KS statistic, rounded to 3 decimals.
    pub ks_distance: f64,
    pub ks_pvalue: f64,
    /// Critical KS value at alpha = 0.05 (informational).
    pub ks_critical_value: f64,
    /// Wasserstein distance, rounded to 3 decimals.
    pub wasserstein_distance: f64,
    pub baseline_size: usize,
    pub benchmark_size: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct DivergenceReport {
    /// KL divergence per percentile band.
    pub bands: Vec<f64>,
    pub c_value: f64,
    /// Bands that fell back to the sentinel value.
    #[serde(default)]
    pub sentinel_bands: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct PercentileReport {
    pub percentiles: Vec<f64>,
    /// Relative change per percentile, in percent, rounded to 2 decimals.
    pub changes: Vec<f64>,
    pub scores: Vec<f64>,
    /// `mean(scores) - std(scores)`.
    pub probability_value: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct RegressionVerdict {
    pub test: TestKind,
    pub distances: DistanceReport,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub divergence: Option<DivergenceReport>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub percentiles: Option<PercentileReport>,

    /// Score in `[1, 100]`; never exactly 0.
    pub score: f64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub rank: Option<LetterRank>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub passed: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct SampleSummary {
    pub count: usize,
    pub sum: f64,
    pub mean: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
    pub std_dev: f64,
    pub p95: f64,
    /// Observations at or above p95.
    pub outliers: usize,
}

#[derive(Debug, Copy, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum VerdictStatus {
    Pass,
    Warn,
    Fail,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct GateVerdict {
    pub status: VerdictStatus,
    pub reasons: Vec<String>,
}

#[derive(Debug, Copy, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct GatePolicy {
    /// Ranks at or beyond this one warn.
    pub warn_rank: LetterRank,
    /// Ranks at or beyond this one fail.
    pub fail_rank: LetterRank,
}

impl Default for GatePolicy {
    fn default() -> Self {
        Self {
            warn_rank: LetterRank::B,
            fail_rank: LetterRank::C,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Default)]
pub struct SampleRef {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct VerdictReceipt {
    pub schema: String,
    pub tool: ToolInfo,

    pub baseline_ref: SampleRef,
    pub benchmark_ref: SampleRef,

    pub baseline_summary: SampleSummary,
    pub benchmark_summary: SampleSummary,

    pub verdict: RegressionVerdict,
    pub gate: GateVerdict,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct MatrixReceipt {
    pub schema: String,
    pub tool: ToolInfo,
    pub family: TestKind,
    pub source: MatrixSource,
    pub matrix: ScoringMatrix,
}

// ----------------------------
// Input collaborators
// ----------------------------

/// One load-test run as produced by the CSV ingestion collaborator.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct RunData {
    pub response_times: Vec<f64>,

    /// Epoch milliseconds, parallel to `response_times`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub timestamps: Vec<f64>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<String>,
}

/// Accepted sample file shapes: a bare array, a single run, or runs keyed by id.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(untagged)]
pub enum SampleSource {
    Values(Vec<f64>),
    Run(RunData),
    DataSet(BTreeMap<String, RunData>),
}

// ----------------------------
// Optional config file schema
// ----------------------------

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Default)]
pub struct ConfigFile {
    #[serde(default)]
    pub defaults: DefaultsConfig,

    #[serde(default)]
    pub distance: DistanceTestConfig,

    #[serde(default)]
    pub divergence: DivergenceTestConfig,

    #[serde(default)]
    pub percentile: PercentileTestConfig,
}

impl ConfigFile {
    pub fn gate_policy(&self) -> GatePolicy {
        GatePolicy {
            warn_rank: self.defaults.warn_rank,
            fail_rank: self.defaults.fail_rank,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(default)]
pub struct DefaultsConfig {
    pub test: TestKind,
    pub warn_rank: LetterRank,
    pub fail_rank: LetterRank,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        let policy = GatePolicy::default();
        Self {
            test: TestKind::Distance,
            warn_rank: policy.warn_rank,
            fail_rank: policy.fail_rank,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(default)]
pub struct DistanceTestConfig {
    pub normalization: Normalization,
    pub trim: TailTrim,
    pub rank_table: RankTable,
    pub matrix: MatrixSource,
}

impl Default for DistanceTestConfig {
    fn default() -> Self {
        Self {
            normalization: Normalization::Max,
            trim: TailTrim::both(),
            rank_table: RankTable::distance_dual(),
            matrix: MatrixSource::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(default)]
pub struct DivergenceTestConfig {
    pub normalization: Normalization,
    pub range: PercentileRange,

    /// Minimum observations per sample; defaults to the number of percentile points.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_samples: Option<usize>,

    pub rank_table: RankTable,
    pub matrix: MatrixSource,
}

impl Default for DivergenceTestConfig {
    fn default() -> Self {
        Self {
            normalization: Normalization::Sum,
            range: PercentileRange::default(),
            min_samples: None,
            rank_table: RankTable::divergence(),
            matrix: MatrixSource::Static(ScoringMatrix::divergence_preset()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(default)]
pub struct PercentileTestConfig {
    pub range: PercentileRange,

    /// Minimum observations per sample; defaults to the number of percentile points.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_samples: Option<usize>,

    pub ladder: PercentileLadder,
    pub pass_threshold: f64,
}

impl Default for PercentileTestConfig {
    fn default() -> Self {
        Self {
            range: PercentileRange::default(),
            min_samples: None,
            ladder: PercentileLadder::fine(),
            pass_threshold: DEFAULT_PERCENTILE_PASS_THRESHOLD,
        }
    }
}
