//! BDD test runner using cucumber for perfrank.
//!
//! Executes the Gherkin feature files in `features/`.
//!
//! Step definitions cover:
//! - Given steps: sample fixtures (ramps, seeded uniform samples, scaled copies)
//! - When steps: library grading or CLI command execution
//! - Then steps: rank, score, gate status, exit code and output assertions

use assert_cmd::Command;
use cucumber::{World, given, then, when};
use perfrank_domain::build_regression_test;
use perfrank_fake::{ScenarioGenerator, linear_ramp, scale_uniformly};
use perfrank_types::{ConfigFile, RegressionVerdict, TestKind, VerdictReceipt, VerdictStatus};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// World struct that holds state across BDD scenario steps.
#[derive(Debug, Default, World)]
pub struct PerfrankWorld {
    /// Temporary directory for test artifacts
    temp_dir: Option<TempDir>,
    baseline: Vec<f64>,
    benchmark: Vec<f64>,
    /// Generator behind the seeded sample steps
    generator: Option<ScenarioGenerator>,
    /// Verdict receipt written by the last compare
    verdict_path: Option<PathBuf>,
    /// Graded verdict from the library or the last receipt
    verdict: Option<RegressionVerdict>,
    gate_status: Option<VerdictStatus>,
    last_exit_code: Option<i32>,
    last_stdout: String,
    last_stderr: String,
    /// Additional CLI arguments to pass
    extra_args: Vec<String>,
}

impl PerfrankWorld {
    pub fn ensure_temp_dir(&mut self) {
        if self.temp_dir.is_none() {
            self.temp_dir = Some(TempDir::new().expect("Failed to create temp directory"));
        }
    }

    pub fn temp_path(&self) -> PathBuf {
        self.temp_dir
            .as_ref()
            .expect("Temp dir not initialized")
            .path()
            .to_path_buf()
    }

    fn write_sample(&mut self, name: &str, values: &[f64]) -> PathBuf {
        self.ensure_temp_dir();
        let path = self.temp_path().join(name);
        let json = serde_json::to_string(values).expect("Failed to serialize sample");
        fs::write(&path, json).expect("Failed to write sample");
        path
    }

    fn verdict(&self) -> &RegressionVerdict {
        self.verdict.as_ref().expect("No verdict recorded")
    }

    fn record_output(&mut self, output: std::process::Output) {
        self.last_exit_code = output.status.code();
        self.last_stdout = String::from_utf8_lossy(&output.stdout).to_string();
        self.last_stderr = String::from_utf8_lossy(&output.stderr).to_string();
    }
}

fn parse_kind(kind: &str) -> TestKind {
    kind.parse().expect("Unknown test kind in feature file")
}

// ============================================================================
// GIVEN STEPS - Sample fixtures
// ============================================================================

#[given("a temporary directory for test artifacts")]
async fn given_temp_directory(world: &mut PerfrankWorld) {
    world.ensure_temp_dir();
}

#[given(expr = "a baseline ramp of {int} values")]
async fn given_baseline_ramp(world: &mut PerfrankWorld, n: usize) {
    world.baseline = linear_ramp(n);
}

#[given(expr = "a uniform baseline of {int} values with seed {int}")]
async fn given_uniform_baseline(world: &mut PerfrankWorld, n: usize, seed: u64) {
    let mut generator = ScenarioGenerator::new(seed);
    world.baseline = generator.uniform(n, 50.0, 100.0);
    world.generator = Some(generator);
}

#[given("a benchmark equal to the baseline")]
async fn given_benchmark_equal(world: &mut PerfrankWorld) {
    world.benchmark = world.baseline.clone();
}

#[given(expr = "a benchmark scaled by {float}")]
async fn given_benchmark_scaled(world: &mut PerfrankWorld, factor: f64) {
    world.benchmark = scale_uniformly(&world.baseline, factor);
}

#[given("a benchmark with one random point doubled")]
async fn given_benchmark_doubled_point(world: &mut PerfrankWorld) {
    let generator = world
        .generator
        .get_or_insert_with(|| ScenarioGenerator::new(1996));
    let (benchmark, _) = generator.double_random_point(&world.baseline);
    world.benchmark = benchmark;
}

#[given(expr = "the gate warns at {word} and fails at {word}")]
async fn given_gate_policy(world: &mut PerfrankWorld, warn: String, fail: String) {
    world.extra_args.extend([
        "--warn-rank".to_string(),
        warn,
        "--fail-rank".to_string(),
        fail,
    ]);
}

#[given("the --fail-on-warn flag is set")]
async fn given_fail_on_warn_flag(world: &mut PerfrankWorld) {
    world.extra_args.push("--fail-on-warn".to_string());
}

// ============================================================================
// WHEN STEPS - Grading
// ============================================================================

#[when(expr = "I grade the samples with the {word} test")]
async fn when_grade_library(world: &mut PerfrankWorld, kind: String) {
    let test = build_regression_test(parse_kind(&kind), &ConfigFile::default())
        .expect("Default config should build every test");
    let verdict = test
        .evaluate(&world.baseline, &world.benchmark)
        .expect("Grading should succeed");
    world.verdict = Some(verdict);
}

#[allow(deprecated)]
fn perfrank_cmd() -> Command {
    Command::cargo_bin("perfrank").expect("Failed to find perfrank binary")
}

#[when(expr = "I run perfrank compare with the {word} test")]
async fn when_compare(world: &mut PerfrankWorld, kind: String) {
    let baseline = world.baseline.clone();
    let benchmark = world.benchmark.clone();
    let baseline_path = world.write_sample("baseline.json", &baseline);
    let benchmark_path = world.write_sample("benchmark.json", &benchmark);
    let verdict_path = world.temp_path().join("verdict.json");

    let output = perfrank_cmd()
        .arg("compare")
        .arg("--baseline")
        .arg(&baseline_path)
        .arg("--benchmark")
        .arg(&benchmark_path)
        .arg("--test")
        .arg(&kind)
        .arg("--out")
        .arg(&verdict_path)
        .args(&world.extra_args)
        .output()
        .expect("Failed to execute perfrank compare");
    world.record_output(output);

    if verdict_path.exists() {
        let content = fs::read_to_string(&verdict_path).expect("Failed to read verdict");
        let receipt: VerdictReceipt =
            serde_json::from_str(&content).expect("Failed to parse verdict receipt");
        world.verdict = Some(receipt.verdict);
        world.gate_status = Some(receipt.gate.status);
    }
    world.verdict_path = Some(verdict_path);
}

#[when("I run perfrank md")]
async fn when_md(world: &mut PerfrankWorld) {
    let verdict = world.verdict_path.clone().expect("Verdict path not set");
    let output = perfrank_cmd()
        .arg("md")
        .arg("--verdict")
        .arg(&verdict)
        .output()
        .expect("Failed to execute perfrank md");
    world.record_output(output);
}

#[when("I run perfrank github-annotations")]
async fn when_annotations(world: &mut PerfrankWorld) {
    let verdict = world.verdict_path.clone().expect("Verdict path not set");
    let output = perfrank_cmd()
        .arg("github-annotations")
        .arg("--verdict")
        .arg(&verdict)
        .output()
        .expect("Failed to execute perfrank github-annotations");
    world.record_output(output);
}

// ============================================================================
// THEN STEPS - Assertions
// ============================================================================

#[then(expr = "the rank should be {word}")]
async fn then_rank(world: &mut PerfrankWorld, expected: String) {
    let rank = world.verdict().rank.expect("Verdict carries no rank");
    assert_eq!(rank.as_str(), expected, "verdict: {:?}", world.verdict);
}

#[then(expr = "the rank should be {word} or {word}")]
async fn then_rank_either(world: &mut PerfrankWorld, first: String, second: String) {
    let rank = world.verdict().rank.expect("Verdict carries no rank");
    assert!(
        rank.as_str() == first || rank.as_str() == second,
        "Expected rank {first} or {second}, got {rank}"
    );
}

#[then(expr = "the score should be {float}")]
async fn then_score(world: &mut PerfrankWorld, expected: f64) {
    assert_eq!(world.verdict().score, expected);
}

#[then(expr = "the KS distance should be {float}")]
async fn then_ks(world: &mut PerfrankWorld, expected: f64) {
    assert_eq!(world.verdict().distances.ks_distance, expected);
}

#[then(expr = "the Wasserstein distance should be {float}")]
async fn then_wasserstein(world: &mut PerfrankWorld, expected: f64) {
    assert_eq!(world.verdict().distances.wasserstein_distance, expected);
}

#[then(expr = "the percentile test should be {word}")]
async fn then_percentile_result(world: &mut PerfrankWorld, expected: String) {
    let passed = world.verdict().passed.expect("Not a percentile verdict");
    let actual = if passed { "accepted" } else { "rejected" };
    assert_eq!(actual, expected);
}

#[then(expr = "the exit code should be {int}")]
async fn then_exit_code(world: &mut PerfrankWorld, expected: i32) {
    let actual = world.last_exit_code.expect("No exit code recorded");
    assert_eq!(
        actual, expected,
        "Expected exit code {}, got {}. Stderr: {}",
        expected, actual, world.last_stderr
    );
}

#[then(expr = "the verdict should be {word}")]
async fn then_verdict(world: &mut PerfrankWorld, expected: String) {
    let actual = match world.gate_status.expect("No gate status recorded") {
        VerdictStatus::Pass => "pass",
        VerdictStatus::Warn => "warn",
        VerdictStatus::Fail => "fail",
    };
    assert_eq!(actual, expected.to_lowercase());
}

#[then(expr = "the stdout should contain {string}")]
async fn then_stdout_contains(world: &mut PerfrankWorld, expected: String) {
    assert!(
        world.last_stdout.contains(&expected),
        "Expected stdout to contain '{}', got: {}",
        expected,
        world.last_stdout
    );
}

#[then(expr = "the stderr should contain {string}")]
async fn then_stderr_contains(world: &mut PerfrankWorld, expected: String) {
    assert!(
        world.last_stderr.contains(&expected),
        "Expected stderr to contain '{}', got: {}",
        expected,
        world.last_stderr
    );
}

#[then("the stdout should be empty")]
async fn then_stdout_empty(world: &mut PerfrankWorld) {
    assert!(
        world.last_stdout.trim().is_empty(),
        "Expected stdout to be empty, got: {}",
        world.last_stdout
    );
}

// ============================================================================
// MAIN FUNCTION
// ============================================================================

#[tokio::main]
async fn main() {
    PerfrankWorld::cucumber().run_and_exit("features/").await;
}
