//! Application layer for perfrank.
//!
//! The app layer coordinates input resolution, grading and gate policy.
//! It does not parse CLI flags and it does not do filesystem I/O.

mod input;
mod render;

pub use input::{ResolvedSample, SampleSelector, resolve_sample};
pub use render::{format_rank, format_score, github_annotations, render_markdown};

use anyhow::Context;
use perfrank_domain::{build_regression_test, gate_verdict};
use perfrank_matrix::resolve_matrix;
use perfrank_stats::summarize;
use perfrank_types::{
    ConfigFile, GatePolicy, LetterRank, MatrixReceipt, SampleRef, TestKind, ToolInfo,
    VerdictReceipt,
};
use tracing::info;

#[derive(Debug, Clone)]
pub struct EvaluateRequest {
    pub baseline: Vec<f64>,
    pub benchmark: Vec<f64>,
    pub baseline_ref: SampleRef,
    pub benchmark_ref: SampleRef,
    pub test: TestKind,
    pub config: ConfigFile,
    pub policy: GatePolicy,
    pub tool: ToolInfo,
}

pub struct EvaluateUseCase;

impl EvaluateUseCase {
    pub fn execute(req: EvaluateRequest) -> anyhow::Result<VerdictReceipt> {
        let test = build_regression_test(req.test, &req.config)
            .with_context(|| format!("configure {} test", req.test))?;
        let verdict = test
            .evaluate(&req.baseline, &req.benchmark)
            .with_context(|| format!("evaluate {} test", req.test))?;
        let gate = gate_verdict(&verdict, &req.policy)?;

        let baseline_summary = summarize(&req.baseline).context("summarize baseline")?;
        let benchmark_summary = summarize(&req.benchmark).context("summarize benchmark")?;

        info!(
            test = %req.test,
            score = verdict.score,
            rank = %format_rank(verdict.rank),
            status = ?gate.status,
            "verdict produced"
        );

        Ok(VerdictReceipt {
            schema: perfrank_types::VERDICT_SCHEMA_V1.to_string(),
            tool: req.tool,
            baseline_ref: req.baseline_ref,
            benchmark_ref: req.benchmark_ref,
            baseline_summary,
            benchmark_summary,
            verdict,
            gate,
        })
    }
}

pub struct MatrixUseCase;

impl MatrixUseCase {
    /// Resolves the scoring matrix the given family would grade with.
    pub fn execute(
        config: &ConfigFile,
        family: TestKind,
        tool: ToolInfo,
    ) -> anyhow::Result<MatrixReceipt> {
        let source = match family {
            TestKind::Distance => config.distance.matrix.clone(),
            TestKind::Divergence => config.divergence.matrix.clone(),
            TestKind::Percentile => {
                anyhow::bail!("the percentile test scores with a ladder, not a matrix")
            }
        };
        let matrix = resolve_matrix(&source)
            .with_context(|| format!("resolve {family} scoring matrix"))?;

        Ok(MatrixReceipt {
            schema: perfrank_types::MATRIX_SCHEMA_V1.to_string(),
            tool,
            family,
            source,
            matrix,
        })
    }
}

// ----------------------------
// Configuration
// ----------------------------

/// Command-line values that take precedence over the config file.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub test: Option<TestKind>,
    pub warn_rank: Option<LetterRank>,
    pub fail_rank: Option<LetterRank>,
}

/// Parses a TOML config and checks that every test it configures can be built.
pub fn parse_config(text: &str) -> anyhow::Result<ConfigFile> {
    let config: ConfigFile = toml::from_str(text).context("parse perfrank config")?;
    validate_config(&config)?;
    Ok(config)
}

pub fn validate_config(config: &ConfigFile) -> anyhow::Result<()> {
    for kind in [TestKind::Distance, TestKind::Divergence, TestKind::Percentile] {
        build_regression_test(kind, config).with_context(|| format!("invalid [{kind}] config"))?;
    }
    let policy = config.gate_policy();
    if policy.warn_rank > policy.fail_rank {
        anyhow::bail!(
            "invalid [defaults]: warn_rank {} is worse than fail_rank {}",
            policy.warn_rank,
            policy.fail_rank
        );
    }
    Ok(())
}

pub fn apply_overrides(mut config: ConfigFile, overrides: &ConfigOverrides) -> ConfigFile {
    if let Some(test) = overrides.test {
        config.defaults.test = test;
    }
    if let Some(rank) = overrides.warn_rank {
        config.defaults.warn_rank = rank;
    }
    if let Some(rank) = overrides.fail_rank {
        config.defaults.fail_rank = rank;
    }
    config
}
