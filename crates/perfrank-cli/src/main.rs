use anyhow::Context;
use clap::{Parser, Subcommand};
use perfrank_app::{
    ConfigOverrides, EvaluateRequest, EvaluateUseCase, MatrixUseCase, SampleSelector,
    apply_overrides, github_annotations, parse_config, render_markdown, resolve_sample,
};
use perfrank_types::{
    ConfigFile, LetterRank, SampleRef, SampleSource, TestKind, ToolInfo, VerdictReceipt,
    VerdictStatus,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "perfrank",
    version,
    about = "Letter-rank performance regressions between a baseline and a benchmark run"
)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Grade a benchmark sample against a baseline and emit a verdict receipt (JSON).
    Compare {
        /// Baseline samples: a JSON array, a run object, or runs keyed by id
        #[arg(long)]
        baseline: PathBuf,

        /// Benchmark samples, same shapes as --baseline
        #[arg(long)]
        benchmark: PathBuf,

        /// Run id to pick from a multi-run baseline file
        #[arg(long)]
        baseline_run: Option<String>,

        /// Run id to pick from a multi-run benchmark file
        #[arg(long)]
        benchmark_run: Option<String>,

        /// Only grade response times recorded for this action
        #[arg(long)]
        action: Option<String>,

        /// TOML config file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Regression test: distance, divergence or percentile
        #[arg(long)]
        test: Option<TestKind>,

        /// Ranks at or beyond this one warn (S..F)
        #[arg(long)]
        warn_rank: Option<LetterRank>,

        /// Ranks at or beyond this one fail (S..F)
        #[arg(long)]
        fail_rank: Option<LetterRank>,

        /// Treat WARN verdict as a failing exit code
        #[arg(long, default_value_t = false)]
        fail_on_warn: bool,

        /// Output verdict receipt
        #[arg(long, default_value = "perfrank-verdict.json")]
        out: PathBuf,

        /// Pretty-print JSON
        #[arg(long, default_value_t = false)]
        pretty: bool,
    },

    /// Render a Markdown summary from a verdict receipt.
    Md {
        #[arg(long)]
        verdict: PathBuf,

        /// Output markdown path (default: stdout)
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Emit GitHub Actions annotations from a verdict receipt.
    GithubAnnotations {
        #[arg(long)]
        verdict: PathBuf,
    },

    /// Print the scoring matrix a test family would grade with.
    Matrix {
        /// TOML config file
        #[arg(long)]
        config: Option<PathBuf>,

        /// distance or divergence
        #[arg(long, default_value = "distance")]
        family: TestKind,

        /// Output path (default: stdout)
        #[arg(long)]
        out: Option<PathBuf>,

        /// Pretty-print JSON
        #[arg(long, default_value_t = false)]
        pretty: bool,
    },
}

fn main() -> ExitCode {
    init_tracing();
    if let Err(err) = real_main() {
        eprintln!("{err:#}");
        return ExitCode::from(1);
    }
    ExitCode::from(0)
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    // Diagnostics go to stderr; stdout carries JSON and Markdown.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn real_main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.cmd {
        Command::Compare {
            baseline,
            benchmark,
            baseline_run,
            benchmark_run,
            action,
            config,
            test,
            warn_rank,
            fail_rank,
            fail_on_warn,
            out,
            pretty,
        } => {
            let config = apply_overrides(
                load_config(config.as_deref())?,
                &ConfigOverrides {
                    test,
                    warn_rank,
                    fail_rank,
                },
            );

            let baseline_sample = resolve_sample(
                read_json::<SampleSource>(&baseline)?,
                &SampleSelector {
                    run_id: baseline_run,
                    action: action.clone(),
                },
            )
            .with_context(|| format!("select baseline sample from {}", baseline.display()))?;
            let benchmark_sample = resolve_sample(
                read_json::<SampleSource>(&benchmark)?,
                &SampleSelector {
                    run_id: benchmark_run,
                    action,
                },
            )
            .with_context(|| format!("select benchmark sample from {}", benchmark.display()))?;

            debug!(
                baseline = baseline_sample.values.len(),
                benchmark = benchmark_sample.values.len(),
                test = %config.defaults.test,
                "samples loaded"
            );

            let receipt = EvaluateUseCase::execute(EvaluateRequest {
                baseline: baseline_sample.values,
                benchmark: benchmark_sample.values,
                baseline_ref: SampleRef {
                    path: Some(baseline.display().to_string()),
                    run_id: baseline_sample.run_id,
                },
                benchmark_ref: SampleRef {
                    path: Some(benchmark.display().to_string()),
                    run_id: benchmark_sample.run_id,
                },
                test: config.defaults.test,
                policy: config.gate_policy(),
                config,
                tool: tool_info(),
            })?;

            write_json(&out, &receipt, pretty)?;

            match receipt.gate.status {
                VerdictStatus::Pass => Ok(()),
                VerdictStatus::Warn => {
                    if fail_on_warn {
                        std::process::exit(3)
                    } else {
                        Ok(())
                    }
                }
                VerdictStatus::Fail => std::process::exit(2),
            }
        }

        Command::Md { verdict, out } => {
            let receipt: VerdictReceipt = read_json(&verdict)?;
            let md = render_markdown(&receipt);

            match out {
                Some(path) => {
                    fs::write(&path, md).with_context(|| format!("write {}", path.display()))?;
                }
                None => {
                    print!("{md}");
                }
            }

            Ok(())
        }

        Command::GithubAnnotations { verdict } => {
            let receipt: VerdictReceipt = read_json(&verdict)?;
            for line in github_annotations(&receipt) {
                println!("{line}");
            }
            Ok(())
        }

        Command::Matrix {
            config,
            family,
            out,
            pretty,
        } => {
            let config = load_config(config.as_deref())?;
            let receipt = MatrixUseCase::execute(&config, family, tool_info())?;

            match out {
                Some(path) => write_json(&path, &receipt, pretty)?,
                None => {
                    let json = if pretty {
                        serde_json::to_string_pretty(&receipt)?
                    } else {
                        serde_json::to_string(&receipt)?
                    };
                    println!("{json}");
                }
            }
            Ok(())
        }
    }
}

fn tool_info() -> ToolInfo {
    ToolInfo {
        name: "perfrank".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<ConfigFile> {
    let Some(path) = path else {
        return Ok(ConfigFile::default());
    };
    let text = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    parse_config(&text).with_context(|| format!("load config {}", path.display()))
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let bytes = fs::read(path).with_context(|| format!("read {}", path.display()))?;
    let v =
        serde_json::from_slice(&bytes).with_context(|| format!("parse json {}", path.display()))?;
    Ok(v)
}

fn write_json<T: serde::Serialize>(path: &Path, value: &T, pretty: bool) -> anyhow::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).with_context(|| format!("create dir {}", parent.display()))?;
    }

    let bytes = if pretty {
        serde_json::to_vec_pretty(value)?
    } else {
        serde_json::to_vec(value)?
    };

    atomic_write(path, &bytes)
}

fn atomic_write(path: &Path, bytes: &[u8]) -> anyhow::Result<()> {
    use std::io::Write;

    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let tmp = parent.join(format!(".{}.tmp", uuid::Uuid::new_v4()));

    {
        let mut f =
            fs::File::create(&tmp).with_context(|| format!("create temp {}", tmp.display()))?;
        f.write_all(bytes)
            .with_context(|| format!("write temp {}", tmp.display()))?;
        f.sync_all().ok();
    }

    fs::rename(&tmp, path)
        .with_context(|| format!("rename {} -> {}", tmp.display(), path.display()))?;
    Ok(())
}
