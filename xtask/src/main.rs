use anyhow::Context;
use clap::{Parser, Subcommand};
use perfrank_fake::{Scenario, ScenarioGenerator, Shift};
use schemars::schema_for;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Parser)]
#[command(name = "xtask", about = "Repo automation for perfrank")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// (Re)generate JSON Schemas for receipts, sample files and config.
    Schema {
        /// Output directory
        #[arg(long, default_value = "schemas")]
        out_dir: PathBuf,
    },

    /// Write the seeded synthetic scenarios as baseline/benchmark sample files.
    Scenarios {
        /// Output directory
        #[arg(long, default_value = "target/scenarios")]
        out_dir: PathBuf,

        #[arg(long, default_value_t = perfrank_types::DEFAULT_MATRIX_SEED)]
        seed: u64,

        /// Measurements per sample
        #[arg(long, default_value_t = 1000)]
        size: usize,
    },

    /// Run the "usual" repo checks (fmt, clippy, test, schema).
    Ci,

    /// Run mutation testing via cargo-mutants (must be installed).
    Mutants {
        /// Extra args forwarded to cargo-mutants
        #[arg(trailing_var_arg = true)]
        args: Vec<String>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.cmd {
        Command::Schema { out_dir } => cmd_schema(&out_dir),
        Command::Scenarios {
            out_dir,
            seed,
            size,
        } => cmd_scenarios(&out_dir, seed, size),
        Command::Ci => cmd_ci(),
        Command::Mutants { args } => cmd_mutants(args),
    }
}

fn cmd_ci() -> anyhow::Result<()> {
    run("cargo", ["fmt", "--all", "--", "--check"])?;
    run(
        "cargo",
        ["clippy", "--all-targets", "--all-features", "--", "-D", "warnings"],
    )?;
    run("cargo", ["test", "--workspace"])?;
    run("cargo", ["run", "-p", "xtask", "--", "schema"])?;
    Ok(())
}

fn cmd_mutants(args: Vec<String>) -> anyhow::Result<()> {
    // `cargo install cargo-mutants` first.
    let mut cmd = std::process::Command::new("cargo");
    cmd.arg("mutants");
    for a in args {
        cmd.arg(a);
    }
    let status = cmd.status().context("running cargo mutants")?;
    if !status.success() {
        anyhow::bail!("cargo mutants failed: {status}");
    }
    Ok(())
}

fn run<const N: usize>(bin: &str, args: [&str; N]) -> anyhow::Result<()> {
    let status = std::process::Command::new(bin)
        .args(args)
        .status()
        .with_context(|| format!("running {bin}"))?;
    if !status.success() {
        anyhow::bail!("{bin} failed: {status}");
    }
    Ok(())
}

fn cmd_schema(out_dir: &Path) -> anyhow::Result<()> {
    fs::create_dir_all(out_dir).with_context(|| format!("create dir {}", out_dir.display()))?;

    write_schema(
        out_dir,
        "perfrank.verdict.v1.schema.json",
        schema_for!(perfrank_types::VerdictReceipt),
    )?;

    write_schema(
        out_dir,
        "perfrank.matrix.v1.schema.json",
        schema_for!(perfrank_types::MatrixReceipt),
    )?;

    write_schema(
        out_dir,
        "perfrank.samples.v1.schema.json",
        schema_for!(perfrank_types::SampleSource),
    )?;

    write_schema(
        out_dir,
        "perfrank.config.v1.schema.json",
        schema_for!(perfrank_types::ConfigFile),
    )?;

    println!("wrote 4 schemas to {}", out_dir.display());
    Ok(())
}

fn cmd_scenarios(out_dir: &Path, seed: u64, size: usize) -> anyhow::Result<()> {
    fs::create_dir_all(out_dir).with_context(|| format!("create dir {}", out_dir.display()))?;

    let mut generator = ScenarioGenerator::new(seed);
    let mut scenarios = generator.standard_scenarios(size);

    let baseline = generator.sample(size, &Shift::None);
    scenarios.push(Scenario {
        name: "random_slowdown_20_30pct".into(),
        benchmark: generator.sample(size, &Shift::Increase(20..=30)),
        baseline: baseline.clone(),
    });
    scenarios.push(Scenario {
        name: "one_percent_perturbed".into(),
        benchmark: generator.perturb_fraction(&baseline, 1.0, 5.0, true),
        baseline,
    });

    for scenario in &scenarios {
        for (side, values) in [
            ("baseline", &scenario.baseline),
            ("benchmark", &scenario.benchmark),
        ] {
            let path = out_dir.join(format!("{}.{side}.json", scenario.name));
            let json = serde_json::to_vec(values)?;
            fs::write(&path, json).with_context(|| format!("write {}", path.display()))?;
        }
    }

    println!(
        "wrote {} scenarios (seed {seed}) to {}",
        scenarios.len(),
        out_dir.display()
    );
    Ok(())
}

fn write_schema<T: serde::Serialize>(out_dir: &Path, name: &str, schema: T) -> anyhow::Result<()> {
    let path = out_dir.join(name);
    let json = serde_json::to_vec_pretty(&schema)?;
    fs::write(&path, json).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}
