//! Markdown and GitHub Actions renderings of a verdict receipt.

use perfrank_types::{LetterRank, SampleSummary, VerdictReceipt, VerdictStatus};

pub fn render_markdown(receipt: &VerdictReceipt) -> String {
    let mut out = String::new();

    let header = match receipt.gate.status {
        VerdictStatus::Pass => "✅ perfrank: pass",
        VerdictStatus::Warn => "⚠️ perfrank: warn",
        VerdictStatus::Fail => "❌ perfrank: fail",
    };
    out.push_str(header);
    out.push_str("\n\n");

    let verdict = &receipt.verdict;
    out.push_str(&format!(
        "**Test:** `{}` | **Score:** {} | **Rank:** {}",
        verdict.test,
        format_score(verdict.score),
        format_rank(verdict.rank)
    ));
    if let Some(rank) = verdict.rank {
        out.push_str(&format!(" | **Action:** {}", rank.action()));
    }
    if let Some(passed) = verdict.passed {
        out.push_str(if passed {
            " | **Result:** accepted"
        } else {
            " | **Result:** rejected"
        });
    }
    out.push_str("\n\n");

    let d = &verdict.distances;
    out.push_str("| statistic | value |\n");
    out.push_str("|---|---:|\n");
    out.push_str(&format!("| KS distance | {:.3} |\n", d.ks_distance));
    out.push_str(&format!("| KS p-value | {:.4} |\n", d.ks_pvalue));
    out.push_str(&format!(
        "| KS critical value (α=0.05) | {:.3} |\n",
        d.ks_critical_value
    ));
    out.push_str(&format!(
        "| Wasserstein distance | {:.3} |\n",
        d.wasserstein_distance
    ));
    if let Some(div) = &verdict.divergence {
        out.push_str(&format!("| divergence c-value | {:.4} |\n", div.c_value));
        if div.sentinel_bands > 0 {
            out.push_str(&format!(
                "| undefined bands | {} of {} |\n",
                div.sentinel_bands,
                div.bands.len()
            ));
        }
    }
    if let Some(p) = &verdict.percentiles {
        out.push_str(&format!(
            "| probability value | {:.3} |\n",
            p.probability_value
        ));
        if let Some(worst) = p
            .changes
            .iter()
            .copied()
            .max_by(|a, b| a.abs().total_cmp(&b.abs()))
        {
            out.push_str(&format!("| largest percentile change | {} |\n", format_pct(worst)));
        }
    }

    out.push_str("\n| sample | count | mean | median | min | max | std dev | p95 | outliers |\n");
    out.push_str("|---|---:|---:|---:|---:|---:|---:|---:|---:|\n");
    out.push_str(&summary_row("baseline", &receipt.baseline_summary));
    out.push_str(&summary_row("benchmark", &receipt.benchmark_summary));

    if !receipt.gate.reasons.is_empty() {
        out.push_str("\n**Notes:**\n");
        for r in &receipt.gate.reasons {
            out.push_str(&format!("- {}\n", r));
        }
    }

    out
}

pub fn github_annotations(receipt: &VerdictReceipt) -> Vec<String> {
    let prefix = match receipt.gate.status {
        VerdictStatus::Fail => "::error",
        VerdictStatus::Warn => "::warning",
        VerdictStatus::Pass => return Vec::new(),
    };

    receipt
        .gate
        .reasons
        .iter()
        .map(|reason| format!("{prefix}::perfrank {reason}"))
        .collect()
}

fn summary_row(label: &str, s: &SampleSummary) -> String {
    format!(
        "| {label} | {} | {:.2} | {:.2} | {:.2} | {:.2} | {:.2} | {:.2} | {} |\n",
        s.count, s.mean, s.median, s.min, s.max, s.std_dev, s.p95, s.outliers
    )
}

pub fn format_score(score: f64) -> String {
    format!("{score:.2}")
}

pub fn format_rank(rank: Option<LetterRank>) -> String {
    rank.map_or_else(|| "-".to_string(), |r| r.to_string())
}

fn format_pct(pct: f64) -> String {
    let sign = if pct > 0.0 { "+" } else { "" };
    format!("{}{:.2}%", sign, pct)
}
