use perfrank_error::{PerfrankError, Result};
use perfrank_types::{GatePolicy, GateVerdict, RegressionVerdict, VerdictStatus};

/// Maps a graded verdict onto pass / warn / fail.
///
/// Ranked tests compare the letter rank against the policy thresholds; the
/// percentile test fails exactly when it was rejected.
pub fn gate_verdict(verdict: &RegressionVerdict, policy: &GatePolicy) -> Result<GateVerdict> {
    if policy.warn_rank > policy.fail_rank {
        return Err(PerfrankError::configuration(format!(
            "warn rank {} must not be worse than fail rank {}",
            policy.warn_rank, policy.fail_rank
        )));
    }

    let mut status = VerdictStatus::Pass;
    let mut reasons = Vec::new();

    if let Some(rank) = verdict.rank {
        if rank >= policy.fail_rank {
            status = VerdictStatus::Fail;
            reasons.push(format!(
                "{} test ranked {rank} (fail at {}), score {:.2}",
                verdict.test, policy.fail_rank, verdict.score
            ));
        } else if rank >= policy.warn_rank {
            status = VerdictStatus::Warn;
            reasons.push(format!(
                "{} test ranked {rank} (warn at {}), score {:.2}",
                verdict.test, policy.warn_rank, verdict.score
            ));
        }
    }

    if verdict.passed == Some(false) {
        status = VerdictStatus::Fail;
        let probability = verdict
            .percentiles
            .as_ref()
            .map(|p| p.probability_value)
            .unwrap_or(f64::NAN);
        reasons.push(format!(
            "{} test rejected: probability value {probability:.3}",
            verdict.test
        ));
    }

    Ok(GateVerdict { status, reasons })
}
