use perfrank_error::{PerfrankError, Result};
use perfrank_stats::{mean, percentage_change, round_to, std_dev};
use perfrank_types::{
    LadderStep, LetterRank, PercentileLadder, PercentileReport, RankTable, ScoringMatrix,
};

/// Which boundary column of a table an observation is compared against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// `boundary_a`, the primary statistic.
    A,
    /// `boundary_b`, the secondary statistic of a dual table.
    B,
}

/// Raw statistic(s) to be ranked.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Observation {
    Single(f64),
    /// `(axis a, axis b)`, e.g. `(ks, wasserstein)`.
    Dual(f64, f64),
}

/// Sum of every punishment whose boundary is `<=` the observed value.
pub fn punishment_total(observed: f64, matrix: &ScoringMatrix, axis: Axis) -> Result<f64> {
    if axis == Axis::B && !matrix.is_dual() {
        return Err(PerfrankError::configuration(
            "secondary axis requested from a single-axis scoring matrix",
        ));
    }
    Ok(matrix
        .entries
        .iter()
        .filter(|e| {
            let boundary = match axis {
                Axis::A => Some(e.boundary_a),
                Axis::B => e.boundary_b,
            };
            boundary.is_some_and(|b| observed >= b)
        })
        .map(|e| e.punishment)
        .sum())
}

/// `1 - punishment_total`; unbounded below when punishments sum past one.
pub fn raw_matrix_score(observed: f64, matrix: &ScoringMatrix, axis: Axis) -> Result<f64> {
    Ok(1.0 - punishment_total(observed, matrix, axis)?)
}

/// Scores never report exactly zero.
fn floor_zero(score: f64) -> f64 {
    if score == 0.0 { 1.0 } else { score }
}

/// Matrix score on a 0..=100 scale, rounded to 2 decimals; 0 becomes 1.
pub fn score_from_matrix(observed: f64, matrix: &ScoringMatrix, axis: Axis) -> Result<f64> {
    let raw = raw_matrix_score(observed, matrix, axis)?;
    Ok(floor_zero(round_to(raw.clamp(0.0, 1.0) * 100.0, 2)))
}

/// Average of two raw matrix scores on a 0..=100 scale; 0 becomes 1.
pub fn combined_score(ks_raw: f64, ws_raw: f64) -> f64 {
    let avg = (ks_raw.clamp(0.0, 1.0) + ws_raw.clamp(0.0, 1.0)) / 2.0;
    floor_zero(round_to(avg * 100.0, 2).abs())
}

/// First rank whose boundary the observation is strictly below; `F` otherwise.
pub fn letter_rank(table: &RankTable, observation: Observation) -> Result<LetterRank> {
    let hit = match (table.is_dual(), observation) {
        (false, Observation::Single(v)) => table.entries.iter().find(|e| v < e.boundary_a),
        (true, Observation::Dual(a, b)) => table
            .entries
            .iter()
            .find(|e| a < e.boundary_a && e.boundary_b.is_some_and(|bb| b < bb)),
        (dual, _) => {
            return Err(PerfrankError::configuration(format!(
                "a {} rank table cannot rank a {} observation",
                if dual { "dual" } else { "single-axis" },
                if dual { "single" } else { "dual" },
            )));
        }
    };
    Ok(hit.map_or(LetterRank::F, |e| e.rank))
}

fn ladder_punishment(steps: &[LadderStep], magnitude: f64, strict: bool) -> f64 {
    steps
        .iter()
        .filter(|s| {
            if strict {
                magnitude > s.threshold
            } else {
                magnitude >= s.threshold
            }
        })
        .map(|s| s.punishment)
        .sum()
}

/// Per-percentile relative change graded against a punishment ladder.
///
/// Returns the report and whether `probability_value >= pass_threshold`.
pub fn percentile_regression_test(
    baseline_curve: &[f64],
    benchmark_curve: &[f64],
    percentiles: &[f64],
    ladder: &PercentileLadder,
    pass_threshold: f64,
) -> Result<(PercentileReport, bool)> {
    if baseline_curve.len() != benchmark_curve.len() || baseline_curve.len() != percentiles.len()
    {
        return Err(PerfrankError::invalid_sample(format!(
            "percentile curves must align: {} baseline, {} benchmark, {} cut points",
            baseline_curve.len(),
            benchmark_curve.len(),
            percentiles.len()
        )));
    }

    let changes: Vec<f64> = baseline_curve
        .iter()
        .zip(benchmark_curve)
        .map(|(&a, &b)| round_to(percentage_change(a, b), 2))
        .collect();

    let scores: Vec<f64> = changes
        .iter()
        .map(|&c| {
            let punished = if c > 0.0 {
                ladder_punishment(&ladder.positive, c, ladder.strict)
            } else if c < 0.0 {
                ladder_punishment(&ladder.negative, -c, ladder.strict)
            } else {
                0.0
            };
            1.0 - punished
        })
        .collect();

    let probability_value = mean(&scores)? - std_dev(&scores)?;
    let passed = probability_value >= pass_threshold;

    Ok((
        PercentileReport {
            percentiles: percentiles.to_vec(),
            changes,
            scores,
            probability_value,
        },
        passed,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use perfrank_types::DEFAULT_PERCENTILE_PASS_THRESHOLD;

    fn simple_matrix() -> ScoringMatrix {
        ScoringMatrix::single(&[(0.1, 0.25), (0.2, 0.25), (0.3, 0.5)])
    }

    #[test]
    fn punishments_accumulate_at_boundaries() {
        let m = simple_matrix();
        assert_eq!(punishment_total(0.05, &m, Axis::A).unwrap(), 0.0);
        assert_eq!(punishment_total(0.1, &m, Axis::A).unwrap(), 0.25);
        assert_eq!(punishment_total(0.25, &m, Axis::A).unwrap(), 0.5);
        assert_eq!(punishment_total(9.0, &m, Axis::A).unwrap(), 1.0);
    }

    #[test]
    fn score_from_matrix_floors_at_one() {
        let m = simple_matrix();
        assert_eq!(score_from_matrix(0.0, &m, Axis::A).unwrap(), 100.0);
        assert_eq!(score_from_matrix(0.2, &m, Axis::A).unwrap(), 50.0);
        assert_eq!(score_from_matrix(0.3, &m, Axis::A).unwrap(), 1.0);
    }

    #[test]
    fn over_punishing_matrix_clamps_instead_of_going_negative() {
        let m = ScoringMatrix::single(&[(0.1, 0.8), (0.2, 0.8)]);
        assert_relative_eq!(raw_matrix_score(0.5, &m, Axis::A).unwrap(), -0.6, epsilon = 1e-12);
        assert_eq!(score_from_matrix(0.5, &m, Axis::A).unwrap(), 1.0);
        assert_eq!(combined_score(-0.6, -0.6), 1.0);
    }

    #[test]
    fn secondary_axis_needs_a_dual_matrix() {
        let err = punishment_total(0.1, &simple_matrix(), Axis::B).unwrap_err();
        assert!(matches!(err, PerfrankError::Configuration(_)));

        let dual = ScoringMatrix::dual(&[(0.06, 0.03, 0.5), (0.07, 0.04, 0.5)]);
        assert_eq!(punishment_total(0.035, &dual, Axis::B).unwrap(), 0.5);
        assert_eq!(punishment_total(0.035, &dual, Axis::A).unwrap(), 0.0);
    }

    #[test]
    fn combined_score_averages() {
        assert_eq!(combined_score(1.0, 1.0), 100.0);
        assert_eq!(combined_score(1.0, 0.5), 75.0);
        assert_eq!(combined_score(0.0, 0.0), 1.0);
        assert_eq!(combined_score(0.123456, 0.0), 6.17);
    }

    #[test]
    fn dual_rank_requires_both_axes_below() {
        let t = RankTable::distance_dual();
        assert_eq!(letter_rank(&t, Observation::Dual(0.0, 0.0)).unwrap(), LetterRank::S);
        // KS fine, Wasserstein at S boundary => A
        assert_eq!(letter_rank(&t, Observation::Dual(0.01, 0.02)).unwrap(), LetterRank::A);
        assert_eq!(letter_rank(&t, Observation::Dual(0.085, 0.01)).unwrap(), LetterRank::C);
        assert_eq!(letter_rank(&t, Observation::Dual(0.149, 0.124)).unwrap(), LetterRank::F);
        assert_eq!(letter_rank(&t, Observation::Dual(0.5, 0.0)).unwrap(), LetterRank::F);
    }

    #[test]
    fn single_rank_uses_first_boundary_above() {
        let t = RankTable::distance_ks_only();
        assert_eq!(letter_rank(&t, Observation::Single(0.0)).unwrap(), LetterRank::S);
        assert_eq!(letter_rank(&t, Observation::Single(0.02)).unwrap(), LetterRank::A);
        assert_eq!(letter_rank(&t, Observation::Single(0.119)).unwrap(), LetterRank::E);
        assert_eq!(letter_rank(&t, Observation::Single(1.0)).unwrap(), LetterRank::F);
    }

    #[test]
    fn rank_arity_mismatch_is_configuration_error() {
        let err =
            letter_rank(&RankTable::divergence(), Observation::Dual(0.0, 0.0)).unwrap_err();
        assert!(matches!(err, PerfrankError::Configuration(_)));
        assert!(letter_rank(&RankTable::distance_dual(), Observation::Single(0.0)).is_err());
    }

    #[test]
    fn unchanged_percentiles_pass() {
        let curve = [10.0, 20.0, 30.0];
        let (report, passed) = percentile_regression_test(
            &curve,
            &curve,
            &[5.0, 50.0, 95.0],
            &PercentileLadder::fine(),
            DEFAULT_PERCENTILE_PASS_THRESHOLD,
        )
        .unwrap();
        assert!(passed);
        assert_eq!(report.probability_value, 1.0);
        assert_eq!(report.changes, vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn fine_ladder_punishes_both_directions() {
        let base = [100.0, 100.0];
        let (report, _) = percentile_regression_test(
            &base,
            &[103.0, 97.0],
            &[25.0, 75.0],
            &PercentileLadder::fine(),
            0.9,
        )
        .unwrap();
        // 0.01 + 0.02 + 0.04 + 0.08 on each side
        assert_relative_eq!(report.scores[0], 0.85, epsilon = 1e-12);
        assert_relative_eq!(report.scores[1], 0.85, epsilon = 1e-12);
    }

    #[test]
    fn coarse_ladder_is_asymmetric() {
        let base = [100.0, 100.0];
        let (report, passed) = percentile_regression_test(
            &base,
            &[125.0, 84.0],
            &[25.0, 75.0],
            &PercentileLadder::coarse(),
            0.9,
        )
        .unwrap();
        assert_relative_eq!(report.scores[0], 0.8, epsilon = 1e-12);
        assert_relative_eq!(report.scores[1], 0.4, epsilon = 1e-12);
        assert!(!passed);
    }

    #[test]
    fn ladder_thresholds_are_strict_only_when_asked() {
        let base = [100.0, 100.0];
        let changed = [120.0, 90.0];
        let cut_points = [25.0, 75.0];

        // Coarse: exactly +20% and -10% sit on a threshold and go unpunished.
        let (coarse, passed) = percentile_regression_test(
            &base,
            &changed,
            &cut_points,
            &PercentileLadder::coarse(),
            0.9,
        )
        .unwrap();
        assert_eq!(coarse.changes, vec![20.0, -10.0]);
        assert_eq!(coarse.scores, vec![1.0, 1.0]);
        assert!(passed);

        let inclusive = PercentileLadder {
            strict: false,
            ..PercentileLadder::coarse()
        };
        let (report, _) =
            percentile_regression_test(&base, &changed, &cut_points, &inclusive, 0.9).unwrap();
        assert_relative_eq!(report.scores[0], 0.8, epsilon = 1e-12);
        assert_relative_eq!(report.scores[1], 0.8, epsilon = 1e-12);

        // Fine: a change equal to the first step is punished.
        let (fine, _) = percentile_regression_test(
            &[100.0],
            &[100.5],
            &[50.0],
            &PercentileLadder::fine(),
            0.9,
        )
        .unwrap();
        assert_relative_eq!(fine.scores[0], 0.99, epsilon = 1e-12);
    }

    #[test]
    fn misaligned_curves_are_rejected() {
        let err = percentile_regression_test(
            &[1.0, 2.0],
            &[1.0],
            &[5.0, 6.0],
            &PercentileLadder::fine(),
            0.9,
        )
        .unwrap_err();
        assert!(matches!(err, PerfrankError::InvalidSample(_)));
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(100))]

            /// **Property: matrix score is non-increasing in the observed value**
            #[test]
            fn score_is_monotone(d1 in 0.0f64..0.5, d2 in 0.0f64..0.5) {
                let m = ScoringMatrix::divergence_preset();
                let (lo, hi) = if d1 <= d2 { (d1, d2) } else { (d2, d1) };
                let s_lo = score_from_matrix(lo, &m, Axis::A).unwrap();
                let s_hi = score_from_matrix(hi, &m, Axis::A).unwrap();
                prop_assert!(s_lo >= s_hi, "score({lo}) = {s_lo} < score({hi}) = {s_hi}");
            }

            /// **Property: scores stay within [1, 100]**
            #[test]
            fn score_is_bounded(d in 0.0f64..10.0, a in -2.0f64..2.0, b in -2.0f64..2.0) {
                let s = score_from_matrix(d, &ScoringMatrix::divergence_preset(), Axis::A).unwrap();
                prop_assert!((1.0..=100.0).contains(&s));
                let c = combined_score(a, b);
                prop_assert!(c > 0.0 && c <= 100.0);
            }

            /// **Property: a worse observation never earns a better rank**
            #[test]
            fn rank_is_monotone(v1 in 0.0f64..0.5, v2 in 0.0f64..0.5) {
                let t = RankTable::divergence();
                let (lo, hi) = if v1 <= v2 { (v1, v2) } else { (v2, v1) };
                let r_lo = letter_rank(&t, Observation::Single(lo)).unwrap();
                let r_hi = letter_rank(&t, Observation::Single(hi)).unwrap();
                prop_assert!(r_lo <= r_hi);
            }
        }
    }
}
