//! Scoring matrix and rank table construction.
//!
//! Matrices come from two places: hand-tuned static tables, and seeded
//! Dirichlet-weighted tables whose punishments sum to one. Both are
//! validated here, before any sample is evaluated.

use perfrank_error::{PerfrankError, Result};
use perfrank_stats::round_to;
use perfrank_types::{
    DirichletSpec, LetterRankEntry, MatrixSource, PercentileLadder, PunishmentOrder, RankTable,
    ScoringMatrix, ScoringMatrixEntry,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use statrs::distribution::Gamma;
use tracing::debug;

/// Boundaries are rounded to this many decimals to avoid accumulated drift.
const BOUNDARY_DECIMALS: i32 = 10;

fn check_axis(values: impl Iterator<Item = f64>, what: &str) -> Result<()> {
    let mut prev: Option<f64> = None;
    for (i, v) in values.enumerate() {
        if !v.is_finite() || v <= 0.0 {
            return Err(PerfrankError::configuration(format!(
                "{what} #{i} must be a positive number, got {v}"
            )));
        }
        if let Some(p) = prev
            && v <= p
        {
            return Err(PerfrankError::configuration(format!(
                "{what} must strictly increase: #{i} is {v} after {p}"
            )));
        }
        prev = Some(v);
    }
    Ok(())
}

fn check_arity(dual_flags: impl Iterator<Item = bool>, table: &str) -> Result<bool> {
    let flags: Vec<bool> = dual_flags.collect();
    let dual = flags.first().copied().unwrap_or(false);
    if flags.iter().any(|&f| f != dual) {
        return Err(PerfrankError::configuration(format!(
            "{table} mixes single and dual boundaries; a dual table needs both axes on every row"
        )));
    }
    Ok(dual)
}

pub fn validate_matrix(matrix: &ScoringMatrix) -> Result<()> {
    if matrix.is_empty() {
        return Err(PerfrankError::configuration("scoring matrix is empty"));
    }
    let dual = check_arity(
        matrix.entries.iter().map(|e| e.boundary_b.is_some()),
        "scoring matrix",
    )?;
    check_axis(matrix.entries.iter().map(|e| e.boundary_a), "boundary_a")?;
    if dual {
        check_axis(
            matrix.entries.iter().filter_map(|e| e.boundary_b),
            "boundary_b",
        )?;
    }
    if let Some((i, e)) = matrix
        .entries
        .iter()
        .enumerate()
        .find(|(_, e)| !(e.punishment > 0.0 && e.punishment <= 1.0))
    {
        return Err(PerfrankError::configuration(format!(
            "punishment #{i} must be in (0, 1], got {}",
            e.punishment
        )));
    }
    Ok(())
}

pub fn validate_rank_table(table: &RankTable) -> Result<()> {
    if table.entries.is_empty() {
        return Err(PerfrankError::configuration("rank table is empty"));
    }
    let dual = check_arity(
        table.entries.iter().map(|e| e.boundary_b.is_some()),
        "rank table",
    )?;
    if let Some(pair) = table.entries.windows(2).find(|w| w[0].rank >= w[1].rank) {
        return Err(PerfrankError::configuration(format!(
            "rank table must list ranks from best to worst: {} before {}",
            pair[0].rank, pair[1].rank
        )));
    }
    check_axis(table.entries.iter().map(|e| e.boundary_a), "rank boundary_a")?;
    if dual {
        check_axis(
            table.entries.iter().filter_map(|e| e.boundary_b),
            "rank boundary_b",
        )?;
    }
    Ok(())
}

/// Ladder thresholds must strictly increase; either side may be empty.
pub fn validate_ladder(ladder: &PercentileLadder) -> Result<()> {
    for (side, steps) in [("positive", &ladder.positive), ("negative", &ladder.negative)] {
        check_axis(
            steps.iter().map(|s| s.threshold),
            &format!("{side} ladder threshold"),
        )?;
        if let Some(s) = steps
            .iter()
            .find(|s| !(s.punishment > 0.0 && s.punishment <= 1.0))
        {
            return Err(PerfrankError::configuration(format!(
                "{side} ladder punishment must be in (0, 1], got {}",
                s.punishment
            )));
        }
    }
    Ok(())
}

/// Validated copy of a rank table.
pub fn rank_table(entries: Vec<LetterRankEntry>) -> Result<RankTable> {
    let table = RankTable { entries };
    validate_rank_table(&table)?;
    Ok(table)
}

/// Single-axis static matrix from `(boundary, punishment)` rows.
pub fn static_matrix(rows: &[(f64, f64)]) -> Result<ScoringMatrix> {
    let matrix = ScoringMatrix::single(rows);
    validate_matrix(&matrix)?;
    Ok(matrix)
}

/// Dual-axis static matrix from `(boundary_a, boundary_b, punishment)` rows.
pub fn static_dual_matrix(rows: &[(f64, f64, f64)]) -> Result<ScoringMatrix> {
    let matrix = ScoringMatrix::dual(rows);
    validate_matrix(&matrix)?;
    Ok(matrix)
}

fn validate_spec(spec: &DirichletSpec) -> Result<()> {
    if spec.size == 0 {
        return Err(PerfrankError::configuration("dirichlet size must be > 0"));
    }
    if !(spec.concentration.is_finite() && spec.concentration > 0.0) {
        return Err(PerfrankError::configuration(format!(
            "dirichlet concentration must be > 0, got {}",
            spec.concentration
        )));
    }
    if !(spec.increment.is_finite() && spec.increment > 0.0) {
        return Err(PerfrankError::configuration(format!(
            "dirichlet increment must be > 0, got {}",
            spec.increment
        )));
    }
    Ok(())
}

/// Symmetric Dirichlet draw: normalized `Gamma(alpha, 1)` variates.
fn dirichlet_weights<R: Rng>(spec: &DirichletSpec, rng: &mut R) -> Result<Vec<f64>> {
    let gamma = Gamma::new(spec.concentration, 1.0)
        .map_err(|e| PerfrankError::configuration(format!("dirichlet concentration: {e}")))?;
    let draws: Vec<f64> = (0..spec.size).map(|_| rng.sample(gamma)).collect();
    let total: f64 = draws.iter().sum();
    if !(total.is_finite() && total > 0.0) {
        return Err(PerfrankError::configuration(
            "dirichlet draw degenerated; increase the concentration",
        ));
    }
    Ok(draws.into_iter().map(|d| d / total).collect())
}

/// Dirichlet-weighted matrix using a caller-supplied random source.
///
/// Weights are sorted per `spec.order` and paired with ascending boundaries
/// `lower_bound + i * increment`. `spec.seed` is ignored.
pub fn dirichlet_matrix_with_rng<R: Rng>(
    spec: &DirichletSpec,
    rng: &mut R,
) -> Result<ScoringMatrix> {
    validate_spec(spec)?;
    let mut weights = dirichlet_weights(spec, rng)?;
    match spec.order {
        PunishmentOrder::Descending => weights.sort_by(|a, b| b.total_cmp(a)),
        PunishmentOrder::Ascending => weights.sort_by(f64::total_cmp),
    }

    let step = |lower: f64, i: usize| round_to(lower + i as f64 * spec.increment, BOUNDARY_DECIMALS);
    let matrix = ScoringMatrix {
        entries: weights
            .into_iter()
            .enumerate()
            .map(|(i, punishment)| ScoringMatrixEntry {
                boundary_a: step(spec.lower_bound_a, i),
                boundary_b: spec.lower_bound_b.map(|b| step(b, i)),
                punishment,
            })
            .collect(),
    };
    validate_matrix(&matrix)?;
    Ok(matrix)
}

/// Dirichlet-weighted matrix seeded from `spec.seed`.
///
/// The same `DirichletSpec` always yields a bit-identical matrix.
pub fn dirichlet_matrix(spec: &DirichletSpec) -> Result<ScoringMatrix> {
    let mut rng = ChaCha8Rng::seed_from_u64(spec.seed);
    let matrix = dirichlet_matrix_with_rng(spec, &mut rng)?;
    debug!(
        seed = spec.seed,
        size = spec.size,
        order = ?spec.order,
        "built dirichlet scoring matrix"
    );
    Ok(matrix)
}

/// Materializes a configured matrix source.
pub fn resolve_matrix(source: &MatrixSource) -> Result<ScoringMatrix> {
    match source {
        MatrixSource::Static(matrix) => {
            validate_matrix(matrix)?;
            Ok(matrix.clone())
        }
        MatrixSource::Dirichlet(spec) => dirichlet_matrix(spec),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use perfrank_types::LetterRank;

    #[test]
    fn same_seed_same_matrix() {
        let spec = DirichletSpec::default();
        let a = dirichlet_matrix(&spec).unwrap();
        let b = dirichlet_matrix(&spec).unwrap();
        assert_eq!(a, b);
        let bits = |m: &ScoringMatrix| -> Vec<u64> {
            m.entries.iter().map(|e| e.punishment.to_bits()).collect()
        };
        assert_eq!(bits(&a), bits(&b));
    }

    #[test]
    fn different_seed_different_weights() {
        let a = dirichlet_matrix(&DirichletSpec::default()).unwrap();
        let b = dirichlet_matrix(&DirichletSpec {
            seed: 7,
            ..DirichletSpec::default()
        })
        .unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn default_spec_covers_distance_boundaries() {
        let m = dirichlet_matrix(&DirichletSpec::default()).unwrap();
        assert_eq!(m.len(), 100);
        assert!(m.is_dual());
        assert_eq!(m.entries[0].boundary_a, 0.06);
        assert_eq!(m.entries[0].boundary_b, Some(0.03));
        assert_eq!(m.entries[99].boundary_a, 0.159);
        assert_eq!(m.entries[99].boundary_b, Some(0.129));
        assert_relative_eq!(m.total_punishment(), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn descending_order_punishes_small_breaches_hardest() {
        // Inverse of the hand-tuned static tables, kept selectable on purpose.
        let m = dirichlet_matrix(&DirichletSpec::default()).unwrap();
        assert!(m.entries.windows(2).all(|w| w[0].punishment >= w[1].punishment));
        let preset = ScoringMatrix::divergence_preset();
        assert!(
            preset
                .entries
                .windows(2)
                .all(|w| w[0].punishment <= w[1].punishment)
        );
    }

    #[test]
    fn ascending_order_reverses_the_same_weights() {
        let desc = dirichlet_matrix(&DirichletSpec::default()).unwrap();
        let asc = dirichlet_matrix(&DirichletSpec {
            order: PunishmentOrder::Ascending,
            ..DirichletSpec::default()
        })
        .unwrap();
        assert!(asc.entries.windows(2).all(|w| w[0].punishment <= w[1].punishment));
        let mut reversed: Vec<f64> = desc.entries.iter().map(|e| e.punishment).collect();
        reversed.reverse();
        let ascending: Vec<f64> = asc.entries.iter().map(|e| e.punishment).collect();
        assert_eq!(reversed, ascending);
        assert_eq!(asc.entries[0].boundary_a, desc.entries[0].boundary_a);
    }

    #[test]
    fn injected_rng_is_used() {
        let spec = DirichletSpec {
            lower_bound_b: None,
            size: 10,
            ..DirichletSpec::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(99);
        let injected = dirichlet_matrix_with_rng(&spec, &mut rng).unwrap();
        let seeded = dirichlet_matrix(&DirichletSpec { seed: 99, ..spec.clone() }).unwrap();
        assert_eq!(injected, seeded);
        assert!(!injected.is_dual());
    }

    #[test]
    fn invalid_specs_are_configuration_errors() {
        for spec in [
            DirichletSpec {
                size: 0,
                ..DirichletSpec::default()
            },
            DirichletSpec {
                concentration: 0.0,
                ..DirichletSpec::default()
            },
            DirichletSpec {
                increment: -0.001,
                ..DirichletSpec::default()
            },
            DirichletSpec {
                lower_bound_a: 0.0,
                ..DirichletSpec::default()
            },
        ] {
            assert!(matches!(
                dirichlet_matrix(&spec),
                Err(PerfrankError::Configuration(_))
            ));
        }
    }

    #[test]
    fn static_matrix_must_increase() {
        assert!(static_matrix(&[(0.1, 0.5), (0.2, 0.5)]).is_ok());
        let err = static_matrix(&[(0.2, 0.5), (0.1, 0.5)]).unwrap_err();
        assert!(err.to_string().contains("strictly increase"));
        assert!(static_matrix(&[(0.1, 0.5), (0.1, 0.5)]).is_err());
        assert!(static_matrix(&[]).is_err());
    }

    #[test]
    fn punishment_must_be_in_unit_interval() {
        assert!(static_matrix(&[(0.1, 0.0)]).is_err());
        assert!(static_matrix(&[(0.1, 1.5)]).is_err());
        assert!(static_matrix(&[(0.1, 1.0)]).is_ok());
    }

    #[test]
    fn dual_matrix_missing_an_axis_is_rejected() {
        let mut m = ScoringMatrix::dual(&[(0.1, 0.05, 0.5), (0.2, 0.06, 0.5)]);
        validate_matrix(&m).unwrap();
        m.entries[1].boundary_b = None;
        let err = validate_matrix(&m).unwrap_err();
        assert!(err.to_string().contains("both axes"));
        assert!(static_dual_matrix(&[(0.1, 0.06, 0.5), (0.2, 0.05, 0.5)]).is_err());
    }

    #[test]
    fn rank_presets_validate() {
        validate_rank_table(&RankTable::distance_dual()).unwrap();
        validate_rank_table(&RankTable::distance_ks_only()).unwrap();
        validate_rank_table(&RankTable::divergence()).unwrap();
    }

    #[test]
    fn rank_table_out_of_order_is_rejected() {
        let entry = |boundary_a, rank| LetterRankEntry {
            boundary_a,
            boundary_b: None,
            rank,
        };
        assert!(rank_table(vec![entry(0.1, LetterRank::S), entry(0.2, LetterRank::B)]).is_ok());
        assert!(rank_table(vec![entry(0.1, LetterRank::B), entry(0.2, LetterRank::A)]).is_err());
        assert!(rank_table(vec![entry(0.2, LetterRank::S), entry(0.1, LetterRank::A)]).is_err());
        assert!(rank_table(vec![]).is_err());
    }

    #[test]
    fn ladder_presets_validate() {
        validate_ladder(&PercentileLadder::fine()).unwrap();
        validate_ladder(&PercentileLadder::coarse()).unwrap();

        let mut bad = PercentileLadder::coarse();
        bad.negative.swap(0, 1);
        assert!(validate_ladder(&bad).is_err());

        let mut zero = PercentileLadder::fine();
        zero.positive[0].punishment = 0.0;
        assert!(validate_ladder(&zero).is_err());
    }

    #[test]
    fn resolve_validates_static_sources() {
        let bad = MatrixSource::Static(ScoringMatrix::single(&[(0.3, 0.5), (0.2, 0.5)]));
        assert!(resolve_matrix(&bad).is_err());
        let good = MatrixSource::Static(ScoringMatrix::divergence_preset());
        assert_eq!(
            resolve_matrix(&good).unwrap(),
            ScoringMatrix::divergence_preset()
        );
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(50))]

            /// **Property: any seed yields a valid matrix whose punishments sum to one**
            #[test]
            fn dirichlet_matrix_always_valid(seed in any::<u64>(), size in 1usize..150) {
                let spec = DirichletSpec { seed, size, ..DirichletSpec::default() };
                let m = dirichlet_matrix(&spec).unwrap();
                prop_assert_eq!(m.len(), size);
                prop_assert!((m.total_punishment() - 1.0).abs() < 1e-9);
                prop_assert!(validate_matrix(&m).is_ok());
            }
        }
    }
}
