//! Distribution distance metrics.
//!
//! Two-sample Kolmogorov-Smirnov, 1-D Wasserstein and Kullback-Leibler
//! divergence over percentile bands. Samples are borrowed; every function
//! sorts a private copy.

use perfrank_error::{PerfrankError, Result};
use perfrank_stats::{normalize_pair, percentile_bands, sorted_copy};
use perfrank_types::{DivergenceReport, Normalization, PercentileRange};
use std::f64::consts::PI;
use tracing::debug;

/// Value substituted for a KL divergence that is undefined.
pub const KL_DIVERGENCE_SENTINEL: f64 = 100.0;

/// Coefficient of the two-sample KS critical value at alpha = 0.05.
pub const KS_CRITICAL_COEFFICIENT_005: f64 = 1.36;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KsStatistic {
    pub statistic: f64,
    pub pvalue: f64,
}

fn ecdf_at(sorted: &[f64], x: f64) -> f64 {
    sorted.partition_point(|v| *v <= x) as f64 / sorted.len() as f64
}

/// Two-sample KS test.
///
/// The statistic is the exact supremum of `|F_a - F_b|` over the merged
/// support. The p-value comes from the asymptotic Kolmogorov distribution.
pub fn ks_2samp(a: &[f64], b: &[f64]) -> Result<KsStatistic> {
    let sa = sorted_copy(a)?;
    let sb = sorted_copy(b)?;

    let statistic = sa
        .iter()
        .chain(sb.iter())
        .map(|&x| (ecdf_at(&sa, x) - ecdf_at(&sb, x)).abs())
        .fold(0.0, f64::max);

    let (n, m) = (sa.len() as f64, sb.len() as f64);
    let lambda = statistic * (n * m / (n + m)).sqrt();

    Ok(KsStatistic {
        statistic,
        pvalue: kolmogorov_survival(lambda),
    })
}

/// `P(K > lambda)` for the Kolmogorov distribution.
fn kolmogorov_survival(lambda: f64) -> f64 {
    if lambda <= 0.0 {
        return 1.0;
    }
    let sf = if lambda < 1.18 {
        let l2 = lambda * lambda;
        let cdf: f64 = (1..=50)
            .map(|k| {
                let odd = (2 * k - 1) as f64;
                (-(odd * odd) * PI * PI / (8.0 * l2)).exp()
            })
            .sum::<f64>()
            * (2.0 * PI).sqrt()
            / lambda;
        1.0 - cdf
    } else {
        2.0 * (1..=100u32)
            .map(|k| {
                let sign = if k % 2 == 1 { 1.0 } else { -1.0 };
                let k = f64::from(k);
                sign * (-2.0 * k * k * lambda * lambda).exp()
            })
            .sum::<f64>()
    };
    sf.clamp(0.0, 1.0)
}

/// Critical KS distance at alpha = 0.05 for sample sizes `n` and `m`.
pub fn ks_critical_value(n: usize, m: usize) -> f64 {
    let (n, m) = (n as f64, m as f64);
    KS_CRITICAL_COEFFICIENT_005 * ((n + m) / (n * m)).sqrt()
}

/// First Wasserstein distance between two 1-D samples.
///
/// Integrates `|F_a - F_b|` exactly over the merged support.
pub fn wasserstein_distance(a: &[f64], b: &[f64]) -> Result<f64> {
    let sa = sorted_copy(a)?;
    let sb = sorted_copy(b)?;

    let mut all: Vec<f64> = sa.iter().chain(sb.iter()).copied().collect();
    all.sort_by(f64::total_cmp);

    Ok(all
        .windows(2)
        .map(|w| {
            let width = w[1] - w[0];
            (ecdf_at(&sa, w[0]) - ecdf_at(&sb, w[0])).abs() * width
        })
        .sum())
}

#[derive(Debug)]
enum DivergenceDomain {
    NonPositiveReference { index: usize, q: f64 },
    NonPositiveRatio { index: usize, ratio: f64 },
}

fn try_kl(p: &[f64], q: &[f64]) -> std::result::Result<f64, DivergenceDomain> {
    let mut total = 0.0;
    for (index, (&pi, &qi)) in p.iter().zip(q).enumerate() {
        if qi <= 0.0 || !qi.is_finite() {
            return Err(DivergenceDomain::NonPositiveReference { index, q: qi });
        }
        let ratio = pi / qi;
        if ratio <= 0.0 || !ratio.is_finite() {
            return Err(DivergenceDomain::NonPositiveRatio { index, ratio });
        }
        total += pi * ratio.log2();
    }
    Ok(total)
}

/// `sum(p_i * log2(p_i / q_i))` over the paired elements of `p` and `q`.
///
/// Returns [`KL_DIVERGENCE_SENTINEL`] when any term is undefined.
pub fn kl_divergence(p: &[f64], q: &[f64]) -> f64 {
    try_kl(p, q).unwrap_or_else(|err| {
        debug!(?err, "kl divergence undefined, using sentinel");
        KL_DIVERGENCE_SENTINEL
    })
}

/// KL divergence of the benchmark percentile curve from the baseline one,
/// band by band, aggregated into a c-value.
///
/// Both curves are normalized with the baseline's reference statistic.
/// `c_value = sum(|d|) + std(|d|)` with the population standard deviation.
pub fn percentile_divergence(
    baseline_curve: &[f64],
    benchmark_curve: &[f64],
    range: &PercentileRange,
    normalization: Normalization,
) -> Result<DivergenceReport> {
    if baseline_curve.len() != benchmark_curve.len() {
        return Err(PerfrankError::invalid_sample(format!(
            "percentile curves differ in length: {} vs {}",
            baseline_curve.len(),
            benchmark_curve.len()
        )));
    }

    let (base, bench) = normalize_pair(baseline_curve, benchmark_curve, normalization)?;
    let base_bands = percentile_bands(&base, range);
    let bench_bands = percentile_bands(&bench, range);
    if base_bands.is_empty() {
        return Err(PerfrankError::InsufficientData {
            required: range.band_stride() + 1,
            actual: base.len(),
        });
    }

    let mut sentinel_bands = 0;
    let bands: Vec<f64> = base_bands
        .iter()
        .zip(&bench_bands)
        .map(|(p, q)| match try_kl(p, q) {
            Ok(d) => d,
            Err(err) => {
                debug!(?err, "band divergence undefined, using sentinel");
                sentinel_bands += 1;
                KL_DIVERGENCE_SENTINEL
            }
        })
        .collect();

    let magnitudes: Vec<f64> = bands.iter().map(|d| d.abs()).collect();
    let total: f64 = magnitudes.iter().sum();
    let spread = perfrank_stats::std_dev(&magnitudes)?;
    let c_value = total + spread;

    debug!(bands = bands.len(), sentinel_bands, c_value, "percentile divergence");

    Ok(DivergenceReport {
        bands,
        c_value,
        sentinel_bands,
    })
}
