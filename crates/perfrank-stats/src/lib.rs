//! Sample transforms for perfrank.
//!
//! Everything here is pure and allocation-light: validation, ECDF
//! construction with tail trimming, percentile curves, normalization and
//! descriptive summaries. Inputs are borrowed and never mutated.

use perfrank_error::{PerfrankError, Result};
use perfrank_types::{
    EcdfPoint, EmpiricalDistribution, Normalization, PercentileRange, SampleSummary, TailTrim,
};

/// Rejects empty samples and samples containing NaN or infinities.
pub fn validate_sample(sample: &[f64]) -> Result<()> {
    if sample.is_empty() {
        return Err(PerfrankError::invalid_sample("sample is empty"));
    }
    if let Some(idx) = sample.iter().position(|v| !v.is_finite()) {
        return Err(PerfrankError::invalid_sample(format!(
            "non-finite value {} at index {idx}",
            sample[idx]
        )));
    }
    Ok(())
}

/// Validated, ascending copy of `sample`.
pub fn sorted_copy(sample: &[f64]) -> Result<Vec<f64>> {
    validate_sample(sample)?;
    let mut v = sample.to_vec();
    v.sort_by(f64::total_cmp);
    Ok(v)
}

/// Builds the empirical CDF of `sample`.
///
/// Each observation yields one point; its probability is the fraction of
/// observations `<=` its value, so tied values share a probability.
///
/// `trim` is applied to the sorted position `(i + 1) / n`, not to the shared
/// probability, so each tail drops a bounded count even when the tail is a
/// run of ties.
pub fn build_ecdf(sample: &[f64], trim: TailTrim) -> Result<EmpiricalDistribution> {
    let sorted = sorted_copy(sample)?;
    let n = sorted.len() as f64;

    let points: Vec<EcdfPoint> = sorted
        .iter()
        .enumerate()
        .filter(|&(i, _)| trim.keeps((i + 1) as f64 / n))
        .map(|(_, &value)| {
            let at_or_below = sorted.partition_point(|v| *v <= value);
            EcdfPoint {
                value,
                probability: at_or_below as f64 / n,
            }
        })
        .collect();

    if points.is_empty() {
        return Err(PerfrankError::InsufficientData {
            required: 1,
            actual: 0,
        });
    }

    Ok(EmpiricalDistribution { points })
}

/// Linear-interpolated percentile of an already sorted, non-empty slice.
///
/// `p` is in percent. Uses rank `h = (n - 1) * p / 100`.
pub fn percentile_sorted(sorted: &[f64], p: f64) -> f64 {
    debug_assert!(!sorted.is_empty());
    let n = sorted.len();
    if n == 1 {
        return sorted[0];
    }
    let h = (n - 1) as f64 * (p / 100.0);
    let lo = h.floor() as usize;
    let hi = (lo + 1).min(n - 1);
    let frac = h - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

pub fn percentile(sample: &[f64], p: f64) -> Result<f64> {
    if !(0.0..=100.0).contains(&p) {
        return Err(PerfrankError::invalid_sample(format!(
            "percentile {p} outside 0..=100"
        )));
    }
    let sorted = sorted_copy(sample)?;
    Ok(percentile_sorted(&sorted, p))
}

/// Evaluates every cut point of `range` against `sample`.
pub fn percentile_curve(sample: &[f64], range: &PercentileRange) -> Result<Vec<f64>> {
    range.validate()?;
    let sorted = sorted_copy(sample)?;
    Ok(range
        .points()
        .into_iter()
        .map(|p| percentile_sorted(&sorted, p))
        .collect())
}

/// Splits a percentile curve into overlapping bands of `band_stride + 1`
/// points, one band starting every `band_stride` points.
pub fn percentile_bands<'a>(curve: &'a [f64], range: &PercentileRange) -> Vec<&'a [f64]> {
    let stride = range.band_stride().max(1);
    let mut bands = Vec::new();
    let mut start = 0;
    while start + stride < curve.len() {
        bands.push(&curve[start..=start + stride]);
        start += stride;
    }
    bands
}

pub fn mean(sample: &[f64]) -> Result<f64> {
    validate_sample(sample)?;
    Ok(sample.iter().sum::<f64>() / sample.len() as f64)
}

/// Population standard deviation.
pub fn std_dev(sample: &[f64]) -> Result<f64> {
    let m = mean(sample)?;
    let var = sample.iter().map(|v| (v - m).powi(2)).sum::<f64>() / sample.len() as f64;
    Ok(var.sqrt())
}

pub fn median(sample: &[f64]) -> Result<f64> {
    let sorted = sorted_copy(sample)?;
    Ok(percentile_sorted(&sorted, 50.0))
}

/// Relative change from `old` to `new`, in percent.
///
/// Undefined results (zero `old`, overflow) count as no change.
pub fn percentage_change(old: f64, new: f64) -> f64 {
    let pct = (new - old) / old * 100.0;
    if pct.is_finite() { pct } else { 0.0 }
}

/// Rounds half-to-even at `decimals` places.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round_ties_even() / factor
}

#[derive(Debug, Clone, Copy)]
struct Reference {
    offset: f64,
    scale: f64,
}

fn reference(sample: &[f64], mode: Normalization) -> Result<Reference> {
    validate_sample(sample)?;
    let r = match mode {
        Normalization::None => Reference {
            offset: 0.0,
            scale: 1.0,
        },
        Normalization::Max => {
            let max = sample.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            if max <= 0.0 {
                return Err(PerfrankError::invalid_sample(format!(
                    "cannot normalize by max {max}; values must be positive"
                )));
            }
            Reference {
                offset: 0.0,
                scale: max,
            }
        }
        Normalization::Sum => {
            let sum: f64 = sample.iter().sum();
            if sum <= 0.0 || !sum.is_finite() {
                return Err(PerfrankError::invalid_sample(format!(
                    "cannot normalize by sum {sum}; values must be positive"
                )));
            }
            Reference {
                offset: 0.0,
                scale: sum,
            }
        }
        Normalization::ZScore => {
            let sd = std_dev(sample)?;
            Reference {
                offset: mean(sample)?,
                scale: if sd == 0.0 { 1.0 } else { sd },
            }
        }
    };
    Ok(r)
}

fn apply(sample: &[f64], r: Reference) -> Vec<f64> {
    sample.iter().map(|v| (v - r.offset) / r.scale).collect()
}

/// Normalizes a sample against its own reference statistic.
pub fn normalize(sample: &[f64], mode: Normalization) -> Result<Vec<f64>> {
    let r = reference(sample, mode)?;
    Ok(apply(sample, r))
}

/// Normalizes both samples against the baseline's reference statistic, so a
/// uniform shift of the benchmark is preserved.
pub fn normalize_pair(
    baseline: &[f64],
    benchmark: &[f64],
    mode: Normalization,
) -> Result<(Vec<f64>, Vec<f64>)> {
    validate_sample(benchmark)?;
    let r = reference(baseline, mode)?;
    Ok((apply(baseline, r), apply(benchmark, r)))
}

/// Descriptive measurements of one sample.
pub fn summarize(sample: &[f64]) -> Result<SampleSummary> {
    let sorted = sorted_copy(sample)?;
    let count = sorted.len();
    let sum: f64 = sorted.iter().sum();
    let p95 = percentile_sorted(&sorted, 95.0);
    let outliers = count - sorted.partition_point(|v| *v < p95);

    Ok(SampleSummary {
        count,
        sum,
        mean: sum / count as f64,
        median: percentile_sorted(&sorted, 50.0),
        min: sorted[0],
        max: sorted[count - 1],
        std_dev: std_dev(&sorted)?,
        p95,
        outliers,
    })
}
