//! Synthetic scenarios for exercising the grading logic.
//!
//! Every generator owns an explicitly seeded `ChaCha8Rng`; nothing touches
//! global random state, so a seed always reproduces the same pair.

use perfrank_types::RunData;
use rand::seq::index::sample as sample_indices;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::ops::RangeInclusive;

/// Percentage change applied to every generated measurement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shift {
    None,
    /// Increase by a whole percentage drawn from the range.
    Increase(RangeInclusive<u32>),
    /// Decrease by a whole percentage drawn from the range.
    Decrease(RangeInclusive<u32>),
}

/// Baseline/benchmark pair plus a label for reporting.
#[derive(Debug, Clone, PartialEq)]
pub struct Scenario {
    pub name: String,
    pub baseline: Vec<f64>,
    pub benchmark: Vec<f64>,
}

#[derive(Debug, Clone)]
pub struct ScenarioGenerator {
    rng: ChaCha8Rng,
    measurement_range: RangeInclusive<u32>,
}

impl ScenarioGenerator {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            measurement_range: 50..=100,
        }
    }

    pub fn with_measurement_range(mut self, range: RangeInclusive<u32>) -> Self {
        self.measurement_range = range;
        self
    }

    /// Whole-number measurements drawn uniformly from the measurement range,
    /// each optionally shifted by a random percentage.
    pub fn sample(&mut self, size: usize, shift: &Shift) -> Vec<f64> {
        (0..size)
            .map(|_| {
                let m = f64::from(self.rng.gen_range(self.measurement_range.clone()));
                match shift {
                    Shift::None => m,
                    Shift::Increase(pct) => {
                        m + m / 100.0 * f64::from(self.rng.gen_range(pct.clone()))
                    }
                    Shift::Decrease(pct) => {
                        m - m / 100.0 * f64::from(self.rng.gen_range(pct.clone()))
                    }
                }
            })
            .collect()
    }

    /// Continuous uniform sample on `[low, high)`.
    pub fn uniform(&mut self, size: usize, low: f64, high: f64) -> Vec<f64> {
        (0..size).map(|_| self.rng.gen_range(low..high)).collect()
    }

    /// Copy of `sample` with one randomly chosen point doubled.
    pub fn double_random_point(&mut self, sample: &[f64]) -> (Vec<f64>, usize) {
        let mut out = sample.to_vec();
        if out.is_empty() {
            return (out, 0);
        }
        let idx = self.rng.gen_range(0..out.len());
        out[idx] *= 2.0;
        (out, idx)
    }

    /// Copy of `sample` where `percent` of the points (chosen at random)
    /// move by `delta` percent, up when `positive`.
    pub fn perturb_fraction(
        &mut self,
        sample: &[f64],
        percent: f64,
        delta: f64,
        positive: bool,
    ) -> Vec<f64> {
        let mut out = sample.to_vec();
        let count = ((percent.clamp(0.0, 100.0) / 100.0) * out.len() as f64).round() as usize;
        let factor = if positive {
            1.0 + delta / 100.0
        } else {
            1.0 - delta / 100.0
        };
        for idx in sample_indices(&mut self.rng, out.len(), count.min(out.len())) {
            out[idx] *= factor;
        }
        out
    }

    /// Wraps a sample as a run record with sequential timestamps.
    pub fn run_data(&mut self, response_times: Vec<f64>, action: &str) -> RunData {
        let start = f64::from(self.rng.gen_range(1_600_000_000u32..1_700_000_000)) * 1000.0;
        let timestamps = (0..response_times.len())
            .map(|i| start + i as f64 * 1000.0)
            .collect();
        let actions = vec![action.to_string(); response_times.len()];
        RunData {
            response_times,
            timestamps,
            actions,
        }
    }

    /// The canonical grading scenarios: unchanged, one outlier, uniform
    /// slowdown and uniform speedup.
    pub fn standard_scenarios(&mut self, size: usize) -> Vec<Scenario> {
        let baseline = self.sample(size, &Shift::None);
        let (outlier, _) = self.double_random_point(&baseline);
        vec![
            Scenario {
                name: "unchanged".into(),
                benchmark: baseline.clone(),
                baseline: baseline.clone(),
            },
            Scenario {
                name: "single_point_doubled".into(),
                benchmark: outlier,
                baseline: baseline.clone(),
            },
            Scenario {
                name: "uniform_slowdown_50pct".into(),
                benchmark: scale_uniformly(&baseline, 1.5),
                baseline: baseline.clone(),
            },
            Scenario {
                name: "uniform_speedup_20pct".into(),
                benchmark: scale_uniformly(&baseline, 0.8),
                baseline,
            },
        ]
    }
}

/// Every point multiplied by `factor`.
pub fn scale_uniformly(sample: &[f64], factor: f64) -> Vec<f64> {
    sample.iter().map(|v| v * factor).collect()
}

/// `[1.0, 2.0, ..., n]`.
pub fn linear_ramp(n: usize) -> Vec<f64> {
    (1..=n).map(|v| v as f64).collect()
}
