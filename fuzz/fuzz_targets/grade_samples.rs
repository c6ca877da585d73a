//! Structure-aware fuzzing of every regression test.
//!
//! Grading may reject a sample pair, but it must never panic, and any
//! verdict it does return must carry a score in (0, 100].

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use perfrank_domain::{build_regression_test, gate_verdict};
use perfrank_types::{ConfigFile, GatePolicy, TestKind};

#[derive(Arbitrary, Debug, Clone, Copy)]
enum FuzzKind {
    Distance,
    Divergence,
    Percentile,
}

impl FuzzKind {
    fn to_perfrank(self) -> TestKind {
        match self {
            FuzzKind::Distance => TestKind::Distance,
            FuzzKind::Divergence => TestKind::Divergence,
            FuzzKind::Percentile => TestKind::Percentile,
        }
    }
}

#[derive(Arbitrary, Debug)]
struct GradeInput {
    kind: FuzzKind,
    baseline: Vec<f64>,
    benchmark: Vec<f64>,
}

fuzz_target!(|input: GradeInput| {
    let config = ConfigFile::default();
    let Ok(test) = build_regression_test(input.kind.to_perfrank(), &config) else {
        return;
    };

    if let Ok(verdict) = test.evaluate(&input.baseline, &input.benchmark) {
        assert!(
            verdict.score > 0.0 && verdict.score <= 100.0,
            "score out of range: {verdict:?}"
        );
        let _ = gate_verdict(&verdict, &GatePolicy::default());
    }
});
