// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use fan_out_core::{WorkerSeed, Workload};
use fan_out_monte_carlo::{
    mean_estimate, BulkEstimator, LoopEstimator, PiArgs, PiWorkload, SampleEstimator,
};
use std::f64::consts::PI;

// ============================================================
// Convergence
// ============================================================

#[test]
fn test_loop_form_converges_to_pi() {
    let estimate = LoopEstimator
        .estimate_seeded(1_000_000, WorkerSeed::new(2024, 0))
        .unwrap();
    // sd of the estimator at 1e6 samples is about 0.0016
    assert!((estimate.value - PI).abs() < 0.01, "got {}", estimate.value);
}

#[test]
fn test_bulk_form_converges_to_pi() {
    let estimate = BulkEstimator::default()
        .estimate_seeded(1_000_000, WorkerSeed::new(2024, 1))
        .unwrap();
    assert!((estimate.value - PI).abs() < 0.01, "got {}", estimate.value);
}

#[test]
fn test_both_forms_agree_within_sampling_tolerance() {
    let samples = 400_000;
    let looped = LoopEstimator
        .estimate_seeded(samples, WorkerSeed::new(77, 0))
        .unwrap();
    let bulk = BulkEstimator::default()
        .estimate_seeded(samples, WorkerSeed::new(77, 1))
        .unwrap();
    assert!((looped.value - bulk.value).abs() < 0.03);
}

#[test]
fn test_tolerance_shrinks_as_samples_grow() {
    // Mean absolute error over independent streams drops roughly with sqrt(n).
    let mean_error = |samples: usize| {
        let trials = 16;
        (0..trials)
            .map(|stream| {
                let est = BulkEstimator::default()
                    .estimate_seeded(samples, WorkerSeed::new(5, stream))
                    .unwrap();
                (est.value - PI).abs()
            })
            .sum::<f64>()
            / trials as f64
    };
    assert!(mean_error(1_000) > mean_error(256_000));
}

// ============================================================
// Worker independence
// ============================================================

#[test]
fn test_worker_streams_do_not_replay_each_other() {
    let workload = PiWorkload::new(BulkEstimator::default());
    let args = PiArgs { samples: 50_000 };
    let hits: Vec<usize> = (0..6)
        .map(|stream| workload.execute(&args, WorkerSeed::new(99, stream)).unwrap().hits)
        .collect();

    let mut distinct = hits.clone();
    distinct.sort_unstable();
    distinct.dedup();
    assert!(distinct.len() > 1, "identical hit counts {hits:?}");
}

#[test]
fn test_partition_means_match_single_run_in_expectation() {
    let workload = PiWorkload::new(BulkEstimator::default());
    let single = workload
        .execute(&PiArgs { samples: 2_000_000 }, WorkerSeed::new(3, 0))
        .unwrap();
    let partials = (0..4)
        .map(|stream| {
            workload
                .execute(&PiArgs { samples: 500_000 }, WorkerSeed::new(4, stream))
                .unwrap()
        })
        .collect();
    let combined = mean_estimate(partials).unwrap();

    assert_eq!(combined.samples_used, 2_000_000);
    assert!((single.value - combined.value).abs() < 0.01);
}
