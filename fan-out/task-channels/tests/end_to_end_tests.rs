// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use fan_out_core::{
    DispatchConfig, DispatchError, Partition, WorkDispatcher, WorkerSeed, Workload, WorkloadError,
};
use fan_out_monte_carlo::{
    compute, BulkEstimator, Bounds, EstimateAggregation, Grid, LoopEstimator, PiArgs, PiEstimate,
    PiWorkload, Resolution,
};
use fan_out_task_channels::{compute_field, estimate_pi, TaskRuntime};
use std::f64::consts::PI;
use std::sync::Arc;

// ============================================================
// Pi
// ============================================================

#[tokio::test]
async fn test_four_workers_land_near_pi() {
    let estimate = estimate_pi(1_000_000, 4).await.unwrap();
    assert!((3.0..=3.3).contains(&estimate), "got {estimate}");
}

#[tokio::test]
async fn test_one_and_four_workers_agree() {
    let single = estimate_pi(1_000_000, 1).await.unwrap();
    let fanned = estimate_pi(1_000_000, 4).await.unwrap();
    assert!((single - fanned).abs() < 0.02, "{single} vs {fanned}");
}

#[tokio::test]
async fn test_large_bulk_run_is_within_a_hundredth() {
    let estimate = estimate_pi(10_000_000, 4).await.unwrap();
    assert!((estimate - PI).abs() < 0.01, "got {estimate}");
}

#[tokio::test]
async fn test_uneven_split_consumes_at_least_total() {
    let dispatcher = WorkDispatcher::new(TaskRuntime, DispatchConfig::default().with_seed(13));
    let estimate = dispatcher
        .run(
            Arc::new(PiWorkload::new(LoopEstimator)),
            3,
            &EstimateAggregation::Mean,
            PiArgs { samples: 10 },
        )
        .await
        .unwrap();
    // ceil(10 / 3) = 4 per worker
    assert_eq!(estimate.samples_used, 12);
}

#[tokio::test]
async fn test_fixed_seed_fan_out_is_reproducible() {
    let run = || async {
        WorkDispatcher::new(TaskRuntime, DispatchConfig::default().with_seed(21))
            .run(
                Arc::new(PiWorkload::new(BulkEstimator::default())),
                4,
                &EstimateAggregation::WeightedMean,
                PiArgs { samples: 200_000 },
            )
            .await
            .unwrap()
    };
    let first: PiEstimate = run().await;
    let second: PiEstimate = run().await;
    assert_eq!(first, second);
}

// ============================================================
// Field
// ============================================================

#[tokio::test]
async fn test_field_matches_single_call_for_any_worker_count() {
    let bounds = Bounds::new(-2.0, -1.5, 1.0, 1.5);
    let resolution = Resolution::new(64, 64);
    let expected = compute(&Grid::new(bounds, resolution).unwrap(), 100).unwrap();

    for workers in [1, 2, 3, 6, 64] {
        let field = compute_field(bounds, resolution, 100, workers).await.unwrap();
        assert_eq!(field, expected, "mismatch with {workers} workers");
    }
}

#[tokio::test]
async fn test_field_reference_cells() {
    let field = compute_field(Bounds::default(), Resolution::new(64, 64), 100, 4)
        .await
        .unwrap();
    assert_eq!(field.iterations[(32, 24)], 100);
    assert!(field.iterations[(0, 0)] <= 5);
}

#[tokio::test]
async fn test_more_workers_than_rows() {
    let field = compute_field(Bounds::default(), Resolution::new(8, 3), 50, 8)
        .await
        .unwrap();
    assert_eq!(field.iterations.rows(), 3);
}

// ============================================================
// Failures
// ============================================================

#[tokio::test]
async fn test_zero_samples_is_invalid() {
    assert!(matches!(
        estimate_pi(0, 4).await,
        Err(DispatchError::InvalidArgument { .. })
    ));
}

#[tokio::test]
async fn test_zero_workers_is_invalid() {
    assert!(matches!(
        estimate_pi(1_000, 0).await,
        Err(DispatchError::InvalidArgument { .. })
    ));
}

#[tokio::test]
async fn test_inverted_bounds_are_invalid() {
    let result = compute_field(
        Bounds::new(1.0, -1.5, -2.0, 1.5),
        Resolution::new(16, 16),
        100,
        2,
    )
    .await;
    assert!(matches!(result, Err(DispatchError::InvalidArgument { .. })));
}

/// Panics in the worker holding the last partition.
struct PanickingWorkload;

impl Workload for PanickingWorkload {
    type Args = usize;
    type Output = usize;

    fn name(&self) -> &'static str {
        "panicking"
    }

    fn total_size(&self, args: &usize) -> usize {
        *args
    }

    fn partition_args(&self, _args: &usize, partition: &Partition) -> usize {
        partition.size
    }

    fn execute(&self, args: &usize, seed: WorkerSeed) -> Result<usize, WorkloadError> {
        if seed.stream == 2 {
            panic!("worker {} gave up", seed.stream);
        }
        Ok(*args)
    }
}

#[tokio::test]
async fn test_panicking_worker_fails_the_whole_call() {
    let dispatcher = WorkDispatcher::new(TaskRuntime, DispatchConfig::default());
    let sum = |parts: Vec<usize>| -> fan_out_core::Result<usize> { Ok(parts.into_iter().sum()) };
    let result = dispatcher
        .run(Arc::new(PanickingWorkload), 3, &sum, 9)
        .await;
    assert!(matches!(
        result,
        Err(DispatchError::WorkerResultMissing { worker: 2, .. })
    ));
}
