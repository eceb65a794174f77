// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! One-call entry points running on the in-process [`TaskRuntime`].

use crate::tokio_runtime::TaskRuntime;
use fan_out_core::{DispatchConfig, Result, WorkDispatcher};
use fan_out_monte_carlo::{
    concatenate_rows, mean_estimate, BulkEstimator, Bounds, EscapeField, FieldArgs, FieldWorkload,
    Grid, PiArgs, PiWorkload, Resolution,
};
use std::sync::Arc;

/// Estimates π from `total_samples` points spread over `worker_count`
/// workers, combining partial estimates with their unweighted mean.
pub async fn estimate_pi(total_samples: usize, worker_count: usize) -> Result<f64> {
    let dispatcher = WorkDispatcher::new(TaskRuntime, DispatchConfig::default());
    let workload = Arc::new(PiWorkload::new(BulkEstimator::default()));
    let estimate = dispatcher
        .run(
            workload,
            worker_count,
            &mean_estimate,
            PiArgs {
                samples: total_samples,
            },
        )
        .await?;
    Ok(estimate.value)
}

/// Computes the escape field of a grid, one row band per worker.
pub async fn compute_field(
    bounds: Bounds,
    resolution: Resolution,
    max_iter: u32,
    worker_count: usize,
) -> Result<EscapeField> {
    let grid = Grid::new(bounds, resolution)?;
    let dispatcher = WorkDispatcher::new(TaskRuntime, DispatchConfig::default());
    dispatcher
        .run(
            Arc::new(FieldWorkload),
            worker_count,
            &concatenate_rows,
            FieldArgs::new(grid, max_iter),
        )
        .await
}
