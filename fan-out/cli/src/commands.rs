// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::cli_args::{DispatchOptions, EstimatorKind, FieldOptions, PiOptions};
use anyhow::Context;
use fan_out_core::{DispatchConfig, WorkDispatcher, WorkerRuntime};
use fan_out_monte_carlo::{
    concatenate_rows, BulkEstimator, FieldArgs, FieldWorkload, Grid, LoopEstimator, PiArgs,
    PiEstimate, PiWorkload, SampleEstimator,
};
use fan_out_process_pipe::WorkerRegistry;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::info;

/// File settings first, then command-line overrides.
pub fn dispatch_config(options: &DispatchOptions) -> anyhow::Result<DispatchConfig> {
    let mut config = match &options.config {
        Some(path) => DispatchConfig::load(path)?,
        None => DispatchConfig::default(),
    };
    if let Some(seed) = options.seed {
        config = config.with_seed(seed);
    }
    if let Some(ms) = options.deadline_ms {
        config = config.with_deadline(Duration::from_millis(ms));
    }
    Ok(config)
}

pub async fn pi<R: WorkerRuntime>(
    dispatcher: &WorkDispatcher<R>,
    options: &PiOptions,
) -> anyhow::Result<()> {
    let start = Instant::now();
    let estimate = match options.estimator {
        EstimatorKind::Bulk => {
            run_estimator(dispatcher, BulkEstimator::default(), options).await?
        }
        EstimatorKind::Loop => run_estimator(dispatcher, LoopEstimator, options).await?,
    };
    info!(
        value = estimate.value,
        samples = estimate.samples_used,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "estimate ready"
    );

    println!(
        "pi = {} ({} samples, {} workers)",
        estimate.value, estimate.samples_used, options.dispatch.workers
    );
    if let Some(path) = &options.output {
        append_estimate(path, estimate.value)?;
    }
    Ok(())
}

async fn run_estimator<R: WorkerRuntime, E: SampleEstimator>(
    dispatcher: &WorkDispatcher<R>,
    estimator: E,
    options: &PiOptions,
) -> anyhow::Result<PiEstimate> {
    let estimate = dispatcher
        .run(
            Arc::new(PiWorkload::new(estimator)),
            options.dispatch.workers,
            &options.aggregation.aggregation(),
            PiArgs {
                samples: options.samples,
            },
        )
        .await?;
    Ok(estimate)
}

fn append_estimate(path: &Path, value: f64) -> anyhow::Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("cannot open {}", path.display()))?;
    writeln!(file, "pi:{value}").with_context(|| format!("cannot write {}", path.display()))?;
    Ok(())
}

pub async fn field<R: WorkerRuntime>(
    dispatcher: &WorkDispatcher<R>,
    options: &FieldOptions,
) -> anyhow::Result<()> {
    let start = Instant::now();
    let grid = Grid::new(options.bounds, options.resolution)?;
    let field = dispatcher
        .run(
            Arc::new(FieldWorkload),
            options.dispatch.workers,
            &concatenate_rows,
            FieldArgs::new(grid, options.max_iter),
        )
        .await?;

    let bounded = field
        .iterations
        .as_slice()
        .iter()
        .filter(|&&k| k == options.max_iter)
        .count();
    info!(
        cells = field.iterations.as_slice().len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "field ready"
    );
    println!(
        "field {}x{}, max_iter {}: {} of {} cells did not escape",
        field.iterations.cols(),
        field.iterations.rows(),
        options.max_iter,
        bounded,
        field.iterations.as_slice().len()
    );
    Ok(())
}

/// Every workload a `worker` process can serve.
pub fn worker_registry() -> WorkerRegistry {
    WorkerRegistry::new()
        .register(PiWorkload::new(BulkEstimator::default()))
        .register(PiWorkload::new(LoopEstimator))
        .register(FieldWorkload)
}

pub fn serve_worker() -> anyhow::Result<()> {
    worker_registry()
        .serve(std::io::stdin().lock(), std::io::stdout().lock())
        .context("worker failed to serve its assignment")
}
