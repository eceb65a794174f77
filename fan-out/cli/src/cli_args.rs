// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use clap::{Args, Parser, Subcommand, ValueEnum};
use fan_out_monte_carlo::{Bounds, EstimateAggregation, Resolution};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "fanout", author, version, about = "Fan a workload out over isolated workers", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Estimate pi by Monte-Carlo sampling
    Pi(PiOptions),
    /// Compute the Mandelbrot escape-time field
    Field(FieldOptions),
    /// Serve one assignment from stdin (used by the process runtime)
    #[command(hide = true)]
    Worker,
}

#[derive(Args, Debug, Clone)]
pub struct DispatchOptions {
    /// Worker count, or `auto` for one per CPU
    #[arg(long, default_value = "1", value_parser = parse_workers)]
    pub workers: usize,

    #[arg(long, value_enum, default_value_t = RuntimeKind::Tasks)]
    pub runtime: RuntimeKind,

    /// JSON dispatch configuration
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Base seed shared by all workers
    #[arg(long)]
    pub seed: Option<u64>,

    /// Abort if the workers have not all finished after this many milliseconds
    #[arg(long)]
    pub deadline_ms: Option<u64>,
}

#[derive(Args, Debug, Clone)]
pub struct PiOptions {
    #[arg(long)]
    pub samples: usize,

    #[arg(long, value_enum, default_value_t = EstimatorKind::Bulk)]
    pub estimator: EstimatorKind,

    #[arg(long, value_enum, default_value_t = AggregationKind::Mean)]
    pub aggregation: AggregationKind,

    /// Append `pi:<value>` to this file
    #[arg(long)]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub dispatch: DispatchOptions,
}

#[derive(Args, Debug, Clone)]
pub struct FieldOptions {
    /// re_min,im_min,re_max,im_max
    #[arg(long, default_value = "-2,-1.5,1,1.5", value_parser = parse_bounds, allow_hyphen_values = true)]
    pub bounds: Bounds,

    /// NXxNY
    #[arg(long, default_value = "512x512", value_parser = parse_resolution)]
    pub resolution: Resolution,

    #[arg(long, default_value_t = 256)]
    pub max_iter: u32,

    #[command(flatten)]
    pub dispatch: DispatchOptions,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeKind {
    /// One blocking task per worker
    Tasks,
    /// One child process per worker
    Processes,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EstimatorKind {
    Bulk,
    Loop,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregationKind {
    /// Unweighted mean of the worker estimates
    Mean,
    /// Mean weighted by samples per worker
    Weighted,
}

impl AggregationKind {
    pub fn aggregation(self) -> EstimateAggregation {
        match self {
            AggregationKind::Mean => EstimateAggregation::Mean,
            AggregationKind::Weighted => EstimateAggregation::WeightedMean,
        }
    }
}

fn parse_workers(value: &str) -> Result<usize, String> {
    if value.eq_ignore_ascii_case("auto") {
        return Ok(num_cpus::get());
    }
    value
        .parse()
        .map_err(|_| format!("expected a worker count or `auto`, got '{value}'"))
}

fn parse_bounds(value: &str) -> Result<Bounds, String> {
    let parts = value
        .split(',')
        .map(|part| part.trim().parse::<f64>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| format!("invalid bound in '{value}': {e}"))?;
    match parts[..] {
        [re_min, im_min, re_max, im_max] => Ok(Bounds::new(re_min, im_min, re_max, im_max)),
        _ => Err(format!("expected four comma-separated bounds, got '{value}'")),
    }
}

fn parse_resolution(value: &str) -> Result<Resolution, String> {
    let (nx, ny) = value
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected NXxNY, got '{value}'"))?;
    let parse = |n: &str| {
        n.trim()
            .parse::<usize>()
            .map_err(|e| format!("invalid resolution '{value}': {e}"))
    };
    Ok(Resolution::new(parse(nx)?, parse(ny)?))
}
