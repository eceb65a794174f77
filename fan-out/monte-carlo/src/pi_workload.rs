// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::sample_estimator::{PiEstimate, SampleEstimator};
use fan_out_core::{Aggregator, DispatchError, Partition, WorkerSeed, Workload, WorkloadError};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PiArgs {
    pub samples: usize,
}

/// π estimation as a dispatchable workload.
#[derive(Debug, Clone, Copy, Default)]
pub struct PiWorkload<E> {
    estimator: E,
}

impl<E: SampleEstimator> PiWorkload<E> {
    pub fn new(estimator: E) -> Self {
        Self { estimator }
    }
}

impl<E: SampleEstimator> Workload for PiWorkload<E> {
    type Args = PiArgs;
    type Output = PiEstimate;

    fn name(&self) -> &'static str {
        E::NAME
    }

    fn total_size(&self, args: &PiArgs) -> usize {
        args.samples
    }

    fn validate(&self, args: &PiArgs) -> Result<(), WorkloadError> {
        if args.samples == 0 {
            return Err(WorkloadError::InvalidArgument(
                "sample count must be positive".to_string(),
            ));
        }
        Ok(())
    }

    fn partition_args(&self, _args: &PiArgs, partition: &Partition) -> PiArgs {
        PiArgs {
            samples: partition.size,
        }
    }

    fn execute(&self, args: &PiArgs, seed: WorkerSeed) -> Result<PiEstimate, WorkloadError> {
        self.estimator.estimate_seeded(args.samples, seed)
    }
}

/// Unweighted mean of the partition estimates; hits and samples are summed.
///
/// Partitions of unequal size count equally. This is the default combinator
/// and is kept unweighted on purpose; see [`weighted_mean_estimate`].
pub fn mean_estimate(partials: Vec<PiEstimate>) -> fan_out_core::Result<PiEstimate> {
    if partials.is_empty() {
        return Err(DispatchError::aggregation("no partial estimates"));
    }
    let count = partials.len() as f64;
    Ok(PiEstimate {
        value: partials.iter().map(|p| p.value).sum::<f64>() / count,
        hits: partials.iter().map(|p| p.hits).sum(),
        samples_used: partials.iter().map(|p| p.samples_used).sum(),
    })
}

/// Mean weighted by each partition's sample count, i.e. the estimate over the
/// pooled samples.
pub fn weighted_mean_estimate(partials: Vec<PiEstimate>) -> fan_out_core::Result<PiEstimate> {
    let hits: usize = partials.iter().map(|p| p.hits).sum();
    let samples: usize = partials.iter().map(|p| p.samples_used).sum();
    if samples == 0 {
        return Err(DispatchError::aggregation("no samples to aggregate"));
    }
    Ok(PiEstimate::from_hits(hits, samples))
}

/// Selects one of the estimate combinators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EstimateAggregation {
    #[default]
    Mean,
    WeightedMean,
}

impl Aggregator<PiEstimate> for EstimateAggregation {
    fn aggregate(&self, partials: Vec<PiEstimate>) -> fan_out_core::Result<PiEstimate> {
        match self {
            EstimateAggregation::Mean => mean_estimate(partials),
            EstimateAggregation::WeightedMean => weighted_mean_estimate(partials),
        }
    }
}
