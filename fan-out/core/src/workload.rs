// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::error::WorkloadError;
use crate::work_request::{Partition, PartitionPolicy};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Seed material for one worker's random source.
///
/// Every worker of a run shares `base` and gets its own `stream`, so random
/// workloads draw from independent streams instead of replaying one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerSeed {
    pub base: u64,
    pub stream: u64,
}

impl WorkerSeed {
    pub fn new(base: u64, stream: u64) -> Self {
        Self { base, stream }
    }
}

/// A pure, stateless unit of work parameterized by a workload size.
///
/// `execute` is the only body: the single-worker fast path calls it with the
/// full arguments and every fan-out worker calls it with its partition's
/// arguments.
pub trait Workload: Send + Sync + 'static {
    type Args: Clone + Send + Serialize + DeserializeOwned + 'static;
    type Output: Send + Serialize + DeserializeOwned + 'static;

    /// Stable identifier, used to route assignments to workers that live in
    /// another process.
    fn name(&self) -> &'static str;

    fn partition_policy(&self) -> PartitionPolicy {
        PartitionPolicy::Uniform
    }

    /// The size-bearing argument.
    fn total_size(&self, args: &Self::Args) -> usize;

    /// Rejects unusable arguments before any worker is launched.
    fn validate(&self, _args: &Self::Args) -> Result<(), WorkloadError> {
        Ok(())
    }

    /// Arguments for one partition: the size-bearing argument rewritten, the
    /// rest unchanged.
    fn partition_args(&self, args: &Self::Args, partition: &Partition) -> Self::Args;

    fn execute(&self, args: &Self::Args, seed: WorkerSeed) -> Result<Self::Output, WorkloadError>;
}

/// Everything a worker needs, passed by value across the isolation boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerAssignment<A> {
    pub workload: String,
    pub worker_id: usize,
    pub seed: WorkerSeed,
    pub args: A,
}

impl<A> WorkerAssignment<A> {
    pub fn run<W>(&self, workload: &W) -> Result<W::Output, WorkloadError>
    where
        W: Workload<Args = A>,
    {
        if self.workload != workload.name() {
            return Err(WorkloadError::InvalidArgument(format!(
                "assignment for '{}' routed to '{}'",
                self.workload,
                workload.name()
            )));
        }
        workload.execute(&self.args, self.seed)
    }
}
