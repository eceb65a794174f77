// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::error::{DispatchError, Result};
use serde::{Deserialize, Serialize};

/// How a total workload size is split into partitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartitionPolicy {
    /// Every worker receives `ceil(total / workers)`. The sizes may sum to more
    /// than the total; suited to sampling workloads where extra samples are
    /// harmless.
    #[default]
    Uniform,
    /// Consecutive chunks of `ceil(total / workers)` covering `[0, total)`
    /// exactly, with the remainder in the last chunk. Produces fewer partitions
    /// than workers when the chunks run out first.
    Contiguous,
}

/// A contiguous share of the total workload owned by one worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Partition {
    /// Worker slot, also the result channel's creation index.
    pub index: usize,
    /// Start of the partition within the workload.
    pub offset: usize,
    pub size: usize,
}

/// Total workload size and the number of workers it is spread over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkloadRequest {
    total_size: usize,
    worker_count: usize,
}

impl WorkloadRequest {
    pub fn new(total_size: usize, worker_count: usize) -> Result<Self> {
        if total_size == 0 {
            return Err(DispatchError::invalid_argument(
                "workload size must be positive",
            ));
        }
        if worker_count == 0 {
            return Err(DispatchError::invalid_argument(
                "worker count must be positive",
            ));
        }
        Ok(Self {
            total_size,
            worker_count,
        })
    }

    pub fn total_size(&self) -> usize {
        self.total_size
    }

    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    pub fn per_worker_size(&self) -> usize {
        self.total_size.div_ceil(self.worker_count)
    }

    pub fn partitions(&self, policy: PartitionPolicy) -> Vec<Partition> {
        let chunk = self.per_worker_size();
        match policy {
            PartitionPolicy::Uniform => (0..self.worker_count)
                .map(|index| Partition {
                    index,
                    offset: index * chunk,
                    size: chunk,
                })
                .collect(),
            PartitionPolicy::Contiguous => (0..self.total_size)
                .step_by(chunk)
                .enumerate()
                .map(|(index, offset)| Partition {
                    index,
                    offset,
                    size: chunk.min(self.total_size - offset),
                })
                .collect(),
        }
    }
}
