// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::aggregation::Aggregator;
use crate::dispatch_config::DispatchConfig;
use crate::error::{DispatchError, Result};
use crate::result_channel::result_channel;
use crate::work_request::{Partition, PartitionPolicy, WorkloadRequest};
use crate::worker_runtime::{WorkerHandle, WorkerRuntime};
use crate::workload::{WorkerAssignment, WorkerSeed, Workload};
use std::sync::Arc;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

enum DispatchStrategy {
    /// Single worker: call the workload inline, no pool, no channel.
    Direct,
    FanOut(Vec<Partition>),
}

impl DispatchStrategy {
    fn select(request: &WorkloadRequest, policy: PartitionPolicy) -> Self {
        if request.worker_count() == 1 {
            DispatchStrategy::Direct
        } else {
            DispatchStrategy::FanOut(request.partitions(policy))
        }
    }
}

/// Every handle launched by one run. Dropping the set terminates them all,
/// so every exit path of `run` releases its workers.
struct WorkerSet<H: WorkerHandle> {
    handles: Vec<H>,
}

impl<H: WorkerHandle> WorkerSet<H> {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            handles: Vec::with_capacity(capacity),
        }
    }

    fn push(&mut self, handle: H) {
        self.handles.push(handle);
    }

    async fn join_all(&mut self) {
        for handle in self.handles.iter_mut() {
            match handle.join().await {
                Ok(()) => debug!(worker = handle.worker_id(), "worker joined"),
                Err(reason) => warn!(
                    worker = handle.worker_id(),
                    %reason,
                    "worker terminated abnormally"
                ),
            }
        }
    }
}

impl<H: WorkerHandle> Drop for WorkerSet<H> {
    fn drop(&mut self) {
        for handle in self.handles.iter_mut() {
            handle.terminate();
        }
    }
}

/// Splits a workload across isolated workers and aggregates their results.
pub struct WorkDispatcher<R: WorkerRuntime> {
    runtime: R,
    config: DispatchConfig,
    cancellation: CancellationToken,
}

impl<R: WorkerRuntime> WorkDispatcher<R> {
    pub fn new(runtime: R, config: DispatchConfig) -> Self {
        Self {
            runtime,
            config,
            cancellation: CancellationToken::new(),
        }
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    /// Returns a clone of the cancellation token for external control
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancellation.clone()
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    pub fn runtime(&self) -> &R {
        &self.runtime
    }

    /// Runs `workload` over `args` on `worker_count` workers.
    ///
    /// With one worker the workload runs inline and its result is returned
    /// unmodified. Otherwise the size-bearing argument is partitioned, every
    /// worker is launched, all are joined, every result channel is read in
    /// creation order and `aggregator` combines the partials. Any failure fails
    /// the whole call; partial results are discarded.
    pub async fn run<W, A>(
        &self,
        workload: Arc<W>,
        worker_count: usize,
        aggregator: &A,
        args: W::Args,
    ) -> Result<W::Output>
    where
        W: Workload,
        A: Aggregator<W::Output> + ?Sized,
    {
        workload.validate(&args)?;
        let request = WorkloadRequest::new(workload.total_size(&args), worker_count)?;
        let base_seed = self.config.seed.unwrap_or_else(rand::random);

        match DispatchStrategy::select(&request, workload.partition_policy()) {
            DispatchStrategy::Direct => {
                debug!(
                    workload = workload.name(),
                    size = request.total_size(),
                    "running inline"
                );
                Ok(workload.execute(&args, WorkerSeed::new(base_seed, 0))?)
            }
            DispatchStrategy::FanOut(partitions) => {
                info!(
                    workload = workload.name(),
                    size = request.total_size(),
                    workers = partitions.len(),
                    per_worker = request.per_worker_size(),
                    "fanning out"
                );
                let partials = self
                    .fan_out(&workload, &args, &partitions, base_seed)
                    .await?;
                aggregator.aggregate(partials)
            }
        }
    }

    async fn fan_out<W: Workload>(
        &self,
        workload: &Arc<W>,
        args: &W::Args,
        partitions: &[Partition],
        base_seed: u64,
    ) -> Result<Vec<W::Output>> {
        let mut workers = WorkerSet::with_capacity(partitions.len());
        let mut receivers = Vec::with_capacity(partitions.len());

        for partition in partitions {
            if self.cancellation.is_cancelled() {
                return Err(DispatchError::Cancelled);
            }

            let (sender, receiver) = result_channel(partition.index);
            let assignment = WorkerAssignment {
                workload: workload.name().to_string(),
                worker_id: partition.index,
                seed: WorkerSeed::new(base_seed, partition.index as u64),
                args: workload.partition_args(args, partition),
            };
            let handle = self
                .runtime
                .launch(Arc::clone(workload), assignment, sender)?;
            debug!(
                worker = partition.index,
                offset = partition.offset,
                size = partition.size,
                "worker launched"
            );

            workers.push(handle);
            receivers.push(receiver);
        }

        self.await_workers(&mut workers).await?;

        let mut partials = Vec::with_capacity(receivers.len());
        for receiver in receivers {
            partials.push(receiver.recv_within(self.config.result_wait()).await?);
        }
        Ok(partials)
    }

    async fn await_workers<H: WorkerHandle>(&self, workers: &mut WorkerSet<H>) -> Result<()> {
        let deadline = self.config.deadline();
        let joined = async {
            match deadline {
                Some(deadline) => timeout(deadline, workers.join_all())
                    .await
                    .map_err(|_| DispatchError::WorkerTimeout { deadline }),
                None => {
                    workers.join_all().await;
                    Ok(())
                }
            }
        };

        let result = tokio::select! {
            result = joined => result,
            _ = self.cancellation.cancelled() => Err(DispatchError::Cancelled),
        };
        if let Err(err) = &result {
            warn!(%err, "terminating workers");
        }
        result
    }
}
