// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::error::Result;
use crate::result_channel::ResultSender;
use crate::workload::{Workload, WorkerAssignment};
use async_trait::async_trait;
use std::sync::Arc;

/// Trait for abstracting the execution substrate (tasks, processes)
pub trait WorkerRuntime: Send + Sync {
    type Handle: WorkerHandle;

    /// Start one isolated worker for `assignment`.
    ///
    /// The worker owns `results` and must either send exactly one outcome on it
    /// or drop it unsent. Fails with `WorkerLaunchFailure` when the substrate
    /// cannot create the worker.
    fn launch<W: Workload>(
        &self,
        workload: Arc<W>,
        assignment: WorkerAssignment<W::Args>,
        results: ResultSender<W::Output>,
    ) -> Result<Self::Handle>;
}

/// Handle to one running worker
#[async_trait]
pub trait WorkerHandle: Send {
    fn worker_id(&self) -> usize;

    /// Wait for the worker to terminate.
    /// Err describes an abnormal termination (panic, non-zero exit); whether a
    /// result was produced is decided by the result channel, not here.
    async fn join(&mut self) -> std::result::Result<(), String>;

    /// Forcibly stop the worker. Idempotent, and a no-op once joined.
    fn terminate(&mut self);
}
