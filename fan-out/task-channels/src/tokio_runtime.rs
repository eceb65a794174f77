// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use async_trait::async_trait;
use fan_out_core::{
    DispatchError, Result, ResultSender, WorkerAssignment, WorkerHandle, WorkerRuntime, Workload,
};
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::debug;

/// Tokio task-based runtime: one blocking task per worker.
///
/// Each task owns its assignment by value and shares nothing with its
/// siblings except the immutable workload.
#[derive(Debug, Clone, Copy, Default)]
pub struct TaskRuntime;

impl WorkerRuntime for TaskRuntime {
    type Handle = TaskHandle;

    fn launch<W: Workload>(
        &self,
        workload: Arc<W>,
        assignment: WorkerAssignment<W::Args>,
        results: ResultSender<W::Output>,
    ) -> Result<TaskHandle> {
        let worker_id = assignment.worker_id;
        let runtime = Handle::try_current().map_err(|e| DispatchError::WorkerLaunchFailure {
            worker: worker_id,
            reason: e.to_string(),
        })?;

        // A panic unwinds through the closure and drops `results` unsent.
        let handle = runtime.spawn_blocking(move || {
            let outcome = assignment.run(&*workload);
            if !results.send(outcome) {
                debug!(worker = worker_id, "result discarded, dispatcher gone");
            }
        });

        Ok(TaskHandle {
            worker_id,
            handle: Some(handle),
        })
    }
}

pub struct TaskHandle {
    worker_id: usize,
    handle: Option<JoinHandle<()>>,
}

#[async_trait]
impl WorkerHandle for TaskHandle {
    fn worker_id(&self) -> usize {
        self.worker_id
    }

    async fn join(&mut self) -> std::result::Result<(), String> {
        let Some(handle) = self.handle.as_mut() else {
            return Ok(());
        };
        let joined = handle.await;
        self.handle = None;
        match joined {
            Ok(()) => Ok(()),
            Err(e) if e.is_panic() => Err("worker panicked".to_string()),
            Err(e) => Err(e.to_string()),
        }
    }

    /// Blocking tasks cannot be preempted: a task already running finishes
    /// in the background and its result is discarded.
    fn terminate(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}
