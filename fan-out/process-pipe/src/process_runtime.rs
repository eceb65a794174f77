// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::pipe_protocol::{decode_response, encode_request};
use async_trait::async_trait;
use fan_out_core::{
    DispatchError, Result, ResultSender, WorkerAssignment, WorkerHandle, WorkerRuntime, Workload,
};
use serde::de::DeserializeOwned;
use std::ffi::OsString;
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Subcommand under which a binary serves one assignment from stdin.
pub const WORKER_SUBCOMMAND: &str = "worker";

/// Process-based runtime: one child process per worker.
#[derive(Debug, Clone)]
pub struct ProcessRuntime {
    program: PathBuf,
    args: Vec<OsString>,
}

impl ProcessRuntime {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Re-executes the running binary in worker mode.
    pub fn current_exe() -> std::io::Result<Self> {
        Ok(Self::new(std::env::current_exe()?).arg(WORKER_SUBCOMMAND))
    }

    pub fn program(&self) -> &PathBuf {
        &self.program
    }
}

impl WorkerRuntime for ProcessRuntime {
    type Handle = ProcessHandle;

    fn launch<W: Workload>(
        &self,
        _workload: Arc<W>,
        assignment: WorkerAssignment<W::Args>,
        results: ResultSender<W::Output>,
    ) -> Result<ProcessHandle> {
        let worker_id = assignment.worker_id;
        let launch_failure = |reason: String| DispatchError::WorkerLaunchFailure {
            worker: worker_id,
            reason,
        };

        let runtime = Handle::try_current().map_err(|e| launch_failure(e.to_string()))?;
        let request = encode_request(&assignment).map_err(|e| launch_failure(e.to_string()))?;

        let mut child = {
            // Child registration needs the runtime's reactor.
            let _guard = runtime.enter();
            Command::new(&self.program)
                .args(&self.args)
                .stdin(Stdio::piped())
                .stdout(Stdio::piped())
                .stderr(Stdio::inherit())
                .kill_on_drop(true)
                .spawn()
                .map_err(|e| {
                    launch_failure(format!("{}: {}", self.program.display(), e))
                })?
        };

        let (Some(stdin), Some(stdout)) = (child.stdin.take(), child.stdout.take()) else {
            return Err(launch_failure("worker pipes unavailable".to_string()));
        };
        debug!(worker = worker_id, pid = ?child.id(), "worker process spawned");

        let io = runtime.spawn(exchange(worker_id, stdin, stdout, request, results));

        Ok(ProcessHandle {
            worker_id,
            child,
            io: Some(io),
        })
    }
}

/// Writes the request, then reads the child's stdout to the end. Any failure
/// drops `results` unsent.
async fn exchange<T: DeserializeOwned>(
    worker_id: usize,
    mut stdin: ChildStdin,
    mut stdout: ChildStdout,
    request: Vec<u8>,
    results: ResultSender<T>,
) {
    let written = async {
        stdin.write_all(&request).await?;
        stdin.shutdown().await
    };
    if let Err(e) = written.await {
        warn!(worker = worker_id, error = %e, "failed to send assignment");
        return;
    }
    drop(stdin);

    let mut output = Vec::new();
    if let Err(e) = stdout.read_to_end(&mut output).await {
        warn!(worker = worker_id, error = %e, "failed to read worker output");
        return;
    }

    match decode_response::<T>(&output) {
        Ok(Some(response)) => {
            if !results.send(response.into_outcome()) {
                debug!(worker = worker_id, "result discarded, dispatcher gone");
            }
        }
        Ok(None) => debug!(worker = worker_id, "worker wrote no result"),
        Err(e) => warn!(worker = worker_id, error = %e, "undecodable worker response"),
    }
}

pub struct ProcessHandle {
    worker_id: usize,
    child: Child,
    io: Option<JoinHandle<()>>,
}

#[async_trait]
impl WorkerHandle for ProcessHandle {
    fn worker_id(&self) -> usize {
        self.worker_id
    }

    async fn join(&mut self) -> std::result::Result<(), String> {
        if let Some(io) = self.io.as_mut() {
            let exchanged = io.await;
            self.io = None;
            if let Err(e) = exchanged {
                if !e.is_cancelled() {
                    return Err(format!("pipe task failed: {e}"));
                }
            }
        }

        let status = self.child.wait().await.map_err(|e| e.to_string())?;
        if status.success() {
            Ok(())
        } else {
            Err(format!("worker exited with {status}"))
        }
    }

    fn terminate(&mut self) {
        if let Some(io) = self.io.take() {
            io.abort();
        }
        if let Err(e) = self.child.start_kill() {
            // Already reaped.
            debug!(worker = self.worker_id, error = %e, "kill skipped");
        }
    }
}
