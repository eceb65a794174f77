// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::pipe_protocol::WorkerResponse;
use fan_out_core::{WorkerAssignment, Workload, WorkloadError};
use serde_json::Value;
use std::collections::HashMap;
use std::io::{Read, Write};
use tracing::debug;

type Entry = Box<dyn Fn(Value) -> serde_json::Result<Value> + Send + Sync>;

/// Worker-side table of the workloads a binary can serve, keyed by
/// [`Workload::name`].
#[derive(Default)]
pub struct WorkerRegistry {
    entries: HashMap<&'static str, Entry>,
}

impl WorkerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<W: Workload>(mut self, workload: W) -> Self {
        let name = workload.name();
        let entry: Entry = Box::new(move |request| {
            let response = match serde_json::from_value::<WorkerAssignment<W::Args>>(request) {
                Ok(assignment) => {
                    debug!(
                        workload = name,
                        worker = assignment.worker_id,
                        "serving assignment"
                    );
                    WorkerResponse::from_outcome(assignment.run(&workload))
                }
                Err(e) => WorkerResponse::Failed {
                    error: WorkloadError::InvalidArgument(format!("malformed assignment: {e}")),
                },
            };
            serde_json::to_value(response)
        });
        self.entries.insert(name, entry);
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Reads one assignment from `input` to its end and writes one response
    /// to `output`. Assignments for unregistered workloads get a `Failed`
    /// response.
    pub fn serve<R: Read, W: Write>(&self, mut input: R, mut output: W) -> std::io::Result<()> {
        let mut request = Vec::new();
        input.read_to_end(&mut request)?;
        let request: Value = serde_json::from_slice(&request)?;

        let name = request
            .get("workload")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let response = match self.entries.get(name.as_str()) {
            Some(entry) => entry(request)?,
            None => serde_json::to_value(WorkerResponse::<()>::Failed {
                error: WorkloadError::InvalidArgument(format!("unknown workload '{name}'")),
            })?,
        };

        serde_json::to_writer(&mut output, &response)?;
        output.flush()
    }
}
