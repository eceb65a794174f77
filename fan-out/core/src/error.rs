// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Error types for workload dispatch.
//!
//! [`WorkloadError`] is what a single unit of work reports. It is
//! serializable so a worker living in another process can hand it back over
//! its result pipe. [`DispatchError`] is what a `run` call reports to its
//! caller; every failure is surfaced once, for the whole call, never per
//! worker.

use serde::{Deserialize, Serialize};
use std::time::Duration;

pub type Result<T> = core::result::Result<T, DispatchError>;

/// Failure reported by a workload body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum WorkloadError {
    /// The arguments handed to the workload are unusable.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The workload started but could not produce a result.
    #[error("workload failed: {0}")]
    Failed(String),
}

/// Failure of a whole dispatch call.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DispatchError {
    /// Rejected before any worker was launched.
    #[error("Invalid argument: {reason}")]
    InvalidArgument { reason: String },

    /// The runtime could not create a worker.
    #[error("Worker {worker} could not be launched: {reason}")]
    WorkerLaunchFailure { worker: usize, reason: String },

    /// A worker terminated, or its wait elapsed, without a usable result.
    #[error("Worker {worker} produced no result: {reason}")]
    WorkerResultMissing { worker: usize, reason: String },

    /// The workers did not all terminate before the dispatch deadline.
    #[error("Workers did not finish within {deadline:?}")]
    WorkerTimeout { deadline: Duration },

    /// The dispatch was cancelled from outside.
    #[error("Dispatch cancelled")]
    Cancelled,

    /// The fast path ran the workload inline and it failed.
    #[error("Workload failed: {reason}")]
    WorkloadFailed { reason: String },

    /// Partial results could not be combined.
    #[error("Aggregation failed: {reason}")]
    Aggregation { reason: String },
}

impl DispatchError {
    pub fn invalid_argument(reason: impl Into<String>) -> Self {
        DispatchError::InvalidArgument {
            reason: reason.into(),
        }
    }

    pub fn aggregation(reason: impl Into<String>) -> Self {
        DispatchError::Aggregation {
            reason: reason.into(),
        }
    }
}

impl From<WorkloadError> for DispatchError {
    fn from(err: WorkloadError) -> Self {
        match err {
            WorkloadError::InvalidArgument(reason) => DispatchError::InvalidArgument { reason },
            WorkloadError::Failed(reason) => DispatchError::WorkloadFailed { reason },
        }
    }
}

/// Failure loading a [`DispatchConfig`](crate::DispatchConfig) file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}
