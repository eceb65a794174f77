// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! JSON framing between the dispatcher and a worker process.
//!
//! The dispatcher writes one [`WorkerAssignment`] to the child's stdin and
//! closes it. The child writes one [`WorkerResponse`] to stdout and exits.
//! A child that exits without writing anything produced no result.

use fan_out_core::{WorkerAssignment, WorkloadError};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum WorkerResponse<T> {
    Completed { output: T },
    Failed { error: WorkloadError },
}

impl<T> WorkerResponse<T> {
    pub fn from_outcome(outcome: Result<T, WorkloadError>) -> Self {
        match outcome {
            Ok(output) => WorkerResponse::Completed { output },
            Err(error) => WorkerResponse::Failed { error },
        }
    }

    pub fn into_outcome(self) -> Result<T, WorkloadError> {
        match self {
            WorkerResponse::Completed { output } => Ok(output),
            WorkerResponse::Failed { error } => Err(error),
        }
    }
}

pub fn encode_request<A: Serialize>(
    assignment: &WorkerAssignment<A>,
) -> serde_json::Result<Vec<u8>> {
    serde_json::to_vec(assignment)
}

/// `Ok(None)` when the worker wrote nothing but whitespace.
pub fn decode_response<T: DeserializeOwned>(
    bytes: &[u8],
) -> serde_json::Result<Option<WorkerResponse<T>>> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    serde_json::from_slice(bytes).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fan_out_core::WorkerSeed;

    #[test]
    fn test_request_carries_routing_name_and_seed() {
        let assignment = WorkerAssignment {
            workload: "pi-bulk".to_string(),
            worker_id: 2,
            seed: WorkerSeed::new(10, 2),
            args: 500u64,
        };
        let json: serde_json::Value =
            serde_json::from_slice(&encode_request(&assignment).unwrap()).unwrap();
        assert_eq!(json["workload"], "pi-bulk");
        assert_eq!(json["worker_id"], 2);
        assert_eq!(json["seed"]["stream"], 2);
        assert_eq!(json["args"], 500);
    }

    #[test]
    fn test_completed_response_decodes() {
        let bytes = br#"{"status":"completed","output":7}"#;
        let response = decode_response::<u32>(bytes).unwrap();
        assert_eq!(response, Some(WorkerResponse::Completed { output: 7 }));
    }

    #[test]
    fn test_failed_response_decodes_to_workload_error() {
        let response = WorkerResponse::<u32>::from_outcome(Err(WorkloadError::Failed(
            "disk full".to_string(),
        )));
        let bytes = serde_json::to_vec(&response).unwrap();
        let decoded = decode_response::<u32>(&bytes).unwrap().unwrap();
        assert_eq!(
            decoded.into_outcome(),
            Err(WorkloadError::Failed("disk full".to_string()))
        );
    }

    #[test]
    fn test_empty_output_is_no_response() {
        assert_eq!(decode_response::<u32>(b"").unwrap(), None);
        assert_eq!(decode_response::<u32>(b" \n").unwrap(), None);
    }

    #[test]
    fn test_garbage_output_is_an_error() {
        assert!(decode_response::<u32>(b"not json").is_err());
    }
}
