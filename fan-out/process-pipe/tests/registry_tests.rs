// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use fan_out_core::{WorkerAssignment, WorkerSeed, WorkloadError};
use fan_out_monte_carlo::{
    Bounds, BulkEstimator, EscapeField, FieldArgs, FieldWorkload, Grid, LoopEstimator, PiArgs,
    PiEstimate, PiWorkload, Resolution,
};
use fan_out_process_pipe::{decode_response, encode_request, WorkerRegistry, WorkerResponse};

fn registry() -> WorkerRegistry {
    WorkerRegistry::new()
        .register(PiWorkload::new(LoopEstimator))
        .register(PiWorkload::new(BulkEstimator::default()))
        .register(FieldWorkload)
}

fn serve_bytes(request: &[u8]) -> Vec<u8> {
    let mut output = Vec::new();
    registry().serve(request, &mut output).unwrap();
    output
}

// ============================================================
// Routing
// ============================================================

#[test]
fn test_registered_workloads_are_routable() {
    let registry = registry();
    assert!(registry.contains("pi-loop"));
    assert!(registry.contains("pi-bulk"));
    assert!(registry.contains("escape-field"));
    assert!(!registry.contains("word-search"));
}

#[test]
fn test_pi_assignment_is_served() {
    let assignment = WorkerAssignment {
        workload: "pi-bulk".to_string(),
        worker_id: 1,
        seed: WorkerSeed::new(4, 1),
        args: PiArgs { samples: 10_000 },
    };
    let output = serve_bytes(&encode_request(&assignment).unwrap());
    let response = decode_response::<PiEstimate>(&output).unwrap().unwrap();
    let estimate = response.into_outcome().unwrap();
    assert_eq!(estimate.samples_used, 10_000);
}

#[test]
fn test_served_result_matches_in_process_execution() {
    use fan_out_core::Workload;

    let seed = WorkerSeed::new(17, 3);
    let assignment = WorkerAssignment {
        workload: "pi-loop".to_string(),
        worker_id: 3,
        seed,
        args: PiArgs { samples: 2_000 },
    };
    let output = serve_bytes(&encode_request(&assignment).unwrap());
    let served = decode_response::<PiEstimate>(&output).unwrap().unwrap();
    let local = PiWorkload::new(LoopEstimator)
        .execute(&assignment.args, seed)
        .unwrap();
    assert_eq!(served, WorkerResponse::Completed { output: local });
}

#[test]
fn test_field_band_is_served() {
    let grid = Grid::new(Bounds::default(), Resolution::new(16, 8)).unwrap();
    let mut args = FieldArgs::new(grid, 40);
    args.rows.start = 4;
    args.rows.len = 4;
    let assignment = WorkerAssignment {
        workload: "escape-field".to_string(),
        worker_id: 1,
        seed: WorkerSeed::new(0, 1),
        args,
    };
    let output = serve_bytes(&encode_request(&assignment).unwrap());
    let band: EscapeField = decode_response(&output)
        .unwrap()
        .unwrap()
        .into_outcome()
        .unwrap();
    assert_eq!(band.row_offset, 4);
    assert_eq!(band.iterations.rows(), 4);
}

// ============================================================
// Failures travel back as responses
// ============================================================

#[test]
fn test_unknown_workload_gets_failed_response() {
    let assignment = WorkerAssignment {
        workload: "word-search".to_string(),
        worker_id: 0,
        seed: WorkerSeed::new(0, 0),
        args: 3u32,
    };
    let output = serve_bytes(&encode_request(&assignment).unwrap());
    let outcome = decode_response::<PiEstimate>(&output)
        .unwrap()
        .unwrap()
        .into_outcome();
    assert!(matches!(outcome, Err(WorkloadError::InvalidArgument(_))));
}

#[test]
fn test_malformed_args_get_failed_response() {
    let request = br#"{"workload":"pi-loop","worker_id":0,"seed":{"base":1,"stream":0},"args":"lots"}"#;
    let outcome = decode_response::<PiEstimate>(&serve_bytes(request))
        .unwrap()
        .unwrap()
        .into_outcome();
    assert!(matches!(outcome, Err(WorkloadError::InvalidArgument(_))));
}

#[test]
fn test_workload_error_is_forwarded() {
    let assignment = WorkerAssignment {
        workload: "pi-loop".to_string(),
        worker_id: 0,
        seed: WorkerSeed::new(0, 0),
        args: PiArgs { samples: 0 },
    };
    let output = serve_bytes(&encode_request(&assignment).unwrap());
    let outcome = decode_response::<PiEstimate>(&output)
        .unwrap()
        .unwrap()
        .into_outcome();
    assert!(matches!(outcome, Err(WorkloadError::InvalidArgument(_))));
}

#[test]
fn test_non_json_input_is_an_io_error() {
    let mut output = Vec::new();
    assert!(registry().serve(&b"hello"[..], &mut output).is_err());
    assert!(output.is_empty());
}
