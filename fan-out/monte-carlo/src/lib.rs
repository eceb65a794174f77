// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

mod worker_rng;
pub use worker_rng::worker_rng;

pub mod sample_estimator;
pub use sample_estimator::{BulkEstimator, LoopEstimator, PiEstimate, SampleEstimator};

mod pi_workload;
pub use pi_workload::{
    mean_estimate, weighted_mean_estimate, EstimateAggregation, PiArgs, PiWorkload,
};

pub mod escape_field;
pub use escape_field::{compute, compute_rows, escape_time, Bounds, EscapeField, FieldArray, Grid, Resolution};

mod field_workload;
pub use field_workload::{concatenate_rows, FieldArgs, FieldWorkload, RowSpan};
