// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

pub mod error;
pub use error::{ConfigError, DispatchError, Result, WorkloadError};

mod work_request;
pub use work_request::{Partition, PartitionPolicy, WorkloadRequest};

mod workload;
pub use workload::{WorkerAssignment, WorkerSeed, Workload};

mod aggregation;
pub use aggregation::Aggregator;

mod result_channel;
pub use result_channel::{result_channel, ResultReceiver, ResultSender};

mod worker_runtime;
pub use worker_runtime::{WorkerHandle, WorkerRuntime};

mod dispatch_config;
pub use dispatch_config::DispatchConfig;

mod dispatcher;
pub use dispatcher::WorkDispatcher;
