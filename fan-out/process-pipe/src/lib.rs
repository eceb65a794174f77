// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

mod pipe_protocol;
pub use pipe_protocol::{decode_response, encode_request, WorkerResponse};

mod process_runtime;
pub use process_runtime::{ProcessHandle, ProcessRuntime, WORKER_SUBCOMMAND};

mod worker_registry;
pub use worker_registry::WorkerRegistry;
