// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

mod tokio_runtime;
pub use tokio_runtime::{TaskHandle, TaskRuntime};

mod api;
pub use api::{compute_field, estimate_pi};
