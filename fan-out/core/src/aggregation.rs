// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::error::Result;

/// Combines the partial results of one run into a single result.
///
/// Partials arrive in channel-creation order, but implementations must not
/// depend on it: worker completion order is unspecified.
pub trait Aggregator<T>: Send + Sync {
    fn aggregate(&self, partials: Vec<T>) -> Result<T>;
}

impl<T, F> Aggregator<T> for F
where
    F: Fn(Vec<T>) -> Result<T> + Send + Sync,
{
    fn aggregate(&self, partials: Vec<T>) -> Result<T> {
        (self)(partials)
    }
}
