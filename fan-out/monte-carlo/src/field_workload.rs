// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::escape_field::{compute_rows, EscapeField, FieldArray, Grid};
use fan_out_core::{DispatchError, Partition, PartitionPolicy, WorkerSeed, Workload, WorkloadError};
use serde::{Deserialize, Serialize};

/// Band of grid rows a worker is responsible for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowSpan {
    pub start: usize,
    pub len: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldArgs {
    pub grid: Grid,
    pub max_iter: u32,
    pub rows: RowSpan,
}

impl FieldArgs {
    /// Arguments covering every row of `grid`.
    pub fn new(grid: Grid, max_iter: u32) -> Self {
        Self {
            grid,
            max_iter,
            rows: RowSpan {
                start: 0,
                len: grid.resolution().ny,
            },
        }
    }
}

/// Escape-time field as a dispatchable workload, partitioned by row range.
#[derive(Debug, Clone, Copy, Default)]
pub struct FieldWorkload;

impl FieldWorkload {
    pub const NAME: &'static str = "escape-field";
}

impl Workload for FieldWorkload {
    type Args = FieldArgs;
    type Output = EscapeField;

    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn partition_policy(&self) -> PartitionPolicy {
        PartitionPolicy::Contiguous
    }

    fn total_size(&self, args: &FieldArgs) -> usize {
        args.rows.len
    }

    fn validate(&self, args: &FieldArgs) -> Result<(), WorkloadError> {
        args.grid.validate()?;
        if args.max_iter == 0 {
            return Err(WorkloadError::InvalidArgument(
                "max_iter must be positive".to_string(),
            ));
        }
        if args.rows.start + args.rows.len > args.grid.resolution().ny {
            return Err(WorkloadError::InvalidArgument(
                "row span exceeds grid".to_string(),
            ));
        }
        Ok(())
    }

    fn partition_args(&self, args: &FieldArgs, partition: &Partition) -> FieldArgs {
        FieldArgs {
            rows: RowSpan {
                start: args.rows.start + partition.offset,
                len: partition.size,
            },
            ..args.clone()
        }
    }

    fn execute(&self, args: &FieldArgs, _seed: WorkerSeed) -> Result<EscapeField, WorkloadError> {
        let rows = args.rows.start..args.rows.start + args.rows.len;
        compute_rows(&args.grid, rows, args.max_iter)
    }
}

/// Stitches row bands back together, ordered by row offset. Bands must be
/// contiguous and of equal width.
pub fn concatenate_rows(mut partials: Vec<EscapeField>) -> fan_out_core::Result<EscapeField> {
    partials.sort_by_key(|band| band.row_offset);
    let first = partials
        .first()
        .ok_or_else(|| DispatchError::aggregation("no row bands"))?;
    let row_offset = first.row_offset;
    let cols = first.iterations.cols();

    let mut next_row = row_offset;
    let mut iterations = Vec::new();
    let mut magnitudes = Vec::new();
    for band in partials {
        if band.row_offset != next_row {
            return Err(DispatchError::aggregation(format!(
                "row band at {} does not follow row {}",
                band.row_offset, next_row
            )));
        }
        if band.iterations.cols() != cols || band.magnitudes.cols() != cols {
            return Err(DispatchError::aggregation(format!(
                "row band at {} is not {} columns wide",
                band.row_offset, cols
            )));
        }
        next_row += band.iterations.rows();
        iterations.extend(band.iterations.into_vec());
        magnitudes.extend(band.magnitudes.into_vec());
    }

    let rows = next_row - row_offset;
    let iterations = FieldArray::from_vec(rows, cols, iterations)
        .ok_or_else(|| DispatchError::aggregation("iteration band shape mismatch"))?;
    let magnitudes = FieldArray::from_vec(rows, cols, magnitudes)
        .ok_or_else(|| DispatchError::aggregation("magnitude band shape mismatch"))?;

    Ok(EscapeField {
        row_offset,
        iterations,
        magnitudes,
    })
}
