// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Monte-Carlo estimation of π.
//!
//! Points are drawn uniformly from the square `[-1, 1) x [-1, 1)`; the share
//! landing strictly inside the unit disk approaches `π / 4`.

use crate::worker_rng::worker_rng;
use fan_out_core::{WorkerSeed, WorkloadError};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Result of one estimation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PiEstimate {
    pub value: f64,
    /// Points that landed inside the unit disk.
    pub hits: usize,
    pub samples_used: usize,
}

impl PiEstimate {
    pub fn from_hits(hits: usize, samples_used: usize) -> Self {
        Self {
            value: 4.0 * hits as f64 / samples_used as f64,
            hits,
            samples_used,
        }
    }
}

/// One way of counting disk hits. Implementations are interchangeable: they
/// share the numeric contract and differ only in cost.
pub trait SampleEstimator: Send + Sync + 'static {
    /// Routing name of the workload built on this estimator.
    const NAME: &'static str;

    fn count_hits<R: Rng>(&self, sample_count: usize, rng: &mut R) -> usize;

    fn estimate<R: Rng>(
        &self,
        sample_count: usize,
        rng: &mut R,
    ) -> Result<PiEstimate, WorkloadError> {
        if sample_count == 0 {
            return Err(WorkloadError::InvalidArgument(
                "sample count must be positive".to_string(),
            ));
        }
        let hits = self.count_hits(sample_count, rng);
        Ok(PiEstimate::from_hits(hits, sample_count))
    }

    fn estimate_seeded(
        &self,
        sample_count: usize,
        seed: WorkerSeed,
    ) -> Result<PiEstimate, WorkloadError> {
        let mut rng = worker_rng(seed);
        self.estimate(sample_count, &mut rng)
    }
}

#[inline]
fn inside_unit_disk(x: f64, y: f64) -> bool {
    x * x + y * y < 1.0
}

/// Draws and tests one point at a time.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoopEstimator;

impl SampleEstimator for LoopEstimator {
    const NAME: &'static str = "pi-loop";

    fn count_hits<R: Rng>(&self, sample_count: usize, rng: &mut R) -> usize {
        let mut hits = 0;
        for _ in 0..sample_count {
            let x = rng.random_range(-1.0..1.0);
            let y = rng.random_range(-1.0..1.0);
            if inside_unit_disk(x, y) {
                hits += 1;
            }
        }
        hits
    }
}

/// Fills a block of coordinates in one pass, then reduces the block with a
/// single membership pass.
#[derive(Debug, Clone, Copy)]
pub struct BulkEstimator {
    block_points: usize,
}

impl BulkEstimator {
    pub const DEFAULT_BLOCK_POINTS: usize = 1 << 16;

    /// `block_points` bounds memory (two `f64` per point). Zero is treated as one.
    pub fn with_block_points(block_points: usize) -> Self {
        Self {
            block_points: block_points.max(1),
        }
    }

    pub fn block_points(&self) -> usize {
        self.block_points
    }
}

impl Default for BulkEstimator {
    fn default() -> Self {
        Self::with_block_points(Self::DEFAULT_BLOCK_POINTS)
    }
}

impl SampleEstimator for BulkEstimator {
    const NAME: &'static str = "pi-bulk";

    fn count_hits<R: Rng>(&self, sample_count: usize, rng: &mut R) -> usize {
        let mut coords = vec![0.0f64; 2 * self.block_points.min(sample_count)];
        let mut remaining = sample_count;
        let mut hits = 0;

        while remaining > 0 {
            let points = remaining.min(self.block_points);
            let block = &mut coords[..2 * points];
            for coord in block.iter_mut() {
                *coord = rng.random::<f64>() * 2.0 - 1.0;
            }
            hits += block
                .chunks_exact(2)
                .filter(|p| inside_unit_disk(p[0], p[1]))
                .count();
            remaining -= points;
        }
        hits
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_samples_is_invalid_for_both_forms() {
        let seed = WorkerSeed::new(1, 0);
        assert!(matches!(
            LoopEstimator.estimate_seeded(0, seed),
            Err(WorkloadError::InvalidArgument(_))
        ));
        assert!(matches!(
            BulkEstimator::default().estimate_seeded(0, seed),
            Err(WorkloadError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_estimate_reports_samples_used() {
        let estimate = LoopEstimator
            .estimate_seeded(1_234, WorkerSeed::new(3, 0))
            .unwrap();
        assert_eq!(estimate.samples_used, 1_234);
        assert!(estimate.hits <= 1_234);
        assert_eq!(estimate.value, 4.0 * estimate.hits as f64 / 1_234.0);
    }

    #[test]
    fn test_block_size_does_not_change_hit_count() {
        // The bulk form consumes the stream in the same order whatever the
        // block size, so hits must match exactly.
        let seed = WorkerSeed::new(11, 4);
        let whole = BulkEstimator::with_block_points(10_000)
            .estimate_seeded(10_000, seed)
            .unwrap();
        let blocked = BulkEstimator::with_block_points(333)
            .estimate_seeded(10_000, seed)
            .unwrap();
        assert_eq!(whole, blocked);
    }

    #[test]
    fn test_zero_block_points_is_clamped() {
        assert_eq!(BulkEstimator::with_block_points(0).block_points(), 1);
    }

    #[test]
    fn test_seeded_estimate_is_reproducible() {
        let seed = WorkerSeed::new(42, 7);
        let first = LoopEstimator.estimate_seeded(5_000, seed).unwrap();
        let second = LoopEstimator.estimate_seeded(5_000, seed).unwrap();
        assert_eq!(first, second);
    }
}
