// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use fan_out_core::WorkerSeed;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Random source for one worker: one seed for the run, one stream per worker,
/// so no two workers ever draw the same sequence.
pub fn worker_rng(seed: WorkerSeed) -> ChaCha8Rng {
    let mut rng = ChaCha8Rng::seed_from_u64(seed.base);
    rng.set_stream(seed.stream);
    rng
}
