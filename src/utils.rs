use std::time::{Duration, Instant};

use crate::proven_set::{Prop, ProvenSet};

pub fn prop_set(input: &[Prop]) -> ProvenSet {
    input.iter().copied().collect()
}

pub fn run_repeatedly_and_average<F: FnMut()>(mut run: F, runs: u32) -> Duration {
    // Time `runs` calls of `run` and report the mean wall-clock time.
    let runs = runs.max(1);
    let start = Instant::now();
    for _ in 0..runs {
        run();
    }
    let average = start.elapsed() / runs;
    println!("Average time over {runs} runs: {average:?}");
    average
}
