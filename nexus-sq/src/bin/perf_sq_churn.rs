//! Profiling binary for buzzer churn (give/kick/bribe/seat cycles).
//!
//! Run with:
//!   cargo build --release --bin perf_sq_churn
//!   perf stat -e cycles,instructions,cache-misses,cache-references \
//!       ./target/release/perf_sq_churn

use std::hint::black_box;

use nexus_sq::{Buzzer, ServiceQueue};

const LINE: usize = 100_000;
const CYCLES: usize = 10_000_000;

fn main() {
    let mut q = ServiceQueue::with_capacity(LINE);
    for _ in 0..LINE {
        q.give_buzzer();
    }

    // Strided ids so kicks and bribes land all over the line
    for i in 0..CYCLES {
        let target = Buzzer::new(((i * 7919) % LINE) as u32);
        if q.kick_out(target) {
            black_box(q.give_buzzer());
        }
        black_box(q.take_bribe(target));
        black_box(q.seat());
        black_box(q.give_buzzer());
    }
}
