//! Cycle-accurate per-operation latency for the service queue using rdtscp.
//!
//! Measures give/kick/bribe/seat against a long line with random targets.
//!
//! Run with:
//!   cargo build --release --example perf_sq_cycles
//!   taskset -c 0 ./target/release/examples/perf_sq_cycles

use std::hint::black_box;

use hdrhistogram::Histogram;
use nexus_sq::{Buzzer, ServiceQueue};
use rand::{Rng, SeedableRng, rngs::StdRng};

const LINE: usize = 100_000;
const OPS: usize = 1_000_000;

#[inline(always)]
fn rdtscp() -> u64 {
    #[cfg(target_arch = "x86_64")]
    unsafe {
        let mut aux: u32 = 0;
        std::arch::x86_64::__rdtscp(&mut aux)
    }
    #[cfg(not(target_arch = "x86_64"))]
    {
        panic!("rdtscp only supported on x86_64");
    }
}

fn print_stats(name: &str, hist: &Histogram<u64>) {
    println!("{}", name);
    println!("  min:  {:>6} cycles", hist.min());
    println!("  p50:  {:>6} cycles", hist.value_at_quantile(0.50));
    println!("  p99:  {:>6} cycles", hist.value_at_quantile(0.99));
    println!("  p999: {:>6} cycles", hist.value_at_quantile(0.999));
    println!("  max:  {:>6} cycles", hist.max());
    println!("  avg:  {:>6.0} cycles", hist.mean());
}

struct Hists {
    give: Histogram<u64>,
    kick: Histogram<u64>,
    bribe: Histogram<u64>,
    seat: Histogram<u64>,
}

fn run() -> Hists {
    let mut q = ServiceQueue::with_capacity(LINE);
    let mut rng = StdRng::seed_from_u64(0x5eed);
    let mut hists = Hists {
        give: Histogram::new(3).unwrap(),
        kick: Histogram::new(3).unwrap(),
        bribe: Histogram::new(3).unwrap(),
        seat: Histogram::new(3).unwrap(),
    };

    for _ in 0..LINE {
        q.give_buzzer();
    }

    for _ in 0..OPS {
        let target = Buzzer::new(rng.gen_range(0..LINE as u32));

        let start = rdtscp();
        black_box(q.take_bribe(target));
        let end = rdtscp();
        let _ = hists.bribe.record(end.wrapping_sub(start));

        let start = rdtscp();
        black_box(q.kick_out(target));
        let end = rdtscp();
        let _ = hists.kick.record(end.wrapping_sub(start));

        let start = rdtscp();
        black_box(q.give_buzzer());
        let end = rdtscp();
        let _ = hists.give.record(end.wrapping_sub(start));

        let start = rdtscp();
        black_box(q.seat());
        let end = rdtscp();
        let _ = hists.seat.record(end.wrapping_sub(start));

        q.give_buzzer();
    }

    hists
}

fn main() {
    println!("Service queue latency ({} rounds, line of {})", OPS, LINE);
    println!("========================================");
    println!();

    let hists = run();
    print_stats("give_buzzer:", &hists.give);
    println!();
    print_stats("kick_out:", &hists.kick);
    println!();
    print_stats("take_bribe:", &hists.bribe);
    println!();
    print_stats("seat:", &hists.seat);
}
