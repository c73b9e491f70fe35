//! Submit a handful of NOPs through a small ring and collect them
//!
//! Run with `cargo run --example roundtrip -- [depth]`. More operations are
//! pushed than the ring holds, so the loop drains completions whenever the
//! ring reports it is full.

use std::time::Duration;
use uring_core::{ops::Nop, Error, Ring, RingConfig};

const OPERATIONS: u64 = 16;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let depth = std::env::args()
        .nth(1)
        .map(|arg| arg.parse())
        .transpose()?
        .unwrap_or(4);

    let config = RingConfig::new(depth).with_wait_timeout(Duration::from_secs(1));
    let mut ring = Ring::with_config(config)?;
    println!("ring ready with {} slots", ring.capacity());

    let mut next = 0;
    let mut completed = 0;

    while completed < OPERATIONS {
        while next < OPERATIONS {
            match ring.push(&Nop, next) {
                Ok(()) => next += 1,
                Err(Error::QueueFull) => break,
                Err(e) => return Err(e.into()),
            }
        }
        ring.submit()?;

        match ring.next_completion() {
            Ok(cqe) => {
                println!("  op {:>2} -> result {}", cqe.user_data(), cqe.result());
                cqe.mark_seen();
                completed += 1;
            }
            Err(Error::Interrupted) => continue,
            Err(e) => return Err(e.into()),
        }
    }

    println!("{} operations completed, stats: {:?}", completed, ring.stats());
    Ok(())
}
