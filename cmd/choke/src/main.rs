//! Choke example
//!
//! Ramps synthetic pool load up and down and prints where the gate's
//! choke signal flips, then walks the reservation semaphore to capacity.
//!
//! # Environment Variables
//!
//! - `TBR_THREAD_LIMIT` / `TBR_SPARE_THREADS` - Gate configuration
//! - `TBR_LOG_LEVEL=debug` - Show the gate's own choke logging

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tbridge::{BridgeConfig, ConcurrencyGate, PoolTelemetry};

struct SyntheticPool {
    active: AtomicUsize,
    pending: AtomicUsize,
}

impl PoolTelemetry for SyntheticPool {
    fn active_requests(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    fn pending_requests(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }
}

fn main() {
    println!("=== tbridge Choke Example ===\n");

    let config = BridgeConfig::from_env();
    let pool = Arc::new(SyntheticPool {
        active: AtomicUsize::new(0),
        pending: AtomicUsize::new(0),
    });
    let gate = ConcurrencyGate::new(&config, Arc::clone(&pool) as Arc<dyn PoolTelemetry>);

    println!(
        "thread_limit={} spare_threads={} => chokes at active - pending >= {}\n",
        config.thread_limit,
        config.spare_threads,
        config.thread_limit - config.spare_threads
    );

    println!("Ramping active requests:");
    for active in 0..=config.thread_limit {
        pool.active.store(active, Ordering::SeqCst);
        println!("  active={} pending=0 -> choking={}", active, gate.is_choking());
    }

    println!("\nPending requests buy headroom back:");
    pool.active.store(config.thread_limit, Ordering::SeqCst);
    for pending in 0..=config.spare_threads + 1 {
        pool.pending.store(pending, Ordering::SeqCst);
        println!(
            "  active={} pending={} -> choking={}",
            config.thread_limit,
            pending,
            gate.is_choking()
        );
    }

    println!("\nWalking the reservation semaphore (pre-charged by 1):");
    let mut acquired = 0;
    while gate.acquire_thread() {
        acquired += 1;
        println!("  acquire_thread #{} -> true (reserved={})", acquired, gate.reserved_count());
    }
    println!("  acquire_thread #{} -> false (at capacity)", acquired + 1);

    for _ in 0..acquired {
        gate.release_thread();
    }
    println!("Released all; reserved back to {}", gate.reserved_count());

    println!("\n=== Example Complete ===");
}
