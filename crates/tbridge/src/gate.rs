//! ConcurrencyGate - admission control for the blocking worker pool
//!
//! Bounds how much blocking work may be in flight on a shared, fixed-size
//! pool so the pool is never starved. Two independent mechanisms:
//!
//! - `is_choking()`: an advisory load-shedding signal computed from live
//!   pool telemetry. Cheap to poll before dispatching new blocking work;
//!   nothing enforces it.
//! - `acquire_thread()`/`release_thread()`: an explicit counting
//!   semaphore, pre-charged by one unit for internal needs. Caller-driven
//!   reservation gives exact accounting even when pool telemetry lags.
//!
//! None of the operations fail: they are total functions over the
//! counters. Unbalanced release is a programmer defect and asserts.
//! Prefer `reserve()` - the guard releases on every exit path.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tbridge_core::{bdebug, binfo};
use tbridge_core::PoolTelemetry;

use crate::config::BridgeConfig;

/// Process-lifetime admission controller over a fixed worker pool.
pub struct ConcurrencyGate {
    thread_limit: usize,
    spare_threads: usize,

    /// Explicit reservation semaphore; starts at 1 (internal pre-charge)
    reserved: AtomicUsize,

    /// Live pool counters, sampled on demand; owned by the pool
    pool: Arc<dyn PoolTelemetry>,
}

impl ConcurrencyGate {
    /// Build the gate. The config must be valid (`thread_limit >= 1`,
    /// `spare_threads < thread_limit`); anything else is a startup
    /// programmer error.
    pub fn new(config: &BridgeConfig, pool: Arc<dyn PoolTelemetry>) -> Self {
        assert!(
            config.is_valid(),
            "invalid gate config: thread_limit={}, spare_threads={}",
            config.thread_limit,
            config.spare_threads
        );
        binfo!(
            "Concurrency: {} (w/ {} spare threads)",
            config.thread_limit,
            config.spare_threads
        );
        Self {
            thread_limit: config.thread_limit,
            spare_threads: config.spare_threads,
            // Preallocate a thread for internal needs.
            reserved: AtomicUsize::new(1),
            pool,
        }
    }

    /// True when in-flight blocking work has eaten into the reserved
    /// headroom: `thread_limit - spare_threads <= active - pending`.
    ///
    /// Signed arithmetic: sampled telemetry may lag, so `pending` can
    /// exceed `active` transiently. Advisory only.
    pub fn is_choking(&self) -> bool {
        let active = self.pool.active_requests() as i64;
        let pending = self.pool.pending_requests() as i64;
        let headroom = (self.thread_limit - self.spare_threads) as i64;

        if headroom <= active - pending {
            bdebug!("We are choking!");
            true
        } else {
            false
        }
    }

    /// Reserve one semaphore unit. Returns false at capacity
    /// (`thread_limit`). Never blocks.
    pub fn acquire_thread(&self) -> bool {
        let mut current = self.reserved.load(Ordering::Relaxed);
        loop {
            if current >= self.thread_limit {
                return false;
            }
            match self.reserved.compare_exchange_weak(
                current,
                current + 1,
                Ordering::AcqRel,
                Ordering::Relaxed,
            ) {
                Ok(_) => return true,
                Err(actual) => current = actual,
            }
        }
    }

    /// Return one semaphore unit. Exactly once per successful
    /// `acquire_thread`; releasing more than was acquired asserts.
    pub fn release_thread(&self) {
        let prev = self.reserved.fetch_sub(1, Ordering::AcqRel);
        assert!(prev > 0, "release_thread without a matching acquire_thread");
    }

    /// Scoped acquisition: reserve a unit and get a guard that releases
    /// on drop, on every exit path including panics.
    pub fn reserve(&self) -> Option<ThreadReservation<'_>> {
        if self.acquire_thread() {
            Some(ThreadReservation { gate: self })
        } else {
            None
        }
    }

    /// Currently reserved units, pre-charge included (hint).
    pub fn reserved_count(&self) -> usize {
        self.reserved.load(Ordering::Relaxed)
    }

    pub fn thread_limit(&self) -> usize {
        self.thread_limit
    }

    pub fn spare_threads(&self) -> usize {
        self.spare_threads
    }
}

/// RAII reservation handle; dropping it releases the unit.
pub struct ThreadReservation<'a> {
    gate: &'a ConcurrencyGate,
}

impl Drop for ThreadReservation<'_> {
    fn drop(&mut self) {
        self.gate.release_thread();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Synthetic pool counters for gate tests.
    struct TestPool {
        active: AtomicUsize,
        pending: AtomicUsize,
    }

    impl TestPool {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                active: AtomicUsize::new(0),
                pending: AtomicUsize::new(0),
            })
        }

        fn set(&self, active: usize, pending: usize) {
            self.active.store(active, Ordering::SeqCst);
            self.pending.store(pending, Ordering::SeqCst);
        }
    }

    impl PoolTelemetry for TestPool {
        fn active_requests(&self) -> usize {
            self.active.load(Ordering::SeqCst)
        }

        fn pending_requests(&self) -> usize {
            self.pending.load(Ordering::SeqCst)
        }
    }

    fn gate(limit: usize, spare: usize, pool: Arc<TestPool>) -> ConcurrencyGate {
        let config = BridgeConfig::new().thread_limit(limit).spare_threads(spare);
        ConcurrencyGate::new(&config, pool)
    }

    #[test]
    fn test_choking_formula() {
        let pool = TestPool::new();
        let g = gate(8, 2, Arc::clone(&pool));

        // headroom = 6; chokes iff active - pending >= 6
        pool.set(0, 0);
        assert!(!g.is_choking());
        pool.set(5, 0);
        assert!(!g.is_choking());
        pool.set(6, 0);
        assert!(g.is_choking());
        pool.set(8, 0);
        assert!(g.is_choking());
        pool.set(8, 3);
        assert!(!g.is_choking());
        // Lagged telemetry: pending above active must not wrap.
        pool.set(0, 10);
        assert!(!g.is_choking());
    }

    #[test]
    fn test_choking_with_zero_spare() {
        let pool = TestPool::new();
        let g = gate(4, 0, Arc::clone(&pool));

        pool.set(3, 0);
        assert!(!g.is_choking());
        pool.set(4, 0);
        assert!(g.is_choking());
    }

    #[test]
    fn test_acquire_succeeds_limit_minus_precharge_times() {
        let g = gate(4, 0, TestPool::new());

        // Pre-charged at 1, capped at 4: three successes then false.
        assert!(g.acquire_thread());
        assert!(g.acquire_thread());
        assert!(g.acquire_thread());
        assert!(!g.acquire_thread());
        assert_eq!(g.reserved_count(), 4);
    }

    #[test]
    fn test_acquire_example_limit_two() {
        let g = gate(2, 0, TestPool::new());

        assert!(g.acquire_thread());
        assert!(!g.acquire_thread());
        assert!(!g.acquire_thread());
    }

    #[test]
    fn test_release_restores_one_slot() {
        let g = gate(2, 0, TestPool::new());

        assert!(g.acquire_thread());
        assert!(!g.acquire_thread());
        g.release_thread();
        assert!(g.acquire_thread());
        assert!(!g.acquire_thread());
    }

    #[test]
    fn test_reservation_guard_releases_on_drop() {
        let g = gate(2, 0, TestPool::new());

        {
            let reservation = g.reserve();
            assert!(reservation.is_some());
            assert!(g.reserve().is_none());
        }
        assert_eq!(g.reserved_count(), 1);
        assert!(g.reserve().is_some());
    }

    #[test]
    #[should_panic(expected = "release_thread without a matching acquire_thread")]
    fn test_over_release_asserts() {
        let g = gate(2, 0, TestPool::new());
        g.release_thread(); // returns the pre-charge
        g.release_thread(); // programmer error
    }

    #[test]
    #[should_panic(expected = "invalid gate config")]
    fn test_invalid_config_asserts() {
        let config = BridgeConfig::new().thread_limit(2).spare_threads(2);
        ConcurrencyGate::new(&config, TestPool::new());
    }
}
