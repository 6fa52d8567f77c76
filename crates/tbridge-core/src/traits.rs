//! Seam traits between the bridge core and its embedder
//!
//! The bridge never reaches into ambient global state: the event loop
//! plugs in through `Wake`/`Sweep`, and the worker pool hands the gate a
//! `PoolTelemetry` at construction so admission decisions are testable
//! with synthetic counters.

/// Wakes the serving side when a parked read may have become resolvable.
///
/// **Contract:**
/// - `notify()` must NEVER block.
/// - Multiple calls before the consumer runs may be coalesced
///   (eventfd semantics: one wake, one re-check).
/// - A wake carries no data; the woken side re-checks queue state.
pub trait Wake: Send + Sync {
    /// Signal that pending reads should be re-evaluated.
    fn notify(&self);
}

/// Re-evaluates pending wake-ups against current queue state.
///
/// Semantically a no-op for data correctness: sweeping only affects *when*
/// a pending wait resolves, never *what* it resolves to. Needed because a
/// coalescing wake mechanism may fold several signals into one.
pub trait Sweep: Send + Sync {
    fn sweep(&self);
}

/// Live worker-pool counters, read on demand by the admission gate.
///
/// The pool owns these numbers; the gate only samples them. They may lag
/// behind reality - the gate's explicit semaphore exists for exact
/// accounting where that matters.
pub trait PoolTelemetry: Send + Sync {
    /// Requests currently executing on pool threads.
    fn active_requests(&self) -> usize;

    /// Requests queued on the pool but not yet picked up.
    fn pending_requests(&self) -> usize;
}
