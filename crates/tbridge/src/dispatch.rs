//! Sweep dispatch - getting wakes from worker threads onto the loop
//!
//! Worker-side pushes must not run read continuations themselves; they
//! only signal. The serving loop owns resolution: it drains a queue of
//! streams whose pending reads may have become satisfiable and sweeps
//! each one on its own thread.
//!
//! Signals coalesce per stream: however many pushes land between two
//! drains, the stream is enqueued once and swept once. The sweep itself
//! re-checks queue state, so a folded signal can never change what a
//! read resolves to - only when.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex, Weak};
use std::time::Duration;

use crossbeam_queue::SegQueue;
use tbridge_core::{Sweep, Wake};

/// Condvar-based park/wake for the serving loop.
///
/// A wake that arrives while nobody is parked is remembered and consumed
/// by the next `wait` without sleeping, so a signal landing between a
/// drain and the following park is never lost.
pub struct WakeSignal {
    /// Mutex for condvar; bool = wake pending
    mutex: Mutex<bool>,

    condvar: Condvar,

    /// Count of currently parked waiters (hint, may be stale)
    parked: AtomicUsize,
}

impl WakeSignal {
    pub fn new() -> Self {
        Self {
            mutex: Mutex::new(false),
            condvar: Condvar::new(),
            parked: AtomicUsize::new(0),
        }
    }

    /// Park until signaled or timeout.
    ///
    /// Returns `true` if woken by signal, `false` on timeout. Callers
    /// should re-check for work after returning regardless.
    pub fn wait(&self, timeout: Option<Duration>) -> bool {
        self.parked.fetch_add(1, Ordering::SeqCst);

        let mut guard = self.mutex.lock().unwrap();

        // Consume a wake that arrived before we parked
        if *guard {
            *guard = false;
            self.parked.fetch_sub(1, Ordering::SeqCst);
            return true;
        }

        let result = match timeout {
            Some(t) => {
                let (g, timeout_result) = self.condvar.wait_timeout(guard, t).unwrap();
                guard = g;
                !timeout_result.timed_out()
            }
            None => {
                guard = self.condvar.wait(guard).unwrap();
                true
            }
        };

        if *guard {
            *guard = false;
        }

        self.parked.fetch_sub(1, Ordering::SeqCst);
        result
    }

    /// Wake one parked waiter, or arm the pending-wake flag if none.
    pub fn wake_one(&self) {
        {
            let mut guard = self.mutex.lock().unwrap();
            *guard = true;
        }
        self.condvar.notify_one();
    }

    /// Number of currently parked waiters (hint, may be stale)
    pub fn parked_count(&self) -> usize {
        self.parked.load(Ordering::Relaxed)
    }
}

impl Default for WakeSignal {
    fn default() -> Self {
        Self::new()
    }
}

/// A scheduled sweep target plus its coalescing flag.
struct SweepEntry {
    target: Arc<dyn Sweep>,
    scheduled: Arc<AtomicBool>,
}

/// Lock-free queue of streams awaiting a sweep, drained by the loop.
///
/// Unbounded on purpose: a dropped sweep token would strand a parked
/// continuation, so overflow is not an option here.
pub struct SweepQueue {
    entries: SegQueue<SweepEntry>,
    signal: WakeSignal,
}

impl SweepQueue {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            entries: SegQueue::new(),
            signal: WakeSignal::new(),
        })
    }

    /// Build a wake hook that schedules `target` on this queue.
    ///
    /// The hook holds only weak references; a stream or queue that has
    /// been dropped turns its notifies into no-ops.
    pub fn hook(self: &Arc<Self>, target: Arc<dyn Sweep>) -> Arc<dyn Wake> {
        Arc::new(QueueWake {
            queue: Arc::downgrade(self),
            target: Arc::downgrade(&target),
            scheduled: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Sweep every scheduled target. Call from the loop thread only.
    ///
    /// Returns the number of targets swept. Each entry's coalescing flag
    /// is cleared before its sweep runs, so a push racing with the drain
    /// re-schedules rather than going unobserved.
    pub fn drain(&self) -> usize {
        let mut swept = 0;
        while let Some(entry) = self.entries.pop() {
            entry.scheduled.store(false, Ordering::Release);
            entry.target.sweep();
            swept += 1;
        }
        swept
    }

    /// Park the loop until something is scheduled or timeout.
    pub fn wait(&self, timeout: Option<Duration>) -> bool {
        self.signal.wait(timeout)
    }

    /// Wake the loop without scheduling anything (e.g. shutdown).
    pub fn wake(&self) {
        self.signal.wake_one();
    }

    /// Scheduled-but-not-yet-swept targets (hint).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Wake hook: enqueue the target once and poke the loop.
struct QueueWake {
    queue: Weak<SweepQueue>,
    target: Weak<dyn Sweep>,
    scheduled: Arc<AtomicBool>,
}

impl Wake for QueueWake {
    fn notify(&self) {
        // Already queued and not yet drained; coalesce.
        if self.scheduled.swap(true, Ordering::AcqRel) {
            return;
        }
        let (queue, target) = match (self.queue.upgrade(), self.target.upgrade()) {
            (Some(queue), Some(target)) => (queue, target),
            _ => {
                self.scheduled.store(false, Ordering::Release);
                return;
            }
        };
        queue.entries.push(SweepEntry {
            target,
            scheduled: Arc::clone(&self.scheduled),
        });
        queue.signal.wake_one();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    struct CountingSweep(AtomicUsize);

    impl Sweep for CountingSweep {
        fn sweep(&self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_wait_timeout() {
        let signal = WakeSignal::new();
        let start = std::time::Instant::now();
        let result = signal.wait(Some(Duration::from_millis(50)));
        let elapsed = start.elapsed();

        assert!(!result || elapsed < Duration::from_millis(100));
        assert!(elapsed >= Duration::from_millis(40)); // Allow some slack
    }

    #[test]
    fn test_wake_before_wait_is_consumed() {
        let signal = WakeSignal::new();
        signal.wake_one();

        let start = std::time::Instant::now();
        assert!(signal.wait(Some(Duration::from_secs(5))));
        assert!(start.elapsed() < Duration::from_millis(100));
    }

    #[test]
    fn test_wake_one_cross_thread() {
        let signal = Arc::new(WakeSignal::new());
        let signal2 = Arc::clone(&signal);

        let handle = thread::spawn(move || signal2.wait(Some(Duration::from_secs(10))));

        // Give thread time to park
        thread::sleep(Duration::from_millis(50));
        signal.wake_one();

        assert!(handle.join().unwrap());
    }

    #[test]
    fn test_notifies_coalesce_until_drain() {
        let queue = SweepQueue::new();
        let target = Arc::new(CountingSweep(AtomicUsize::new(0)));
        let hook = queue.hook(Arc::clone(&target) as Arc<dyn Sweep>);

        hook.notify();
        hook.notify();
        hook.notify();
        assert_eq!(queue.len(), 1);

        assert_eq!(queue.drain(), 1);
        assert_eq!(target.0.load(Ordering::SeqCst), 1);

        // After a drain the hook schedules again.
        hook.notify();
        assert_eq!(queue.drain(), 1);
        assert_eq!(target.0.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_hook_outliving_target_is_noop() {
        let queue = SweepQueue::new();
        let target = Arc::new(CountingSweep(AtomicUsize::new(0)));
        let hook = queue.hook(Arc::clone(&target) as Arc<dyn Sweep>);

        drop(target);
        hook.notify();
        assert_eq!(queue.drain(), 0);
    }

    #[test]
    fn test_loop_thread_sweeps_after_worker_notify() {
        let queue = SweepQueue::new();
        let target = Arc::new(CountingSweep(AtomicUsize::new(0)));
        let hook = queue.hook(Arc::clone(&target) as Arc<dyn Sweep>);

        let loop_queue = Arc::clone(&queue);
        let loop_target = Arc::clone(&target);
        let handle = thread::spawn(move || {
            let deadline = std::time::Instant::now() + Duration::from_secs(10);
            while loop_target.0.load(Ordering::SeqCst) == 0 {
                loop_queue.wait(Some(Duration::from_millis(100)));
                loop_queue.drain();
                assert!(std::time::Instant::now() < deadline, "never woken");
            }
        });

        thread::sleep(Duration::from_millis(50));
        hook.notify();
        handle.join().unwrap();
        assert_eq!(target.0.load(Ordering::SeqCst), 1);
    }
}
