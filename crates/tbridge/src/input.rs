//! InputStream - blocking producer to non-blocking consumer
//!
//! A worker thread performing blocking I/O pushes chunks in; the
//! single-threaded serving loop reads them out, either synchronously
//! (`read_sync`, never waits) or by parking a continuation (`read`).
//!
//! Reads never accumulate: as soon as at least one byte is buffered a
//! parked read resolves with `min(available, max)` bytes, like a
//! non-blocking socket read. The caller re-issues reads if it wants more.
//!
//! At most one asynchronous read may be outstanding. A second one is a
//! usage bug in the surrounding glue code and fails fast with
//! `ReadPending` instead of being silently queued.

use std::sync::{Arc, Mutex};

use tbridge_core::bdebug;
use tbridge_core::{BridgeError, BridgeResult, ByteQueue, Chunk, Sweep, Wake};

/// What a parked read resolves with.
///
/// `Bytes` may be empty: end-of-stream and "nothing buffered at close"
/// are both the empty vec, distinguished from a live stream only by the
/// stream's closed flag. `Aborted` is produced solely by `cancel_read`.
pub enum ReadOutcome {
    Bytes(Vec<u8>),
    Aborted,
}

impl ReadOutcome {
    /// The payload, or `None` if the read was aborted.
    pub fn into_bytes(self) -> Option<Vec<u8>> {
        match self {
            ReadOutcome::Bytes(bytes) => Some(bytes),
            ReadOutcome::Aborted => None,
        }
    }
}

/// Continuation resumed when a parked read resolves. Runs exactly once.
pub type ReadContinuation = Box<dyn FnOnce(ReadOutcome) + Send>;

/// An outstanding asynchronous read: requested length + continuation.
struct PendingRead {
    max_len: usize,
    continuation: ReadContinuation,
}

/// Pending-read slot + wake hook, guarded by one mutex.
///
/// Lock order: this lock first, the queue's internal lock second. Holding
/// it across the check-then-register step in `read` is what makes a push
/// racing with registration impossible to miss.
struct PendingSlot {
    read: Option<PendingRead>,
    wake: Option<Arc<dyn Wake>>,
}

/// Byte stream from a blocking worker thread into the serving loop.
pub struct InputStream {
    queue: ByteQueue,
    pending: Mutex<PendingSlot>,
}

impl InputStream {
    pub fn new() -> Self {
        Self {
            queue: ByteQueue::new(),
            pending: Mutex::new(PendingSlot {
                read: None,
                wake: None,
            }),
        }
    }

    /// Install the cross-thread wake hook (event-loop integration).
    ///
    /// Without a hook, push/close resolve a satisfiable pending read
    /// inline on the waking thread.
    pub fn set_wake(&self, hook: Arc<dyn Wake>) {
        self.pending.lock().unwrap().wake = Some(hook);
    }

    // ── Producer side (worker thread) ─────────────────────────────

    /// Append bytes. Fails with `QueueClosed` after `close()`.
    ///
    /// If a pending read is now satisfiable, the reader is woken.
    pub fn push(&self, bytes: impl Into<Chunk>) -> BridgeResult<()> {
        self.queue.push(bytes.into())?;
        self.wake_if_ready();
        Ok(())
    }

    /// No more bytes will ever be produced. Idempotent.
    ///
    /// Wakes a pending read regardless of how many bytes are buffered.
    pub fn close(&self) {
        self.queue.close();
        self.wake_if_ready();
    }

    // ── Consumer side (serving loop) ──────────────────────────────

    /// Up to `max` bytes, immediately, possibly empty. Never waits and
    /// never registers a pending read.
    ///
    /// An empty result on an open stream means "temporarily nothing
    /// buffered"; on a closed one it means end-of-stream. Must not be
    /// interleaved with an outstanding `read` from another thread - the
    /// consumer side is single-threaded by contract.
    pub fn read_sync(&self, max: usize) -> Vec<u8> {
        self.queue.read_bytes(max)
    }

    /// Asynchronous read. Resolves the continuation exactly once with
    /// `min(available, max)` bytes - immediately if bytes are buffered or
    /// the stream is closed (0 bytes when closed and drained), otherwise
    /// after a later `push` or `close`.
    ///
    /// Fails with `ReadPending` if a read is already outstanding.
    pub fn read(&self, max: usize, continuation: ReadContinuation) -> BridgeResult<()> {
        let mut slot = self.pending.lock().unwrap();
        if slot.read.is_some() {
            return Err(BridgeError::ReadPending);
        }

        if self.queue.available_bytes() > 0 || self.queue.is_closed() {
            let bytes = self.queue.read_bytes(max);
            drop(slot);
            bdebug!("read: resolving immediately with {} bytes", bytes.len());
            continuation(ReadOutcome::Bytes(bytes));
            return Ok(());
        }

        slot.read = Some(PendingRead {
            max_len: max,
            continuation,
        });
        Ok(())
    }

    /// Re-check the pending read against current queue state and resolve
    /// it if satisfiable. Safe to call at any time from the consumer
    /// side; a data-correctness no-op.
    pub fn sweep(&self) {
        let (pending, bytes) = {
            let mut slot = self.pending.lock().unwrap();
            let satisfiable = slot.read.is_some()
                && (self.queue.available_bytes() > 0 || self.queue.is_closed());
            if !satisfiable {
                return;
            }
            let pending = slot.read.take().expect("checked above");
            let bytes = self.queue.read_bytes(pending.max_len);
            (pending, bytes)
        };
        bdebug!("sweep: resolving pending read with {} bytes", bytes.len());
        (pending.continuation)(ReadOutcome::Bytes(bytes));
    }

    /// Remove an outstanding read and resolve it with `Aborted`.
    ///
    /// Caller-driven timeout/abandon policy; without this a parked
    /// continuation on an idle stream would leak.
    pub fn cancel_read(&self) {
        let pending = self.pending.lock().unwrap().read.take();
        if let Some(pending) = pending {
            bdebug!("cancel_read: aborting pending read");
            (pending.continuation)(ReadOutcome::Aborted);
        }
    }

    // ── Accessors ─────────────────────────────────────────────────

    pub fn available_bytes(&self) -> usize {
        self.queue.available_bytes()
    }

    pub fn is_closed(&self) -> bool {
        self.queue.is_closed()
    }

    /// Terminal condition: closed and every byte consumed.
    pub fn is_drained(&self) -> bool {
        self.queue.is_drained()
    }

    // ── Internal ──────────────────────────────────────────────────

    /// Wake the reader if a pending read became satisfiable. Notifies the
    /// hook when one is installed; resolves inline otherwise.
    fn wake_if_ready(&self) {
        let hook = {
            let slot = self.pending.lock().unwrap();
            if slot.read.is_none() {
                return;
            }
            if self.queue.available_bytes() == 0 && !self.queue.is_closed() {
                return;
            }
            slot.wake.clone()
        };
        match hook {
            Some(hook) => hook.notify(),
            None => self.sweep(),
        }
    }
}

impl Default for InputStream {
    fn default() -> Self {
        Self::new()
    }
}

impl Sweep for InputStream {
    fn sweep(&self) {
        InputStream::sweep(self);
    }
}
