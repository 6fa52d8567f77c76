//! OutputStream - non-blocking producer to blocking consumer
//!
//! The serving loop writes whole chunks in; a worker thread draining to a
//! blocking sink pulls them out one at a time. A chunk written as one
//! unit is read as one unit - no splitting, no merging - so the two sides
//! never contend over chunk boundaries and the handoff is a single queue
//! pop.
//!
//! `pull()` never waits: it returns `None` when nothing is queued and the
//! worker is expected to be rescheduled by its own loop. Backpressure
//! belongs to the admission gate and higher-level flow control, not this
//! layer.

use tbridge_core::{BridgeResult, ByteQueue, Chunk};

/// Byte stream from the serving loop out to a blocking worker thread.
pub struct OutputStream {
    queue: ByteQueue,
}

impl OutputStream {
    pub fn new() -> Self {
        Self {
            queue: ByteQueue::new(),
        }
    }

    // ── Producer side (serving loop) ──────────────────────────────

    /// Enqueue bytes as one chunk. Immediate; fails with `QueueClosed`
    /// once the stream is closed.
    pub fn write_sync(&self, bytes: impl Into<Chunk>) -> BridgeResult<()> {
        self.queue.push(bytes.into())
    }

    /// No more chunks will ever be written. Idempotent.
    pub fn close(&self) {
        self.queue.close();
    }

    // ── Consumer side (worker thread) ─────────────────────────────

    /// Pop the next whole chunk in write order, or `None` when nothing is
    /// queued yet. Never waits.
    pub fn pull(&self) -> Option<Chunk> {
        self.queue.pop_chunk()
    }

    // ── Accessors ─────────────────────────────────────────────────

    pub fn available_bytes(&self) -> usize {
        self.queue.available_bytes()
    }

    pub fn is_closed(&self) -> bool {
        self.queue.is_closed()
    }

    /// Terminal condition: closed and every queued chunk pulled.
    pub fn is_drained(&self) -> bool {
        self.queue.is_drained()
    }
}

impl Default for OutputStream {
    fn default() -> Self {
        Self::new()
    }
}
