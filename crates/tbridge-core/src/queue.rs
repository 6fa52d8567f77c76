//! ByteQueue - thread-safe FIFO of byte chunks with a closed flag
//!
//! The queue is the only structure shared between a blocking worker thread
//! and the single-threaded serving loop. All state sits behind one mutex;
//! no operation ever waits for data - absence is reported as an empty
//! result or a `None` sentinel, never by blocking the caller.
//!
//! Two consumption modes exist and must not be mixed on one queue:
//!
//! - `read_bytes(max)` - byte-oriented, keeps a cursor into the front
//!   chunk so reads may stop mid-chunk and span chunk boundaries.
//! - `pop_chunk()` - chunk-oriented, hands back whole chunks in FIFO
//!   order for a worker to transmit as written.

use std::collections::VecDeque;
use std::sync::Mutex;

use crate::chunk::Chunk;
use crate::error::{BridgeError, BridgeResult};

/// Ordered queue of chunks + closed flag + front-chunk cursor.
pub struct ByteQueue {
    inner: Mutex<Inner>,
}

struct Inner {
    /// Buffered chunks, push order
    chunks: VecDeque<Chunk>,

    /// Bytes already consumed from the front chunk (byte mode only)
    cursor: usize,

    /// Buffered, not-yet-consumed bytes (maintained on push/consume)
    available: usize,

    /// Once true, never reverts
    closed: bool,
}

impl ByteQueue {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                chunks: VecDeque::new(),
                cursor: 0,
                available: 0,
                closed: false,
            }),
        }
    }

    /// Append a chunk. Safe from any thread.
    ///
    /// Fails with `QueueClosed` once `close()` has been observed; waking a
    /// parked reader is the owning stream's job, not the queue's.
    pub fn push(&self, chunk: Chunk) -> BridgeResult<()> {
        let mut inner = self.inner.lock().unwrap();
        if inner.closed {
            return Err(BridgeError::QueueClosed);
        }
        inner.available += chunk.len();
        inner.chunks.push_back(chunk);
        Ok(())
    }

    /// Mark the queue closed. Idempotent; already-buffered bytes remain
    /// readable, so close never jumps ahead of pushed data.
    pub fn close(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.closed = true;
    }

    /// Buffered bytes not yet handed to a consumer.
    pub fn available_bytes(&self) -> usize {
        self.inner.lock().unwrap().available
    }

    pub fn is_closed(&self) -> bool {
        self.inner.lock().unwrap().closed
    }

    /// Terminal state: closed and nothing left to consume.
    pub fn is_drained(&self) -> bool {
        let inner = self.inner.lock().unwrap();
        inner.closed && inner.available == 0
    }

    /// Consume up to `max` bytes from the front, coalescing across chunk
    /// boundaries. Returns an empty vec when nothing is buffered - open or
    /// closed alike; callers distinguish end-of-stream via `is_closed()`.
    pub fn read_bytes(&self, max: usize) -> Vec<u8> {
        let mut inner = self.inner.lock().unwrap();
        let take = max.min(inner.available);
        let mut out = Vec::with_capacity(take);

        while out.len() < take {
            let cursor = inner.cursor;
            let front = inner
                .chunks
                .front()
                .expect("available bytes imply a front chunk");
            let want = take - out.len();
            let left = front.len() - cursor;
            let n = want.min(left);
            out.extend_from_slice(&front.as_slice()[cursor..cursor + n]);

            if n == left {
                inner.chunks.pop_front();
                inner.cursor = 0;
            } else {
                inner.cursor = cursor + n;
            }
        }

        inner.available -= take;
        out
    }

    /// Pop the next whole chunk in FIFO order, or `None` when empty.
    /// Never waits; never splits or merges chunks.
    pub fn pop_chunk(&self) -> Option<Chunk> {
        let mut inner = self.inner.lock().unwrap();
        debug_assert_eq!(
            inner.cursor, 0,
            "pop_chunk must not be mixed with read_bytes on one queue"
        );
        let chunk = inner.chunks.pop_front()?;
        inner.available -= chunk.len();
        Some(chunk)
    }
}

impl Default for ByteQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_push_then_read_in_order() {
        let q = ByteQueue::new();
        q.push(Chunk::from("foo")).unwrap();
        q.push(Chunk::from("bar")).unwrap();

        assert_eq!(q.available_bytes(), 6);
        assert_eq!(q.read_bytes(6), b"foobar");
        assert_eq!(q.available_bytes(), 0);
    }

    #[test]
    fn test_partial_reads_span_chunks() {
        let q = ByteQueue::new();
        q.push(Chunk::from("foo")).unwrap();
        q.push(Chunk::from("bar")).unwrap();

        assert_eq!(q.read_bytes(2), b"fo");
        assert_eq!(q.read_bytes(2), b"ob");
        assert_eq!(q.read_bytes(2), b"ar");
        assert_eq!(q.read_bytes(2), b"");
    }

    #[test]
    fn test_read_more_than_available() {
        let q = ByteQueue::new();
        q.push(Chunk::from("foo")).unwrap();
        assert_eq!(q.read_bytes(1000), b"foo");
    }

    #[test]
    fn test_read_empty_open_queue_is_immediate() {
        let q = ByteQueue::new();
        assert_eq!(q.read_bytes(10), b"");
        assert!(!q.is_closed());
    }

    #[test]
    fn test_push_after_close_fails() {
        let q = ByteQueue::new();
        q.push(Chunk::from("foo")).unwrap();
        q.close();
        assert_eq!(q.push(Chunk::from("bar")), Err(BridgeError::QueueClosed));
        // Buffered bytes survive the close.
        assert_eq!(q.read_bytes(3), b"foo");
        assert!(q.is_drained());
    }

    #[test]
    fn test_close_is_idempotent() {
        let q = ByteQueue::new();
        q.close();
        q.close();
        assert!(q.is_closed());
        assert!(q.is_drained());
        assert_eq!(q.read_bytes(1), b"");
    }

    #[test]
    fn test_pop_chunk_whole_fifo() {
        let q = ByteQueue::new();
        q.push(Chunk::from("hello")).unwrap();
        q.push(Chunk::from("dolly")).unwrap();

        assert_eq!(q.pop_chunk().unwrap().as_slice(), b"hello");
        assert_eq!(q.pop_chunk().unwrap().as_slice(), b"dolly");
        assert!(q.pop_chunk().is_none());
        assert_eq!(q.available_bytes(), 0);
    }

    #[test]
    fn test_byte_conservation_across_threads() {
        let q = Arc::new(ByteQueue::new());
        let producer = {
            let q = Arc::clone(&q);
            thread::spawn(move || {
                for i in 0..100u8 {
                    q.push(Chunk::new(vec![i; 17])).unwrap();
                }
                q.close();
            })
        };

        let mut total = Vec::new();
        loop {
            let bytes = q.read_bytes(64);
            if bytes.is_empty() {
                if q.is_drained() {
                    break;
                }
                thread::yield_now();
                continue;
            }
            total.extend_from_slice(&bytes);
        }
        producer.join().unwrap();

        assert_eq!(total.len(), 100 * 17);
        for (i, window) in total.chunks(17).enumerate() {
            assert!(window.iter().all(|&b| b == i as u8));
        }
    }
}
