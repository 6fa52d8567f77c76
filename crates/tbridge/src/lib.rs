//! # tbridge - blocking/non-blocking byte-stream bridge
//!
//! Concurrency core for a proxy that pairs a single-threaded,
//! non-blocking serving loop with a fixed pool of worker threads doing
//! blocking I/O.
//!
//! Two directions of byte flow, one shared primitive:
//!
//! - [`InputStream`]: worker thread pushes bytes produced by blocking
//!   I/O; the loop reads them synchronously (`read_sync`, never waits)
//!   or by parking a continuation (`read`, resolved on push/close).
//! - [`OutputStream`]: the loop writes whole chunks; a worker thread
//!   pulls them for blocking transmission (`pull`, sentinel instead of
//!   waiting).
//!
//! Before dispatching blocking work onto the pool, callers consult the
//! [`ConcurrencyGate`]: an advisory choke signal over live pool
//! telemetry plus an explicit counting semaphore for exact reservation.
//!
//! Event-loop embedders install a [`SweepQueue`] hook so worker-side
//! pushes wake the loop instead of running continuations in place:
//!
//! ```ignore
//! use std::sync::Arc;
//! use tbridge::{InputStream, Sweep, SweepQueue};
//!
//! let sweeps = SweepQueue::new();
//! let stream = Arc::new(InputStream::new());
//! stream.set_wake(sweeps.hook(Arc::clone(&stream) as Arc<dyn Sweep>));
//!
//! // loop thread:
//! loop {
//!     sweeps.wait(None);
//!     sweeps.drain();
//! }
//! ```

pub mod config;
pub mod dispatch;
pub mod gate;
pub mod input;
pub mod output;

// Re-export core types
pub use tbridge_core::{BridgeError, BridgeResult, ByteQueue, Chunk};
pub use tbridge_core::{PoolTelemetry, Sweep, Wake};

// Re-export bprint macros for debug logging
pub use tbridge_core::bprint;
pub use tbridge_core::bprint::{
    init as init_logging, set_flush_enabled, set_log_level, LogLevel,
};
pub use tbridge_core::{bdebug, berror, binfo, bprintln, btrace, bwarn};

// Re-export env utilities
pub use tbridge_core::{env_get, env_get_bool, env_get_opt};

pub use config::BridgeConfig;
pub use dispatch::{SweepQueue, WakeSignal};
pub use gate::{ConcurrencyGate, ThreadReservation};
pub use input::{InputStream, ReadContinuation, ReadOutcome};
pub use output::OutputStream;
