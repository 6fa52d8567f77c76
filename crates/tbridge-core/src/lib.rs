//! # tbridge-core
//!
//! Core types and traits for the tbridge blocking/non-blocking byte bridge.
//!
//! This crate is platform-agnostic and contains no OS-specific code.
//! The streams, the admission gate and the event-loop dispatch live in
//! the `tbridge` crate.
//!
//! ## Modules
//!
//! - `chunk` - the unit of byte handoff across the thread boundary
//! - `queue` - thread-safe chunk FIFO with closed flag and byte cursor
//! - `error` - error types
//! - `traits` - wake / sweep / pool-telemetry seams
//! - `bprint` - kernel-style debug printing macros
//! - `env` - environment variable utilities

pub mod bprint;
pub mod chunk;
pub mod env;
pub mod error;
pub mod queue;
pub mod traits;

// Re-exports for convenience
pub use chunk::Chunk;
pub use env::{env_get, env_get_bool, env_get_opt};
pub use error::{BridgeError, BridgeResult};
pub use queue::ByteQueue;
pub use traits::{PoolTelemetry, Sweep, Wake};
