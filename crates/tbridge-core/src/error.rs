//! Error types for the byte bridge

use core::fmt;

/// Result type for bridge operations
pub type BridgeResult<T> = Result<T, BridgeError>;

/// Errors that can occur in bridge operations
///
/// Both variants flag an invalid-state usage of the API by the surrounding
/// glue code. They are surfaced synchronously to the offending caller and
/// never swallowed. Unbalanced gate acquire/release is a programmer defect
/// and asserts instead of reporting through this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeError {
    /// Push or write attempted on a queue that was already closed
    QueueClosed,

    /// An asynchronous read was issued while another one is outstanding
    ReadPending,
}

impl fmt::Display for BridgeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BridgeError::QueueClosed => write!(f, "queue already closed"),
            BridgeError::ReadPending => write!(f, "an asynchronous read is already pending"),
        }
    }
}

impl std::error::Error for BridgeError {}
