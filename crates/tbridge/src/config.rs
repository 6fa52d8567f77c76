//! Bridge configuration
//!
//! Static, process-lifetime knobs for the admission gate: how many
//! threads the shared blocking pool has, and how many of them stay in
//! reserve before the gate starts signaling choke.

use tbridge_core::env::env_get;

/// Compile-time defaults
pub mod defaults {
    /// Total worker threads available to the process
    pub const THREAD_LIMIT: usize = 8;

    /// Headroom reserved before signaling choke
    pub const SPARE_THREADS: usize = 2;
}

/// Recognized options: `{thread_limit, spare_threads}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BridgeConfig {
    /// Total worker threads available to the process
    pub thread_limit: usize,

    /// Headroom reserved before signaling choke
    pub spare_threads: usize,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

impl BridgeConfig {
    /// Create config from compile-time defaults with environment overrides.
    ///
    /// Environment variables (all optional):
    /// - `TBR_THREAD_LIMIT` - Total worker threads
    /// - `TBR_SPARE_THREADS` - Reserved headroom
    pub fn from_env() -> Self {
        Self {
            thread_limit: env_get("TBR_THREAD_LIMIT", defaults::THREAD_LIMIT),
            spare_threads: env_get("TBR_SPARE_THREADS", defaults::SPARE_THREADS),
        }
    }

    /// Create config with explicit defaults (no env override).
    /// Useful for testing or when you want full control.
    pub fn new() -> Self {
        Self {
            thread_limit: defaults::THREAD_LIMIT,
            spare_threads: defaults::SPARE_THREADS,
        }
    }

    // Builder methods

    pub fn thread_limit(mut self, n: usize) -> Self {
        self.thread_limit = n;
        self
    }

    pub fn spare_threads(mut self, n: usize) -> Self {
        self.spare_threads = n;
        self
    }

    /// A usable config has at least one thread and keeps its reserve
    /// strictly below the limit.
    pub fn is_valid(&self) -> bool {
        self.thread_limit >= 1 && self.spare_threads < self.thread_limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_uses_defaults() {
        let config = BridgeConfig::new();
        assert_eq!(config.thread_limit, defaults::THREAD_LIMIT);
        assert_eq!(config.spare_threads, defaults::SPARE_THREADS);
        assert!(config.is_valid());
    }

    #[test]
    fn test_builder() {
        let config = BridgeConfig::new().thread_limit(16).spare_threads(4);
        assert_eq!(config.thread_limit, 16);
        assert_eq!(config.spare_threads, 4);
    }

    #[test]
    fn test_validity() {
        assert!(!BridgeConfig::new().thread_limit(0).is_valid());
        assert!(!BridgeConfig::new().thread_limit(2).spare_threads(2).is_valid());
        assert!(BridgeConfig::new().thread_limit(2).spare_threads(1).is_valid());
    }
}
