//! # Pool Error Types
//!
//! Only the configuration-driven construction path reports recoverable
//! errors. Capacity exhaustion at `alloc` time is a normal outcome (an
//! absence value, not a fault), contract violations are debug assertions,
//! and a failed arena reservation at construction aborts the process.

use thiserror::Error;

/// Errors from validating pool construction parameters.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PoolError {
    /// Configured capacity cannot hold the permanently resident sentinel.
    #[error("pool capacity too small: need at least {min} bytes, got {got}")]
    CapacityTooSmall {
        /// Minimum usable capacity in bytes.
        min: usize,
        /// The capacity that was requested.
        got: usize,
    },
}

/// Result type for pool configuration operations.
pub type PoolResult<T> = Result<T, PoolError>;
