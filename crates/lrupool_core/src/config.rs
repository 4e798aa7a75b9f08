//! # Pool Configuration
//!
//! Startup-time construction parameters, deserializable from TOML config
//! files loaded once at startup.

use serde::{Deserialize, Serialize};

use crate::error::{PoolError, PoolResult};
use crate::pool::BLOCK_HEADER_SIZE;

/// Default pool capacity: 4 MiB.
pub const DEFAULT_POOL_SIZE: usize = 4 * 1024 * 1024;

/// Construction parameters for [`LruPool`](crate::LruPool).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Arena capacity in bytes.
    pub pool_size: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            pool_size: DEFAULT_POOL_SIZE,
        }
    }
}

impl PoolConfig {
    /// Checks that the configured capacity can hold at least the permanently
    /// resident sentinel header.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::CapacityTooSmall`] otherwise.
    pub fn validate(&self) -> PoolResult<()> {
        if self.pool_size < BLOCK_HEADER_SIZE {
            return Err(PoolError::CapacityTooSmall {
                min: BLOCK_HEADER_SIZE,
                got: self.pool_size,
            });
        }
        Ok(())
    }
}
