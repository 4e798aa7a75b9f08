//! # LRUPOOL Core
//!
//! Fixed-capacity memory pool that serves variable-size allocations and
//! evicts the least recently used allocation when full, instead of failing
//! the request. Built for callers that need bounded, predictable memory
//! residency (a buffer cache, a decoded-asset cache) where eviction beats
//! allocation failure.
//!
//! ## Architecture Rules
//!
//! 1. **One reservation** - the arena is allocated once at construction
//! 2. **Dual bookkeeping** - every block sits on an address-ordered list
//!    (first-fit search) and a recency-ordered list (eviction)
//! 3. **Safe by construction** - slot indices and generation counters
//!    replace raw pointers; stale handles report unbound instead of dangling
//!
//! ## Example
//!
//! ```rust,ignore
//! use lrupool_core::{LruPool, PoolHandle};
//!
//! let mut pool = LruPool::new(4 * 1024 * 1024);
//! let mut handle = PoolHandle::new();
//!
//! // Full pool? The least recently used block is evicted and the
//! // allocation retried. None only when nothing evictable remains.
//! let payload = pool.alloc(&mut handle, 4096).unwrap();
//! payload.fill(0);
//!
//! // Touch the block to keep it resident.
//! let payload = pool.get_buffer_and_refresh(&handle).unwrap();
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod config;
pub mod error;
pub mod observer;
pub mod pool;

pub use config::{PoolConfig, DEFAULT_POOL_SIZE};
pub use error::{PoolError, PoolResult};
pub use observer::{NoopObserver, RegionObserver};
pub use pool::{
    BlockId, Blocks, IterOrder, LruPool, PoolHandle, BLOCK_HEADER_SIZE, MEMORY_ALIGNMENT,
};
