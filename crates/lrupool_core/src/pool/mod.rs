//! # Memory Pool
//!
//! A fixed-capacity pool serving variable-size allocations. When the pool is
//! full, the allocator evicts the least recently used block and retries
//! instead of failing the request.
//!
//! ## Design Philosophy
//!
//! All memory is reserved once at construction. Afterwards:
//! - No heap allocations for payload data
//! - Bounded, predictable memory residency
//! - Eviction beats allocation failure
//!
//! Bookkeeping lives in a slot-indexed block table with two circular
//! intrusive lists over the same blocks: address order (for the first-fit
//! free-space scan) and recency order (for eviction). Indices replace the
//! raw pointers a C implementation would use, which keeps the whole crate
//! in safe Rust and makes stale handles inert instead of dangling.

mod arena;
mod block;
mod handle;
mod iter;
mod lru;

pub use block::BlockId;
pub use handle::PoolHandle;
pub use iter::{Blocks, IterOrder};
pub use lru::LruPool;

/// The single alignment boundary: every reserved block size and every
/// payload start is a multiple of this.
pub const MEMORY_ALIGNMENT: usize = 16;

/// Bookkeeping stride reserved at the start of every block region,
/// sentinel included. Payloads begin this many bytes past the block offset
/// and stay 16-aligned.
pub const BLOCK_HEADER_SIZE: usize = 48;

const ALIGNMENT_MASK: usize = MEMORY_ALIGNMENT - 1;

/// Rounds a payload request up to a full reserved block size, or `None` on
/// arithmetic overflow (a request that large can never be satisfied).
pub(crate) const fn reserved_size(payload: usize) -> Option<usize> {
    match payload.checked_add(BLOCK_HEADER_SIZE + ALIGNMENT_MASK) {
        Some(padded) => Some(padded & !ALIGNMENT_MASK),
        None => None,
    }
}
