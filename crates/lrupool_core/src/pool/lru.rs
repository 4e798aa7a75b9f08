//! # LRU Pool
//!
//! The allocator/evictor over one fixed arena: first-fit free-space search
//! in address order, synchronous LRU eviction on exhaustion, and the
//! handle, iterator, and diagnostics surface.

use std::fmt::Write as _;

use crate::config::{PoolConfig, DEFAULT_POOL_SIZE};
use crate::error::PoolResult;
use crate::observer::{NoopObserver, RegionObserver};

use super::arena::Arena;
use super::block::{BlockId, BlockTable, SENTINEL};
use super::handle::PoolHandle;
use super::iter::{Blocks, IterOrder};
use super::{reserved_size, BLOCK_HEADER_SIZE};

/// Fixed-capacity memory pool with LRU eviction.
///
/// Single-threaded and synchronous: every operation runs to completion, and
/// eviction happens inside [`alloc`](Self::alloc), never in the background.
/// Callers needing multi-thread access must wrap the pool in their own
/// mutual exclusion.
pub struct LruPool {
    arena: Arena,
    blocks: BlockTable,
    allocated: usize,
    observer: Box<dyn RegionObserver>,
}

impl LruPool {
    /// Creates a pool over `pool_size` bytes of arena.
    ///
    /// The buffer is reserved once, up front. If the host cannot satisfy the
    /// reservation the process aborts; a pool that cannot exist is an
    /// unrecoverable startup condition, not a retryable error.
    ///
    /// # Panics
    ///
    /// Panics if `pool_size` cannot hold the sentinel header.
    #[must_use]
    pub fn new(pool_size: usize) -> Self {
        Self::with_observer(pool_size, Box::new(NoopObserver))
    }

    /// Creates a pool with an instrumentation observer hooked at the
    /// allocation/free boundaries.
    ///
    /// The observer sees the entire free space marked inaccessible here,
    /// each carved region marked accessible before its payload view is
    /// handed out, and each freed region marked inaccessible again.
    ///
    /// # Panics
    ///
    /// Panics if `pool_size` cannot hold the sentinel header.
    #[must_use]
    pub fn with_observer(pool_size: usize, mut observer: Box<dyn RegionObserver>) -> Self {
        assert!(
            pool_size >= BLOCK_HEADER_SIZE,
            "pool of {pool_size} bytes cannot hold the sentinel header"
        );

        let arena = Arena::new(pool_size);
        observer.mark_inaccessible(BLOCK_HEADER_SIZE, pool_size - BLOCK_HEADER_SIZE);
        tracing::debug!("memory pool created, capacity {} bytes", pool_size);

        Self {
            arena,
            blocks: BlockTable::new(),
            allocated: BLOCK_HEADER_SIZE,
            observer,
        }
    }

    /// Creates a pool from a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::CapacityTooSmall`](crate::PoolError::CapacityTooSmall)
    /// when the configured capacity cannot hold the sentinel header.
    pub fn from_config(config: &PoolConfig) -> PoolResult<Self> {
        config.validate()?;
        Ok(Self::new(config.pool_size))
    }

    /// Allocates `size` payload bytes, binds the new block to `handle`, and
    /// returns the payload view.
    ///
    /// The reserved region is `size` plus the header stride, rounded up to
    /// the alignment unit. The search is first-fit over the address-ordered
    /// list, tail gap included; while no gap fits, the least recently used
    /// block is evicted and the search retried. Each eviction strictly
    /// shrinks the allocated byte count, so the loop terminates in at most
    /// "current live block count" iterations.
    ///
    /// Returns `None` when the request cannot be satisfied even with every
    /// evictable block freed. A request larger than the arena can ever hold
    /// returns `None` immediately, without evicting anything.
    ///
    /// Preconditions (debug-asserted): `size > 0` and `handle` is unbound.
    pub fn alloc(&mut self, handle: &mut PoolHandle, size: usize) -> Option<&mut [u8]> {
        debug_assert!(size > 0, "zero-size allocation is not allowed");
        debug_assert!(
            self.resolve(handle).is_none(),
            "alloc on an already bound handle"
        );

        let reserved = reserved_size(size)?;
        if reserved > self.arena.capacity() - BLOCK_HEADER_SIZE {
            // Can never fit: evicting for it would only empty the pool.
            return None;
        }

        loop {
            if let Some((prev, offset)) = self.find_gap(reserved) {
                let slot = self.blocks.insert(offset, reserved, prev);
                self.allocated += reserved;
                self.observer.mark_accessible(offset, reserved);
                handle.bind(self.blocks.id_of(slot));
                return Some(
                    self.arena
                        .view_mut(offset + BLOCK_HEADER_SIZE, reserved - BLOCK_HEADER_SIZE),
                );
            }

            let victim = self.blocks.lru();
            if victim == SENTINEL {
                return None;
            }
            let (victim_offset, victim_size) = {
                let block = self.blocks.get(victim);
                (block.offset, block.size)
            };
            tracing::trace!(
                "evicting LRU block at offset {} ({} bytes)",
                victim_offset,
                victim_size
            );
            self.release(victim);
        }
    }

    /// Unbinds `handle` and returns its block's bytes to the free space.
    ///
    /// Precondition (debug-asserted): `handle` is currently bound.
    pub fn free(&mut self, handle: &mut PoolHandle) {
        let resolved = self.resolve_slot(handle);
        debug_assert!(resolved.is_some(), "free on an unbound handle");
        if let Some(slot) = resolved {
            self.release(slot);
        }
        handle.clear();
    }

    /// Returns the payload view for `handle`'s block and moves the block to
    /// the most recently used end of the recency list.
    ///
    /// Querying an unbound (or evicted) handle is legal and yields `None`
    /// without touching either list. This is the only operation that changes
    /// recency order without allocating or freeing.
    pub fn get_buffer_and_refresh(&mut self, handle: &PoolHandle) -> Option<&mut [u8]> {
        let slot = self.resolve_slot(handle)?;
        self.blocks.touch(slot);
        let block = self.blocks.get(slot);
        Some(
            self.arena
                .view_mut(block.offset + BLOCK_HEADER_SIZE, block.size - BLOCK_HEADER_SIZE),
        )
    }

    /// Frees every live block, lowest address first, leaving only the
    /// sentinel.
    pub fn flush(&mut self) {
        tracing::debug!("flushing pool, {} live blocks", self.blocks.live_blocks());
        loop {
            let first = self.blocks.first_by_address();
            if first == SENTINEL {
                break;
            }
            self.release(first);
        }
    }

    /// Total reserved bytes, sentinel header included.
    #[must_use]
    pub fn allocated_size(&self) -> usize {
        self.allocated
    }

    /// Arena capacity in bytes.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.arena.capacity()
    }

    /// Unreserved bytes. Fragmentation may keep a single allocation of this
    /// size from fitting.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.arena.capacity() - self.allocated
    }

    /// Number of live blocks, sentinel excluded.
    #[must_use]
    pub fn live_blocks(&self) -> usize {
        self.blocks.live_blocks()
    }

    /// Whether the pool holds no live blocks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.blocks.live_blocks() == 0
    }

    /// Validates `handle`'s binding and returns the live block's identity.
    #[must_use]
    pub fn resolve(&self, handle: &PoolHandle) -> Option<BlockId> {
        self.resolve_slot(handle).map(|slot| self.blocks.id_of(slot))
    }

    /// Whether `handle` is currently bound to a live block.
    #[must_use]
    pub fn is_bound(&self, handle: &PoolHandle) -> bool {
        self.resolve_slot(handle).is_some()
    }

    /// Payload size of a live block: its reserved size minus the header
    /// stride. At least the requested size, and less than the requested size
    /// plus one alignment unit.
    #[must_use]
    pub fn payload_size(&self, id: BlockId) -> Option<usize> {
        self.block_size(id).map(|size| size - BLOCK_HEADER_SIZE)
    }

    /// Reserved size of a live block, header stride included.
    #[must_use]
    pub fn block_size(&self, id: BlockId) -> Option<usize> {
        let slot = self.blocks.resolve(id)?;
        Some(self.blocks.get(slot).size)
    }

    /// Arena-relative offset of a live block's reserved region.
    #[must_use]
    pub fn block_offset(&self, id: BlockId) -> Option<usize> {
        let slot = self.blocks.resolve(id)?;
        Some(self.blocks.get(slot).offset)
    }

    /// Next live block in address order, or `None` at the end of the arena
    /// (or for a stale id).
    #[must_use]
    pub fn next_by_address(&self, id: BlockId) -> Option<BlockId> {
        let slot = self.blocks.resolve(id)?;
        let next = self.blocks.get(slot).next_addr;
        (next != SENTINEL).then(|| self.blocks.id_of(next))
    }

    /// Next block in recency order, toward the least recently used end, or
    /// `None` past the oldest block (or for a stale id).
    #[must_use]
    pub fn next_by_recency(&self, id: BlockId) -> Option<BlockId> {
        let slot = self.blocks.resolve(id)?;
        let next = self.blocks.get(slot).next_rec;
        (next != SENTINEL).then(|| self.blocks.id_of(next))
    }

    /// Iterates over live blocks in the chosen order.
    ///
    /// The iterator borrows the pool shared, so allocations and frees during
    /// traversal are rejected at compile time.
    #[must_use]
    pub fn iter(&self, order: IterOrder) -> Blocks<'_> {
        Blocks::new(&self.blocks, order)
    }

    /// Renders the recency-order state listing, most recent first, with the
    /// remaining free capacity. Read-only; human-readable, no format
    /// contract.
    #[must_use]
    pub fn state_report(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "------------ LRU state ------------");

        let mut line = 0usize;
        let mut slot = self.blocks.first_by_recency();
        while slot != SENTINEL {
            let block = self.blocks.get(slot);
            let _ = writeln!(out, "{line}: block @{} (size: {})", block.offset, block.size);
            line += 1;
            slot = block.next_rec;
        }

        let _ = writeln!(out, "{} bytes left", self.remaining());
        let _ = writeln!(
            out,
            "allocated: {}, total pool size: {}",
            self.allocated,
            self.arena.capacity()
        );
        out
    }

    /// Renders the physical layout walk: occupied regions in address order
    /// with the free gaps between them, tail gap included. Read-only.
    #[must_use]
    pub fn layout_dump(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "------------ Pool dump -----------------");

        let mut line = 0usize;
        let mut prev_end = BLOCK_HEADER_SIZE;
        let mut slot = self.blocks.first_by_address();
        while slot != SENTINEL {
            let block = self.blocks.get(slot);
            if block.offset > prev_end {
                let _ = writeln!(
                    out,
                    "{line}: free space @{prev_end} (size: {})",
                    block.offset - prev_end
                );
                line += 1;
            }
            let _ = writeln!(
                out,
                "{line}: allocated space @{} (size: {})",
                block.offset, block.size
            );
            line += 1;
            prev_end = block.offset + block.size;
            slot = block.next_addr;
        }

        if self.arena.capacity() > prev_end {
            let _ = writeln!(
                out,
                "leading free space @{prev_end} (size: {})",
                self.arena.capacity() - prev_end
            );
        }
        let _ = writeln!(
            out,
            "used memory: {}, total pool size: {}",
            self.allocated,
            self.arena.capacity()
        );
        out
    }

    /// First-fit scan of the address-ordered list, starting just past the
    /// sentinel and ending with the tail gap before the arena's end. Ties
    /// resolve to the earliest gap in ascending-address scan order.
    ///
    /// Returns the predecessor slot and the gap's start offset.
    fn find_gap(&self, reserved: usize) -> Option<(u32, usize)> {
        let mut current = SENTINEL;
        loop {
            let block = self.blocks.get(current);
            let gap_start = block.offset + block.size;
            let next = block.next_addr;
            let gap_end = if next == SENTINEL {
                self.arena.capacity()
            } else {
                self.blocks.get(next).offset
            };
            if gap_end - gap_start >= reserved {
                return Some((current, gap_start));
            }
            if next == SENTINEL {
                return None;
            }
            current = next;
        }
    }

    /// Unsplices a block from both lists and poisons its region. The size
    /// subtraction happens before the observer sees the region go invalid.
    fn release(&mut self, slot: u32) {
        let (offset, size) = {
            let block = self.blocks.get(slot);
            (block.offset, block.size)
        };
        self.blocks.remove(slot);
        self.allocated -= size;
        self.observer.mark_inaccessible(offset, size);
        self.arena.poison(offset, size);
    }

    fn resolve_slot(&self, handle: &PoolHandle) -> Option<u32> {
        self.blocks.resolve(handle.binding()?)
    }
}

impl Default for LruPool {
    /// Pool with the default 4 MiB capacity.
    fn default() -> Self {
        Self::new(DEFAULT_POOL_SIZE)
    }
}

impl Drop for LruPool {
    fn drop(&mut self) {
        // Lift the poison before the arena returns to the host.
        self.observer.mark_accessible(0, self.arena.capacity());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::MEMORY_ALIGNMENT;

    #[test]
    fn test_new_pool_baseline() {
        let pool = LruPool::new(2048);
        assert_eq!(pool.allocated_size(), BLOCK_HEADER_SIZE);
        assert_eq!(pool.capacity(), 2048);
        assert_eq!(pool.live_blocks(), 0);
        assert!(pool.is_empty());
    }

    #[test]
    fn test_payload_size_bounds() {
        let mut pool = LruPool::new(2048);
        let mut handle = PoolHandle::new();
        let requested = 50;

        let payload = pool.alloc(&mut handle, requested).expect("should fit");
        assert_eq!(payload.len(), 64);

        let id = pool.resolve(&handle).expect("bound");
        let size = pool.payload_size(id).expect("live");
        assert!(size >= requested);
        assert!(size < requested + MEMORY_ALIGNMENT);
    }

    #[test]
    fn test_alloc_free_restores_baseline() {
        let mut pool = LruPool::new(2048);
        let baseline = pool.allocated_size();

        let mut handle = PoolHandle::new();
        pool.alloc(&mut handle, 100).expect("should fit");
        assert!(pool.allocated_size() > baseline);

        pool.free(&mut handle);
        assert_eq!(pool.allocated_size(), baseline);
        assert!(!pool.is_bound(&handle));
        assert!(handle.binding().is_none());
    }

    #[test]
    fn test_refresh_unbound_returns_none() {
        let mut pool = LruPool::new(2048);
        let handle = PoolHandle::new();
        assert!(pool.get_buffer_and_refresh(&handle).is_none());
        assert!(pool.is_empty());
    }

    #[test]
    fn test_refresh_returns_same_region() {
        let mut pool = LruPool::new(2048);
        let mut handle = PoolHandle::new();

        pool.alloc(&mut handle, 100).expect("should fit").fill(0x5A);
        let buffer = pool.get_buffer_and_refresh(&handle).expect("bound");
        assert!(buffer.iter().all(|&b| b == 0x5A));
    }

    #[test]
    fn test_from_config_rejects_tiny_capacity() {
        let config = PoolConfig { pool_size: 16 };
        assert!(LruPool::from_config(&config).is_err());
    }

    #[test]
    fn test_default_capacity() {
        let pool = LruPool::default();
        assert_eq!(pool.capacity(), DEFAULT_POOL_SIZE);
    }

    #[test]
    fn test_reports_render() {
        let mut pool = LruPool::new(2048);
        let mut handle = PoolHandle::new();
        pool.alloc(&mut handle, 100).expect("should fit");

        let state = pool.state_report();
        assert!(state.contains("LRU state"));
        assert!(state.contains("total pool size: 2048"));

        let dump = pool.layout_dump();
        assert!(dump.contains("allocated space @48"));
        assert!(dump.contains("leading free space"));
    }
}
