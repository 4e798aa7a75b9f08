//! # Pool Handles
//!
//! The caller-held token identifying at most one live allocation.

use super::block::BlockId;

/// Caller-held token bound to at most one live pool block.
///
/// A handle starts unbound, is bound by [`LruPool::alloc`] and unbound by
/// [`LruPool::free`] or by an eviction triggered through another handle's
/// `alloc`. The handle stores a generation-checked [`BlockId`], so an
/// evicted handle simply reports unbound; no dangling state is possible.
///
/// Handles are deliberately neither `Clone` nor `Copy`: a block has exactly
/// one owning handle, and duplicating the token would let two owners free
/// the same block. Moving a handle is fine. Rebinding requires an explicit
/// `free` followed by a fresh `alloc`.
///
/// [`LruPool::alloc`]: super::LruPool::alloc
/// [`LruPool::free`]: super::LruPool::free
#[derive(Debug, Default)]
pub struct PoolHandle {
    binding: Option<BlockId>,
}

impl PoolHandle {
    /// Creates an unbound handle.
    #[must_use]
    pub fn new() -> Self {
        Self { binding: None }
    }

    /// The binding recorded by the last `alloc`, if any.
    ///
    /// May be stale after an eviction; [`LruPool::resolve`] validates it
    /// against the pool.
    ///
    /// [`LruPool::resolve`]: super::LruPool::resolve
    #[must_use]
    pub fn binding(&self) -> Option<BlockId> {
        self.binding
    }

    pub(crate) fn bind(&mut self, id: BlockId) {
        self.binding = Some(id);
    }

    pub(crate) fn clear(&mut self) {
        self.binding = None;
    }
}
