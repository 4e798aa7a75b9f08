//! # Block Iteration
//!
//! Forward-only traversal over live blocks, in address order or recency
//! order. The iterator is a live view: it borrows the pool shared, so any
//! `alloc` or `free` during traversal is rejected by the borrow checker
//! instead of silently invalidating the cursor.

use super::block::{BlockId, BlockTable, SENTINEL};

/// Traversal order for [`Blocks`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IterOrder {
    /// Ascending physical position in the arena.
    Address,
    /// Most recently used first.
    Recency,
}

/// Iterator over live blocks in a fixed order, ending at the sentinel.
///
/// Single-pass; restart by calling [`LruPool::iter`] again.
///
/// [`LruPool::iter`]: super::LruPool::iter
pub struct Blocks<'a> {
    table: &'a BlockTable,
    cursor: u32,
    order: IterOrder,
}

impl<'a> Blocks<'a> {
    pub(crate) fn new(table: &'a BlockTable, order: IterOrder) -> Self {
        let cursor = match order {
            IterOrder::Address => table.first_by_address(),
            IterOrder::Recency => table.first_by_recency(),
        };
        Self {
            table,
            cursor,
            order,
        }
    }
}

impl Iterator for Blocks<'_> {
    type Item = BlockId;

    fn next(&mut self) -> Option<BlockId> {
        if self.cursor == SENTINEL {
            return None;
        }
        let id = self.table.id_of(self.cursor);
        let block = self.table.get(self.cursor);
        self.cursor = match self.order {
            IterOrder::Address => block.next_addr,
            IterOrder::Recency => block.next_rec,
        };
        Some(id)
    }
}
