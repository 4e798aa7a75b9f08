//! # Block Table
//!
//! Slot-indexed storage for block headers and the two circular intrusive
//! lists ordering them: physical (address) order and recency order.
//!
//! Links are `u32` slot indices rather than pointers. Slot 0 is the
//! sentinel: a permanently resident zero-payload block that anchors both
//! circular lists and pins the base of the arena. Retiring a slot bumps its
//! generation counter, so identities held across a free or an eviction stop
//! resolving instead of aliasing the slot's next occupant.

use super::BLOCK_HEADER_SIZE;

/// Slot index of the sentinel block.
pub(crate) const SENTINEL: u32 = 0;

/// Identity of a live block: a slot index plus the slot's generation at
/// binding time.
///
/// Stale ids (the slot was freed or evicted since) are harmless; every
/// lookup validates the generation and reports absence instead.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BlockId {
    slot: u32,
    generation: u32,
}

impl BlockId {
    pub(crate) const fn new(slot: u32, generation: u32) -> Self {
        Self { slot, generation }
    }
}

/// Header for one reserved region of the arena.
///
/// `size` covers the whole region including the header stride, and is always
/// a multiple of the alignment unit.
#[derive(Debug)]
pub(crate) struct Block {
    pub offset: usize,
    pub size: usize,
    pub generation: u32,
    pub live: bool,
    /// Address-order links, ascending offset, circular through the sentinel.
    pub prev_addr: u32,
    pub next_addr: u32,
    /// Recency links. `next_rec` walks toward the least recently used end,
    /// `prev_rec` toward the most recently used end.
    pub next_rec: u32,
    pub prev_rec: u32,
}

/// Slot storage for blocks plus both intrusive lists.
pub(crate) struct BlockTable {
    slots: Vec<Block>,
    free_slots: Vec<u32>,
    live: usize,
}

impl BlockTable {
    /// Creates a table holding only the sentinel, both lists empty.
    pub fn new() -> Self {
        let sentinel = Block {
            offset: 0,
            size: BLOCK_HEADER_SIZE,
            generation: 0,
            live: true,
            prev_addr: SENTINEL,
            next_addr: SENTINEL,
            next_rec: SENTINEL,
            prev_rec: SENTINEL,
        };
        Self {
            slots: vec![sentinel],
            free_slots: Vec::new(),
            live: 0,
        }
    }

    pub fn get(&self, slot: u32) -> &Block {
        &self.slots[slot as usize]
    }

    /// Current identity of a slot.
    pub fn id_of(&self, slot: u32) -> BlockId {
        BlockId::new(slot, self.get(slot).generation)
    }

    /// Validates an identity against the table. The sentinel never resolves.
    pub fn resolve(&self, id: BlockId) -> Option<u32> {
        let block = self.slots.get(id.slot as usize)?;
        (id.slot != SENTINEL && block.live && block.generation == id.generation)
            .then_some(id.slot)
    }

    /// Carves a new block after `prev_addr` in address order and links it at
    /// the most recently used end of the recency list.
    pub fn insert(&mut self, offset: usize, size: usize, prev_addr: u32) -> u32 {
        let slot = if let Some(slot) = self.free_slots.pop() {
            let block = &mut self.slots[slot as usize];
            block.offset = offset;
            block.size = size;
            block.live = true;
            slot
        } else {
            self.slots.push(Block {
                offset,
                size,
                generation: 0,
                live: true,
                prev_addr: SENTINEL,
                next_addr: SENTINEL,
                next_rec: SENTINEL,
                prev_rec: SENTINEL,
            });
            (self.slots.len() - 1) as u32
        };

        let next_addr = self.slots[prev_addr as usize].next_addr;
        self.slots[slot as usize].prev_addr = prev_addr;
        self.slots[slot as usize].next_addr = next_addr;
        self.slots[prev_addr as usize].next_addr = slot;
        self.slots[next_addr as usize].prev_addr = slot;

        self.link_recency(slot);
        self.live += 1;
        slot
    }

    /// Unsplices `slot` from both lists and retires it. The generation bump
    /// invalidates every outstanding id for the slot.
    pub fn remove(&mut self, slot: u32) {
        debug_assert_ne!(slot, SENTINEL, "the sentinel is permanently resident");
        debug_assert!(self.get(slot).live, "removing a retired slot");

        let (prev_addr, next_addr) = {
            let block = self.get(slot);
            (block.prev_addr, block.next_addr)
        };
        self.slots[prev_addr as usize].next_addr = next_addr;
        self.slots[next_addr as usize].prev_addr = prev_addr;

        self.unlink_recency(slot);

        let block = &mut self.slots[slot as usize];
        block.live = false;
        block.size = 0;
        block.generation = block.generation.wrapping_add(1);
        self.free_slots.push(slot);
        self.live -= 1;
    }

    /// Moves `slot` to the most recently used end of the recency list.
    pub fn touch(&mut self, slot: u32) {
        self.unlink_recency(slot);
        self.link_recency(slot);
    }

    fn link_recency(&mut self, slot: u32) {
        let mru = self.slots[SENTINEL as usize].next_rec;
        self.slots[slot as usize].prev_rec = SENTINEL;
        self.slots[slot as usize].next_rec = mru;
        self.slots[mru as usize].prev_rec = slot;
        self.slots[SENTINEL as usize].next_rec = slot;
    }

    fn unlink_recency(&mut self, slot: u32) {
        let (prev_rec, next_rec) = {
            let block = self.get(slot);
            (block.prev_rec, block.next_rec)
        };
        self.slots[prev_rec as usize].next_rec = next_rec;
        self.slots[next_rec as usize].prev_rec = prev_rec;
    }

    /// Least recently used block, or the sentinel when the pool is empty.
    pub fn lru(&self) -> u32 {
        self.get(SENTINEL).prev_rec
    }

    /// First block in address order, or the sentinel when the pool is empty.
    pub fn first_by_address(&self) -> u32 {
        self.get(SENTINEL).next_addr
    }

    /// Most recently used block, or the sentinel when the pool is empty.
    pub fn first_by_recency(&self) -> u32 {
        self.get(SENTINEL).next_rec
    }

    /// Number of live blocks, sentinel excluded.
    pub fn live_blocks(&self) -> usize {
        self.live
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinel_anchors_empty_lists() {
        let table = BlockTable::new();
        assert_eq!(table.first_by_address(), SENTINEL);
        assert_eq!(table.first_by_recency(), SENTINEL);
        assert_eq!(table.lru(), SENTINEL);
        assert_eq!(table.live_blocks(), 0);
    }

    #[test]
    fn test_insert_links_both_lists() {
        let mut table = BlockTable::new();
        let a = table.insert(48, 64, SENTINEL);
        let b = table.insert(112, 64, a);

        // Address order: sentinel -> a -> b -> sentinel.
        assert_eq!(table.first_by_address(), a);
        assert_eq!(table.get(a).next_addr, b);
        assert_eq!(table.get(b).next_addr, SENTINEL);
        assert_eq!(table.get(SENTINEL).prev_addr, b);

        // Recency order: b is most recent, a is least recent.
        assert_eq!(table.first_by_recency(), b);
        assert_eq!(table.lru(), a);
        assert_eq!(table.get(b).next_rec, a);
        assert_eq!(table.get(a).next_rec, SENTINEL);
    }

    #[test]
    fn test_remove_unsplices_both_lists() {
        let mut table = BlockTable::new();
        let a = table.insert(48, 64, SENTINEL);
        let b = table.insert(112, 64, a);
        let c = table.insert(176, 64, b);

        table.remove(b);

        assert_eq!(table.get(a).next_addr, c);
        assert_eq!(table.get(c).prev_addr, a);
        assert_eq!(table.first_by_recency(), c);
        assert_eq!(table.get(c).next_rec, a);
        assert_eq!(table.live_blocks(), 2);
    }

    #[test]
    fn test_touch_moves_to_most_recent() {
        let mut table = BlockTable::new();
        let a = table.insert(48, 64, SENTINEL);
        let b = table.insert(112, 64, a);
        let c = table.insert(176, 64, b);

        table.touch(a);

        assert_eq!(table.first_by_recency(), a);
        assert_eq!(table.get(a).next_rec, c);
        assert_eq!(table.lru(), b);
    }

    #[test]
    fn test_generation_invalidates_stale_id() {
        let mut table = BlockTable::new();
        let a = table.insert(48, 64, SENTINEL);
        let stale = table.id_of(a);

        table.remove(a);
        assert_eq!(table.resolve(stale), None);

        // The slot is reused with a fresh generation.
        let b = table.insert(48, 64, SENTINEL);
        assert_eq!(b, a);
        assert_eq!(table.resolve(stale), None);
        assert_eq!(table.resolve(table.id_of(b)), Some(b));
    }

    #[test]
    fn test_sentinel_never_resolves() {
        let table = BlockTable::new();
        assert_eq!(table.resolve(table.id_of(SENTINEL)), None);
    }
}
