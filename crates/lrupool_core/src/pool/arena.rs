//! # Arena Storage
//!
//! The single fixed-size buffer backing a pool. The arena is the only place
//! the pool touches host memory: one reservation at construction, one
//! release on drop. Every other component works in arena-relative offsets.

/// Byte written over freed regions in debug builds, so use-after-free shows
/// up as a recognizable pattern instead of stale payload.
const POISON_BYTE: u8 = 0xDD;

/// Owns the pool's backing buffer.
///
/// If the host cannot satisfy the reservation, the process aborts (Rust's
/// default allocation-failure behavior); there is no fallback capacity.
pub(crate) struct Arena {
    buf: Box<[u8]>,
}

impl Arena {
    pub fn new(capacity: usize) -> Self {
        Self {
            buf: vec![0u8; capacity].into_boxed_slice(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// Mutable view of `len` bytes starting at `offset`.
    pub fn view_mut(&mut self, offset: usize, len: usize) -> &mut [u8] {
        &mut self.buf[offset..offset + len]
    }

    /// Fills a freed region with the poison pattern in debug builds.
    pub fn poison(&mut self, offset: usize, len: usize) {
        if cfg!(debug_assertions) {
            self.buf[offset..offset + len].fill(POISON_BYTE);
        }
    }
}
