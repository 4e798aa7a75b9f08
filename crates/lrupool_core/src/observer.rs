//! # Region Observer
//!
//! Optional hook for memory-safety instrumentation. The pool reports region
//! transitions at exactly three points: the whole free space goes invalid at
//! construction, a carved region becomes valid right before its payload view
//! is handed out, and a freed region goes invalid right after it is
//! unspliced. A sanitizer shim can poison/unpoison the backing buffer from
//! these calls; the default observer does nothing, and correctness never
//! depends on one being present.

/// Capability interface for tracking which arena regions hold valid payload.
///
/// Offsets are arena-relative, lengths in bytes. Implementations must not
/// call back into the pool.
pub trait RegionObserver {
    /// Called when `[offset, offset + len)` becomes valid payload space.
    fn mark_accessible(&mut self, offset: usize, len: usize);

    /// Called when `[offset, offset + len)` stops being valid payload space.
    fn mark_inaccessible(&mut self, offset: usize, len: usize);
}

/// Observer that ignores every region transition. The default.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopObserver;

impl RegionObserver for NoopObserver {
    fn mark_accessible(&mut self, _offset: usize, _len: usize) {}

    fn mark_inaccessible(&mut self, _offset: usize, _len: usize) {}
}
