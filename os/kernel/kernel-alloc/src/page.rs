//! Per-frame metadata records.

use core::fmt;

/// Index of a frame inside one pool's metadata array.
///
/// This is the handle the allocator hands out instead of a raw pointer into
/// the metadata area. It only means something relative to the pool that
/// produced it.
#[repr(transparent)]
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct FrameIndex(usize);

impl FrameIndex {
    #[inline]
    #[must_use]
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    #[inline]
    #[must_use]
    pub const fn as_usize(self) -> usize {
        self.0
    }
}

impl fmt::Debug for FrameIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "frame#{}", self.0)
    }
}

/// Metadata for one physical frame.
///
/// The `order` of a record is only meaningful while it heads a block. Records
/// of non-head frames keep whatever they last held.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct Page {
    /// Block size as `2^order` frames.
    order: u8,
    /// In use, as opposed to a member of the free list for `order`.
    allocated: bool,
    /// Free-list linkage; `None` at the ends or when not on a list.
    pub(crate) prev: Option<FrameIndex>,
    pub(crate) next: Option<FrameIndex>,
}

impl Page {
    #[inline]
    #[must_use]
    pub const fn order(&self) -> usize {
        self.order as usize
    }

    #[inline]
    #[must_use]
    pub const fn is_allocated(&self) -> bool {
        self.allocated
    }

    #[inline]
    #[allow(clippy::cast_possible_truncation)]
    pub(crate) const fn set_order(&mut self, order: usize) {
        debug_assert!(order <= u8::MAX as usize);
        self.order = order as u8;
    }

    #[inline]
    pub(crate) const fn mark_allocated(&mut self) {
        self.allocated = true;
    }

    #[inline]
    pub(crate) const fn mark_free(&mut self) {
        self.allocated = false;
    }

    #[inline]
    pub(crate) const fn is_linked(&self) -> bool {
        self.prev.is_some() || self.next.is_some()
    }
}
