//! Pool-wide exclusion around [`PhysMemPool`].

use crate::buddy::PhysMemPool;
use crate::page::FrameIndex;
use core::fmt;
use kernel_info::memory::BUDDY_MAX_ORDER;
use kernel_memory_addresses::VirtualAddress;
use kernel_sync::{SpinLock, SpinLockGuard};

/// Something that hands out blocks of `2^order` direct-mapped frames.
pub trait PageAllocator {
    /// Allocate `2^order` contiguous frames; `None` on exhaustion or an order
    /// the allocator does not have.
    fn get_pages(&self, order: usize) -> Option<VirtualAddress>;

    /// Return a block previously obtained from [`get_pages`](Self::get_pages).
    fn free_pages(&self, address: VirtualAddress);

    /// Allocate a single frame.
    #[inline]
    fn get_page(&self) -> Option<VirtualAddress> {
        self.get_pages(0)
    }

    #[inline]
    fn free_page(&self, address: VirtualAddress) {
        self.free_pages(address);
    }
}

/// A [`PhysMemPool`] behind a spin lock.
///
/// Every operation holds the lock for its whole duration, split and merge
/// included, and releases it on return.
pub struct LockedPool<'m, const MAX_ORDER: usize = BUDDY_MAX_ORDER> {
    pool: SpinLock<PhysMemPool<'m, MAX_ORDER>>,
}

impl<'m, const MAX_ORDER: usize> LockedPool<'m, MAX_ORDER> {
    #[must_use]
    pub const fn new(pool: PhysMemPool<'m, MAX_ORDER>) -> Self {
        Self {
            pool: SpinLock::new(pool),
        }
    }

    /// Hold the lock across several operations.
    pub fn lock(&self) -> SpinLockGuard<'_, PhysMemPool<'m, MAX_ORDER>> {
        self.pool.lock()
    }

    pub fn acquire(&self, order: usize) -> Option<FrameIndex> {
        self.pool.with_lock(|pool| pool.acquire(order))
    }

    pub fn release(&self, block: FrameIndex) {
        self.pool.with_lock(|pool| pool.release(block));
    }

    /// Address of the frame `index`, if it lies in the pool.
    #[must_use]
    pub fn page_to_virt(&self, index: FrameIndex) -> Option<VirtualAddress> {
        self.pool.with_lock(|pool| pool.frame_index_to_address(index))
    }

    /// Frame containing `address`, if it lies in the pool.
    #[must_use]
    pub fn virt_to_page(&self, address: VirtualAddress) -> Option<FrameIndex> {
        self.pool
            .with_lock(|pool| pool.address_to_frame_index(address))
    }

    #[must_use]
    pub fn total_free_bytes(&self) -> u64 {
        self.pool.with_lock(|pool| pool.total_free_bytes())
    }

    #[must_use]
    pub fn free_counts(&self) -> [usize; MAX_ORDER] {
        self.pool.with_lock(|pool| pool.free_counts())
    }

    #[must_use]
    pub fn into_inner(self) -> PhysMemPool<'m, MAX_ORDER> {
        self.pool.into_inner()
    }
}

impl<const MAX_ORDER: usize> PageAllocator for LockedPool<'_, MAX_ORDER> {
    fn get_pages(&self, order: usize) -> Option<VirtualAddress> {
        self.pool.with_lock(|pool| pool.get_pages(order))
    }

    fn free_pages(&self, address: VirtualAddress) {
        self.pool.with_lock(|pool| pool.free_pages(address));
    }
}

impl<const MAX_ORDER: usize> fmt::Display for LockedPool<'_, MAX_ORDER> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.pool.with_lock(|pool| fmt::Display::fmt(pool, f))
    }
}
