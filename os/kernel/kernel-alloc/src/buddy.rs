//! Buddy allocator over one contiguous pool of physical frames.

use crate::free_list::FreeList;
use crate::page::{FrameIndex, Page};
use core::fmt;
use kernel_info::memory::{BUDDY_MAX_ORDER, PAGE_SIZE};
use kernel_memory_addresses::{Size4K, VirtualAddress};
use log::{debug, info, trace, warn};

/// A physical memory pool managed by the buddy algorithm.
///
/// The pool borrows its metadata array and refers to frames by [`FrameIndex`].
/// Usable memory spans `[pool_start_addr, pool_start_addr + pool_mem_size)` in
/// the kernel direct map; addresses only appear at the edges of the API.
///
/// `MAX_ORDER` is the number of free lists: blocks have orders
/// `0..MAX_ORDER`.
///
/// # Invariants
/// - Every record with `allocated == false` that heads a block is on exactly
///   one free list, the one matching its order.
/// - `sum(nr_free(o) * 2^o)` equals the number of frames not allocated.
/// - Two buddies are never both free at the same order (they would have
///   merged), except at order `MAX_ORDER - 1`.
///
/// No locking happens here; see [`LockedPool`](crate::LockedPool).
pub struct PhysMemPool<'m, const MAX_ORDER: usize = BUDDY_MAX_ORDER> {
    pool_start_addr: VirtualAddress,
    pool_mem_size: u64,
    page_metadata: &'m mut [Page],
    free_lists: [FreeList; MAX_ORDER],
}

/// Reasons [`PhysMemPool::init`] refuses a pool description.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PoolInitError {
    #[error("a pool needs at least one frame")]
    Empty,
    #[error("metadata array holds {have} records but the pool has {need} frames")]
    MetadataTooSmall { have: usize, need: usize },
    #[error("pool start {0} is not frame aligned")]
    Unaligned(VirtualAddress),
    #[error("pool of {page_num} frames at {start} runs past the end of the address space")]
    AddressOverflow {
        start: VirtualAddress,
        page_num: usize,
    },
}

impl<'m, const MAX_ORDER: usize> PhysMemPool<'m, MAX_ORDER> {
    /// Build a pool over `page_num` frames starting at `start_addr`, using the
    /// first `page_num` records of `page_metadata`.
    ///
    /// The metadata is cleared, every frame is marked allocated at order 0 and
    /// then released one by one, so the free lists end up holding the maximal
    /// blocks the ordinary merge path discovers.
    ///
    /// # Errors
    /// See [`PoolInitError`].
    pub fn init(
        page_metadata: &'m mut [Page],
        start_addr: VirtualAddress,
        page_num: usize,
    ) -> Result<Self, PoolInitError> {
        const {
            assert!(MAX_ORDER > 0, "a pool needs at least one order");
            assert!(MAX_ORDER < 64, "orders must fit a u64 shift");
        };

        if page_num == 0 {
            return Err(PoolInitError::Empty);
        }
        if page_metadata.len() < page_num {
            return Err(PoolInitError::MetadataTooSmall {
                have: page_metadata.len(),
                need: page_num,
            });
        }
        if !start_addr.is_aligned::<Size4K>() {
            return Err(PoolInitError::Unaligned(start_addr));
        }
        let pool_mem_size = (page_num as u64)
            .checked_mul(PAGE_SIZE)
            .filter(|size| start_addr.checked_add(*size).is_some())
            .ok_or(PoolInitError::AddressOverflow {
                start: start_addr,
                page_num,
            })?;

        let largest_block = PAGE_SIZE << (MAX_ORDER - 1);
        if start_addr.as_u64() % largest_block != 0 {
            debug!(
                "pool start {start_addr} is not aligned to the largest block ({largest_block:#x} bytes); top-order blocks may never form"
            );
        }

        let page_metadata = &mut page_metadata[..page_num];
        for page in page_metadata.iter_mut() {
            *page = Page::default();
            page.mark_allocated();
            page.set_order(0);
        }

        let mut pool = Self {
            pool_start_addr: start_addr,
            pool_mem_size,
            page_metadata,
            free_lists: [FreeList::EMPTY; MAX_ORDER],
        };

        for index in 0..page_num {
            pool.release(FrameIndex::new(index));
        }

        info!(
            "buddy pool at {start_addr}: {page_num} frames, {} bytes free",
            pool.total_free_bytes()
        );
        Ok(pool)
    }

    /// Allocate a block of `2^order` contiguous frames.
    ///
    /// Returns `None` without touching any free list if `order >= MAX_ORDER`
    /// or no block of that order or larger is free.
    pub fn acquire(&mut self, order: usize) -> Option<FrameIndex> {
        if order >= MAX_ORDER {
            return None;
        }

        let source_order = (order..MAX_ORDER).find(|&o| !self.free_lists[o].is_empty())?;
        let head = self.free_lists[source_order].first()?;

        let block = self.split(order, head);
        self.free_lists[order].remove(self.page_metadata, block);
        self.page_metadata[block.as_usize()].mark_allocated();

        trace!("acquire(order={order}) -> {block:?} (from order {source_order})");
        Some(block)
    }

    /// Give a block obtained from [`acquire`](Self::acquire) back to the pool
    /// and coalesce it with free buddies.
    ///
    /// Releasing a block that is already free is reported and ignored.
    pub fn release(&mut self, block: FrameIndex) {
        let Some(page) = self.page_metadata.get_mut(block.as_usize()) else {
            warn!("release of {block:?} outside a pool of {} frames", self.page_count());
            return;
        };
        if !page.is_allocated() {
            warn!("release of free block {block:?} ignored");
            return;
        }

        page.mark_free();
        let order = page.order();
        self.free_lists[order].push_front(self.page_metadata, block);

        self.merge(block);
    }

    /// Halve the free block `block` until it has `target_order`.
    ///
    /// Every halving moves the block one list down and puts its upper half on
    /// the same list. Allocated blocks and blocks already at or below
    /// `target_order` come back unchanged.
    fn split(&mut self, target_order: usize, block: FrameIndex) -> FrameIndex {
        if self.page(block).is_allocated() {
            return block;
        }

        while self.page(block).order() > target_order {
            let order = self.page(block).order();
            self.free_lists[order].remove(self.page_metadata, block);

            let lower = order - 1;
            self.page_mut(block).set_order(lower);

            let Some(buddy) = self.buddy_of(block) else {
                unreachable!("upper half of {block:?} at order {order} lies outside the pool");
            };
            let buddy_page = self.page_mut(buddy);
            buddy_page.mark_free();
            buddy_page.set_order(lower);

            let list = &mut self.free_lists[lower];
            list.push_front(self.page_metadata, block);
            list.push_front(self.page_metadata, buddy);

            trace!("split {block:?}: order {order} -> {lower}, buddy {buddy:?}");
        }

        block
    }

    /// Coalesce the free block `block` with its buddy for as long as the buddy
    /// is free and of the same order. Returns the surviving head.
    fn merge(&mut self, mut block: FrameIndex) -> FrameIndex {
        loop {
            let page = *self.page(block);
            let order = page.order();
            if order >= MAX_ORDER - 1 || page.is_allocated() {
                return block;
            }

            let Some(buddy) = self.buddy_of(block) else {
                return block;
            };
            let buddy_page = self.page(buddy);
            if buddy_page.is_allocated() || buddy_page.order() != order {
                return block;
            }

            let (low, high) = if buddy < block {
                (buddy, block)
            } else {
                (block, buddy)
            };

            let list = &mut self.free_lists[order];
            list.remove(self.page_metadata, low);
            list.remove(self.page_metadata, high);

            self.page_mut(low).set_order(order + 1);
            self.free_lists[order + 1].push_front(self.page_metadata, low);

            trace!("merge {low:?} + {high:?} -> order {}", order + 1);
            block = low;
        }
    }

    /// The buddy of `block` at its current order: the block whose address
    /// differs in exactly the bit `PAGE_SIZE << order`.
    ///
    /// `None` if `block` is not in the pool or its buddy falls outside it.
    #[must_use]
    pub fn buddy_of(&self, block: FrameIndex) -> Option<FrameIndex> {
        let page = self.page_metadata.get(block.as_usize())?;
        let buddy = self.address_of(block).as_u64() ^ (PAGE_SIZE << page.order());
        self.address_to_frame_index(VirtualAddress::new(buddy))
    }

    /// Address of the frame at `index`, or `None` if the pool has no such
    /// frame.
    #[inline]
    #[must_use]
    pub fn frame_index_to_address(&self, index: FrameIndex) -> Option<VirtualAddress> {
        (index.as_usize() < self.page_count()).then(|| self.address_of(index))
    }

    #[inline]
    fn address_of(&self, index: FrameIndex) -> VirtualAddress {
        self.pool_start_addr + index.as_usize() as u64 * PAGE_SIZE
    }

    /// Index of the frame containing `address`, or `None` outside the pool.
    #[inline]
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn address_to_frame_index(&self, address: VirtualAddress) -> Option<FrameIndex> {
        let offset = address.distance_from(self.pool_start_addr)?;
        (offset < self.pool_mem_size).then(|| FrameIndex::new((offset / PAGE_SIZE) as usize))
    }

    /// Allocate `2^order` frames and return the address of the first.
    pub fn get_pages(&mut self, order: usize) -> Option<VirtualAddress> {
        self.acquire(order).map(|block| self.address_of(block))
    }

    /// Release the block starting at `address`.
    pub fn free_pages(&mut self, address: VirtualAddress) {
        match self.address_to_frame_index(address) {
            Some(block) => self.release(block),
            None => warn!("free_pages({address}) outside the pool"),
        }
    }

    /// Bytes held in free blocks, summed over all orders.
    #[must_use]
    pub fn total_free_bytes(&self) -> u64 {
        let mut total = 0;
        for (order, list) in self.free_lists.iter().enumerate() {
            let block_size = PAGE_SIZE << order;
            debug!(
                "buddy memory chunk order: {order}, size: {block_size:#x}, num: {}",
                list.nr_free()
            );
            total += list.nr_free() as u64 * block_size;
        }
        total
    }

    /// Number of free blocks of `order`; zero for orders the pool doesn't have.
    #[inline]
    #[must_use]
    pub fn free_count(&self, order: usize) -> usize {
        self.free_lists.get(order).map_or(0, FreeList::nr_free)
    }

    #[must_use]
    pub fn free_counts(&self) -> [usize; MAX_ORDER] {
        core::array::from_fn(|order| self.free_lists[order].nr_free())
    }

    /// Heads of the free blocks of `order`, most recently freed first.
    pub fn free_blocks(&self, order: usize) -> impl Iterator<Item = FrameIndex> + '_ {
        let pages: &[Page] = &*self.page_metadata;
        self.free_lists
            .get(order)
            .into_iter()
            .flat_map(move |list| list.iter(pages))
    }

    #[inline]
    #[must_use]
    pub fn is_allocated(&self, index: FrameIndex) -> Option<bool> {
        self.page_metadata
            .get(index.as_usize())
            .map(Page::is_allocated)
    }

    /// Order recorded for `index`; only meaningful for block heads.
    #[inline]
    #[must_use]
    pub fn order_of(&self, index: FrameIndex) -> Option<usize> {
        self.page_metadata.get(index.as_usize()).map(Page::order)
    }

    #[inline]
    #[must_use]
    pub const fn page_count(&self) -> usize {
        self.page_metadata.len()
    }

    #[inline]
    #[must_use]
    pub const fn pool_mem_size(&self) -> u64 {
        self.pool_mem_size
    }

    #[inline]
    #[must_use]
    pub const fn pool_start_addr(&self) -> VirtualAddress {
        self.pool_start_addr
    }

    #[inline]
    #[must_use]
    pub const fn max_order(&self) -> usize {
        MAX_ORDER
    }

    #[inline]
    fn page(&self, index: FrameIndex) -> &Page {
        &self.page_metadata[index.as_usize()]
    }

    #[inline]
    fn page_mut(&mut self, index: FrameIndex) -> &mut Page {
        &mut self.page_metadata[index.as_usize()]
    }
}

impl<const MAX_ORDER: usize> fmt::Display for PhysMemPool<'_, MAX_ORDER> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "  Start: {} / Frames: {} / Orders: {}",
            self.pool_start_addr,
            self.page_count(),
            MAX_ORDER
        )?;
        write!(f, "  Free lists: ")?;
        for (order, list) in self.free_lists.iter().enumerate() {
            write!(f, "{} in O{order} / ", list.nr_free())?;
        }
        Ok(())
    }
}
