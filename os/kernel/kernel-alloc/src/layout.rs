//! Carving one raw memory region into page metadata and usable frames.
//!
//! ```text
//! region_start                                           region_start + len
//! ┌──────────────────────┬─────────┬──────────────────────────────────┐
//! │ page_num × Page      │ padding │ page_num × PAGE_SIZE frames      │
//! └──────────────────────┴─────────┴──────────────────────────────────┘
//!                                  ^ pool_start (PAGE_SIZE aligned)
//! ```

use crate::page::Page;
use kernel_info::memory::PAGE_SIZE;
use kernel_memory_addresses::{Size4K, VirtualAddress};

/// Where metadata and frames go inside a region.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct PoolLayout {
    pub metadata_start: VirtualAddress,
    pub pool_start: VirtualAddress,
    pub page_num: usize,
}

impl PoolLayout {
    const RECORD_SIZE: u64 = size_of::<Page>() as u64;

    /// Split `[region_start, region_start + region_len)` so that `page_num`
    /// metadata records come first, followed by `page_num` frames starting at
    /// the next page boundary.
    ///
    /// Returns `None` if not even one frame fits or the region wraps the
    /// address space.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn carve(region_start: VirtualAddress, region_len: u64) -> Option<Self> {
        let region_end = region_start.checked_add(region_len)?;

        let mut page_num = region_len / (PAGE_SIZE + Self::RECORD_SIZE);
        while page_num > 0 {
            let metadata_end = region_start.checked_add(page_num * Self::RECORD_SIZE)?;
            let pool_start = metadata_end.align_up::<Size4K>();
            let fits = pool_start >= metadata_end
                && pool_start
                    .checked_add(page_num * PAGE_SIZE)
                    .is_some_and(|end| end <= region_end);

            if fits {
                return Some(Self {
                    metadata_start: region_start,
                    pool_start,
                    page_num: page_num as usize,
                });
            }
            page_num -= 1;
        }
        None
    }

    /// Bytes taken up by the metadata records.
    #[must_use]
    pub const fn metadata_size(&self) -> u64 {
        self.page_num as u64 * Self::RECORD_SIZE
    }

    /// Bytes of usable frames.
    #[must_use]
    pub const fn pool_size(&self) -> u64 {
        self.page_num as u64 * PAGE_SIZE
    }

    /// Bind the metadata area of this layout.
    ///
    /// # Safety
    /// Same as [`metadata_from_raw`]; `metadata_start` must be a mapped,
    /// writable address.
    #[must_use]
    pub unsafe fn metadata(&self) -> &'static mut [Page] {
        // SAFETY: forwarded to the caller.
        unsafe { metadata_from_raw(self.metadata_start.as_mut_ptr(), self.page_num) }
    }
}

/// Turn `count` records' worth of raw memory at `ptr` into a metadata slice.
///
/// Every slot is overwritten with [`Page::default()`] first, so the previous
/// contents of the memory do not matter.
///
/// # Safety
/// - `ptr` must be valid for writes of `count` [`Page`] records and aligned
///   for `Page`.
/// - The memory must not be accessed through any other path for the rest of
///   the kernel's lifetime.
#[must_use]
pub unsafe fn metadata_from_raw(ptr: *mut Page, count: usize) -> &'static mut [Page] {
    for i in 0..count {
        // SAFETY: in bounds and writable per the caller's contract.
        unsafe { ptr.add(i).write(Page::default()) };
    }
    // SAFETY: all `count` slots were just initialized; exclusivity is the caller's.
    unsafe { core::slice::from_raw_parts_mut(ptr, count) }
}
