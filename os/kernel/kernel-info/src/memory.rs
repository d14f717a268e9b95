//! # Memory Layout

use kernel_memory_addresses::{PageSize, Size2M, Size4K, VirtualAddress};

/// log2 of the frame size.
pub const PAGE_SHIFT: u32 = Size4K::SHIFT;

/// Size of one physical frame, the buddy allocator's granularity.
pub const PAGE_SIZE: u64 = Size4K::SIZE;

/// Number of orders managed by the buddy allocator.
///
/// Valid orders are `0..BUDDY_MAX_ORDER`; the largest block therefore spans
/// `2^(BUDDY_MAX_ORDER - 1)` frames (32 MiB with 4 KiB frames).
pub const BUDDY_MAX_ORDER: usize = 14;

/// log2 of a level-2 block mapping.
pub const BLOCK_SHIFT: u32 = Size2M::SHIFT;

/// Size of a level-2 block mapping.
pub const BLOCK_SIZE: u64 = Size2M::SIZE;

/// Start of the kernel direct map.
///
/// Every physical address `pa` is reachable from the kernel at `KBASE + pa`.
/// Everything below is user space.
pub const KBASE: u64 = 0xffff_ff00_0000_0000;

const _: () = {
    assert!(PAGE_SIZE == 1 << PAGE_SHIFT);
    assert!(BLOCK_SIZE == 1 << BLOCK_SHIFT);
    assert!(BUDDY_MAX_ORDER > 0);
    assert!(KBASE.is_multiple_of(BLOCK_SIZE));
};

/// Whether `va` lies in user space.
#[inline]
#[must_use]
pub const fn is_user_addr(va: VirtualAddress) -> bool {
    va.as_u64() < KBASE
}

/// Whether `[va, va + len)` lies in user space without wrapping around.
#[inline]
#[must_use]
pub const fn is_user_addr_range(va: VirtualAddress, len: u64) -> bool {
    match va.as_u64().checked_add(len) {
        Some(end) => end < KBASE,
        None => false,
    }
}
