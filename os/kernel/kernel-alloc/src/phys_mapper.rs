//! # Kernel direct map
//!
//! All physical memory is mapped once at [`KBASE`], so a frame handed out by
//! the buddy pool (a kernel virtual address) and the physical address the
//! page tables need differ by a constant:
//!
//! ```text
//! pa = va - KBASE
//! va = pa + KBASE
//! ```
//!
//! [`PhysMapper`] abstracts over that so callers that install translations
//! can be tested with a different offset.

use kernel_info::memory::KBASE;
use kernel_memory_addresses::{PhysicalAddress, VirtualAddress};

/// Translation between direct-mapped kernel addresses and physical addresses.
pub trait PhysMapper {
    /// Physical address behind a direct-mapped kernel address.
    fn virt_to_phys(&self, va: VirtualAddress) -> PhysicalAddress;

    /// Direct-mapped kernel address of a physical address.
    fn phys_to_virt(&self, pa: PhysicalAddress) -> VirtualAddress;
}

/// [`PhysMapper`] for the kernel's direct map at [`KBASE`].
#[derive(Copy, Clone, Debug, Default)]
pub struct KbaseMapper;

impl PhysMapper for KbaseMapper {
    #[inline]
    fn virt_to_phys(&self, va: VirtualAddress) -> PhysicalAddress {
        debug_assert!(va.as_u64() >= KBASE, "{va} is not in the direct map");
        PhysicalAddress::new(va.as_u64().wrapping_sub(KBASE))
    }

    #[inline]
    fn phys_to_virt(&self, pa: PhysicalAddress) -> VirtualAddress {
        VirtualAddress::new(pa.as_u64().wrapping_add(KBASE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direct_map_offsets_by_kbase() {
        let mapper = KbaseMapper;
        let va = VirtualAddress::new(KBASE + 0x4000_2000);
        let pa = mapper.virt_to_phys(va);

        assert_eq!(pa, PhysicalAddress::new(0x4000_2000));
        assert_eq!(mapper.phys_to_virt(pa), va);
    }
}
