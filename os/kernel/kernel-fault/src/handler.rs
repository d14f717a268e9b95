use crate::error::FaultError;
use kernel_alloc::{PageAllocator, PhysMapper};
use kernel_info::memory::PAGE_SIZE;
use kernel_memory_addresses::{Size4K, VirtualAddress};
use kernel_vmem::VmSpace;
use log::debug;

/// Resolve a translation fault at `fault_addr` by backing its page with a
/// fresh frame.
///
/// Only regions backed by anonymous memory are serviced. Exactly one frame is
/// allocated and exactly one page, the one containing `fault_addr`, is
/// mapped with the region's permissions. The frame goes back to `pages` if
/// the mapping cannot be installed.
///
/// # Errors
/// See [`FaultError`]. No frame is held on any error path.
pub fn handle_trans_fault<S, A, M>(
    vmspace: &mut S,
    fault_addr: VirtualAddress,
    pages: &A,
    mapper: &M,
) -> Result<(), FaultError>
where
    S: VmSpace + ?Sized,
    A: PageAllocator + ?Sized,
    M: PhysMapper + ?Sized,
{
    let Some(vmr) = vmspace.find_vmr_for_va(fault_addr).copied() else {
        debug!("no vmr for {fault_addr}");
        return Err(FaultError::NoRegion(fault_addr));
    };

    if !vmr.pmo.is_anonymous() {
        debug!(
            "vmr at {} is backed by {:?}, not anonymous memory",
            vmr.start, vmr.pmo.pmo_type
        );
        return Err(FaultError::NotAnonymous(vmr.pmo.pmo_type));
    }

    let Some(page) = pages.get_page() else {
        debug!("no free frame for {fault_addr}");
        return Err(FaultError::OutOfMemory);
    };

    let va = fault_addr.align_down::<Size4K>();
    let pa = mapper.virt_to_phys(page);

    if let Err(source) = vmspace.map_range(va, pa, PAGE_SIZE, vmr.perm) {
        pages.free_page(page);
        debug!("mapping {va} -> {pa} failed: {source}");
        return Err(FaultError::MapFailed { va, source });
    }

    debug!("mapped {va} -> {pa} ({:?})", vmr.perm);
    Ok(())
}
