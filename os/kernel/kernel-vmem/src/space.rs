use crate::region::{VmRegion, VmrPerm};
use kernel_memory_addresses::{PhysicalAddress, VirtualAddress};

/// Why a translation could not be installed.
#[derive(Debug, Copy, Clone, Eq, PartialEq, thiserror::Error)]
pub enum MapError {
    #[error("out of memory for page-table pages")]
    OutOfMemory,
    #[error("{0} is already mapped")]
    AlreadyMapped(VirtualAddress),
    #[error("{0} is not page aligned")]
    Unaligned(VirtualAddress),
    #[error("{0} is outside the mappable range")]
    OutOfRange(VirtualAddress),
}

/// One process address space, as seen by the fault path.
pub trait VmSpace {
    /// The region covering `va`, if any.
    fn find_vmr_for_va(&self, va: VirtualAddress) -> Option<&VmRegion>;

    /// Map `[va, va + len)` to `[pa, pa + len)` with `perm`.
    ///
    /// `va`, `pa` and `len` are page aligned.
    ///
    /// # Errors
    /// Whatever prevents the page tables from taking the mapping; see
    /// [`MapError`]. A failed call leaves no partial mapping behind.
    fn map_range(
        &mut self,
        va: VirtualAddress,
        pa: PhysicalAddress,
        len: u64,
        perm: VmrPerm,
    ) -> Result<(), MapError>;
}
