//! `FAR_EL1`: Fault Address Register.

use kernel_memory_addresses::VirtualAddress;

/// The virtual address of the data access that raised a synchronous abort.
///
/// Only meaningful while handling the abort that set it, and only if the
/// abort's `FnV` syndrome bit is clear.
#[repr(transparent)]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct FarEl1(VirtualAddress);

impl FarEl1 {
    #[inline]
    #[must_use]
    pub const fn new(va: VirtualAddress) -> Self {
        Self(va)
    }

    #[inline]
    #[must_use]
    pub const fn fault_address(self) -> VirtualAddress {
        self.0
    }
}

#[cfg(all(feature = "asm", target_arch = "aarch64"))]
impl crate::LoadRegisterUnsafe for FarEl1 {
    unsafe fn load_unsafe() -> Self {
        let far: u64;
        unsafe {
            core::arch::asm!("mrs {}, far_el1", out(reg) far, options(nomem, nostack, preserves_flags));
        }
        Self(VirtualAddress::new(far))
    }
}
