use kernel_memory_addresses::VirtualAddress;

bitflags::bitflags! {
    /// Access rights of a virtual memory region.
    ///
    /// Passed through unchanged when installing translations for the region.
    #[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
    pub struct VmrPerm: u64 {
        const READ  = 1 << 0;
        const WRITE = 1 << 1;
        const EXEC  = 1 << 2;
    }
}

/// How a physical memory object is backed.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum PmoType {
    /// Physically contiguous memory filled when the object was created.
    Data,
    /// Memory that is allocated frame by frame on first touch.
    Anonymous,
    /// Memory shared between address spaces.
    Shared,
    /// Device memory at a fixed physical address.
    Device,
}

/// A physical memory object backing one or more regions.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct PmObject {
    pub pmo_type: PmoType,
    /// Size of the object in bytes.
    pub size: u64,
}

impl PmObject {
    #[must_use]
    pub const fn new(pmo_type: PmoType, size: u64) -> Self {
        Self { pmo_type, size }
    }

    #[must_use]
    pub const fn anonymous(size: u64) -> Self {
        Self::new(PmoType::Anonymous, size)
    }

    #[inline]
    #[must_use]
    pub const fn is_anonymous(&self) -> bool {
        matches!(self.pmo_type, PmoType::Anonymous)
    }
}

/// A virtual range `[start, start + size)` of an address space.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct VmRegion {
    pub start: VirtualAddress,
    pub size: u64,
    pub perm: VmrPerm,
    pub pmo: PmObject,
}

impl VmRegion {
    #[must_use]
    pub const fn new(start: VirtualAddress, size: u64, perm: VmrPerm, pmo: PmObject) -> Self {
        Self {
            start,
            size,
            perm,
            pmo,
        }
    }

    /// Whether `va` falls inside the region.
    #[inline]
    #[must_use]
    pub const fn contains(&self, va: VirtualAddress) -> bool {
        match va.distance_from(self.start) {
            Some(offset) => offset < self.size,
            None => false,
        }
    }

    /// First address past the region, `None` if the region ends at the top of
    /// the address space.
    #[inline]
    #[must_use]
    pub const fn end(&self) -> Option<VirtualAddress> {
        self.start.checked_add(self.size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contains_is_half_open() {
        let vmr = VmRegion::new(
            VirtualAddress::new(0x40_0000),
            0x2000,
            VmrPerm::READ | VmrPerm::WRITE,
            PmObject::anonymous(0x2000),
        );

        assert!(!vmr.contains(VirtualAddress::new(0x3f_ffff)));
        assert!(vmr.contains(VirtualAddress::new(0x40_0000)));
        assert!(vmr.contains(VirtualAddress::new(0x40_1fff)));
        assert!(!vmr.contains(VirtualAddress::new(0x40_2000)));
        assert_eq!(vmr.end(), Some(VirtualAddress::new(0x40_2000)));
    }

    #[test]
    fn region_at_the_top_has_no_end() {
        let vmr = VmRegion::new(
            VirtualAddress::new(u64::MAX - 0xFFF),
            0x1000,
            VmrPerm::READ,
            PmObject::new(PmoType::Device, 0x1000),
        );

        assert!(vmr.contains(VirtualAddress::new(u64::MAX)));
        assert_eq!(vmr.end(), None);
        assert!(!vmr.pmo.is_anonymous());
    }
}
