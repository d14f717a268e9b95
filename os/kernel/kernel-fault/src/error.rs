use kernel_memory_addresses::VirtualAddress;
use kernel_vmem::{MapError, PmoType};

/// Error number for "the fault could not be resolved to a mapping".
pub const ENOMAPPING: i32 = 10;

/// Why a translation fault was not serviced.
///
/// The variants exist for logging and tests; the faulting thread only ever
/// sees [`errno`](Self::errno).
#[derive(Debug, Copy, Clone, Eq, PartialEq, thiserror::Error)]
pub enum FaultError {
    #[error("no region covers {0}")]
    NoRegion(VirtualAddress),
    #[error("region is backed by {0:?} memory, not anonymous memory")]
    NotAnonymous(PmoType),
    #[error("no free frame for the faulting page")]
    OutOfMemory,
    #[error("failed to map {va}: {source}")]
    MapFailed {
        va: VirtualAddress,
        #[source]
        source: MapError,
    },
}

impl FaultError {
    /// The exit code handed to the thread-termination path: `-ENOMAPPING`
    /// for every cause.
    #[inline]
    #[must_use]
    pub const fn errno(&self) -> i32 {
        -ENOMAPPING
    }
}
