//! Entry point from the synchronous-abort vector.

use crate::handler::handle_trans_fault;
use kernel_alloc::{PageAllocator, PhysMapper};
use kernel_memory_addresses::VirtualAddress;
use kernel_registers::esr::EsrEl1;
use kernel_registers::far::FarEl1;
use kernel_vmem::VmSpace;
use log::{error, info};

/// Where the faulting data address comes from.
pub trait FaultAddressSource {
    fn fault_address(&self) -> VirtualAddress;
}

/// A `FAR_EL1` value captured earlier, e.g. by the trap entry code.
impl FaultAddressSource for FarEl1 {
    #[inline]
    fn fault_address(&self) -> VirtualAddress {
        FarEl1::fault_address(*self)
    }
}

/// Reads `FAR_EL1` when asked.
///
/// Only valid on the exception path of the abort being handled.
#[cfg(all(feature = "asm", target_arch = "aarch64"))]
#[derive(Copy, Clone, Debug, Default)]
pub struct CurrentFar;

#[cfg(all(feature = "asm", target_arch = "aarch64"))]
impl FaultAddressSource for CurrentFar {
    #[inline]
    fn fault_address(&self) -> VirtualAddress {
        use kernel_registers::LoadRegisterUnsafe;
        // SAFETY: EL1 register, read while handling the abort that set it.
        unsafe { FarEl1::load_unsafe() }.fault_address()
    }
}

/// The thread that took the fault.
pub trait FaultingThread {
    type Space: VmSpace + ?Sized;

    fn vmspace(&mut self) -> &mut Self::Space;

    /// Terminate the thread with `code` as its exit status.
    fn exit(&mut self, code: i32);
}

/// What happened to the faulting thread.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum FaultOutcome {
    /// A translation was installed; the faulting access can be retried.
    Resolved,
    /// The fault could not be serviced and the thread was told to exit.
    Terminated { code: i32 },
}

/// Everything the fault path needs besides the faulting thread.
pub struct PageFaultHandler<'a, A: ?Sized, M, F> {
    pages: &'a A,
    mapper: M,
    far: F,
}

impl<'a, A, M, F> PageFaultHandler<'a, A, M, F>
where
    A: PageAllocator + ?Sized,
    M: PhysMapper,
    F: FaultAddressSource,
{
    #[must_use]
    pub const fn new(pages: &'a A, mapper: M, far: F) -> Self {
        Self { pages, mapper, far }
    }

    /// Handle a data or instruction abort described by `esr`.
    ///
    /// Translation faults at any level are resolved through
    /// [`handle_trans_fault`]; if that fails the thread is terminated with the
    /// error's code.
    ///
    /// # Panics
    /// On any fault status code other than a translation fault.
    pub fn do_page_fault<T>(
        &self,
        thread: &mut T,
        esr: EsrEl1,
        fault_ins_addr: VirtualAddress,
    ) -> FaultOutcome
    where
        T: FaultingThread + ?Sized,
    {
        let fault_addr = self.far.fault_address();
        let fsc = esr.fault_status();

        if !fsc.is_translation_fault() {
            error!(
                "do_page_fault: unsupported fault status {fsc:?} ({:#08b}) at {fault_addr}, pc {fault_ins_addr}",
                esr.fsc_bits()
            );
            panic!("do_page_fault: fault status {:#x} is unsupported", esr.fsc_bits());
        }

        match handle_trans_fault(thread.vmspace(), fault_addr, self.pages, &self.mapper) {
            Ok(()) => FaultOutcome::Resolved,
            Err(e) => {
                let code = e.errno();
                info!("pgfault at {fault_addr} (pc {fault_ins_addr}) failed: {e}");
                thread.exit(code);
                FaultOutcome::Terminated { code }
            }
        }
    }
}
