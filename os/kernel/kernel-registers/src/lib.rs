//! # Typed `AArch64` Fault Registers
//!
//! The synchronous exception path needs two system registers to classify and
//! locate a data abort:
//!
//! * [`EsrEl1`](esr::EsrEl1): why the exception was taken (exception class
//!   plus the fault status code of an abort).
//! * [`FarEl1`](far::FarEl1): the faulting *data* address. This differs from
//!   the faulting instruction address passed in `ELR_EL1`.
//!
//! The layouts are plain `bitfield-struct` types usable on any host. The trap
//! entry code hands `ESR_EL1` over as a value; the `asm` feature adds the `mrs`
//! read of `FAR_EL1`, which only exists on `aarch64`.

#![cfg_attr(not(any(test, doctest)), no_std)]
#![allow(unsafe_code)]

#[cfg(feature = "esr")]
pub mod esr;

#[cfg(feature = "far")]
pub mod far;

pub trait LoadRegisterUnsafe {
    /// # Safety
    /// The caller must uphold the implementation-specific safety requirements.
    /// For example, the register access might be privileged and require EL1.
    unsafe fn load_unsafe() -> Self;
}

pub trait LoadRegister {
    /// Load a register that is safe to read at the current exception level.
    fn load() -> Self;
}

impl<T> LoadRegisterUnsafe for T
where
    T: LoadRegister,
{
    #[inline]
    unsafe fn load_unsafe() -> Self {
        <Self as LoadRegister>::load()
    }
}
