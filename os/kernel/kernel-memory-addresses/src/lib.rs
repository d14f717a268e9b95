//! # Virtual and Physical Memory Address Types
//!
//! Strongly typed wrappers for the raw addresses handled by the physical
//! memory manager and the fault path.
//!
//! | Type | Meaning |
//! |------|---------|
//! | [`MemoryAddress`] | A raw 64-bit address, either physical or virtual. |
//! | [`VirtualAddress`] | An address translated by the page tables (user VAs, the kernel direct map). |
//! | [`PhysicalAddress`] | A frame address as handed to the page-table mapper. |
//!
//! The buddy pool keys its frames by kernel *virtual* address and converts to
//! a [`PhysicalAddress`] only at the moment a translation is installed, so
//! keeping the two apart at the type level catches the classic mix-up.
//!
//! ## Page Sizes
//!
//! Marker types implementing [`PageSize`] select the granularity of the
//! alignment helpers:
//!
//! - [`Size4K`]: one frame
//! - [`Size2M`]: one level-2 block
//!
//! ```rust
//! # use kernel_memory_addresses::*;
//! let va = VirtualAddress::new(0x4000_1234);
//! assert_eq!(va.align_down::<Size4K>().as_u64(), 0x4000_1000);
//! assert_eq!(va.offset::<Size4K>(), 0x234);
//! assert!(!va.is_aligned::<Size4K>());
//! ```

#![cfg_attr(not(any(test, doctest)), no_std)]

mod memory_address;
mod page_size;
mod physical_address;
mod virtual_address;

pub use memory_address::MemoryAddress;
pub use page_size::{PageSize, Size2M, Size4K};
pub use physical_address::PhysicalAddress;
pub use virtual_address::VirtualAddress;
