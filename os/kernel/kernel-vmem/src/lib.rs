//! # Address-space interfaces
//!
//! What the fault path needs from a process address space, without the
//! address space itself:
//!
//! - a lookup from a virtual address to the [`VmRegion`] covering it, and
//! - a way to install a translation for a range ([`VmSpace::map_range`]).
//!
//! A region carries its permission bits ([`VmrPerm`]) and the physical memory
//! object ([`PmObject`]) backing it. Only the backing object's [`PmoType`]
//! matters to this crate's users.
//!
//! ```text
//!  VmSpace
//!   ├── VmRegion [start, start + size)  perm = READ | WRITE
//!   │     └── PmObject { Anonymous }
//!   ├── VmRegion ...
//!   │     └── PmObject { Data }
//!   └── page table  ◄── map_range(va, pa, len, perm)
//! ```

#![cfg_attr(not(any(test, doctest)), no_std)]

mod region;
mod space;

pub use region::{PmObject, PmoType, VmRegion, VmrPerm};
pub use space::{MapError, VmSpace};
