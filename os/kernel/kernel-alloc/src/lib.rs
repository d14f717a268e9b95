//! # Kernel Physical Frame Allocation
//!
//! A buddy allocator over one contiguous pool of 4 KiB frames.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │                    LockedPool                        │
//! │    • pool-wide spin lock around every operation      │
//! │    • PageAllocator: get_pages / free_pages           │
//! └─────────────────┬────────────────────────────────────┘
//!                   │
//! ┌─────────────────▼────────────────────────────────────┐
//! │                   PhysMemPool                        │
//! │    • free list per order 0..MAX_ORDER                │
//! │    • split on acquire, merge on release              │
//! │    • buddy = address XOR (PAGE_SIZE << order)        │
//! └─────────────────┬────────────────────────────────────┘
//!                   │
//! ┌─────────────────▼────────────────────────────────────┐
//! │          [Page] metadata, one record per frame       │
//! │    • order, allocated, intrusive free-list links     │
//! └──────────────────────────────────────────────────────┘
//! ```
//!
//! Frames are named by [`FrameIndex`] into the pool's metadata array. Kernel
//! virtual addresses only come into play at the edges
//! ([`PhysMemPool::get_pages`], [`PhysMemPool::frame_index_to_address`]) and
//! physical addresses only through a [`PhysMapper`].
//!
//! ## Bootstrapping a pool
//!
//! ```rust
//! use kernel_alloc::{Page, PhysMemPool};
//! use kernel_memory_addresses::VirtualAddress;
//!
//! let mut metadata = vec![Page::default(); 4];
//! let start = VirtualAddress::new(0xffff_ff00_4000_0000);
//! let mut pool = PhysMemPool::<3>::init(&mut metadata, start, 4).unwrap();
//!
//! assert_eq!(pool.free_counts(), [0, 0, 1]);
//! let frame = pool.acquire(0).unwrap();
//! assert_eq!(pool.free_counts(), [1, 1, 0]);
//! pool.release(frame);
//! assert_eq!(pool.free_counts(), [0, 0, 1]);
//! ```
//!
//! In the kernel the metadata comes from the front of the region itself; see
//! [`PoolLayout::carve`] and [`metadata_from_raw`].

#![cfg_attr(not(any(test, doctest)), no_std)]

mod buddy;
mod free_list;
mod layout;
mod locked;
mod page;
pub mod phys_mapper;

pub use buddy::{PhysMemPool, PoolInitError};
pub use layout::{PoolLayout, metadata_from_raw};
pub use locked::{LockedPool, PageAllocator};
pub use page::{FrameIndex, Page};
pub use phys_mapper::{KbaseMapper, PhysMapper};
