//! # Kernel Memory Configuration
//!
//! This crate is the single source of truth for the constants that shape the
//! physical memory manager and the demand-paging path: frame granularity, the
//! largest buddy order, and where the kernel direct map begins.
//!
//! ## Virtual Memory Architecture
//!
//! The kernel splits the 64-bit address space at [`KBASE`](memory::KBASE):
//!
//! ```text
//! 0x0000_0000_0000_0000 ┌─────────────────────────────────┐
//!                       │                                 │
//!                       │         User Space              │
//!                       │  (anonymous regions, faulted in │
//!                       │   one frame at a time)          │
//!                       │                                 │
//! KBASE                 ├─────────────────────────────────┤ 0xffff_ff00_0000_0000
//!                       │     Kernel Direct Map           │
//!                       │  va = KBASE + pa; the buddy     │
//!                       │  pool lives in here             │
//! 0xFFFF_FFFF_FFFF_FFFF └─────────────────────────────────┘
//! ```
//!
//! ## Physical Memory Pool
//!
//! A pool carved out of the direct map has the layout
//!
//! ```text
//! | page metadata (one record per frame) | alignment pad | usable frames |
//! ```
//!
//! where usable frames begin on a [`PAGE_SIZE`](memory::PAGE_SIZE) boundary and
//! blocks span at most `2^(BUDDY_MAX_ORDER - 1)` frames.
//!
//! ## Configuration Management
//!
//! All values are `const` and checked at compile time; crates that need a
//! different largest order (tests, small pools) pass it as a const generic
//! instead of patching these values.

#![cfg_attr(not(any(test, doctest)), no_std)]

pub mod memory;
