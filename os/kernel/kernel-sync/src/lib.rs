//! # Kernel synchronization primitives
//!
//! The physical memory pool is shared by every CPU that can take a page fault
//! or allocate frames. Its free lists are mutated in several non-atomic steps
//! (detach, mark, split, merge), so all of them run under a single
//! [`SpinLock`] for the whole operation. The guard releases on every exit
//! path, including early returns and unwinding in host tests.

#![cfg_attr(not(any(test, doctest)), no_std)]
#![allow(unsafe_code)]

mod spin_lock;

pub use spin_lock::{SpinLock, SpinLockGuard};
