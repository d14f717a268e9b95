//! # Demand paging for anonymous memory
//!
//! A thread touching an unmapped page of an anonymous region takes a
//! translation fault. The handler looks up the region, takes one frame from
//! the buddy pool and maps it at the faulting page:
//!
//! ```text
//!  ESR_EL1.FSC ──► translation fault L0..L3? ──no──► panic
//!                         │ yes
//!                         ▼
//!  FAR_EL1 ──► find_vmr_for_va ──► anonymous? ──► get_page ──► map_range
//!                  │ none              │ no          │ none       │ err
//!                  └──────────────┬────┴─────────────┘     free_page
//!                                 ▼                             │
//!                       thread.exit(-ENOMAPPING) ◄──────────────┘
//! ```
//!
//! Every failure reaches the thread as the same code, [`ENOMAPPING`]
//! negated; [`FaultError`] keeps the cause for logging.

#![cfg_attr(not(any(test, doctest)), no_std)]
#![allow(unsafe_code)]

mod dispatch;
mod error;
mod handler;

#[cfg(all(feature = "asm", target_arch = "aarch64"))]
pub use dispatch::CurrentFar;
pub use dispatch::{FaultAddressSource, FaultOutcome, FaultingThread, PageFaultHandler};
pub use error::{ENOMAPPING, FaultError};
pub use handler::handle_trans_fault;
