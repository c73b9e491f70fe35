//! A small, blocking client for the Linux io_uring submission/completion
//! rings, built on liburing.
//!
//! The flow for every operation is the same: reserve a slot, prepare it,
//! submit, wait for the completion, then mark the completion seen so its
//! slot can be reused.
//!
//! ```no_run
//! use uring_core::{ops::Nop, Ring};
//!
//! let mut ring = Ring::new(8)?;
//!
//! let mut sqe = ring.get_next_submission_slot()?;
//! sqe.prepare(&Nop).set_user_data(0x42);
//! drop(sqe);
//!
//! ring.submit()?;
//!
//! let cqe = ring.wait_for_completion(None)?;
//! assert_eq!(cqe.user_data(), 0x42);
//! assert!(cqe.is_success());
//! cqe.mark_seen();
//! # Ok::<(), uring_core::Error>(())
//! ```
//!
//! A [`Ring`] holds at most [`Ring::capacity`] operations between slot
//! acquisition and `mark_seen`; beyond that
//! [`get_next_submission_slot`](Ring::get_next_submission_slot) fails with
//! [`Error::QueueFull`].

#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod flags;
mod ledger;
pub mod ops;
mod queue;
pub mod registry;
pub mod sys;
mod uring;

pub use config::RingConfig;
pub use error::{Error, Result};
pub use flags::{CqeFlags, SetupFlags, SqeFlags};
pub use queue::{Completion, SubmissionEntry};
pub use registry::RingRegistry;
pub use uring::{Ring, RingStats};
