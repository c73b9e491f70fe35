//! The ring handle: setup, submission and waiting

use crate::config::RingConfig;
use crate::error::{check_ret, peek_error, wait_error, Error, Result};
use crate::flags::SetupFlags;
use crate::ledger::SlotLedger;
use crate::ops::PrepareOp;
use crate::queue::{Completion, SubmissionEntry};
use crate::sys;
use std::io;
use std::mem::MaybeUninit;
use std::os::unix::io::{AsRawFd, RawFd};
use std::ptr::{self, NonNull};
use std::time::Duration;

/// Snapshot of a ring's slot usage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RingStats {
    /// Number of slots
    pub capacity: u32,
    /// Slots acquired and whose completion is not yet seen
    pub outstanding: u32,
    /// Entries prepared but not yet handed to the kernel
    pub unsubmitted: u32,
    /// Completions waiting to be consumed
    pub ready: u32,
}

/// A submission/completion ring shared with the kernel
///
/// The ring is cleaned up when dropped. It is `Send` but not `Sync`: keep
/// one ring per thread.
///
/// # Example
///
/// ```no_run
/// use uring_core::{ops::Nop, Ring};
///
/// let mut ring = Ring::new(8)?;
/// ring.get_next_submission_slot()?.prepare(&Nop).set_user_data(7);
/// ring.submit()?;
///
/// let cqe = ring.wait_for_completion(None)?;
/// assert_eq!(cqe.user_data(), 7);
/// cqe.mark_seen();
/// # Ok::<(), uring_core::Error>(())
/// ```
pub struct Ring {
    pub(crate) raw: sys::io_uring,
    pub(crate) ledger: SlotLedger,
    config: RingConfig,
}

impl Ring {
    /// Create a ring with `queue_depth` slots (rounded up to a power of 2)
    ///
    /// # Errors
    ///
    /// [`Error::InvalidConfig`] for a depth of zero or above the kernel
    /// limit, [`Error::Init`] if the kernel refuses the ring.
    pub fn new(queue_depth: u32) -> Result<Self> {
        Self::with_config(RingConfig::new(queue_depth))
    }

    /// Create a ring with specific setup flags
    ///
    /// ```no_run
    /// use uring_core::{flags::SetupFlags, Ring};
    ///
    /// let ring = Ring::with_flags(32, SetupFlags::CLAMP)?;
    /// # Ok::<(), uring_core::Error>(())
    /// ```
    pub fn with_flags(queue_depth: u32, flags: SetupFlags) -> Result<Self> {
        Self::with_config(RingConfig::new(queue_depth).with_flags(flags))
    }

    /// Create a ring from a full configuration
    pub fn with_config(config: RingConfig) -> Result<Self> {
        config.validate()?;

        let mut ring = MaybeUninit::<sys::io_uring>::uninit();
        let ret = unsafe {
            sys::io_uring_queue_init(config.queue_depth, ring.as_mut_ptr(), config.flags.bits())
        };
        check_ret(ret).map_err(Error::Init)?;

        let raw = unsafe { ring.assume_init() };
        let capacity = raw.sq.ring_entries;

        log::debug!(
            "ring fd {} ready: {} slots (requested {}), flags {:?}",
            raw.ring_fd,
            capacity,
            config.queue_depth,
            config.flags
        );

        Ok(Self {
            raw,
            ledger: SlotLedger::new(capacity),
            config,
        })
    }

    /// Reserve the next free submission slot
    ///
    /// # Errors
    ///
    /// [`Error::QueueFull`] when every slot is either prepared, in flight or
    /// holding an unreleased completion. Ring state is left unchanged.
    pub fn get_next_submission_slot(&mut self) -> Result<SubmissionEntry<'_>> {
        if self.ledger.free() == 0 {
            return Err(Error::QueueFull);
        }

        let sqe = NonNull::new(unsafe { sys::io_uring_get_sqe(&mut self.raw) })
            .ok_or(Error::QueueFull)?;
        self.ledger.reserve()?;

        Ok(SubmissionEntry::new(sqe))
    }

    /// Reserve a slot, prepare `op` on it and tag it with `user_data`
    pub fn push<Op: PrepareOp + ?Sized>(&mut self, op: &Op, user_data: u64) -> Result<()> {
        self.get_next_submission_slot()?
            .prepare(op)
            .set_user_data(user_data);
        Ok(())
    }

    /// Hand every prepared entry to the kernel
    ///
    /// Returns the number of entries submitted.
    ///
    /// # Errors
    ///
    /// [`Error::Submit`] if the kernel refuses the batch; the entries stay
    /// queued for the next attempt.
    pub fn submit(&mut self) -> Result<usize> {
        let ret = unsafe { sys::io_uring_submit(&mut self.raw) };
        let submitted = check_ret(ret).map_err(Error::Submit)? as usize;
        log::trace!("ring fd {}: submitted {}", self.raw.ring_fd, submitted);
        Ok(submitted)
    }

    /// Submit entries and wait for at least `wait_nr` completions
    pub fn submit_and_wait(&mut self, wait_nr: u32) -> Result<usize> {
        let ret = unsafe { sys::io_uring_submit_and_wait(&mut self.raw, wait_nr) };
        match check_ret(ret) {
            Ok(n) => Ok(n as usize),
            Err(e) if e.raw_os_error() == Some(libc::EINTR) => Err(Error::Interrupted),
            Err(e) => Err(Error::Submit(e)),
        }
    }

    /// Block until a completion is ready or `timeout` elapses
    ///
    /// `None` waits indefinitely. A zero timeout never blocks. On kernels
    /// without extended wait arguments, liburing implements timed waits with
    /// an internal timeout entry and flushes prepared entries first.
    ///
    /// # Errors
    ///
    /// [`Error::TimedOut`], [`Error::Interrupted`] (retry the wait) or
    /// [`Error::Ring`] for anything else the kernel reports.
    pub fn wait_for_completion(&mut self, timeout: Option<Duration>) -> Result<Completion<'_>> {
        let mut cqe: *mut sys::io_uring_cqe = ptr::null_mut();

        let ret = match timeout {
            None => unsafe { sys::io_uring_wait_cqe(&mut self.raw, &mut cqe) },
            Some(timeout) if timeout.is_zero() => {
                match unsafe { sys::io_uring_peek_cqe(&mut self.raw, &mut cqe) } {
                    ret if ret == -libc::EAGAIN => -libc::ETIME,
                    ret => ret,
                }
            }
            Some(timeout) => {
                let mut ts = kernel_timespec(timeout);
                unsafe { sys::io_uring_wait_cqe_timeout(&mut self.raw, &mut cqe, &mut ts) }
            }
        };

        if ret < 0 {
            let err = wait_error(ret);
            log::trace!("ring fd {}: wait failed: {}", self.raw.ring_fd, err);
            return Err(err);
        }

        let cqe = NonNull::new(cqe)
            .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "wait returned no completion"))?;
        Ok(Completion::new(cqe, self))
    }

    /// Wait using the configured default timeout
    pub fn next_completion(&mut self) -> Result<Completion<'_>> {
        self.wait_for_completion(self.config.wait_timeout)
    }

    /// Take a ready completion without blocking
    ///
    /// `Ok(None)` means the queue is empty.
    ///
    /// # Errors
    ///
    /// Whatever the kernel reports besides an empty queue, e.g. dropped
    /// overflow completions, mapped as in
    /// [`wait_for_completion`](Self::wait_for_completion).
    pub fn peek_completion(&mut self) -> Result<Option<Completion<'_>>> {
        let mut cqe: *mut sys::io_uring_cqe = ptr::null_mut();
        let ret = unsafe { sys::io_uring_peek_cqe(&mut self.raw, &mut cqe) };

        if ret < 0 {
            return match peek_error(ret) {
                Some(err) => Err(err),
                None => Ok(None),
            };
        }
        Ok(NonNull::new(cqe).map(|cqe| Completion::new(cqe, self)))
    }

    /// Number of slots, as sized by the kernel
    pub fn capacity(&self) -> u32 {
        self.ledger.capacity()
    }

    /// Slots available to [`get_next_submission_slot`](Self::get_next_submission_slot)
    pub fn free_slots(&self) -> u32 {
        self.ledger.free()
    }

    /// Current slot usage
    pub fn stats(&self) -> RingStats {
        RingStats {
            capacity: self.ledger.capacity(),
            outstanding: self.ledger.outstanding(),
            unsubmitted: unsafe { sys::io_uring_sq_ready(&self.raw) },
            ready: unsafe { sys::io_uring_cq_ready(&self.raw) },
        }
    }

    /// The configuration the ring was built from
    pub fn config(&self) -> &RingConfig {
        &self.config
    }
}

fn kernel_timespec(timeout: Duration) -> sys::__kernel_timespec {
    sys::__kernel_timespec {
        tv_sec: i64::try_from(timeout.as_secs()).unwrap_or(i64::MAX) as _,
        tv_nsec: timeout.subsec_nanos() as _,
    }
}

impl AsRawFd for Ring {
    fn as_raw_fd(&self) -> RawFd {
        self.raw.ring_fd
    }
}

impl Drop for Ring {
    fn drop(&mut self) {
        let outstanding = self.ledger.outstanding();
        if outstanding > 0 {
            log::debug!(
                "ring fd {} torn down with {} operations outstanding",
                self.raw.ring_fd,
                outstanding
            );
        }
        unsafe {
            sys::io_uring_queue_exit(&mut self.raw);
        }
    }
}

// The ring may move between threads once created, but never be shared
unsafe impl Send for Ring {}
