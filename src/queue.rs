//! Submission and completion entry views

use crate::flags::{CqeFlags, SqeFlags, CQE_BUFFER_SHIFT};
use crate::ops::PrepareOp;
use crate::sys;
use crate::uring::Ring;
use std::marker::PhantomData;
use std::os::raw::{c_int, c_uint};
use std::ptr::NonNull;

/// A reserved submission queue slot
///
/// Obtained from [`Ring::get_next_submission_slot`]. Writes go straight into
/// the shared SQ memory but nothing reaches the kernel until
/// [`Ring::submit`]. A slot that is dropped without being prepared is sent
/// as a no-op on the next submit.
///
/// Flags, buffer group and user data may be set before or after
/// [`prepare`](Self::prepare); they are written again after the operation is
/// prepared, since liburing's prep helpers clear them.
pub struct SubmissionEntry<'ring> {
    sqe: NonNull<sys::io_uring_sqe>,
    flags: SqeFlags,
    buf_group: Option<u16>,
    user_data: u64,
    _phantom: PhantomData<&'ring mut Ring>,
}

impl<'ring> SubmissionEntry<'ring> {
    pub(crate) fn new(sqe: NonNull<sys::io_uring_sqe>) -> Self {
        let mut entry = Self {
            sqe,
            flags: SqeFlags::empty(),
            buf_group: None,
            user_data: 0,
            _phantom: PhantomData,
        };
        unsafe { sys::io_uring_prep_nop(entry.sqe.as_ptr()) };
        entry.apply();
        entry
    }

    /// Write an operation into this slot
    pub fn prepare<Op: PrepareOp + ?Sized>(&mut self, op: &Op) -> &mut Self {
        // The slot is exclusively ours until submit, guarded by the ring borrow
        op.prepare(unsafe { self.sqe.as_mut() });
        self.apply();
        self
    }

    /// Overwrite the entry's flag set
    pub fn set_flags(&mut self, flags: SqeFlags) -> &mut Self {
        self.flags = flags;
        unsafe { sys::io_uring_sqe_set_flags(self.sqe.as_ptr(), flags.bits() as c_uint) };
        self
    }

    /// Set the buffer group the kernel selects from
    ///
    /// Group ids are 16-bit, matching the kernel's `buf_group` field.
    ///
    /// Only takes effect together with [`SqeFlags::BUFFER_SELECT`]. Without
    /// that flag the kernel ignores the group silently; dropping such an
    /// entry logs a warning. See [`select_buffer`](Self::select_buffer).
    pub fn set_buffer_group(&mut self, group: u16) -> &mut Self {
        self.buf_group = Some(group);
        unsafe { sys::io_uring_sqe_set_buf_group(self.sqe.as_ptr(), c_int::from(group)) };
        self
    }

    /// Set `BUFFER_SELECT` and the buffer group in one go
    pub fn select_buffer(&mut self, group: u16) -> &mut Self {
        self.set_flags(self.flags | SqeFlags::BUFFER_SELECT)
            .set_buffer_group(group)
    }

    /// Set the correlation token echoed back on the completion
    pub fn set_user_data(&mut self, data: u64) -> &mut Self {
        self.user_data = data;
        unsafe { sys::io_uring_sqe_set_data64(self.sqe.as_ptr(), data) };
        self
    }

    /// Current flag set
    pub fn flags(&self) -> SqeFlags {
        self.flags
    }

    /// Buffer group, if one was set
    pub fn buffer_group(&self) -> Option<u16> {
        self.buf_group
    }

    /// Correlation token
    pub fn user_data(&self) -> u64 {
        self.user_data
    }

    fn apply(&mut self) {
        let sqe = self.sqe.as_ptr();
        unsafe {
            sys::io_uring_sqe_set_flags(sqe, self.flags.bits() as c_uint);
            sys::io_uring_sqe_set_data64(sqe, self.user_data);
            if let Some(group) = self.buf_group {
                sys::io_uring_sqe_set_buf_group(sqe, c_int::from(group));
            }
        }
    }
}

impl Drop for SubmissionEntry<'_> {
    fn drop(&mut self) {
        if let Some(group) = self.buf_group {
            if !self.flags.contains(SqeFlags::BUFFER_SELECT) {
                log::warn!(
                    "entry {:#x}: buffer group {} set without BUFFER_SELECT, the kernel will ignore it",
                    self.user_data,
                    group
                );
            }
        }
    }
}

/// A single completion queue entry
///
/// Must be released with [`mark_seen`](Self::mark_seen) once all reads are
/// done. An entry dropped without it is released on drop.
pub struct Completion<'ring> {
    cqe: NonNull<sys::io_uring_cqe>,
    ring: &'ring mut Ring,
    released: bool,
}

impl<'ring> Completion<'ring> {
    pub(crate) fn new(cqe: NonNull<sys::io_uring_cqe>, ring: &'ring mut Ring) -> Self {
        Self {
            cqe,
            ring,
            released: false,
        }
    }

    fn raw(&self) -> &sys::io_uring_cqe {
        unsafe { self.cqe.as_ref() }
    }

    /// The correlation token set on the originating submission
    pub fn user_data(&self) -> u64 {
        self.raw().user_data
    }

    /// Result code; negative values are errno values
    pub fn result(&self) -> i32 {
        self.raw().res
    }

    /// Completion flags, including the buffer id bits
    pub fn flags(&self) -> CqeFlags {
        CqeFlags::from_bits_retain(self.raw().flags)
    }

    /// Check if the operation was successful
    pub fn is_success(&self) -> bool {
        self.result() >= 0
    }

    /// Id of the buffer the kernel picked from the group, if any
    pub fn buffer_id(&self) -> Option<u16> {
        let flags = self.flags();
        flags
            .contains(CqeFlags::BUFFER)
            .then(|| (flags.bits() >> CQE_BUFFER_SHIFT) as u16)
    }

    /// More completions will follow for the same submission
    pub fn has_more(&self) -> bool {
        self.flags().contains(CqeFlags::MORE)
    }

    /// Release the slot back to the ring
    ///
    /// The entry's memory belongs to the kernel again once this returns.
    pub fn mark_seen(mut self) {
        self.release();
    }

    /// Convert the result to a `std::io::Result` and release the entry
    pub fn into_result(self) -> std::io::Result<u32> {
        let res = self.result();
        self.mark_seen();
        crate::error::check_ret(res).map(|n| n as u32)
    }

    fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;

        // Read everything needed before the slot goes back to the kernel
        let more = self.has_more();
        let user_data = self.user_data();
        unsafe { sys::io_uring_cqe_seen(&mut self.ring.raw, self.cqe.as_ptr()) };

        if !more && !self.ring.ledger.release() {
            log::error!(
                "completion {:#x} released with no outstanding submission",
                user_data
            );
        }
    }
}

impl Drop for Completion<'_> {
    fn drop(&mut self) {
        if !self.released {
            log::debug!(
                "completion {:#x} dropped without mark_seen, releasing",
                self.user_data()
            );
            self.release();
        }
    }
}

impl std::fmt::Debug for Completion<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Completion")
            .field("user_data", &self.user_data())
            .field("result", &self.result())
            .field("flags", &self.flags())
            .finish()
    }
}
