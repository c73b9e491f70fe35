//! Operation preparation helpers
//!
//! Each operation writes itself into a submission slot through
//! [`SubmissionEntry::prepare`](crate::SubmissionEntry::prepare).

use crate::sys;
use std::os::raw::c_int;
use std::os::unix::io::RawFd;

/// Length of `buf` as a kernel byte count, capped at `u32::MAX`
///
/// Larger slices turn into a short read or write.
fn slice_len(buf: &[u8]) -> u32 {
    clamp_len(buf.len())
}

fn clamp_len(len: usize) -> u32 {
    u32::try_from(len).unwrap_or(u32::MAX)
}

/// An operation that can be written into a submission slot
pub trait PrepareOp {
    /// Prepare this operation on the given SQE
    fn prepare(&self, sqe: &mut sys::io_uring_sqe);
}

/// NOP operation, completes immediately with result 0
pub struct Nop;

impl PrepareOp for Nop {
    fn prepare(&self, sqe: &mut sys::io_uring_sqe) {
        unsafe {
            sys::io_uring_prep_nop(sqe);
        }
    }
}

/// Read operation
pub struct Read {
    /// File descriptor to read from
    pub fd: RawFd,
    /// Buffer to read into
    pub buf: *mut u8,
    /// Number of bytes to read
    pub len: u32,
    /// Offset in the file to read from
    pub offset: u64,
}

impl Read {
    /// Create a new read operation
    ///
    /// # Safety
    ///
    /// The buffer must be valid and live until the operation completes.
    pub unsafe fn new(fd: RawFd, buf: *mut u8, len: u32, offset: u64) -> Self {
        Self {
            fd,
            buf,
            len,
            offset,
        }
    }

    /// Create a read operation from a byte slice
    ///
    /// The slice must stay alive until the completion is seen.
    pub fn from_slice(fd: RawFd, buf: &mut [u8], offset: u64) -> Self {
        Self {
            fd,
            buf: buf.as_mut_ptr(),
            len: slice_len(buf),
            offset,
        }
    }
}

impl PrepareOp for Read {
    fn prepare(&self, sqe: &mut sys::io_uring_sqe) {
        unsafe {
            sys::io_uring_prep_read(sqe, self.fd, self.buf.cast(), self.len, self.offset);
        }
    }
}

/// Read into a buffer the kernel picks from a buffer group
///
/// The entry needs [`select_buffer`](crate::SubmissionEntry::select_buffer);
/// the chosen buffer is reported by
/// [`Completion::buffer_id`](crate::Completion::buffer_id).
pub struct ReadSelect {
    /// File descriptor to read from
    pub fd: RawFd,
    /// Upper bound on bytes to read
    pub len: u32,
    /// Offset in the file; `u64::MAX` reads at the current position
    pub offset: u64,
}

impl ReadSelect {
    /// Read up to `len` bytes at the current file position
    pub fn new(fd: RawFd, len: u32) -> Self {
        Self {
            fd,
            len,
            offset: u64::MAX,
        }
    }
}

impl PrepareOp for ReadSelect {
    fn prepare(&self, sqe: &mut sys::io_uring_sqe) {
        unsafe {
            sys::io_uring_prep_read(sqe, self.fd, std::ptr::null_mut(), self.len, self.offset);
        }
    }
}

/// Write operation
pub struct Write {
    /// File descriptor to write to
    pub fd: RawFd,
    /// Buffer to write from
    pub buf: *const u8,
    /// Number of bytes to write
    pub len: u32,
    /// Offset in the file to write to
    pub offset: u64,
}

impl Write {
    /// Create a new write operation
    ///
    /// # Safety
    ///
    /// The buffer must be valid and live until the operation completes.
    pub unsafe fn new(fd: RawFd, buf: *const u8, len: u32, offset: u64) -> Self {
        Self {
            fd,
            buf,
            len,
            offset,
        }
    }

    /// Create a write operation from a byte slice
    ///
    /// The slice must stay alive until the completion is seen.
    pub fn from_slice(fd: RawFd, buf: &[u8], offset: u64) -> Self {
        Self {
            fd,
            buf: buf.as_ptr(),
            len: slice_len(buf),
            offset,
        }
    }
}

impl PrepareOp for Write {
    fn prepare(&self, sqe: &mut sys::io_uring_sqe) {
        unsafe {
            sys::io_uring_prep_write(sqe, self.fd, self.buf.cast(), self.len, self.offset);
        }
    }
}

/// Fsync operation
pub struct Fsync {
    /// File descriptor to sync
    pub fd: RawFd,
    /// Fsync flags
    pub flags: u32,
}

impl Fsync {
    /// Create a new fsync operation
    pub fn new(fd: RawFd) -> Self {
        Self { fd, flags: 0 }
    }

    /// Create an fsync operation with data-only sync
    pub fn data_sync(fd: RawFd) -> Self {
        Self {
            fd,
            flags: sys::IORING_FSYNC_DATASYNC,
        }
    }
}

impl PrepareOp for Fsync {
    fn prepare(&self, sqe: &mut sys::io_uring_sqe) {
        unsafe {
            sys::io_uring_prep_fsync(sqe, self.fd, self.flags);
        }
    }
}

/// Close operation
pub struct Close {
    /// File descriptor to close
    pub fd: RawFd,
}

impl Close {
    /// Create a new close operation
    pub fn new(fd: RawFd) -> Self {
        Self { fd }
    }
}

impl PrepareOp for Close {
    fn prepare(&self, sqe: &mut sys::io_uring_sqe) {
        unsafe {
            sys::io_uring_prep_close(sqe, self.fd);
        }
    }
}

/// Hand a run of equally sized buffers to a buffer group
///
/// Buffer ids run from `start_id` upwards, one per `buf_len` chunk.
pub struct ProvideBuffers {
    /// Start of the contiguous buffer memory
    pub addr: *mut u8,
    /// Size of each buffer
    pub buf_len: u32,
    /// Number of buffers
    pub count: u32,
    /// Target buffer group
    pub group: u16,
    /// Id of the first buffer
    pub start_id: u16,
}

impl ProvideBuffers {
    /// Split `buf` into `buf_len`-sized buffers for `group`
    ///
    /// A trailing chunk shorter than `buf_len` is left out. The memory must
    /// outlive every read that may select from the group.
    pub fn from_slice(buf: &mut [u8], buf_len: u32, group: u16, start_id: u16) -> Self {
        let count = match buf_len {
            0 => 0,
            len => (buf.len() / len as usize) as u32,
        };
        Self {
            addr: buf.as_mut_ptr(),
            buf_len,
            count,
            group,
            start_id,
        }
    }
}

impl PrepareOp for ProvideBuffers {
    fn prepare(&self, sqe: &mut sys::io_uring_sqe) {
        unsafe {
            sys::io_uring_prep_provide_buffers(
                sqe,
                self.addr.cast(),
                self.buf_len as c_int,
                self.count as c_int,
                c_int::from(self.group),
                c_int::from(self.start_id),
            );
        }
    }
}
