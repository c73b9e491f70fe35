//! Low-level FFI bindings to liburing
//!
//! Raw, unsafe bindings. The safe API in the crate root never hands out the
//! pointers these functions traffic in.

#![allow(non_upper_case_globals)]
#![allow(non_camel_case_types)]
#![allow(non_snake_case)]
#![allow(dead_code)]
#![allow(missing_docs)]
#![allow(clippy::missing_safety_doc)]

use std::os::raw::{c_int, c_uint, c_void};

include!(concat!(env!("OUT_DIR"), "/bindings.rs"));

// liburing.h defines these as static inline, so bindgen skips them.
// liburing-ffi exports each one as a real symbol.
extern "C" {
    // Submission side
    pub fn io_uring_get_sqe(ring: *mut io_uring) -> *mut io_uring_sqe;
    pub fn io_uring_sq_ready(ring: *const io_uring) -> c_uint;
    pub fn io_uring_sqe_set_data64(sqe: *mut io_uring_sqe, data: u64);
    pub fn io_uring_sqe_set_flags(sqe: *mut io_uring_sqe, flags: c_uint);
    pub fn io_uring_sqe_set_buf_group(sqe: *mut io_uring_sqe, bgid: c_int);

    // Completion side
    pub fn io_uring_cq_ready(ring: *const io_uring) -> c_uint;
    pub fn io_uring_peek_cqe(ring: *mut io_uring, cqe_ptr: *mut *mut io_uring_cqe) -> c_int;
    pub fn io_uring_wait_cqe(ring: *mut io_uring, cqe_ptr: *mut *mut io_uring_cqe) -> c_int;
    pub fn io_uring_cqe_seen(ring: *mut io_uring, cqe: *mut io_uring_cqe);

    // Prep helpers
    pub fn io_uring_prep_nop(sqe: *mut io_uring_sqe);
    pub fn io_uring_prep_read(
        sqe: *mut io_uring_sqe,
        fd: c_int,
        buf: *mut c_void,
        nbytes: c_uint,
        offset: u64,
    );
    pub fn io_uring_prep_write(
        sqe: *mut io_uring_sqe,
        fd: c_int,
        buf: *const c_void,
        nbytes: c_uint,
        offset: u64,
    );
    pub fn io_uring_prep_fsync(sqe: *mut io_uring_sqe, fd: c_int, fsync_flags: c_uint);
    pub fn io_uring_prep_close(sqe: *mut io_uring_sqe, fd: c_int);
    pub fn io_uring_prep_provide_buffers(
        sqe: *mut io_uring_sqe,
        addr: *mut c_void,
        len: c_int,
        nr: c_int,
        bgid: c_int,
        bid: c_int,
    );
}
