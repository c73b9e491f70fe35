//! Flag sets for ring setup, submission entries and completion entries

use bitflags::bitflags;

bitflags! {
    /// Flags passed to ring setup
    ///
    /// Layout-changing flags (`SQE128`, `CQE32`) and flags that need extra
    /// setup parameters (`CQSIZE`, `ATTACH_WQ`) are not offered.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct SetupFlags: u32 {
        /// Busy-poll for completions instead of relying on interrupts
        const IOPOLL = 1 << 0;
        /// A kernel thread polls the submission queue
        const SQPOLL = 1 << 1;
        /// Pin the SQPOLL thread to a CPU
        const SQ_AFF = 1 << 2;
        /// Clamp the requested depth to the kernel maximum instead of failing
        const CLAMP = 1 << 4;
        /// Keep submitting after an entry fails to prepare
        const SUBMIT_ALL = 1 << 7;
        /// Run task work cooperatively on the next kernel transition
        const COOP_TASKRUN = 1 << 8;
        /// Flag pending task work in the SQ ring flags
        const TASKRUN_FLAG = 1 << 9;
        /// Only one task submits to this ring
        const SINGLE_ISSUER = 1 << 12;
        /// Defer task work until the submitter waits for completions
        const DEFER_TASKRUN = 1 << 13;
    }
}

bitflags! {
    /// Per-entry submission flags
    ///
    /// `CQE_SKIP_SUCCESS` is deliberately absent: every submission is
    /// accounted for by exactly one completion.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct SqeFlags: u8 {
        /// The fd is an index into the registered file table
        const FIXED_FILE = 1 << 0;
        /// Start only after all previously submitted entries complete
        const IO_DRAIN = 1 << 1;
        /// The next entry starts only after this one completes
        const IO_LINK = 1 << 2;
        /// Like `IO_LINK`, but the chain survives a failure of this entry
        const IO_HARDLINK = 1 << 3;
        /// Always punt to an async worker
        const ASYNC = 1 << 4;
        /// Let the kernel pick a buffer from the entry's buffer group
        const BUFFER_SELECT = 1 << 5;
    }
}

bitflags! {
    /// Flags reported on a completion entry
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct CqeFlags: u32 {
        /// The upper 16 bits carry the id of a kernel-selected buffer
        const BUFFER = 1 << 0;
        /// More completions will follow for the same submission
        const MORE = 1 << 1;
        /// The socket still has data after this receive
        const SOCK_NONEMPTY = 1 << 2;
        /// Zero-copy notification
        const NOTIF = 1 << 3;
    }
}

/// Bit position of the buffer id inside the raw CQE flags
pub const CQE_BUFFER_SHIFT: u32 = 16;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setup_flags_by_name() {
        assert_eq!(SetupFlags::from_name("SQPOLL"), Some(SetupFlags::SQPOLL));
        assert_eq!(SetupFlags::from_name("CLAMP"), Some(SetupFlags::CLAMP));
        assert_eq!(SetupFlags::from_name("SQE128"), None);
    }

    #[test]
    fn test_cqe_flags_keep_buffer_id_bits() {
        let raw = (7u32 << CQE_BUFFER_SHIFT) | 1;
        let flags = CqeFlags::from_bits_retain(raw);
        assert!(flags.contains(CqeFlags::BUFFER));
        assert_eq!(flags.bits() >> CQE_BUFFER_SHIFT, 7);
    }

    #[test]
    fn test_sqe_flags_fit_kernel_byte() {
        assert_eq!(SqeFlags::all().bits(), 0b0011_1111);
    }
}
